//! Channel discovery: maximal free strips between node boxes.
//!
//! The sweep is deliberately simple: full-span strips between consecutive box
//! coordinates, tested at their midline. Adequate for grid-like inputs;
//! irregular layouts degrade gracefully to fewer, wider strips.

use crate::geom::{Orientation, Point, Rect, bounding_rect, point, rect};
use super::ports::Port;

/// Margin added around the obstacle bounding box before the sweep.
const BBOX_MARGIN: f64 = 40.0;
/// Strips narrower than this are not worth a representative.
const MIN_GAP: f64 = 1.0;
/// A channel must be this much wider before it dominates another.
const DOMINATION_TOL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    pub rect: Rect,
    pub orientation: Orientation,
}

impl Channel {
    /// Principal width: extent perpendicular to the representative line.
    pub fn width(&self) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.rect.size.width,
            Orientation::Horizontal => self.rect.size.height,
        }
    }
}

/// An oriented track segment: the representative line of a channel, or a
/// short connector from a port into an adjacent representative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub a: Point,
    pub b: Point,
    pub orientation: Orientation,
}

/// The expanded bounding box the sweep runs in.
pub fn routing_bbox(boxes: &[Rect]) -> Rect {
    bounding_rect(boxes)
        .map(|r| r.inflate(BBOX_MARGIN, BBOX_MARGIN))
        .unwrap_or_else(|| rect(0.0, 0.0, 0.0, 0.0))
}

pub fn discover(boxes: &[Rect], bbox: &Rect) -> Vec<Channel> {
    let mut channels = Vec::new();

    let mut xs: Vec<f64> = Vec::with_capacity(boxes.len() * 2 + 2);
    xs.push(bbox.min_x());
    xs.push(bbox.max_x());
    for b in boxes {
        xs.push(b.min_x());
        xs.push(b.max_x());
    }
    sort_unique(&mut xs);
    for pair in xs.windows(2) {
        let (x1, x2) = (pair[0], pair[1]);
        if x2 - x1 < MIN_GAP {
            continue;
        }
        let mid = (x1 + x2) / 2.0;
        let blocked = boxes.iter().any(|b| b.min_x() < mid && mid < b.max_x());
        if !blocked {
            channels.push(Channel {
                rect: rect(x1, bbox.min_y(), x2 - x1, bbox.size.height),
                orientation: Orientation::Vertical,
            });
        }
    }

    let mut ys: Vec<f64> = Vec::with_capacity(boxes.len() * 2 + 2);
    ys.push(bbox.min_y());
    ys.push(bbox.max_y());
    for b in boxes {
        ys.push(b.min_y());
        ys.push(b.max_y());
    }
    sort_unique(&mut ys);
    for pair in ys.windows(2) {
        let (y1, y2) = (pair[0], pair[1]);
        if y2 - y1 < MIN_GAP {
            continue;
        }
        let mid = (y1 + y2) / 2.0;
        let blocked = boxes.iter().any(|b| b.min_y() < mid && mid < b.max_y());
        if !blocked {
            channels.push(Channel {
                rect: rect(bbox.min_x(), y1, bbox.size.width, y2 - y1),
                orientation: Orientation::Horizontal,
            });
        }
    }

    prune_dominated(channels)
}

fn sort_unique(values: &mut Vec<f64>) {
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
}

/// Drop channels another channel of the same orientation strictly covers.
fn prune_dominated(channels: Vec<Channel>) -> Vec<Channel> {
    let keep: Vec<bool> = channels
        .iter()
        .map(|b| {
            !channels.iter().any(|a| {
                a != b
                    && a.orientation == b.orientation
                    && dominates(a, b)
            })
        })
        .collect();
    channels
        .into_iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(c, _)| c)
        .collect()
}

fn dominates(a: &Channel, b: &Channel) -> bool {
    let (a_perp, b_perp, a_par, b_par) = match a.orientation {
        Orientation::Vertical => (
            (a.rect.min_x(), a.rect.max_x()),
            (b.rect.min_x(), b.rect.max_x()),
            a.rect.size.height,
            b.rect.size.height,
        ),
        Orientation::Horizontal => (
            (a.rect.min_y(), a.rect.max_y()),
            (b.rect.min_y(), b.rect.max_y()),
            a.rect.size.width,
            b.rect.size.width,
        ),
    };
    a_perp.0 <= b_perp.0 && a_perp.1 >= b_perp.1
        && a_par >= b_par
        && a.width() > b.width() + DOMINATION_TOL
}

/// Representative lines: one track per channel at its center (or through a
/// port that sits inside the channel), plus connectors from every port not
/// already on a track.
pub fn representatives(channels: &[Channel], ports: &[Port]) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    for channel in channels {
        match channel.orientation {
            Orientation::Vertical => {
                let center = (channel.rect.min_x() + channel.rect.max_x()) / 2.0;
                let x = ports
                    .iter()
                    .filter(|p| channel.rect.min_x() < p.pos.x && p.pos.x < channel.rect.max_x())
                    .map(|p| p.pos.x)
                    .min_by(|a, b| {
                        (a - center)
                            .abs()
                            .total_cmp(&(b - center).abs())
                            .then(a.total_cmp(b))
                    })
                    .unwrap_or(center);
                tracks.push(Track {
                    a: point(x, channel.rect.min_y()),
                    b: point(x, channel.rect.max_y()),
                    orientation: Orientation::Vertical,
                });
            }
            Orientation::Horizontal => {
                let center = (channel.rect.min_y() + channel.rect.max_y()) / 2.0;
                let y = ports
                    .iter()
                    .filter(|p| channel.rect.min_y() < p.pos.y && p.pos.y < channel.rect.max_y())
                    .map(|p| p.pos.y)
                    .min_by(|a, b| {
                        (a - center)
                            .abs()
                            .total_cmp(&(b - center).abs())
                            .then(a.total_cmp(b))
                    })
                    .unwrap_or(center);
                tracks.push(Track {
                    a: point(channel.rect.min_x(), y),
                    b: point(channel.rect.max_x(), y),
                    orientation: Orientation::Horizontal,
                });
            }
        }
    }

    // Connectors from ports that no representative passes through.
    let mut connectors: Vec<Track> = Vec::new();
    for port in ports {
        if tracks.iter().any(|t| on_track(t, port.pos)) {
            continue;
        }
        if let Some(connector) = port_connector(port, &tracks) {
            connectors.push(connector);
        }
    }
    tracks.extend(connectors);

    // Orient start <= end along the varying axis, then deduplicate.
    for track in &mut tracks {
        let swap = match track.orientation {
            Orientation::Horizontal => track.b.x < track.a.x,
            Orientation::Vertical => track.b.y < track.a.y,
        };
        if swap {
            std::mem::swap(&mut track.a, &mut track.b);
        }
    }
    let mut seen = rustc_hash::FxHashSet::default();
    tracks.retain(|t| {
        seen.insert((
            quantise(t.a.x),
            quantise(t.a.y),
            quantise(t.b.x),
            quantise(t.b.y),
            t.orientation,
        ))
    });
    tracks
}

fn quantise(v: f64) -> i64 {
    (v * 100.0).round() as i64
}

fn on_track(track: &Track, p: Point) -> bool {
    match track.orientation {
        Orientation::Horizontal => {
            (p.y - track.a.y).abs() <= 0.5
                && p.x >= track.a.x.min(track.b.x) - 0.5
                && p.x <= track.a.x.max(track.b.x) + 0.5
        }
        Orientation::Vertical => {
            (p.x - track.a.x).abs() <= 0.5
                && p.y >= track.a.y.min(track.b.y) - 0.5
                && p.y <= track.a.y.max(track.b.y) + 0.5
        }
    }
}

/// Short connector from a port into the nearest representative on the side
/// the port's face looks at. Four patterns, one per face.
fn port_connector(port: &Port, tracks: &[Track]) -> Option<Track> {
    let p = port.pos;
    match port.face {
        crate::geom::Direction::Top => tracks
            .iter()
            .filter(|t| {
                t.orientation == Orientation::Horizontal
                    && t.a.y < p.y
                    && t.a.x.min(t.b.x) - 0.5 <= p.x
                    && p.x <= t.a.x.max(t.b.x) + 0.5
            })
            .map(|t| t.a.y)
            .max_by(f64::total_cmp)
            .map(|y| Track {
                a: point(p.x, y),
                b: p,
                orientation: Orientation::Vertical,
            }),
        crate::geom::Direction::Bottom => tracks
            .iter()
            .filter(|t| {
                t.orientation == Orientation::Horizontal
                    && t.a.y > p.y
                    && t.a.x.min(t.b.x) - 0.5 <= p.x
                    && p.x <= t.a.x.max(t.b.x) + 0.5
            })
            .map(|t| t.a.y)
            .min_by(f64::total_cmp)
            .map(|y| Track {
                a: p,
                b: point(p.x, y),
                orientation: Orientation::Vertical,
            }),
        crate::geom::Direction::Left => tracks
            .iter()
            .filter(|t| {
                t.orientation == Orientation::Vertical
                    && t.a.x < p.x
                    && t.a.y.min(t.b.y) - 0.5 <= p.y
                    && p.y <= t.a.y.max(t.b.y) + 0.5
            })
            .map(|t| t.a.x)
            .max_by(f64::total_cmp)
            .map(|x| Track {
                a: point(x, p.y),
                b: p,
                orientation: Orientation::Horizontal,
            }),
        crate::geom::Direction::Right => tracks
            .iter()
            .filter(|t| {
                t.orientation == Orientation::Vertical
                    && t.a.x > p.x
                    && t.a.y.min(t.b.y) - 0.5 <= p.y
                    && p.y <= t.a.y.max(t.b.y) + 0.5
            })
            .map(|t| t.a.x)
            .min_by(f64::total_cmp)
            .map(|x| Track {
                a: p,
                b: point(x, p.y),
                orientation: Orientation::Horizontal,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_between_two_boxes_yields_a_vertical_channel() {
        let boxes = vec![rect(0.0, 0.0, 100.0, 60.0), rect(180.0, 0.0, 100.0, 60.0)];
        let bbox = routing_bbox(&boxes);
        let channels = discover(&boxes, &bbox);
        let vertical: Vec<&Channel> = channels
            .iter()
            .filter(|c| c.orientation == Orientation::Vertical)
            .collect();
        assert!(
            vertical
                .iter()
                .any(|c| c.rect.min_x() == 100.0 && c.rect.max_x() == 180.0),
            "expected the inter-box gap among {vertical:?}"
        );
    }

    #[test]
    fn blocked_midline_produces_no_channel() {
        // The middle box blocks the strip between the outer pair.
        let boxes = vec![
            rect(0.0, 0.0, 100.0, 60.0),
            rect(120.0, 0.0, 100.0, 60.0),
            rect(240.0, 0.0, 100.0, 60.0),
        ];
        let bbox = routing_bbox(&boxes);
        let channels = discover(&boxes, &bbox);
        for c in channels.iter().filter(|c| c.orientation == Orientation::Vertical) {
            let mid = (c.rect.min_x() + c.rect.max_x()) / 2.0;
            assert!(
                !boxes.iter().any(|b| b.min_x() < mid && mid < b.max_x()),
                "channel midline {mid} runs through a box"
            );
        }
    }

    #[test]
    fn representative_prefers_an_inside_port() {
        let boxes = vec![rect(0.0, 0.0, 100.0, 60.0), rect(180.0, 0.0, 100.0, 60.0)];
        let bbox = routing_bbox(&boxes);
        let channels = discover(&boxes, &bbox);

        let port = Port {
            node: 0,
            edge: 0,
            face: crate::geom::Direction::Right,
            pos: point(150.0, 30.0),
            is_source: true,
        };
        let tracks = representatives(&channels, &[port]);
        assert!(
            tracks
                .iter()
                .any(|t| t.orientation == Orientation::Vertical && (t.a.x - 150.0).abs() < 1e-9),
            "expected a vertical track through the port, got {tracks:?}"
        );
    }
}
