//! Nudging: separate overlapping parallel segments into evenly spaced tracks.
//!
//! Overlapping segments at the same fixed coordinate form a bundle. A small
//! constraint DAG (source, one slot per edge, sink) relaxed in topological
//! order yields the total width the bundle needs; if the containing channel
//! can hold it the group is centered, otherwise the slots spread evenly.

use crate::geom::{Orientation, Point, manhattan, segment_orientation};
use rustc_hash::FxHashMap;

use super::channels::Channel;
use super::dijkstra::EdgeRoute;
use super::order::EdgeOrdering;

/// Segments at the same rounded fixed coordinate share a bundle.
const FIXED_BUCKET: f64 = 1.0;
/// Channels narrower than this are left alone.
const MIN_CHANNEL_WIDTH: f64 = 4.0;
/// Half-width of the fallback bounds when no channel contains a bundle.
const FALLBACK_HALF_WIDTH: f64 = 10.0;

#[derive(Debug, Clone, Copy)]
struct BundleSegment {
    slot: usize,
    point_idx: usize,
    fixed: f64,
    lo: f64,
    hi: f64,
}

pub fn nudge(
    routes: &mut [EdgeRoute],
    channels: &[Channel],
    ordering: &EdgeOrdering,
    edge_spacing: f64,
) {
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        let bundles = collect_bundles(routes, orientation);
        for bundle in bundles {
            if bundle.len() < 2 {
                continue;
            }
            nudge_bundle(routes, channels, ordering, edge_spacing, orientation, &bundle);
        }
    }

    for route in routes.iter_mut() {
        drop_zero_segments(&mut route.points);
    }
}

/// Decompose routes into orthogonal segments of one orientation and cluster
/// the ones that share a fixed-coordinate bucket and overlap along it.
fn collect_bundles(routes: &[EdgeRoute], orientation: Orientation) -> Vec<Vec<BundleSegment>> {
    let mut by_bucket: FxHashMap<i64, Vec<BundleSegment>> = FxHashMap::default();
    for (slot, route) in routes.iter().enumerate() {
        for (point_idx, pair) in route.points.windows(2).enumerate() {
            let (a, b) = (pair[0], pair[1]);
            if manhattan(a, b) < 0.5 {
                continue;
            }
            if segment_orientation(a, b) != orientation {
                continue;
            }
            let (fixed, lo, hi) = match orientation {
                Orientation::Horizontal => ((a.y + b.y) / 2.0, a.x.min(b.x), a.x.max(b.x)),
                Orientation::Vertical => ((a.x + b.x) / 2.0, a.y.min(b.y), a.y.max(b.y)),
            };
            let bucket = (fixed / FIXED_BUCKET).round() as i64;
            by_bucket.entry(bucket).or_default().push(BundleSegment {
                slot,
                point_idx,
                fixed,
                lo,
                hi,
            });
        }
    }

    let mut buckets: Vec<i64> = by_bucket.keys().copied().collect();
    buckets.sort();

    let mut bundles: Vec<Vec<BundleSegment>> = Vec::new();
    for bucket in buckets {
        let mut segments = by_bucket.remove(&bucket).expect("bucket exists");
        segments.sort_by(|a, b| {
            a.lo.total_cmp(&b.lo)
                .then(a.slot.cmp(&b.slot))
                .then(a.point_idx.cmp(&b.point_idx))
        });

        // Chain overlapping ranges into one bundle; end-to-end touches are
        // not overlaps.
        let mut current: Vec<BundleSegment> = Vec::new();
        let mut reach = f64::NEG_INFINITY;
        for seg in segments {
            if current.is_empty() || seg.lo + 0.5 < reach {
                reach = reach.max(seg.hi);
                current.push(seg);
            } else {
                bundles.push(std::mem::take(&mut current));
                reach = seg.hi;
                current.push(seg);
            }
        }
        if !current.is_empty() {
            bundles.push(current);
        }
    }
    bundles
}

fn nudge_bundle(
    routes: &mut [EdgeRoute],
    channels: &[Channel],
    ordering: &EdgeOrdering,
    edge_spacing: f64,
    orientation: Orientation,
    bundle: &[BundleSegment],
) {
    let fixed = bundle.iter().map(|s| s.fixed).sum::<f64>() / bundle.len() as f64;

    // The channel that carries this bundle bounds the available width. A
    // horizontal bundle runs inside a horizontal channel.
    let (channel_min, channel_width) = channels
        .iter()
        .filter(|c| c.orientation == orientation)
        .filter(|c| match orientation {
            Orientation::Horizontal => c.rect.min_y() <= fixed && fixed <= c.rect.max_y(),
            Orientation::Vertical => c.rect.min_x() <= fixed && fixed <= c.rect.max_x(),
        })
        .min_by(|a, b| {
            a.width()
                .total_cmp(&b.width())
                .then_with(|| match orientation {
                    Orientation::Horizontal => a.rect.min_y().total_cmp(&b.rect.min_y()),
                    Orientation::Vertical => a.rect.min_x().total_cmp(&b.rect.min_x()),
                })
        })
        .map(|c| match orientation {
            Orientation::Horizontal => (c.rect.min_y(), c.rect.size.height),
            Orientation::Vertical => (c.rect.min_x(), c.rect.size.width),
        })
        .unwrap_or((fixed - FALLBACK_HALF_WIDTH, 2.0 * FALLBACK_HALF_WIDTH));

    if channel_width < MIN_CHANNEL_WIDTH {
        return;
    }

    // Distinct edges, sorted by the shared-stretch rank from ordering.
    let mut users: Vec<usize> = Vec::new();
    for seg in bundle {
        let edge = routes[seg.slot].edge;
        if !users.contains(&edge) {
            users.push(edge);
        }
    }
    if users.len() < 2 {
        return;
    }
    users.sort_by_key(|&edge| (ordering.key(orientation, edge).unwrap_or(edge), edge));

    let positions = slot_positions(users.len(), channel_min, channel_width, edge_spacing);
    let target: FxHashMap<usize, f64> = users
        .iter()
        .zip(&positions)
        .map(|(&edge, &pos)| (edge, pos))
        .collect();

    for seg in bundle {
        let route = &mut routes[seg.slot];
        let pos = target[&route.edge];
        let last = route.points.len() - 1;
        for idx in [seg.point_idx, seg.point_idx + 1] {
            if idx == 0 || idx == last {
                continue; // ports stay on the shape boundary
            }
            match orientation {
                Orientation::Horizontal => route.points[idx].y = pos,
                Orientation::Vertical => route.points[idx].x = pos,
            }
        }
    }
}

/// Absolute track positions via longest-path relaxation over the constraint
/// DAG: source, `n` slots, sink; half-spacing margins at both ends. Falls back
/// to even distribution when the channel cannot hold the required width.
fn slot_positions(n: usize, channel_min: f64, channel_width: f64, spacing: f64) -> Vec<f64> {
    // Node 0 is the source, 1..=n the slots, n+1 the sink.
    let mut arcs: Vec<(usize, usize, f64)> = Vec::with_capacity(n + 1);
    arcs.push((0, 1, spacing / 2.0));
    for i in 1..n {
        arcs.push((i, i + 1, spacing));
    }
    arcs.push((n, n + 1, spacing / 2.0));

    let mut dist = vec![f64::NEG_INFINITY; n + 2];
    dist[0] = 0.0;
    // Arcs are emitted in topological order, so one sweep relaxes everything.
    for &(from, to, weight) in &arcs {
        if dist[from] + weight > dist[to] {
            dist[to] = dist[from] + weight;
        }
    }
    let required = dist[n + 1];

    if required <= channel_width + 0.5 {
        let slack = (channel_width - required) / 2.0;
        (1..=n)
            .map(|i| channel_min + slack + dist[i])
            .collect()
    } else {
        (1..=n)
            .map(|i| channel_min + channel_width * i as f64 / (n as f64 + 1.0))
            .collect()
    }
}

/// Remove zero-length interior segments introduced by track shifts; ports are
/// untouchable.
fn drop_zero_segments(points: &mut Vec<Point>) {
    let mut i = 1;
    while i + 1 < points.len() {
        if manhattan(points[i], points[i + 1]) < 1e-9 {
            points.remove(i);
        } else {
            i += 1;
        }
    }
    if points.len() > 2 && manhattan(points[0], points[1]) < 1e-9 {
        points.remove(1);
    }
}
