//! Default label positions.
//!
//! Explicit positions are never overwritten. Node labels prefer the inside of
//! the box and are promoted outside when the measured label does not fit.

use crate::model::{Graph, LabelPosition};

pub fn apply(g: &mut Graph, routed: &[usize]) {
    for node in &mut g.nodes {
        if node.label_position.is_some() {
            continue;
        }
        let Some(label) = &node.label else { continue };

        let is_container = !node.children.is_empty();
        let mut position = if is_container {
            LabelPosition::OutsideTopCenter
        } else if node.shape.label_goes_below() {
            LabelPosition::OutsideBottomCenter
        } else if node.has_icon {
            LabelPosition::InsideTopCenter
        } else {
            LabelPosition::InsideMiddleCenter
        };

        let inside = matches!(
            position,
            LabelPosition::InsideTopCenter | LabelPosition::InsideMiddleCenter
        );
        if inside && (label.width > node.rect.size.width || label.height > node.rect.size.height) {
            position = if is_container {
                LabelPosition::OutsideTopCenter
            } else {
                LabelPosition::OutsideBottomCenter
            };
        }
        node.label_position = Some(position);
    }

    for &edge_idx in routed {
        let edge = &mut g.edges[edge_idx];
        if edge.label.is_some() && edge.label_position.is_none() {
            edge.label_position = Some(LabelPosition::OutsideTopCenter);
        }
    }
}
