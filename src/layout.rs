use std::collections::{HashMap, HashSet};

use crate::{Dom, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ElementBox {
    pub(crate) top: i64,
    pub(crate) height: i64,
}

// Geometry is declared, not computed: elements carry data-top/data-height
// attributes, or tests override boxes through set_metrics. Elements without
// a box have zero height and never intersect the viewport.
#[derive(Debug, Clone, Default)]
pub(crate) struct Layout {
    boxes: HashMap<NodeId, ElementBox>,
}

impl Layout {
    pub(crate) fn from_dom(dom: &Dom) -> Self {
        let mut boxes = HashMap::new();
        for node in dom.all_element_nodes() {
            let top = parse_px_attr(dom, node, "data-top");
            let height = parse_px_attr(dom, node, "data-height");
            if top.is_some() || height.is_some() {
                boxes.insert(
                    node,
                    ElementBox {
                        top: top.unwrap_or(0),
                        height: height.unwrap_or(0),
                    },
                );
            }
        }
        Self { boxes }
    }

    pub(crate) fn box_of(&self, node: NodeId) -> ElementBox {
        self.boxes.get(&node).copied().unwrap_or_default()
    }

    pub(crate) fn set_box(&mut self, node: NodeId, element_box: ElementBox) {
        self.boxes.insert(node, element_box);
    }
}

fn parse_px_attr(dom: &Dom, node: NodeId, name: &str) -> Option<i64> {
    dom.attr(node, name)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
}

#[derive(Debug, Clone)]
pub(crate) struct IntersectionWatcher {
    targets: Vec<NodeId>,
    fired: HashSet<NodeId>,
    threshold: f64,
    bottom_margin_px: i64,
}

impl IntersectionWatcher {
    pub(crate) fn new(targets: Vec<NodeId>, threshold: f64, bottom_margin_px: i64) -> Self {
        Self {
            targets,
            fired: HashSet::new(),
            threshold,
            bottom_margin_px,
        }
    }

    // Unfired targets whose visible fraction meets the threshold, in
    // registration order. Callers decide whether a hit consumes the target
    // via mark_fired.
    pub(crate) fn newly_intersecting(
        &self,
        layout: &Layout,
        scroll_y: i64,
        viewport_height: i64,
    ) -> Vec<NodeId> {
        self.targets
            .iter()
            .copied()
            .filter(|node| !self.fired.contains(node))
            .filter(|node| {
                let ratio = visible_ratio(
                    layout.box_of(*node),
                    scroll_y,
                    viewport_height,
                    self.bottom_margin_px,
                );
                ratio > 0.0 && ratio >= self.threshold
            })
            .collect()
    }

    pub(crate) fn mark_fired(&mut self, node: NodeId) {
        self.fired.insert(node);
    }
}

pub(crate) fn visible_ratio(
    element_box: ElementBox,
    scroll_y: i64,
    viewport_height: i64,
    bottom_margin_px: i64,
) -> f64 {
    if element_box.height <= 0 {
        return 0.0;
    }

    let view_top = scroll_y;
    let view_bottom = scroll_y + viewport_height + bottom_margin_px;
    let top = element_box.top.max(view_top);
    let bottom = (element_box.top + element_box.height).min(view_bottom);
    if bottom <= top {
        return 0.0;
    }
    (bottom - top) as f64 / element_box.height as f64
}
