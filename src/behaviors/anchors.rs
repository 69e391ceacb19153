use crate::{NodeId, Runtime};

const FIXED_NAV_OFFSET_PX: i64 = 80;

#[derive(Debug)]
pub(crate) struct AnchorScroll;

impl AnchorScroll {
    pub(crate) fn new() -> Self {
        Self
    }

    // Resolves the scroll destination for a click, if any. A logo click wins
    // over an anchor destination on the same target because it resolves last.
    pub(crate) fn resolve(&self, runtime: &Runtime, target: NodeId) -> Option<(i64, &'static str)> {
        let mut destination = None;

        let mut cursor = Some(target);
        while let Some(node) = cursor {
            if node_is_anchor(runtime, node) {
                if let Some(top) = fragment_target_top(runtime, node) {
                    destination = Some((top - FIXED_NAV_OFFSET_PX, "anchor"));
                }
                break;
            }
            cursor = runtime.dom.parent(node);
        }

        let mut cursor = Some(target);
        while let Some(node) = cursor {
            if runtime.dom.element_has_class(node, "logo") {
                destination = Some((0, "logo"));
                break;
            }
            cursor = runtime.dom.parent(node);
        }

        destination
    }
}

fn node_is_anchor(runtime: &Runtime, node: NodeId) -> bool {
    runtime
        .dom
        .tag_name(node)
        .map(|tag| tag.eq_ignore_ascii_case("a"))
        .unwrap_or(false)
}

fn fragment_target_top(runtime: &Runtime, anchor: NodeId) -> Option<i64> {
    let href = runtime.dom.attr(anchor, "href")?;
    let fragment = href.strip_prefix('#')?;
    if fragment.is_empty() {
        return None;
    }
    let section = runtime.dom.by_id(fragment)?;
    Some(runtime.layout.box_of(section).top)
}
