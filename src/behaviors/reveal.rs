use crate::layout::IntersectionWatcher;
use crate::{NodeId, Result, Runtime, TaskKind};

const SECTION_THRESHOLD: f64 = 0.1;
const SECTION_BOTTOM_MARGIN_PX: i64 = -50;
// Cards fire on any visible overlap at all.
const CARD_THRESHOLD: f64 = 0.0;
const CARD_STAGGER_STEP_MS: i64 = 100;
const REVEAL_TRANSITION: &str = "opacity 0.6s ease, transform 0.6s ease";

fn hide_for_reveal(runtime: &mut Runtime, targets: &[NodeId], shift_px: i64) -> Result<()> {
    for node in targets {
        runtime.dom.style_set(*node, "opacity", "0")?;
        runtime
            .dom
            .style_set(*node, "transform", &format!("translateY({shift_px}px)"))?;
        runtime.dom.style_set(*node, "transition", REVEAL_TRANSITION)?;
    }
    Ok(())
}

fn show_revealed(runtime: &mut Runtime, node: NodeId) -> Result<()> {
    runtime.dom.style_set(node, "opacity", "1")?;
    runtime.dom.style_set(node, "transform", "translateY(0)")
}

#[derive(Debug)]
pub(crate) struct SectionReveal {
    watcher: IntersectionWatcher,
}

impl SectionReveal {
    pub(crate) fn new(runtime: &mut Runtime) -> Result<Self> {
        let targets = runtime.dom.query_selector_all("section")?;
        hide_for_reveal(runtime, &targets, 30)?;
        Ok(Self {
            watcher: IntersectionWatcher::new(targets, SECTION_THRESHOLD, SECTION_BOTTOM_MARGIN_PX),
        })
    }

    pub(crate) fn observe(&mut self, runtime: &mut Runtime) -> Result<()> {
        let hits =
            self.watcher
                .newly_intersecting(&runtime.layout, runtime.scroll_y, runtime.viewport_height);
        for node in hits {
            self.watcher.mark_fired(node);
            show_revealed(runtime, node)?;
            let label = runtime.node_label(node);
            runtime.trace_event_line(format!("[observe] section reveal node={label}"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct CardReveal {
    watcher: IntersectionWatcher,
}

impl CardReveal {
    pub(crate) fn new(runtime: &mut Runtime) -> Result<Self> {
        let targets = runtime
            .dom
            .query_selector_all(".skill-card, .project-card, .timeline-item")?;
        hide_for_reveal(runtime, &targets, 20)?;
        Ok(Self {
            watcher: IntersectionWatcher::new(targets, CARD_THRESHOLD, 0),
        })
    }

    // Cards entering together cascade: the stagger index counts within one
    // batch, not across the whole document.
    pub(crate) fn observe(&mut self, runtime: &mut Runtime) -> Result<()> {
        let hits =
            self.watcher
                .newly_intersecting(&runtime.layout, runtime.scroll_y, runtime.viewport_height);
        for (index, node) in hits.into_iter().enumerate() {
            self.watcher.mark_fired(node);
            let delay_ms = index as i64 * CARD_STAGGER_STEP_MS;
            let label = runtime.node_label(node);
            runtime.trace_event_line(format!(
                "[observe] card reveal queued node={label} delay_ms={delay_ms}"
            ));
            runtime.schedule_timeout(delay_ms, TaskKind::RevealCard { node });
        }
        Ok(())
    }
}

pub(crate) fn apply_card(runtime: &mut Runtime, node: NodeId) -> Result<()> {
    show_revealed(runtime, node)
}
