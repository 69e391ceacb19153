use crate::dom_utils::{format_fixed2, format_float, parse_float_prefix};
use crate::layout::IntersectionWatcher;
use crate::{NodeId, Result, Runtime, TaskKind};

const COUNT_DURATION_MS: i64 = 2000;
const VISIBLE_THRESHOLD: f64 = 0.5;

#[derive(Debug)]
pub(crate) struct CounterSet {
    group: &'static str,
    watcher: IntersectionWatcher,
}

impl CounterSet {
    pub(crate) fn new(runtime: &mut Runtime, selector: &str, group: &'static str) -> Result<Self> {
        let targets = runtime.dom.query_selector_all(selector)?;
        Ok(Self {
            group,
            watcher: IntersectionWatcher::new(targets, VISIBLE_THRESHOLD, 0),
        })
    }

    pub(crate) fn observe(&mut self, runtime: &mut Runtime) -> Result<()> {
        let hits =
            self.watcher
                .newly_intersecting(&runtime.layout, runtime.scroll_y, runtime.viewport_height);
        for node in hits {
            let raw = runtime.dom.data_attr(node, "target").unwrap_or_default();
            let target = parse_float_prefix(&raw);
            if target.is_nan() {
                // Not consumed: an unusable target keeps the element observed.
                continue;
            }
            self.watcher.mark_fired(node);
            let label = runtime.node_label(node);
            runtime.trace_event_line(format!(
                "[observe] counter start group={} node={} target={}",
                self.group,
                label,
                format_float(target),
            ));
            runtime.schedule_frame(TaskKind::CounterStep {
                node,
                target,
                decimal: target.fract() != 0.0,
                started_at: None,
                group: self.group,
            });
        }
        Ok(())
    }
}

// One animation frame of a running count. The clock starts at the first frame
// actually executed, so a frame that runs late still plays the full ramp.
pub(crate) fn run_step(
    runtime: &mut Runtime,
    node: NodeId,
    target: f64,
    decimal: bool,
    started_at: Option<i64>,
    group: &'static str,
) -> Result<()> {
    let started = started_at.unwrap_or(runtime.now_ms);
    let progress = ((runtime.now_ms - started) as f64 / COUNT_DURATION_MS as f64).min(1.0);

    if progress < 1.0 {
        let current = progress * target;
        let text = if decimal {
            format_fixed2(current)
        } else {
            format_float(current.floor())
        };
        runtime.dom.set_text_content(node, &text)?;
        runtime.schedule_frame(TaskKind::CounterStep {
            node,
            target,
            decimal,
            started_at: Some(started),
            group,
        });
    } else {
        let text = if decimal {
            format_fixed2(target)
        } else {
            format_float(target)
        };
        runtime.dom.set_text_content(node, &text)?;
    }
    Ok(())
}
