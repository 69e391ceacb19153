use crate::dom_utils::format_float;
use crate::{Result, Runtime, TaskKind};

const SHIFT_FACTOR: f64 = 0.3;
const FADE_DISTANCE_PX: f64 = 600.0;

#[derive(Debug)]
pub(crate) struct HeroParallax {
    frame_pending: bool,
}

impl HeroParallax {
    pub(crate) fn new() -> Self {
        Self {
            frame_pending: false,
        }
    }

    // Scroll bursts coalesce into a single queued frame.
    pub(crate) fn request_frame(&mut self, runtime: &mut Runtime) {
        if self.frame_pending {
            return;
        }
        self.frame_pending = true;
        runtime.schedule_frame(TaskKind::ParallaxFrame);
    }

    pub(crate) fn run_frame(&mut self, runtime: &mut Runtime) -> Result<()> {
        self.frame_pending = false;

        let Some(content) = runtime.dom.query_selector(".hero-content")? else {
            return Ok(());
        };
        // Past the viewport the hero keeps whatever styles the last frame set.
        if runtime.scroll_y >= runtime.viewport_height {
            return Ok(());
        }

        let shift = runtime.scroll_y as f64 * SHIFT_FACTOR;
        let transform = format!("translateY({}px)", format_float(shift));
        runtime.dom.style_set(content, "transform", &transform)?;

        let opacity = (1.0 - runtime.scroll_y as f64 / FADE_DISTANCE_PX).max(0.0);
        runtime.dom.style_set(content, "opacity", &format_float(opacity))
    }
}
