use crate::{NodeId, Result, Runtime};

#[derive(Debug)]
pub(crate) struct MenuToggle {
    trigger: Option<NodeId>,
    menu: Option<NodeId>,
    body: Option<NodeId>,
}

impl MenuToggle {
    pub(crate) fn new(runtime: &mut Runtime) -> Result<Self> {
        Ok(Self {
            trigger: runtime.dom.query_selector(".hamburger")?,
            menu: runtime.dom.query_selector(".nav-menu")?,
            body: runtime.dom.body(),
        })
    }

    pub(crate) fn on_click(&self, runtime: &mut Runtime, target: NodeId) -> Result<()> {
        let (Some(trigger), Some(menu)) = (self.trigger, self.menu) else {
            return Ok(());
        };

        if target == trigger || runtime.dom.is_descendant_of(target, trigger) {
            runtime.dom.class_toggle(trigger, "active")?;
            let open = runtime.dom.class_toggle(menu, "active")?;
            self.sync_body_overflow(runtime, open)?;
            runtime.trace_event_line(format!("[event] menu toggle open={open}"));
            return Ok(());
        }

        // Nav links close the menu wherever they sit in the tree.
        if has_ancestor_with_class(runtime, target, "nav-link") {
            return self.close(runtime, "nav-link");
        }

        if target != menu && !runtime.dom.is_descendant_of(target, menu) {
            return self.close(runtime, "outside");
        }
        Ok(())
    }

    fn close(&self, runtime: &mut Runtime, reason: &str) -> Result<()> {
        let (Some(trigger), Some(menu)) = (self.trigger, self.menu) else {
            return Ok(());
        };
        let was_open = runtime.dom.class_contains(menu, "active")?;
        runtime.dom.class_remove(trigger, "active")?;
        runtime.dom.class_remove(menu, "active")?;
        // Every close path releases the scroll lock, not just the toggle.
        self.sync_body_overflow(runtime, false)?;
        if was_open {
            runtime.trace_event_line(format!("[event] menu close reason={reason}"));
        }
        Ok(())
    }

    fn sync_body_overflow(&self, runtime: &mut Runtime, open: bool) -> Result<()> {
        let Some(body) = self.body else {
            return Ok(());
        };
        let value = if open { "hidden" } else { "" };
        runtime.dom.style_set(body, "overflow", value)
    }
}

fn has_ancestor_with_class(runtime: &Runtime, target: NodeId, class_name: &str) -> bool {
    let mut cursor = Some(target);
    while let Some(node) = cursor {
        if runtime.dom.element_has_class(node, class_name) {
            return true;
        }
        cursor = runtime.dom.parent(node);
    }
    false
}
