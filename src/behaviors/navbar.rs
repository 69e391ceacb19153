use crate::{NodeId, Result, Runtime};

const SCROLLED_AFTER_PX: i64 = 50;

#[derive(Debug)]
pub(crate) struct NavbarStyle {
    navbar: Option<NodeId>,
}

impl NavbarStyle {
    pub(crate) fn new(runtime: &mut Runtime) -> Result<Self> {
        Ok(Self {
            navbar: runtime.dom.query_selector(".navbar")?,
        })
    }

    pub(crate) fn update(&self, runtime: &mut Runtime) -> Result<()> {
        let Some(navbar) = self.navbar else {
            return Ok(());
        };
        if runtime.scroll_y > SCROLLED_AFTER_PX {
            runtime.dom.class_add(navbar, "scrolled")
        } else {
            runtime.dom.class_remove(navbar, "scrolled")
        }
    }
}
