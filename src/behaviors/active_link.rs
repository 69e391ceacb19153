use crate::{NodeId, Result, Runtime};

const PROBE_OFFSET_PX: i64 = 150;

#[derive(Debug)]
pub(crate) struct ActiveNav {
    sections: Vec<NodeId>,
    links: Vec<NodeId>,
}

impl ActiveNav {
    pub(crate) fn new(runtime: &mut Runtime) -> Result<Self> {
        Ok(Self {
            sections: runtime.dom.query_selector_all("section[id]")?,
            links: runtime.dom.query_selector_all(".nav-link")?,
        })
    }

    // The probe sits 150px below the scroll offset and the last section under
    // it in document order wins. With no section under the probe, no link is
    // active.
    pub(crate) fn update(&self, runtime: &mut Runtime) -> Result<()> {
        let probe = runtime.scroll_y + PROBE_OFFSET_PX;

        let mut current: Option<String> = None;
        for section in &self.sections {
            let element_box = runtime.layout.box_of(*section);
            if probe < element_box.top || probe >= element_box.top + element_box.height {
                continue;
            }
            match runtime.dom.attr(*section, "id") {
                Some(id) if !id.is_empty() => current = Some(id),
                _ => {}
            }
        }

        let wanted = current.map(|id| format!("#{id}"));
        for link in &self.links {
            runtime.dom.class_remove(*link, "active")?;
            let Some(wanted) = &wanted else {
                continue;
            };
            if runtime.dom.attr(*link, "href").as_deref() == Some(wanted.as_str()) {
                runtime.dom.class_add(*link, "active")?;
            }
        }
        Ok(())
    }
}
