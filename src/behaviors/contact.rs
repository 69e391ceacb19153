use crate::{NodeId, Result, Runtime};

const THANKS_MESSAGE: &str = "Thank you for your message! I will get back to you soon.";

#[derive(Debug)]
pub(crate) struct ContactForm {
    form: Option<NodeId>,
}

impl ContactForm {
    pub(crate) fn new(runtime: &mut Runtime) -> Result<Self> {
        Ok(Self {
            form: runtime.dom.query_selector(".contact-form")?,
        })
    }

    pub(crate) fn handles(&self, form: NodeId) -> bool {
        self.form == Some(form)
    }

    pub(crate) fn on_submit(&self, runtime: &mut Runtime) -> Result<()> {
        let Some(form) = self.form else {
            return Ok(());
        };
        runtime.alert(THANKS_MESSAGE);
        runtime.dom.reset_form_controls(form)
    }
}
