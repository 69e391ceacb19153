pub(crate) mod active_link;
pub(crate) mod anchors;
pub(crate) mod contact;
pub(crate) mod counters;
pub(crate) mod menu;
pub(crate) mod navbar;
pub(crate) mod parallax;
pub(crate) mod reveal;

use crate::{Result, Runtime};

#[derive(Debug)]
pub(crate) struct Behaviors {
    pub(crate) menu: menu::MenuToggle,
    pub(crate) navbar: navbar::NavbarStyle,
    pub(crate) anchors: anchors::AnchorScroll,
    pub(crate) stat_counters: counters::CounterSet,
    pub(crate) gpa_counters: counters::CounterSet,
    pub(crate) parallax: parallax::HeroParallax,
    pub(crate) sections: reveal::SectionReveal,
    pub(crate) cards: reveal::CardReveal,
    pub(crate) active_nav: active_link::ActiveNav,
    pub(crate) contact: contact::ContactForm,
}

impl Behaviors {
    // Install order mirrors document load: reveal targets get their hidden
    // styles here, before the first watcher pass runs.
    pub(crate) fn install(runtime: &mut Runtime) -> Result<Self> {
        Ok(Self {
            menu: menu::MenuToggle::new(runtime)?,
            navbar: navbar::NavbarStyle::new(runtime)?,
            anchors: anchors::AnchorScroll::new(),
            stat_counters: counters::CounterSet::new(runtime, ".stat-number", "stat")?,
            gpa_counters: counters::CounterSet::new(runtime, ".gpa-number", "gpa")?,
            parallax: parallax::HeroParallax::new(),
            sections: reveal::SectionReveal::new(runtime)?,
            cards: reveal::CardReveal::new(runtime)?,
            active_nav: active_link::ActiveNav::new(runtime)?,
            contact: contact::ContactForm::new(runtime)?,
        })
    }
}
