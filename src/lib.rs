use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

mod behaviors;
mod dom_utils;
mod html;
mod layout;
mod selector;

#[cfg(test)]
mod tests;

use behaviors::Behaviors;
use dom_utils::{class_tokens, has_class, set_class_attr, truncate_chars};
use layout::{ElementBox, Layout};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    Runtime(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) disabled: bool,
    pub(crate) readonly: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let disabled = attrs.contains_key("disabled");
        let readonly = attrs.contains_key("readonly");
        let element = Element {
            tag_name,
            attrs,
            value,
            disabled,
            readonly,
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            if !id_attr.is_empty() {
                // First occurrence wins for duplicate ids.
                self.id_index.entry(id_attr).or_insert(id);
            }
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn data_attr(&self, node_id: NodeId, key: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(&format!("data-{key}")).cloned())
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id)
            .map(|element| element.disabled)
            .unwrap_or(false)
    }

    pub(crate) fn readonly(&self, node_id: NodeId) -> bool {
        self.element(node_id)
            .map(|element| element.readonly)
            .unwrap_or(false)
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
        }
    }

    pub(crate) fn set_text_content(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self.element(node_id).is_none() {
            return Err(Error::Runtime("text target is not an element".into()));
        }
        self.nodes[node_id.0].children.clear();
        if !value.is_empty() {
            self.create_text(node_id, value.to_string());
        }
        Ok(())
    }

    pub(crate) fn value(&self, node_id: NodeId) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Runtime("value target is not an element".into()))?;
        Ok(element.value.clone())
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("value target is not an element".into()))?;
        element.value = value.to_string();
        Ok(())
    }

    pub(crate) fn initialize_form_control_values(&mut self) -> Result<()> {
        let nodes = self.all_element_nodes();
        for node in nodes {
            let is_textarea = self
                .tag_name(node)
                .map(|tag| tag.eq_ignore_ascii_case("textarea"))
                .unwrap_or(false);
            if is_textarea {
                let text = self.text_content(node);
                let element = self
                    .element_mut(node)
                    .ok_or_else(|| Error::Runtime("textarea target is not an element".into()))?;
                element.value = text;
            }
        }
        Ok(())
    }

    pub(crate) fn reset_form_controls(&mut self, form: NodeId) -> Result<()> {
        let controls = self
            .all_element_nodes()
            .into_iter()
            .filter(|node| *node == form || self.is_descendant_of(*node, form))
            .collect::<Vec<_>>();

        for node in controls {
            let Some(tag) = self.tag_name(node).map(str::to_ascii_lowercase) else {
                continue;
            };
            match tag.as_str() {
                "input" => {
                    let default = self.attr(node, "value").unwrap_or_default();
                    self.set_value(node, &default)?;
                }
                "textarea" => {
                    let default = self.text_content(node);
                    self.set_value(node, &default)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub(crate) fn class_contains(&self, node_id: NodeId, class_name: &str) -> Result<bool> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Runtime("class target is not an element".into()))?;
        Ok(has_class(element, class_name))
    }

    pub(crate) fn element_has_class(&self, node_id: NodeId, class_name: &str) -> bool {
        self.element(node_id)
            .map(|element| has_class(element, class_name))
            .unwrap_or(false)
    }

    pub(crate) fn class_add(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("class target is not an element".into()))?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        set_class_attr(element, &classes);
        Ok(())
    }

    pub(crate) fn class_remove(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("class target is not an element".into()))?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        classes.retain(|name| name != class_name);
        set_class_attr(element, &classes);
        Ok(())
    }

    pub(crate) fn class_toggle(&mut self, node_id: NodeId, class_name: &str) -> Result<bool> {
        let has = self.class_contains(node_id, class_name)?;
        if has {
            self.class_remove(node_id, class_name)?;
            Ok(false)
        } else {
            self.class_add(node_id, class_name)?;
            Ok(true)
        }
    }

    pub(crate) fn style_get(&self, node_id: NodeId, key: &str) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Runtime("style target is not an element".into()))?;
        let name = key.trim().to_ascii_lowercase();
        let decls =
            dom_utils::parse_style_declarations(element.attrs.get("style").map(String::as_str));
        Ok(decls
            .iter()
            .find(|(prop, _)| prop == &name)
            .map(|(_, value)| value.clone())
            .unwrap_or_default())
    }

    pub(crate) fn style_set(&mut self, node_id: NodeId, key: &str, value: &str) -> Result<()> {
        let name = key.trim().to_ascii_lowercase();
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("style target is not an element".into()))?;

        let mut decls =
            dom_utils::parse_style_declarations(element.attrs.get("style").map(String::as_str));
        if let Some(pos) = decls.iter().position(|(prop, _)| prop == &name) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((name, value.to_string()));
        }

        if decls.is_empty() {
            element.attrs.remove("style");
        } else {
            element.attrs.insert(
                "style".to_string(),
                dom_utils::serialize_style_declarations(&decls),
            );
        }

        Ok(())
    }

    pub(crate) fn body(&self) -> Option<NodeId> {
        self.all_element_nodes().into_iter().find(|node| {
            self.tag_name(*node)
                .map(|tag| tag.eq_ignore_ascii_case("body"))
                .unwrap_or(false)
        })
    }

    pub(crate) fn find_ancestor_by_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if self
                .tag_name(current)
                .map(|t| t.eq_ignore_ascii_case(tag))
                .unwrap_or(false)
            {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
            NodeType::Element(element) => {
                let mut out = String::new();
                out.push('<');
                out.push_str(&element.tag_name);
                let mut keys = element.attrs.keys().collect::<Vec<_>>();
                keys.sort();
                for key in keys {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&element.attrs[key]);
                    out.push('"');
                }
                out.push('>');
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out.push_str("</");
                out.push_str(&element.tag_name);
                out.push('>');
                out
            }
        }
    }
}

pub(crate) fn is_submit_control(dom: &Dom, node_id: NodeId) -> bool {
    let Some(element) = dom.element(node_id) else {
        return false;
    };

    if element.tag_name.eq_ignore_ascii_case("button") {
        return element
            .attrs
            .get("type")
            .map(|kind| kind.eq_ignore_ascii_case("submit"))
            .unwrap_or(true);
    }

    if element.tag_name.eq_ignore_ascii_case("input") {
        return element
            .attrs
            .get("type")
            .map(|kind| kind.eq_ignore_ascii_case("submit"))
            .unwrap_or(false);
    }

    false
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TaskKind {
    CounterStep {
        node: NodeId,
        target: f64,
        decimal: bool,
        started_at: Option<i64>,
        group: &'static str,
    },
    ParallaxFrame,
    RevealCard {
        node: NodeId,
    },
}

impl TaskKind {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::CounterStep { .. } => "counter-step",
            Self::ParallaxFrame => "parallax-frame",
            Self::RevealCard { .. } => "reveal-card",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) kind: TaskKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
    pub kind: String,
}

#[derive(Debug)]
pub(crate) struct Runtime {
    pub(crate) dom: Dom,
    pub(crate) layout: Layout,
    pub(crate) scroll_y: i64,
    pub(crate) viewport_height: i64,
    pub(crate) now_ms: i64,
    pub(crate) frame_interval_ms: i64,
    pub(crate) task_queue: Vec<ScheduledTask>,
    timer_step_limit: usize,
    next_timer_id: i64,
    next_task_order: i64,
    pub(crate) alert_messages: Vec<String>,
    trace: bool,
    trace_events: bool,
    trace_timers: bool,
    trace_scrolls: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Runtime {
    fn new(dom: Dom, viewport_height: i64) -> Self {
        let layout = Layout::from_dom(&dom);
        Self {
            dom,
            layout,
            scroll_y: 0,
            viewport_height,
            now_ms: 0,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            task_queue: Vec::new(),
            timer_step_limit: 10_000,
            next_timer_id: 1,
            next_task_order: 0,
            alert_messages: Vec::new(),
            trace: false,
            trace_events: true,
            trace_timers: true,
            trace_scrolls: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        }
    }

    pub(crate) fn schedule_timeout(&mut self, delay_ms: i64, kind: TaskKind) -> i64 {
        let delay_ms = delay_ms.max(0);
        let due_at = self.now_ms + delay_ms;
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        let label = kind.label();
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            kind,
        });
        self.trace_timer_line(format!(
            "[timer] schedule timeout id={id} due_at={due_at} delay_ms={delay_ms} kind={label}"
        ));
        id
    }

    // Frames land on the next multiple of the frame interval, never on the
    // current instant.
    pub(crate) fn schedule_frame(&mut self, kind: TaskKind) -> i64 {
        let due_at = self.next_frame_due();
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        let label = kind.label();
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            kind,
        });
        self.trace_timer_line(format!(
            "[timer] schedule frame id={id} due_at={due_at} kind={label}"
        ));
        id
    }

    fn next_frame_due(&self) -> i64 {
        (self.now_ms / self.frame_interval_ms + 1) * self.frame_interval_ms
    }

    pub(crate) fn alert(&mut self, message: &str) {
        self.alert_messages.push(message.to_string());
        self.trace_event_line(format!("[event] alert message={message}"));
    }

    pub(crate) fn node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.dom.attr(node, "id") {
            if !id.is_empty() {
                return format!("#{id}");
            }
        }
        self.dom
            .tag_name(node)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("node-{}", node.0))
    }

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace && self.trace_events {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_timer_line(&mut self, line: String) {
        if self.trace && self.trace_timers {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_scroll_line(&mut self, line: String) {
        if self.trace && self.trace_scrolls {
            self.trace_line(line);
        }
    }

    fn trace_line(&mut self, line: String) {
        if self.trace {
            if self.trace_to_stderr {
                eprintln!("{line}");
            }
            if self.trace_logs.len() >= self.trace_log_limit {
                self.trace_logs.remove(0);
            }
            self.trace_logs.push(line);
        }
    }
}

pub(crate) const DEFAULT_VIEWPORT_HEIGHT: i64 = 800;
pub(crate) const DEFAULT_FRAME_INTERVAL_MS: i64 = 16;

#[derive(Debug)]
pub struct Page {
    runtime: Runtime,
    behaviors: Behaviors,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_viewport(html, DEFAULT_VIEWPORT_HEIGHT)
    }

    pub fn from_html_with_viewport(html: &str, viewport_height: i64) -> Result<Self> {
        if viewport_height <= 0 {
            return Err(Error::Runtime(
                "viewport height must be at least 1 pixel".into(),
            ));
        }
        stacker::grow(32 * 1024 * 1024, || {
            let dom = html::parse_document(html)?;
            let mut runtime = Runtime::new(dom, viewport_height);
            let behaviors = Behaviors::install(&mut runtime)?;
            let mut page = Self { runtime, behaviors };
            page.behaviors.active_nav.update(&mut page.runtime)?;
            page.run_watchers()?;
            Ok(page)
        })
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.runtime.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.runtime.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.runtime.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.runtime.trace_events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.runtime.trace_timers = enabled;
    }

    pub fn set_trace_scrolls(&mut self, enabled: bool) {
        self.runtime.trace_scrolls = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Runtime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.runtime.trace_log_limit = max_entries;
        while self.runtime.trace_logs.len() > self.runtime.trace_log_limit {
            self.runtime.trace_logs.remove(0);
        }
        Ok(())
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Runtime(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.runtime.timer_step_limit = max_steps;
        Ok(())
    }

    pub fn set_frame_interval_ms(&mut self, interval_ms: i64) -> Result<()> {
        if interval_ms < 1 {
            return Err(Error::Runtime(
                "set_frame_interval_ms requires at least 1ms".into(),
            ));
        }
        self.runtime.frame_interval_ms = interval_ms;
        Ok(())
    }

    // Geometry edits re-evaluate the intersection watchers, like a layout
    // change would. Scroll-listener behaviors only react to scrolling.
    pub fn set_viewport_height(&mut self, viewport_height: i64) -> Result<()> {
        if viewport_height <= 0 {
            return Err(Error::Runtime(
                "viewport height must be at least 1 pixel".into(),
            ));
        }
        self.runtime.viewport_height = viewport_height;
        self.run_watchers()
    }

    pub fn set_metrics(&mut self, selector: &str, top: i64, height: i64) -> Result<()> {
        let target = self.select_one(selector)?;
        self.runtime
            .layout
            .set_box(target, ElementBox { top, height });
        self.run_watchers()
    }

    pub fn viewport_height(&self) -> i64 {
        self.runtime.viewport_height
    }

    pub fn scroll_y(&self) -> i64 {
        self.runtime.scroll_y
    }

    pub fn now_ms(&self) -> i64 {
        self.runtime.now_ms
    }

    pub fn scroll_to(&mut self, offset: i64) -> Result<()> {
        self.apply_scroll(offset, "scroll_to")
    }

    pub fn scroll_by(&mut self, delta: i64) -> Result<()> {
        let target = self.runtime.scroll_y.saturating_add(delta);
        self.apply_scroll(target, "scroll_by")
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.runtime.dom.disabled(target) {
            return Ok(());
        }

        let label = self.runtime.node_label(target);
        self.runtime
            .trace_event_line(format!("[event] click target={label}"));

        self.behaviors.menu.on_click(&mut self.runtime, target)?;

        if let Some((offset, source)) = self.behaviors.anchors.resolve(&self.runtime, target) {
            self.apply_scroll(offset, source)?;
        }

        if is_submit_control(&self.runtime.dom, target) {
            if let Some(form) = self.runtime.dom.find_ancestor_by_tag(target, "form") {
                self.submit_form(form)?;
            }
        }

        Ok(())
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.runtime.dom.disabled(target) {
            return Ok(());
        }
        if self.runtime.dom.readonly(target) {
            return Ok(());
        }

        let tag = self
            .runtime
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();

        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.runtime.dom.set_value(target, text)?;
        let label = self.runtime.node_label(target);
        self.runtime
            .trace_event_line(format!("[event] input target={label}"));
        Ok(())
    }

    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;

        let form = if self
            .runtime
            .dom
            .tag_name(target)
            .map(|t| t.eq_ignore_ascii_case("form"))
            .unwrap_or(false)
        {
            Some(target)
        } else {
            self.runtime.dom.find_ancestor_by_tag(target, "form")
        };

        if let Some(form) = form {
            self.submit_form(form)?;
        }

        Ok(())
    }

    fn submit_form(&mut self, form: NodeId) -> Result<()> {
        let label = self.runtime.node_label(form);
        if self.behaviors.contact.handles(form) {
            self.runtime
                .trace_event_line(format!("[event] submit target={label} outcome=handled"));
            self.behaviors.contact.on_submit(&mut self.runtime)?;
        } else {
            self.runtime
                .trace_event_line(format!("[event] submit target={label} outcome=default"));
        }
        Ok(())
    }

    fn apply_scroll(&mut self, target: i64, source: &str) -> Result<()> {
        let from = self.runtime.scroll_y;
        let to = target.max(0);
        self.runtime
            .trace_scroll_line(format!("[scroll] {source} from={from} to={to}"));
        self.runtime.scroll_y = to;

        self.behaviors.navbar.update(&mut self.runtime)?;
        self.behaviors.parallax.request_frame(&mut self.runtime);
        self.behaviors.active_nav.update(&mut self.runtime)?;
        self.run_watchers()
    }

    fn run_watchers(&mut self) -> Result<()> {
        self.behaviors.stat_counters.observe(&mut self.runtime)?;
        self.behaviors.gpa_counters.observe(&mut self.runtime)?;
        self.behaviors.sections.observe(&mut self.runtime)?;
        self.behaviors.cards.observe(&mut self.runtime)
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Runtime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.runtime.now_ms;
        self.runtime.now_ms = self.runtime.now_ms.saturating_add(delta_ms);
        let ran = self.run_due_timers_internal()?;
        self.runtime.trace_timer_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.runtime.now_ms, ran
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.runtime.now_ms {
            return Err(Error::Runtime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.runtime.now_ms
            )));
        }
        let from = self.runtime.now_ms;
        self.runtime.now_ms = target_ms;
        let ran = self.run_due_timers_internal()?;
        self.runtime.trace_timer_line(format!(
            "[timer] advance_to from={} to={} ran_due={}",
            from, self.runtime.now_ms, ran
        ));
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        let from = self.runtime.now_ms;
        let ran = self.run_timer_queue(None, true)?;
        self.runtime.trace_timer_line(format!(
            "[timer] flush from={} to={} ran={}",
            from, self.runtime.now_ms, ran
        ));
        Ok(())
    }

    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(next_idx) = self.next_task_index(None) else {
            self.runtime
                .trace_timer_line("[timer] run_next none".into());
            return Ok(false);
        };

        let task = self.runtime.task_queue.remove(next_idx);
        if task.due_at > self.runtime.now_ms {
            self.runtime.now_ms = task.due_at;
        }
        self.execute_task(task)?;
        Ok(true)
    }

    pub fn run_next_due_timer(&mut self) -> Result<bool> {
        let Some(next_idx) = self.next_task_index(Some(self.runtime.now_ms)) else {
            self.runtime
                .trace_timer_line("[timer] run_next_due none".into());
            return Ok(false);
        };

        let task = self.runtime.task_queue.remove(next_idx);
        self.execute_task(task)?;
        Ok(true)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_due_timers_internal()?;
        self.runtime.trace_timer_line(format!(
            "[timer] run_due now_ms={} ran={}",
            self.runtime.now_ms, ran
        ));
        Ok(ran)
    }

    fn run_due_timers_internal(&mut self) -> Result<usize> {
        self.run_timer_queue(Some(self.runtime.now_ms), false)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.next_task_index(due_limit) {
            steps += 1;
            if steps > self.runtime.timer_step_limit {
                return Err(self.timer_step_limit_error(
                    self.runtime.timer_step_limit,
                    steps,
                    due_limit,
                ));
            }
            let task = self.runtime.task_queue.remove(next_idx);
            if advance_clock && task.due_at > self.runtime.now_ms {
                self.runtime.now_ms = task.due_at;
            }
            self.execute_task(task)?;
        }
        Ok(steps)
    }

    fn timer_step_limit_error(
        &self,
        max_steps: usize,
        steps: usize,
        due_limit: Option<i64>,
    ) -> Error {
        let due_limit_desc = due_limit
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());

        let next_task_desc = self
            .next_task_index(due_limit)
            .and_then(|idx| self.runtime.task_queue.get(idx))
            .map(|task| {
                format!(
                    "id={},due_at={},order={},kind={}",
                    task.id,
                    task.due_at,
                    task.order,
                    task.kind.label()
                )
            })
            .unwrap_or_else(|| "none".into());

        Error::Runtime(format!(
            "flush exceeded max task steps (possible runaway frame loop): limit={max_steps}, steps={steps}, now_ms={}, due_limit={}, pending_tasks={}, next_task={}",
            self.runtime.now_ms,
            due_limit_desc,
            self.runtime.task_queue.len(),
            next_task_desc
        ))
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.runtime
            .task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| {
                if let Some(limit) = due_limit {
                    task.due_at <= limit
                } else {
                    true
                }
            })
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    fn execute_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.runtime.trace_timer_line(format!(
            "[timer] run id={} due_at={} kind={} now_ms={}",
            task.id,
            task.due_at,
            task.kind.label(),
            self.runtime.now_ms
        ));

        match task.kind {
            TaskKind::CounterStep {
                node,
                target,
                decimal,
                started_at,
                group,
            } => behaviors::counters::run_step(
                &mut self.runtime,
                node,
                target,
                decimal,
                started_at,
                group,
            ),
            TaskKind::ParallaxFrame => self.behaviors.parallax.run_frame(&mut self.runtime),
            TaskKind::RevealCard { node } => {
                behaviors::reveal::apply_card(&mut self.runtime, node)
            }
        }
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .runtime
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                kind: task.kind.label().to_string(),
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn take_alert_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.runtime.alert_messages)
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.runtime.dom.class_contains(target, class_name)
    }

    pub fn style(&self, selector: &str, property: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.runtime.dom.style_get(target, property)
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        stacker::grow(32 * 1024 * 1024, || {
            Ok(self.runtime.dom.text_content(target))
        })
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.runtime.dom.value(target)
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.runtime.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.runtime.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.runtime.dom.class_contains(target, class_name)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("class '{class_name}' present={expected}"),
                actual: format!("present={actual}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.runtime.dom.style_get(target, property)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("{property}: {expected}"),
                actual: format!("{property}: {actual}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        stacker::grow(32 * 1024 * 1024, || Ok(self.runtime.dom.dump_node(target)))
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.runtime
            .dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.runtime.dom.dump_node(node_id), 200)
    }
}
