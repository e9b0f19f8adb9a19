use super::*;

const DEFAULT_DOCUMENT_URL: &str = "http://localhost/";
const DOM_CONTENT_LOADED: &str = "DOMContentLoaded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Markup is parsed but `DOMContentLoaded` has not fired yet.
    Loading,
    Interactive,
    Complete,
}

/// A parsed page with its listeners, location and trace log.
#[derive(Debug)]
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) binders: Vec<Rc<PageInteractionBinder>>,
    pub(crate) bind_reports: Vec<BindReport>,
    pub(crate) ready_state: ReadyState,
    pub(crate) location: LocationParts,
    pub(crate) location_navigations: Vec<LocationNavigation>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) trace_state: TraceState,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_url(DEFAULT_DOCUMENT_URL, html)
    }

    pub fn from_html_with_url(url: &str, html: &str) -> Result<Self> {
        let location = LocationParts::parse(url)
            .ok_or_else(|| Error::Runtime(format!("invalid document url: {url}")))?;
        let dom = parse_html(html)?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
            binders: Vec::new(),
            bind_reports: Vec::new(),
            ready_state: ReadyState::Loading,
            location,
            location_navigations: Vec::new(),
            diagnostics: Vec::new(),
            trace_state: TraceState::default(),
        })
    }

    /// Registers `binder` to run when the document structure is ready. On a
    /// page that is already past `DOMContentLoaded` it binds right away.
    pub fn install(&mut self, binder: PageInteractionBinder) {
        let id = BinderId(self.binders.len());
        self.binders.push(Rc::new(binder));

        match self.ready_state {
            ReadyState::Loading => {
                let root = self.dom.root;
                self.listeners.add(
                    root,
                    DOM_CONTENT_LOADED,
                    Listener {
                        action: ListenerAction::BindInteractions(id),
                    },
                );
                self.trace_state
                    .line(format!("[bind] binder {} waits for {DOM_CONTENT_LOADED}", id.0));
            }
            ReadyState::Interactive | ReadyState::Complete => {
                self.run_binder(id);
            }
        }
    }

    /// Runs the bind pass of every installed binder again. Elements bound by
    /// an earlier pass keep their single listener.
    pub fn rebind(&mut self) -> Vec<BindReport> {
        (0..self.binders.len())
            .map(|index| self.run_binder(BinderId(index)))
            .collect()
    }

    fn run_binder(&mut self, id: BinderId) -> BindReport {
        let Some(binder) = self.binders.get(id.0).map(Rc::clone) else {
            return BindReport::default();
        };
        let report = binder.bind(id, self);
        self.trace_state.line(format!(
            "[bind] binder {} added {} listener(s), {} trigger(s) missing",
            id.0,
            report.listeners_added(),
            report.missing_triggers.len()
        ));
        self.bind_reports.push(report.clone());
        report
    }

    /// Reports of every bind pass so far, oldest first.
    pub fn bind_reports(&self) -> &[BindReport] {
        &self.bind_reports
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Marks the structure as parsed and fires `DOMContentLoaded` once.
    pub fn finish_parsing(&mut self) -> Result<()> {
        if self.ready_state != ReadyState::Loading {
            return Ok(());
        }
        self.ready_state = ReadyState::Interactive;
        let root = self.dom.root;
        self.dispatch_event(root, DOM_CONTENT_LOADED);
        Ok(())
    }

    /// Marks all resources as loaded and fires `load`, parsing first if needed.
    pub fn finish_loading(&mut self) -> Result<()> {
        if self.ready_state == ReadyState::Complete {
            return Ok(());
        }
        self.finish_parsing()?;
        self.ready_state = ReadyState::Complete;
        let root = self.dom.root;
        self.dispatch_event(root, "load");
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        stacker::maybe_grow(64 * 1024, 1024 * 1024, || self.click_node(target));
        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event);
        Ok(())
    }

    fn click_node(&mut self, target: NodeId) {
        let navigations_before = self.location_navigations.len();
        let outcome = self.dispatch_event(target, "click");
        if outcome.default_prevented {
            return;
        }

        // A listener already sent the page elsewhere.
        if self.location_navigations[navigations_before..]
            .iter()
            .any(|nav| nav.kind == LocationNavigationKind::HrefSet)
        {
            return;
        }

        let anchor = self.dom.ancestors_inclusive(target).into_iter().find(|node| {
            self.dom.tag_name(*node) == Some("a") && self.dom.attr(*node, "href").is_some()
        });
        if let Some(href) = anchor.and_then(|anchor| self.dom.attr(anchor, "href")) {
            self.follow_hyperlink(&href);
        }
    }

    fn follow_hyperlink(&mut self, href: &str) {
        let resolved = self.location.resolve(href);
        let Some(next) = LocationParts::parse(&resolved) else {
            return;
        };
        let kind = if self.location.is_fragment_only_change(&next) {
            LocationNavigationKind::Fragment
        } else {
            LocationNavigationKind::HrefSet
        };
        self.navigate_location(href, kind);
    }

    pub(crate) fn navigate_location(&mut self, next_url: &str, kind: LocationNavigationKind) {
        let from = self.location.href();
        let to = self.location.resolve(next_url);
        if let Some(parts) = LocationParts::parse(&to) {
            self.location = parts;
        }
        self.trace_state
            .line(format!("[navigate] {kind:?} {from} -> {to}"));
        self.location_navigations
            .push(LocationNavigation { kind, from, to });
    }

    fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> EventState {
        let mut event = EventState::new(event_type, target);

        for node in self.dom.ancestors_inclusive(target) {
            event.current_target = node;
            self.invoke_listeners(node, &mut event);
        }

        let target_label = self.dom.node_label(target);
        self.trace_state.event_line(format!(
            "[event] done {} target={} default_prevented={}",
            event.event_type, target_label, event.default_prevented
        ));
        event
    }

    fn invoke_listeners(&mut self, node_id: NodeId, event: &mut EventState) {
        for listener in self.listeners.get(node_id, &event.event_type) {
            if self.trace_state.enabled {
                let target_label = self.dom.node_label(event.target);
                let current_label = self.dom.node_label(event.current_target);
                self.trace_state.event_line(format!(
                    "[event] {} target={} current={}",
                    event.event_type, target_label, current_label
                ));
            }
            self.run_listener(&listener.action, event);
        }
    }

    fn run_listener(&mut self, action: &ListenerAction, event: &mut EventState) {
        match action {
            ListenerAction::BindInteractions(id) => {
                self.run_binder(*id);
            }
            ListenerAction::Navigate { destination } => {
                self.navigate_location(destination, LocationNavigationKind::HrefSet);
            }
            ListenerAction::ToggleReplyForm(id) => {
                let Some(binder) = self.binders.get(id.0).map(Rc::clone) else {
                    return;
                };
                match binder.toggle_reply(self, event.current_target) {
                    Ok(_) => {
                        if binder.prevents_reply_default() {
                            event.default_prevented = true;
                        }
                    }
                    Err(error) => self.report_diagnostic(event, error),
                }
            }
        }
    }

    fn report_diagnostic(&mut self, event: &EventState, error: ToggleError) {
        let diagnostic = Diagnostic {
            event_type: event.event_type.clone(),
            element: self.dom.node_label(event.current_target),
            error,
        };
        self.trace_state.line(format!("[diagnostic] {diagnostic}"));
        self.diagnostics.push(diagnostic);
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn url(&self) -> String {
        self.location.href()
    }

    pub fn take_location_navigations(&mut self) -> Vec<LocationNavigation> {
        std::mem::take(&mut self.location_navigations)
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.dom.query_selector(selector)?.is_some())
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, &name.to_ascii_lowercase()))
    }

    pub fn set_attr(&mut self, selector: &str, name: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dom.set_attr(target, &name.to_ascii_lowercase(), value)
    }

    pub fn inline_style(&self, selector: &str, property: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.inline_style(target, property))
    }

    pub fn visibility(&self, selector: &str) -> Result<Visibility> {
        let display = self.inline_style(selector, "display")?;
        Ok(Visibility::from_inline_display(display.as_deref()))
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    /// Outer HTML of the first match.
    pub fn dump(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    /// Parses `html` and appends the resulting nodes to the first match.
    pub fn append_html(&mut self, selector: &str, html: &str) -> Result<()> {
        let parent = self.select_one(selector)?;
        let fragment = parse_html(html)?;
        let children = fragment
            .node(fragment.root)
            .map(|root| root.children.clone())
            .unwrap_or_default();
        for child in children {
            self.dom.import_subtree(&fragment, child, parent);
        }
        Ok(())
    }

    /// Listeners for `event` on the first match.
    pub fn listener_count(&self, selector: &str, event: &str) -> Result<usize> {
        let target = self.select_one(selector)?;
        Ok(self.listeners.count(target, event))
    }

    /// Listeners for `event` across the whole document.
    pub fn total_listener_count(&self, event: &str) -> usize {
        self.listeners.total(event)
    }

    /// Drops every listener, including pending `DOMContentLoaded` binders.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector).map(|_| ())
    }

    pub fn assert_inline_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.inline_style(target, property).unwrap_or_default();
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: format!("{selector} {property}"),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.dom.dump_node(target),
            });
        }
        Ok(())
    }

    pub fn assert_visibility(&self, selector: &str, expected: Visibility) -> Result<()> {
        let actual = self.visibility(selector)?;
        if actual != expected {
            let target = self.select_one(selector)?;
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.dom.dump_node(target),
            });
        }
        Ok(())
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_state.enabled = enabled;
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_state.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_state.events = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        self.trace_state.set_log_limit(max_entries)
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace_state.take()
    }
}
