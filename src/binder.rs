use super::*;
use fancy_regex::Regex;

const DEFAULT_REPLY_HREF_PREFIX: &str = "#reply_";

/// Index of a binder installed on a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BinderId(pub(crate) usize);

/// A trigger element id and the path its click navigates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationBinding {
    pub element_id: String,
    pub destination: String,
}

impl NavigationBinding {
    pub fn new(element_id: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            destination: destination.into(),
        }
    }
}

/// How a reply anchor's `href` names the comment it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyHref {
    /// The comment id is whatever follows this literal prefix.
    Prefix(String),
    /// The comment id is the `id` capture group of this pattern.
    Pattern(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderConfig {
    pub navigations: Vec<NavigationBinding>,
    pub reply_class: String,
    pub reply_href: ReplyHref,
    pub reply_form_id_prefix: String,
    /// `display` value written when a reply form is shown.
    pub shown_display: String,
    /// Keep the anchor's own fragment navigation from running after a toggle.
    pub prevent_reply_default: bool,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            navigations: vec![
                NavigationBinding::new("login_in", "/login/"),
                NavigationBinding::new("registration_in", "/registration/"),
                NavigationBinding::new("submit_comments", "/blog/"),
            ],
            reply_class: "reply".to_string(),
            reply_href: ReplyHref::Prefix(DEFAULT_REPLY_HREF_PREFIX.to_string()),
            reply_form_id_prefix: "reply_form_".to_string(),
            shown_display: "block".to_string(),
            prevent_reply_default: false,
        }
    }
}

impl BinderConfig {
    fn validate(&self) -> Result<()> {
        for binding in &self.navigations {
            if binding.element_id.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "navigation binding has an empty element id".into(),
                ));
            }
            if binding.destination.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "navigation binding for #{} has an empty destination",
                    binding.element_id
                )));
            }
        }
        if self.reply_class.trim().is_empty() || self.reply_class.contains(char::is_whitespace) {
            return Err(Error::InvalidConfig(format!(
                "reply class must be a single class name, got {:?}",
                self.reply_class
            )));
        }
        if self.reply_form_id_prefix.is_empty() {
            return Err(Error::InvalidConfig("reply form id prefix is empty".into()));
        }
        let shown = self.shown_display.trim();
        if shown.is_empty() || shown.eq_ignore_ascii_case("none") {
            return Err(Error::InvalidConfig(format!(
                "shown display value must make the form visible, got {:?}",
                self.shown_display
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum ReplyHrefMatcher {
    Prefix(String),
    Pattern(Regex),
}

impl ReplyHrefMatcher {
    fn compile(reply_href: &ReplyHref) -> Result<Self> {
        match reply_href {
            ReplyHref::Prefix(prefix) if prefix.is_empty() => Err(Error::InvalidConfig(
                "reply href prefix is empty".into(),
            )),
            ReplyHref::Prefix(prefix) => Ok(Self::Prefix(prefix.clone())),
            ReplyHref::Pattern(pattern) => {
                let regex = Regex::new(pattern).map_err(|err| {
                    Error::InvalidConfig(format!("reply href pattern {pattern:?}: {err}"))
                })?;
                if !regex.capture_names().any(|name| name == Some("id")) {
                    return Err(Error::InvalidConfig(format!(
                        "reply href pattern {pattern:?} has no `id` group"
                    )));
                }
                Ok(Self::Pattern(regex))
            }
        }
    }

    fn comment_id(&self, href: &str) -> Option<String> {
        let id = match self {
            Self::Prefix(prefix) => href.strip_prefix(prefix.as_str())?.to_string(),
            Self::Pattern(regex) => {
                let captures = regex.captures(href).ok()??;
                captures.name("id")?.as_str().to_string()
            }
        };
        (!id.is_empty()).then_some(id)
    }
}

/// Shown/hidden state of a reply form, decoupled from the raw style string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    /// Reads an inline `display` value. `none` hides; any other value shows;
    /// a form without an inline `display` counts as collapsed. A trailing
    /// `!important` is not part of the value.
    pub fn from_inline_display(display: Option<&str>) -> Self {
        match display.map(strip_important_priority) {
            Some(value) if value.eq_ignore_ascii_case("none") => Self::Hidden,
            Some(value) if !value.is_empty() => Self::Shown,
            _ => Self::Hidden,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Shown => Self::Hidden,
            Self::Hidden => Self::Shown,
        }
    }

    pub fn is_shown(self) -> bool {
        self == Self::Shown
    }
}

fn strip_important_priority(value: &str) -> &str {
    let value = value.trim();
    let Some(bang) = value.rfind('!') else {
        return value;
    };
    if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
        value[..bang].trim_end()
    } else {
        value
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shown => "shown",
            Self::Hidden => "hidden",
        })
    }
}

/// Why a reply toggle left the page untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleError {
    /// The anchor's `href` is absent or does not name a comment.
    MalformedHref { href: Option<String> },
    /// No element carries the derived form id.
    MissingTarget { form_id: String },
}

impl fmt::Display for ToggleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHref { href: Some(href) } => {
                write!(f, "reply href {href:?} does not name a comment")
            }
            Self::MalformedHref { href: None } => write!(f, "reply anchor has no href"),
            Self::MissingTarget { form_id } => write!(f, "no element with id {form_id}"),
        }
    }
}

impl StdError for ToggleError {}

/// Outcome of one bind pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Trigger ids that received a navigation listener in this pass.
    pub navigations_bound: Vec<String>,
    /// Trigger ids absent from the document.
    pub missing_triggers: Vec<String>,
    /// Reply anchors that received a toggle listener in this pass.
    pub reply_toggles_bound: usize,
    /// Elements skipped because an earlier pass already bound them.
    pub already_bound: usize,
}

impl BindReport {
    pub fn listeners_added(&self) -> usize {
        self.navigations_bound.len() + self.reply_toggles_bound
    }
}

/// Attaches the navigation and reply-toggle listeners to a page once its
/// structure is parsed. Install it with [`Page::install`].
#[derive(Debug, Clone)]
pub struct PageInteractionBinder {
    config: BinderConfig,
    reply_href: ReplyHrefMatcher,
}

impl Default for PageInteractionBinder {
    fn default() -> Self {
        Self {
            config: BinderConfig::default(),
            reply_href: ReplyHrefMatcher::Prefix(DEFAULT_REPLY_HREF_PREFIX.to_string()),
        }
    }
}

impl PageInteractionBinder {
    pub fn new(config: BinderConfig) -> Result<Self> {
        config.validate()?;
        let reply_href = ReplyHrefMatcher::compile(&config.reply_href)?;
        Ok(Self { config, reply_href })
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Comment id named by a reply anchor's `href`, if any.
    pub fn comment_id(&self, href: &str) -> Option<String> {
        self.reply_href.comment_id(href)
    }

    pub(crate) fn bind(&self, id: BinderId, page: &mut Page) -> BindReport {
        let mut report = BindReport::default();

        for binding in &self.config.navigations {
            let Some(node) = page.dom.by_id(&binding.element_id) else {
                page.trace_state.line(format!(
                    "[bind] skip #{}: not in document",
                    binding.element_id
                ));
                report.missing_triggers.push(binding.element_id.clone());
                continue;
            };
            let listener = Listener {
                action: ListenerAction::Navigate {
                    destination: binding.destination.clone(),
                },
            };
            if page.listeners.add(node, "click", listener) {
                page.trace_state.line(format!(
                    "[bind] #{} click -> {}",
                    binding.element_id, binding.destination
                ));
                report.navigations_bound.push(binding.element_id.clone());
            } else {
                report.already_bound += 1;
            }
        }

        for anchor in page.dom.elements_by_class_name(&self.config.reply_class) {
            // One toggle per anchor, whichever binder attached it.
            let toggled = page.listeners.get(anchor, "click").iter().any(|listener| {
                matches!(listener.action, ListenerAction::ToggleReplyForm(_))
            });
            let listener = Listener {
                action: ListenerAction::ToggleReplyForm(id),
            };
            if !toggled && page.listeners.add(anchor, "click", listener) {
                let label = page.dom.node_label(anchor);
                page.trace_state
                    .line(format!("[bind] {label} click -> toggle reply form"));
                report.reply_toggles_bound += 1;
            } else {
                report.already_bound += 1;
            }
        }

        report
    }

    /// Flips the reply form paired with `anchor` and returns its new state.
    pub(crate) fn toggle_reply(
        &self,
        page: &mut Page,
        anchor: NodeId,
    ) -> std::result::Result<Visibility, ToggleError> {
        let href = page.dom.attr(anchor, "href");
        let comment_id = href
            .as_deref()
            .and_then(|href| self.comment_id(href))
            .ok_or_else(|| ToggleError::MalformedHref { href: href.clone() })?;

        let form_id = format!("{}{}", self.config.reply_form_id_prefix, comment_id);
        let form = page
            .dom
            .by_id(&form_id)
            .and_then(|form| page.dom.element_mut(form))
            .ok_or_else(|| ToggleError::MissingTarget {
                form_id: form_id.clone(),
            })?;

        let current = Visibility::from_inline_display(form.inline_style("display").as_deref());
        let next = current.toggled();
        let display = match next {
            Visibility::Shown => self.config.shown_display.as_str(),
            Visibility::Hidden => "none",
        };
        form.set_inline_style("display", display);

        page.trace_state
            .line(format!("[toggle] #{form_id} {current} -> {next}"));
        Ok(next)
    }

    pub(crate) fn prevents_reply_default(&self) -> bool {
        self.config.prevent_reply_default
    }
}
