//! Click bindings for server-rendered pages.
//!
//! A [`Page`] holds a parsed document together with its listeners, location
//! and trace log. A [`PageInteractionBinder`] is installed on the page and,
//! once the document structure is ready, attaches:
//!
//! * navigation listeners to fixed trigger elements (`login_in`,
//!   `registration_in`, `submit_comments` by default), and
//! * reply toggles to every `.reply` anchor, flipping the visibility of the
//!   matching `reply_form_<id>` container.
//!
//! ```
//! use page_binder::{Page, PageInteractionBinder};
//!
//! # fn main() -> page_binder::Result<()> {
//! let mut page = Page::from_html_with_url(
//!     "https://coffee.local/blog/7/",
//!     r#"<button id="login_in">Sign in</button>"#,
//! )?;
//! page.install(PageInteractionBinder::default());
//! page.finish_parsing()?;
//!
//! page.click("#login_in")?;
//! assert_eq!(page.url(), "https://coffee.local/login/");
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt;
use std::rc::Rc;

mod binder;
mod core_dom_utils;
mod dom;
mod events;
mod html;
mod location;
mod page;
mod selector;
mod trace;

pub use binder::{
    BindReport, BinderConfig, NavigationBinding, PageInteractionBinder, ReplyHref, ToggleError,
    Visibility,
};
pub use events::Diagnostic;
pub use location::{LocationNavigation, LocationNavigationKind};
pub use page::{Page, ReadyState};

pub(crate) use binder::BinderId;
pub(crate) use core_dom_utils::*;
pub(crate) use dom::{Dom, Element, NodeId};
pub(crate) use events::{EventState, Listener, ListenerAction, ListenerStore};
pub(crate) use html::parse_html;
pub(crate) use location::LocationParts;
pub(crate) use trace::TraceState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    InvalidConfig(String),
    Runtime(String),
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
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::InvalidConfig(msg) => write!(f, "invalid binder config: {msg}"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
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
