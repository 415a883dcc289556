//! Host window state: scroll position, location and navigation.
//!
//! Nothing here leaves the process. Navigations (form submissions and
//! reloads) are recorded so the driver and the tests can see exactly what the
//! page asked the browser to do.

use serde::Serialize;
use url::Url;

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

/// One recorded `window.scrollTo` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollCall {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// A form navigation, captured at the moment the form was submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    #[serde(skip)]
    pub form: NodeId,
    pub form_class: Option<String>,
    pub method: String,
    pub action: String,
    pub fields: Vec<(String, String)>,
    /// Whether the loading overlay was on screen when the browser left.
    pub overlay_visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Window {
    location: Option<Url>,
    scroll_y: f64,
    scroll_calls: Vec<ScrollCall>,
    submissions: Vec<Submission>,
    reloads: u32,
}

impl Window {
    pub fn new(location: Option<Url>) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    /// Resolve a form `action` the way the browser does. Without a known
    /// location the raw action is returned untouched.
    pub fn resolve(&self, action: &str) -> String {
        match &self.location {
            Some(base) => base
                .join(action)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| action.to_string()),
            None => action.to_string(),
        }
    }

    pub fn page_y_offset(&self) -> f64 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.scroll_y = top.max(0.0);
        self.scroll_calls.push(ScrollCall {
            top: self.scroll_y,
            behavior,
        });
    }

    pub fn scroll_calls(&self) -> &[ScrollCall] {
        &self.scroll_calls
    }

    pub fn record_submission(&mut self, submission: Submission) {
        self.submissions.push(submission);
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn record_reload(&mut self) {
        self.reloads += 1;
    }

    pub fn reloads(&self) -> u32 {
        self.reloads
    }
}
