//! The page controller.
//!
//! [`PageController`] owns the document, the window, the listener registry
//! and the single piece of shared mutable state the page has: the refresh
//! in-flight flag. Everything runs on one thread; timers and the refresh
//! request are `spawn_local` tasks, so a controller must be started inside a
//! [`tokio::task::LocalSet`].
//!
//! # Lifecycle
//!
//! 1. [`PageController::start`] installs the style sheets, processes the
//!    wiring tables, starts the refresh timer and adds the scroll-to-top
//!    button.
//! 2. Host events arrive through [`PageController::dispatch`] or the
//!    convenience drivers (`click`, `change`, `submit`, ...).
//! 3. `beforeunload` (or [`PageController::stop`]) cancels the timer.
//!
//! A page element that is missing simply leaves its feature inactive.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::task::{JoinHandle, spawn_local};
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::{debug, error, info, instrument};

use crate::config::PageConfig;
use crate::dom::{Document, NodeId, Selector};
use crate::error::SelectorError;
use crate::events::{
    EXTRAS_WIRING, Event, EventTarget, EventType, Handler, ListenerRegistry, READY_WIRING, Scope,
    Wiring,
};
use crate::styles::StyleSheet;
use crate::transport::Transport;
use crate::utils::{is_suggestion_query, normalize_keyword, truncate_for_log};
use crate::window::{ScrollBehavior, Submission, Window};

pub const REFRESH_ERROR_MESSAGE: &str = "Error refreshing news. Please try again.";
pub const SEARCH_KEYWORD_WARNING: &str = "Please enter a search keyword";
pub const IMAGE_PLACEHOLDER_ALT: &str = "No image available";
pub const IMAGE_PLACEHOLDER: &str = "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iMzAwIiBoZWlnaHQ9IjIwMCIgeG1sbnM9Imh0dHA6Ly93d3cudzMub3JnLzIwMDAvc3ZnIj48cmVjdCB3aWR0aD0iMTAwJSIgaGVpZ2h0PSIxMDAlIiBmaWxsPSIjZjVmNWY1Ii8+PHRleHQgeD0iNTAlIiB5PSI1MCUiIGZvbnQtZmFtaWx5PSJBcmlhbCwgc2Fucy1zZXJpZiIgZm9udC1zaXplPSIxNCIgZmlsbD0iIzk5OTk5OSIgdGV4dC1hbmNob3I9Im1pZGRsZSIgZHk9Ii4zZW0iPk5vIEltYWdlPC90ZXh0Pjwvc3ZnPg==";

const OVERLAY_HTML: &str =
    r#"<div class="loading-spinner"><div class="loading"></div><p>Loading news...</p></div>"#;
const BUTTON_LOADING_HTML: &str = r#"<div class="loading"></div> Loading..."#;
const SCROLL_BUTTON_HTML: &str = r#"<i class="fas fa-arrow-up"></i>"#;

fn static_selector(s: &str) -> Selector {
    Selector::parse(s).expect("static selector")
}

static FORM: Lazy<Selector> = Lazy::new(|| static_selector("form"));
static FILTER_FORM: Lazy<Selector> = Lazy::new(|| static_selector(".filter-form"));
static REFRESH_FORM: Lazy<Selector> = Lazy::new(|| static_selector(".refresh-form"));
static KEYWORD_INPUT: Lazy<Selector> = Lazy::new(|| static_selector(r#"input[name="keyword"]"#));
static NAV: Lazy<Selector> = Lazy::new(|| static_selector(".nav"));
static MENU_BUTTON: Lazy<Selector> = Lazy::new(|| static_selector(".mobile-menu-btn"));
static LOADING_OVERLAY: Lazy<Selector> = Lazy::new(|| static_selector(".loading-overlay"));
static NOTIFICATION: Lazy<Selector> = Lazy::new(|| static_selector(".notification"));
static NOTIFICATION_MESSAGE: Lazy<Selector> =
    Lazy::new(|| static_selector(".notification-message"));
static SCROLL_BUTTON: Lazy<Selector> = Lazy::new(|| static_selector(".scroll-to-top"));

/// Accent of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::Info,
        NotificationKind::Warning,
        NotificationKind::Error,
        NotificationKind::Success,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
            NotificationKind::Success => "success",
        }
    }
}

/// A notification currently on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationSummary {
    pub kind: NotificationKind,
    pub message: String,
}

/// Point-in-time view of everything observable about the page.
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub submissions: Vec<Submission>,
    pub reloads: u32,
    pub notifications: Vec<NotificationSummary>,
    pub overlay_visible: bool,
    pub refresh_in_flight: bool,
    pub auto_refresh_active: bool,
    pub scroll_button_shown: bool,
    pub scroll_y: f64,
}

pub struct PageController<T> {
    document: RefCell<Document>,
    window: RefCell<Window>,
    listeners: RefCell<ListenerRegistry>,
    transport: T,
    config: PageConfig,
    /// At most one refresh request is in flight while this is set.
    loading: Cell<bool>,
    refresh_timer: RefCell<Option<JoinHandle<()>>>,
    styles_installed: Cell<bool>,
    started: Cell<bool>,
}

impl<T> Drop for PageController<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh_timer.get_mut().take() {
            handle.abort();
        }
    }
}

impl<T: Transport + 'static> PageController<T> {
    /// Build a controller over an already parsed page.
    ///
    /// Nothing is wired until [`PageController::start`] runs.
    ///
    /// # Arguments
    ///
    /// * `document` - The page markup, usually from [`Document::parse`]
    /// * `window` - Host window state; its location resolves form actions
    /// * `transport` - Where the refresh form is posted
    /// * `config` - Timer periods and thresholds
    pub fn new(document: Document, window: Window, transport: T, config: PageConfig) -> Rc<Self> {
        Rc::new(Self {
            document: RefCell::new(document),
            window: RefCell::new(window),
            listeners: RefCell::new(ListenerRegistry::default()),
            transport,
            config,
            loading: Cell::new(false),
            refresh_timer: RefCell::new(None),
            styles_installed: Cell::new(false),
            started: Cell::new(false),
        })
    }

    // --- accessors ---

    /// Borrow the document. Drop the guard before driving another event.
    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    /// Borrow the window: scroll offset, submissions and reloads so far.
    pub fn window(&self) -> Ref<'_, Window> {
        self.window.borrow()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Whether a refresh request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// Whether the refresh timer is still scheduled.
    pub fn is_auto_refresh_active(&self) -> bool {
        self.refresh_timer
            .borrow()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Number of registered listeners, toast close buttons included.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// First element matching `selector`.
    pub fn find(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self.document.borrow().query_selector(&selector))
    }

    /// Whether at least one loading overlay is attached to the page.
    pub fn overlay_visible(&self) -> bool {
        self.document.borrow().query_selector(&LOADING_OVERLAY).is_some()
    }

    /// Notifications on the page, oldest first.
    ///
    /// # Returns
    ///
    /// One [`NotificationSummary`] per attached toast. A toast whose accent
    /// class is unrecognized reports [`NotificationKind::Info`].
    pub fn notifications(&self) -> Vec<NotificationSummary> {
        let doc = self.document.borrow();
        doc.query_selector_all(&NOTIFICATION)
            .into_iter()
            .map(|n| {
                let kind = NotificationKind::ALL
                    .into_iter()
                    .find(|k| doc.has_class(n, &format!("notification-{}", k.as_str())))
                    .unwrap_or(NotificationKind::Info);
                let message = doc
                    .query_selector_within(n, &NOTIFICATION_MESSAGE)
                    .map(|m| doc.text_content(m))
                    .unwrap_or_default();
                NotificationSummary { kind, message }
            })
            .collect()
    }

    /// Capture the observable page state for the driver's JSON report.
    pub fn snapshot(&self) -> PageSnapshot {
        let window = self.window.borrow();
        let scroll_button_shown = {
            let doc = self.document.borrow();
            doc.query_selector(&SCROLL_BUTTON)
                .is_some_and(|btn| doc.has_class(btn, "show"))
        };
        PageSnapshot {
            submissions: window.submissions().to_vec(),
            reloads: window.reloads(),
            notifications: self.notifications(),
            overlay_visible: self.overlay_visible(),
            refresh_in_flight: self.is_loading(),
            auto_refresh_active: self.is_auto_refresh_active(),
            scroll_button_shown,
            scroll_y: window.page_y_offset(),
        }
    }

    // --- lifecycle ---

    /// Wire every behavior against the current markup. Calling it again is
    /// a no-op.
    #[instrument(level = "info", skip_all)]
    pub fn start(self: &Rc<Self>) -> Result<(), SelectorError> {
        if self.started.replace(true) {
            debug!("page controller already started");
            return Ok(());
        }

        self.install_styles();
        self.wire(READY_WIRING)?;
        self.start_auto_refresh();
        self.add_scroll_to_top_button();
        self.wire(EXTRAS_WIRING)?;

        info!(
            listeners = self.listener_count(),
            auto_refresh = self.is_auto_refresh_active(),
            "page controller initialized"
        );
        Ok(())
    }

    /// Cancel the refresh timer. An in-flight request is left to settle.
    pub fn stop(&self) {
        if let Some(handle) = self.refresh_timer.borrow_mut().take() {
            handle.abort();
            info!("auto-refresh timer cancelled");
        }
    }

    fn wire(&self, table: &[Wiring]) -> Result<(), SelectorError> {
        let rows = {
            let doc = self.document.borrow();
            let mut rows = Vec::new();
            for row in table {
                let targets: Vec<EventTarget> = match row.scope {
                    Scope::First(s) => doc
                        .query_selector(&Selector::parse(s)?)
                        .map(EventTarget::Node)
                        .into_iter()
                        .collect(),
                    Scope::All(s) => doc
                        .query_selector_all(&Selector::parse(s)?)
                        .into_iter()
                        .map(EventTarget::Node)
                        .collect(),
                    Scope::Within {
                        container,
                        selector,
                    } => {
                        let container = Selector::parse(container)?;
                        let selector = Selector::parse(selector)?;
                        match doc.query_selector(&container) {
                            Some(scope) => doc
                                .query_selector_all_within(scope, &selector)
                                .into_iter()
                                .map(EventTarget::Node)
                                .collect(),
                            None => Vec::new(),
                        }
                    }
                    Scope::Document => vec![EventTarget::Document],
                    Scope::Window => vec![EventTarget::Window],
                };
                rows.extend(targets.into_iter().map(|t| (t, row.event, row.handler)));
            }
            rows
        };

        let mut listeners = self.listeners.borrow_mut();
        for (target, event, handler) in rows {
            listeners.add(target, event, handler);
        }
        Ok(())
    }

    /// Inject the reserved style sheets. Runs its body once per controller.
    fn install_styles(&self) {
        if self.styles_installed.replace(true) {
            return;
        }
        let mut doc = self.document.borrow_mut();
        let Some(parent) = doc.head().or_else(|| doc.body()) else {
            return;
        };
        for sheet in StyleSheet::ALL {
            if doc.get_element_by_id(sheet.id()).is_some() {
                continue;
            }
            let style = doc.create_element("style");
            doc.set_attr(style, "id", sheet.id());
            let css = doc.create_text(sheet.css());
            doc.append_child(style, css);
            doc.append_child(parent, style);
        }
    }

    fn start_auto_refresh(self: &Rc<Self>) {
        if !self.config.auto_refresh {
            info!("auto-refresh disabled");
            return;
        }
        let period = self.config.refresh_period();
        let weak = Rc::downgrade(self);
        let handle = spawn_local(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(this) = weak.upgrade() else {
                    break;
                };
                if !this.loading.get() {
                    this.refresh_news();
                }
            }
        });
        if let Some(previous) = self.refresh_timer.borrow_mut().replace(handle) {
            previous.abort();
        }
    }

    // --- dispatch ---

    /// Deliver an event and run the default action unless a listener
    /// cancelled it. Returns `false` when the default was prevented.
    pub fn dispatch(self: &Rc<Self>, kind: EventType, target: EventTarget) -> bool {
        let mut event = Event::new(kind, target);
        for current in self.propagation_path(kind, target) {
            let handlers = self.listeners.borrow().handlers_for(current, kind);
            for handler in handlers {
                self.run(handler, &mut event, current);
            }
        }

        let proceed = !event.default_prevented();
        if proceed {
            self.default_action(&event);
        }
        proceed
    }

    fn propagation_path(&self, kind: EventType, target: EventTarget) -> Vec<EventTarget> {
        match target {
            EventTarget::Window => vec![EventTarget::Window],
            EventTarget::Document if kind.bubbles() => {
                vec![EventTarget::Document, EventTarget::Window]
            }
            EventTarget::Document => vec![EventTarget::Document],
            EventTarget::Node(id) => {
                let doc = self.document.borrow();
                if !doc.is_connected(id) {
                    return Vec::new();
                }
                if !kind.bubbles() {
                    return vec![target];
                }
                let mut path = Vec::new();
                let mut current = Some(id);
                while let Some(node) = current {
                    if doc.is_element(node) {
                        path.push(EventTarget::Node(node));
                    }
                    current = doc.parent(node);
                }
                path.push(EventTarget::Document);
                path.push(EventTarget::Window);
                path
            }
        }
    }

    fn run(self: &Rc<Self>, handler: Handler, event: &mut Event, current: EventTarget) {
        match handler {
            Handler::FilterFormSubmit => self.show_loading_state(),
            Handler::FilterSelectChange => self.on_filter_change(current),
            Handler::RefreshClick => {
                event.prevent_default();
                self.refresh_news();
            }
            Handler::SearchSubmit => self.on_search_submit(event, current),
            Handler::SearchInput => self.on_search_input(current),
            Handler::MenuToggle => self.on_menu_toggle(),
            Handler::OutsideClick => self.on_outside_click(event.target()),
            Handler::ButtonLoading => self.on_button_click(current),
            Handler::ImageError => self.on_image_error(current),
            Handler::ScrollToggle => self.on_scroll(),
            Handler::ScrollToTop => self.scroll_to_top(),
            Handler::CloseNotification => self.on_notification_close(current),
            Handler::Teardown => self.stop(),
        }
    }

    fn default_action(self: &Rc<Self>, event: &Event) {
        let Some(node) = event.target().node() else {
            return;
        };
        match event.kind() {
            EventType::Click => {
                let form = {
                    let doc = self.document.borrow();
                    if doc.is_submit_control(node) {
                        doc.closest(node, &FORM)
                    } else {
                        None
                    }
                };
                if let Some(form) = form {
                    self.dispatch(EventType::Submit, EventTarget::Node(form));
                }
            }
            EventType::Submit => self.submit_form(node),
            _ => {}
        }
    }

    // --- host drivers ---

    /// User click. Disabled controls swallow the click, as in a browser.
    pub fn click(self: &Rc<Self>, node: NodeId) -> bool {
        {
            let doc = self.document.borrow();
            if doc.control_type(node).is_some() && doc.is_disabled(node) {
                debug!(node = node.index(), "click on disabled control ignored");
                return false;
            }
        }
        self.dispatch(EventType::Click, EventTarget::Node(node))
    }

    /// Set a control's value and fire `change`, as when the user picks an
    /// option.
    ///
    /// # Arguments
    ///
    /// * `node` - A `select`, `input` or `textarea`
    /// * `value` - The new value
    ///
    /// # Returns
    ///
    /// `false` if a listener prevented the default action.
    pub fn change(self: &Rc<Self>, node: NodeId, value: &str) -> bool {
        self.document.borrow_mut().set_value(node, value);
        self.dispatch(EventType::Change, EventTarget::Node(node))
    }

    /// Set a control's value and fire `input`, as on each keystroke.
    pub fn input(self: &Rc<Self>, node: NodeId, value: &str) -> bool {
        self.document.borrow_mut().set_value(node, value);
        self.dispatch(EventType::Input, EventTarget::Node(node))
    }

    /// User-initiated submission (Enter in a field), which fires `submit`.
    pub fn submit(self: &Rc<Self>, form: NodeId) -> bool {
        self.dispatch(EventType::Submit, EventTarget::Node(form))
    }

    /// Scroll the window to `y` and fire `scroll`. Negative offsets clamp
    /// to zero.
    pub fn scroll_to(self: &Rc<Self>, y: f64) {
        self.window.borrow_mut().scroll_to(y, ScrollBehavior::Auto);
        self.dispatch(EventType::Scroll, EventTarget::Window);
    }

    /// Report that `img` failed to load by firing `error` on it.
    pub fn image_failed(self: &Rc<Self>, img: NodeId) -> bool {
        self.dispatch(EventType::Error, EventTarget::Node(img))
    }

    /// Fire `beforeunload` on the window, which tears the page down.
    pub fn unload(self: &Rc<Self>) {
        self.dispatch(EventType::BeforeUnload, EventTarget::Window);
    }

    /// Tear the page down and record a reload.
    pub fn reload(self: &Rc<Self>) {
        self.unload();
        self.window.borrow_mut().record_reload();
        info!("page reloaded");
    }

    /// Navigate with `form` without firing `submit`, like `form.submit()`.
    pub fn submit_form(&self, form: NodeId) {
        let submission = {
            let doc = self.document.borrow();
            if doc.tag(form) != Some("form") || !doc.is_connected(form) {
                return;
            }
            let action = doc.attr(form, "action").unwrap_or_default();
            Submission {
                form,
                form_class: doc.attr(form, "class").map(str::to_string),
                method: doc
                    .attr(form, "method")
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_else(|| "get".to_string()),
                action: self.window.borrow().resolve(action),
                fields: doc.form_data(form),
                overlay_visible: doc.query_selector(&LOADING_OVERLAY).is_some(),
            }
        };
        info!(
            action = %submission.action,
            method = %submission.method,
            fields = submission.fields.len(),
            "form submitted"
        );
        self.window.borrow_mut().record_submission(submission);
    }

    // --- refresh ---

    /// Refresh the listing unless a refresh is already in flight.
    #[instrument(level = "info", skip_all)]
    pub fn refresh_news(self: &Rc<Self>) {
        if self.loading.get() {
            debug!("refresh already in flight; skipping");
            return;
        }
        self.loading.set(true);
        self.show_loading_state();

        let request = {
            let doc = self.document.borrow();
            doc.query_selector(&REFRESH_FORM).map(|form| {
                let action = doc.attr(form, "action").unwrap_or_default();
                (self.window.borrow().resolve(action), doc.form_data(form))
            })
        };
        let Some((url, fields)) = request else {
            self.hide_loading_state();
            self.loading.set(false);
            return;
        };

        info!(%url, fields = fields.len(), "refreshing news");
        let this = Rc::clone(self);
        spawn_local(async move { this.complete_refresh(url, fields).await });
    }

    async fn complete_refresh(self: Rc<Self>, url: String, fields: Vec<(String, String)>) {
        match self.transport.post_form(&url, &fields).await {
            Ok(body) => {
                info!(bytes = body.len(), "refresh succeeded; reloading page");
                self.reload();
            }
            Err(e) => {
                error!(error = %e, %url, "Error refreshing news");
                self.hide_loading_state();
                self.show_notification(REFRESH_ERROR_MESSAGE, NotificationKind::Error);
            }
        }
        self.loading.set(false);
    }

    // --- loading and notifications ---

    /// Append a full-viewport overlay. Each call adds one overlay.
    pub fn show_loading_state(&self) {
        self.install_styles();
        let mut doc = self.document.borrow_mut();
        let Some(body) = doc.body() else {
            return;
        };
        let overlay = doc.create_element("div");
        doc.set_attr(overlay, "class", "loading-overlay");
        doc.set_inner_html(overlay, OVERLAY_HTML);
        doc.append_child(body, overlay);
    }

    /// Remove the first overlay, if any.
    pub fn hide_loading_state(&self) {
        let mut doc = self.document.borrow_mut();
        if let Some(overlay) = doc.query_selector(&LOADING_OVERLAY) {
            doc.remove(overlay);
        }
    }

    /// Put `button` in its loading state and restore it after the fallback
    /// delay, independent of whatever the click started.
    pub fn show_button_loading(self: &Rc<Self>, button: NodeId) {
        let original = {
            let mut doc = self.document.borrow_mut();
            if !doc.is_element(button) {
                return;
            }
            let original = doc.inner_html(button);
            doc.set_inner_html(button, BUTTON_LOADING_HTML);
            doc.set_disabled(button, true);
            original
        };

        let weak = Rc::downgrade(self);
        let delay = self.config.button_loading_fallback();
        spawn_local(async move {
            sleep(delay).await;
            if let Some(this) = weak.upgrade() {
                let mut doc = this.document.borrow_mut();
                doc.set_inner_html(button, &original);
                doc.set_disabled(button, false);
            }
        });
    }

    /// Show a dismissible toast that removes itself after the configured TTL.
    ///
    /// The message is inserted as text, so markup in it is shown literally.
    ///
    /// # Arguments
    ///
    /// * `message` - Text of the toast
    /// * `kind` - Accent, rendered as the `notification-{kind}` class
    ///
    /// # Returns
    ///
    /// The toast element, or `None` when the page has no `body`.
    pub fn show_notification(self: &Rc<Self>, message: &str, kind: NotificationKind) -> Option<NodeId> {
        self.install_styles();
        let (notification, close) = {
            let mut doc = self.document.borrow_mut();
            let body = doc.body()?;

            let notification = doc.create_element("div");
            doc.set_attr(
                notification,
                "class",
                &format!("notification notification-{}", kind.as_str()),
            );
            let content = doc.create_element("div");
            doc.set_attr(content, "class", "notification-content");
            let span = doc.create_element("span");
            doc.set_attr(span, "class", "notification-message");
            let text = doc.create_text(message);
            let close = doc.create_element("button");
            doc.set_attr(close, "class", "notification-close");
            doc.set_attr(close, "type", "button");
            let close_label = doc.create_text("\u{00d7}");

            doc.append_child(span, text);
            doc.append_child(close, close_label);
            doc.append_child(content, span);
            doc.append_child(content, close);
            doc.append_child(notification, content);
            doc.append_child(body, notification);
            (notification, close)
        };
        self.listeners.borrow_mut().add(
            EventTarget::Node(close),
            EventType::Click,
            Handler::CloseNotification,
        );

        let weak = Rc::downgrade(self);
        let ttl = self.config.notification_ttl();
        spawn_local(async move {
            sleep(ttl).await;
            if let Some(this) = weak.upgrade() {
                this.dismiss_notification(notification, close);
            }
        });

        debug!(kind = kind.as_str(), message, "notification shown");
        Some(notification)
    }

    // --- handlers ---

    fn on_filter_change(&self, current: EventTarget) {
        let Some(select) = current.node() else {
            return;
        };
        let form = {
            let doc = self.document.borrow();
            if !doc.value(select).is_some_and(|v| !v.is_empty()) {
                return;
            }
            doc.query_selector(&FILTER_FORM)
        };
        self.show_loading_state();
        if let Some(form) = form {
            self.submit_form(form);
        }
    }

    fn on_search_submit(self: &Rc<Self>, event: &mut Event, current: EventTarget) {
        let Some(form) = current.node() else {
            return;
        };
        let keyword = {
            let doc = self.document.borrow();
            doc.query_selector_within(form, &KEYWORD_INPUT)
                .and_then(|input| doc.value(input))
                .and_then(normalize_keyword)
                .map(str::to_string)
        };
        match keyword {
            None => {
                event.prevent_default();
                self.show_notification(SEARCH_KEYWORD_WARNING, NotificationKind::Warning);
            }
            Some(keyword) => {
                debug!(keyword = %truncate_for_log(&keyword, 80), "search submitted");
                self.show_loading_state();
            }
        }
    }

    fn on_search_input(&self, current: EventTarget) {
        let Some(input) = current.node() else {
            return;
        };
        let value = self
            .document
            .borrow()
            .value(input)
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        // Suggestions are not implemented; the typed keyword is only logged.
        if is_suggestion_query(&value) {
            debug!(keyword = %truncate_for_log(&value, 80), "searching for keyword");
        }
    }

    fn on_menu_toggle(&self) {
        let mut doc = self.document.borrow_mut();
        if let Some(nav) = doc.query_selector(&NAV) {
            let active = doc.toggle_class(nav, "active");
            debug!(active, "navigation toggled");
        }
    }

    fn on_outside_click(&self, target: EventTarget) {
        let mut doc = self.document.borrow_mut();
        let Some(nav) = doc.query_selector(&NAV) else {
            return;
        };
        if let Some(target) = target.node() {
            if doc.contains(nav, target) {
                return;
            }
            // The menu button may be absent; only a present button shields the click.
            if doc
                .query_selector(&MENU_BUTTON)
                .is_some_and(|btn| doc.contains(btn, target))
            {
                return;
            }
        }
        doc.remove_class(nav, "active");
    }

    fn on_button_click(self: &Rc<Self>, current: EventTarget) {
        let Some(button) = current.node() else {
            return;
        };
        let engage = {
            let doc = self.document.borrow();
            doc.control_type(button).as_deref() == Some("submit")
                || doc.has_class(button, "refresh-btn")
        };
        if engage {
            self.show_button_loading(button);
        }
    }

    fn on_image_error(&self, current: EventTarget) {
        let Some(img) = current.node() else {
            return;
        };
        let mut doc = self.document.borrow_mut();
        debug!(src = doc.attr(img, "src").unwrap_or_default(), "image failed to load");
        doc.set_attr(img, "src", IMAGE_PLACEHOLDER);
        doc.set_attr(img, "alt", IMAGE_PLACEHOLDER_ALT);
    }

    fn on_notification_close(&self, current: EventTarget) {
        let Some(close) = current.node() else {
            return;
        };
        let notification = self.document.borrow().closest(close, &NOTIFICATION);
        if let Some(notification) = notification {
            self.dismiss_notification(notification, close);
        }
    }

    /// Detach a toast and drop the listener on its close button. Safe to call
    /// twice: the expiry timer may fire after a manual close.
    fn dismiss_notification(&self, notification: NodeId, close: NodeId) {
        self.document.borrow_mut().remove(notification);
        self.listeners
            .borrow_mut()
            .remove_target(EventTarget::Node(close));
    }

    // --- scroll-to-top ---

    fn add_scroll_to_top_button(&self) {
        self.install_styles();
        let mut doc = self.document.borrow_mut();
        if doc.query_selector(&SCROLL_BUTTON).is_some() {
            return;
        }
        let Some(body) = doc.body() else {
            return;
        };
        let button = doc.create_element("button");
        doc.set_attr(button, "class", "scroll-to-top");
        doc.set_attr(button, "aria-label", "Scroll to top");
        doc.set_inner_html(button, SCROLL_BUTTON_HTML);
        doc.append_child(body, button);
    }

    fn on_scroll(&self) {
        let y = self.window.borrow().page_y_offset();
        let mut doc = self.document.borrow_mut();
        let Some(button) = doc.query_selector(&SCROLL_BUTTON) else {
            return;
        };
        if y > self.config.scroll_threshold_px {
            doc.add_class(button, "show");
        } else {
            doc.remove_class(button, "show");
        }
    }

    fn scroll_to_top(self: &Rc<Self>) {
        self.window.borrow_mut().scroll_to(0.0, ScrollBehavior::Smooth);
        self.dispatch(EventType::Scroll, EventTarget::Window);
    }
}
