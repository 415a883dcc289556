//! Event model and the listener wiring table.
//!
//! Behaviors are not closures captured at registration time. Each listener is
//! a `(target, event, handler)` triple where [`Handler`] names the behavior;
//! the controller resolves whatever context it needs (enclosing form, nav
//! container, ...) from the live document when the event fires. The static
//! [`READY_WIRING`] and [`EXTRAS_WIRING`] tables are processed once at start.

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Change,
    Input,
    Submit,
    Error,
    Scroll,
    BeforeUnload,
}

impl EventType {
    /// `error`, `scroll` and `beforeunload` stay on their target.
    pub fn bubbles(self) -> bool {
        matches!(
            self,
            EventType::Click | EventType::Change | EventType::Input | EventType::Submit
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Node(NodeId),
    Document,
    Window,
}

impl EventTarget {
    pub fn node(self) -> Option<NodeId> {
        match self {
            EventTarget::Node(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: EventType,
    target: EventTarget,
    default_prevented: bool,
}

impl Event {
    pub fn new(kind: EventType, target: EventTarget) -> Self {
        Self {
            kind,
            target,
            default_prevented: false,
        }
    }

    pub fn kind(&self) -> EventType {
        self.kind
    }

    pub fn target(&self) -> EventTarget {
        self.target
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Named page behaviors a listener can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    FilterFormSubmit,
    FilterSelectChange,
    RefreshClick,
    SearchSubmit,
    SearchInput,
    MenuToggle,
    OutsideClick,
    ButtonLoading,
    ImageError,
    ScrollToggle,
    ScrollToTop,
    CloseNotification,
    Teardown,
}

/// Which elements a wiring row attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// First element matching the selector.
    First(&'static str),
    /// Every element matching the selector.
    All(&'static str),
    /// Every match of the selector inside the first match of the container.
    Within {
        container: &'static str,
        selector: &'static str,
    },
    Document,
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wiring {
    pub scope: Scope,
    pub event: EventType,
    pub handler: Handler,
}

const fn wire(scope: Scope, event: EventType, handler: Handler) -> Wiring {
    Wiring {
        scope,
        event,
        handler,
    }
}

/// Listeners attached when the page markup is ready.
pub const READY_WIRING: &[Wiring] = &[
    wire(Scope::First(".filter-form"), EventType::Submit, Handler::FilterFormSubmit),
    wire(
        Scope::Within {
            container: ".filter-form",
            selector: ".filter-select",
        },
        EventType::Change,
        Handler::FilterSelectChange,
    ),
    wire(Scope::First(".refresh-btn"), EventType::Click, Handler::RefreshClick),
    wire(
        Scope::First(r#"form[action*="search"]"#),
        EventType::Submit,
        Handler::SearchSubmit,
    ),
    wire(
        Scope::First(r#"input[name="keyword"]"#),
        EventType::Input,
        Handler::SearchInput,
    ),
    wire(Scope::First(".mobile-menu-btn"), EventType::Click, Handler::MenuToggle),
    wire(Scope::Document, EventType::Click, Handler::OutsideClick),
    wire(Scope::All(".btn"), EventType::Click, Handler::ButtonLoading),
    wire(Scope::Window, EventType::BeforeUnload, Handler::Teardown),
];

/// Listeners attached once the scroll button exists. Images are captured
/// here and only here: images inserted later get no fallback.
pub const EXTRAS_WIRING: &[Wiring] = &[
    wire(Scope::All("img"), EventType::Error, Handler::ImageError),
    wire(Scope::First(".scroll-to-top"), EventType::Click, Handler::ScrollToTop),
    wire(Scope::Window, EventType::Scroll, Handler::ScrollToggle),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub target: EventTarget,
    pub event: EventType,
    pub handler: Handler,
}

/// Registered listeners in registration order.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    listeners: Vec<Listener>,
}

impl ListenerRegistry {
    pub fn add(&mut self, target: EventTarget, event: EventType, handler: Handler) {
        self.listeners.push(Listener {
            target,
            event,
            handler,
        });
    }

    /// Drop every listener attached to `target`, returning how many went.
    pub fn remove_target(&mut self, target: EventTarget) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.target != target);
        before - self.listeners.len()
    }

    pub fn handlers_for(&self, target: EventTarget, event: EventType) -> Vec<Handler> {
        self.listeners
            .iter()
            .filter(|l| l.target == target && l.event == event)
            .map(|l| l.handler)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
