//! # FlashNews page controller
//!
//! Client-side behavior of the FlashNews listing page, run against an
//! in-memory document instead of a browser:
//!
//! - filter selects that submit their form as soon as a value is picked
//! - a refresh button and a background timer that POST the refresh form,
//!   with at most one request in flight
//! - search validation, the mobile navigation toggle, button loading states,
//!   toast notifications, broken-image fallback and a scroll-to-top button
//!
//! [`PageController`] ties it together; [`dom`], [`events`] and [`window`]
//! model the host page it runs in.

pub mod cli;
pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod events;
pub mod scenario;
pub mod styles;
pub mod transport;
pub mod utils;
pub mod window;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::PageConfig;
pub use controller::{NotificationKind, PageController, PageSnapshot};
pub use dom::{Document, NodeId, Selector};
pub use error::{PageError, SelectorError, TransportError};
pub use events::{EventTarget, EventType};
pub use scenario::{Scenario, Step};
pub use transport::{HttpTransport, Transport};
pub use window::Window;
