//! Shared fixtures for controller and scenario tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio::sync::Notify;
use url::Url;

use crate::config::PageConfig;
use crate::controller::PageController;
use crate::dom::Document;
use crate::error::TransportError;
use crate::transport::Transport;
use crate::window::Window;

pub const FIXTURE_LOCATION: &str = "http://localhost:8080/flashnews/news";

pub const FIXTURE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>FlashNews</title></head>
<body>
  <header>
    <button class="mobile-menu-btn" type="button"><i class="fas fa-bars"></i></button>
    <nav class="nav">
      <a href="/news">Home</a>
      <a href="/news?category=2">World</a>
    </nav>
    <form class="search-form" action="/news?action=search" method="get">
      <input type="text" name="keyword" value="">
      <button class="btn search-btn" type="submit">Search</button>
    </form>
  </header>
  <main>
    <form class="filter-form" action="/news" method="get">
      <input type="hidden" name="action" value="list">
      <select class="filter-select" name="category">
        <option value="">All</option>
        <option value="1" selected>Local</option>
        <option value="2">World</option>
      </select>
      <select class="filter-select" name="location">
        <option value="">Anywhere</option>
        <option value="hanoi">Hanoi</option>
      </select>
    </form>
    <form class="refresh-form" action="/news?action=refresh" method="post">
      <input type="hidden" name="action" value="refresh">
      <input type="hidden" name="category" value="1">
      <button class="btn refresh-btn" type="submit"><i class="fas fa-sync"></i> Refresh</button>
    </form>
    <article class="news-card"><img src="/img/storm.jpg" alt="Storm"><h2>Storm</h2></article>
    <article class="news-card"><img src="/img/market.jpg" alt="Market"><h2>Market</h2></article>
    <p class="outside">Footer text</p>
  </main>
</body>
</html>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Succeed,
    Fail,
    /// Stay pending until [`ScriptedTransport::release`].
    Hold,
}

/// Transport that answers from a script and records every request.
#[derive(Debug)]
pub struct ScriptedTransport {
    reply: Cell<Reply>,
    requests: RefCell<Vec<(String, Vec<(String, String)>)>>,
    gate: Notify,
}

impl ScriptedTransport {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply: Cell::new(reply),
            requests: RefCell::new(Vec::new()),
            gate: Notify::new(),
        }
    }

    pub fn set_reply(&self, reply: Reply) {
        self.reply.set(reply);
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.requests.borrow().clone()
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

impl Transport for ScriptedTransport {
    async fn post_form(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<String, TransportError> {
        self.requests
            .borrow_mut()
            .push((url.to_string(), fields.to_vec()));
        match self.reply.get() {
            Reply::Succeed => Ok("<html><body>refreshed</body></html>".to_string()),
            Reply::Fail => Err(TransportError::Other("connection refused".to_string())),
            Reply::Hold => {
                self.gate.notified().await;
                Ok(String::new())
            }
        }
    }
}

pub fn controller(reply: Reply) -> Rc<PageController<ScriptedTransport>> {
    controller_with(FIXTURE_PAGE, reply, PageConfig::default())
}

pub fn controller_with(
    html: &str,
    reply: Reply,
    config: PageConfig,
) -> Rc<PageController<ScriptedTransport>> {
    let location = Url::parse(FIXTURE_LOCATION).ok();
    PageController::new(
        Document::parse(html),
        Window::new(location),
        ScriptedTransport::new(reply),
        config,
    )
}

/// Let spawned local tasks run without advancing the clock.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
