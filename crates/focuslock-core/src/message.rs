//! Cross-context message protocol.
//!
//! The popup and the page context are independent runtimes composed via
//! one-shot request/acknowledgment message passing: at most one request
//! in flight per start action, no retry on failure -- the caller logs and
//! gives up. The JSON shapes here are the wire contract:
//!
//! ```json
//! { "action": "START_TIMER", "duration": 5, "states": { "editorial": true, ... } }
//! { "status": "Timer started" }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::MessageError;
use crate::events::Event;
use crate::page::{Fullscreen, PageDom};
use crate::session::{SessionController, VisibilityFlags};

/// Identifies one page context reachable from the popup.
pub type PageId = u32;

/// A request from the popup to a page context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    /// Start a session of `duration` minutes, hiding the flagged sections.
    #[serde(rename = "START_TIMER")]
    StartTimer {
        /// Duration in minutes.
        duration: u32,
        states: VisibilityFlags,
    },
}

impl Request {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The page context's acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Human-readable outcome, e.g. `"Timer started"`.
    pub status: String,
}

impl Ack {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

/// Delivery seam between the popup and page contexts.
pub trait Transport {
    /// Resolve the single active page context, if any.
    fn active_page(&self) -> Option<PageId>;

    /// Deliver one request and wait for its single acknowledgment.
    fn send(&mut self, page: PageId, request: &Request) -> Result<Ack, MessageError>;
}

/// In-process transport wiring a popup directly to a session controller.
///
/// Used by the CLI and the test suite; a browser shell would replace this
/// with its runtime's message bus.
pub struct LocalTransport<P: PageDom, F: Fullscreen> {
    page_id: PageId,
    controller: SessionController<P, F>,
    events: Vec<Event>,
}

impl<P: PageDom, F: Fullscreen> LocalTransport<P, F> {
    pub fn new(controller: SessionController<P, F>) -> Self {
        Self {
            page_id: 1,
            controller,
            events: Vec::new(),
        }
    }

    pub fn controller(&self) -> &SessionController<P, F> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SessionController<P, F> {
        &mut self.controller
    }

    /// Events emitted by requests delivered through this transport.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl<P: PageDom, F: Fullscreen> Transport for LocalTransport<P, F> {
    fn active_page(&self) -> Option<PageId> {
        Some(self.page_id)
    }

    fn send(&mut self, _page: PageId, request: &Request) -> Result<Ack, MessageError> {
        let (ack, events) = self.controller.handle_request(request, chrono::Utc::now());
        self.events.extend(events);
        Ok(ack)
    }
}
