// Event system for asynchronous communication between components
// Implements event bus pattern using tokio broadcast channels
//
// The store publishes a full installed-set snapshot per change, the action
// runner publishes status transitions, and notices fan out to the shell.

use crate::notice::Notice;
use crate::services::InstalledSnapshot;
use std::fmt;
use tokio::sync::broadcast;

/// Maximum capacity for the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Destination used for events every subscriber should see
pub const BROADCAST: &str = "broadcast";

/// Main event structure containing all information about an event
#[derive(Debug, Clone)]
pub struct Event {
    pub source: String,
    pub destination: String,
    pub kind: EventKind,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl Event {
    /// Create a new event
    pub fn new(source: impl Into<String>, destination: impl Into<String>, kind: EventKind) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            kind,
            timestamp: chrono::Local::now(),
        }
    }

    /// Check if this event is targeted to a specific destination
    pub fn is_for(&self, target: &str) -> bool {
        self.destination == BROADCAST || self.destination == target
    }
}

/// Types of events that can be sent through the event bus
#[derive(Debug, Clone)]
pub enum EventKind {
    /// Authoritative replacement of a user's installed set
    InstalledChanged(InstalledSnapshot),

    /// Action invocation moved to a new state
    ActionStatusChange {
        app_id: String,
        action: String,
        status: ActionStatus,
    },

    /// Transient user-visible notice
    Notice(Notice),

    /// Registry bootstrap settled
    RegistryReady { loaded: usize, failed: usize },
}

/// Per-invocation action states: `Idle -> Busy -> {Rendered | Errored} -> Idle`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStatus {
    Idle,
    Busy,
    Rendered,
    Errored(String),
}

/// Event bus for publishing and subscribing to events
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    /// Create a new event bus with custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to events - returns a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: Event) -> Result<usize, EventError> {
        self.tx.send(event).map_err(|_| EventError::SendFailed)
    }

    /// Publish, treating "nobody is listening" as success
    ///
    /// Status and snapshot events are advisory; a shell that has not
    /// subscribed yet picks up state when it does.
    pub fn emit(&self, event: Event) {
        if self.tx.receiver_count() == 0 {
            return;
        }
        if let Err(e) = self.publish(event) {
            tracing::debug!("Event dropped: {}", e);
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during event operations
#[derive(Debug, Clone)]
pub enum EventError {
    SendFailed,
    ChannelClosed,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::SendFailed => write!(f, "Failed to send event"),
            EventError::ChannelClosed => write!(f, "Event channel closed"),
        }
    }
}

impl std::error::Error for EventError {}
