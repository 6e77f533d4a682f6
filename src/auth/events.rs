// Session event notifications
// Process-wide observer channel other components subscribe to

use tokio::sync::broadcast;
use tracing::debug;

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Session lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login succeeded and a new session record was persisted
    LoggedIn { email: String },
    /// The user logged out
    LoggedOut,
    /// The backend answered 401; stored credentials were cleared
    Unauthorized,
}

/// Broadcast hub for `SessionEvent`s
///
/// Cheap to clone; all clones publish to the same subscribers.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; having no subscribers is not an error
    pub fn emit(&self, event: SessionEvent) {
        match self.sender.send(event) {
            Ok(receivers) => debug!("Session event delivered to {} subscribers", receivers),
            Err(broadcast::error::SendError(event)) => {
                debug!("Session event {:?} had no subscribers", event)
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
