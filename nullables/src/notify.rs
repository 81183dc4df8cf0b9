//! Nullable notification sink that records what it is given.

use squad_directory::{NotificationEvent, NotificationSink};
use squad_types::ProposalId;
use std::sync::Mutex;

#[derive(Default)]
pub struct NullNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event emitted so far, in order.
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }

    /// How many `BroadcastReached` events were emitted for `proposal`.
    pub fn broadcasts_for(&self, proposal: &ProposalId) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| {
                matches!(e, NotificationEvent::BroadcastReached { proposal_id } if proposal_id == proposal)
            })
            .count()
    }
}

impl NotificationSink for NullNotifier {
    fn emit(&self, event: NotificationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
