//! Progress channel between the pipeline and whoever renders it.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Producer half, cloned into every phase of a run.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Queue an event. Never blocks; events are dropped once nobody listens.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Consumer half, usually drained on a dedicated display thread.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Blocking iterator that ends when every sender has been dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

pub struct EventChannel;

impl EventChannel {
    /// Unbounded pair, so a slow display never stalls ingestion
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// Sender whose receiver is already gone, for runs without a display.
pub fn null_sender() -> EventSender {
    EventChannel::new().0
}
