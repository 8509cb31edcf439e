mod event;

pub use event::{OrderEvent, Topic};

use tokio::sync::broadcast;

/// Fire-and-forget fan-out of domain events. Publishing never blocks and
/// never fails the operation that produced the event; a send with no
/// subscribers is simply dropped.
pub struct Broadcaster {
    tx: broadcast::Sender<OrderEvent>,
}

impl Broadcaster {
    pub fn new(buffer: usize) -> Self {
        let (tx, _unused_rx) = broadcast::channel(buffer);
        Broadcaster { tx }
    }

    pub fn publish(&self, event: OrderEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }
}
