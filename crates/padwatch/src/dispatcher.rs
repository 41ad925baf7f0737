use std::panic::{catch_unwind, AssertUnwindSafe};

use crossbeam_channel::{bounded, Sender, TrySendError};

use crate::error::HandlerError;
use crate::events::{Event, EventKind, EventReceiver, KindSet};
use crate::types::DeviceSnapshot;

/// Token returned by every registration; pass it to [`Dispatcher::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type HandlerFn = Box<dyn FnMut(&Event) -> Result<(), HandlerError> + Send>;

enum Sink {
    Handler(HandlerFn),
    Channel(Sender<Event>),
}

struct Subscription {
    id: SubscriptionId,
    kinds: KindSet,
    sink: Sink,
}

/// Delivers events to registered handlers and channels in registration order.
///
/// Handlers only ever see a shared reference to the event, never the session,
/// so they cannot mutate the device table while it is being walked. A handler
/// that returns an error or panics is logged and skipped; delivery continues
/// with the next subscription.
#[derive(Default)]
pub struct Dispatcher {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fallible handler for the given event kinds.
    pub fn subscribe<F>(&mut self, kinds: impl Into<KindSet>, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> Result<(), HandlerError> + Send + 'static,
    {
        self.push(kinds.into(), Sink::Handler(Box::new(handler)))
    }

    /// Registers a bounded channel for the given event kinds.
    ///
    /// When the channel is full new events for it are dropped. A channel whose
    /// receiver was dropped is unsubscribed on the next delivery.
    pub fn channel(
        &mut self,
        kinds: impl Into<KindSet>,
        capacity: usize,
    ) -> (SubscriptionId, EventReceiver) {
        let (tx, rx) = bounded(capacity.max(1));
        (self.push(kinds.into(), Sink::Channel(tx)), rx)
    }

    pub fn on_attach<F>(&mut self, mut handler: F) -> SubscriptionId
    where
        F: FnMut(&DeviceSnapshot) + Send + 'static,
    {
        self.subscribe(EventKind::Attach, move |event| {
            if let Event::Attached(device) = event {
                handler(device);
            }
            Ok(())
        })
    }

    pub fn on_remove<F>(&mut self, mut handler: F) -> SubscriptionId
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.subscribe(EventKind::Remove, move |event| {
            if let Event::Removed { device_id } = event {
                handler(device_id);
            }
            Ok(())
        })
    }

    /// `handler(device_id, button, timestamp)`
    pub fn on_button_down<F>(&mut self, mut handler: F) -> SubscriptionId
    where
        F: FnMut(&str, u32, f64) + Send + 'static,
    {
        self.subscribe(EventKind::ButtonDown, move |event| {
            if let Event::ButtonDown {
                device_id,
                button,
                timestamp,
            } = event
            {
                handler(device_id, *button, *timestamp);
            }
            Ok(())
        })
    }

    /// `handler(device_id, button, timestamp)`
    pub fn on_button_up<F>(&mut self, mut handler: F) -> SubscriptionId
    where
        F: FnMut(&str, u32, f64) + Send + 'static,
    {
        self.subscribe(EventKind::ButtonUp, move |event| {
            if let Event::ButtonUp {
                device_id,
                button,
                timestamp,
            } = event
            {
                handler(device_id, *button, *timestamp);
            }
            Ok(())
        })
    }

    /// `handler(device_id, axis, value, last_value, timestamp)`
    pub fn on_axis_move<F>(&mut self, mut handler: F) -> SubscriptionId
    where
        F: FnMut(&str, u32, f32, f32, f64) + Send + 'static,
    {
        self.subscribe(EventKind::AxisMove, move |event| {
            if let Event::AxisMoved {
                device_id,
                axis,
                value,
                last_value,
                timestamp,
            } = event
            {
                handler(device_id, *axis, *value, *last_value, *timestamp);
            }
            Ok(())
        })
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    fn push(&mut self, kinds: KindSet, sink: Sink) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kinds, sink });
        id
    }

    /// Delivers one event to every matching subscription.
    pub(crate) fn dispatch(&mut self, event: &Event) {
        let kind = event.kind();
        let mut closed: Vec<SubscriptionId> = Vec::new();
        for subscription in &mut self.subscriptions {
            if !subscription.kinds.contains(kind) {
                continue;
            }
            match &mut subscription.sink {
                Sink::Handler(handler) => {
                    match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            log::warn!(
                                "{} handler {:?} failed: {e}",
                                kind.as_str(),
                                subscription.id
                            );
                        }
                        Err(_) => {
                            log::warn!(
                                "{} handler {:?} panicked",
                                kind.as_str(),
                                subscription.id
                            );
                        }
                    }
                }
                Sink::Channel(tx) => match tx.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        log::warn!(
                            "channel {:?} full, dropping {} event",
                            subscription.id,
                            kind.as_str()
                        );
                    }
                    Err(TrySendError::Disconnected(_)) => closed.push(subscription.id),
                },
            }
        }
        if !closed.is_empty() {
            log::debug!("dropping {} closed event channel(s)", closed.len());
            self.subscriptions.retain(|s| !closed.contains(&s.id));
        }
    }

    pub(crate) fn dispatch_all<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) {
        for event in events {
            self.dispatch(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn button_down(button: u32) -> Event {
        Event::ButtonDown {
            device_id: Arc::from("pad"),
            button,
            timestamp: 0.0,
        }
    }

    #[test]
    fn delivers_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();
        for name in ["first", "second", "third"] {
            let log = log.clone();
            dispatcher.on_button_down(move |_, _, _| log.lock().unwrap().push(name));
        }
        dispatcher.dispatch(&button_down(0));
        assert_eq!(*log.lock().unwrap(), ["first", "second", "third"]);
    }

    #[test]
    fn filters_by_kind() {
        let hits = Arc::new(Mutex::new(0));
        let mut dispatcher = Dispatcher::new();
        let counter = hits.clone();
        dispatcher.on_button_up(move |_, _, _| *counter.lock().unwrap() += 1);
        dispatcher.dispatch(&button_down(1));
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn failing_handlers_do_not_stop_delivery() {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();
        dispatcher.subscribe(KindSet::all(), |_| Err("boom".into()));
        dispatcher.subscribe(KindSet::all(), |_| panic!("handler panic"));
        let sink = delivered.clone();
        dispatcher.on_button_down(move |_, button, _| sink.lock().unwrap().push(button));

        dispatcher.dispatch(&button_down(4));
        dispatcher.dispatch(&button_down(5));
        assert_eq!(*delivered.lock().unwrap(), [4, 5]);
        assert_eq!(dispatcher.len(), 3);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let hits = Arc::new(Mutex::new(0));
        let mut dispatcher = Dispatcher::new();
        let counter = hits.clone();
        let id = dispatcher.on_button_down(move |_, _, _| *counter.lock().unwrap() += 1);

        dispatcher.dispatch(&button_down(0));
        assert!(dispatcher.unsubscribe(id));
        assert!(!dispatcher.unsubscribe(id));
        dispatcher.dispatch(&button_down(0));
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn channel_receives_matching_events() {
        let mut dispatcher = Dispatcher::new();
        let (_, rx) = dispatcher.channel(EventKind::ButtonDown, 8);
        dispatcher.dispatch(&button_down(2));
        dispatcher.dispatch(&Event::Removed {
            device_id: Arc::from("pad"),
        });
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), [button_down(2)]);
    }

    #[test]
    fn full_channel_drops_newest() {
        let mut dispatcher = Dispatcher::new();
        let (_, rx) = dispatcher.channel(KindSet::all(), 1);
        dispatcher.dispatch(&button_down(1));
        dispatcher.dispatch(&button_down(2));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), [button_down(1)]);
    }

    #[test]
    fn closed_channel_is_unsubscribed() {
        let mut dispatcher = Dispatcher::new();
        let (_, rx) = dispatcher.channel(KindSet::all(), 4);
        drop(rx);
        dispatcher.dispatch(&button_down(0));
        assert!(dispatcher.is_empty());
    }
}
