//! Event Bus implementation.
//!
//! Provides the replaying `EventBus` and the `Subscription` handle returned
//! to subscribers.

use parking_lot::{Mutex, ReentrantMutex};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use uuid::Uuid;

use super::events::AnalysisEvent;

/// Bus carrying analysis results from the upload flow to the chat flow
pub type AnalysisBus = EventBus<AnalysisEvent>;

/// Subscription identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Type alias for event handler functions
type EventHandler<E> = Arc<dyn Fn(E) + Send + Sync>;

struct BusState<E> {
    handlers: HashMap<SubscriptionId, EventHandler<E>>,
    last_event: Option<E>,
}

struct BusInner<E> {
    state: Mutex<BusState<E>>,
    /// Serializes replay and fan-out across threads. Reentrant so handlers
    /// may publish or subscribe from inside a delivery.
    delivery: ReentrantMutex<()>,
}

impl<E> BusInner<E> {
    fn is_registered(&self, id: SubscriptionId) -> bool {
        self.state.lock().handlers.contains_key(&id)
    }
}

/// Removal side of a bus, erased over the event type so `Subscription`
/// stays non-generic.
trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId) -> bool;
}

impl<E: Send> Detach for BusInner<E> {
    fn detach(&self, id: SubscriptionId) -> bool {
        // Waits out any fan-out on another thread, so the handler never runs
        // after this returns.
        let _delivery = self.delivery.lock();
        let removed = self.state.lock().handlers.remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }
}

/// Handle returned by [`EventBus::subscribe`].
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Clone)]
pub struct Subscription {
    id: SubscriptionId,
    bus: Weak<dyn Detach>,
}

impl Subscription {
    /// Identifier of this subscription
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the callback from the bus.
    ///
    /// Returns true only for the call that actually removed it; repeated
    /// calls, or calls after the bus is gone, are no-ops.
    pub fn unsubscribe(&self) -> bool {
        match self.bus.upgrade() {
            Some(bus) => bus.detach(self.id),
            None => false,
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Publish/subscribe channel that retains the most recent event.
///
/// Every publish overwrites the retained event and is delivered synchronously
/// to the current subscribers. A new subscriber receives the retained event
/// synchronously inside `subscribe`, before any later publish reaches it.
///
/// Cloning yields another handle to the same bus.
pub struct EventBus<E> {
    inner: Arc<BusInner<E>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> EventBus<E>
where
    E: Clone + Send + 'static,
{
    /// Create a new bus with no retained event
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                state: Mutex::new(BusState {
                    handlers: HashMap::new(),
                    last_event: None,
                }),
                delivery: ReentrantMutex::new(()),
            }),
        }
    }

    /// Publish an event to all subscribers
    ///
    /// The event is retained even when nobody is listening. Returns the
    /// number of handlers that ran to completion.
    ///
    /// A handler that publishes delivers the nested event to every
    /// subscriber before the outer fan-out resumes, so handlers later in the
    /// outer fan-out see the nested event first and the outer one last,
    /// while [`Self::last_event`] holds the nested one.
    pub fn publish(&self, event: E) -> usize {
        let _delivery = self.inner.delivery.lock();

        let handlers: Vec<(SubscriptionId, EventHandler<E>)> = {
            let mut state = self.inner.state.lock();
            state.last_event = Some(event.clone());
            state
                .handlers
                .iter()
                .map(|(id, handler)| (*id, Arc::clone(handler)))
                .collect()
        };

        let mut delivered = 0;
        for (id, handler) in handlers {
            // An earlier handler may have removed this one.
            if !self.inner.is_registered(id) {
                continue;
            }
            if invoke(id, &handler, event.clone()) {
                delivered += 1;
            }
        }

        tracing::debug!("Event published to {} subscriber(s)", delivered);
        delivered
    }

    /// Subscribe to events
    ///
    /// If an event is retained, the handler is called with it before this
    /// returns. The handler runs on the publishing thread, so it should
    /// return quickly.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(E) + Send + Sync + 'static,
    {
        let _delivery = self.inner.delivery.lock();

        let id = SubscriptionId::new();
        let handler: EventHandler<E> = Arc::new(handler);
        let replay = {
            let mut state = self.inner.state.lock();
            state.handlers.insert(id, Arc::clone(&handler));
            state.last_event.clone()
        };
        tracing::debug!("Subscription {} added", id);

        if let Some(event) = replay {
            tracing::debug!("Replaying last event to {}", id);
            invoke(id, &handler, event);
        }

        let bus: Arc<dyn Detach> = self.inner.clone();
        Subscription {
            id,
            bus: Arc::downgrade(&bus),
        }
    }

    /// Unsubscribe by identifier
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.detach(id)
    }

    /// The most recently published event, if any
    pub fn last_event(&self) -> Option<E> {
        self.inner.state.lock().last_event.clone()
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.state.lock().handlers.len()
    }
}

impl<E> Default for EventBus<E>
where
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("EventBus")
            .field("subscribers", &state.handlers.len())
            .field("has_last_event", &state.last_event.is_some())
            .finish()
    }
}

/// Run one handler, containing any panic it raises.
fn invoke<E>(id: SubscriptionId, handler: &EventHandler<E>, event: E) -> bool {
    match catch_unwind(AssertUnwindSafe(|| handler(event))) {
        Ok(()) => true,
        Err(payload) => {
            tracing::warn!(
                "Subscriber {} panicked during delivery: {}",
                id,
                panic_message(payload.as_ref())
            );
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::AnalysisSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_event_bus_creation() {
        let bus = AnalysisBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.last_event().is_none());
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = AnalysisBus::new();

        let sub = bus.subscribe(|_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(sub.unsubscribe());
        assert_eq!(bus.subscriber_count(), 0);

        // Double unsubscribe is a no-op
        assert!(!sub.unsubscribe());
        assert!(!bus.unsubscribe(sub.id()));
    }

    #[test]
    fn test_unsubscribe_removes_only_its_own_handler() {
        let bus = AnalysisBus::new();
        let first = bus.subscribe(|_| {});
        let _second = bus.subscribe(|_| {});

        first.unsubscribe();
        first.unsubscribe();
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_event_delivery() {
        let bus = AnalysisBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let _sub = bus.subscribe(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(bus.publish(AnalysisEvent::image("A")), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_publish_without_subscribers_is_retained() {
        let bus = AnalysisBus::new();
        assert_eq!(bus.publish(AnalysisEvent::video("B").with_advice("C")), 0);

        let last = bus.last_event().expect("retained");
        assert_eq!(last.source, AnalysisSource::Video);
        assert_eq!(last.advice.as_deref(), Some("C"));
    }

    #[test]
    fn test_late_subscriber_gets_replay_before_return() {
        let bus = AnalysisBus::new();
        bus.publish(AnalysisEvent::image("first"));
        bus.publish(AnalysisEvent::image("second"));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _sub = bus.subscribe(move |event: AnalysisEvent| {
            seen_clone.lock().push(event.summary.unwrap_or_default());
        });

        assert_eq!(*seen.lock(), vec!["second".to_string()]);
    }

    #[test]
    fn test_replay_panic_does_not_prevent_registration() {
        let bus = AnalysisBus::new();
        bus.publish(AnalysisEvent::image("boom"));

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let _sub = bus.subscribe(move |_| {
            if calls_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("listener bug");
            }
        });

        assert_eq!(bus.subscriber_count(), 1);
        bus.publish(AnalysisEvent::image("again"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fanout_panic_is_isolated() {
        let bus = AnalysisBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let _bad = bus.subscribe(|_| panic!("listener bug"));
        let c = counter.clone();
        let _good = bus.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(bus.publish(AnalysisEvent::image("A")), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_can_unsubscribe_peer_mid_fanout() {
        let bus = AnalysisBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let v = victim.clone();
        let c = counter.clone();
        let _killer = bus.subscribe(move |_| {
            if let Some(sub) = v.lock().as_ref() {
                if sub.unsubscribe() {
                    return;
                }
            }
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = counter.clone();
        let target = bus.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        *victim.lock() = Some(target);

        bus.publish(AnalysisEvent::image("A"));
        // Whichever ran first, the victim never runs after its removal.
        assert_eq!(bus.subscriber_count(), 1);
        assert!(counter.load(Ordering::SeqCst) <= 1);
    }

    #[test]
    fn test_handler_may_publish_reentrantly() {
        let bus = AnalysisBus::new();
        let inner_bus = bus.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();

        let _sub = bus.subscribe(move |event: AnalysisEvent| {
            let summary = event.summary.clone().unwrap_or_default();
            s.lock().push(summary.clone());
            if summary == "outer" {
                inner_bus.publish(AnalysisEvent::image("inner"));
            }
        });

        bus.publish(AnalysisEvent::image("outer"));
        assert_eq!(*seen.lock(), vec!["outer".to_string(), "inner".to_string()]);
        assert_eq!(bus.last_event().and_then(|e| e.summary).as_deref(), Some("inner"));
    }

    #[test]
    fn test_subscription_outliving_bus() {
        let bus = AnalysisBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn test_subscription_id_display() {
        let bus = AnalysisBus::new();
        let sub = bus.subscribe(|_| {});
        let shown = sub.id().to_string();
        assert!(shown.starts_with("Sub("));
        assert_eq!(shown.len(), "Sub(".len() + 8 + 1);
    }
}
