use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::time::{timeout, Duration};

use crate::event::dispatcher::{sync_event_handler, sync_typed_handler, EventDispatcher};
use crate::event::{Event, EventResult, SharedEventDispatcher};

// Test event implementation
#[derive(Debug, Clone)]
struct TestEvent {
    pub name: &'static str,
    pub data: String,
}

impl TestEvent {
    fn new(name: &'static str, data: &str) -> Self {
        Self {
            name,
            data: data.to_string(),
        }
    }
}

impl Event for TestEvent {
    fn name(&self) -> &'static str {
        self.name
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[tokio::test]
async fn test_handler_registration_and_dispatch() {
    let mut dispatcher = EventDispatcher::new();
    let counter = Arc::new(AtomicU32::new(0));

    let counter_clone = Arc::clone(&counter);
    let handler_fn = sync_event_handler(move |event: &dyn Event| {
        assert_eq!(event.name(), "test.event");
        counter_clone.fetch_add(1, Ordering::SeqCst);
        EventResult::Continue
    });

    let handler_id = dispatcher.register_handler("test.event", handler_fn);
    assert!(handler_id > 0, "Handler ID should be positive");

    let event = TestEvent::new("test.event", "test data");
    let result = dispatcher.dispatch_internal(&event).await;

    assert_eq!(result, EventResult::Continue);
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // A different event name should not trigger the handler.
    let other_event = TestEvent::new("other.event", "other data");
    dispatcher.dispatch_internal(&other_event).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_typed_handler_registration_and_dispatch() {
    let mut dispatcher = EventDispatcher::new();
    let counter = Arc::new(AtomicU32::new(0));
    let data_recorder = Arc::new(Mutex::new(String::new()));

    let counter_clone = Arc::clone(&counter);
    let data_recorder_clone = Arc::clone(&data_recorder);
    let handler_fn = sync_typed_handler(move |event: &TestEvent| {
        counter_clone.fetch_add(1, Ordering::SeqCst);
        let mut data = data_recorder_clone.lock().unwrap();
        *data = event.data.clone();
        EventResult::Continue
    });

    dispatcher.register_type_handler::<TestEvent>(handler_fn);

    let event = TestEvent::new("test.event", "typed data");
    dispatcher.dispatch_internal(&event).await;

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(*data_recorder.lock().unwrap(), "typed data");

    // An event of a different type should not trigger the typed handler.
    #[derive(Debug, Clone)]
    struct AnotherEvent;
    impl Event for AnotherEvent {
        fn name(&self) -> &'static str {
            "another.event"
        }
        fn clone_event(&self) -> Box<dyn Event> {
            Box::new(self.clone())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    dispatcher.dispatch_internal(&AnotherEvent).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unregister_handler() {
    let mut dispatcher = EventDispatcher::new();
    let counter = Arc::new(AtomicU32::new(0));

    let counter_clone = Arc::clone(&counter);
    let id = dispatcher.register_handler(
        "test.event",
        sync_event_handler(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            EventResult::Continue
        }),
    );

    assert!(dispatcher.unregister_handler(id));
    assert!(!dispatcher.unregister_handler(id), "second unregister should find nothing");

    dispatcher.dispatch_internal(&TestEvent::new("test.event", "")).await;
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stop_halts_propagation() {
    let mut dispatcher = EventDispatcher::new();
    let second_called = Arc::new(AtomicU32::new(0));

    dispatcher.register_handler(
        "test.event",
        sync_event_handler(|_| EventResult::Stop),
    );
    let second_clone = Arc::clone(&second_called);
    dispatcher.register_handler(
        "test.event",
        sync_event_handler(move |_| {
            second_clone.fetch_add(1, Ordering::SeqCst);
            EventResult::Continue
        }),
    );

    let result = dispatcher.dispatch_internal(&TestEvent::new("test.event", "")).await;
    assert_eq!(result, EventResult::Stop);
    assert_eq!(second_called.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_queue_preserves_emission_order() {
    let dispatcher = SharedEventDispatcher::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let order_clone = Arc::clone(&order);
    dispatcher
        .register_type_handler::<TestEvent>(sync_typed_handler(move |event: &TestEvent| {
            order_clone.lock().unwrap().push(event.data.clone());
            EventResult::Continue
        }))
        .await;

    dispatcher.queue_event(Box::new(TestEvent::new("test.event", "first"))).await;
    dispatcher.queue_event(Box::new(TestEvent::new("test.event", "second"))).await;
    dispatcher.queue_event(Box::new(TestEvent::new("test.event", "third"))).await;
    assert_eq!(dispatcher.queue_size().await, 3);

    let processed = dispatcher.process_queue().await;
    assert_eq!(processed, 3);
    assert_eq!(dispatcher.queue_size().await, 0);
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_wait_queued_wakes_on_enqueue() {
    let dispatcher = SharedEventDispatcher::new();

    // An enqueue before the wait stores a permit rather than getting lost.
    dispatcher.queue_event(Box::new(TestEvent::new("test.event", ""))).await;
    timeout(Duration::from_secs(1), dispatcher.wait_queued())
        .await
        .expect("wait_queued should resolve for a pending event");

    // And an enqueue from another task wakes a parked waiter.
    let remote = dispatcher.clone();
    let producer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        remote.queue_event(Box::new(TestEvent::new("test.event", "late"))).await;
    });

    timeout(Duration::from_secs(1), dispatcher.wait_queued())
        .await
        .expect("wait_queued should resolve when an event arrives");
    producer.await.unwrap();
}
