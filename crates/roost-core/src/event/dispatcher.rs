use std::any::TypeId;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use crate::event::{AsyncEventHandler, Event, EventId, EventResult};

/// An owned future returning an [`EventResult`].
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = EventResult> + Send + 'a>>;

//--------------------------------------------------
// EventDispatcher (internal, wrapped by SharedEventDispatcher)
//--------------------------------------------------

/// Event dispatcher holding handlers and the pending event queue.
pub struct EventDispatcher {
    handlers: HashMap<&'static str, Vec<(EventId, Box<dyn AsyncEventHandler>)>>,
    type_handlers: HashMap<TypeId, Vec<(EventId, Box<dyn AsyncEventHandler>)>>,
    next_handler_id: EventId,
    event_queue: VecDeque<Box<dyn Event>>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_handler_count: usize = self.handlers.values().map(|v| v.len()).sum();
        let type_handler_count: usize = self.type_handlers.values().map(|v| v.len()).sum();
        f.debug_struct("EventDispatcher")
            .field("name_handlers_count", &name_handler_count)
            .field("type_handlers_count", &type_handler_count)
            .field("next_handler_id", &self.next_handler_id)
            .field("event_queue_size", &self.event_queue.len())
            .finish()
    }
}

/// Handler for events matched by name.
struct SimpleHandler {
    handler: Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>,
}

impl fmt::Debug for SimpleHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl AsyncEventHandler for SimpleHandler {
    async fn handle(&self, event: &dyn Event) -> EventResult {
        (self.handler)(event).await
    }
}

/// Handler for events matched by concrete type.
struct TypedEventHandler<E: Event + 'static> {
    handler: Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>,
}

impl<E: Event + 'static> fmt::Debug for TypedEventHandler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedEventHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<E: Event + 'static> AsyncEventHandler for TypedEventHandler<E> {
    async fn handle(&self, event: &dyn Event) -> EventResult {
        if let Some(e) = event.as_any().downcast_ref::<E>() {
            (self.handler)(e).await
        } else {
            EventResult::Continue
        }
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            type_handlers: HashMap::new(),
            next_handler_id: 1,
            event_queue: VecDeque::new(),
        }
    }

    pub fn register_handler(
        &mut self,
        event_name: &'static str,
        handler: Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>,
    ) -> EventId {
        let id = self.next_handler_id;
        self.next_handler_id += 1;
        let handler = SimpleHandler { handler };
        self.handlers.entry(event_name).or_default().push((id, Box::new(handler)));
        id
    }

    pub fn register_type_handler<E: Event + 'static>(
        &mut self,
        handler: Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>,
    ) -> EventId {
        let id = self.next_handler_id;
        self.next_handler_id += 1;
        let type_id = TypeId::of::<E>();
        let handler = TypedEventHandler { handler };
        self.type_handlers.entry(type_id).or_default().push((id, Box::new(handler)));
        id
    }

    pub fn unregister_handler(&mut self, id: EventId) -> bool {
        let mut found = false;
        self.handlers.values_mut().for_each(|handlers| {
            let len_before = handlers.len();
            handlers.retain(|(h_id, _)| *h_id != id);
            if handlers.len() < len_before {
                found = true;
            }
        });
        self.type_handlers.values_mut().for_each(|handlers| {
            let len_before = handlers.len();
            handlers.retain(|(h_id, _)| *h_id != id);
            if handlers.len() < len_before {
                found = true;
            }
        });
        found
    }

    pub async fn dispatch_internal(&self, event: &dyn Event) -> EventResult {
        let mut result = EventResult::Continue;
        if let Some(handlers) = self.handlers.get(event.name()) {
            for (_, handler) in handlers {
                match handler.handle(event).await {
                    EventResult::Continue => {}
                    EventResult::Stop => {
                        result = EventResult::Stop;
                        break;
                    }
                }
            }
        }
        if result == EventResult::Stop {
            return result;
        }
        if let Some(handlers) = self.type_handlers.get(&event.as_any().type_id()) {
            for (_, handler) in handlers {
                match handler.handle(event).await {
                    EventResult::Continue => {}
                    EventResult::Stop => {
                        result = EventResult::Stop;
                        break;
                    }
                }
            }
        }
        result
    }

    pub fn queue_event(&mut self, event: Box<dyn Event>) {
        self.event_queue.push_back(event);
    }

    /// Drains the queue front-to-back, dispatching each event in the order it
    /// was queued.
    pub async fn process_queue_internal(&mut self) -> usize {
        let mut count = 0;
        while let Some(event) = self.event_queue.pop_front() {
            let dispatcher_ref = &*self;
            dispatcher_ref.dispatch_internal(&*event).await;
            count += 1;
        }
        count
    }

    pub fn queue_size(&self) -> usize {
        self.event_queue.len()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------------------
// SharedEventDispatcher (public API)
//--------------------------------------------------

/// Thread-safe shared event dispatcher.
///
/// Cloning is cheap; every clone feeds the same queue. `wakeup` carries a
/// permit whenever something was queued, so the component loop can sleep
/// until work arrives without polling.
#[derive(Clone)]
pub struct SharedEventDispatcher {
    dispatcher: Arc<Mutex<EventDispatcher>>,
    wakeup: Arc<Notify>,
}

impl fmt::Debug for SharedEventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEventDispatcher").finish_non_exhaustive()
    }
}

impl SharedEventDispatcher {
    pub fn new() -> Self {
        Self {
            dispatcher: Arc::new(Mutex::new(EventDispatcher::new())),
            wakeup: Arc::new(Notify::new()),
        }
    }

    /// Dispatches an event to its handlers immediately, bypassing the queue.
    pub async fn dispatch(&self, event: &dyn Event) -> EventResult {
        let dispatcher = self.dispatcher.lock().await;
        dispatcher.dispatch_internal(event).await
    }

    /// Appends an event to the queue and signals the loop.
    pub async fn queue_event(&self, event: Box<dyn Event>) {
        let mut dispatcher = self.dispatcher.lock().await;
        dispatcher.queue_event(event);
        drop(dispatcher);
        self.wakeup.notify_one();
    }

    /// Waits until at least one event has been queued since the last drain.
    pub async fn wait_queued(&self) {
        self.wakeup.notified().await;
    }

    pub async fn process_queue(&self) -> usize {
        let mut dispatcher = self.dispatcher.lock().await;
        dispatcher.process_queue_internal().await
    }

    pub async fn queue_size(&self) -> usize {
        self.dispatcher.lock().await.queue_size()
    }

    pub async fn register_handler(
        &self,
        event_name: &'static str,
        handler: Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>,
    ) -> EventId {
        let mut dispatcher = self.dispatcher.lock().await;
        dispatcher.register_handler(event_name, handler)
    }

    pub async fn register_type_handler<E: Event + 'static>(
        &self,
        handler: Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>,
    ) -> EventId {
        let mut dispatcher = self.dispatcher.lock().await;
        dispatcher.register_type_handler::<E>(handler)
    }

    pub async fn unregister_handler(&self, id: EventId) -> bool {
        let mut dispatcher = self.dispatcher.lock().await;
        dispatcher.unregister_handler(id)
    }
}

impl Default for SharedEventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------------------
// Helper functions
//--------------------------------------------------

/// Wraps a synchronous handler so it can be registered with the async system.
pub fn sync_event_handler<F>(f: F) -> Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>
where
    F: Fn(&dyn Event) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}

/// Wraps a synchronous typed handler.
pub fn sync_typed_handler<E, F>(f: F) -> Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>
where
    E: Event + 'static,
    F: Fn(&E) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}
