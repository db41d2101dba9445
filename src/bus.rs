//! Publish/subscribe fan-out for realtime lifecycle events.
//!
//! Subscriptions are keyed by an exact event type (`response.done`), a
//! hierarchical wildcard (`response.*`), or the global wildcard (`*`).
//! Emission probes the finite set of candidate patterns derived from the
//! dot-delimited event type, so no graph structure is needed.

use crate::Result;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Callback = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<()>> + Send + Sync>;

struct Entry {
    id: u64,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    buckets: HashMap<String, Vec<Entry>>,
    next_id: u64,
}

/// Asynchronous event bus with ordered fan-out per pattern.
///
/// Cloning is cheap and clones share the same subscriber registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

/// Handle for one subscription. Dropping the handle leaves the subscription
/// live; only an explicit [`SubscriptionHandle::unsubscribe`] (or bus
/// teardown) ends it.
pub struct SubscriptionHandle {
    registry: Arc<Mutex<Registry>>,
    pattern: String,
    id: u64,
}

impl SubscriptionHandle {
    pub fn unsubscribe(&self) {
        let mut registry = lock(&self.registry);
        if let Some(entries) = registry.buckets.get_mut(&self.pattern) {
            entries.retain(|entry| entry.id != self.id);
            if entries.is_empty() {
                registry.buckets.remove(&self.pattern);
            }
        }
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async callback for `pattern`. Multiple subscriptions per
    /// pattern are allowed; insertion order defines invocation order.
    pub fn subscribe<F, Fut>(&self, pattern: &str, callback: F) -> SubscriptionHandle
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let callback: Callback = Arc::new(move |event| Box::pin(callback(event)));
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .buckets
            .entry(pattern.to_string())
            .or_default()
            .push(Entry { id, callback });
        SubscriptionHandle {
            registry: Arc::clone(&self.registry),
            pattern: pattern.to_string(),
            id,
        }
    }

    /// Emit an event, awaiting every matched callback. A failing callback is
    /// logged and does not stop fan-out to the remaining subscribers.
    pub async fn emit(&self, event_type: &str, event: &Value) {
        for pattern in candidate_patterns(event_type) {
            self.invoke_bucket(&pattern, event).await;
        }
    }

    /// Number of live subscriptions for `pattern`.
    #[must_use]
    pub fn subscriber_count(&self, pattern: &str) -> usize {
        lock(&self.registry)
            .buckets
            .get(pattern)
            .map_or(0, Vec::len)
    }

    async fn invoke_bucket(&self, pattern: &str, event: &Value) {
        // Snapshot so that unsubscribing mid-emission cannot break iteration.
        let snapshot: Vec<(u64, Callback)> = {
            let registry = lock(&self.registry);
            let Some(entries) = registry.buckets.get(pattern) else {
                return;
            };
            entries
                .iter()
                .map(|entry| (entry.id, Arc::clone(&entry.callback)))
                .collect()
        };

        for (id, callback) in snapshot {
            // A callback removed earlier in this emission must not fire.
            let live = lock(&self.registry)
                .buckets
                .get(pattern)
                .is_some_and(|entries| entries.iter().any(|entry| entry.id == id));
            if !live {
                continue;
            }
            if let Err(err) = callback(event.clone()).await {
                tracing::warn!(pattern, error = %err, "event subscriber failed");
            }
        }
    }
}

/// Patterns that can match `event_type`: the exact type, `<prefix>.*` for
/// every proper dot-prefix (shortest first), then the global `*`.
fn candidate_patterns(event_type: &str) -> Vec<String> {
    let parts: Vec<&str> = event_type.split('.').collect();
    let mut patterns = Vec::with_capacity(parts.len() + 1);
    patterns.push(event_type.to_string());
    for i in 1..parts.len() {
        patterns.push(format!("{}.*", parts[..i].join(".")));
    }
    patterns.push("*".to_string());
    patterns
}

fn lock(registry: &Arc<Mutex<Registry>>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
