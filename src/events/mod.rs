// events/mod.rs
use dashmap::DashMap;

pub const DEVICE_CHANGE: &str = "device_change";
pub const ACTION_DISPATCHED: &str = "action_dispatched";
pub const ACTION_FAILED: &str = "action_failed";

type Callback = Box<dyn Fn(serde_json::Value) + Send + Sync>;

pub struct EventBus {
    subscribers: DashMap<String, Vec<Callback>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    /// Stamps `data` with the publish time and hands it to every subscriber of `event_type`.
    pub fn publish(&self, event_type: &str, mut data: serde_json::Value) {
        if let Some(object) = data.as_object_mut() {
            object
                .entry("at")
                .or_insert_with(|| chrono::Utc::now().to_rfc3339().into());
        }
        if let Some(subscribers) = self.subscribers.get(event_type) {
            for callback in subscribers.iter() {
                (callback)(data.clone());
            }
        }
    }

    pub fn subscribe<F: Fn(serde_json::Value) + Send + Sync + 'static>(
        &self,
        event_type: &str,
        callback: F,
    ) {
        self.subscribers
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(callback));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("topics", &self.subscribers.len())
            .finish()
    }
}
