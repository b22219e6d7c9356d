//! Progress events emitted while generating

use serde::{Deserialize, Serialize};

/// Generation events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationEvent {
    /// Emitted after each package; `processed` is zero-based
    Progress {
        label: String,
        processed: usize,
        remaining: usize,
    },
    /// Phase description
    Status(String),
}

/// Event bus for broadcasting events
pub struct EventBus {
    subscribers: Vec<Box<dyn Fn(&GenerationEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn(&GenerationEvent) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    pub fn emit(&self, event: GenerationEvent) {
        for subscriber in &self.subscribers {
            subscriber(&event);
        }
    }

    pub fn progress(&self, label: impl Into<String>, processed: usize, remaining: usize) {
        self.emit(GenerationEvent::Progress {
            label: label.into(),
            processed,
            remaining,
        });
    }

    pub fn status(&self, text: impl Into<String>) {
        self.emit(GenerationEvent::Status(text.into()));
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
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
