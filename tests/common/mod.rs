//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use http_host::events::SubscriberError;
use http_host::{EventSubscriber, HttpServer, ServerEvent, ServerState};

/// Subscriber that records every delivered event in order.
pub struct RecordingSubscriber {
    seen: Mutex<Vec<ServerEvent>>,
}

impl RecordingSubscriber {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<ServerEvent> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self, event: ServerEvent) -> usize {
        self.seen.lock().unwrap().iter().filter(|e| **e == event).count()
    }
}

impl EventSubscriber for RecordingSubscriber {
    fn on_event(&self, event: ServerEvent) -> Result<(), SubscriberError> {
        self.seen.lock().unwrap().push(event);
        Ok(())
    }
}

/// Poll until the server reaches `target` or the deadline passes.
pub async fn wait_for_state(server: &HttpServer, target: ServerState, deadline: Duration) -> bool {
    let started = tokio::time::Instant::now();
    loop {
        if server.state() == target {
            return true;
        }
        if started.elapsed() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
