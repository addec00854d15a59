// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Event bus bridging engine notifications onto a broadcast channel

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use super::{AlarmStatus, StatusListener};

/// Event types in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// Alarm status was set
    AlarmStatus,
    /// Arming changed and sensors were reset
    SensorsChanged,
    /// Camera verdict
    CatDetected,
}

/// Generic event wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Sequence number, unique per bus
    pub id: u64,
    /// Kind of event, mirrors the payload variant
    pub event_type: EventType,
    /// When the bus published it
    pub timestamp: DateTime<Utc>,
    /// Event data
    pub payload: EventPayload,
}

/// Data carried by an [`Event`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    /// New alarm status
    AlarmStatus(AlarmStatus),
    /// Sensor flags were reset
    SensorsChanged,
    /// Whether the last frame showed a cat
    CatDetected(bool),
}

/// Broadcasts every engine notification to any number of async subscribers.
///
/// Register it with the engine as a [`StatusListener`]; publishing never
/// blocks and events are dropped when nobody is subscribed.
pub struct EventBus {
    event_tx: broadcast::Sender<Event>,
    event_counter: AtomicU64,
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per slow subscriber
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity);

        Self {
            event_tx,
            event_counter: AtomicU64::new(0),
        }
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Number of events published so far
    pub fn published(&self) -> u64 {
        self.event_counter.load(Ordering::Relaxed)
    }

    fn publish(&self, event_type: EventType, payload: EventPayload) {
        let id = self.event_counter.fetch_add(1, Ordering::Relaxed);
        let event = Event {
            id,
            event_type,
            timestamp: Utc::now(),
            payload,
        };
        let _ = self.event_tx.send(event);
    }
}

impl StatusListener for EventBus {
    fn on_status_changed(&self, status: AlarmStatus) {
        self.publish(EventType::AlarmStatus, EventPayload::AlarmStatus(status));
    }

    fn on_sensor_status_changed(&self) {
        self.publish(EventType::SensorsChanged, EventPayload::SensorsChanged);
    }

    fn on_cat_detected(&self, cat_detected: bool) {
        self.publish(EventType::CatDetected, EventPayload::CatDetected(cat_detected));
    }
}
