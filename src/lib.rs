// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! CatGuard - Home Security Status Engine
//!
//! Tracks an alarm given sensor events, arming-mode changes and camera
//! frames that may or may not show a cat:
//! - Three-level alarm state machine (no alarm, pending, sounding)
//! - Door, window and motion sensors with persistent state
//! - Cat detection through a pluggable image classifier
//! - Synchronous listener fan-out plus an async broadcast bus
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐  bool   ┌─────────────────────────┐
//! │ CameraMonitor │───────→ │     SecurityEngine      │
//! │ (classifier)  │         │  alarm / arming / cat   │
//! └───────────────┘         └─────────────────────────┘
//!                             │                    │
//!                             ↓                    ↓
//!                   ┌────────────────────┐  ┌─────────────────┐
//!                   │ SecurityRepository │  │ StatusListeners │
//!                   │ (SQLite / memory)  │  │  (EventBus, ..) │
//!                   └────────────────────┘  └─────────────────┘
//! ```

#![warn(missing_docs)]

/// Alarm state machine, listeners and event bus
pub mod core;
/// Sensor model
pub mod sensors;
/// Camera frames and cat classification
pub mod image;
/// TOML configuration
pub mod config;
/// Persistence: SQLite and in-memory repositories
pub mod db;

// Re-exports for convenience
pub use config::Config;
pub use crate::core::{AlarmStatus, ArmingStatus, EngineError, EventBus, SecurityEngine, SharedEngine, StatusListener};
pub use sensors::{Sensor, SensorId, SensorType};
pub use image::{CameraImage, CameraMonitor, FakeImageClassifier, ImageClassifier};
pub use db::{Database, MemoryRepository, RepositoryError, SecurityRepository};

/// CatGuard version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CatGuard name
pub const NAME: &str = "CatGuard";
