// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Security engine - decides alarm status from arming mode, sensors and camera

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{AlarmStatus, ArmingStatus, ListenerRegistry, StatusListener};
use crate::db::{RepositoryError, SecurityRepository};
use crate::sensors::{Sensor, SensorId};

/// Engine failures
#[derive(Debug, Error)]
pub enum EngineError {
    /// No sensor with this id is registered
    #[error("unknown sensor: {0}")]
    UnknownSensor(SensorId),

    /// The repository could not be read
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// The alarm state machine.
///
/// Every operation runs to completion, repository writes and listener
/// callbacks included, before returning. The engine is not internally
/// synchronised; wrap it in a [`SharedEngine`] to use it from several threads.
pub struct SecurityEngine {
    repository: Arc<dyn SecurityRepository>,
    listeners: ListenerRegistry,
    sensors: HashMap<SensorId, Sensor>,
    alarm_status: AlarmStatus,
    arming_status: ArmingStatus,
    cat_detected: bool,
}

impl SecurityEngine {
    /// Load sensors and statuses from the repository. Missing statuses fall
    /// back to `NoAlarm` / `Disarmed`.
    pub fn new(repository: Arc<dyn SecurityRepository>) -> Result<Self, EngineError> {
        let sensors = repository
            .sensors()?
            .into_iter()
            .map(|s| (s.id(), s))
            .collect::<HashMap<_, _>>();
        let alarm_status = repository.alarm_status()?.unwrap_or_default();
        let arming_status = repository.arming_status()?.unwrap_or_default();

        info!(
            sensors = sensors.len(),
            %alarm_status,
            %arming_status,
            "Security engine loaded"
        );

        Ok(Self {
            repository,
            listeners: ListenerRegistry::new(),
            sensors,
            alarm_status,
            arming_status,
            cat_detected: false,
        })
    }

    /// Current alarm status
    pub fn alarm_status(&self) -> AlarmStatus {
        self.alarm_status
    }

    /// Current arming mode
    pub fn arming_status(&self) -> ArmingStatus {
        self.arming_status
    }

    /// Result of the last camera analysis
    pub fn cat_detected(&self) -> bool {
        self.cat_detected
    }

    /// All sensors, sorted by name
    pub fn sensors(&self) -> Vec<&Sensor> {
        let mut sensors: Vec<&Sensor> = self.sensors.values().collect();
        sensors.sort();
        sensors
    }

    /// Look up a sensor by id
    pub fn sensor(&self, id: SensorId) -> Option<&Sensor> {
        self.sensors.get(&id)
    }

    /// First sensor (in name order) with the given name
    pub fn find_sensor_by_name(&self, name: &str) -> Option<&Sensor> {
        self.sensors().into_iter().find(|s| s.name() == name)
    }

    /// Number of sensors currently active
    pub fn active_sensor_count(&self) -> usize {
        self.sensors.values().filter(|s| s.is_active()).count()
    }

    /// Register a listener; adding the same `Arc` twice is a no-op
    pub fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>) {
        self.listeners.add(listener);
    }

    /// Unregister a listener; unknown listeners are ignored
    pub fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>) {
        self.listeners.remove(listener);
    }

    /// Change the arming mode.
    ///
    /// Disarming clears the alarm. Arming resets every sensor to inactive
    /// without running the activation rules, then raises the alarm if arming
    /// at home while the camera last saw a cat.
    pub fn set_arming_status(&mut self, arming_status: ArmingStatus) {
        if arming_status == ArmingStatus::Disarmed {
            self.set_alarm_status(AlarmStatus::NoAlarm);
        } else {
            let reset: Vec<Sensor> = self
                .sensors
                .values_mut()
                .filter(|s| s.is_active())
                .map(|s| {
                    s.set_active(false);
                    s.clone()
                })
                .collect();
            for sensor in &reset {
                self.persist("sensor", self.repository.update_sensor(sensor));
            }
            if !reset.is_empty() {
                debug!(count = reset.len(), "Reset active sensors on arming");
            }

            if arming_status == ArmingStatus::ArmedHome && self.cat_detected {
                self.set_alarm_status(AlarmStatus::Alarm);
            }
        }

        info!("Arming status: {} -> {}", self.arming_status, arming_status);
        self.arming_status = arming_status;
        self.persist("arming status", self.repository.set_arming_status(arming_status));

        self.listeners.notify_sensors_changed();
    }

    /// Apply the classifier's verdict for the latest camera frame.
    pub fn process_image_result(&mut self, cat_detected: bool) {
        if cat_detected && self.arming_status == ArmingStatus::ArmedHome {
            self.set_alarm_status(AlarmStatus::Alarm);
        } else if self.active_sensor_count() == 0 {
            // No cat and nothing tripped: stand down regardless of mode.
            self.set_alarm_status(AlarmStatus::NoAlarm);
        }

        debug!(cat_detected, "Camera analysis processed");
        self.cat_detected = cat_detected;

        self.listeners.notify_cat_detected(cat_detected);
    }

    /// Activate or deactivate a known sensor and update the alarm.
    ///
    /// Activation always runs the activation rule, even for a sensor that is
    /// already active. Deactivation only runs its rule when the sensor was
    /// active. The sensor is persisted in every case.
    pub fn change_sensor_activation(&mut self, id: SensorId, active: bool) -> Result<(), EngineError> {
        let was_active = self
            .sensors
            .get(&id)
            .ok_or(EngineError::UnknownSensor(id))?
            .is_active();

        if active {
            self.handle_sensor_activated();
        } else if was_active {
            self.handle_sensor_deactivated();
        }

        let sensor = self
            .sensors
            .get_mut(&id)
            .ok_or(EngineError::UnknownSensor(id))?;
        sensor.set_active(active);
        debug!(sensor = %sensor.name(), active, "Sensor updated");

        let sensor = sensor.clone();
        self.persist("sensor", self.repository.update_sensor(&sensor));
        Ok(())
    }

    /// Track a sensor. A sensor with the same id is replaced.
    pub fn add_sensor(&mut self, sensor: Sensor) {
        info!("Added sensor: {} ({})", sensor.name(), sensor.sensor_type());
        self.persist("sensor", self.repository.add_sensor(&sensor));
        self.sensors.insert(sensor.id(), sensor);
    }

    /// Stop tracking a sensor. The removal is mirrored to the repository even
    /// when the engine did not know the sensor.
    pub fn remove_sensor(&mut self, sensor: &Sensor) -> Option<Sensor> {
        let removed = self.sensors.remove(&sensor.id());
        self.persist("sensor removal", self.repository.remove_sensor(sensor));
        info!("Removed sensor: {}", sensor.name());
        removed
    }

    fn handle_sensor_activated(&mut self) {
        if !self.arming_status.is_armed() {
            return;
        }
        match self.alarm_status {
            AlarmStatus::NoAlarm => self.set_alarm_status(AlarmStatus::PendingAlarm),
            AlarmStatus::PendingAlarm => self.set_alarm_status(AlarmStatus::Alarm),
            AlarmStatus::Alarm => {}
        }
    }

    fn handle_sensor_deactivated(&mut self) {
        // A sounding alarm is never silenced by a sensor closing.
        if self.alarm_status == AlarmStatus::PendingAlarm {
            self.set_alarm_status(AlarmStatus::NoAlarm);
        }
    }

    // Only writer of `alarm_status`.
    fn set_alarm_status(&mut self, status: AlarmStatus) {
        debug!("Alarm status: {} -> {}", self.alarm_status, status);
        self.alarm_status = status;
        self.persist("alarm status", self.repository.set_alarm_status(status));
        self.listeners.notify_status(status);
    }

    fn persist(&self, what: &str, result: Result<(), RepositoryError>) {
        if let Err(e) = result {
            warn!("Failed to persist {}: {}", what, e);
        }
    }
}

/// Thread-safe handle: one lock around the whole engine, so each operation
/// sees and leaves a fully applied state.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<SecurityEngine>>,
}

impl SharedEngine {
    /// Take ownership of an engine
    pub fn new(engine: SecurityEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Hold the lock across several reads
    pub fn lock(&self) -> MutexGuard<'_, SecurityEngine> {
        self.inner.lock()
    }

    /// See [`SecurityEngine::set_arming_status`]
    pub fn set_arming_status(&self, arming_status: ArmingStatus) {
        self.inner.lock().set_arming_status(arming_status);
    }

    /// See [`SecurityEngine::process_image_result`]
    pub fn process_image_result(&self, cat_detected: bool) {
        self.inner.lock().process_image_result(cat_detected);
    }

    /// See [`SecurityEngine::change_sensor_activation`]
    pub fn change_sensor_activation(&self, id: SensorId, active: bool) -> Result<(), EngineError> {
        self.inner.lock().change_sensor_activation(id, active)
    }

    /// See [`SecurityEngine::add_sensor`]
    pub fn add_sensor(&self, sensor: Sensor) {
        self.inner.lock().add_sensor(sensor);
    }

    /// See [`SecurityEngine::remove_sensor`]
    pub fn remove_sensor(&self, sensor: &Sensor) -> Option<Sensor> {
        self.inner.lock().remove_sensor(sensor)
    }

    /// Register a listener; adding the same `Arc` twice is a no-op
    pub fn add_status_listener(&self, listener: Arc<dyn StatusListener>) {
        self.inner.lock().add_status_listener(listener);
    }

    /// Unregister a listener; unknown listeners are ignored
    pub fn remove_status_listener(&self, listener: &Arc<dyn StatusListener>) {
        self.inner.lock().remove_status_listener(listener);
    }

    /// Current alarm status
    pub fn alarm_status(&self) -> AlarmStatus {
        self.inner.lock().alarm_status()
    }

    /// Current arming mode
    pub fn arming_status(&self) -> ArmingStatus {
        self.inner.lock().arming_status()
    }
}
