// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! In-memory repository for demo runs and tests

use std::collections::HashMap;
use parking_lot::Mutex;

use super::{RepositoryError, SecurityRepository};
use crate::core::{AlarmStatus, ArmingStatus};
use crate::sensors::{Sensor, SensorId};

#[derive(Default)]
struct MemoryState {
    sensors: HashMap<SensorId, Sensor>,
    alarm_status: Option<AlarmStatus>,
    arming_status: Option<ArmingStatus>,
}

/// Repository that keeps everything in a mutex-guarded map
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    /// Empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with sensors and previously stored statuses
    pub fn with_state(
        sensors: impl IntoIterator<Item = Sensor>,
        alarm_status: Option<AlarmStatus>,
        arming_status: Option<ArmingStatus>,
    ) -> Self {
        let sensors = sensors.into_iter().map(|s| (s.id(), s)).collect();
        Self {
            state: Mutex::new(MemoryState {
                sensors,
                alarm_status,
                arming_status,
            }),
        }
    }

    /// Stored copy of a sensor
    pub fn sensor(&self, id: SensorId) -> Option<Sensor> {
        self.state.lock().sensors.get(&id).cloned()
    }
}

impl SecurityRepository for MemoryRepository {
    fn sensors(&self) -> Result<Vec<Sensor>, RepositoryError> {
        Ok(self.state.lock().sensors.values().cloned().collect())
    }

    fn alarm_status(&self) -> Result<Option<AlarmStatus>, RepositoryError> {
        Ok(self.state.lock().alarm_status)
    }

    fn arming_status(&self) -> Result<Option<ArmingStatus>, RepositoryError> {
        Ok(self.state.lock().arming_status)
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<(), RepositoryError> {
        self.state.lock().alarm_status = Some(status);
        Ok(())
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<(), RepositoryError> {
        self.state.lock().arming_status = Some(status);
        Ok(())
    }

    fn add_sensor(&self, sensor: &Sensor) -> Result<(), RepositoryError> {
        self.state.lock().sensors.insert(sensor.id(), sensor.clone());
        Ok(())
    }

    fn remove_sensor(&self, sensor: &Sensor) -> Result<(), RepositoryError> {
        self.state.lock().sensors.remove(&sensor.id());
        Ok(())
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<(), RepositoryError> {
        self.state.lock().sensors.insert(sensor.id(), sensor.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorType;

    #[test]
    fn test_seeded_state() {
        let door = Sensor::new("Door", SensorType::Door);
        let repo = MemoryRepository::with_state(vec![door.clone()], None, Some(ArmingStatus::ArmedAway));

        assert_eq!(repo.sensors().unwrap(), vec![door.clone()]);
        assert_eq!(repo.alarm_status().unwrap(), None);
        assert_eq!(repo.arming_status().unwrap(), Some(ArmingStatus::ArmedAway));
        assert!(repo.sensor(door.id()).is_some());
    }

    #[test]
    fn test_update_replaces_stored_copy() {
        let repo = MemoryRepository::new();
        let mut window = Sensor::new("Window", SensorType::Window);
        repo.add_sensor(&window).unwrap();

        window.set_active(true);
        repo.update_sensor(&window).unwrap();
        assert!(repo.sensor(window.id()).unwrap().is_active());

        repo.remove_sensor(&window).unwrap();
        assert!(repo.sensor(window.id()).is_none());
    }
}
