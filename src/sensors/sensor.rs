// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Sensor type and identity

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique sensor identifier, stable across restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(Uuid);

impl SensorId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SensorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SensorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Physical kind of sensor. Informational only, the alarm rules treat all
/// kinds the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorType {
    /// Door contact
    Door,
    /// Window contact
    Window,
    /// Motion detector
    Motion,
}

impl SensorType {
    /// Every sensor kind
    pub const ALL: [SensorType; 3] = [SensorType::Door, SensorType::Window, SensorType::Motion];
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorType::Door => "DOOR",
            SensorType::Window => "WINDOW",
            SensorType::Motion => "MOTION",
        };
        f.write_str(name)
    }
}

impl FromStr for SensorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "door" => Ok(SensorType::Door),
            "window" => Ok(SensorType::Window),
            "motion" => Ok(SensorType::Motion),
            other => Err(format!("unknown sensor type '{}'", other)),
        }
    }
}

/// A binary door/window/motion sensor.
///
/// Equality and hashing use only the [`SensorId`], so a sensor whose active
/// flag changed is still the same member of a set. Ordering sorts by name
/// first so listings read naturally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    id: SensorId,
    name: String,
    sensor_type: SensorType,
    active: bool,
}

impl Sensor {
    /// Create a new, inactive sensor with a fresh id
    pub fn new(name: impl Into<String>, sensor_type: SensorType) -> Self {
        Self::with_id(SensorId::new(), name, sensor_type, false)
    }

    /// Rebuild a sensor from stored fields
    pub fn with_id(id: SensorId, name: impl Into<String>, sensor_type: SensorType, active: bool) -> Self {
        Self {
            id,
            name: name.into(),
            sensor_type,
            active,
        }
    }

    /// Stable identifier
    pub fn id(&self) -> SensorId {
        self.id
    }

    /// Display name, not necessarily unique
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical kind
    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    /// Whether the sensor is currently tripped
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Set the flag without running any alarm rule
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl PartialEq for Sensor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Sensor {}

impl Hash for Sensor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Sensor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sensor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_ignores_active_flag() {
        let sensor = Sensor::new("Front door", SensorType::Door);
        let mut toggled = sensor.clone();
        toggled.set_active(true);

        assert_eq!(sensor, toggled);

        let mut set = HashSet::new();
        set.insert(sensor);
        assert!(!set.insert(toggled));
    }

    #[test]
    fn test_same_name_different_sensors() {
        let a = Sensor::new("Hall", SensorType::Motion);
        let b = Sensor::new("Hall", SensorType::Motion);
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_ordering_by_name() {
        let mut sensors = vec![
            Sensor::new("Window", SensorType::Window),
            Sensor::new("Back door", SensorType::Door),
            Sensor::new("Kitchen", SensorType::Motion),
        ];
        sensors.sort();

        let names: Vec<&str> = sensors.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Back door", "Kitchen", "Window"]);
    }

    #[test]
    fn test_sensor_type_parse() {
        assert_eq!("Door".parse::<SensorType>().unwrap(), SensorType::Door);
        assert_eq!("MOTION".parse::<SensorType>().unwrap(), SensorType::Motion);
        assert!("garage".parse::<SensorType>().is_err());
    }

    #[test]
    fn test_new_sensor_is_inactive() {
        assert!(!Sensor::new("Porch", SensorType::Door).is_active());
    }
}
