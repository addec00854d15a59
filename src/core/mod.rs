//! Core engine module - alarm state machine and status fan-out

mod engine;
mod event_bus;
mod listener;

pub use engine::{EngineError, SecurityEngine, SharedEngine};
pub use event_bus::{Event, EventBus, EventPayload, EventType};
pub use listener::{ListenerRegistry, StatusListener};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Escalation level of the alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmStatus {
    /// Nothing to report
    NoAlarm,
    /// A sensor tripped while armed; one more trip escalates
    PendingAlarm,
    /// Sounding
    Alarm,
}

impl AlarmStatus {
    /// Every status, in escalation order
    pub const ALL: [AlarmStatus; 3] = [AlarmStatus::NoAlarm, AlarmStatus::PendingAlarm, AlarmStatus::Alarm];

    /// Text shown to the user on status displays
    pub fn description(&self) -> &'static str {
        match self {
            AlarmStatus::NoAlarm => "Cool and Good",
            AlarmStatus::PendingAlarm => "I'm in Danger...",
            AlarmStatus::Alarm => "Awooga!",
        }
    }
}

impl Default for AlarmStatus {
    fn default() -> Self {
        AlarmStatus::NoAlarm
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlarmStatus::NoAlarm => "NO_ALARM",
            AlarmStatus::PendingAlarm => "PENDING_ALARM",
            AlarmStatus::Alarm => "ALARM",
        };
        f.write_str(name)
    }
}

/// Whether the system is monitoring, and in which mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArmingStatus {
    /// Not monitoring; sensor activity is ignored
    Disarmed,
    /// Occupants at home; the camera can raise the alarm
    ArmedHome,
    /// Nobody home
    ArmedAway,
}

impl ArmingStatus {
    /// Every arming mode
    pub const ALL: [ArmingStatus; 3] = [ArmingStatus::Disarmed, ArmingStatus::ArmedHome, ArmingStatus::ArmedAway];

    /// Text shown to the user on status displays
    pub fn description(&self) -> &'static str {
        match self {
            ArmingStatus::Disarmed => "Disarmed",
            ArmingStatus::ArmedHome => "Armed - At Home",
            ArmingStatus::ArmedAway => "Armed - Away",
        }
    }

    /// True for either armed mode
    pub fn is_armed(&self) -> bool {
        !matches!(self, ArmingStatus::Disarmed)
    }
}

impl Default for ArmingStatus {
    fn default() -> Self {
        ArmingStatus::Disarmed
    }
}

impl fmt::Display for ArmingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArmingStatus::Disarmed => "DISARMED",
            ArmingStatus::ArmedHome => "ARMED_HOME",
            ArmingStatus::ArmedAway => "ARMED_AWAY",
        };
        f.write_str(name)
    }
}

impl FromStr for ArmingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "disarmed" | "off" => Ok(ArmingStatus::Disarmed),
            "home" | "armed_home" => Ok(ArmingStatus::ArmedHome),
            "away" | "armed_away" => Ok(ArmingStatus::ArmedAway),
            other => Err(format!("unknown arming status '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(AlarmStatus::default(), AlarmStatus::NoAlarm);
        assert_eq!(ArmingStatus::default(), ArmingStatus::Disarmed);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&AlarmStatus::PendingAlarm).unwrap(), "\"PENDING_ALARM\"");
        assert_eq!(serde_json::to_string(&ArmingStatus::ArmedHome).unwrap(), "\"ARMED_HOME\"");

        let parsed: ArmingStatus = serde_json::from_str("\"ARMED_AWAY\"").unwrap();
        assert_eq!(parsed, ArmingStatus::ArmedAway);
    }

    #[test]
    fn test_arming_parse() {
        assert_eq!("home".parse::<ArmingStatus>().unwrap(), ArmingStatus::ArmedHome);
        assert_eq!("ARMED-AWAY".parse::<ArmingStatus>().unwrap(), ArmingStatus::ArmedAway);
        assert_eq!("disarmed".parse::<ArmingStatus>().unwrap(), ArmingStatus::Disarmed);
        assert!("vacation".parse::<ArmingStatus>().is_err());
    }

    #[test]
    fn test_is_armed() {
        assert!(!ArmingStatus::Disarmed.is_armed());
        assert!(ArmingStatus::ArmedHome.is_armed());
        assert!(ArmingStatus::ArmedAway.is_armed());
    }
}
