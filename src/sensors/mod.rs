//! Sensor module - door, window and motion sensors tracked by the engine

mod sensor;

pub use sensor::{Sensor, SensorId, SensorType};
