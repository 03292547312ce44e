//! Sensor sources
//!
//! A source supplies one raw reading per sensor each control tick.
//! Lower readings mean stronger contact.

mod script;
mod source;

pub use script::ScriptedSensor;
pub use source::SensorSource;
