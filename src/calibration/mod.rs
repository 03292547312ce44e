//! Sensor calibration
//!
//! Each sensor has a triple of reference readings (idle, touch,
//! barefoot) that the classifier measures raw readings against.

mod store;
mod triple;

pub use store::{CalibrationStore, JsonCalibrationStore, StoreError};
pub use triple::{default_calibration, Calibration, CalibrationTriple, TriplePatch};
