//! SensorSource trait

/// Trait for raw sensor inputs
///
/// Readings are polled once per control tick and used as-is; a source
/// need not debounce.
pub trait SensorSource: Send {
    /// Get the name of this source
    fn name(&self) -> &str;

    /// Called once at the start of every control tick, before any read
    fn poll(&mut self) {}

    /// Raw reading of sensor `voice`
    fn read(&mut self, voice: usize) -> i32;
}
