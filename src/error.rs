// Error taxonomy - fatal errors surface here, data errors are absorbed
// at the fetch/transform boundary and logged instead.
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    /// A panel with zero entities never reaches the rendering stage.
    #[error("panel configuration declares no entities")]
    NoEntities,

    /// The configured look-back window is zero, negative, or beyond the
    /// supported maximum.
    #[error("look-back window of {0} hours is outside the supported range")]
    WindowOutOfRange(i64),

    /// The drawing surface could not be resolved at initialize time.
    /// Terminal for the manager instance; not retried.
    #[error("drawing surface not found")]
    SurfaceNotFound,

    #[error("{operation} is not valid in the current manager state")]
    InvalidState { operation: &'static str },
}
