// error.rs — Error types for the anchor subsystem.

use thiserror::Error;

/// Errors that can occur while configuring anchor components.
///
/// All variants are configuration errors: fatal at construction time and
/// never produced on the decision path.
#[derive(Debug, Error)]
pub enum AnchorError {
    /// A configured numeric value is outside its legal range.
    #[error("{field} must be within [{min}, {max}], got {value}")]
    ConfigOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl AnchorError {
    /// Range check helper used by constructors and config validation.
    pub fn check_range(
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), AnchorError> {
        if value.is_finite() && value >= min && value <= max {
            Ok(())
        } else {
            Err(AnchorError::ConfigOutOfRange {
                field,
                value,
                min,
                max,
            })
        }
    }
}
