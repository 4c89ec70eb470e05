//! Result type alias for Healthport
//!
//! This module provides a convenient Result type alias that uses HealthportError
//! as the error type.

use super::errors::HealthportError;

/// Result type alias for Healthport operations
///
/// # Examples
///
/// ```
/// use healthport::domain::result::Result;
/// use healthport::domain::errors::HealthportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(HealthportError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, HealthportError>;
