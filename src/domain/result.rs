//! Result type alias for Hearth
//!
//! This module provides a convenient Result type alias that uses HearthError
//! as the error type.

use super::errors::HearthError;

/// Result type alias for Hearth operations
///
/// # Examples
///
/// ```
/// use hearth::domain::result::Result;
/// use hearth::domain::errors::HearthError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(HearthError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, HearthError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::HearthError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(HearthError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
