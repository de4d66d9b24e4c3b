//! Result type alias for Medstar

use super::errors::EtlError;

/// Result type alias for Medstar operations
///
/// # Examples
///
/// ```
/// use medstar::domain::result::Result;
/// use medstar::domain::errors::EtlError;
///
/// fn failing_function() -> Result<()> {
///     Err(EtlError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

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
