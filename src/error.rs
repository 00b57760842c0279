use chrono::NaiveDate;

/// Errors raised by the pure analytics core.
///
/// Empty inputs are never an error: every operation maps an empty series to an
/// empty series so filtering stages stay composable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// A record carried no usable date (row is the 0-based input position).
    #[error("Invalid or missing date at row {row}.")]
    InvalidDate { row: usize },

    #[error("Invalid date range: start {start} is after end {end}.")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid EWM window: {0}")]
    InvalidWindow(String),

    #[error("Invalid EWM start value: {0} (must be finite).")]
    InvalidStartValue(f64),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_errors_map_to_input_exit_code() {
        let err: AppError = AnalysisError::InvalidWindow("0".to_string()).into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Invalid EWM window"));
    }
}
