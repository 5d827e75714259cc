//! Processing result.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Outcome of processing raw data: processed data or the full list of
/// validation messages, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingResult<T> {
    Valid { processed_data: T },
    Invalid { validation_errors_messages: Vec<String> },
}

impl<T> ProcessingResult<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, ProcessingResult::Valid { .. })
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    pub fn processed_data(&self) -> Option<&T> {
        match self {
            ProcessingResult::Valid { processed_data } => Some(processed_data),
            ProcessingResult::Invalid { .. } => None,
        }
    }

    /// Messages in report order; empty for a valid result.
    pub fn validation_errors_messages(&self) -> &[String] {
        match self {
            ProcessingResult::Valid { .. } => &[],
            ProcessingResult::Invalid {
                validation_errors_messages,
            } => validation_errors_messages,
        }
    }

    pub fn into_result(self) -> Result<T, Vec<String>> {
        match self {
            ProcessingResult::Valid { processed_data } => Ok(processed_data),
            ProcessingResult::Invalid {
                validation_errors_messages,
            } => Err(validation_errors_messages),
        }
    }

    pub fn map<U, F>(self, f: F) -> ProcessingResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            ProcessingResult::Valid { processed_data } => ProcessingResult::Valid {
                processed_data: f(processed_data),
            },
            ProcessingResult::Invalid {
                validation_errors_messages,
            } => ProcessingResult::Invalid {
                validation_errors_messages,
            },
        }
    }
}

impl ProcessingResult<Value> {
    /// Deserialize processed data into a typed value.
    ///
    /// An error here means the specification and `T` disagree, which is a
    /// programming fault rather than bad request data.
    pub fn deserialize<T: DeserializeOwned>(
        self,
    ) -> Result<ProcessingResult<T>, serde_json::Error> {
        match self {
            ProcessingResult::Valid { processed_data } => Ok(ProcessingResult::Valid {
                processed_data: serde_json::from_value(processed_data)?,
            }),
            ProcessingResult::Invalid {
                validation_errors_messages,
            } => Ok(ProcessingResult::Invalid {
                validation_errors_messages,
            }),
        }
    }
}
