use serde::{Deserialize, Serialize};

/// Body returned with every non-success response. The message is generic,
/// details only go to the server log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self { error: error.into() }
    }
}
