//! HTTP rendering of fatal analysis errors.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::types::AnalysisError;

/// JSON body returned for every failed analysis request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub code: String,
    pub suggested_action: String,
}

impl From<&AnalysisError> for ErrorBody {
    fn from(error: &AnalysisError) -> Self {
        Self {
            error: error.kind.title().to_string(),
            message: error.user_message.clone(),
            code: error.kind.code().to_string(),
            suggested_action: error.suggested_action.clone(),
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.kind.http_status();
        // Technical detail stays in the logs, never in the body
        if status.is_server_error() {
            log::error!("[{}] {} - {}", self.kind, self.user_message, self.technical_detail);
        } else {
            log::warn!("[{}] {} - {}", self.kind, self.user_message, self.technical_detail);
        }
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}
