//! Analysis handler.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::super::types::AppState;
use crate::error_handling::AnalysisError;
use crate::models::AnalysisRequest;
use crate::utils::RequestBudget;

/// `POST /api/analysis/analyze`
///
/// The analysis runs on its own task so that a panic in any stage becomes an
/// `INTERNAL_ERROR` response. Dropping the handler (client gone) cancels the
/// request token, which stops pending retries.
pub async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return AnalysisError::invalid_input(
                "The body must be JSON with a 'query' and a 'type' of ipv4, ipv6, asn or domain",
                rejection.body_text(),
            )
            .into_response()
        }
    };

    let cancel = state.shutdown.child_token();
    let _cancel_on_drop = cancel.clone().drop_guard();
    let budget = RequestBudget::new(state.request_timeout, cancel);
    let analyzer = Arc::clone(&state.analyzer);

    let task = tokio::spawn(async move { analyzer.analyze(&request, &budget).await });
    match task.await {
        Ok(Ok(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(Err(error)) => error.into_response(),
        Err(join_error) => {
            AnalysisError::internal(format!("analysis task failed: {}", join_error)).into_response()
        }
    }
}
