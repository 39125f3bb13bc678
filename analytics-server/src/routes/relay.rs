//! OLAP query relay endpoint: /analytics/api/
//!
//! The body of a POST is forwarded verbatim to the upstream engine and the
//! engine's reply comes back as the response body. Any other method answers
//! 200 with a plain-text misuse message; long-standing client code depends
//! on that exact status and wording.

use crate::error::{Result, ServerError};
use crate::state::AppState;
use crate::telemetry::{create_request_span, extract_request_id, set_span_error_code};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::Instrument;

const WRONG_USE: &str = "Wrong use of the API";

/// Forward a query to the OLAP engine
///
/// POST /analytics/api/
pub async fn api(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    if method != Method::POST {
        return Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            WRONG_USE,
        )
            .into_response());
    }

    let request_id = extract_request_id(&headers, &state.telemetry_config);
    let span = create_request_span("relay", request_id.as_deref(), None);
    async move {
        let span = tracing::Span::current();

        let query = match String::from_utf8(body.to_vec()) {
            Ok(q) => q,
            Err(e) => {
                set_span_error_code(&span, "error:BadRequest");
                return Err(ServerError::bad_request(format!(
                    "query must be UTF-8 text: {e}"
                )));
            }
        };

        tracing::debug!(query_len = query.len(), "relaying query");

        let response = state.relay.relay(&query).await.map_err(|e| {
            set_span_error_code(&span, "error:RelayFailed");
            tracing::error!(error = %e, upstream = %state.relay.addr(), "relay failed");
            ServerError::Relay(e)
        })?;

        tracing::info!(response_len = response.len(), "relay completed");
        // The engine speaks JSON; the relay labels but never inspects it
        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            response,
        )
            .into_response())
    }
    .instrument(span)
    .await
}
