//! Analysis resource endpoints: /analytics/...
//!
//! Browser-facing pages (detail, new, metadata, remove confirmation) send
//! anonymous requesters to the login flow; programmatic endpoints (create,
//! payload update, remove POST, /view/) answer a plain 401 instead.

use crate::error::{Result, ServerError};
use crate::principal::MaybePrincipal;
use crate::state::AppState;
use crate::telemetry::{create_request_span, extract_request_id, set_span_error_code};
use analytics_model::{
    authorize, strip_tags, AccessPolicy, Analysis, Capability, MetadataUpdate, NewAnalysis, Page,
};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tracing::Instrument;

/// List entry without the payload; clients fetch `data` via the detail
/// endpoints
#[derive(Serialize)]
struct AnalysisSummary {
    id: u64,
    title: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
    owner: String,
    popular_count: u64,
    keywords: Vec<String>,
    created: chrono::DateTime<chrono::Utc>,
}

impl From<&Analysis> for AnalysisSummary {
    fn from(a: &Analysis) -> Self {
        AnalysisSummary {
            id: a.id,
            title: a.title.clone(),
            abstract_text: a.abstract_text.clone(),
            owner: a.owner.clone(),
            popular_count: a.popular_count,
            keywords: a.keywords.clone(),
            created: a.created,
        }
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    limit: Option<usize>,
    offset: Option<usize>,
}

#[derive(Deserialize)]
pub struct NewParams {
    copy: Option<u64>,
}

/// 302 to the login flow, preserving the page the requester was after
fn login_redirect(state: &AppState, next: &str) -> Response {
    let location = format!("{}?next={}", state.config.login_url, next);
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Permission gate for browser pages: anonymous requesters are redirected
/// to login, authenticated requesters lacking the capability get 401.
///
/// Returns `Ok(Some(response))` when a redirect short-circuits the handler.
fn check_page(
    state: &AppState,
    principal: &MaybePrincipal,
    owner: &str,
    policy: &AccessPolicy,
    required: Capability,
    next: &str,
) -> Result<Option<Response>> {
    match authorize(principal.name(), owner, policy, required) {
        Ok(()) => Ok(None),
        Err(denied) if denied.anonymous => Ok(Some(login_redirect(state, next))),
        Err(denied) => Err(ServerError::unauthorized(denied.to_string())),
    }
}

/// Permission gate for programmatic endpoints: every denial is a 401.
fn check_api(
    principal: &MaybePrincipal,
    owner: &str,
    policy: &AccessPolicy,
    required: Capability,
) -> Result<()> {
    authorize(principal.name(), owner, policy, required)
        .map_err(|denied| ServerError::unauthorized(denied.to_string()))
}

/// List analyses, newest first
///
/// GET /analytics/
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<JsonValue>> {
    let mut page = Page::default();
    if let Some(limit) = params.limit {
        page.limit = limit;
    }
    if let Some(offset) = params.offset {
        page.offset = offset;
    }

    let analyses = state.store.list(page).await?;
    let items: Vec<AnalysisSummary> = analyses.iter().map(AnalysisSummary::from).collect();

    tracing::debug!(count = items.len(), "analysis list served");
    Ok(Json(json!({
        "analyses": items,
        "limit": page.limit,
        "offset": page.offset,
    })))
}

/// New-analysis page context
///
/// GET /analytics/new/?copy=<id>
///
/// The empty form is public. When `copy` names an entity the requester may
/// view, the response carries that entity's payload for pre-population; a
/// copy the requester may not view is a permission error, never a silent
/// empty form.
pub async fn new_page(
    State(state): State<Arc<AppState>>,
    principal: MaybePrincipal,
    Query(params): Query<NewParams>,
) -> Result<Response> {
    let copy = match params.copy {
        Some(id) => {
            let source = state.store.get(id).await?;
            if let Some(redirect) = check_page(
                &state,
                &principal,
                &source.owner,
                &source.policy,
                Capability::View,
                &format!("/analytics/new/?copy={id}"),
            )? {
                return Ok(redirect);
            }
            Some(json!({
                "id": source.id,
                "title": source.title,
                "abstract": source.abstract_text,
                "data": source.data,
            }))
        }
        None => None,
    };

    Ok(Json(json!({ "copy": copy })).into_response())
}

#[derive(Deserialize)]
struct CreatePayload {
    title: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
    data: JsonValue,
}

/// Create an analysis
///
/// POST /analytics/new/data/
///
/// Body is `{"title": ..., "abstract": ..., "data": <any JSON value>}`.
/// Answers 200 with the new numeric id as the body.
pub async fn create(
    State(state): State<Arc<AppState>>,
    principal: MaybePrincipal,
    headers: HeaderMap,
    body: String,
) -> Result<Response> {
    let request_id = extract_request_id(&headers, &state.telemetry_config);
    let span = create_request_span("analysis_create", request_id.as_deref(), None);
    async move {
        let span = tracing::Span::current();

        let owner = match principal.require() {
            Ok(name) => name.to_string(),
            Err(e) => {
                set_span_error_code(&span, "error:Unauthorized");
                return Err(e);
            }
        };

        let payload: CreatePayload = match serde_json::from_str(&body) {
            Ok(p) => p,
            Err(e) => {
                set_span_error_code(&span, "error:BadRequest");
                tracing::warn!(error = %e, "malformed create body");
                return Err(ServerError::Json(e));
            }
        };

        let data = serde_json::to_string(&payload.data)?;
        let analysis = state
            .store
            .create(NewAnalysis {
                title: payload.title,
                abstract_text: payload.abstract_text,
                owner,
                data,
            })
            .await?;

        tracing::info!(analysis_id = analysis.id, "analysis created");
        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            analysis.id.to_string(),
        )
            .into_response())
    }
    .instrument(span)
    .await
}

/// Detail page: returns the entity and counts the view
///
/// GET /analytics/{id}/
pub async fn detail(
    State(state): State<Arc<AppState>>,
    principal: MaybePrincipal,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Response> {
    let request_id = extract_request_id(&headers, &state.telemetry_config);
    let span = create_request_span("analysis_detail", request_id.as_deref(), Some(id));
    async move {
        let span = tracing::Span::current();

        let analysis = state.store.get(id).await?;
        let next = format!("/analytics/{id}/");
        if let Some(redirect) = check_page(
            &state,
            &principal,
            &analysis.owner,
            &analysis.policy,
            Capability::View,
            &next,
        )
        .inspect_err(|_| set_span_error_code(&span, "error:Unauthorized"))?
        {
            return Ok(redirect);
        }

        // Counted exactly once per detail request, atomically at the store
        let analysis = state.store.record_view(id).await?;
        tracing::debug!(popular_count = analysis.popular_count, "detail view counted");
        Ok(Json(analysis).into_response())
    }
    .instrument(span)
    .await
}

/// Entity detail without the view side effect
///
/// GET /analytics/{id}/view/
pub async fn view(
    State(state): State<Arc<AppState>>,
    principal: MaybePrincipal,
    Path(id): Path<u64>,
) -> Result<Json<Analysis>> {
    let analysis = state.store.get(id).await?;
    check_api(&principal, &analysis.owner, &analysis.policy, Capability::View)?;
    Ok(Json(analysis))
}

#[derive(Deserialize)]
struct DataPayload {
    data: JsonValue,
}

/// Overwrite the payload
///
/// PUT /analytics/{id}/data/
///
/// Body is `{"data": <any JSON value>}`; the stored payload becomes the
/// re-serialized `data` sub-value. A missing `data` key or a non-JSON body
/// is a 400.
pub async fn update_data(
    State(state): State<Arc<AppState>>,
    principal: MaybePrincipal,
    Path(id): Path<u64>,
    headers: HeaderMap,
    body: String,
) -> Result<Response> {
    let request_id = extract_request_id(&headers, &state.telemetry_config);
    let span = create_request_span("analysis_update_data", request_id.as_deref(), Some(id));
    async move {
        let span = tracing::Span::current();

        if let Err(e) = principal.require() {
            set_span_error_code(&span, "error:Unauthorized");
            return Err(e);
        }

        let analysis = state.store.get(id).await?;
        check_api(&principal, &analysis.owner, &analysis.policy, Capability::Change)
            .inspect_err(|_| set_span_error_code(&span, "error:Unauthorized"))?;

        let payload: DataPayload = match serde_json::from_str(&body) {
            Ok(p) => p,
            Err(e) => {
                set_span_error_code(&span, "error:BadRequest");
                tracing::warn!(error = %e, "malformed data body");
                return Err(ServerError::Json(e));
            }
        };

        let data = serde_json::to_string(&payload.data)?;
        let analysis = state.store.update_data(id, data).await?;

        tracing::info!(analysis_id = id, "payload updated");
        Ok(Json(json!({ "id": analysis.id, "data": analysis.data })).into_response())
    }
    .instrument(span)
    .await
}

/// Removal confirmation page
///
/// GET /analytics/{id}/remove/
pub async fn remove_confirm(
    State(state): State<Arc<AppState>>,
    principal: MaybePrincipal,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Response> {
    let request_id = extract_request_id(&headers, &state.telemetry_config);
    let span = create_request_span("analysis_remove_confirm", request_id.as_deref(), Some(id));
    async move {
        let span = tracing::Span::current();

        let analysis = state.store.get(id).await?;
        let next = format!("/analytics/{id}/remove/");
        if let Some(redirect) = check_page(
            &state,
            &principal,
            &analysis.owner,
            &analysis.policy,
            Capability::Delete,
            &next,
        )
        .inspect_err(|_| set_span_error_code(&span, "error:Unauthorized"))?
        {
            return Ok(redirect);
        }

        Ok(Json(json!({
            "id": analysis.id,
            "title": analysis.title,
            "confirm": format!("/analytics/{id}/remove/"),
        }))
        .into_response())
    }
    .instrument(span)
    .await
}

/// Remove the entity and its ratings, then send the client back to the list
///
/// POST /analytics/{id}/remove/
pub async fn remove(
    State(state): State<Arc<AppState>>,
    principal: MaybePrincipal,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Response> {
    let request_id = extract_request_id(&headers, &state.telemetry_config);
    let span = create_request_span("analysis_remove", request_id.as_deref(), Some(id));
    async move {
        let span = tracing::Span::current();

        if let Err(e) = principal.require() {
            set_span_error_code(&span, "error:Unauthorized");
            return Err(e);
        }

        let analysis = state.store.get(id).await?;
        check_api(&principal, &analysis.owner, &analysis.policy, Capability::Delete)
            .inspect_err(|_| set_span_error_code(&span, "error:Unauthorized"))?;

        state.store.remove(id).await?;

        tracing::info!(analysis_id = id, "analysis removed");
        Ok((StatusCode::FOUND, [(header::LOCATION, "/analytics/")]).into_response())
    }
    .instrument(span)
    .await
}

/// Metadata edit form context
///
/// GET /analytics/{id}/metadata/
///
/// Requires login; loading the form needs view permission.
pub async fn metadata_form(
    State(state): State<Arc<AppState>>,
    principal: MaybePrincipal,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Response> {
    let request_id = extract_request_id(&headers, &state.telemetry_config);
    let span = create_request_span("analysis_metadata_form", request_id.as_deref(), Some(id));
    async move {
        let span = tracing::Span::current();

        let next = format!("/analytics/{id}/metadata/");
        if principal.name().is_none() {
            return Ok(login_redirect(&state, &next));
        }

        let analysis = state.store.get(id).await?;
        check_api(&principal, &analysis.owner, &analysis.policy, Capability::View)
            .inspect_err(|_| set_span_error_code(&span, "error:Unauthorized"))?;

        Ok(Json(json!({
            "id": analysis.id,
            "title": analysis.title,
            "abstract": analysis.abstract_text,
            "category": analysis.category,
            "keywords": analysis.keywords,
            "point_of_contact": analysis.point_of_contact,
            "metadata_author": analysis.metadata_author,
        }))
        .into_response())
    }
    .instrument(span)
    .await
}

/// Persist metadata
///
/// POST /analytics/{id}/metadata/
///
/// Title and abstract are tag-stripped before persistence. A title or
/// abstract that is empty after stripping re-renders the form with errors
/// and persists nothing.
pub async fn metadata_save(
    State(state): State<Arc<AppState>>,
    principal: MaybePrincipal,
    Path(id): Path<u64>,
    headers: HeaderMap,
    body: String,
) -> Result<Response> {
    let request_id = extract_request_id(&headers, &state.telemetry_config);
    let span = create_request_span("analysis_metadata_save", request_id.as_deref(), Some(id));
    async move {
        let span = tracing::Span::current();

        if principal.name().is_none() {
            return Ok(login_redirect(&state, &format!("/analytics/{id}/metadata/")));
        }

        let analysis = state.store.get(id).await?;
        check_api(&principal, &analysis.owner, &analysis.policy, Capability::Change)
            .inspect_err(|_| set_span_error_code(&span, "error:Unauthorized"))?;

        let mut meta: MetadataUpdate = match serde_json::from_str(&body) {
            Ok(m) => m,
            Err(e) => {
                set_span_error_code(&span, "error:BadRequest");
                tracing::warn!(error = %e, "malformed metadata body");
                return Err(ServerError::Json(e));
            }
        };
        meta.title = strip_tags(&meta.title).trim().to_string();
        meta.abstract_text = strip_tags(&meta.abstract_text).trim().to_string();

        let mut errors = Vec::new();
        if meta.title.is_empty() {
            errors.push("title must not be empty");
        }
        if meta.abstract_text.is_empty() {
            errors.push("abstract must not be empty");
        }
        if !errors.is_empty() {
            return Ok(Json(json!({ "errors": errors })).into_response());
        }

        state.store.update_metadata(id, meta).await?;

        tracing::info!(analysis_id = id, "metadata updated");
        Ok((StatusCode::FOUND, [(header::LOCATION, format!("/analytics/{id}/"))]).into_response())
    }
    .instrument(span)
    .await
}
