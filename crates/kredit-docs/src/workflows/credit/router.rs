use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::category::{descriptors, Category};
use super::records::{RecordId, RecordStore};
use super::service::{CreditDocumentService, CreditServiceError};
use super::templates::{TemplateAssetStore, TemplateRenderer};
use crate::error::AppError;

/// Form submission: every field as a string, plus the id when editing an existing record.
#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub debitur_id: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub file_name: String,
}

/// Router builder exposing record intake, history, context preview and document download.
pub fn credit_router<S, R, T>(service: Arc<CreditDocumentService<S, R, T>>) -> Router
where
    S: RecordStore + 'static,
    R: TemplateRenderer + 'static,
    T: TemplateAssetStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/records",
            post(save_handler::<S, R, T>).get(list_handler::<S, R, T>),
        )
        .route(
            "/api/v1/records/:record_id",
            get(record_handler::<S, R, T>).delete(delete_handler::<S, R, T>),
        )
        .route(
            "/api/v1/records/:record_id/context",
            get(context_handler::<S, R, T>),
        )
        .route(
            "/api/v1/records/:record_id/document",
            get(document_handler::<S, R, T>),
        )
        .route(
            "/api/v1/templates/:category",
            put(upload_template_handler::<S, R, T>),
        )
        .route("/api/v1/categories", get(categories_handler))
        .with_state(service)
}

pub(crate) async fn save_handler<S, R, T>(
    State(service): State<Arc<CreditDocumentService<S, R, T>>>,
    Json(submission): Json<SubmissionRequest>,
) -> Response
where
    S: RecordStore + 'static,
    R: TemplateRenderer + 'static,
    T: TemplateAssetStore + 'static,
{
    let existing = submission
        .debitur_id
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty() && raw.chars().all(|ch| ch.is_ascii_digit()))
        .and_then(|raw| raw.parse::<u64>().ok())
        .map(RecordId);

    let fields = submission.fields;
    match run_blocking(service, move |service| service.save(existing, fields)).await {
        Ok(id) => {
            let status = if existing.is_some() {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            (status, Json(json!({ "id": id }))).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_handler<S, R, T>(
    State(service): State<Arc<CreditDocumentService<S, R, T>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: RecordStore + 'static,
    R: TemplateRenderer + 'static,
    T: TemplateAssetStore + 'static,
{
    match run_blocking(service, move |service| service.list(query.q.as_deref())).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn record_handler<S, R, T>(
    State(service): State<Arc<CreditDocumentService<S, R, T>>>,
    Path(record_id): Path<u64>,
) -> Response
where
    S: RecordStore + 'static,
    R: TemplateRenderer + 'static,
    T: TemplateAssetStore + 'static,
{
    match run_blocking(service, move |service| service.get(RecordId(record_id))).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn delete_handler<S, R, T>(
    State(service): State<Arc<CreditDocumentService<S, R, T>>>,
    Path(record_id): Path<u64>,
) -> Response
where
    S: RecordStore + 'static,
    R: TemplateRenderer + 'static,
    T: TemplateAssetStore + 'static,
{
    match run_blocking(service, move |service| service.delete(RecordId(record_id))).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn context_handler<S, R, T>(
    State(service): State<Arc<CreditDocumentService<S, R, T>>>,
    Path(record_id): Path<u64>,
) -> Response
where
    S: RecordStore + 'static,
    R: TemplateRenderer + 'static,
    T: TemplateAssetStore + 'static,
{
    match run_blocking(service, move |service| service.context(RecordId(record_id))).await {
        Ok(context) => (StatusCode::OK, Json(context)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn document_handler<S, R, T>(
    State(service): State<Arc<CreditDocumentService<S, R, T>>>,
    Path(record_id): Path<u64>,
) -> Response
where
    S: RecordStore + 'static,
    R: TemplateRenderer + 'static,
    T: TemplateAssetStore + 'static,
{
    match run_blocking(service, move |service| service.generate(RecordId(record_id))).await {
        Ok(document) => {
            let disposition = format!("attachment; filename=\"{}\"", document.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, document.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                document.bytes,
            )
                .into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn upload_template_handler<S, R, T>(
    State(service): State<Arc<CreditDocumentService<S, R, T>>>,
    Path(category): Path<String>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Response
where
    S: RecordStore + 'static,
    R: TemplateRenderer + 'static,
    T: TemplateAssetStore + 'static,
{
    let category = match Category::from_tag(&category) {
        Ok(category) => category,
        Err(err) => return AppError::from(err).into_response(),
    };

    let upload = move |service: &CreditDocumentService<S, R, T>| {
        service.upload_template(category, &query.file_name, &body)
    };
    match run_blocking(service, upload).await {
        Ok(template_id) => (
            StatusCode::CREATED,
            Json(json!({ "category": category, "template_id": template_id })),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn categories_handler() -> Response {
    (StatusCode::OK, Json(descriptors())).into_response()
}

/// Runs a service call on the blocking pool; record and template stores do file I/O.
async fn run_blocking<S, R, T, F, O>(
    service: Arc<CreditDocumentService<S, R, T>>,
    call: F,
) -> Result<O, AppError>
where
    S: RecordStore + 'static,
    R: TemplateRenderer + 'static,
    T: TemplateAssetStore + 'static,
    F: FnOnce(&CreditDocumentService<S, R, T>) -> Result<O, CreditServiceError> + Send + 'static,
    O: Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(axum::Error::new)?;
    outcome.map_err(AppError::from)
}
