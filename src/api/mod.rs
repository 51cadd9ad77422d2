use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, CatalogError, StoreError};
use crate::query::{self, CourseQuery, FileSortKey, SortOrder};
use crate::repository::is_valid_slug;
use crate::state::AppState;

#[derive(Deserialize)]
struct FileQueryParams {
    #[serde(default)]
    sort: Option<FileSortKey>,
    #[serde(default)]
    order: SortOrder,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses))
        .route("/courses/", get(missing_slug))
        .route("/courses/{slug}", get(course_details))
        .route("/filters", get(filters))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

fn with_freshness(state: &AppState, body: impl IntoResponse) -> Response {
    let cache_control = format!("public, max-age={}", state.revalidate.as_secs());
    ([(header::CACHE_CONTROL, cache_control)], body).into_response()
}

async fn list_courses(
    State(state): State<AppState>,
    query: Result<Query<CourseQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let courses = state.repository.list_courses().await?;
    let courses = if query.is_empty() {
        courses
    } else {
        query::derive_view(&courses, &query)
    };

    Ok(with_freshness(&state, Json(courses)))
}

async fn missing_slug() -> AppError {
    AppError::BadRequest("Course slug is required".to_string())
}

async fn course_details(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    params: Result<Query<FileQueryParams>, QueryRejection>,
) -> Result<Response, AppError> {
    if !is_valid_slug(&slug) {
        return Err(AppError::BadRequest(format!("Invalid course slug '{}'", slug)));
    }
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut details = state
        .repository
        .get_course_details(&slug)
        .await
        .map_err(|e| match e {
            CatalogError::Store(StoreError::Unavailable(details)) => AppError::Internal {
                error: format!("Failed to fetch details for course '{}'", slug),
                details,
            },
            other => other.into(),
        })?;

    if let Some(key) = params.sort {
        details.files = query::sort_files(&details.files, key, params.order);
    }

    info!("Returning details for '{}'", slug);
    Ok(with_freshness(&state, Json(details)))
}

async fn filters(State(state): State<AppState>) -> Result<Response, AppError> {
    let courses = state.repository.list_courses().await?;
    Ok(with_freshness(&state, Json(query::filter_options(&courses))))
}
