use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::{
    app_state::AppState,
    drafts::{
        dtos::{CreateDraftRequest, CreateDraftResponse, ErrorResponse},
        fallback::fallback_posting,
    },
    entities::PostType,
    extractor::extract_page,
    repositories::InsertOutcome,
};

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Draft one notice page by hand.
#[utoipa::path(
    post,
    path = "/v1/drafts",
    tag = "drafts",
    request_body = CreateDraftRequest,
    responses(
        (status = 201, description = "Draft created", body = CreateDraftResponse),
        (status = 400, description = "Invalid URL", body = ErrorResponse),
        (status = 409, description = "A posting already exists for this URL", body = ErrorResponse),
        (status = 502, description = "The page could not be fetched", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(url = %payload.url))]
pub async fn create_draft(
    State(state): State<AppState>,
    Json(payload): Json<CreateDraftRequest>,
) -> Response {
    let url = match payload.validate() {
        Ok(url) => url,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, error),
    };
    let origin = url.as_str();
    let post_type = payload.post_type.unwrap_or(PostType::JobNotification);

    match state.postings.exists(origin).await {
        Ok(true) => {
            return error_response(StatusCode::CONFLICT, "A posting already exists for this URL");
        }
        Ok(false) => {}
        Err(e) => {
            error!("Failed to check for existing posting: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    }

    let page = match state.fetcher.fetch(origin).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "fetch failed");
            return error_response(StatusCode::BAD_GATEWAY, format!("Failed to fetch page: {e}"));
        }
    };
    let page = extract_page(&page.body_utf8, state.max_text_chars);

    let drafted = tokio::time::timeout(
        state.extraction_timeout,
        state.extractor.draft(&page.text, origin, post_type),
    )
    .await;
    let outcome = match drafted {
        Ok(Ok(extraction)) => Ok(extraction.into_new_posting(origin)),
        Ok(Err(e)) => Err(format!("Extraction failed, saved a fallback draft: {e}")),
        Err(_) => Err(format!(
            "Extraction timed out after {:?}, saved a fallback draft",
            state.extraction_timeout
        )),
    };
    let (new_posting, warning) = outcome.map_or_else(
        |warning| {
            warn!(warning = %warning, "extraction unavailable, saving fallback draft");
            (
                fallback_posting(&page, origin, post_type, Utc::now().date_naive()),
                Some(warning),
            )
        },
        |new_posting| (new_posting, None),
    );

    match state.postings.insert_draft(new_posting).await {
        Ok(InsertOutcome::Inserted(posting)) => {
            info!(posting_id = %posting.id, "draft created");
            (
                StatusCode::CREATED,
                Json(CreateDraftResponse {
                    posting: posting.into(),
                    warning,
                }),
            )
                .into_response()
        }
        Ok(InsertOutcome::Duplicate) => {
            error_response(StatusCode::CONFLICT, "A posting already exists for this URL")
        }
        Err(e) => {
            error!("Failed to save draft: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save draft")
        }
    }
}
