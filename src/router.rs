use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app_state::AppState,
    drafts::{self, dtos},
    entities::{ImportantDate, ImportantLink, PostType, PostingStatus},
    health,
    middleware::{RateLimit, rate_limit_middleware},
};

#[derive(OpenApi)]
#[openapi(
    info(title = "jobscout admin API"),
    paths(health::health_check, drafts::handlers::create_draft),
    components(schemas(
        health::HealthResponse,
        dtos::CreateDraftRequest,
        dtos::CreateDraftResponse,
        dtos::PostingResponse,
        dtos::ErrorResponse,
        ImportantDate,
        ImportantLink,
        PostType,
        PostingStatus,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "drafts", description = "Manual drafting of notice pages")
    )
)]
pub struct ApiDoc;

/// Admin API with tracing, request ids and per-IP rate limiting on `/v1`.
pub fn build_router(state: AppState, rate_limit: RateLimit) -> Router {
    let v1 = Router::new()
        .route("/v1/drafts", post(drafts::create_draft))
        .route_layer(middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ));

    Router::new()
        .route("/healthz", get(health::health_check))
        .merge(v1)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}
