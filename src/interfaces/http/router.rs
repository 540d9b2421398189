//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::ErrorBody;
use super::modules::health::{self, ComponentHealth, HealthResponse, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;
use super::modules::users::{
    self, ChangePasswordRequest, CreateUserRequest, CreatedUserResponse, MessageResponse,
    UpdateUserRequest, UserDto, UserHandlerState, UserIdResponse,
};
use crate::application::AccountService;
use crate::domain::AccountRepository;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Account Service API",
        description = "User account management with self-service password change"
    ),
    paths(
        // Health
        health::health_check,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::change_password,
    ),
    components(schemas(
        UserDto,
        CreateUserRequest,
        CreatedUserResponse,
        UpdateUserRequest,
        ChangePasswordRequest,
        UserIdResponse,
        MessageResponse,
        ErrorBody,
        HealthResponse,
        ComponentHealth,
    )),
    tags(
        (name = "Users", description = "Account management"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Everything the HTTP layer needs from the rest of the service.
#[derive(Clone)]
pub struct ApiContext {
    pub account_service: Arc<AccountService>,
    pub repo: Arc<dyn AccountRepository>,
    pub strict_passwords: bool,
    pub prometheus: PrometheusHandle,
    pub started_at: Instant,
}

fn user_routes(state: UserHandlerState) -> Router {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user)
                .patch(users::change_password),
        )
        .with_state(state)
}

pub fn create_api_router(ctx: ApiContext) -> Router {
    let user_state = UserHandlerState {
        account_service: ctx.account_service,
        strict_passwords: ctx.strict_passwords,
    };

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            repo: ctx.repo,
            started_at: ctx.started_at,
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(MetricsState {
            handle: ctx.prometheus,
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/users", user_routes(user_state.clone()))
        .nest("/api/v1/users", user_routes(user_state))
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
}
