use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::{AppConfig, Environment};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{admin_middleware, jwt_auth_middleware};
use crate::state::AppState;

/// The full HTTP surface. Static `/functions/v1/<name>` routes win over `:function`.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .merge(elevated_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/tools", get(public::tools))
        .route("/api/routes/guard", get(public::route_guard))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/generations", post(protected::generation_post))
        .route("/api/generations/stream", get(protected::generation_stream))
        .route("/api/generations/:id", delete(protected::generation_delete))
        .route("/api/assets", get(protected::asset_list))
        .route("/api/assets/:id/favorite", post(protected::asset_favorite))
        .route("/api/loras", get(protected::lora_list))
        .route("/functions/v1/:function", post(protected::function_post))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/functions/v1/parse-fal-documentation",
            post(elevated::parse_fal_documentation),
        )
        .route("/functions/v1/admin-ban-user", post(elevated::ban_user))
        .route("/functions/v1/admin-get-users", post(elevated::admin_get_users))
        .route(
            "/functions/v1/admin-get-user-generations",
            post(elevated::admin_get_user_generations),
        )
        .route(
            "/functions/v1/admin-get-recent-generations",
            post(elevated::admin_get_recent_generations),
        )
        .route(
            "/functions/v1/admin-toggle-showcase",
            post(elevated::admin_toggle_showcase),
        )
        .route(
            "/functions/v1/admin-permanent-delete",
            post(elevated::admin_permanent_delete),
        )
        .route(
            "/functions/v1/admin-lora-operations",
            post(elevated::lora_operations),
        )
        .route("/api/admin/toolgen/parse", post(elevated::toolgen_parse))
        .route("/api/admin/toolgen/generate", post(elevated::toolgen_generate))
        .route(
            "/api/admin/loras",
            get(elevated::lora_list_all).post(elevated::lora_create),
        )
        .route(
            "/api/admin/loras/:id",
            put(elevated::lora_update).delete(elevated::lora_delete),
        )
        // layers run bottom-up: authenticate first, then check admin
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
