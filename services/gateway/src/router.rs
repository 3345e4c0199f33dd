use crate::error::{method_not_allowed, route_not_found};
use crate::handlers::{auth, calculate, dashboard, health, market, trades};
use crate::rate_limit;
use crate::state::AppState;
use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    // Outermost layer last: trace -> cors -> rate limit -> routes.
    // CORS answers every preflight itself, so OPTIONS never counts
    // against a client's window.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/calculate", post(calculate::calculate))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/admin/users", get(auth::list_users))
        .route("/api/trades", post(trades::save_trade).get(trades::list_trades))
        .route("/api/trades/export", get(trades::export_trades))
        .route("/api/trades/{id}", get(trades::get_trade).delete(trades::delete_trade))
        .route("/api/exchanges", get(market::list_exchanges))
        .route("/api/symbols", get(market::list_symbols))
        .route("/api/prices", get(market::prices))
        .route("/api/dashboard/stats", get(dashboard::stats))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::enforce))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
