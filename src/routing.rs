//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router, middleware,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_forgot_password_page, get_log_in_page, get_log_out,
        get_register_page, post_log_in, register_user,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    landing::get_landing_page,
    not_found::get_404_not_found,
    purchase::{
        create_purchase_endpoint, delete_purchase_endpoint, edit_purchase_endpoint,
        get_dashboard_page, get_edit_purchase_page, get_purchase_detail_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_landing_page))
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::PURCHASE_VIEW, get(get_purchase_detail_page))
        .route(endpoints::EDIT_PURCHASE_VIEW, get(get_edit_purchase_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::PURCHASES_API, post(create_purchase_endpoint))
            .route(endpoints::PURCHASE_API, put(edit_purchase_endpoint))
            .route(endpoints::PURCHASE_API, delete(delete_purchase_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Report that the server is up.
async fn get_health() -> Json<Value> {
    Json(json!({"status": "healthy", "message": "EasyCeipt is running!"}))
}

#[cfg(test)]
mod health_route_tests {
    use super::get_health;

    #[tokio::test]
    async fn health_reports_healthy() {
        let response = get_health().await;

        assert_eq!(response.0["status"], "healthy");
    }
}
