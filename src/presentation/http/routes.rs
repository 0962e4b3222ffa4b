//! Route Configuration
//!
//! Wires handlers to paths and applies the middleware stack. Protected
//! routes sit behind the session middleware; registration, login,
//! logout, directory reads, and health probes stay open.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::presentation::http::handlers::{health, messaging, user};
use crate::presentation::middleware::{create_cors_layer, create_trace_layer, session_middleware};
use crate::startup::AppState;

/// Build the application router.
pub fn create_routes(state: AppState) -> Router {
    let public_users = Router::new()
        .route("/create", post(user::create_user))
        .route("/get", get(user::get_user))
        .route("/getList", get(user::get_user_list))
        .route("/login", post(user::login))
        // Logout is tolerant of absent tokens, so it must not pass
        // through the session gate.
        .route("/logout", post(user::logout));

    let protected_users = Router::new()
        .route("/isAuth", get(user::is_auth))
        .route("/getSelf", get(user::get_self))
        .route("/delete", post(user::delete_user))
        .route("/updateRelationship", post(user::update_relationship))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    let messaging_routes = Router::new()
        .route("/create", post(messaging::create_channel))
        .route("/get", get(messaging::get_channel))
        .route("/getList", get(messaging::get_channel_list))
        .route("/postMessage", post(messaging::post_message))
        .route("/addUser", post(messaging::add_user))
        .route("/leave", post(messaging::leave_channel))
        .route("/delete", post(messaging::delete_channel))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    let health_routes = Router::new()
        .route("/", get(health::health_check))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness));

    Router::new()
        .nest("/users", public_users.merge(protected_users))
        .nest("/messaging", messaging_routes)
        .nest("/health", health_routes)
        .layer(create_trace_layer())
        .layer(create_cors_layer(&state.settings.cors))
        .with_state(state)
}
