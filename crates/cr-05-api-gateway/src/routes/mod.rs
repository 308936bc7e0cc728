//! HTTP routes.
//!
//! | Route | Gate | Command |
//! |-------|------|---------|
//! | `POST /auth/login` | public | `login` |
//! | `POST /auth/registration` | public | `registration` |
//! | `GET /users` | identity | `get-all-users` |
//! | `GET /users/:id` | identity | `get-user` |
//! | `PUT /users/:id` | owner or admin | `edit-user` |
//! | `DELETE /users/:id` | owner or admin | `delete-user` |
//! | `POST /profiles` | identity (owner = caller) | `create-profile` |
//! | `GET /profiles` | identity | `get-all-profiles` |
//! | `GET /profiles/:id` | identity | `get-profile` |
//! | `PUT /profiles/:id` | profile owner or admin | `get-profile`, then `edit-profile` |
//! | `DELETE /profiles/:id` | profile owner or admin | `get-profile`, then `delete-profile` |
//!
//! `POST /profiles` is idempotent per owner: a caller who already has a
//! profile gets that profile back, still with `201 Created`. The profile
//! service reply does not say whether a row was inserted, so the status is
//! the same either way.

mod auth;
mod ops;
mod profiles;
mod users;

use crate::state::AppState;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use courier_telemetry::{HTTP_REQUESTS, HTTP_REQUEST_DURATION};
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Build the gateway router.
pub fn build_router(state: AppState, expose_metrics: bool) -> Router {
    let mut router = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/registration", post(auth::registration))
        .route("/users", get(users::list))
        .route(
            "/users/:id",
            get(users::get_one).put(users::edit).delete(users::remove),
        )
        .route("/profiles", post(profiles::create).get(profiles::list))
        .route(
            "/profiles/:id",
            get(profiles::get_one).put(profiles::edit).delete(profiles::remove),
        )
        .route("/health", get(ops::health));

    if expose_metrics {
        router = router.route("/metrics", get(ops::metrics));
    }

    router
        .route_layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let start = Instant::now();

    let response = next.run(req).await;

    HTTP_REQUESTS
        .with_label_values(&[&route, response.status().as_str()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[&route])
        .observe(start.elapsed().as_secs_f64());
    response
}
