use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};

use crate::state::AppState;
use crate::{admin, auth, property};

pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    let protected_routes = Router::new()
        .route(
            "/api/admin/properties",
            get(admin::list_properties).post(admin::save_property),
        )
        .route("/api/admin/properties/delete", post(admin::delete_property))
        .route(
            "/api/admin/uploads",
            post(admin::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/admin/gallery", post(admin::edit_gallery))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    Router::new()
        .route("/", get(|| async { "Hello, Pit Propertindo!" }))
        .route("/properties", get(property::get_properties))
        .route("/properties/:slug", get(property::get_property))
        .route("/admin", get(admin::admin_view))
        .route("/admin/login", post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .merge(protected_routes)
        .with_state(state)
}
