use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        health::{healthz, livez},
        media::{
            create_media, delete_media, get_media, get_media_by_file_name, get_media_by_hash,
            list_media, list_media_children, list_root_media, media_ancestors, media_subtree,
            move_media, update_media,
        },
        settings::{delete_setting, get_setting, list_settings, put_setting},
        taxonomies::{
            create_taxonomy, delete_taxonomy, get_taxonomy, get_taxonomy_by_slug,
            list_root_taxonomies, list_taxonomies, list_taxonomy_children, move_taxonomy,
            taxonomy_ancestors, taxonomy_subtree, update_taxonomy,
        },
        users::{create_user, delete_user, get_user, list_users, lookup_user, update_user},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        // User routes
        .route("/users", get(list_users).post(create_user))
        .route("/users/lookup", get(lookup_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        // Media routes
        .route("/media", get(list_media).post(create_media))
        .route("/media/roots", get(list_root_media))
        .route("/media/hash/{hash}", get(get_media_by_hash))
        .route("/media/file/{file_name}", get(get_media_by_file_name))
        .route(
            "/media/{id}",
            get(get_media).put(update_media).delete(delete_media),
        )
        .route("/media/{id}/children", get(list_media_children))
        .route("/media/{id}/subtree", get(media_subtree))
        .route("/media/{id}/ancestors", get(media_ancestors))
        .route("/media/{id}/move", post(move_media))
        // Taxonomy routes
        .route("/taxonomies", get(list_taxonomies).post(create_taxonomy))
        .route("/taxonomies/roots", get(list_root_taxonomies))
        .route("/taxonomies/slug/{slug}", get(get_taxonomy_by_slug))
        .route(
            "/taxonomies/{id}",
            get(get_taxonomy)
                .put(update_taxonomy)
                .delete(delete_taxonomy),
        )
        .route("/taxonomies/{id}/children", get(list_taxonomy_children))
        .route("/taxonomies/{id}/subtree", get(taxonomy_subtree))
        .route("/taxonomies/{id}/ancestors", get(taxonomy_ancestors))
        .route("/taxonomies/{id}/move", post(move_taxonomy))
        // Setting routes
        .route("/settings", get(list_settings))
        .route(
            "/settings/{key}",
            get(get_setting).put(put_setting).delete(delete_setting),
        )
        .layer(cors);

    Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .with_state(state)
}
