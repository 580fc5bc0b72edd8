//! Route table

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{auth, categories, collections, guests, health, members};
use crate::middleware::auth_rate_limit;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let login = Router::new()
        .route("/auth/google-callback", post(auth::google_callback))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_rate_limit));

    let api = Router::new()
        .merge(login)
        // Users
        .route("/auth/users", get(auth::list_users))
        .route("/auth/users/{id}", patch(auth::update_user))
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // Collections
        .route(
            "/collections",
            get(collections::list_collections).post(collections::create_collection),
        )
        .route(
            "/collections/{id}",
            get(collections::get_collection)
                .patch(collections::update_collection)
                .delete(collections::delete_collection),
        )
        // Guest book
        .route("/guests", get(guests::list_guests).post(guests::check_in))
        .route("/guests/stats", get(guests::guest_stats))
        .route("/guests/campus", get(guests::campus_directory))
        .route("/guests/{id}", get(guests::get_guest).delete(guests::delete_guest))
        // Members
        .route("/members/me", get(members::get_me).patch(members::update_me))
        .route("/members", get(members::list_members).post(members::create_member))
        .route(
            "/members/{id}",
            get(members::get_member)
                .patch(members::update_member)
                .delete(members::delete_member),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .fallback(health::not_found)
        .with_state(state)
}
