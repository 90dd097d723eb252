pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod routes;
pub mod templates;
pub mod tmdb;

use std::{sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    accounts::Accounts,
    catalog::Catalog,
    config::Config,
    routes::{account, api, pages},
    tmdb::TmdbClient,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Catalog,
    pub accounts: Accounts,
    pub tmdb: Arc<TmdbClient>,
}

/// Connects and migrates the database and builds the TMDB client.
pub async fn build_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let config = Arc::new(config);

    let http = reqwest::Client::builder()
        .user_agent("reelrate/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;

    let tmdb = TmdbClient::new(
        http,
        config.tmdb_api_key.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    );

    Ok(Arc::new(AppState {
        catalog: Catalog::new(db.clone()),
        accounts: Accounts::new(db, config.session_ttl_days),
        tmdb: Arc::new(tmdb),
        config,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/users/", get(api::list_users).post(api::create_user))
        .route(
            "/users/{id}/",
            get(api::get_user).put(api::replace_user).patch(api::patch_user).delete(api::delete_user),
        )
        .route("/my_movies/", get(api::list_movies).post(api::create_movie))
        .route(
            "/my_movies/{id}/",
            get(api::get_movie)
                .put(api::replace_movie)
                .patch(api::patch_movie)
                .delete(api::delete_movie),
        )
        .route("/comments/", get(api::list_comments).post(api::create_comment))
        .route(
            "/comments/{id}/",
            get(api::get_comment)
                .put(api::replace_comment)
                .patch(api::patch_comment)
                .delete(api::delete_comment),
        )
        .route("/reviews/", get(api::list_reviews).post(api::create_review))
        .route(
            "/reviews/{id}/",
            get(api::get_review)
                .put(api::replace_review)
                .patch(api::patch_review)
                .delete(api::delete_review),
        );

    let pages = Router::new()
        .route("/", get(pages::movies))
        .route("/movies/", get(pages::movies))
        .route("/details/", get(pages::details_index))
        .route("/details/{identifier}", get(pages::details))
        .route("/rating/", get(pages::rating))
        .route("/signup/", get(account::signup_form).post(account::signup))
        .route("/login/", get(account::login_form).post(account::login))
        .route("/logout/", get(account::logout).post(account::logout));

    api.merge(pages).with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any)),
    )
}
