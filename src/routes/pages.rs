use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse},
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::{
    AppState,
    auth::{self, FLASH_COOKIE, MaybeUser, RequireUser},
    error::PageResult,
    models::{DetailsView, SearchQuery, shape_search_results},
    templates::{self, Chrome},
};

pub async fn movies(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
    Query(q): Query<SearchQuery>,
) -> PageResult<impl IntoResponse> {
    let query = q.query.unwrap_or_else(|| state.config.default_search_query.clone());

    let results = if query.is_empty() {
        Vec::new()
    } else {
        shape_search_results(state.tmdb.search_movies(&query).await?)
    };
    debug!(query = %query, results = results.len(), "search page");

    let flash = auth::read_flash(&jar);
    let chrome = Chrome { username: user.as_ref().map(|u| u.username.as_str()), flash: flash.as_deref() };
    let body = templates::search_page(chrome, &query, &results);

    let jar = if flash.is_some() { jar.remove(auth::removal(FLASH_COOKIE)) } else { jar };
    Ok((jar, Html(body)))
}

pub async fn details(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<i64>,
) -> PageResult<Html<String>> {
    render_details(&state, &user.username, identifier).await
}

pub async fn details_index(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
) -> PageResult<Html<String>> {
    render_details(&state, &user.username, 0).await
}

async fn render_details(state: &AppState, username: &str, id: i64) -> PageResult<Html<String>> {
    let tmdb = &state.tmdb;
    let (info, credits, videos) =
        futures::try_join!(tmdb.movie_details(id), tmdb.movie_credits(id), tmdb.movie_videos(id))?;
    debug!(tmdb_id = id, title = %info.title, "details page");

    let view = DetailsView::assemble(info, credits, videos);
    let chrome = Chrome { username: Some(username), flash: None };
    Ok(Html(templates::details_page(chrome, &view)))
}

pub async fn rating(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
) -> PageResult<Html<String>> {
    let ranked = state.catalog.ranking().await?;
    let chrome = Chrome { username: Some(&user.username), flash: None };
    Ok(Html(templates::rating_page(chrome, &ranked)))
}
