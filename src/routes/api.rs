use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info};
use validator::Validate;

use crate::{
    AppState,
    error::{ApiJson, ApiPath, ApiQuery, AppError, AppResult},
    models::{
        CommentFilter, CommentPatch, CommentView, MovieFilter, MoviePatch, MovieView, NewComment,
        NewMovie, NewReview, NewUser, ReviewFilter, ReviewPatch, ReviewView, UserPatch, UserView,
    },
};

type Shared = State<Arc<AppState>>;

fn views<M, V: From<M>>(models: Vec<M>) -> Json<Vec<V>> {
    Json(models.into_iter().map(V::from).collect())
}

// ---- users ----

pub async fn list_users(State(state): Shared) -> AppResult<Json<Vec<UserView>>> {
    Ok(views(state.accounts.list_users().await?))
}

pub async fn create_user(
    State(state): Shared,
    ApiJson(new): ApiJson<NewUser>,
) -> AppResult<impl IntoResponse> {
    new.validate()?;
    let user = state
        .accounts
        .create_user(new.username, new.email.unwrap_or_default(), None)
        .await?;
    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}

pub async fn get_user(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<UserView>> {
    Ok(Json(state.accounts.get_user(id).await?.into()))
}

pub async fn replace_user(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<NewUser>,
) -> AppResult<Json<UserView>> {
    body.validate()?;
    Ok(Json(state.accounts.update_user(id, body.into()).await?.into()))
}

pub async fn patch_user(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> AppResult<Json<UserView>> {
    patch.validate()?;
    Ok(Json(state.accounts.update_user(id, patch).await?.into()))
}

pub async fn delete_user(State(state): Shared, ApiPath(id): ApiPath<i32>) -> AppResult<StatusCode> {
    state.accounts.delete_user(id).await?;
    info!(user_id = id, "deleted user");
    Ok(StatusCode::NO_CONTENT)
}

// ---- movies ----

pub async fn list_movies(
    State(state): Shared,
    ApiQuery(filter): ApiQuery<MovieFilter>,
) -> AppResult<Json<Vec<MovieView>>> {
    Ok(views(state.catalog.list_movies(&filter).await?))
}

/// Creates a movie; a blank description is filled from the first TMDB search hit.
pub async fn create_movie(
    State(state): Shared,
    ApiJson(new): ApiJson<NewMovie>,
) -> AppResult<impl IntoResponse> {
    new.validate()?;

    let description = if new.description.is_empty() {
        let results = state.tmdb.search_movies(&new.title).await.map_err(|err| {
            debug!(title = %new.title, error = %err, "description lookup failed");
            AppError::UpstreamLookup(err)
        })?;
        let overview = results.into_iter().next().map(|m| m.overview).unwrap_or_default();
        debug!(title = %new.title, found = !overview.is_empty(), "description from tmdb");
        overview
    } else {
        new.description
    };

    let movie = state.catalog.create_movie(new.title, description).await?;
    info!(movie_id = movie.id, title = %movie.title, "created movie");
    Ok((StatusCode::CREATED, Json(MovieView::from(movie))))
}

pub async fn get_movie(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<MovieView>> {
    Ok(Json(state.catalog.get_movie(id).await?.into()))
}

pub async fn replace_movie(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<NewMovie>,
) -> AppResult<Json<MovieView>> {
    body.validate()?;
    Ok(Json(state.catalog.update_movie(id, body.into()).await?.into()))
}

pub async fn patch_movie(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<MoviePatch>,
) -> AppResult<Json<MovieView>> {
    patch.validate()?;
    Ok(Json(state.catalog.update_movie(id, patch).await?.into()))
}

pub async fn delete_movie(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.catalog.delete_movie(id).await?;
    info!(movie_id = id, "deleted movie");
    Ok(StatusCode::NO_CONTENT)
}

// ---- comments ----

pub async fn list_comments(
    State(state): Shared,
    ApiQuery(filter): ApiQuery<CommentFilter>,
) -> AppResult<Json<Vec<CommentView>>> {
    Ok(views(state.catalog.list_comments(&filter).await?))
}

pub async fn create_comment(
    State(state): Shared,
    ApiJson(new): ApiJson<NewComment>,
) -> AppResult<impl IntoResponse> {
    new.validate()?;
    let comment = state.catalog.create_comment(new.movie, new.comment_text).await?;
    Ok((StatusCode::CREATED, Json(CommentView::from(comment))))
}

pub async fn get_comment(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<CommentView>> {
    Ok(Json(state.catalog.get_comment(id).await?.into()))
}

pub async fn replace_comment(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<NewComment>,
) -> AppResult<Json<CommentView>> {
    body.validate()?;
    Ok(Json(state.catalog.update_comment(id, body.into()).await?.into()))
}

pub async fn patch_comment(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<CommentPatch>,
) -> AppResult<Json<CommentView>> {
    patch.validate()?;
    Ok(Json(state.catalog.update_comment(id, patch).await?.into()))
}

pub async fn delete_comment(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.catalog.delete_comment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- reviews ----

pub async fn list_reviews(
    State(state): Shared,
    ApiQuery(filter): ApiQuery<ReviewFilter>,
) -> AppResult<Json<Vec<ReviewView>>> {
    Ok(views(state.catalog.list_reviews(&filter).await?))
}

pub async fn create_review(
    State(state): Shared,
    ApiJson(new): ApiJson<NewReview>,
) -> AppResult<impl IntoResponse> {
    new.validate()?;
    let review = state.catalog.create_review(new).await?;
    Ok((StatusCode::CREATED, Json(ReviewView::from(review))))
}

pub async fn get_review(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ReviewView>> {
    Ok(Json(state.catalog.get_review(id).await?.into()))
}

pub async fn replace_review(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<NewReview>,
) -> AppResult<Json<ReviewView>> {
    body.validate()?;
    Ok(Json(state.catalog.update_review(id, ReviewPatch::from(body)).await?.into()))
}

pub async fn patch_review(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<ReviewPatch>,
) -> AppResult<Json<ReviewView>> {
    patch.validate()?;
    Ok(Json(state.catalog.update_review(id, patch).await?.into()))
}

pub async fn delete_review(
    State(state): Shared,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.catalog.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
