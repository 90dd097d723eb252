use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use tracing::info;
use validator::Validate;

use crate::{
    AppState,
    auth::{self, SESSION_COOKIE},
    error::{AppError, PageResult},
    models::{LoginForm, NextQuery, SignupForm, describe_errors},
    templates,
};

const LOGIN_FAILED: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

pub async fn signup_form() -> Html<String> {
    Html(templates::signup_page("", "", &[]))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> PageResult<Response> {
    let mut errors = match form.validate() {
        Ok(()) => Vec::new(),
        Err(errs) => describe_errors(&errs),
    };
    if errors.is_empty() && state.accounts.find_by_username(&form.username).await?.is_some() {
        errors.push("username: A user with that username already exists.".to_string());
    }
    if !errors.is_empty() {
        let body = templates::signup_page(&form.username, &form.email, &errors);
        return Ok(Html(body).into_response());
    }

    let user = match state
        .accounts
        .create_user(form.username.clone(), form.email.clone(), Some(&form.password1))
        .await
    {
        Ok(user) => user,
        Err(AppError::BadRequest(msg)) => {
            let body = templates::signup_page(&form.username, &form.email, &[msg]);
            return Ok(Html(body).into_response());
        },
        Err(err) => return Err(err.into()),
    };

    let token = state.accounts.start_session(user.id).await?;
    let jar = jar.add(auth::session_cookie(token, state.accounts.session_ttl_seconds()));
    Ok((jar, auth::found("/movies/")).into_response())
}

pub async fn login_form(Query(q): Query<NextQuery>) -> Html<String> {
    Html(templates::login_page("", auth::safe_next(q.next.as_deref()), None))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> PageResult<Response> {
    let next = auth::safe_next(form.next.as_deref());

    let Some(user) = state.accounts.authenticate(&form.username, &form.password).await? else {
        info!(username = %form.username, "failed login");
        let body = templates::login_page(&form.username, next, Some(LOGIN_FAILED));
        return Ok(Html(body).into_response());
    };

    let token = state.accounts.start_session(user.id).await?;
    info!(user_id = user.id, "logged in");
    let jar = jar.add(auth::session_cookie(token, state.accounts.session_ttl_seconds()));
    Ok((jar, auth::found(next)).into_response())
}

/// Always answers with a redirect, whether or not a session existed.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> PageResult<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.accounts.end_session(cookie.value()).await?;
    }
    let jar = jar
        .remove(auth::removal(SESSION_COOKIE))
        .add(auth::flash_cookie("Logged out successfully!"));
    Ok((jar, auth::found("/movies/")).into_response())
}
