#![allow(dead_code)]

use axum_test::TestServer;
use cookie::Cookie;
use reelrate::{build_state, config::Config, router};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub async fn spawn(tmdb: &MockServer) -> TestServer {
    let config = Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        tmdb_api_key: "test-key".to_string(),
        tmdb_base_url: tmdb.uri(),
        database_url: "sqlite::memory:".to_string(),
        tmdb_rps: 1_000,
        session_ttl_days: 14,
        default_search_query: "The Dark Knight".to_string(),
    };
    let state = build_state(config).await.unwrap();
    TestServer::new(router(state)).unwrap()
}

pub async fn mock_search(tmdb: &MockServer, query: &str, results: Value) {
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", query))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 1, "results": results })))
        .mount(tmdb)
        .await;
}

pub async fn create_movie(server: &TestServer, title: &str, description: &str) -> i64 {
    let resp = server
        .post("/my_movies/")
        .json(&json!({ "title": title, "description": description }))
        .await;
    resp.assert_status(axum::http::StatusCode::CREATED);
    resp.json::<Value>()["id"].as_i64().unwrap()
}

pub async fn create_user(server: &TestServer, username: &str) -> i64 {
    let resp = server
        .post("/users/")
        .json(&json!({ "username": username, "email": format!("{username}@example.com") }))
        .await;
    resp.assert_status(axum::http::StatusCode::CREATED);
    resp.json::<Value>()["id"].as_i64().unwrap()
}

pub async fn create_review(server: &TestServer, writer: i64, movie: i64, rating: i64) -> i64 {
    let resp = server
        .post("/reviews/")
        .json(&json!({
            "review_title": "Review",
            "content": "Some thoughts",
            "rating": rating,
            "writer": writer,
            "reviewed_movie": movie,
        }))
        .await;
    resp.assert_status(axum::http::StatusCode::CREATED);
    resp.json::<Value>()["id"].as_i64().unwrap()
}

/// Registers through the signup form and returns the session cookie.
pub async fn sign_up(server: &TestServer, username: &str) -> Cookie<'static> {
    let resp = server
        .post("/signup/")
        .form(&[
            ("username", username),
            ("email", ""),
            ("password1", "popcorn-and-soda"),
            ("password2", "popcorn-and-soda"),
        ])
        .await;
    resp.assert_status(axum::http::StatusCode::FOUND);
    resp.cookie("sessionid")
}
