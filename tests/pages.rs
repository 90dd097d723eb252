mod common;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use common::{create_movie, create_review, create_user, mock_search, sign_up, spawn};

#[tokio::test]
async fn search_page_uses_default_query_and_sorts_by_popularity() {
    let tmdb = MockServer::start().await;
    let mut hits: Vec<_> = (1..=10)
        .map(|i| json!({ "id": i, "title": format!("Knight {i:02}"), "popularity": i as f64 }))
        .collect();
    hits.swap(0, 3);
    mock_search(&tmdb, "The Dark Knight", json!(hits)).await;
    let server = spawn(&tmdb).await;

    let response = server.get("/movies/").await;

    response.assert_status_ok();
    let body = response.text();
    assert!(!body.contains("Knight 10"), "only the first nine hits are shown");
    let first = body.find("Knight 09").unwrap();
    let last = body.find("Knight 01").unwrap();
    assert!(first < last);
    assert!(body.find("Knight 04").unwrap() < body.find("Knight 03").unwrap());
}

#[tokio::test]
async fn root_serves_the_search_page() {
    let tmdb = MockServer::start().await;
    mock_search(&tmdb, "Heat", json!([{ "id": 949, "title": "Heat", "popularity": 30.0 }])).await;
    let server = spawn(&tmdb).await;

    let response = server.get("/").add_query_param("query", "Heat").await;

    response.assert_status_ok();
    response.assert_text_contains("/details/949");
}

#[tokio::test]
async fn empty_query_skips_upstream() {
    let tmdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&tmdb)
        .await;
    let server = spawn(&tmdb).await;

    let response = server.get("/movies/").add_query_param("query", "").await;

    response.assert_status_ok();
    response.assert_text_contains("No results.");
}

#[tokio::test]
async fn ranking_requires_login() {
    let tmdb = MockServer::start().await;
    let server = spawn(&tmdb).await;

    let response = server.get("/rating/").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "/login/?next=%2Frating%2F");
}

#[tokio::test]
async fn ranking_orders_by_mean_rating() {
    let tmdb = MockServer::start().await;
    let server = spawn(&tmdb).await;
    let session = sign_up(&server, "ranker").await;

    let a = create_movie(&server, "Alpha", "x").await;
    let b = create_movie(&server, "Bravo", "x").await;
    create_movie(&server, "Charlie", "x").await;
    let writer = create_user(&server, "critic").await;
    create_review(&server, writer, a, 4).await;
    create_review(&server, writer, a, 6).await;
    create_review(&server, writer, b, 9).await;

    let response = server.get("/rating/").add_cookie(session).await;

    response.assert_status_ok();
    let body = response.text();
    let bravo = body.find("Bravo").unwrap();
    let alpha = body.find("Alpha").unwrap();
    let charlie = body.find("Charlie").unwrap();
    assert!(bravo < alpha && alpha < charlie);
    assert!(body.contains("5.00"));
    assert!(body.contains("No ratings yet"));
}

#[tokio::test]
async fn details_page_combines_three_lookups() {
    let tmdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/603"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 603,
            "title": "The Matrix",
            "overview": "A hacker learns the truth.",
            "release_date": "1999-03-31",
            "production_companies": [
                { "name": "Village Roadshow" }, { "name": "Groucho II" }, { "name": "Silver Pictures" }
            ]
        })))
        .mount(&tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/603/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cast": [{ "name": "Keanu Reeves", "character": "Neo" }],
            "crew": [{ "name": "Lana Wachowski", "job": "Director" }]
        })))
        .mount(&tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/603/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "key": "vKQi3bBA1y8", "name": "Official Trailer", "site": "YouTube", "type": "Trailer" },
                { "key": "zzz", "name": "Behind the scenes", "site": "YouTube", "type": "Featurette" }
            ]
        })))
        .mount(&tmdb)
        .await;
    let server = spawn(&tmdb).await;
    let session = sign_up(&server, "neo").await;

    let response = server.get("/details/603").add_cookie(session).await;

    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("The Matrix"));
    assert!(body.contains("1999"));
    assert!(body.contains("Keanu Reeves"));
    assert!(body.contains("Village Roadshow"));
    assert!(!body.contains("Silver Pictures"));
    assert!(body.contains("https://www.youtube.com/embed/vKQi3bBA1y8"));
    assert!(!body.contains("Behind the scenes"));
}

#[tokio::test]
async fn details_page_requires_login() {
    let tmdb = MockServer::start().await;
    let server = spawn(&tmdb).await;

    let response = server.get("/details/603").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "/login/?next=%2Fdetails%2F603");
}

#[tokio::test]
async fn logout_always_redirects() {
    let tmdb = MockServer::start().await;
    let server = spawn(&tmdb).await;

    let anonymous = server.get("/logout/").await;
    anonymous.assert_status(StatusCode::FOUND);
    assert_eq!(anonymous.header("location"), "/movies/");

    let session = sign_up(&server, "leaver").await;
    let response = server.post("/logout/").add_cookie(session.clone()).await;
    response.assert_status(StatusCode::FOUND);
    let flash = response.cookie("messages");

    server.get("/rating/").add_cookie(session).await.assert_status(StatusCode::FOUND);

    let page = server.get("/movies/").add_query_param("query", "").add_cookie(flash).await;
    page.assert_text_contains("Logged out successfully!");
}

#[tokio::test]
async fn login_with_bad_password_shows_form_again() {
    let tmdb = MockServer::start().await;
    let server = spawn(&tmdb).await;
    sign_up(&server, "trinity").await;

    let response = server
        .post("/login/")
        .form(&[("username", "trinity"), ("password", "wrong-password"), ("next", "/rating/")])
        .await;

    response.assert_status_ok();
    response.assert_text_contains("Please enter a correct username and password");
}

#[tokio::test]
async fn login_redirects_to_next() {
    let tmdb = MockServer::start().await;
    let server = spawn(&tmdb).await;
    sign_up(&server, "morpheus").await;

    let response = server
        .post("/login/")
        .form(&[("username", "morpheus"), ("password", "popcorn-and-soda"), ("next", "/rating/")])
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "/rating/");
    let session = response.cookie("sessionid");
    server.get("/rating/").add_cookie(session).await.assert_status_ok();
}

#[tokio::test]
async fn signup_rejects_mismatched_passwords() {
    let tmdb = MockServer::start().await;
    let server = spawn(&tmdb).await;

    let response = server
        .post("/signup/")
        .form(&[
            ("username", "smith"),
            ("email", ""),
            ("password1", "popcorn-and-soda"),
            ("password2", "popcorn-and-cola"),
        ])
        .await;

    response.assert_status_ok();
    response.assert_text_contains("The two password fields");
    assert!(server.get("/users/").await.json::<Vec<serde_json::Value>>().is_empty());
}

#[tokio::test]
async fn signup_rejects_taken_username() {
    let tmdb = MockServer::start().await;
    let server = spawn(&tmdb).await;
    create_user(&server, "oracle").await;

    let response = server
        .post("/signup/")
        .form(&[
            ("username", "oracle"),
            ("email", "oracle@example.com"),
            ("password1", "popcorn-and-soda"),
            ("password2", "popcorn-and-soda"),
        ])
        .await;

    response.assert_status_ok();
    response.assert_text_contains("already exists");
}
