use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::{
    entities::{comment, movie, review, user},
    tmdb::{CastMember, Credits, CrewMember, MovieDetails, ProductionCompany, SearchMovie, Video},
};

pub const SEARCH_RESULT_LIMIT: usize = 9;
const DETAILS_PRODUCTION_LIMIT: usize = 2;
const DETAILS_CAST_LIMIT: usize = 10;
const DETAILS_CREW_LIMIT: usize = 5;

fn timestamp(secs: i64) -> Timestamp {
    Timestamp::from_second(secs).unwrap_or_default()
}

fn default_rating() -> i32 {
    5
}

/// Text fields are stored trimmed, so whitespace alone counts as blank.
fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

fn trimmed_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(|s| s.trim().to_string()))
}

// ---- users ----

#[derive(Debug, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: String,
    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: Option<String>,
    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,
}

impl From<NewUser> for UserPatch {
    fn from(user: NewUser) -> Self {
        Self { username: Some(user.username), email: Some(user.email.unwrap_or_default()) }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<user::Model> for UserView {
    fn from(user: user::Model) -> Self {
        Self { id: user.id, username: user.username, email: user.email }
    }
}

/// Letters, digits and `@.+-_` only.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
        Ok(())
    } else {
        Err(ValidationError::new("username")
            .with_message("Letters, digits and @/./+/-/_ only.".into()))
    }
}

// ---- movies ----

#[derive(Debug, Deserialize, Validate)]
pub struct NewMovie {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    #[serde(deserialize_with = "trimmed")]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct MoviePatch {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub title: Option<String>,
    pub description: Option<String>,
}

impl From<NewMovie> for MoviePatch {
    fn from(movie: NewMovie) -> Self {
        Self { title: Some(movie.title), description: Some(movie.description) }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MovieFilter {
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovieView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
}

impl From<movie::Model> for MovieView {
    fn from(movie: movie::Model) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            description: movie.description,
            created_at: timestamp(movie.created_at),
        }
    }
}

// ---- comments ----

#[derive(Debug, Deserialize, Validate)]
pub struct NewComment {
    pub movie: i32,
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    #[serde(deserialize_with = "trimmed")]
    pub comment_text: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentPatch {
    pub movie: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub comment_text: Option<String>,
}

impl From<NewComment> for CommentPatch {
    fn from(comment: NewComment) -> Self {
        Self { movie: Some(comment.movie), comment_text: Some(comment.comment_text) }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentFilter {
    pub movie_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentView {
    pub id: i32,
    pub movie: i32,
    pub comment_text: String,
    pub created_at: Timestamp,
}

impl From<comment::Model> for CommentView {
    fn from(comment: comment::Model) -> Self {
        Self {
            id: comment.id,
            movie: comment.movie_id,
            comment_text: comment.comment_text,
            created_at: timestamp(comment.created_at),
        }
    }
}

// ---- reviews ----

#[derive(Debug, Deserialize, Validate)]
pub struct NewReview {
    pub writer: i32,
    pub reviewed_movie: i32,
    #[validate(length(min = 1, max = 100, message = "This field may not be blank."))]
    #[serde(deserialize_with = "trimmed")]
    pub review_title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_rating")]
    #[validate(range(min = 1, max = 10))]
    pub rating: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviewPatch {
    pub writer: Option<i32>,
    pub reviewed_movie: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "This field may not be blank."))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub review_title: Option<String>,
    pub content: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub rating: Option<i32>,
}

impl From<NewReview> for ReviewPatch {
    fn from(review: NewReview) -> Self {
        Self {
            writer: Some(review.writer),
            reviewed_movie: Some(review.reviewed_movie),
            review_title: Some(review.review_title),
            content: Some(review.content),
            rating: Some(review.rating),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewFilter {
    pub reviewed_movie_id: Option<i32>,
    pub writer_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewView {
    pub id: i32,
    pub writer: i32,
    pub reviewed_movie: i32,
    pub review_title: String,
    pub content: String,
    pub rating: i32,
}

impl From<review::Model> for ReviewView {
    fn from(review: review::Model) -> Self {
        Self {
            id: review.id,
            writer: review.writer_id,
            reviewed_movie: review.reviewed_movie_id,
            review_title: review.review_title,
            content: review.content,
            rating: review.rating,
        }
    }
}

// ---- account forms ----

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 150, message = "Required. 150 characters or fewer."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,
    #[serde(default)]
    #[validate(
        length(min = 8, message = "This password is too short. It must contain at least 8 characters."),
        custom(function = "validate_not_numeric")
    )]
    pub password1: String,
    #[serde(default)]
    #[validate(must_match(other = "password1", message = "The two password fields didn't match."))]
    pub password2: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Enter a valid email address.".into()))
    }
}

fn validate_not_numeric(password: &str) -> Result<(), ValidationError> {
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        Err(ValidationError::new("password_entirely_numeric")
            .with_message("This password is entirely numeric.".into()))
    } else {
        Ok(())
    }
}

/// Flattens validation errors into readable lines, ordered by field.
pub fn describe_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{field}: {msg}"),
                None => format!("{field}: invalid ({})", e.code),
            })
        })
        .collect()
}

// ---- pages ----

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// Keeps the first page-worth of upstream hits, most popular first.
pub fn shape_search_results(mut results: Vec<SearchMovie>) -> Vec<SearchMovie> {
    results.truncate(SEARCH_RESULT_LIMIT);
    results.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    results
}

#[derive(Clone, Debug)]
pub struct DetailsView {
    pub info: MovieDetails,
    pub year: String,
    pub production: Vec<ProductionCompany>,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
    pub trailers: Vec<Video>,
}

impl DetailsView {
    pub fn assemble(info: MovieDetails, credits: Credits, videos: Vec<Video>) -> Self {
        let year = crate::tmdb::release_year(info.release_date.as_deref())
            .unwrap_or_default()
            .to_string();
        let production =
            info.production_companies.iter().take(DETAILS_PRODUCTION_LIMIT).cloned().collect();
        let Credits { mut cast, mut crew } = credits;
        cast.truncate(DETAILS_CAST_LIMIT);
        crew.truncate(DETAILS_CREW_LIMIT);
        let trailers = videos.into_iter().filter(Video::is_trailer).collect();

        Self { info, year, production, cast, crew, trailers }
    }
}

#[derive(Clone, Debug)]
pub struct RankedMovie {
    pub movie: movie::Model,
    pub avg_rating: Option<f64>,
    pub review_count: usize,
}

/// Mean rating per movie, best first. Unrated movies sort last; ties keep id order.
pub fn rank_by_average(rows: Vec<(movie::Model, Vec<review::Model>)>) -> Vec<RankedMovie> {
    let mut ranked: Vec<RankedMovie> = rows
        .into_iter()
        .map(|(movie, reviews)| {
            let review_count = reviews.len();
            let avg_rating = (review_count > 0).then(|| {
                reviews.iter().map(|r| f64::from(r.rating)).sum::<f64>() / review_count as f64
            });
            RankedMovie { movie, avg_rating, review_count }
        })
        .collect();

    ranked.sort_by(|a, b| match (a.avg_rating, b.avg_rating) {
        (Some(x), Some(y)) => y.total_cmp(&x).then(a.movie.id.cmp(&b.movie.id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.movie.id.cmp(&b.movie.id),
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i32) -> movie::Model {
        movie::Model { id, title: format!("m{id}"), description: String::new(), created_at: 0 }
    }

    fn review(movie_id: i32, rating: i32) -> review::Model {
        review::Model {
            id: 0,
            writer_id: 1,
            reviewed_movie_id: movie_id,
            review_title: "t".into(),
            content: String::new(),
            rating,
        }
    }

    #[test]
    fn ranks_by_mean_with_unrated_last() {
        let ranked = rank_by_average(vec![
            (movie(1), vec![]),
            (movie(2), vec![review(2, 3)]),
            (movie(3), vec![review(3, 9), review(3, 6)]),
            (movie(4), vec![review(4, 10)]),
        ]);
        let order: Vec<i32> = ranked.iter().map(|r| r.movie.id).collect();
        assert_eq!(order, vec![4, 3, 2, 1]);
        assert_eq!(ranked[1].avg_rating, Some(7.5));
        assert_eq!(ranked[1].review_count, 2);
        assert_eq!(ranked[3].avg_rating, None);
    }

    #[test]
    fn equal_means_keep_id_order() {
        let ranked =
            rank_by_average(vec![(movie(5), vec![review(5, 8)]), (movie(2), vec![review(2, 8)])]);
        assert_eq!(ranked[0].movie.id, 2);
        assert_eq!(ranked[1].movie.id, 5);
    }

    #[test]
    fn search_results_are_truncated_then_sorted() {
        let results: Vec<SearchMovie> = (0..12)
            .map(|i| SearchMovie { id: i, popularity: i as f64, ..Default::default() })
            .collect();
        let shaped = shape_search_results(results);
        assert_eq!(shaped.len(), SEARCH_RESULT_LIMIT);
        assert_eq!(shaped.first().map(|m| m.id), Some(8));
        assert_eq!(shaped.last().map(|m| m.id), Some(0));
    }

    #[test]
    fn details_keep_leading_entries_and_trailers_only() {
        let info = MovieDetails {
            release_date: Some("1999-03-31".into()),
            production_companies: (0..4)
                .map(|i| ProductionCompany { name: format!("p{i}"), logo_path: None })
                .collect(),
            ..Default::default()
        };
        let credits = Credits {
            cast: (0..15).map(|i| CastMember { name: format!("c{i}"), ..Default::default() }).collect(),
            crew: (0..8).map(|i| CrewMember { name: format!("w{i}"), job: "Grip".into() }).collect(),
        };
        let videos = vec![
            Video { kind: "Teaser".into(), ..Default::default() },
            Video { kind: "Trailer".into(), key: "k".into(), ..Default::default() },
        ];

        let view = DetailsView::assemble(info, credits, videos);
        assert_eq!(view.year, "1999");
        assert_eq!(view.production.len(), 2);
        assert_eq!(view.cast.len(), 10);
        assert_eq!(view.crew.len(), 5);
        assert_eq!(view.trailers.len(), 1);
        assert_eq!(view.trailers[0].key, "k");
    }

    #[test]
    fn rating_outside_range_is_rejected() {
        let review = NewReview {
            writer: 1,
            reviewed_movie: 1,
            review_title: "ok".into(),
            content: String::new(),
            rating: 11,
        };
        assert!(review.validate().is_err());
    }

    #[test]
    fn rating_defaults_to_five() {
        let review: NewReview =
            serde_json::from_str(r#"{"writer":1,"reviewed_movie":2,"review_title":"x"}"#).unwrap();
        assert_eq!(review.rating, 5);
        assert!(review.validate().is_ok());
    }

    #[test]
    fn usernames_reject_spaces() {
        assert!(validate_username("ada.lovelace+1").is_ok());
        assert!(validate_username("ada lovelace").is_err());
    }

    #[test]
    fn signup_collects_every_problem() {
        let form = SignupForm {
            username: "bad name".into(),
            email: "nope".into(),
            password1: "12345678".into(),
            password2: "87654321".into(),
        };
        let errors = form.validate().unwrap_err();
        let lines = describe_errors(&errors);
        assert!(lines.iter().any(|l| l.starts_with("email:")));
        assert!(lines.iter().any(|l| l.contains("entirely numeric")));
        assert!(lines.iter().any(|l| l.contains("didn't match")));
        assert!(lines.iter().any(|l| l.starts_with("username:")));
    }

    #[test]
    fn signup_accepts_blank_email() {
        let form = SignupForm {
            username: "ada".into(),
            email: String::new(),
            password1: "analytical-engine".into(),
            password2: "analytical-engine".into(),
        };
        assert!(form.validate().is_ok());
    }
}
