use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::{Deserialize, de::DeserializeOwned};

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("TMDB request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("TMDB_API_KEY is not configured")]
    MissingApiKey,
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String, rps: u32) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("no TMDB_API_KEY provided; searches return no results");
        }

        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, api_key, base_url, limiter }
    }

    fn offline(&self) -> bool {
        self.api_key.trim().is_empty()
    }

    pub async fn search_movies(&self, query: &str) -> Result<Vec<SearchMovie>, TmdbError> {
        if self.offline() {
            return Ok(Vec::new());
        }

        let resp: SearchResponse = self.get_json("search/movie", &[("query", query)]).await?;
        tracing::debug!(query = %query, results = resp.results.len(), "tmdb search");
        Ok(resp.results)
    }

    pub async fn movie_details(&self, id: i64) -> Result<MovieDetails, TmdbError> {
        self.get_json(&format!("movie/{id}"), &[]).await
    }

    pub async fn movie_credits(&self, id: i64) -> Result<Credits, TmdbError> {
        self.get_json(&format!("movie/{id}/credits"), &[]).await
    }

    pub async fn movie_videos(&self, id: i64) -> Result<Vec<Video>, TmdbError> {
        let resp: VideosResponse = self.get_json(&format!("movie/{id}/videos"), &[]).await?;
        Ok(resp.results)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TmdbError> {
        if self.offline() {
            return Err(TmdbError::MissingApiKey);
        }

        self.limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let resp = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchMovie>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchMovie {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub popularity: f64,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
}

impl SearchMovie {
    pub fn year(&self) -> Option<&str> {
        release_year(self.release_date.as_deref())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub tagline: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub vote_average: f64,
    pub poster_path: Option<String>,
    pub genres: Vec<Genre>,
    pub production_companies: Vec<ProductionCompany>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Genre {
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductionCompany {
    pub name: String,
    pub logo_path: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CrewMember {
    pub name: String,
    pub job: String,
}

#[derive(Debug, Default, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    results: Vec<Video>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Video {
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Video {
    pub fn is_trailer(&self) -> bool {
        self.kind == "Trailer"
    }

    pub fn youtube_embed_url(&self) -> Option<String> {
        (self.site == "YouTube" && !self.key.is_empty())
            .then(|| format!("https://www.youtube.com/embed/{}", self.key))
    }
}

/// First four characters of a TMDB `YYYY-MM-DD` date, if there are that many.
pub fn release_year(date: Option<&str>) -> Option<&str> {
    date.and_then(|d| d.get(..4)).filter(|y| y.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_results_tolerate_missing_fields() {
        let resp: SearchResponse =
            serde_json::from_str(r#"{"results":[{"id":7,"title":"Heat"}]}"#).unwrap();
        let movie = &resp.results[0];
        assert_eq!(movie.id, 7);
        assert_eq!(movie.overview, "");
        assert_eq!(movie.popularity, 0.0);
        assert!(movie.poster_path.is_none());
    }

    #[test]
    fn missing_results_key_is_empty() {
        let resp: SearchResponse = serde_json::from_str(r#"{"page":1}"#).unwrap();
        assert!(resp.results.is_empty());
    }

    #[test]
    fn release_year_takes_prefix() {
        assert_eq!(release_year(Some("2008-07-16")), Some("2008"));
        assert_eq!(release_year(Some("")), None);
        assert_eq!(release_year(None), None);
    }

    #[test]
    fn only_youtube_videos_embed() {
        let video = Video {
            key: "abc".into(),
            name: "Official Trailer".into(),
            site: "YouTube".into(),
            kind: "Trailer".into(),
        };
        assert!(video.is_trailer());
        assert_eq!(video.youtube_embed_url().as_deref(), Some("https://www.youtube.com/embed/abc"));

        let vimeo = Video { site: "Vimeo".into(), ..video };
        assert!(vimeo.youtube_embed_url().is_none());
    }
}
