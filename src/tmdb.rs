use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::{
        CatalogDetails, CatalogResult, MAX_DESCRIPTION_CHARS, parse_release_year, truncate_chars,
    },
};

/// Remote movie catalog used by the add flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// Candidates for a title query, unfiltered and in the service's order.
    async fn search_by_title(&self, title: &str) -> AppResult<Vec<CatalogResult>>;

    async fn fetch_details_by_id(&self, external_id: &str) -> AppResult<CatalogDetails>;
}

pub struct TmdbClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    image_base_url: String,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        access_token: String,
        base_url: String,
        image_base_url: String,
    ) -> Self {
        Self { client, access_token, base_url, image_base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl Catalog for TmdbClient {
    async fn search_by_title(&self, title: &str) -> AppResult<Vec<CatalogResult>> {
        let resp: SearchResponse = self
            .client
            .get(self.url("search/movie"))
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .query(&[
                ("query", title),
                ("include_adult", "false"),
                ("language", "en-US"),
                ("page", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(query = %title, results = resp.results.len(), "catalog search");
        Ok(resp.results.into_iter().map(Into::into).collect())
    }

    async fn fetch_details_by_id(&self, external_id: &str) -> AppResult<CatalogDetails> {
        let resp: MovieDetails = self
            .client
            .get(self.url(&format!("movie/{external_id}")))
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(external_id = %external_id, title = ?resp.title, "catalog details");
        resp.into_details(&self.image_base_url)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchMovie>,
}

#[derive(Debug, Deserialize)]
struct SearchMovie {
    id: i64,
    #[serde(default)]
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
    backdrop_path: Option<String>,
    poster_path: Option<String>,
}

impl From<SearchMovie> for CatalogResult {
    fn from(m: SearchMovie) -> Self {
        Self {
            external_id: m.id,
            title: m.title,
            release_date: m.release_date,
            overview: m.overview,
            backdrop_path: m.backdrop_path,
            poster_path: m.poster_path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MovieDetails {
    title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    backdrop_path: Option<String>,
    poster_path: Option<String>,
}

impl MovieDetails {
    fn into_details(self, image_base_url: &str) -> AppResult<CatalogDetails> {
        let missing = |field: &str| AppError::MalformedResponse(format!("missing {field}"));

        let title = self.title.filter(|t| !t.trim().is_empty()).ok_or_else(|| missing("title"))?;
        let release_date = self.release_date.ok_or_else(|| missing("release_date"))?;
        let release_year = parse_release_year(&release_date).ok_or_else(|| {
            AppError::MalformedResponse(format!("unparseable release_date {release_date:?}"))
        })?;
        let overview = self.overview.ok_or_else(|| missing("overview"))?;
        let image_path = self
            .backdrop_path
            .or(self.poster_path)
            .ok_or_else(|| missing("backdrop_path"))?;

        Ok(CatalogDetails {
            title,
            release_year,
            overview: truncate_chars(&overview, MAX_DESCRIPTION_CHARS),
            img_url: format!("{}{}", image_base_url.trim_end_matches('/'), image_path),
        })
    }
}
