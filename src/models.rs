use serde::Deserialize;

use crate::error::{AppError, AppResult};

pub use crate::entities::movie::Model as Movie;

pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_REVIEW_CHARS: usize = 250;
pub const MAX_RATING: f64 = 10.0;

/// A fully populated row ready for insertion.
#[derive(Clone, Debug)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub description: String,
    pub img_url: String,
}

/// One candidate from a catalog title search, in the service's own order.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogResult {
    pub external_id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
}

impl CatalogResult {
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.as_deref().and_then(parse_release_year)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogDetails {
    pub title: String,
    pub release_year: i32,
    pub overview: String,
    pub img_url: String,
}

impl From<CatalogDetails> for NewMovie {
    fn from(details: CatalogDetails) -> Self {
        Self {
            title: details.title,
            year: details.release_year,
            description: details.overview,
            img_url: details.img_url,
        }
    }
}

/// Leading component of a `YYYY-MM-DD` style date; anything after the first
/// `-` is discarded.
pub fn parse_release_year(date: &str) -> Option<i32> {
    date.split('-').next()?.trim().parse().ok()
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub fn movie_id(&self) -> AppResult<i32> {
        let raw = self.raw()?;
        raw.parse().map_err(|_| AppError::ValidationFailed(format!("invalid movie id {raw:?}")))
    }

    /// Catalog ids end up in a URL path, so only plain digits are accepted.
    pub fn external_id(&self) -> AppResult<&str> {
        let raw = self.raw()?;
        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::ValidationFailed(format!("invalid catalog id {raw:?}")));
        }
        Ok(raw)
    }

    fn raw(&self) -> AppResult<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::ValidationFailed("id is required".to_string()))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RatingUpdate {
    pub rating: f64,
    pub review: Option<String>,
}

impl EditForm {
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            rating: movie.rating.map(|r| r.to_string()).unwrap_or_default(),
            review: movie.review.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> AppResult<RatingUpdate> {
        let rating = self.rating.trim();
        if rating.is_empty() {
            return Err(AppError::ValidationFailed("rating is required".to_string()));
        }
        let rating: f64 = rating
            .parse()
            .map_err(|_| AppError::ValidationFailed(format!("rating {rating:?} is not a number")))?;
        if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
            return Err(AppError::ValidationFailed(format!(
                "rating must be between 0 and {MAX_RATING}"
            )));
        }

        let review = self.review.trim();
        if review.chars().count() > MAX_REVIEW_CHARS {
            return Err(AppError::ValidationFailed(format!(
                "review must be at most {MAX_REVIEW_CHARS} characters"
            )));
        }

        Ok(RatingUpdate { rating, review: (!review.is_empty()).then(|| review.to_string()) })
    }
}
