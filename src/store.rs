use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    SqlErr, sea_query::Expr,
};
use tracing::debug;

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{MAX_DESCRIPTION_CHARS, Movie, NewMovie, RatingUpdate},
};

#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_movie(&self, new: NewMovie) -> AppResult<i32> {
        if new.title.trim().is_empty() {
            return Err(AppError::ValidationFailed("title is required".to_string()));
        }
        if new.description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(AppError::ValidationFailed(format!(
                "description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }

        let existing = movie::Entity::find()
            .filter(movie::Column::Title.eq(new.title.as_str()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateTitle(new.title));
        }

        let model = movie::ActiveModel {
            title: Set(new.title.clone()),
            year: Set(new.year),
            description: Set(new.description),
            img_url: Set(new.img_url),
            ..Default::default()
        };

        match movie::Entity::insert(model).exec(&self.db).await {
            Ok(res) => {
                debug!(movie_id = res.last_insert_id, title = %new.title, "movie created");
                Ok(res.last_insert_id)
            },
            Err(err) => Err(insert_error(err, new.title)),
        }
    }

    /// Ascending by rating; SQLite sorts NULL first, so unrated movies lead.
    /// Equal ratings keep insertion order.
    pub async fn list_all_ordered_by_rating(&self) -> AppResult<Vec<Movie>> {
        let movies = movie::Entity::find()
            .order_by_asc(movie::Column::Rating)
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;
        Ok(movies)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Movie> {
        movie::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound(id))
    }

    /// Both columns are written by one UPDATE statement.
    pub async fn update_rating_and_review(&self, id: i32, update: RatingUpdate) -> AppResult<()> {
        let res = movie::Entity::update_many()
            .col_expr(movie::Column::Rating, Expr::value(update.rating))
            .col_expr(movie::Column::Review, Expr::value(update.review))
            .filter(movie::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if res.rows_affected == 0 {
            return Err(AppError::NotFound(id));
        }
        debug!(movie_id = id, rating = update.rating, "rating updated");
        Ok(())
    }

    pub async fn delete_by_id(&self, id: i32) -> AppResult<()> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound(id));
        }
        debug!(movie_id = id, "movie deleted");
        Ok(())
    }

    /// Writes `(id, rank)` pairs produced by the ranking pass.
    pub async fn save_rankings(&self, ranks: &[(i32, i32)]) -> AppResult<()> {
        for &(id, rank) in ranks {
            movie::Entity::update_many()
                .col_expr(movie::Column::Ranking, Expr::value(rank))
                .filter(movie::Column::Id.eq(id))
                .exec(&self.db)
                .await?;
        }
        if !ranks.is_empty() {
            debug!(updated = ranks.len(), "rankings saved");
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(movie::Entity::find().count(&self.db).await?)
    }
}

/// A title that slipped past the existence check (a concurrent insert) still
/// trips the unique index; report it the same way.
fn insert_error(err: DbErr, title: String) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateTitle(title),
        _ => err.into(),
    }
}
