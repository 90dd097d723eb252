use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::{
    entities::{comment, movie, review, user},
    error::{AppError, AppResult},
    models::{
        CommentFilter, CommentPatch, MovieFilter, MoviePatch, NewReview, RankedMovie,
        ReviewFilter, ReviewPatch, rank_by_average,
    },
};

/// Movies, their reviews and comments.
#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_movies(&self, filter: &MovieFilter) -> AppResult<Vec<movie::Model>> {
        let mut query = movie::Entity::find();
        if let Some(title) = filter.title.as_deref() {
            query = query.filter(movie::Column::Title.contains(title));
        }

        Ok(query
            .order_by_desc(movie::Column::CreatedAt)
            .order_by_desc(movie::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get_movie(&self, id: i32) -> AppResult<movie::Model> {
        movie::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound)
    }

    pub async fn create_movie(&self, title: String, description: String) -> AppResult<movie::Model> {
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(title),
            description: Set(description),
            created_at: Set(now_sec()),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_movie(&self, id: i32, patch: MoviePatch) -> AppResult<movie::Model> {
        let mut active: movie::ActiveModel = self.get_movie(id).await?.into();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        active.created_at = Set(now_sec());
        Ok(active.update(&self.db).await?)
    }

    /// Removes the movie together with its reviews and comments in one transaction.
    pub async fn delete_movie(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        if movie::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let reviews = review::Entity::delete_many()
            .filter(review::Column::ReviewedMovieId.eq(id))
            .exec(&txn)
            .await?;
        let comments = comment::Entity::delete_many()
            .filter(comment::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        movie::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        tracing::debug!(
            movie_id = id,
            reviews = reviews.rows_affected,
            comments = comments.rows_affected,
            "deleted movie"
        );
        Ok(())
    }

    pub async fn list_comments(&self, filter: &CommentFilter) -> AppResult<Vec<comment::Model>> {
        let mut query = comment::Entity::find();
        if let Some(movie_id) = filter.movie_id {
            query = query.filter(comment::Column::MovieId.eq(movie_id));
        }
        Ok(query.order_by_asc(comment::Column::Id).all(&self.db).await?)
    }

    pub async fn get_comment(&self, id: i32) -> AppResult<comment::Model> {
        comment::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound)
    }

    pub async fn create_comment(
        &self,
        movie_id: i32,
        comment_text: String,
    ) -> AppResult<comment::Model> {
        ensure_movie(&self.db, movie_id).await?;
        let model = comment::ActiveModel {
            id: Default::default(),
            movie_id: Set(movie_id),
            comment_text: Set(comment_text),
            created_at: Set(now_sec()),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_comment(&self, id: i32, patch: CommentPatch) -> AppResult<comment::Model> {
        let mut active: comment::ActiveModel = self.get_comment(id).await?.into();
        if let Some(movie_id) = patch.movie {
            ensure_movie(&self.db, movie_id).await?;
            active.movie_id = Set(movie_id);
        }
        if let Some(text) = patch.comment_text {
            active.comment_text = Set(text);
        }
        active.created_at = Set(now_sec());
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_comment(&self, id: i32) -> AppResult<()> {
        let res = comment::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn list_reviews(&self, filter: &ReviewFilter) -> AppResult<Vec<review::Model>> {
        let mut query = review::Entity::find();
        if let Some(movie_id) = filter.reviewed_movie_id {
            query = query.filter(review::Column::ReviewedMovieId.eq(movie_id));
        }
        if let Some(writer_id) = filter.writer_id {
            query = query.filter(review::Column::WriterId.eq(writer_id));
        }

        Ok(query
            .order_by_desc(review::Column::Rating)
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get_review(&self, id: i32) -> AppResult<review::Model> {
        review::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound)
    }

    pub async fn create_review(&self, new: NewReview) -> AppResult<review::Model> {
        ensure_user(&self.db, new.writer).await?;
        ensure_movie(&self.db, new.reviewed_movie).await?;

        let model = review::ActiveModel {
            id: Default::default(),
            writer_id: Set(new.writer),
            reviewed_movie_id: Set(new.reviewed_movie),
            review_title: Set(new.review_title),
            content: Set(new.content),
            rating: Set(new.rating),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_review(&self, id: i32, patch: ReviewPatch) -> AppResult<review::Model> {
        let current = self.get_review(id).await?;
        let mut active: review::ActiveModel = current.clone().into();
        if let Some(writer) = patch.writer {
            ensure_user(&self.db, writer).await?;
            active.writer_id = Set(writer);
        }
        if let Some(movie_id) = patch.reviewed_movie {
            ensure_movie(&self.db, movie_id).await?;
            active.reviewed_movie_id = Set(movie_id);
        }
        if let Some(title) = patch.review_title {
            active.review_title = Set(title);
        }
        if let Some(content) = patch.content {
            active.content = Set(content);
        }
        if let Some(rating) = patch.rating {
            active.rating = Set(rating);
        }
        if !active.is_changed() {
            return Ok(current);
        }
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_review(&self, id: i32) -> AppResult<()> {
        let res = review::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn ranking(&self) -> AppResult<Vec<RankedMovie>> {
        let rows = movie::Entity::find()
            .find_with_related(review::Entity)
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rank_by_average(rows))
    }
}

async fn ensure_movie<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
    match movie::Entity::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest(format!("Invalid pk \"{id}\" - movie does not exist."))),
    }
}

async fn ensure_user<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
    match user::Entity::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest(format!("Invalid pk \"{id}\" - user does not exist."))),
    }
}

pub(crate) fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
