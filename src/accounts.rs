use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    catalog::now_sec,
    entities::{review, session, user},
    error::{AppError, AppResult},
    models::UserPatch,
};

/// Marks a stored hash that no password can match.
const UNUSABLE_PREFIX: char = '!';

#[derive(Clone)]
pub struct Accounts {
    db: DatabaseConnection,
    session_ttl_seconds: i64,
}

impl Accounts {
    pub fn new(db: DatabaseConnection, session_ttl_days: i64) -> Self {
        Self { db, session_ttl_seconds: session_ttl_days * 86_400 }
    }

    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub async fn list_users(&self) -> AppResult<Vec<user::Model>> {
        Ok(user::Entity::find().order_by_asc(user::Column::Id).all(&self.db).await?)
    }

    pub async fn get_user(&self, id: i32) -> AppResult<user::Model> {
        user::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound)
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// Creates a user. Without a password the account exists but cannot log in.
    pub async fn create_user(
        &self,
        username: String,
        email: String,
        password: Option<&str>,
    ) -> AppResult<user::Model> {
        if self.find_by_username(&username).await?.is_some() {
            return Err(username_taken());
        }

        let password_hash = match password {
            Some(password) => hash_password(password)?,
            None => format!("{UNUSABLE_PREFIX}{}", Uuid::new_v4().simple()),
        };

        let model = user::ActiveModel {
            id: Default::default(),
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            date_joined: Set(now_sec()),
        };
        let user = model.insert(&self.db).await.map_err(unique_username)?;
        tracing::info!(user_id = user.id, username = %user.username, "created user");
        Ok(user)
    }

    pub async fn update_user(&self, id: i32, patch: UserPatch) -> AppResult<user::Model> {
        let current = self.get_user(id).await?;
        let mut active: user::ActiveModel = current.clone().into();

        if let Some(username) = patch.username {
            if username != current.username && self.find_by_username(&username).await?.is_some() {
                return Err(username_taken());
            }
            active.username = Set(username);
        }
        if let Some(email) = patch.email {
            active.email = Set(email);
        }

        if !active.is_changed() {
            return Ok(current);
        }
        Ok(active.update(&self.db).await.map_err(unique_username)?)
    }

    /// Removes the user with their reviews and sessions in one transaction.
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        if user::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound);
        }

        review::Entity::delete_many().filter(review::Column::WriterId.eq(id)).exec(&txn).await?;
        session::Entity::delete_many().filter(session::Column::UserId.eq(id)).exec(&txn).await?;
        user::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<user::Model>> {
        let Some(user) = self.find_by_username(username).await? else {
            return Ok(None);
        };
        Ok(verify_password(password, &user.password_hash).then_some(user))
    }

    pub async fn start_session(&self, user_id: i32) -> AppResult<String> {
        let token = Uuid::new_v4().simple().to_string();
        let model = session::ActiveModel {
            token: Set(token.clone()),
            user_id: Set(user_id),
            expires_at: Set(now_sec() + self.session_ttl_seconds),
        };
        session::Entity::insert(model).exec(&self.db).await?;
        Ok(token)
    }

    /// Resolves a session token, dropping it if it has expired.
    pub async fn session_user(&self, token: &str) -> AppResult<Option<user::Model>> {
        let found = session::Entity::find_by_id(token.to_string())
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?;

        let Some((session, user)) = found else {
            return Ok(None);
        };
        if session.expires_at <= now_sec() {
            self.end_session(token).await?;
            return Ok(None);
        }
        Ok(user)
    }

    pub async fn end_session(&self, token: &str) -> AppResult<()> {
        session::Entity::delete_by_id(token.to_string()).exec(&self.db).await?;
        Ok(())
    }
}

fn username_taken() -> AppError {
    AppError::BadRequest("A user with that username already exists.".into())
}

/// A concurrent insert can still win the race past the lookup; the unique index decides.
fn unique_username(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => username_taken(),
        _ => err.into(),
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    if hash.starts_with(UNUSABLE_PREFIX) {
        return false;
    }
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(err) => {
            tracing::warn!(error = %err, "stored password hash is malformed");
            false
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_and_migrate;

    #[tokio::test]
    async fn duplicate_username_at_insert_is_a_client_error() {
        let db = connect_and_migrate("sqlite::memory:").await.unwrap();
        let row = |username: &str| user::ActiveModel {
            id: Default::default(),
            username: Set(username.to_string()),
            email: Set(String::new()),
            password_hash: Set("!".to_string()),
            date_joined: Set(0),
        };
        row("ann").insert(&db).await.unwrap();

        let err = row("ann").insert(&db).await.unwrap_err();
        let mapped = unique_username(err);
        assert!(matches!(mapped, AppError::BadRequest(ref msg) if msg.contains("already exists")));

        let other = unique_username(DbErr::Custom("boom".into()));
        assert!(matches!(other, AppError::Internal(_)));
    }

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn unusable_hash_never_verifies() {
        assert!(!verify_password("", "!0123456789abcdef"));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
