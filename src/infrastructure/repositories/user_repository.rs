//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserRepository trait. Relationship
//! mutations are single-statement conditional updates: the membership
//! predicate runs inside the UPDATE, so concurrent duplicates cannot
//! both apply.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{RelationshipAction, User, UserRepository};
use crate::shared::error::AppError;

/// Database row representation matching the users table schema.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    name: String,
    password_hash: String,
    friends: Vec<String>,
    blocked: Vec<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert database row to domain User entity.
    fn into_user(self) -> User {
        User {
            name: self.name,
            password_hash: self.password_hash,
            friends: self.friends,
            blocked: self.blocked,
            created_at: self.created_at,
        }
    }
}

const USER_COLUMNS: &str = "name, password_hash, friends, blocked, created_at";

/// PostgreSQL user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// SQL for one relationship transition. The WHERE clause carries the
    /// presence predicate so the check-and-write is one atomic statement.
    fn relationship_query(action: RelationshipAction) -> &'static str {
        match action {
            RelationshipAction::AddFriend => {
                r#"
                UPDATE users
                SET friends = array_append(friends, $2)
                WHERE name = $1 AND NOT ($2 = ANY(friends))
                RETURNING name, password_hash, friends, blocked, created_at
                "#
            }
            RelationshipAction::RemoveFriend => {
                r#"
                UPDATE users
                SET friends = array_remove(friends, $2)
                WHERE name = $1 AND $2 = ANY(friends)
                RETURNING name, password_hash, friends, blocked, created_at
                "#
            }
            RelationshipAction::Block => {
                r#"
                UPDATE users
                SET blocked = array_append(blocked, $2)
                WHERE name = $1 AND NOT ($2 = ANY(blocked))
                RETURNING name, password_hash, friends, blocked, created_at
                "#
            }
            RelationshipAction::Unblock => {
                r#"
                UPDATE users
                SET blocked = array_remove(blocked, $2)
                WHERE name = $1 AND $2 = ANY(blocked)
                RETURNING name, password_hash, friends, blocked, created_at
                "#
            }
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// Find a user by name.
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE name = $1",
            USER_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Create a new user; the primary key enforces name uniqueness.
    async fn create(&self, user: &User) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, password_hash, friends, blocked, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING name, password_hash, friends, blocked, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.friends)
        .bind(&user.blocked)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("User already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_user())
    }

    /// Delete a user (hard delete).
    async fn delete(&self, name: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} doesn't exist", name)));
        }

        Ok(())
    }

    /// List all registered user names.
    async fn list_names(&self) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>("SELECT name FROM users ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(names)
    }

    /// Check that a name is registered.
    async fn name_exists(&self, name: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

        Ok(result)
    }

    /// Apply a relationship transition as one conditional update.
    async fn update_relationship(
        &self,
        acting: &str,
        action: RelationshipAction,
        target: &str,
    ) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(Self::relationship_query(action))
            .bind(acting)
            .bind(target)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_user()))
    }
}
