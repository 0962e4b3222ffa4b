//! Channel Repository Implementation
//!
//! PostgreSQL implementation of the ChannelRepository trait. Membership
//! checks, membership mutation, and message appends each execute as one
//! conditional statement against the channel row; the JSONB `||`
//! operator gives the append-only message log its ordering.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Channel, ChannelRepository, ChannelSummary, Message, GLOBAL_CHANNEL, MIN_MEMBERS};
use crate::shared::error::AppError;

/// Database row representation matching the channels table schema.
#[derive(Debug, sqlx::FromRow)]
struct ChannelRow {
    id: Uuid,
    name: String,
    members: Vec<String>,
    messages: Json<Vec<Message>>,
    created_at: DateTime<Utc>,
}

impl ChannelRow {
    /// Convert database row to domain Channel entity.
    fn into_channel(self) -> Channel {
        Channel {
            id: self.id,
            name: self.name,
            members: self.members,
            messages: self.messages.0,
            created_at: self.created_at,
        }
    }
}

/// Listing row without the message log.
#[derive(Debug, sqlx::FromRow)]
struct ChannelSummaryRow {
    id: Uuid,
    name: String,
    members: Vec<String>,
    created_at: DateTime<Utc>,
}

/// PostgreSQL channel repository implementation.
#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    /// Create a new PgChannelRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    /// Create a new channel.
    async fn create(&self, channel: &Channel) -> Result<Channel, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            INSERT INTO channels (id, name, members, messages, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, members, messages, created_at
            "#,
        )
        .bind(channel.id)
        .bind(&channel.name)
        .bind(&channel.members)
        .bind(Json(&channel.messages))
        .bind(channel.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_channel())
    }

    /// Fetch a channel only when `member` belongs to it. A non-member
    /// observes the same absence as a missing channel.
    async fn find_for_member(
        &self,
        member: &str,
        id: Uuid,
    ) -> Result<Option<Channel>, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT id, name, members, messages, created_at
            FROM channels
            WHERE id = $1 AND $2 = ANY(members)
            "#,
        )
        .bind(id)
        .bind(member)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_channel()))
    }

    /// Fetch a channel without membership scoping (internal use).
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Channel>, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT id, name, members, messages, created_at
            FROM channels
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_channel()))
    }

    /// Find the reserved channel with the given name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Channel>, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT id, name, members, messages, created_at
            FROM channels
            WHERE name = $1
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_channel()))
    }

    /// List channels `member` belongs to, message bodies omitted.
    async fn list_for_member(&self, member: &str) -> Result<Vec<ChannelSummary>, AppError> {
        let rows = sqlx::query_as::<_, ChannelSummaryRow>(
            r#"
            SELECT id, name, members, created_at
            FROM channels
            WHERE $1 = ANY(members)
            ORDER BY created_at
            "#,
        )
        .bind(member)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ChannelSummary {
                id: r.id,
                name: r.name,
                members: r.members,
                created_at: r.created_at,
            })
            .collect())
    }

    /// Membership add and join notice in one statement. `None` when the
    /// user is already a member or the channel is absent.
    async fn add_member(
        &self,
        id: Uuid,
        user: &str,
        notice: &Message,
    ) -> Result<Option<Channel>, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            UPDATE channels
            SET members = array_append(members, $2),
                messages = messages || $3
            WHERE id = $1 AND NOT ($2 = ANY(members))
            RETURNING id, name, members, messages, created_at
            "#,
        )
        .bind(id)
        .bind(user)
        .bind(Json(notice))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_channel()))
    }

    /// Membership removal as one conditional statement. `None` when the
    /// user was not a member.
    async fn remove_member(&self, id: Uuid, user: &str) -> Result<Option<Channel>, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            UPDATE channels
            SET members = array_remove(members, $2)
            WHERE id = $1 AND $2 = ANY(members)
            RETURNING id, name, members, messages, created_at
            "#,
        )
        .bind(id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_channel()))
    }

    /// Delete the channel iff depleted and not "Global". The predicate
    /// runs store-side so a concurrent join cannot race the delete.
    async fn delete_if_depleted(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM channels
            WHERE id = $1 AND cardinality(members) < $2 AND name <> $3
            "#,
        )
        .bind(id)
        .bind(MIN_MEMBERS as i32)
        .bind(GLOBAL_CHANNEL)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append a user message iff the author is a member.
    async fn append_user_message(
        &self,
        id: Uuid,
        author: &str,
        message: &Message,
    ) -> Result<Option<Channel>, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            UPDATE channels
            SET messages = messages || $3
            WHERE id = $1 AND $2 = ANY(members)
            RETURNING id, name, members, messages, created_at
            "#,
        )
        .bind(id)
        .bind(author)
        .bind(Json(message))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_channel()))
    }

    /// Append a server-generated notice without membership scoping.
    async fn append_system_message(
        &self,
        id: Uuid,
        message: &Message,
    ) -> Result<Option<Channel>, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            UPDATE channels
            SET messages = messages || $2
            WHERE id = $1
            RETURNING id, name, members, messages, created_at
            "#,
        )
        .bind(id)
        .bind(Json(message))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_channel()))
    }

    /// Explicitly delete a channel.
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM channels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Channel {} doesn't exist", id)));
        }

        Ok(())
    }
}
