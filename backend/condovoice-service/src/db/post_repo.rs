use super::{check_vote, PostStore, VoteOutcome};
use crate::error::{AppError, Result};
use crate::models::{AuthorSnapshot, Comment, EventDetails, LikeState, Poll, Post, PostCategory};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Row};
use std::collections::HashSet;
use uuid::Uuid;

const POST_COLUMNS: &str = r#"
    id, author, content, category, urgency, event, liked_by, comments, poll, created_at
"#;

#[derive(FromRow)]
struct PostRow {
    id: Uuid,
    author: Json<AuthorSnapshot>,
    content: String,
    category: String,
    urgency: String,
    event: Option<Json<EventDetails>>,
    liked_by: Vec<Uuid>,
    comments: Json<Vec<Comment>>,
    poll: Option<Json<Poll>>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = AppError;

    fn try_from(row: PostRow) -> Result<Self> {
        Ok(Post {
            id: row.id,
            author: row.author.0,
            content: row.content,
            category: row.category.parse().map_err(AppError::Database)?,
            urgency: row.urgency.parse().map_err(AppError::Database)?,
            event: row.event.map(|e| e.0),
            liked_by: row.liked_by,
            comments: row.comments.0,
            poll: row.poll.map(|p| p.0),
            created_at: row.created_at,
        })
    }
}

fn into_posts(rows: Vec<PostRow>) -> Result<Vec<Post>> {
    rows.into_iter().map(Post::try_from).collect()
}

/// PostgreSQL-backed post store. Every mutation is a single-row update.
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PostStore for PgPostStore {
    async fn insert_post(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, author, content, category, urgency, event,
                               liked_by, comments, poll, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(post.id)
        .bind(post.author.id)
        .bind(Json(&post.author))
        .bind(&post.content)
        .bind(post.category.as_str())
        .bind(post.urgency.as_str())
        .bind(post.event.as_ref().map(Json))
        .bind(&post.liked_by)
        .bind(Json(&post.comments))
        .bind(post.poll.as_ref().map(Json))
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Post::try_from).transpose()
    }

    async fn list_posts(
        &self,
        category: Option<PostCategory>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {}
            FROM posts
            WHERE ($1::TEXT IS NULL OR category = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            POST_COLUMNS
        ))
        .bind(category.map(|c| c.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        into_posts(rows)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        // poll_votes rows go with the post via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<LikeState>> {
        let row = sqlx::query(
            r#"
            UPDATE posts
            SET liked_by = CASE
                WHEN $2 = ANY(liked_by) THEN array_remove(liked_by, $2)
                ELSE array_append(liked_by, $2)
            END
            WHERE id = $1
            RETURNING $2 = ANY(liked_by) AS liked, cardinality(liked_by)::BIGINT AS like_count
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| LikeState {
            liked: row.get("liked"),
            like_count: row.get("like_count"),
        }))
    }

    async fn append_comment(&self, post_id: Uuid, comment: &Comment) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET comments = comments || jsonb_build_array($2::JSONB)
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .bind(Json(comment))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_vote(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        option_index: usize,
    ) -> Result<VoteOutcome> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent votes on the same poll
        let row = sqlx::query("SELECT poll FROM posts WHERE id = $1 FOR UPDATE")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(VoteOutcome::PostNotFound);
        };
        let poll: Option<Json<Poll>> = row.try_get("poll")?;
        let mut poll = poll.map(|p| p.0);

        if let Some(rejected) = check_vote(poll.as_ref(), option_index) {
            return Ok(rejected);
        }
        let Some(poll) = poll.as_mut() else {
            return Ok(VoteOutcome::NoPoll);
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO poll_votes (post_id, user_id, option_index)
            VALUES ($1, $2, $3)
            ON CONFLICT (post_id, user_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(option_index as i32)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.commit().await?;
            return Ok(VoteOutcome::AlreadyVoted(poll.clone()));
        }

        poll.options[option_index].votes += 1;
        sqlx::query("UPDATE posts SET poll = $2 WHERE id = $1")
            .bind(post_id)
            .bind(Json(&*poll))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(VoteOutcome::Recorded(poll.clone()))
    }

    async fn voted_posts(&self, user_id: Uuid, post_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = sqlx::query(
            "SELECT post_id FROM poll_votes WHERE user_id = $1 AND post_id = ANY($2)",
        )
        .bind(user_id)
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get::<Uuid, _>("post_id")).collect())
    }

    async fn close_poll(&self, post_id: Uuid) -> Result<Option<Poll>> {
        let row = sqlx::query(
            r#"
            UPDATE posts
            SET poll = jsonb_set(poll, '{active}', 'false'::JSONB)
            WHERE id = $1 AND poll IS NOT NULL
            RETURNING poll
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let poll: Json<Poll> = row.try_get("poll")?;
                Ok(Some(poll.0))
            }
            None => Ok(None),
        }
    }

    async fn list_poll_posts(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE poll IS NOT NULL ORDER BY created_at DESC, id DESC",
            POST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        into_posts(rows)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
