/// Post service - feed, post creation/deletion, likes and comments
use super::polls::{build_poll, poll_view, PollDraft};
use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::metrics::LIKE_TOGGLES_TOTAL;
use crate::models::{Comment, EventDetails, Post, PostCategory, PostView, Resident, Urgency};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub const MAX_POST_CHARS: usize = 2000;
pub const MAX_COMMENT_CHARS: usize = 1000;
pub const MAX_LOCATION_CHARS: usize = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    /// Length is checked after trimming
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: PostCategory,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub event: Option<EventDetails>,
    #[serde(default)]
    pub poll: Option<PollDraft>,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub post_id: Uuid,
    pub liked: bool,
    pub like_count: i64,
}

/// Checks that need the whole request: content vs poll, event vs category
fn validate_new_post(req: &NewPost) -> Result<(String, Option<EventDetails>)> {
    let content = req.content.trim().to_string();
    if content.is_empty() && req.poll.is_none() {
        return Err(AppError::Validation("Post content is required".into()));
    }
    if content.chars().count() > MAX_POST_CHARS {
        return Err(AppError::Validation(format!(
            "Post content must be at most {} characters",
            MAX_POST_CHARS
        )));
    }

    let event = match (req.category, &req.event) {
        (PostCategory::Event, None) => {
            return Err(AppError::Validation(
                "Event posts need a start time".into(),
            ))
        }
        (PostCategory::Event, Some(event)) => {
            if event.ends_at.map_or(false, |end| end < event.starts_at) {
                return Err(AppError::Validation(
                    "Event cannot end before it starts".into(),
                ));
            }
            let location = super::clean_optional(event.location.clone());
            if location
                .as_deref()
                .map_or(false, |l| l.chars().count() > MAX_LOCATION_CHARS)
            {
                return Err(AppError::Validation(format!(
                    "Event location must be at most {} characters",
                    MAX_LOCATION_CHARS
                )));
            }
            Some(EventDetails {
                starts_at: event.starts_at,
                ends_at: event.ends_at,
                location,
            })
        }
        (_, Some(_)) => {
            return Err(AppError::Validation(
                "Event details are only allowed on event posts".into(),
            ))
        }
        (_, None) => None,
    };

    Ok((content, event))
}

fn validate_comment(content: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Comment cannot be empty".into()));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::Validation(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_CHARS
        )));
    }
    Ok(content.to_string())
}

/// Shape a stored post for one viewer
pub fn post_view(post: Post, viewer: Uuid, has_voted: bool) -> PostView {
    PostView {
        id: post.id,
        liked: post.liked_by.contains(&viewer),
        like_count: post.liked_by.len() as i64,
        comment_count: post.comments.len(),
        poll: post.poll.as_ref().map(|poll| poll_view(poll, has_voted)),
        author: post.author,
        content: post.content,
        category: post.category,
        urgency: post.urgency,
        event: post.event,
        comments: post.comments,
        created_at: post.created_at,
    }
}

pub struct PostService {
    posts: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    async fn views(&self, posts: Vec<Post>, viewer: Uuid) -> Result<Vec<PostView>> {
        let poll_ids: Vec<Uuid> = posts
            .iter()
            .filter(|p| p.poll.is_some())
            .map(|p| p.id)
            .collect();
        let voted: HashSet<Uuid> = self.posts.voted_posts(viewer, &poll_ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| {
                let has_voted = voted.contains(&post.id);
                post_view(post, viewer, has_voted)
            })
            .collect())
    }

    async fn require_post(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".into()))
    }

    pub async fn create_post(&self, author: &Resident, req: NewPost) -> Result<PostView> {
        let (content, event) = validate_new_post(&req)?;
        let poll = req.poll.as_ref().map(build_poll).transpose()?;

        let post = Post {
            id: Uuid::new_v4(),
            author: author.snapshot(),
            content,
            category: req.category,
            urgency: req.urgency,
            event,
            liked_by: Vec::new(),
            comments: Vec::new(),
            poll,
            created_at: Utc::now(),
        };
        self.posts.insert_post(&post).await?;

        tracing::info!(
            post_id = %post.id,
            author_id = %author.id,
            category = %post.category,
            has_poll = post.poll.is_some(),
            "Post created"
        );
        Ok(post_view(post, author.id, false))
    }

    pub async fn feed(
        &self,
        viewer: Uuid,
        category: Option<PostCategory>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>> {
        let posts = self.posts.list_posts(category, limit, offset).await?;
        self.views(posts, viewer).await
    }

    pub async fn get_post(&self, viewer: Uuid, post_id: Uuid) -> Result<PostView> {
        let post = self.require_post(post_id).await?;
        let mut views = self.views(vec![post], viewer).await?;
        views
            .pop()
            .ok_or_else(|| AppError::NotFound("Post not found".into()))
    }

    /// Only the author may delete a post
    pub async fn delete_post(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        let post = self.require_post(post_id).await?;
        if post.author.id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can delete this post".into(),
            ));
        }

        if !self.posts.delete_post(post_id).await? {
            return Err(AppError::NotFound("Post not found".into()));
        }
        tracing::info!(post_id = %post_id, user_id = %user_id, "Post deleted");
        Ok(())
    }

    pub async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<LikeResponse> {
        let state = self
            .posts
            .toggle_like(post_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

        let action = if state.liked { "liked" } else { "unliked" };
        LIKE_TOGGLES_TOTAL.with_label_values(&[action]).inc();
        tracing::debug!(post_id = %post_id, user_id = %user_id, action, "Like toggled");

        Ok(LikeResponse {
            post_id,
            liked: state.liked,
            like_count: state.like_count,
        })
    }

    /// Comments oldest first, as appended
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        Ok(self.require_post(post_id).await?.comments)
    }

    pub async fn add_comment(
        &self,
        author: &Resident,
        post_id: Uuid,
        content: &str,
    ) -> Result<Comment> {
        let content = validate_comment(content)?;
        let comment = Comment {
            id: Uuid::new_v4(),
            author: author.snapshot(),
            content,
            created_at: Utc::now(),
        };

        if !self.posts.append_comment(post_id, &comment).await? {
            return Err(AppError::NotFound("Post not found".into()));
        }
        tracing::info!(post_id = %post_id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }
}
