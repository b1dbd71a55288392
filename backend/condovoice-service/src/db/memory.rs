/// In-memory store used for `STORE_BACKEND=memory` and in tests
///
/// Each operation holds the relevant write lock for its whole duration, which
/// gives the same single-document atomicity as the PostgreSQL store.
use super::{check_vote, PostStore, ResidentStore, VoteOutcome};
use crate::error::{AppError, Result};
use crate::models::{Comment, LikeState, Poll, Post, PostCategory, Resident};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    residents: RwLock<HashMap<Uuid, Resident>>,
    posts: RwLock<HashMap<Uuid, Post>>,
    /// (post, resident) -> chosen option
    votes: RwLock<HashMap<(Uuid, Uuid), usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait::async_trait]
impl ResidentStore for MemoryStore {
    async fn insert_resident(&self, resident: &Resident) -> Result<()> {
        let mut residents = self.residents.write().await;
        if residents.values().any(|r| r.email == resident.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        residents.insert(resident.id, resident.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Resident>> {
        Ok(self.residents.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Resident>> {
        Ok(self
            .residents
            .read()
            .await
            .values()
            .find(|r| r.email == email)
            .cloned())
    }

    async fn list_residents(&self) -> Result<Vec<Resident>> {
        Ok(self.residents.read().await.values().cloned().collect())
    }

    async fn update_resident(&self, resident: &Resident) -> Result<bool> {
        let mut residents = self.residents.write().await;
        match residents.get_mut(&resident.id) {
            Some(existing) => {
                existing.name = resident.name.clone();
                existing.phone = resident.phone.clone();
                existing.apt_number = resident.apt_number.clone();
                existing.avatar = resident.avatar.clone();
                existing.card_color = resident.card_color.clone();
                existing.residency = resident.residency;
                existing.move_in_date = resident.move_in_date;
                existing.updated_at = resident.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: &Post) -> Result<()> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn list_posts(
        &self,
        category: Option<PostCategory>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        newest_first(&mut posts);

        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let removed = self.posts.write().await.remove(&id).is_some();
        if removed {
            self.votes.write().await.retain(|(post_id, _), _| *post_id != id);
        }
        Ok(removed)
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<LikeState>> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(&post_id) else {
            return Ok(None);
        };

        let liked = match post.liked_by.iter().position(|id| *id == user_id) {
            Some(pos) => {
                post.liked_by.remove(pos);
                false
            }
            None => {
                post.liked_by.push(user_id);
                true
            }
        };

        Ok(Some(LikeState {
            liked,
            like_count: post.liked_by.len() as i64,
        }))
    }

    async fn append_comment(&self, post_id: Uuid, comment: &Comment) -> Result<bool> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&post_id) {
            Some(post) => {
                post.comments.push(comment.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_vote(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        option_index: usize,
    ) -> Result<VoteOutcome> {
        // Lock order: posts, then votes
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(&post_id) else {
            return Ok(VoteOutcome::PostNotFound);
        };
        if let Some(rejected) = check_vote(post.poll.as_ref(), option_index) {
            return Ok(rejected);
        }

        let mut votes = self.votes.write().await;
        let Some(poll) = post.poll.as_mut() else {
            return Ok(VoteOutcome::NoPoll);
        };
        if votes.contains_key(&(post_id, user_id)) {
            return Ok(VoteOutcome::AlreadyVoted(poll.clone()));
        }

        votes.insert((post_id, user_id), option_index);
        poll.options[option_index].votes += 1;
        Ok(VoteOutcome::Recorded(poll.clone()))
    }

    async fn voted_posts(&self, user_id: Uuid, post_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        let votes = self.votes.read().await;
        Ok(post_ids
            .iter()
            .filter(|post_id| votes.contains_key(&(**post_id, user_id)))
            .copied()
            .collect())
    }

    async fn close_poll(&self, post_id: Uuid) -> Result<Option<Poll>> {
        let mut posts = self.posts.write().await;
        Ok(posts
            .get_mut(&post_id)
            .and_then(|post| post.poll.as_mut())
            .map(|poll| {
                poll.active = false;
                poll.clone()
            }))
    }

    async fn list_poll_posts(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.poll.is_some())
            .cloned()
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
