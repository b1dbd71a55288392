/// Poll creation rules, vote handling and the numbers shown on the votes page
use crate::db::{PostStore, VoteOutcome};
use crate::error::{AppError, Result};
use crate::metrics::POLL_VOTES_TOTAL;
use crate::models::{Poll, PollOption, PollOptionView, PollStats, PollSummary, PollView, Post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub const MIN_POLL_OPTIONS: usize = 2;
pub const MAX_POLL_OPTIONS: usize = 10;
pub const MAX_QUESTION_CHARS: usize = 280;
pub const MAX_OPTION_CHARS: usize = 120;

/// Poll as submitted with a new post
#[derive(Debug, Clone, Deserialize)]
pub struct PollDraft {
    pub question: String,
    pub options: Vec<String>,
}

/// Validate a draft and turn it into an open poll with zeroed tallies.
/// Blank options are dropped before counting.
pub fn build_poll(draft: &PollDraft) -> Result<Poll> {
    let question = draft.question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("Poll question is required".into()));
    }
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(AppError::Validation(format!(
            "Poll question must be at most {} characters",
            MAX_QUESTION_CHARS
        )));
    }

    let labels: Vec<&str> = draft
        .options
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .collect();

    if labels.len() < MIN_POLL_OPTIONS {
        return Err(AppError::Validation(format!(
            "A poll needs at least {} non-empty options",
            MIN_POLL_OPTIONS
        )));
    }
    if labels.len() > MAX_POLL_OPTIONS {
        return Err(AppError::Validation(format!(
            "A poll can have at most {} options",
            MAX_POLL_OPTIONS
        )));
    }
    if labels.iter().any(|l| l.chars().count() > MAX_OPTION_CHARS) {
        return Err(AppError::Validation(format!(
            "Poll options must be at most {} characters",
            MAX_OPTION_CHARS
        )));
    }

    Ok(Poll {
        question: question.to_string(),
        options: labels
            .into_iter()
            .map(|label| PollOption {
                label: label.to_string(),
                votes: 0,
            })
            .collect(),
        active: true,
    })
}

/// Share of `total`, rounded to one decimal. Zero when nobody voted.
pub fn percentage(votes: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (votes as f64 / total as f64 * 1000.0).round() / 10.0
}

pub fn option_views(poll: &Poll) -> Vec<PollOptionView> {
    let total = poll.total_votes();
    poll.options
        .iter()
        .map(|option| PollOptionView {
            label: option.label.clone(),
            votes: option.votes,
            percentage: percentage(option.votes, total),
        })
        .collect()
}

pub fn poll_view(poll: &Poll, has_voted: bool) -> PollView {
    PollView {
        question: poll.question.clone(),
        options: option_views(poll),
        total_votes: poll.total_votes(),
        active: poll.active,
        has_voted,
    }
}

/// Aggregate numbers across every post carrying a poll
pub fn poll_stats(posts: &[Post]) -> PollStats {
    let polls: Vec<PollSummary> = posts
        .iter()
        .filter_map(|post| {
            post.poll.as_ref().map(|poll| PollSummary {
                post_id: post.id,
                question: poll.question.clone(),
                total_votes: poll.total_votes(),
                active: poll.active,
                options: option_views(poll),
            })
        })
        .collect();

    let total_votes: i64 = polls.iter().map(|p| p.total_votes).sum();
    let average_votes_per_poll = if polls.is_empty() {
        0
    } else {
        (total_votes as f64 / polls.len() as f64).round() as i64
    };

    PollStats {
        total_polls: polls.len(),
        total_votes,
        average_votes_per_poll,
        polls,
    }
}

#[derive(Debug, Serialize)]
pub struct VoteResult {
    /// False when the resident had already voted; tallies are unchanged
    pub recorded: bool,
    pub poll: PollView,
}

pub struct PollService {
    posts: Arc<dyn PostStore>,
}

impl PollService {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    pub async fn vote(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        option_index: usize,
    ) -> Result<VoteResult> {
        let outcome = self.posts.record_vote(post_id, user_id, option_index).await?;

        let (label, result) = match outcome {
            VoteOutcome::Recorded(poll) => {
                tracing::info!(post_id = %post_id, user_id = %user_id, option_index, "Vote recorded");
                ("recorded", Ok(VoteResult { recorded: true, poll: poll_view(&poll, true) }))
            }
            VoteOutcome::AlreadyVoted(poll) => {
                tracing::debug!(post_id = %post_id, user_id = %user_id, "Duplicate vote ignored");
                ("duplicate", Ok(VoteResult { recorded: false, poll: poll_view(&poll, true) }))
            }
            VoteOutcome::PostNotFound => ("rejected", Err(AppError::NotFound("Post not found".into()))),
            VoteOutcome::NoPoll => ("rejected", Err(AppError::NotFound("Post has no poll".into()))),
            VoteOutcome::PollClosed => ("rejected", Err(AppError::Conflict("Poll is closed".into()))),
            VoteOutcome::OptionOutOfRange => (
                "rejected",
                Err(AppError::Validation(format!("Option {} does not exist", option_index))),
            ),
        };

        POLL_VOTES_TOTAL.with_label_values(&[label]).inc();
        result
    }

    /// Close the poll on a post. Only the post's author may do this.
    pub async fn close(&self, post_id: Uuid, user_id: Uuid) -> Result<PollView> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

        if post.author.id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can close this poll".into(),
            ));
        }
        if post.poll.is_none() {
            return Err(AppError::NotFound("Post has no poll".into()));
        }

        let poll = self
            .posts
            .close_poll(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post has no poll".into()))?;
        let has_voted = self
            .posts
            .voted_posts(user_id, &[post_id])
            .await?
            .contains(&post_id);

        tracing::info!(post_id = %post_id, "Poll closed");
        Ok(poll_view(&poll, has_voted))
    }

    pub async fn stats(&self) -> Result<PollStats> {
        let posts = self.posts.list_poll_posts().await?;
        Ok(poll_stats(&posts))
    }
}
