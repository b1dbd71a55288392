/// Records stored by condovoice-service and the views returned to clients
///
/// Posts are document-shaped: likes, comments and the optional poll live
/// inside the post record so each mutation touches a single row.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Residents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Residency {
    Owner,
    #[default]
    Tenant,
}

impl Residency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Residency::Owner => "owner",
            Residency::Tenant => "tenant",
        }
    }
}

impl FromStr for Residency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Residency::Owner),
            "tenant" => Ok(Residency::Tenant),
            other => Err(format!("unknown residency '{}'", other)),
        }
    }
}

/// A registered resident account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub apt_number: Option<String>,
    /// Image URL or inline emoji glyph
    pub avatar: Option<String>,
    pub card_color: Option<String>,
    pub residency: Residency,
    pub move_in_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resident {
    pub fn snapshot(&self) -> AuthorSnapshot {
        AuthorSnapshot {
            id: self.id,
            name: self.name.clone(),
            apt_number: self.apt_number.clone(),
            avatar: self.avatar.clone(),
            card_color: self.card_color.clone(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Author display fields copied onto posts and comments when they are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSnapshot {
    pub id: Uuid,
    pub name: Option<String>,
    pub apt_number: Option<String>,
    pub avatar: Option<String>,
    pub card_color: Option<String>,
}

// ============================================================================
// Posts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    #[default]
    General,
    Announcement,
    Event,
    Maintenance,
    Security,
    Marketplace,
}

impl PostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostCategory::General => "general",
            PostCategory::Announcement => "announcement",
            PostCategory::Event => "event",
            PostCategory::Maintenance => "maintenance",
            PostCategory::Security => "security",
            PostCategory::Marketplace => "marketplace",
        }
    }
}

impl fmt::Display for PostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(PostCategory::General),
            "announcement" => Ok(PostCategory::Announcement),
            "event" => Ok(PostCategory::Event),
            "maintenance" => Ok(PostCategory::Maintenance),
            "security" => Ok(PostCategory::Security),
            "marketplace" => Ok(PostCategory::Marketplace),
            other => Err(format!("unknown post category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    Important,
    Urgent,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Important => "important",
            Urgency::Urgent => "urgent",
        }
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Urgency::Normal),
            "important" => Ok(Urgency::Important),
            "urgent" => Ok(Urgency::Urgent),
            other => Err(format!("unknown urgency '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author: AuthorSnapshot,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub label: String,
    pub votes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub question: String,
    pub options: Vec<PollOption>,
    pub active: bool,
}

impl Poll {
    pub fn total_votes(&self) -> i64 {
        self.options.iter().map(|o| o.votes).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author: AuthorSnapshot,
    pub content: String,
    pub category: PostCategory,
    pub urgency: Urgency,
    pub event: Option<EventDetails>,
    pub liked_by: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub poll: Option<Poll>,
    pub created_at: DateTime<Utc>,
}

/// Result of flipping a resident's like on a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PollOptionView {
    pub label: String,
    pub votes: i64,
    /// Share of all votes, one decimal place
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollView {
    pub question: String,
    pub options: Vec<PollOptionView>,
    pub total_votes: i64,
    pub active: bool,
    pub has_voted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub author: AuthorSnapshot,
    pub content: String,
    pub category: PostCategory,
    pub urgency: Urgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventDetails>,
    pub like_count: i64,
    pub liked: bool,
    pub comment_count: usize,
    pub comments: Vec<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollSummary {
    pub post_id: Uuid,
    pub question: String,
    pub total_votes: i64,
    pub active: bool,
    pub options: Vec<PollOptionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollStats {
    pub total_polls: usize,
    pub total_votes: i64,
    pub average_votes_per_poll: i64,
    pub polls: Vec<PollSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarKind {
    Image,
    Emoji,
}

/// A resident as shown in the directory, with display defaults applied
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    pub id: Uuid,
    pub name: String,
    pub apt_number: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub avatar_kind: Option<AvatarKind>,
    pub initials: String,
    pub card_color: Option<String>,
    pub residency: Residency,
    pub move_in_date: Option<NaiveDate>,
    pub whatsapp_url: Option<String>,
}
