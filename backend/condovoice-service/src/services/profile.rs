/// Own-profile reads and updates, including avatar uploads
use super::clean_optional;
use crate::db::ResidentStore;
use crate::error::{AppError, Result};
use crate::models::{AvatarKind, Residency, Resident};
use crate::storage::AvatarStorage;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub const MAX_EMOJI_AVATAR_CHARS: usize = 64;

/// Image URL or inline emoji; `None` for anything else
pub fn classify_avatar(avatar: &str) -> Option<AvatarKind> {
    let avatar = avatar.trim();
    if avatar.is_empty() {
        return None;
    }
    if avatar.starts_with("http://") || avatar.starts_with("https://") || avatar.starts_with('/') {
        return Some(AvatarKind::Image);
    }
    if avatar.chars().count() > MAX_EMOJI_AVATAR_CHARS {
        return None;
    }

    // Markup like <span class="emoji">…</span> is allowed around the glyph
    let mut in_tag = false;
    let mut visible = String::new();
    for c in avatar.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => visible.push(c),
            _ => {}
        }
    }

    let visible = visible.trim();
    if visible.is_empty() || visible.chars().any(|c| c.is_ascii_alphanumeric()) {
        None
    } else {
        Some(AvatarKind::Emoji)
    }
}

/// `#RRGGBB`
pub fn is_valid_card_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Partial profile update. Absent fields stay as they are; blank text clears
/// an optional field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileChanges {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 20, message = "Apartment number must be at most 20 characters"))]
    pub apt_number: Option<String>,
    pub avatar: Option<String>,
    pub card_color: Option<String>,
    pub residency: Option<Residency>,
    /// `YYYY-MM-DD`, or blank to clear
    pub move_in_date: Option<String>,
}

impl ProfileChanges {
    /// Validate and merge into `resident`
    pub fn apply(self, resident: &mut Resident) -> Result<()> {
        self.validate()?;

        if let Some(name) = self.name {
            resident.name = clean_optional(Some(name));
        }
        if let Some(phone) = self.phone {
            resident.phone = clean_optional(Some(phone));
        }
        if let Some(apt) = self.apt_number {
            resident.apt_number = clean_optional(Some(apt));
        }
        if let Some(avatar) = self.avatar {
            let avatar = clean_optional(Some(avatar));
            if let Some(value) = &avatar {
                if classify_avatar(value).is_none() {
                    return Err(AppError::Validation(
                        "Avatar must be an image URL or an emoji".into(),
                    ));
                }
            }
            resident.avatar = avatar;
        }
        if let Some(color) = self.card_color {
            let color = clean_optional(Some(color));
            if let Some(value) = &color {
                if !is_valid_card_color(value) {
                    return Err(AppError::Validation(
                        "Card color must look like #RRGGBB".into(),
                    ));
                }
            }
            resident.card_color = color;
        }
        if let Some(residency) = self.residency {
            resident.residency = residency;
        }
        if let Some(date) = self.move_in_date {
            resident.move_in_date = match clean_optional(Some(date)) {
                Some(value) => Some(NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
                    AppError::Validation("Move-in date must look like YYYY-MM-DD".into())
                })?),
                None => None,
            };
        }

        resident.updated_at = Utc::now();
        Ok(())
    }
}

pub struct ProfileService {
    residents: Arc<dyn ResidentStore>,
    avatars: Option<Arc<dyn AvatarStorage>>,
}

impl ProfileService {
    pub fn new(
        residents: Arc<dyn ResidentStore>,
        avatars: Option<Arc<dyn AvatarStorage>>,
    ) -> Self {
        Self { residents, avatars }
    }

    pub async fn get(&self, id: Uuid) -> Result<Resident> {
        self.residents
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resident not found".into()))
    }

    pub async fn update(&self, id: Uuid, changes: ProfileChanges) -> Result<Resident> {
        let mut resident = self.get(id).await?;
        changes.apply(&mut resident)?;

        if !self.residents.update_resident(&resident).await? {
            return Err(AppError::NotFound("Resident not found".into()));
        }
        tracing::info!(resident_id = %id, "Profile updated");
        Ok(resident)
    }

    /// Store a new avatar image and point the profile at it
    pub async fn upload_avatar(
        &self,
        id: Uuid,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<Resident> {
        let storage = self
            .avatars
            .as_ref()
            .ok_or_else(|| AppError::Unavailable("Avatar storage is not configured".into()))?;

        let mut resident = self.get(id).await?;
        let size = body.len();
        let url = storage.store_avatar(id, body, content_type).await?;

        resident.avatar = Some(url);
        resident.updated_at = Utc::now();
        if !self.residents.update_resident(&resident).await? {
            return Err(AppError::NotFound("Resident not found".into()));
        }

        tracing::info!(resident_id = %id, bytes = size, content_type, "Avatar uploaded");
        Ok(resident)
    }
}
