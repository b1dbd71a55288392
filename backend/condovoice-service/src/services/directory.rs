/// Resident directory: search, ordering and display shaping
use super::profile::classify_avatar;
use crate::db::ResidentStore;
use crate::error::{AppError, Result};
use crate::models::{DirectoryEntry, Resident};
use serde::Deserialize;
use std::cmp::Ordering;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_NAME: &str = "Anonymous";
pub const DEFAULT_APT: &str = "Not set";
pub const DEFAULT_EMAIL: &str = "No email";
pub const DEFAULT_PHONE: &str = "No phone";

const WHATSAPP_BASE_URL: &str = "https://api.whatsapp.com/send?phone=";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectorySort {
    #[default]
    Name,
    #[serde(alias = "apartment")]
    Apt,
}

/// Case-insensitive substring match on the displayed name or apartment, so a
/// resident without a name is found as "Anonymous". A blank term matches everyone.
pub fn matches_search(entry: &DirectoryEntry, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    entry.name.to_lowercase().contains(&term) || entry.apt_number.to_lowercase().contains(&term)
}

/// Order by the chosen displayed field, case-insensitive, ties broken by id
pub fn sort_entries(entries: &mut [DirectoryEntry], sort: DirectorySort) {
    entries.sort_by(|a, b| {
        let primary = match sort {
            DirectorySort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            DirectorySort::Apt => a.apt_number.to_lowercase().cmp(&b.apt_number.to_lowercase()),
        };
        match primary {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        }
    });
}

/// First character of each word, upper-cased
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// WhatsApp deep link for a phone number, using its digits only
pub fn whatsapp_url(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        Some(format!("{}{}", WHATSAPP_BASE_URL, digits))
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

pub fn directory_entry(resident: &Resident) -> DirectoryEntry {
    let name = or_default(&resident.name, DEFAULT_NAME);
    DirectoryEntry {
        id: resident.id,
        initials: initials(&name),
        apt_number: or_default(&resident.apt_number, DEFAULT_APT),
        email: or_default(&Some(resident.email.clone()), DEFAULT_EMAIL),
        phone: or_default(&resident.phone, DEFAULT_PHONE),
        avatar: resident.avatar.clone(),
        avatar_kind: resident.avatar.as_deref().and_then(classify_avatar),
        card_color: resident.card_color.clone(),
        residency: resident.residency,
        move_in_date: resident.move_in_date,
        whatsapp_url: resident.phone.as_deref().and_then(whatsapp_url),
        name,
    }
}

pub struct DirectoryService {
    residents: Arc<dyn ResidentStore>,
}

impl DirectoryService {
    pub fn new(residents: Arc<dyn ResidentStore>) -> Self {
        Self { residents }
    }

    pub async fn list(&self, term: &str, sort: DirectorySort) -> Result<Vec<DirectoryEntry>> {
        let mut entries: Vec<DirectoryEntry> = self
            .residents
            .list_residents()
            .await?
            .iter()
            .map(directory_entry)
            .filter(|entry| matches_search(entry, term))
            .collect();
        sort_entries(&mut entries, sort);

        Ok(entries)
    }

    pub async fn get(&self, id: Uuid) -> Result<DirectoryEntry> {
        self.residents
            .find_by_id(id)
            .await?
            .map(|r| directory_entry(&r))
            .ok_or_else(|| AppError::NotFound("Resident not found".into()))
    }
}
