/// Registration, login and token refresh for residents
use super::clean_optional;
use crate::db::ResidentStore;
use crate::error::{AppError, Result};
use crate::models::{Residency, Resident};
use chrono::Utc;
use crypto_core::jwt::{self, TokenPair, TokenType};
use crypto_core::{hash_password, verify_password};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 20, message = "Apartment number must be at most 20 characters"))]
    pub apt_number: Option<String>,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub resident: Resident,
    pub tokens: TokenPair,
}

lazy_static! {
    /// Verified against when the email is unknown, so both login failures cost one argon2 run
    static ref DUMMY_PASSWORD_HASH: Option<String> =
        hash_password("condovoice-no-such-resident").ok();
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue_tokens(resident: &Resident) -> Result<TokenPair> {
    Ok(jwt::generate_token_pair(
        resident.id,
        &resident.email,
        resident.display_name(),
    )?)
}

pub struct AuthService {
    residents: Arc<dyn ResidentStore>,
}

impl AuthService {
    pub fn new(residents: Arc<dyn ResidentStore>) -> Self {
        Self { residents }
    }

    pub async fn register(&self, req: Registration) -> Result<AuthResponse> {
        let req = Registration {
            email: normalize_email(&req.email),
            ..req
        };
        req.validate()?;

        let now = Utc::now();
        let resident = Resident {
            id: Uuid::new_v4(),
            password_hash: hash_password(&req.password)?,
            email: req.email,
            name: clean_optional(req.name),
            phone: clean_optional(req.phone),
            apt_number: clean_optional(req.apt_number),
            avatar: None,
            card_color: None,
            residency: Residency::default(),
            move_in_date: None,
            created_at: now,
            updated_at: now,
        };
        self.residents.insert_resident(&resident).await?;

        tracing::info!(resident_id = %resident.id, "Resident registered");
        let tokens = issue_tokens(&resident)?;
        Ok(AuthResponse { resident, tokens })
    }

    pub async fn login(&self, req: Credentials) -> Result<AuthResponse> {
        req.validate()?;
        let email = normalize_email(&req.email);

        let resident = match self.residents.find_by_email(&email).await? {
            Some(resident) => resident,
            None => {
                if let Some(hash) = DUMMY_PASSWORD_HASH.as_deref() {
                    let _ = verify_password(&req.password, hash);
                }
                return Err(AppError::Unauthorized("Invalid email or password".into()));
            }
        };
        verify_password(&req.password, &resident.password_hash)?;

        tracing::info!(resident_id = %resident.id, "Resident logged in");
        let tokens = issue_tokens(&resident)?;
        Ok(AuthResponse { resident, tokens })
    }

    /// Trade a refresh token for a new pair. Access tokens are refused.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = jwt::validate_token_of_type(refresh_token, TokenType::Refresh)
            .map_err(|e| AppError::Unauthorized(format!("{:#}", e)))?;
        let resident_id = claims
            .resident_id()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".into()))?;

        let resident = self
            .residents
            .find_by_id(resident_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Resident no longer exists".into()))?;

        issue_tokens(&resident)
    }
}
