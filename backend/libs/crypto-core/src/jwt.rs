/// Resident session tokens for CondoVoice
///
/// Tokens are RS256-signed JWTs. The service that issues tokens loads both
/// halves of the key pair; anything that only checks tokens can be set up with
/// the public key alone.
///
/// ## Usage
///
/// ```rust,no_run
/// use crypto_core::jwt;
///
/// let private_key = std::env::var("JWT_PRIVATE_KEY_PEM").unwrap();
/// let public_key = std::env::var("JWT_PUBLIC_KEY_PEM").unwrap();
/// jwt::initialize_jwt_keys(&private_key, &public_key).unwrap();
/// ```
use anyhow::{anyhow, bail, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

pub const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 1;
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

// ============================================================================
// Data Structures
// ============================================================================

/// Which half of a token pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by every CondoVoice token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Resident id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: TokenType,
    pub email: String,
    /// Display name at issue time; may be empty
    #[serde(default)]
    pub name: String,
}

impl Claims {
    pub fn resident_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid resident id in token: {e}"))
    }
}

/// Token pair handed to a client after register/login/refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// ============================================================================
// Key Storage
// ============================================================================

static JWT_ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Install the signing and verification keys. Can only succeed once per process.
pub fn initialize_jwt_keys(private_key_pem: &str, public_key_pem: &str) -> Result<()> {
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| anyhow!("Failed to parse RSA private key: {e}"))?;
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| anyhow!("Failed to parse RSA public key: {e}"))?;

    JWT_ENCODING_KEY
        .set(encoding_key)
        .map_err(|_| anyhow!("JWT encoding key already initialized"))?;
    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| anyhow!("JWT decoding key already initialized"))?;

    Ok(())
}

fn get_encoding_key() -> Result<&'static EncodingKey> {
    JWT_ENCODING_KEY.get().ok_or_else(|| {
        anyhow!("JWT signing key not initialized. Call initialize_jwt_keys() during startup.")
    })
}

fn get_decoding_key() -> Result<&'static DecodingKey> {
    JWT_DECODING_KEY
        .get()
        .ok_or_else(|| anyhow!("JWT verification key not initialized"))
}

// ============================================================================
// Token Generation
// ============================================================================

fn issue(resident_id: Uuid, email: &str, name: &str, token_type: TokenType) -> Result<String> {
    let now = Utc::now();
    let expiry = match token_type {
        TokenType::Access => now + Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS),
        TokenType::Refresh => now + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
    };

    let claims = Claims {
        sub: resident_id.to_string(),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
        token_type,
        email: email.to_string(),
        name: name.to_string(),
    };

    encode(&Header::new(JWT_ALGORITHM), &claims, get_encoding_key()?)
        .map_err(|e| anyhow!("Failed to sign {token_type:?} token: {e}"))
}

pub fn generate_access_token(resident_id: Uuid, email: &str, name: &str) -> Result<String> {
    issue(resident_id, email, name, TokenType::Access)
}

pub fn generate_refresh_token(resident_id: Uuid, email: &str, name: &str) -> Result<String> {
    issue(resident_id, email, name, TokenType::Refresh)
}

pub fn generate_token_pair(resident_id: Uuid, email: &str, name: &str) -> Result<TokenPair> {
    Ok(TokenPair {
        access_token: generate_access_token(resident_id, email, name)?,
        refresh_token: generate_refresh_token(resident_id, email, name)?,
        token_type: "Bearer".to_string(),
        expires_in: ACCESS_TOKEN_EXPIRY_HOURS * 3600,
    })
}

// ============================================================================
// Token Validation
// ============================================================================

/// Verify signature and expiry, returning the decoded claims
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;

    decode::<Claims>(token, get_decoding_key()?, &validation)
        .map_err(|e| anyhow!("Token validation failed: {e}"))
}

/// Like [`validate_token`] but also rejects tokens of the wrong type
pub fn validate_token_of_type(token: &str, expected: TokenType) -> Result<Claims> {
    let claims = validate_token(token)?.claims;
    if claims.token_type != expected {
        bail!(
            "Expected {:?} token, got {:?} token",
            expected,
            claims.token_type
        );
    }
    Ok(claims)
}
