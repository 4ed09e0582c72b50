//! Player bearer tokens.
//!
//! Tokens are HS256 JWTs minted by the account service. The claim server only
//! verifies them; [`issue_player_token`] exists for tooling and tests.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use terraclaim_core::types::DbId;

/// Payload carried by a player token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerClaims {
    /// Player id.
    pub sub: DbId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret.
    pub secret: String,
    /// Required `iss` claim, if any.
    pub issuer: Option<String>,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
    /// Lifetime of tokens minted by [`issue_player_token`].
    pub token_ttl_mins: i64,
}

const DEFAULT_LEEWAY_SECS: u64 = 30;
const DEFAULT_TOKEN_TTL_MINS: i64 = 60;

impl JwtConfig {
    /// Load token settings from the environment.
    ///
    /// | Env Var            | Required | Default |
    /// |--------------------|----------|---------|
    /// | `JWT_SECRET`       | **yes**  | --      |
    /// | `JWT_ISSUER`       | no       | unset   |
    /// | `JWT_LEEWAY_SECS`  | no       | `30`    |
    /// | `JWT_TTL_MINS`     | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or a numeric value does
    /// not parse.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let issuer = std::env::var("JWT_ISSUER").ok().filter(|s| !s.trim().is_empty());

        let leeway_secs = std::env::var("JWT_LEEWAY_SECS")
            .map(|v| v.parse().expect("JWT_LEEWAY_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_LEEWAY_SECS);
        let token_ttl_mins = std::env::var("JWT_TTL_MINS")
            .map(|v| v.parse().expect("JWT_TTL_MINS must be a valid i64"))
            .unwrap_or(DEFAULT_TOKEN_TTL_MINS);

        Self {
            secret,
            issuer,
            leeway_secs,
            token_ttl_mins,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

/// Mint a token for `player_id` valid for `config.token_ttl_mins`.
pub fn issue_player_token(
    player_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = PlayerClaims {
        sub: player_id,
        exp: now + config.token_ttl_mins * 60,
        iat: now,
        iss: config.issuer.clone(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, expiry and issuer, returning the embedded claims.
pub fn verify_player_token(
    token: &str,
    config: &JwtConfig,
) -> Result<PlayerClaims, jsonwebtoken::errors::Error> {
    let data = decode::<PlayerClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )?;
    Ok(data.claims)
}
