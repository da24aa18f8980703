//! Bearer token verification.
//!
//! Tokens are HS256 and signed by the auth provider with a secret this
//! service shares. Providers differ in how they encode the subject, so
//! `sub` is accepted both as a JSON number and as a numeric string.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use tutorhub_core::roles::ROLE_USER;
use tutorhub_core::types::DbId;

/// Decoded token payload.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's row id.
    #[serde(deserialize_with = "user_id_from_subject")]
    pub sub: DbId,
    #[serde(default = "default_role")]
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

fn default_role() -> String {
    ROLE_USER.to_string()
}

fn user_id_from_subject<'de, D>(deserializer: D) -> Result<DbId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Subject {
        Number(DbId),
        Text(String),
    }

    match Subject::deserialize(deserializer)? {
        Subject::Number(id) => Ok(id),
        Subject::Text(text) => text.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("token subject '{text}' is not a user id"))
        }),
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of tokens minted by [`generate_access_token`].
    pub access_token_expiry_mins: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// Reads `JWT_SECRET` (required) and `JWT_ACCESS_EXPIRY_MINS`
    /// (default 60).
    ///
    /// # Panics
    ///
    /// If the secret is missing or empty, or the expiry is not a number.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .ok()
            .map(|v| v.parse::<i64>().expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64"))
            .unwrap_or(DEFAULT_ACCESS_EXPIRY_MINS);

        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Mint a token the way the auth provider would. Used by tests and local
/// tooling; production tokens come from the provider.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: iat + config.access_token_expiry_mins * 60,
        iat,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry and return the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SECRET: &str = "tutorhub-test-secret";

    fn config() -> JwtConfig {
        JwtConfig {
            secret: SECRET.to_string(),
            access_token_expiry_mins: 15,
        }
    }

    fn sign(payload: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn minted_token_round_trips_subject_and_role() {
        let token = generate_access_token(42, "admin", &config()).unwrap();
        let claims = validate_token(&token, &config()).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn string_subject_is_accepted() {
        let now = chrono::Utc::now().timestamp();
        let token = sign(json!({ "sub": "314", "exp": now + 600, "iat": now }));

        let claims = validate_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, 314);
        assert_eq!(claims.role, ROLE_USER);
    }

    #[test]
    fn non_numeric_subject_is_rejected() {
        let now = chrono::Utc::now().timestamp();
        let token = sign(json!({ "sub": "user-abc", "exp": now + 600, "iat": now }));

        assert!(validate_token(&token, &config()).is_err());
    }

    #[test]
    fn token_past_expiry_and_leeway_is_rejected() {
        let now = chrono::Utc::now().timestamp();
        let token = sign(json!({ "sub": 1, "exp": now - 300, "iat": now - 900 }));

        assert!(validate_token(&token, &config()).is_err());
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = generate_access_token(1, ROLE_USER, &config()).unwrap();
        let other = JwtConfig {
            secret: "someone-else".to_string(),
            ..config()
        };

        assert!(validate_token(&token, &other).is_err());
    }
}
