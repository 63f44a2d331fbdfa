use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use review_server_domain::{ServiceError, ServiceResult, UserId, account::AuthenticatedUser};
use serde::{Deserialize, Serialize};

/// Lifetime of a session token.
const TOKEN_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the logged in user.
    pub sub: String,
    pub name: String,
    exp: usize,
}

pub struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

pub fn generate_jwt(keys: &Keys, user: &AuthenticatedUser) -> ServiceResult<String> {
    let claims = Claims {
        sub: user.id.to_string(),
        name: user.username.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(TOKEN_HOURS)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|e| ServiceError::Internal(format!("Failed to sign token: {}", e)))
}

pub fn validate_jwt(keys: &Keys, token: &str) -> Option<UserId> {
    let data = decode::<Claims>(token, &keys.decoding, &Validation::default()).ok()?;
    data.claims.sub.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AuthenticatedUser {
        AuthenticatedUser {
            id: 7,
            username: "alice".to_string(),
        }
    }

    #[test]
    fn test_token_carries_user_id() {
        let keys = Keys::new(b"secret");
        let token = generate_jwt(&keys, &alice()).unwrap();
        assert_eq!(validate_jwt(&keys, &token), Some(7));
    }

    #[test]
    fn test_rejects_foreign_and_garbage_tokens() {
        let token = generate_jwt(&Keys::new(b"secret"), &alice()).unwrap();
        let other = Keys::new(b"other secret");
        assert_eq!(validate_jwt(&other, &token), None);
        assert_eq!(validate_jwt(&other, "not-a-token"), None);
    }

    #[test]
    fn test_rejects_expired_token() {
        let keys = Keys::new(b"secret");
        let claims = Claims {
            sub: "7".to_string(),
            name: "alice".to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert_eq!(validate_jwt(&keys, &token), None);
    }
}
