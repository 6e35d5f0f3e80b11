//! Token claim structures.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identity carried by an issued token.
///
/// This is what authenticated handlers and services receive as the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthPayload {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

/// JWT claims: the identity plus issue and expiry timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub user: AuthPayload,
    /// Token expiration timestamp (Unix seconds)
    pub exp: usize,
    /// Token issued-at timestamp (Unix seconds)
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize_flat() {
        let id = Uuid::new_v4();
        let claims = Claims {
            user: AuthPayload {
                id,
                email: "ada@example.com".to_string(),
                username: "ada".to_string(),
            },
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(&format!(r#""id":"{}""#, id)));
        assert!(serialized.contains(r#""username":"ada""#));
        assert!(serialized.contains(r#""exp":1234567890"#));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"id":"6f1c1a8e-2a0b-4c35-9a55-3f2b4c1d9e10","email":"user@test.com","username":"user","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.user.email, "user@test.com");
        assert_eq!(claims.user.username, "user");
        assert_eq!(claims.exp, 9999999999);
    }

    #[test]
    fn test_claims_missing_identity_rejected() {
        let json = r#"{"email":"user@test.com","exp":9999999999,"iat":9999999900}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
    }
}
