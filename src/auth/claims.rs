use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload of a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,   // user ID
    pub iat: usize,  // issued at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>, // expires at, only when a TTL is configured
    pub iss: String, // issuer
    pub aud: String, // audience
    pub jti: Uuid,   // keeps tokens issued in the same second distinct
}
