use serde::Deserialize;

/// A bearer token plus its expiry, as returned by the login endpoint. `has_expired`
/// takes the staleness bound `ε` as an explicit argument rather than storing it, since
/// it is a property of the cache's configuration, not of the token itself.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    pub expiry: chrono::DateTime<chrono::Utc>,
    pub token: String,
}

impl AuthToken {
    /// `expiry < now + ε`.
    pub fn has_expired(&self, now: chrono::DateTime<chrono::Utc>, epsilon: chrono::Duration) -> bool {
        self.expiry < now + epsilon
    }
}
