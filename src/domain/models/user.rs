use serde::{Deserialize, Serialize};

/// Stored credential record. Local mode only; the hosted identity provider keeps its own.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
}

/// What callers get back from register/login/getSession.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub username: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
        }
    }
}

/// Trim + lowercase. Usernames compare case-insensitively everywhere.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  Trainer1 "), "trainer1");
        assert_eq!(normalize_username("ALICE"), "alice");
        assert_eq!(normalize_username("   "), "");
    }
}
