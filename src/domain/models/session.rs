use serde::{Deserialize, Serialize};
use crate::domain::models::user::Identity;

/// Who is signed in, plus the token the client must present.
/// Sessions written before tokens existed deserialize with an empty token and never match.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub token: String,
}

impl Session {
    pub fn new(identity: &Identity, token: String) -> Self {
        Self {
            id: identity.id.clone(),
            username: identity.username.clone(),
            token,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            username: self.username.clone(),
        }
    }

    /// Empty tokens never match.
    pub fn is_held_by(&self, token: &str) -> bool {
        !self.token.is_empty() && self.token == token
    }
}

/// 48 random alphanumeric characters.
pub fn generate_session_token() -> String {
    use rand::{distributions::Alphanumeric, Rng};
    rand::thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect()
}
