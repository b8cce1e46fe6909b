use serde::{Deserialize, Serialize};

use super::{Account, PasswordHash};

/// Role granted to an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Authority {
    User,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::User => "User",
        }
    }
}

impl std::fmt::Display for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The identity handed to an authentication layer.
///
/// Deliberately separate from [Account]: it carries who the caller is and what
/// they may do, not ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    pub authorities: Vec<Authority>,
}

impl Principal {
    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            password_hash: account.password_hash.clone(),
            authorities: vec![Authority::User],
        }
    }
}
