use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a signed token lets its holder do.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Confirm,
    Reset,
    ChangeEmail,
    Session,
}

impl ActionKind {
    /// Lifetime used when minting for a mailed link.
    pub fn default_ttl(self) -> Duration {
        match self {
            ActionKind::Confirm => Duration::seconds(604800),
            ActionKind::Reset | ActionKind::ChangeEmail => Duration::seconds(3600),
            ActionKind::Session => Duration::hours(24),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Confirm => write!(f, "confirm"),
            ActionKind::Reset => write!(f, "reset"),
            ActionKind::ChangeEmail => write!(f, "change_email"),
            ActionKind::Session => write!(f, "session"),
        }
    }
}

/// The signed body of a token. Field order is fixed, so encoding is deterministic.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ActionClaims {
    pub kind: ActionKind,
    pub user_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}
