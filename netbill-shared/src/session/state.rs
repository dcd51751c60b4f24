use serde::{Deserialize, Serialize};

use crate::models::SessionUser;

/// Version tag written alongside the persisted session.
pub const SESSION_FORMAT_VERSION: u32 = 0;

/// Snapshot of the authentication state.
///
/// `is_authenticated` is stored, not derived: only `set_auth` raises it and
/// only `logout` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The signed-in user, normalized at sign-in.
    pub user: Option<SessionUser>,
    /// Bearer token sent with every API call.
    pub token: Option<String>,
    /// Whether a sign-in is currently active.
    pub is_authenticated: bool,
}

impl Session {
    /// Bearer token, when one is held.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedSession {
    state: Session,
    version: u32,
}

/// Errors decoding a persisted session.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DecodeError {
    #[error("malformed session payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported session format version {0}")]
    Version(u32),
}

pub(crate) fn encode(session: &Session) -> Result<String, serde_json::Error> {
    serde_json::to_string(&PersistedSession {
        state: session.clone(),
        version: SESSION_FORMAT_VERSION,
    })
}

pub(crate) fn decode(raw: &str) -> Result<Session, DecodeError> {
    let persisted: PersistedSession = serde_json::from_str(raw)?;
    if persisted.version != SESSION_FORMAT_VERSION {
        return Err(DecodeError::Version(persisted.version));
    }
    Ok(persisted.state)
}
