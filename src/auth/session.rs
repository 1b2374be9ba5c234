use crate::error::{Error, Result};

/// The caller identity behind a request.
///
/// Built from a validated token and handed to every library operation, so
/// ownership checks never depend on ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
}

impl Session {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Fails with `Unauthorized` unless this session acts for `owner_id`.
    pub fn require_owner(&self, owner_id: &str) -> Result<()> {
        if self.user_id != owner_id {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }
}
