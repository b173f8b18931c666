//! Player identity collaborator.

use derive_more::{Display, Error};
use tracing::{debug, instrument};

/// Identity lookup failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Identity error: {} at {}:{}", message, file, line)]
pub struct IdentityError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl IdentityError {
    /// Creates a new identity error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Supplies the signed-in player, if any.
///
/// The session only asks whether someone is present; the statistics
/// reporter resolves the name.
pub trait IdentityProvider: Send + Sync {
    /// Display name of the current player, or `None` when anonymous.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the lookup fails.
    fn current_user(&self) -> Result<Option<String>, IdentityError>;

    /// Whether a player is signed in.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the lookup fails.
    fn is_user_present(&self) -> Result<bool, IdentityError> {
        Ok(self.current_user()?.is_some())
    }
}

/// Identity fixed at startup from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    player: Option<String>,
}

impl StaticIdentity {
    /// A signed-in player. Blank names are treated as anonymous.
    #[instrument]
    pub fn new(player: Option<String>) -> Self {
        let player = player.filter(|name| !name.trim().is_empty());
        debug!(present = player.is_some(), "Identity configured");
        Self { player }
    }

    /// No player signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Result<Option<String>, IdentityError> {
        Ok(self.player.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_player_is_present() {
        let identity = StaticIdentity::new(Some("ada".to_string()));
        assert!(identity.is_user_present().expect("static lookup"));
        assert_eq!(identity.current_user().expect("static lookup"), Some("ada".to_string()));
    }

    #[test]
    fn test_blank_name_is_anonymous() {
        let identity = StaticIdentity::new(Some("  ".to_string()));
        assert!(!identity.is_user_present().expect("static lookup"));
        assert!(!StaticIdentity::anonymous().is_user_present().expect("static lookup"));
    }
}
