use std::error::Error;
use std::fmt;

use crate::core::constants::API_KEY_ENV;

/// Keyring failure while reading, storing or deleting the API key.
///
/// A recoverable error means the backend itself could not be reached, so
/// the environment variable is still a way in.
#[derive(Debug)]
pub enum KeyringAccessError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl KeyringAccessError {
    fn inner(&self) -> &keyring::Error {
        match self {
            KeyringAccessError::Recoverable(err) | KeyringAccessError::Permanent(err) => err,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeyringAccessError::Recoverable(_))
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyringAccessError::Recoverable(err) => write!(
                f,
                "System keyring is unavailable ({err}); set {API_KEY_ENV} to skip it"
            ),
            KeyringAccessError::Permanent(err) => write!(
                f,
                "Could not access the Gemini API key in the keyring: {err}"
            ),
        }
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_outages_are_recoverable() {
        let err: KeyringAccessError =
            keyring::Error::PlatformFailure("locked".to_string().into()).into();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("set GEMINI_API_KEY"));
    }

    #[test]
    fn other_failures_are_permanent() {
        let err: KeyringAccessError = keyring::Error::NoEntry.into();
        assert!(!err.is_recoverable());
        assert!(err.source().is_some());
        assert!(err
            .to_string()
            .starts_with("Could not access the Gemini API key in the keyring: "));
    }
}
