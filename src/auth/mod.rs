//! API key resolution and storage.
//!
//! The `GEMINI_API_KEY` environment variable takes precedence; otherwise the
//! key is read from the platform keyring where `gemchat auth` stored it.

use crate::core::constants::API_KEY_ENV;
use crate::core::keyring::KeyringAccessError;
use keyring::Entry;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use tracing::debug;

mod ui;

use self::ui::{prompt_api_key, prompt_confirmation, ConfirmationChoice, UiError};

const KEYRING_SERVICE: &str = "gemchat";
const KEYRING_USER: &str = "gemini-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    Keyring,
}

impl fmt::Display for ApiKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKeySource::Environment => write!(f, "{API_KEY_ENV} environment variable"),
            ApiKeySource::Keyring => write!(f, "system keyring"),
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    /// No key in the environment or the keyring.
    Missing,
    /// Keyring access was turned off for this manager.
    KeyringDisabled,
    Keyring(KeyringAccessError),
    Prompt(UiError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Missing => write!(
                f,
                "No API key found. Set {API_KEY_ENV} or run 'gemchat auth' to store one."
            ),
            AuthError::KeyringDisabled => write!(f, "Keyring access is disabled"),
            AuthError::Keyring(err) => write!(f, "{err}"),
            AuthError::Prompt(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for AuthError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AuthError::Keyring(err) => Some(err),
            AuthError::Prompt(err) => Some(err),
            _ => None,
        }
    }
}

impl From<keyring::Error> for AuthError {
    fn from(err: keyring::Error) -> Self {
        AuthError::Keyring(err.into())
    }
}

impl From<UiError> for AuthError {
    fn from(err: UiError) -> Self {
        AuthError::Prompt(err)
    }
}

pub struct AuthManager {
    use_keyring: bool,
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthManager {
    pub fn new() -> Self {
        Self::new_with_keyring(true)
    }

    /// Construct an AuthManager, optionally disabling keyring access (useful for tests)
    pub fn new_with_keyring(use_keyring: bool) -> Self {
        Self { use_keyring }
    }

    pub fn resolve_api_key(&self) -> Result<(String, ApiKeySource), AuthError> {
        self.resolve_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_with_env(
        &self,
        env_value: Option<String>,
    ) -> Result<(String, ApiKeySource), AuthError> {
        if let Some(key) = env_value
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            debug!("using API key from environment");
            return Ok((key, ApiKeySource::Environment));
        }

        if !self.use_keyring {
            return Err(AuthError::Missing);
        }

        match self.entry()?.get_password() {
            Ok(key) => {
                debug!("using API key from keyring");
                Ok((key, ApiKeySource::Keyring))
            }
            Err(keyring::Error::NoEntry) => Err(AuthError::Missing),
            Err(err) => Err(err.into()),
        }
    }

    pub fn store_api_key(&self, key: &str) -> Result<(), AuthError> {
        if !self.use_keyring {
            return Err(AuthError::KeyringDisabled);
        }
        self.entry()?.set_password(key.trim())?;
        Ok(())
    }

    /// Returns `false` when there was no stored key.
    pub fn remove_api_key(&self) -> Result<bool, AuthError> {
        if !self.use_keyring {
            return Err(AuthError::KeyringDisabled);
        }
        match self.entry()?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn entry(&self) -> Result<Entry, AuthError> {
        Ok(Entry::new(KEYRING_SERVICE, KEYRING_USER)?)
    }

    pub fn interactive_auth(&self) -> Result<(), AuthError> {
        println!("🔐 Gemchat Authentication");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("Create a key at https://aistudio.google.com/apikey if you don't have one.");
        println!();

        let stdin = io::stdin();
        let key = prompt_api_key(&mut stdin.lock(), &mut io::stdout())?;
        self.store_api_key(&key)?;
        println!("✅ API key stored in the system keyring");
        Ok(())
    }

    pub fn interactive_deauth(&self) -> Result<(), AuthError> {
        let stdin = io::stdin();
        let choice = prompt_confirmation(
            "Remove the stored Gemini API key?",
            &mut stdin.lock(),
            &mut io::stdout(),
        )?;
        if choice == ConfirmationChoice::No {
            println!("Nothing removed.");
            return Ok(());
        }

        if self.remove_api_key()? {
            println!("✅ API key removed from the system keyring");
        } else {
            println!("No stored API key found.");
        }
        Ok(())
    }
}
