// ABOUTME: Credential resolution for SSH connection attempts.
// ABOUTME: Picks password or key material from explicit inputs, env defaults, and fallbacks.

use crate::config::Settings;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fallback key location when neither an explicit path nor the environment
/// default is set.
const FALLBACK_KEY_PATH: &str = "~/.ssh/id_rsa";

/// Authentication material for a single connection attempt.
///
/// Exactly one variant is active per attempt; a supplied password always wins
/// over key inputs. Key material must be passphrase-free - encrypted keys are
/// rejected when the transport decodes them, never prompted for.
#[derive(Clone)]
pub enum Credential {
    Password(String),
    /// Raw contents of a private key file.
    Key(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Password(_) => f.write_str("Credential::Password(<redacted>)"),
            Credential::Key(_) => f.write_str("Credential::Key(<redacted>)"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("private key not found: {0}")]
    KeyNotFound(PathBuf),

    #[error("failed to read private key {path}: {reason}")]
    KeyUnreadable { path: PathBuf, reason: String },

    #[error("cannot expand '~' in {0}: home directory unknown")]
    HomeRequired(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Resolve the credential for a connection attempt.
///
/// Resolution is deterministic for a given set of inputs and filesystem
/// state: password if supplied, otherwise the first of explicit path,
/// `SSH_PRIVATE_KEY_PATH`, and `~/.ssh/id_rsa` is read from disk.
pub fn resolve(
    password: Option<&str>,
    key_path: Option<&Path>,
    settings: &Settings,
) -> Result<Credential> {
    if let Some(password) = password {
        return Ok(Credential::Password(password.to_string()));
    }

    let path = key_path
        .map(Path::to_path_buf)
        .or_else(|| settings.key_path.clone())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_KEY_PATH));
    let path = expand_home(&path, settings)?;

    if !path.exists() {
        return Err(Error::KeyNotFound(path));
    }

    let material = std::fs::read_to_string(&path).map_err(|e| Error::KeyUnreadable {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Credential::Key(material))
}

/// Expand a leading `~` component using the home directory from settings.
fn expand_home(path: &Path, settings: &Settings) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    let home = settings
        .home
        .as_ref()
        .ok_or_else(|| Error::HomeRequired(path.to_path_buf()))?;
    Ok(home.join(rest))
}
