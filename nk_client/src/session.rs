//! Persisted client session.
//!
//! Holds the session token between invocations together with the time each
//! email last had a passcode sent, so the resend cooldown survives restarts.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

/// Minimum gap between two passcode requests for the same email
pub const RESEND_COOLDOWN_SECS: i64 = 30;

/// On-disk session state
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    #[serde(default)]
    pub otp_sent_at: HashMap<String, DateTime<Utc>>,
}

impl Session {
    /// Load the session at `path`, or an empty one if the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Corrupt session file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let text = serde_json::to_string_pretty(self)?;
        let mut file = open_private(path)
            .with_context(|| format!("Failed to open session file {}", path.display()))?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("Failed to write session file {}", path.display()))
    }

    /// Seconds left before another passcode may be requested for `email`
    pub fn cooldown_remaining(&self, email: &str, now: DateTime<Utc>) -> Option<i64> {
        let sent_at = self.otp_sent_at.get(&cooldown_key(email))?;
        let ready_at = *sent_at + Duration::seconds(RESEND_COOLDOWN_SECS);

        if now < ready_at {
            Some((ready_at - now).num_seconds().max(1))
        } else {
            None
        }
    }

    pub fn record_otp_sent(&mut self, email: &str, now: DateTime<Utc>) {
        self.otp_sent_at.insert(cooldown_key(email), now);
    }

    /// Forget the token; cooldowns are kept
    pub fn logout(&mut self) {
        self.token = None;
    }
}

/// Default session location: `$HOME/.notekeeper/session.json`
pub fn default_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".notekeeper")
        .join("session.json")
}

/// Truncate or create `path` readable by the owner only; the token is a credential
#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

fn cooldown_key(email: &str) -> String {
    email.trim().to_lowercase()
}
