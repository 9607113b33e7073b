//! Console session: the bearer token used against our own backends
//!
//! The token arrives either once through a launch URL handed over by the login
//! system (`...?token=...`) or from the persisted token file. Storage sits behind
//! the [`TokenStore`] trait so the rest of the console never touches the
//! filesystem directly.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
#[cfg(test)]
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Fixed name the token is persisted under
pub const TOKEN_KEY: &str = "xzero_token";

/// Query parameter carrying the one-time bootstrap token
pub const TOKEN_QUERY_PARAM: &str = "token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("token storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid launch URL: {0}")]
    InvalidLaunchUrl(#[from] url::ParseError),
}

/// Persistence for the console token
pub trait TokenStore: Send + Sync + fmt::Debug {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Token stored as a plain file named [`TOKEN_KEY`]
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            path: dir.join(TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let token = fs::read_to_string(&self.path)?;
        let token = token.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.lock().map(|t| t.clone()).unwrap_or_default())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Ok(mut t) = self.token.lock() {
            *t = Some(token.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        if let Ok(mut t) = self.token.lock() {
            *t = None;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NoToken,
    Authenticated,
}

/// Where the current token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    LaunchUrl,
    Persisted,
}

/// Outcome of session bootstrap
#[derive(Debug, Clone, PartialEq)]
pub struct Bootstrap {
    pub status: SessionStatus,
    pub source: Option<TokenSource>,
    /// Launch URL with the token removed, safe to display
    pub location: Option<String>,
}

#[derive(Debug)]
struct SessionInner {
    store: Box<dyn TokenStore>,
    token: RwLock<Option<String>>,
    expired: AtomicBool,
}

/// Shared handle on the console token
///
/// Cloned into every API client; all clones observe the same token.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store: Box::new(store),
                token: RwLock::new(None),
                expired: AtomicBool::new(false),
            }),
        }
    }

    /// Resolve the token at startup
    ///
    /// A token in the launch URL is persisted and then scrubbed from the
    /// returned location. Otherwise the persisted token is used, if any.
    pub fn bootstrap(&self, launch_url: Option<&str>) -> Result<Bootstrap, SessionError> {
        let mut location = None;

        if let Some(raw) = launch_url {
            let (token, scrubbed) = scrub_token(raw)?;
            location = Some(scrubbed);

            if let Some(token) = token {
                self.inner.store.save(&token)?;
                self.set_token(Some(token));
                info!("console token received from launch URL and persisted");
                return Ok(Bootstrap {
                    status: SessionStatus::Authenticated,
                    source: Some(TokenSource::LaunchUrl),
                    location,
                });
            }
        }

        match self.inner.store.load()? {
            Some(token) => {
                self.set_token(Some(token));
                debug!("using persisted console token");
                Ok(Bootstrap {
                    status: SessionStatus::Authenticated,
                    source: Some(TokenSource::Persisted),
                    location,
                })
            }
            None => {
                info!("no console token found");
                Ok(Bootstrap {
                    status: SessionStatus::NoToken,
                    source: None,
                    location,
                })
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.inner.token.read().ok().and_then(|t| t.clone())
    }

    #[cfg(test)]
    pub fn status(&self) -> SessionStatus {
        if self.token().is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::NoToken
        }
    }

    /// Drop the token after the backend rejected it
    ///
    /// Returns true only for the call that actually performed the
    /// `Authenticated -> NoToken` transition.
    pub fn expire(&self) -> bool {
        let had_token = self.token().is_some();
        self.set_token(None);
        if let Err(e) = self.inner.store.clear() {
            warn!("failed to clear persisted token: {}", e);
        }

        let first = had_token && !self.inner.expired.swap(true, Ordering::SeqCst);
        if first {
            info!("console token rejected by backend, session expired");
        }
        first
    }

    /// Explicit sign-out
    pub fn logout(&self) -> Result<(), SessionError> {
        self.set_token(None);
        self.inner.store.clear()
    }

    fn set_token(&self, token: Option<String>) {
        if token.is_some() {
            self.inner.expired.store(false, Ordering::SeqCst);
        }
        if let Ok(mut t) = self.inner.token.write() {
            *t = token;
        }
    }
}

/// Split a launch URL into its bootstrap token and a scrubbed copy
///
/// All query pairs other than `token` are kept in their original order.
pub fn scrub_token(launch_url: &str) -> Result<(Option<String>, String), SessionError> {
    let mut url = Url::parse(launch_url)?;

    let mut token = None;
    let mut kept = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == TOKEN_QUERY_PARAM {
            if !value.is_empty() {
                token = Some(value.into_owned());
            }
        } else {
            kept.push((key.into_owned(), value.into_owned()));
        }
    }

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    Ok((token, url.to_string()))
}
