//! Session management
//!
//! Process-wide, TTL-bounded mapping from an opaque session id to the
//! owning principal's id. The cookie value carried by the client is
//! `id.hex(hmac_sha256(id))`, so a forged or corrupted cookie is rejected
//! before the map is consulted. Expired entries are treated as absent on
//! lookup and removed by a periodic sweep.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "fieldops_session";

const SESSION_ID_LEN: usize = 32;
const DEV_SECRET: &str = "fieldops-dev-secret";

type HmacSha256 = Hmac<Sha256>;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Time-to-live for ordinary sessions
    pub ttl: Duration,
    /// Time-to-live when the client opts into persistent login
    pub remember_ttl: Duration,
    /// How often the background sweep removes expired entries
    pub sweep_interval: std::time::Duration,
    /// Secret for the cookie signature
    pub secret: String,
    /// Mark cookies `Secure` (TLS-only)
    pub secure_cookies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(24),
            remember_ttl: Duration::days(30),
            sweep_interval: std::time::Duration::from_secs(3600),
            secret: DEV_SECRET.to_string(),
            secure_cookies: false,
        }
    }
}

impl SessionConfig {
    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_SECRET`: cookie-signing secret; required when
    ///   `APP_ENV=production`, falls back to a development default otherwise
    /// - `SESSION_TTL_SECONDS`: ordinary session TTL (default: 86400)
    /// - `SESSION_REMEMBER_TTL_SECONDS`: persistent-login TTL (default: 2592000)
    /// - `SESSION_SWEEP_INTERVAL_SECONDS`: sweep cadence (default: 3600)
    /// - `COOKIE_SECURE`: set `Secure` on cookies (default: false)
    pub fn from_env() -> Result<Self> {
        let environment =
            std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let secret = match std::env::var("SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if environment == "production" => {
                anyhow::bail!("SESSION_SECRET must be set when APP_ENV=production")
            }
            _ => {
                warn!("SESSION_SECRET not set, using development default");
                DEV_SECRET.to_string()
            }
        };

        let ttl_seconds: i64 = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86_400);

        let remember_ttl_seconds: i64 = std::env::var("SESSION_REMEMBER_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2_592_000);

        let sweep_interval_seconds: u64 = std::env::var("SESSION_SWEEP_INTERVAL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let secure_cookies = std::env::var("COOKIE_SECURE")
            .map(|s| s == "true" || s == "1")
            .unwrap_or(false);

        Ok(Self {
            ttl: Duration::seconds(ttl_seconds),
            remember_ttl: Duration::seconds(remember_ttl_seconds),
            sweep_interval: std::time::Duration::from_secs(sweep_interval_seconds),
            secret,
            secure_cookies,
        })
    }
}

#[derive(Debug)]
struct SessionEntry {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    /// TTL chosen at creation; renewals keep using it.
    ttl: Duration,
}

/// Session manager for the in-process session store
#[derive(Clone)]
pub struct SessionManager {
    entries: Arc<Mutex<HashMap<String, SessionEntry>>>,
    config: SessionConfig,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(config: SessionConfig) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Create a new session for a user and return the signed cookie value
    ///
    /// The TTL is decided here, once: 24 hours by default, 30 days when the
    /// client asked to be remembered.
    pub async fn create_session(&self, user_id: Uuid, remember: bool) -> String {
        info!("Creating session for user: {}", user_id);

        let ttl = if remember {
            self.config.remember_ttl
        } else {
            self.config.ttl
        };

        let id = generate_session_id();
        let entry = SessionEntry {
            user_id,
            expires_at: Utc::now() + ttl,
            ttl,
        };

        self.entries.lock().await.insert(id.clone(), entry);

        let signature = self.sign(&id);
        format!("{}.{}", id, signature)
    }

    /// Resolve a cookie value to the owning principal's id
    ///
    /// Unknown, expired, and tampered-with values are all reported as
    /// `None`; the caller cannot tell why a session is invalid. A valid
    /// session is touched: its expiry slides forward by its own TTL.
    pub async fn resolve(&self, cookie_value: &str) -> Option<Uuid> {
        let id = self.verify_value(cookie_value)?;
        let mut entries = self.entries.lock().await;

        let now = Utc::now();
        match entries.get_mut(id) {
            Some(entry) if entry.expires_at > now => {
                entry.expires_at = now + entry.ttl;
                Some(entry.user_id)
            }
            Some(_) => {
                entries.remove(id);
                None
            }
            None => None,
        }
    }

    /// Destroy a session (logout)
    ///
    /// Idempotent: destroying an unknown or already-destroyed session is
    /// not an error.
    pub async fn destroy(&self, cookie_value: &str) {
        if let Some(id) = self.verify_value(cookie_value) {
            if let Some(entry) = self.entries.lock().await.remove(id) {
                info!("Destroyed session for user: {}", entry.user_id);
            }
        }
    }

    /// Remove expired entries from the store
    pub async fn prune_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        let now = Utc::now();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Spawn the background sweep task
    pub fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(manager.config.sweep_interval).await;
                let removed = manager.prune_expired().await;
                if removed > 0 {
                    info!("Removed {} expired sessions", removed);
                }
            }
        })
    }

    /// Build the `Set-Cookie` header value for a freshly created session
    pub fn set_cookie_header(&self, cookie_value: &str, remember: bool) -> String {
        let ttl = if remember {
            self.config.remember_ttl
        } else {
            self.config.ttl
        };
        format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
            SESSION_COOKIE,
            cookie_value,
            ttl.num_seconds(),
            if self.config.secure_cookies {
                "; Secure"
            } else {
                ""
            }
        )
    }

    /// Build the `Set-Cookie` header value that clears the session cookie
    pub fn clear_cookie_header(&self) -> String {
        format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT{}",
            SESSION_COOKIE,
            if self.config.secure_cookies {
                "; Secure"
            } else {
                ""
            }
        )
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.config.secret.as_bytes())
            .expect("HMAC accepts keys of any length")
    }

    fn sign(&self, id: &str) -> String {
        let mut mac = self.mac();
        mac.update(id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check the cookie signature and return the inner session id
    fn verify_value<'a>(&self, cookie_value: &'a str) -> Option<&'a str> {
        let (id, signature_hex) = cookie_value.split_once('.')?;
        let signature = hex::decode(signature_hex).ok()?;
        let mut mac = self.mac();
        mac.update(id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(id)
    }
}

fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}
