//! In-memory accounts, login sessions and per-user favorites.
//!
//! Passwords are stored as salted SHA-256 digests. Sessions are opaque
//! tokens that expire after [`SESSION_TTL`]. Favorites hold movie ids only;
//! callers resolve them against the title index.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use catalog::MovieId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

pub type UserId = u32;

/// How long a login stays valid
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least 6 characters")]
    WeakPassword,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authenticated")]
    NotAuthenticated,
}

/// What the API shows of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
struct User {
    profile: Profile,
    password_hash: String,
    salt: String,
    /// Newest first
    favorites: Vec<MovieId>,
}

#[derive(Debug, Clone, Copy)]
struct Session {
    user: UserId,
    started: Instant,
}

#[derive(Debug)]
pub struct UserStore {
    users: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
    sessions: HashMap<String, Session>,
    next_id: UserId,
    session_ttl: Duration,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::with_session_ttl(SESSION_TTL)
    }
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_ttl(session_ttl: Duration) -> Self {
        Self {
            users: HashMap::new(),
            by_email: HashMap::new(),
            sessions: HashMap::new(),
            next_id: 1,
            session_ttl,
        }
    }

    /// Create an account and log it in. Returns the profile and a session token.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(Profile, String), UserError> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(UserError::MissingFields);
        }
        if !is_valid_email(&email) {
            return Err(UserError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UserError::WeakPassword);
        }
        if self.by_email.contains_key(&email) {
            return Err(UserError::EmailTaken);
        }

        let id = self.next_id;
        self.next_id += 1;
        let salt = hex::encode(rand::random::<[u8; 16]>());
        let profile = Profile {
            id,
            name: name.to_string(),
            email: email.clone(),
            created_at: Utc::now(),
        };
        self.users.insert(
            id,
            User {
                profile: profile.clone(),
                password_hash: hash_password(password, &salt),
                salt,
                favorites: Vec::new(),
            },
        );
        self.by_email.insert(email, id);
        info!(user = id, "Registered user");

        let token = self.open_session(id);
        Ok((profile, token))
    }

    /// Check credentials and open a new session
    pub fn login(&mut self, email: &str, password: &str) -> Result<(Profile, String), UserError> {
        let email = normalize_email(email);
        let user = self
            .by_email
            .get(&email)
            .and_then(|id| self.users.get(id))
            .filter(|user| hash_password(password, &user.salt) == user.password_hash)
            .ok_or(UserError::InvalidCredentials)?;

        let profile = user.profile.clone();
        let token = self.open_session(profile.id);
        info!(user = profile.id, "User logged in");
        Ok((profile, token))
    }

    /// Forget a session. Unknown tokens are ignored.
    pub fn logout(&mut self, token: &str) {
        if let Some(session) = self.sessions.remove(token) {
            debug!(user = session.user, "Session closed");
        }
    }

    /// The user behind a live session token
    pub fn authenticate(&self, token: &str) -> Result<UserId, UserError> {
        self.sessions
            .get(token)
            .filter(|session| session.started.elapsed() < self.session_ttl)
            .filter(|session| self.users.contains_key(&session.user))
            .map(|session| session.user)
            .ok_or(UserError::NotAuthenticated)
    }

    pub fn profile(&self, user: UserId) -> Result<&Profile, UserError> {
        self.users
            .get(&user)
            .map(|user| &user.profile)
            .ok_or(UserError::NotAuthenticated)
    }

    /// Favorite movie ids, most recently added first
    pub fn favorites(&self, user: UserId) -> Result<&[MovieId], UserError> {
        self.users
            .get(&user)
            .map(|user| user.favorites.as_slice())
            .ok_or(UserError::NotAuthenticated)
    }

    /// Add `movie` to the favorites, or take it out if it is already there.
    /// Returns whether the movie is a favorite afterwards.
    pub fn toggle_favorite(&mut self, user: UserId, movie: MovieId) -> Result<bool, UserError> {
        let user = self.users.get_mut(&user).ok_or(UserError::NotAuthenticated)?;
        if let Some(pos) = user.favorites.iter().position(|&id| id == movie) {
            user.favorites.remove(pos);
            Ok(false)
        } else {
            user.favorites.insert(0, movie);
            Ok(true)
        }
    }

    /// Take `movie` out of the favorites. Returns false when it was not there.
    pub fn remove_favorite(&mut self, user: UserId, movie: MovieId) -> Result<bool, UserError> {
        let user = self.users.get_mut(&user).ok_or(UserError::NotAuthenticated)?;
        let before = user.favorites.len();
        user.favorites.retain(|&id| id != movie);
        Ok(user.favorites.len() != before)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn open_session(&mut self, user: UserId) -> String {
        let ttl = self.session_ttl;
        self.sessions
            .retain(|_, session| session.started.elapsed() < ttl);

        let token = uuid::Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                user,
                started: Instant::now(),
            },
        );
        token
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain` with a local part of letters, digits and `+_.-`
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && local
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "+_.-".contains(ch))
}

fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}
