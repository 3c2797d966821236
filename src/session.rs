// src/session.rs

//! Server-side browser sessions.
//!
//! The cookie only carries a signed session id; everything else (signed-in
//! user, active quiz attempt, pending flash messages) lives here, keyed by
//! that id. Requests of one session are not expected to race: each handler
//! takes what it needs out of the store and puts it back before returning.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use serde::Serialize;
use uuid::Uuid;

use crate::attempt::{Attempt, AttemptError};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Danger,
    Warning,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// The signed-in user of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

#[derive(Debug)]
struct SessionData {
    user: Option<SessionUser>,
    attempt: Option<Attempt>,
    flashes: Vec<Flash>,
    last_seen: Instant,
}

impl SessionData {
    fn new() -> Self {
        Self {
            user: None,
            attempt: None,
            flashes: Vec::new(),
            last_seen: Instant::now(),
        }
    }
}

/// Process-wide map of session id to session data.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<Sessions>>,
}

type Sessions = HashMap<String, SessionData>;

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether `id` names a live session. Refreshes its idle timer.
    pub fn touch(&self, id: &str) -> bool {
        match self.lock().get_mut(id) {
            Some(data) => {
                data.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops sessions idle for longer than `max_idle`. Returns how many were removed.
    pub fn purge_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, data| data.last_seen.elapsed() <= max_idle);
        before - sessions.len()
    }

    /// Handle for a request that presented `id`, or no live session at all.
    ///
    /// Nothing is stored until the handle is first written to.
    pub fn session(&self, id: Option<String>) -> Session {
        Session {
            id: Arc::new(Mutex::new(id)),
            store: self.clone(),
        }
    }
}

/// Per-request handle to the caller's session, injected by the session middleware.
///
/// Reads on a session that does not exist yet return defaults. Writes open it.
/// The id may change while the request runs (first write, sign-in, logout);
/// the middleware compares it afterwards to decide on the cookie.
#[derive(Clone)]
pub struct Session {
    id: Arc<Mutex<Option<String>>>,
    store: SessionStore,
}

impl Session {
    fn current_id(&self) -> MutexGuard<'_, Option<String>> {
        self.id.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Id of the stored session, if one is open.
    pub fn id(&self) -> Option<String> {
        self.current_id().clone()
    }

    fn read<T>(&self, f: impl FnOnce(&mut SessionData) -> T) -> Option<T> {
        let id = self.current_id();
        let mut sessions = self.store.lock();
        id.as_deref().and_then(|id| sessions.get_mut(id)).map(f)
    }

    fn write<T>(&self, f: impl FnOnce(&mut SessionData) -> T) -> T {
        let mut id = self.current_id();
        let mut sessions = self.store.lock();

        let live = id.as_deref().is_some_and(|id| sessions.contains_key(id));
        if !live {
            *id = Some(Uuid::new_v4().to_string());
        }
        let key = id.clone().unwrap_or_default();

        f(sessions.entry(key).or_insert_with(SessionData::new))
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.read(|data| data.user.clone()).flatten()
    }

    /// Signs `user` in under a new session id. Whatever the old session held
    /// (pending flashes, an attempt) moves over; the old id stops resolving.
    pub fn sign_in(&self, user: SessionUser) {
        let mut id = self.current_id();
        let mut sessions = self.store.lock();

        let mut data = id
            .take()
            .and_then(|old| sessions.remove(&old))
            .unwrap_or_else(SessionData::new);
        data.user = Some(user);
        data.last_seen = Instant::now();

        let fresh = Uuid::new_v4().to_string();
        sessions.insert(fresh.clone(), data);
        *id = Some(fresh);
    }

    /// Forgets the session entirely (user, attempt, flashes).
    pub fn clear(&self) {
        let mut id = self.current_id();
        if let Some(old) = id.take() {
            self.store.lock().remove(&old);
        }
    }

    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let message = message.into();
        self.write(|data| data.flashes.push(Flash { level, message }));
    }

    pub fn take_flashes(&self) -> Vec<Flash> {
        self.read(|data| std::mem::take(&mut data.flashes))
            .unwrap_or_default()
    }

    /// Installs a new attempt, replacing any attempt already in progress.
    pub fn set_attempt(&self, attempt: Attempt) {
        self.write(|data| data.attempt = Some(attempt));
    }

    pub fn has_attempt(&self) -> bool {
        self.read(|data| data.attempt.is_some()).unwrap_or(false)
    }

    /// Removes the active attempt from the session.
    pub fn take_attempt(&self) -> Option<Attempt> {
        self.read(|data| data.attempt.take()).flatten()
    }

    /// Runs `f` against the active attempt.
    pub fn with_attempt<T>(
        &self,
        f: impl FnOnce(&mut Attempt) -> Result<T, AttemptError>,
    ) -> Result<T, AttemptError> {
        self.read(|data| match data.attempt.as_mut() {
            Some(attempt) => f(attempt),
            None => Err(AttemptError::NoActiveAttempt),
        })
        .unwrap_or(Err(AttemptError::NoActiveAttempt))
    }
}
