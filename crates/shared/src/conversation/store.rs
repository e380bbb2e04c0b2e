use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{Span, debug};
use uuid::Uuid;

use super::message::Message;

const DEFAULT_SHARD_COUNT: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub source_url: String,
    pub source_content: String,
    pub history: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

type Shard = RwLock<HashMap<String, Session>>;

/// In-memory conversation sessions, partitioned by a hash of the session id.
///
/// Each shard has its own lock, so work on sessions living in different
/// shards never contends. Appends to one session are serialized by its
/// shard's write lock and land in the order the lock was acquired. No I/O
/// happens while a lock is held.
#[derive(Clone)]
pub struct SessionStore {
    shards: Arc<[Shard]>,
    log: Span,
}

impl SessionStore {
    pub fn new(log: Span) -> Self {
        Self::with_shard_count(DEFAULT_SHARD_COUNT, log)
    }

    pub fn with_shard_count(shard_count: usize, log: Span) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect::<Vec<Shard>>();
        Self {
            shards: shards.into(),
            log,
        }
    }

    pub fn create(&self, source_url: &str, source_content: &str) -> Session {
        self.create_at(source_url, source_content, Utc::now())
    }

    fn create_at(&self, source_url: &str, source_content: &str, now: DateTime<Utc>) -> Session {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            source_url: source_url.to_string(),
            source_content: source_content.to_string(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.write_shard(&session.id)
            .insert(session.id.clone(), session.clone());
        debug!(parent: &self.log, session_id = %session.id, source_url, "session created");
        session
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.read_shard(id).get(id).cloned()
    }

    /// Returns `false` when the session no longer exists, e.g. because it was
    /// deleted or swept between the caller's lookup and this append.
    pub fn append_message(&self, id: &str, message: Message) -> bool {
        self.append_message_at(id, message, Utc::now())
    }

    fn append_message_at(&self, id: &str, message: Message, now: DateTime<Utc>) -> bool {
        let mut shard = self.write_shard(id);
        let Some(session) = shard.get_mut(id) else {
            return false;
        };
        session.history.push(message);
        session.updated_at = now;
        true
    }

    /// Appends `seed` only if the session has no messages yet, then returns a
    /// copy of the resulting history. Both steps happen under one write lock
    /// so a session is seeded at most once.
    pub fn seed_if_empty(&self, id: &str, seed: Vec<Message>) -> Option<Vec<Message>> {
        let mut shard = self.write_shard(id);
        let session = shard.get_mut(id)?;
        if session.history.is_empty() && !seed.is_empty() {
            session.history.extend(seed);
            session.updated_at = Utc::now();
        }
        Some(session.history.clone())
    }

    /// Independent copy of the history; later appends do not show up in it.
    pub fn history(&self, id: &str) -> Option<Vec<Message>> {
        self.read_shard(id)
            .get(id)
            .map(|session| session.history.clone())
    }

    pub fn list_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for shard in self.shards.iter() {
            ids.extend(read_lock(shard).keys().cloned());
        }
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| read_lock(shard).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn delete(&self, id: &str) -> bool {
        let removed = self.write_shard(id).remove(id).is_some();
        if removed {
            debug!(parent: &self.log, session_id = %id, "session deleted");
        }
        removed
    }

    /// Removes every session whose last update is older than `max_age` and
    /// returns how many were removed.
    pub fn sweep_expired(&self, max_age: Duration) -> usize {
        self.sweep_expired_at(Utc::now(), max_age)
    }

    fn sweep_expired_at(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|max_age| now.checked_sub_signed(max_age))
        else {
            return 0;
        };

        let mut removed = 0;
        for shard in self.shards.iter() {
            let mut sessions = write_lock(shard);
            let before = sessions.len();
            sessions.retain(|_, session| session.updated_at >= cutoff);
            removed += before - sessions.len();
        }

        if removed > 0 {
            debug!(parent: &self.log, removed, cutoff = %cutoff, "expired sessions swept");
        }
        removed
    }

    fn shard_for(&self, id: &str) -> &Shard {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    fn read_shard(&self, id: &str) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        read_lock(self.shard_for(id))
    }

    fn write_shard(&self, id: &str) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        write_lock(self.shard_for(id))
    }
}

fn read_lock(shard: &Shard) -> RwLockReadGuard<'_, HashMap<String, Session>> {
    match shard.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock(shard: &Shard) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
    match shard.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::conversation::Role;

    const RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

    fn store() -> SessionStore {
        SessionStore::new(Span::none())
    }

    #[test]
    fn create_assigns_unique_ids_and_empty_history() {
        let store = store();
        let first = store.create("https://example.com/a", "alpha");
        let second = store.create("https://example.com/a", "alpha");

        assert_ne!(first.id, second.id);
        assert!(first.history.is_empty());
        assert_eq!(first.created_at, first.updated_at);
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(&first.id).expect("session should exist").source_content,
            "alpha"
        );
    }

    #[test]
    fn append_to_unknown_session_is_a_miss() {
        let store = store();
        assert!(!store.append_message("missing", Message::user("hello")));
        assert!(store.history("missing").is_none());
    }

    #[test]
    fn append_bumps_updated_at() {
        let store = store();
        let created_at = Utc::now() - ChronoDuration::hours(1);
        let session = store.create_at("u", "c", created_at);

        assert!(store.append_message(&session.id, Message::user("hi")));

        let stored = store.get(&session.id).expect("session should exist");
        assert_eq!(stored.created_at, created_at);
        assert!(stored.updated_at > created_at);
    }

    #[test]
    fn history_is_an_independent_copy() {
        let store = store();
        let session = store.create("u", "c");
        store.append_message(&session.id, Message::user("first"));

        let snapshot = store.history(&session.id).expect("history should exist");
        store.append_message(&session.id, Message::assistant("second"));

        assert_eq!(snapshot, vec![Message::user("first")]);
        assert_eq!(store.history(&session.id).map(|history| history.len()), Some(2));
    }

    #[test]
    fn seed_if_empty_seeds_exactly_once() {
        let store = store();
        let session = store.create("u", "c");
        let seed = vec![
            Message::system("sys"),
            Message::user("content"),
            Message::assistant("ack"),
        ];

        let first = store
            .seed_if_empty(&session.id, seed.clone())
            .expect("session should exist");
        let second = store
            .seed_if_empty(&session.id, seed.clone())
            .expect("session should exist");

        assert_eq!(first, seed);
        assert_eq!(second, seed);
        assert!(store.seed_if_empty("missing", seed).is_none());
    }

    #[test]
    fn concurrent_appends_stay_isolated_and_ordered_per_session() {
        let store = SessionStore::with_shard_count(4, Span::none());
        let sessions = (0..8)
            .map(|_| store.create("u", "c").id)
            .collect::<Vec<_>>();
        const PER_SESSION: usize = 250;

        thread::scope(|scope| {
            for (index, id) in sessions.iter().enumerate() {
                let store = store.clone();
                scope.spawn(move || {
                    for n in 0..PER_SESSION {
                        assert!(store.append_message(id, Message::user(format!("s{index}-{n}"))));
                    }
                });
            }
        });

        for (index, id) in sessions.iter().enumerate() {
            let history = store.history(id).expect("history should exist");
            let expected = (0..PER_SESSION)
                .map(|n| Message::user(format!("s{index}-{n}")))
                .collect::<Vec<_>>();
            assert_eq!(history, expected, "session {index} history diverged");
        }
    }

    #[test]
    fn concurrent_appenders_on_one_session_lose_nothing() {
        let store = store();
        let id = store.create("u", "c").id;
        const WRITERS: usize = 4;
        const PER_WRITER: usize = 200;

        thread::scope(|scope| {
            for writer in 0..WRITERS {
                let store = store.clone();
                let id = id.as_str();
                scope.spawn(move || {
                    for n in 0..PER_WRITER {
                        store.append_message(id, Message::user(format!("w{writer}-{n}")));
                    }
                });
            }
        });

        let history = store.history(&id).expect("history should exist");
        assert_eq!(history.len(), WRITERS * PER_WRITER);
        for writer in 0..WRITERS {
            let prefix = format!("w{writer}-");
            let own = history
                .iter()
                .filter(|message| message.content.starts_with(&prefix))
                .map(|message| message.content.clone())
                .collect::<Vec<_>>();
            let expected = (0..PER_WRITER)
                .map(|n| format!("{prefix}{n}"))
                .collect::<Vec<_>>();
            assert_eq!(own, expected);
        }
        assert!(history.iter().all(|message| message.role == Role::User));
    }

    #[test]
    fn sweep_removes_only_sessions_idle_past_retention() {
        let store = store();
        let now = Utc::now();
        let stale = store.create_at("u", "old", now - ChronoDuration::hours(25));
        let fresh = store.create_at("u", "new", now - ChronoDuration::hours(2));
        let revived = store.create_at("u", "revived", now - ChronoDuration::hours(30));
        store.append_message_at(
            &revived.id,
            Message::user("still here"),
            now - ChronoDuration::hours(1),
        );

        let removed = store.sweep_expired_at(now, RETENTION);

        assert_eq!(removed, 1);
        assert!(store.get(&stale.id).is_none());
        assert!(!store.list_ids().contains(&stale.id));
        assert!(store.get(&fresh.id).is_some());
        assert!(store.get(&revived.id).is_some());
    }

    #[test]
    fn sweep_with_nothing_expired_reports_zero() {
        let store = store();
        store.create("u", "c");
        assert_eq!(store.sweep_expired(RETENTION), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_makes_session_unreachable() {
        let store = store();
        let session = store.create("u", "c");

        assert!(!store.delete("unknown"));
        assert!(store.delete(&session.id));
        assert!(store.get(&session.id).is_none());
        assert!(store.history(&session.id).is_none());
        assert!(!store.delete(&session.id));
        assert!(store.is_empty());
    }

    #[test]
    fn list_ids_returns_every_live_session() {
        let store = SessionStore::with_shard_count(3, Span::none());
        let mut created = (0..10)
            .map(|_| store.create("u", "c").id)
            .collect::<Vec<_>>();
        created.sort();

        assert_eq!(store.list_ids(), created);
    }
}
