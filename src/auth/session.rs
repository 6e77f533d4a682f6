// Persisted session state
//
// Owns every read and write of the session record and its flags. Holds two
// stores: the persistent one (record, legacy token, flags) and a transient
// one for per-process markers.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::events::{SessionEvent, SessionEvents};
use crate::auth::models::{RoleInfo, SessionRecord};
use crate::store::{keys, KeyValueStore, MemoryStore, StorageResult};

const TRUE: &str = "true";
const FALSE: &str = "false";

/// Shared handle on the persisted session
///
/// Clones share the same stores and event channel. There is no locking
/// beyond what each store does internally; the last write wins.
#[derive(Clone)]
pub struct Session {
    persistent: Arc<dyn KeyValueStore>,
    transient: Arc<dyn KeyValueStore>,
    events: SessionEvents,
}

impl Session {
    pub fn new(persistent: Arc<dyn KeyValueStore>, transient: Arc<dyn KeyValueStore>) -> Self {
        Self {
            persistent,
            transient,
            events: SessionEvents::new(),
        }
    }

    /// Session over fresh in-memory stores
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Current session record
    ///
    /// Missing, malformed or token-less records read as `None`; a malformed
    /// record is removed. Whenever no valid record is found, a stale
    /// authentication flag is reset. Never fails.
    pub fn current(&self) -> Option<SessionRecord> {
        let raw = match self.persistent.get(keys::SESSION_RECORD) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Could not read session record: {}", err);
                return None;
            }
        };

        let record = raw.and_then(|raw| match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) if !record.access_token.is_empty() => Some(record),
            Ok(_) => {
                warn!("Discarding session record without an access token");
                self.discard_record();
                None
            }
            Err(err) => {
                warn!("Discarding malformed session record: {}", err);
                self.discard_record();
                None
            }
        });

        if record.is_none() {
            self.reset_stale_flag();
        }
        record
    }

    /// Access token from the record, else from the legacy key
    pub fn access_token(&self) -> Option<String> {
        if let Some(record) = self.current() {
            return Some(record.access_token);
        }

        match self.persistent.get(keys::LEGACY_ACCESS_TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                warn!("Could not read legacy access token: {}", err);
                None
            }
        }
    }

    pub fn role(&self) -> Option<RoleInfo> {
        self.current().map(|record| record.role)
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.current()
            .map(|record| record.has_permission(code))
            .unwrap_or(false)
    }

    pub fn has_role(&self, code: &str) -> bool {
        self.current()
            .map(|record| record.has_role(code))
            .unwrap_or(false)
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Persist a fresh login: record, legacy token, authentication flag
    ///
    /// Also clears a pending unauthorized flag, since the user just proved
    /// their credentials again. If any write fails, whatever was already
    /// written is cleared again so no half-stored session stays usable.
    pub fn store_login(&self, record: &SessionRecord) -> StorageResult<()> {
        let raw = serde_json::to_string(record)?;
        if let Err(err) = self.write_login(&raw, &record.access_token) {
            warn!("Could not store session, rolling back: {}", err);
            if let Err(rollback) = self.clear_credentials() {
                warn!("Could not roll back partial session: {}", rollback);
            }
            return Err(err);
        }
        debug!("Stored session for {}", record.user.email);
        Ok(())
    }

    fn write_login(&self, raw: &str, token: &str) -> StorageResult<()> {
        self.persistent.set(keys::SESSION_RECORD, raw)?;
        self.persistent.set(keys::LEGACY_ACCESS_TOKEN, token)?;
        self.persistent.set(keys::IS_AUTHENTICATED, TRUE)?;
        self.persistent.remove(keys::UNAUTHORIZED)
    }

    /// Remove the record and legacy token and drop the authentication flag
    pub fn clear_credentials(&self) -> StorageResult<()> {
        self.persistent.remove(keys::SESSION_RECORD)?;
        self.persistent.remove(keys::LEGACY_ACCESS_TOKEN)?;
        self.persistent.set(keys::IS_AUTHENTICATED, FALSE)?;
        Ok(())
    }

    /// Normal logout path: clear credentials and flags, arm the transition marker
    pub fn end(&self) -> StorageResult<()> {
        self.clear_credentials()?;
        self.persistent.remove(keys::UNAUTHORIZED)?;
        self.transient.set(keys::SHOW_LOGOUT_TRANSITION, TRUE)?;
        Ok(())
    }

    /// Fallback logout path: wipe both stores entirely
    pub fn wipe(&self) -> StorageResult<()> {
        let persistent = self.persistent.clear();
        let transient = self.transient.clear();
        persistent.and(transient)
    }

    /// Record why logout had to fall back to wiping storage
    pub fn record_security_error(&self, message: &str) -> StorageResult<()> {
        self.transient.set(keys::SECURITY_ERROR, TRUE)?;
        self.transient.set(keys::SECURITY_ERROR_MESSAGE, message)?;
        Ok(())
    }

    pub fn security_error(&self) -> Option<String> {
        if !self.flag(&*self.transient, keys::SECURITY_ERROR) {
            return None;
        }
        Some(
            self.transient
                .get(keys::SECURITY_ERROR_MESSAGE)
                .ok()
                .flatten()
                .unwrap_or_else(|| "Unknown error".to_string()),
        )
    }

    /// React to a 401: drop credentials, raise the flag, notify subscribers
    ///
    /// The event is emitted even when the store fails.
    pub fn mark_unauthorized(&self) {
        if let Err(err) = self.clear_credentials() {
            warn!("Could not clear credentials after 401: {}", err);
        }
        if let Err(err) = self.persistent.set(keys::UNAUTHORIZED, TRUE) {
            warn!("Could not set unauthorized flag: {}", err);
        }
        self.events.emit(SessionEvent::Unauthorized);
    }

    pub fn is_unauthorized(&self) -> bool {
        self.flag(&*self.persistent, keys::UNAUTHORIZED)
    }

    pub fn acknowledge_unauthorized(&self) -> StorageResult<()> {
        self.persistent.remove(keys::UNAUTHORIZED)
    }

    /// Read and consume the one-shot logout transition marker
    pub fn take_logout_transition(&self) -> bool {
        let armed = self.flag(&*self.transient, keys::SHOW_LOGOUT_TRANSITION);
        if armed {
            if let Err(err) = self.transient.remove(keys::SHOW_LOGOUT_TRANSITION) {
                warn!("Could not consume logout transition marker: {}", err);
            }
        }
        armed
    }

    fn flag(&self, store: &dyn KeyValueStore, key: &str) -> bool {
        match store.get(key) {
            Ok(Some(raw)) => serde_json::from_str::<bool>(&raw).unwrap_or(false),
            Ok(None) => false,
            Err(err) => {
                warn!("Could not read flag {}: {}", key, err);
                false
            }
        }
    }

    fn discard_record(&self) {
        if let Err(err) = self.persistent.remove(keys::SESSION_RECORD) {
            warn!("Could not remove session record: {}", err);
        }
    }

    fn reset_stale_flag(&self) {
        if self.flag(&*self.persistent, keys::IS_AUTHENTICATED) {
            warn!("Authentication flag set without a valid session record; resetting it");
            if let Err(err) = self.persistent.set(keys::IS_AUTHENTICATED, FALSE) {
                warn!("Could not reset authentication flag: {}", err);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::models::UserInfo;
    use crate::store::StorageError;
    use proptest::prelude::*;

    /// Store whose every operation fails, for exercising error paths
    pub(crate) struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable("blocked".to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("blocked".to_string()))
        }
        fn remove(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("blocked".to_string()))
        }
        fn clear(&self) -> StorageResult<()> {
            Err(StorageError::Unavailable("blocked".to_string()))
        }
    }

    /// Memory store that refuses writes to one key
    struct RejectingKeyStore {
        inner: MemoryStore,
        rejected: &'static str,
    }

    impl KeyValueStore for RejectingKeyStore {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if key == self.rejected {
                return Err(StorageError::Unavailable("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> StorageResult<()> {
            self.inner.remove(key)
        }
        fn clear(&self) -> StorageResult<()> {
            self.inner.clear()
        }
    }

    pub(crate) fn sample_record(token: &str, permissions: &[&str]) -> SessionRecord {
        SessionRecord {
            access_token: token.to_string(),
            role: RoleInfo {
                code: "ADMIN".to_string(),
                name: "Admin".to_string(),
            },
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            user: UserInfo {
                id: Some(1),
                email: "a@x.com".to_string(),
                name: "a".to_string(),
            },
        }
    }

    fn session_with(persistent: Arc<MemoryStore>) -> Session {
        Session::new(persistent, Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_store_login_then_read_back() {
        let session = Session::in_memory();
        let record = sample_record("tok123", &["STUDENT_CREATE"]);
        session.store_login(&record).unwrap();

        assert_eq!(session.current(), Some(record));
        assert_eq!(session.access_token().as_deref(), Some("tok123"));
        assert!(session.is_authenticated());
        assert!(session.has_permission("STUDENT_CREATE"));
        assert!(!session.has_permission("STUDENT_DELETE"));
        assert!(session.has_role("ADMIN"));
    }

    #[test]
    fn test_no_session_means_no_permissions() {
        let session = Session::in_memory();
        assert_eq!(session.current(), None);
        assert!(!session.is_authenticated());
        assert!(!session.has_permission("STUDENT_CREATE"));
        assert_eq!(session.role(), None);
    }

    #[test]
    fn test_legacy_token_fallback() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::LEGACY_ACCESS_TOKEN, "legacy").unwrap();
        let session = session_with(store.clone());

        assert_eq!(session.current(), None);
        assert_eq!(session.access_token().as_deref(), Some("legacy"));
        assert!(session.is_authenticated());

        store.set(keys::LEGACY_ACCESS_TOKEN, "").unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_malformed_record_is_discarded_and_flag_reset() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::SESSION_RECORD, "{not json").unwrap();
        store.set(keys::IS_AUTHENTICATED, "true").unwrap();
        let session = session_with(store.clone());

        assert_eq!(session.current(), None);
        assert_eq!(store.get(keys::SESSION_RECORD).unwrap(), None);
        assert_eq!(store.get(keys::IS_AUTHENTICATED).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_flag_without_record_is_repaired() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::IS_AUTHENTICATED, "true").unwrap();
        let session = session_with(store.clone());

        assert!(!session.is_authenticated());
        assert_eq!(store.get(keys::IS_AUTHENTICATED).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_record_with_empty_token_counts_as_logged_out() {
        let store = Arc::new(MemoryStore::new());
        let record = sample_record("", &["X"]);
        store
            .set(keys::SESSION_RECORD, &serde_json::to_string(&record).unwrap())
            .unwrap();
        store.set(keys::IS_AUTHENTICATED, "true").unwrap();
        let session = session_with(store.clone());

        assert_eq!(session.current(), None);
        assert!(!session.has_permission("X"));
        assert_eq!(store.get(keys::IS_AUTHENTICATED).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_unreadable_store_reads_as_logged_out() {
        let session = Session::new(Arc::new(FailingStore), Arc::new(FailingStore));
        assert_eq!(session.current(), None);
        assert!(!session.is_authenticated());
        assert!(!session.is_unauthorized());
        assert!(!session.take_logout_transition());
    }

    #[test]
    fn test_failed_login_write_leaves_no_session() {
        let persistent = Arc::new(RejectingKeyStore {
            inner: MemoryStore::new(),
            rejected: keys::LEGACY_ACCESS_TOKEN,
        });
        let session = Session::new(persistent.clone(), Arc::new(MemoryStore::new()));

        assert!(session
            .store_login(&sample_record("tok", &["STUDENT_CREATE"]))
            .is_err());

        assert_eq!(session.current(), None);
        assert!(!session.is_authenticated());
        assert!(!session.has_permission("STUDENT_CREATE"));
        assert_eq!(persistent.get(keys::SESSION_RECORD).unwrap(), None);
    }

    #[test]
    fn test_mark_unauthorized_clears_and_notifies_once() {
        let session = Session::in_memory();
        session.store_login(&sample_record("tok", &[])).unwrap();
        let mut events = session.events().subscribe();

        session.mark_unauthorized();

        assert!(!session.is_authenticated());
        assert!(session.is_unauthorized());
        assert_eq!(events.try_recv().unwrap(), SessionEvent::Unauthorized);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_mark_unauthorized_still_notifies_when_store_fails() {
        let session = Session::new(Arc::new(FailingStore), Arc::new(MemoryStore::new()));
        let mut events = session.events().subscribe();

        session.mark_unauthorized();
        assert_eq!(events.try_recv().unwrap(), SessionEvent::Unauthorized);
    }

    #[test]
    fn test_login_clears_unauthorized_flag() {
        let session = Session::in_memory();
        session.mark_unauthorized();
        assert!(session.is_unauthorized());

        session.store_login(&sample_record("tok", &[])).unwrap();
        assert!(!session.is_unauthorized());
    }

    #[test]
    fn test_logout_transition_is_one_shot() {
        let session = Session::in_memory();
        session.store_login(&sample_record("tok", &[])).unwrap();
        session.end().unwrap();

        assert_eq!(session.current(), None);
        assert!(session.take_logout_transition());
        assert!(!session.take_logout_transition());
    }

    #[test]
    fn test_security_error_roundtrip() {
        let session = Session::in_memory();
        assert_eq!(session.security_error(), None);

        session.record_security_error("blocked").unwrap();
        assert_eq!(session.security_error().as_deref(), Some("blocked"));
    }

    proptest! {
        #[test]
        fn prop_has_permission_is_membership(
            permissions in proptest::collection::vec("[A-Z_]{3,12}", 0..8),
            probe in "[A-Z_]{3,12}"
        ) {
            let session = Session::in_memory();
            let refs: Vec<&str> = permissions.iter().map(String::as_str).collect();
            session.store_login(&sample_record("tok", &refs))?;

            prop_assert_eq!(session.has_permission(&probe), permissions.contains(&probe));
            for permission in &permissions {
                prop_assert!(session.has_permission(permission));
            }
        }
    }
}
