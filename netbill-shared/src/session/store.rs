use std::{cell::RefCell, fmt, rc::Rc};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::state::{self, Session};
use super::storage::{MemoryStorage, SessionStorage};
use crate::config::{DEFAULT_SESSION_KEY, SessionConfig};
use crate::models::{DEFAULT_ROLE, SessionUser};

type Listener = Rc<dyn Fn(&Session)>;

/// Raised when the store is mid-mutation and cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session store is busy and cannot be read")]
pub struct SessionUnavailable;

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

/// How a [`SessionStore`] persists and normalizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Storage key for the persisted session.
    pub storage_key: String,
    /// Role used when the user carries none.
    pub default_role: String,
    /// Whether `set_auth(None, ..)` still authenticates.
    pub null_user_is_authenticated: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_SESSION_KEY.to_string(),
            default_role: DEFAULT_ROLE.to_string(),
            null_user_is_authenticated: true,
        }
    }
}

impl From<&SessionConfig> for StoreOptions {
    fn from(config: &SessionConfig) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            default_role: config.default_role.clone(),
            null_user_is_authenticated: config.null_user_is_authenticated,
        }
    }
}

struct StoreInner {
    session: Session,
    storage: Box<dyn SessionStorage>,
    options: StoreOptions,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_listener: usize,
}

impl StoreInner {
    fn persist(&self) {
        let encoded = match state::encode(&self.session) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, "failed to encode session");
                return;
            }
        };
        if let Err(err) = self.storage.save(&self.options.storage_key, &encoded) {
            warn!(
                key = %self.options.storage_key,
                error = %err,
                "failed to persist session"
            );
        }
    }
}

/// Shared, single-threaded handle to the current session.
///
/// Clones point at the same state. Every mutation is written to storage before
/// it returns; listeners run afterwards with the new snapshot.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("SessionStore")
                .field("storage_key", &inner.options.storage_key)
                .field("is_authenticated", &inner.session.is_authenticated)
                .field("listeners", &inner.listeners.len())
                .finish(),
            Err(_) => f.write_str("SessionStore { <busy> }"),
        }
    }
}

impl SessionStore {
    /// Open a store over `storage`, rehydrating the persisted session.
    ///
    /// A missing, unreadable or undecodable entry yields the signed-out
    /// default.
    pub fn open(storage: impl SessionStorage + 'static, options: StoreOptions) -> Self {
        let session = match storage.load(&options.storage_key) {
            Ok(Some(raw)) => state::decode(&raw).unwrap_or_else(|err| {
                warn!(key = %options.storage_key, error = %err, "discarding persisted session");
                if let Err(err) = storage.remove(&options.storage_key) {
                    warn!(key = %options.storage_key, error = %err, "failed to drop persisted session");
                }
                Session::default()
            }),
            Ok(None) => Session::default(),
            Err(err) => {
                warn!(key = %options.storage_key, error = %err, "session storage unreadable");
                Session::default()
            }
        };
        debug!(
            key = %options.storage_key,
            authenticated = session.is_authenticated,
            "session rehydrated"
        );

        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                session,
                storage: Box::new(storage),
                options,
                listeners: Vec::new(),
                next_listener: 0,
            })),
        }
    }

    /// A store backed by fresh in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new(), StoreOptions::default())
    }

    /// Current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.borrow().session.clone()
    }

    /// Current session, or [`SessionUnavailable`] if the store is mid-mutation.
    ///
    /// # Errors
    /// Fails only while a mutation holds the store.
    pub fn try_snapshot(&self) -> Result<Session, SessionUnavailable> {
        self.inner
            .try_borrow()
            .map(|inner| inner.session.clone())
            .map_err(|_| SessionUnavailable)
    }

    /// Current bearer token without cloning the rest of the session.
    ///
    /// # Errors
    /// Fails only while a mutation holds the store.
    pub fn token(&self) -> Result<Option<String>, SessionUnavailable> {
        self.inner
            .try_borrow()
            .map(|inner| inner.session.token.clone())
            .map_err(|_| SessionUnavailable)
    }

    /// Whether a sign-in is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.borrow().session.is_authenticated
    }

    /// Record a successful sign-in.
    ///
    /// The user is normalized (role resolved, permissions defaulted). The
    /// session becomes authenticated even for a null user unless the store
    /// options say otherwise.
    pub fn set_auth(&self, user: Option<SessionUser>, token: Option<String>) {
        self.commit("set_auth", move |session, options| {
            session.user = user.map(|user| user.normalized(&options.default_role));
            session.token = token;
            session.is_authenticated =
                session.user.is_some() || options.null_user_is_authenticated;
        });
    }

    /// Clear the session.
    pub fn logout(&self) {
        self.commit("logout", |session, _| {
            *session = Session::default();
        });
    }

    /// Shallow-merge `partial` onto the current user, starting from an empty
    /// user when none is signed in. Token and authentication flag are untouched.
    pub fn update_user(&self, partial: Map<String, Value>) {
        self.commit("update_user", move |session, _| {
            let mut user = session.user.take().unwrap_or_default();
            user.merge(partial);
            session.user = Some(user);
        });
    }

    /// Register a listener called after every mutation.
    pub fn subscribe(&self, listener: impl Fn(&Session) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .borrow_mut()
            .listeners
            .retain(|(listener_id, _)| *listener_id != id);
    }

    fn commit(&self, action: &'static str, mutate: impl FnOnce(&mut Session, &StoreOptions)) {
        let (snapshot, listeners) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            mutate(&mut inner.session, &inner.options);
            inner.persist();
            let listeners: Vec<Listener> = inner
                .listeners
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect();
            (inner.session.clone(), listeners)
        };

        debug!(
            action,
            authenticated = snapshot.is_authenticated,
            has_user = snapshot.user.is_some(),
            "session updated"
        );
        for listener in listeners {
            listener(&snapshot);
        }
    }

    #[cfg(test)]
    pub(crate) fn hold_for_test(&self) -> std::cell::RefMut<'_, impl Sized> {
        self.inner.borrow_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StorageError;
    use serde_json::json;
    use std::cell::Cell;

    fn user(value: Value) -> SessionUser {
        SessionUser::from_value(value).expect("object")
    }

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn reopen(storage: &MemoryStorage) -> SessionStore {
        SessionStore::open(storage.clone(), StoreOptions::default())
    }

    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }
    }

    #[test]
    fn test_fresh_store_is_signed_out() {
        let store = SessionStore::in_memory();
        assert_eq!(store.snapshot(), Session::default());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_set_auth_normalizes_roles() {
        let store = SessionStore::in_memory();

        store.set_auth(Some(user(json!({"roles": [{"name": "Admin"}]}))), Some("t".into()));
        let session = store.snapshot();
        let signed_in = session.user.expect("user");
        assert_eq!(signed_in.role(), Some("Admin"));
        assert_eq!(session.token.as_deref(), Some("t"));
        assert!(session.is_authenticated);

        store.set_auth(Some(SessionUser::new()), Some("t".into()));
        let signed_in = store.snapshot().user.expect("user");
        assert_eq!(signed_in.role(), Some("User"));
        assert_eq!(signed_in.get("permissions"), Some(&json!([])));
    }

    #[test]
    fn test_set_auth_with_null_user_still_authenticates_by_default() {
        let store = SessionStore::in_memory();
        store.set_auth(None, Some("t".into()));

        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert!(session.user.is_none());
    }

    #[test]
    fn test_null_user_policy_can_be_tightened() {
        let options = StoreOptions {
            null_user_is_authenticated: false,
            ..StoreOptions::default()
        };
        let store = SessionStore::open(MemoryStorage::new(), options);

        store.set_auth(None, Some("t".into()));

        assert!(!store.is_authenticated());
        assert_eq!(store.token().expect("readable").as_deref(), Some("t"));
    }

    #[test]
    fn test_logout_is_absorbing() {
        let store = SessionStore::in_memory();
        store.set_auth(Some(user(json!({"id": 1, "role": "superuser"}))), Some("abc".into()));
        store.update_user(fields(json!({"phone": "555"})));

        store.logout();
        assert_eq!(store.snapshot(), Session::default());

        store.logout();
        assert_eq!(store.snapshot(), Session::default());
    }

    #[test]
    fn test_update_user_merges_shallowly() {
        let store = SessionStore::in_memory();
        store.set_auth(Some(user(json!({"a": 1, "b": 2}))), Some("t".into()));

        store.update_user(fields(json!({"b": 3, "c": 4})));

        let merged = store.snapshot().user.expect("user");
        assert_eq!(merged.get("a"), Some(&json!(1)));
        assert_eq!(merged.get("b"), Some(&json!(3)));
        assert_eq!(merged.get("c"), Some(&json!(4)));
        assert_eq!(merged.role(), Some("User"));
        assert_eq!(store.snapshot().token.as_deref(), Some("t"));
    }

    #[test]
    fn test_update_user_without_user_starts_from_empty() {
        let store = SessionStore::in_memory();

        store.update_user(fields(json!({"name": "Ada"})));

        let session = store.snapshot();
        assert_eq!(
            Value::Object(session.user.expect("user").into_fields()),
            json!({"name": "Ada"})
        );
        assert!(!session.is_authenticated);
        assert_eq!(session.token, None);
    }

    #[test]
    fn test_every_mutation_round_trips_through_storage() {
        let storage = MemoryStorage::new();
        let store = reopen(&storage);

        store.set_auth(
            Some(user(json!({"id": 3, "roles": [{"name": "Support"}], "permissions": ["view_tickets"]}))),
            Some("tok-3".into()),
        );
        assert_eq!(reopen(&storage).snapshot(), store.snapshot());

        store.update_user(fields(json!({"avatar": null, "branch": "West"})));
        assert_eq!(reopen(&storage).snapshot(), store.snapshot());

        store.logout();
        assert_eq!(reopen(&storage).snapshot(), store.snapshot());
    }

    #[test]
    fn test_persisted_under_configured_key() {
        let storage = MemoryStorage::new();
        let options = StoreOptions {
            storage_key: "netbill-auth-test".to_string(),
            ..StoreOptions::default()
        };
        let store = SessionStore::open(storage.clone(), options);

        store.set_auth(None, Some("t".into()));

        assert!(storage.raw("netbill-auth-test").is_some());
        assert!(storage.raw("netbill-auth").is_none());
    }

    #[test]
    fn test_corrupt_entry_rehydrates_to_default() {
        let storage = MemoryStorage::new();
        storage.save("netbill-auth", "{\"state\": 12").expect("save");

        assert_eq!(reopen(&storage).snapshot(), Session::default());
        assert_eq!(storage.raw("netbill-auth"), None);
    }

    #[test]
    fn test_storage_failures_do_not_fail_mutations() {
        let store = SessionStore::open(BrokenStorage, StoreOptions::default());

        store.set_auth(Some(SessionUser::new()), Some("t".into()));

        assert!(store.is_authenticated());
    }

    #[test]
    fn test_listeners_observe_each_mutation() {
        let store = SessionStore::in_memory();
        let calls = Rc::new(Cell::new(0));
        let last_auth = Rc::new(Cell::new(false));

        let id = {
            let calls = Rc::clone(&calls);
            let last_auth = Rc::clone(&last_auth);
            store.subscribe(move |session| {
                calls.set(calls.get() + 1);
                last_auth.set(session.is_authenticated);
            })
        };

        store.set_auth(None, Some("t".into()));
        assert_eq!(calls.get(), 1);
        assert!(last_auth.get());

        store.logout();
        assert_eq!(calls.get(), 2);
        assert!(!last_auth.get());

        store.unsubscribe(id);
        store.set_auth(None, None);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_listener_may_read_the_store() {
        let store = SessionStore::in_memory();
        let seen = Rc::new(RefCell::new(None));
        {
            let reader = store.clone();
            let seen = Rc::clone(&seen);
            store.subscribe(move |_| {
                *seen.borrow_mut() = reader.token().ok().flatten();
            });
        }

        store.set_auth(None, Some("abc".into()));

        assert_eq!(seen.borrow().as_deref(), Some("abc"));
    }

    #[test]
    fn test_reads_fail_while_store_is_held() {
        let store = SessionStore::in_memory();
        let _held = store.hold_for_test();

        assert_eq!(store.token(), Err(SessionUnavailable));
        assert_eq!(store.try_snapshot(), Err(SessionUnavailable));
    }
}
