//! Session state persisted to durable storage.
//!
//! [`SessionStore`] owns the access/refresh tokens, the user profile and the
//! selected voice. Every mutation writes storage first and memory second, so
//! the two never disagree on the access token or the voice. It never touches
//! the network.

use std::cell::{Cell, RefCell};

use crate::config::{DEFAULT_VOICE, storage_keys};
use crate::core::error::StorageError;
use crate::models::{Session, UserProfile};
use crate::utils::KeyValueStore;

/// Authentication and preference state mirrored to storage.
pub struct SessionStore {
    storage: Box<dyn KeyValueStore>,
    state: RefCell<Session>,
    epoch: Cell<u64>,
}

impl SessionStore {
    /// Build the session from whatever storage holds (cold start).
    ///
    /// Empty values count as absent. A profile that fails to parse is
    /// treated as absent.
    pub fn hydrate(storage: impl KeyValueStore + 'static) -> Self {
        let read = |key: &str| storage.get(key).filter(|v| !v.is_empty());

        let access_token = read(storage_keys::ACCESS_TOKEN);
        let refresh_token = read(storage_keys::REFRESH_TOKEN);

        let user_profile = read(storage_keys::USER_PROFILE).and_then(|json| {
            match serde_json::from_str::<Option<UserProfile>>(&json) {
                Ok(profile) => profile,
                Err(e) => {
                    log::warn!("Ignoring malformed stored user profile: {e}");
                    None
                }
            }
        });

        let selected_voice = storage
            .get(storage_keys::SELECTED_VOICE)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VOICE.to_string());

        let session = Session {
            access_token,
            refresh_token,
            user_profile,
            selected_voice,
        };
        log::debug!("Hydrated session (logged in: {})", session.is_logged_in());

        Self {
            storage: Box::new(storage),
            state: RefCell::new(session),
            epoch: Cell::new(0),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.borrow().refresh_token.clone()
    }

    pub fn user_profile(&self) -> Option<UserProfile> {
        self.state.borrow().user_profile.clone()
    }

    pub fn selected_voice(&self) -> String {
        self.state.borrow().selected_voice.clone()
    }

    /// Copy of the whole session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Counter bumped by every effective teardown.
    ///
    /// Session-scoped data fetched under one epoch must not be shown under
    /// another.
    pub fn epoch(&self) -> u64 {
        self.epoch.get()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Store a fresh token pair.
    ///
    /// Fails without touching memory if the access token cannot be persisted.
    /// If only the refresh token fails, the previous refresh token is kept on
    /// both sides.
    pub fn set_credentials(
        &self,
        access: impl Into<String>,
        refresh: impl Into<String>,
    ) -> Result<(), StorageError> {
        let access = access.into();
        let refresh = refresh.into();

        self.storage.set(storage_keys::ACCESS_TOKEN, &access)?;
        let refresh_saved = match self.storage.set(storage_keys::REFRESH_TOKEN, &refresh) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to persist refresh token: {e}");
                false
            }
        };

        let mut state = self.state.borrow_mut();
        state.access_token = Some(access);
        if refresh_saved {
            state.refresh_token = Some(refresh);
        }
        Ok(())
    }

    /// Store the user profile; its preferred voice, if any, replaces the
    /// current one.
    ///
    /// Either both the profile and its voice are committed or neither is.
    pub fn set_profile(&self, user: UserProfile) -> Result<(), StorageError> {
        let json = serde_json::to_string(&user)
            .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;
        let voice = user.preferred_voice().map(str::to_string);

        if let Some(voice) = &voice {
            self.storage.set(storage_keys::SELECTED_VOICE, voice)?;
        }
        if let Err(e) = self.storage.set(storage_keys::USER_PROFILE, &json) {
            if voice.is_some() {
                let previous = self.selected_voice();
                if let Err(e) = self.storage.set(storage_keys::SELECTED_VOICE, &previous) {
                    log::warn!("Failed to restore stored voice: {e}");
                }
            }
            return Err(e);
        }

        let mut state = self.state.borrow_mut();
        state.user_profile = Some(user);
        if let Some(voice) = voice {
            state.selected_voice = voice;
        }
        Ok(())
    }

    /// Change the selected voice. Works logged in or not.
    ///
    /// An empty id selects the default voice.
    pub fn set_voice(&self, voice_id: &str) -> Result<(), StorageError> {
        let voice = if voice_id.is_empty() {
            DEFAULT_VOICE
        } else {
            voice_id
        };
        self.storage.set(storage_keys::SELECTED_VOICE, voice)?;
        self.state.borrow_mut().selected_voice = voice.to_string();
        Ok(())
    }

    /// Tear the session down: clear memory and every session storage key.
    ///
    /// A key that cannot be removed is overwritten with an empty value,
    /// which hydrates as absent. Memory is cleared regardless; the error is
    /// returned only if a key could be neither removed nor blanked.
    /// Idempotent; calling it while logged out changes nothing observable.
    pub fn logout(&self) -> Result<(), StorageError> {
        let mut result = Ok(());
        for key in storage_keys::ALL {
            if let Err(e) = self.storage.remove(key) {
                log::warn!("{e}, blanking it instead");
                if let Err(e) = self.storage.set(key, "") {
                    log::error!("Session key left in storage: {e}");
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
            }
        }

        let previous = self.state.replace(Session::default());
        if previous.access_token.is_some() {
            self.bump_epoch();
            log::info!("Session cleared");
        }
        result
    }

    fn bump_epoch(&self) {
        self.epoch.set(self.epoch.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryStorage;

    fn store() -> (SessionStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        (SessionStore::hydrate(storage.clone()), storage)
    }

    fn assert_token_mirrored(session: &SessionStore, storage: &MemoryStorage) {
        assert_eq!(
            session.access_token(),
            storage.get(storage_keys::ACCESS_TOKEN)
        );
    }

    /// Memory storage that fails writes and/or removals for chosen keys.
    #[derive(Clone, Default)]
    struct FailingStorage {
        inner: MemoryStorage,
        fail_set: Vec<&'static str>,
        fail_remove: Vec<&'static str>,
    }

    impl FailingStorage {
        fn rejecting_all() -> Self {
            Self {
                fail_set: storage_keys::ALL.to_vec(),
                fail_remove: storage_keys::ALL.to_vec(),
                ..Default::default()
            }
        }
    }

    impl KeyValueStore for FailingStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_set.contains(&key) {
                return Err(StorageError::WriteFailed(key.to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            if self.fail_remove.contains(&key) {
                return Err(StorageError::RemoveFailed(key.to_string()));
            }
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_hydrate_empty_storage() {
        let (session, _) = store();
        assert_eq!(session.snapshot(), Session::default());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_hydrate_restores_persisted_state() {
        let storage = MemoryStorage::with_entries([
            (storage_keys::ACCESS_TOKEN, "acc"),
            (storage_keys::REFRESH_TOKEN, "ref"),
            (storage_keys::USER_PROFILE, r#"{"name":"reader","selected_voice":"voice2"}"#),
            (storage_keys::SELECTED_VOICE, "voice4"),
        ]);
        let session = SessionStore::hydrate(storage);

        assert!(session.is_logged_in());
        assert_eq!(session.access_token().as_deref(), Some("acc"));
        assert_eq!(session.refresh_token().as_deref(), Some("ref"));
        assert_eq!(session.user_profile().unwrap().name.as_deref(), Some("reader"));
        // stored voice reflects the last explicit choice
        assert_eq!(session.selected_voice(), "voice4");
    }

    #[test]
    fn test_hydrate_ignores_malformed_profile() {
        let storage = MemoryStorage::with_entries([
            (storage_keys::ACCESS_TOKEN, "acc"),
            (storage_keys::USER_PROFILE, "{not json"),
        ]);
        let session = SessionStore::hydrate(storage);
        assert!(session.is_logged_in());
        assert_eq!(session.user_profile(), None);
    }

    #[test]
    fn test_hydrate_null_profile() {
        let storage = MemoryStorage::with_entries([(storage_keys::USER_PROFILE, "null")]);
        assert_eq!(SessionStore::hydrate(storage).user_profile(), None);
    }

    #[test]
    fn test_credentials_mirror_storage() {
        let (session, storage) = store();

        session.set_credentials("a1", "r1").unwrap();
        assert_token_mirrored(&session, &storage);
        assert_eq!(storage.get(storage_keys::REFRESH_TOKEN).as_deref(), Some("r1"));
        assert!(session.is_logged_in());

        session.set_credentials("a2", "r2").unwrap();
        assert_token_mirrored(&session, &storage);

        session.logout().unwrap();
        assert_token_mirrored(&session, &storage);
        assert_eq!(session.access_token(), None);

        session.set_credentials("a3", "r3").unwrap();
        assert_token_mirrored(&session, &storage);
    }

    #[test]
    fn test_failed_write_leaves_memory_untouched() {
        let session = SessionStore::hydrate(FailingStorage::rejecting_all());
        let err = session.set_credentials("a", "r").unwrap_err();
        assert_eq!(err, StorageError::WriteFailed(storage_keys::ACCESS_TOKEN.to_string()));
        assert!(!session.is_logged_in());

        assert!(session.set_voice("voice2").is_err());
        assert_eq!(session.selected_voice(), DEFAULT_VOICE);
    }

    #[test]
    fn test_failed_refresh_write_keeps_previous_refresh_token() {
        let storage = FailingStorage::default();
        let session = SessionStore::hydrate(storage.clone());
        session.set_credentials("a1", "r1").unwrap();

        let flaky = FailingStorage {
            fail_set: vec![storage_keys::REFRESH_TOKEN],
            ..storage.clone()
        };
        let session = SessionStore::hydrate(flaky);
        session.set_credentials("a2", "r2").unwrap();

        assert_eq!(session.access_token().as_deref(), Some("a2"));
        assert_eq!(session.refresh_token().as_deref(), Some("r1"));
        assert_eq!(session.refresh_token(), storage.get(storage_keys::REFRESH_TOKEN));
    }

    #[test]
    fn test_logout_blanks_keys_it_cannot_remove() {
        let storage = FailingStorage {
            fail_remove: vec![storage_keys::ACCESS_TOKEN],
            ..Default::default()
        };
        let session = SessionStore::hydrate(storage.clone());
        session.set_credentials("a", "r").unwrap();

        session.logout().unwrap();

        assert!(!session.is_logged_in());
        assert_eq!(storage.get(storage_keys::ACCESS_TOKEN).as_deref(), Some(""));
        assert!(!storage.inner.contains_key(storage_keys::REFRESH_TOKEN));

        let reloaded = SessionStore::hydrate(storage);
        assert!(!reloaded.is_logged_in());
        assert_eq!(reloaded.snapshot(), Session::default());
    }

    #[test]
    fn test_logout_reports_unclearable_storage() {
        let session = SessionStore::hydrate(FailingStorage::rejecting_all());
        let err = session.logout().unwrap_err();
        assert_eq!(err, StorageError::WriteFailed(storage_keys::ACCESS_TOKEN.to_string()));
        assert_eq!(session.snapshot(), Session::default());
    }

    #[test]
    fn test_profile_write_failure_commits_nothing() {
        let storage = FailingStorage {
            fail_set: vec![storage_keys::USER_PROFILE],
            ..Default::default()
        };
        let session = SessionStore::hydrate(storage.clone());
        session.set_voice("voice4").unwrap();

        let err = session
            .set_profile(UserProfile {
                name: Some("reader".to_string()),
                selected_voice: Some("voice2".to_string()),
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(err, StorageError::WriteFailed(storage_keys::USER_PROFILE.to_string()));
        assert_eq!(session.user_profile(), None);
        assert_eq!(session.selected_voice(), "voice4");
        assert_eq!(storage.get(storage_keys::SELECTED_VOICE).as_deref(), Some("voice4"));
    }

    #[test]
    fn test_voice_write_failure_commits_nothing() {
        let storage = FailingStorage {
            fail_set: vec![storage_keys::SELECTED_VOICE],
            ..Default::default()
        };
        let session = SessionStore::hydrate(storage.clone());

        let err = session
            .set_profile(UserProfile {
                name: Some("reader".to_string()),
                selected_voice: Some("voice2".to_string()),
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(err, StorageError::WriteFailed(storage_keys::SELECTED_VOICE.to_string()));
        assert_eq!(session.user_profile(), None);
        assert_eq!(session.selected_voice(), DEFAULT_VOICE);
        assert_eq!(storage.get(storage_keys::USER_PROFILE), None);
    }

    #[test]
    fn test_logout_clears_everything() {
        let (session, storage) = store();
        session.set_credentials("a", "r").unwrap();
        session
            .set_profile(UserProfile {
                name: Some("reader".to_string()),
                selected_voice: Some("voice3".to_string()),
                ..Default::default()
            })
            .unwrap();

        session.logout().unwrap();

        assert_eq!(session.snapshot(), Session::default());
        for key in storage_keys::ALL {
            assert!(!storage.contains_key(key), "{key} should be removed");
        }
    }

    #[test]
    fn test_logout_is_idempotent() {
        let (session, storage) = store();
        session.set_credentials("a", "r").unwrap();
        session.set_voice("voice2").unwrap();

        session.logout().unwrap();
        let once = (session.snapshot(), session.epoch(), storage.len());
        session.logout().unwrap();
        let twice = (session.snapshot(), session.epoch(), storage.len());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_profile_voice_overrides_stored_voice() {
        let (session, storage) = store();
        session.set_voice("voice4").unwrap();

        session
            .set_profile(UserProfile {
                selected_voice: Some("v2".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(session.selected_voice(), "v2");
        assert_eq!(storage.get(storage_keys::SELECTED_VOICE).as_deref(), Some("v2"));
    }

    #[test]
    fn test_profile_without_voice_keeps_current_voice() {
        let (session, storage) = store();
        session.set_voice("voice3").unwrap();
        session
            .set_profile(UserProfile {
                name: Some("reader".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(session.selected_voice(), "voice3");
        let stored: UserProfile =
            serde_json::from_str(&storage.get(storage_keys::USER_PROFILE).unwrap()).unwrap();
        assert_eq!(stored.name.as_deref(), Some("reader"));
    }

    #[test]
    fn test_set_voice_while_logged_out() {
        let (session, storage) = store();
        session.set_voice("voice2").unwrap();
        assert_eq!(session.selected_voice(), "voice2");
        assert_eq!(storage.get(storage_keys::SELECTED_VOICE).as_deref(), Some("voice2"));

        session.set_voice("").unwrap();
        assert_eq!(session.selected_voice(), DEFAULT_VOICE);
    }

    #[test]
    fn test_epoch_tracks_teardown_only() {
        let (session, _) = store();
        assert_eq!(session.epoch(), 0);
        session.logout().unwrap();
        assert_eq!(session.epoch(), 0);
        session.set_credentials("a", "r").unwrap();
        assert_eq!(session.epoch(), 0);
        session.set_credentials("a2", "r2").unwrap();
        session.set_voice("voice2").unwrap();
        assert_eq!(session.epoch(), 0);
        session.logout().unwrap();
        assert_eq!(session.epoch(), 1);
        session.logout().unwrap();
        assert_eq!(session.epoch(), 1);
    }

    #[test]
    fn test_hydrate_treats_blank_values_as_absent() {
        let storage = MemoryStorage::with_entries([
            (storage_keys::ACCESS_TOKEN, ""),
            (storage_keys::REFRESH_TOKEN, ""),
            (storage_keys::USER_PROFILE, ""),
            (storage_keys::SELECTED_VOICE, ""),
        ]);
        assert_eq!(SessionStore::hydrate(storage).snapshot(), Session::default());
    }

    #[test]
    fn test_reload_sees_persisted_session() {
        let (session, storage) = store();
        session.set_credentials("a", "r").unwrap();
        session.set_voice("voice2").unwrap();

        let reloaded = SessionStore::hydrate(storage);
        assert_eq!(reloaded.snapshot(), session.snapshot());
    }
}
