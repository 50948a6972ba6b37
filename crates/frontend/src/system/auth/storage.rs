use std::rc::Rc;

use contracts::system::auth::UserInfo;

use crate::shared::config::StorageKeys;
use crate::shared::storage::{KeyValueStorage, StorageError};

/// Token and profile of the signed-in user, as left in storage by the login flow.
#[derive(Clone)]
pub struct AuthSession {
    storage: Rc<dyn KeyValueStorage>,
    token_key: String,
    user_key: String,
}

impl AuthSession {
    pub fn new(storage: Rc<dyn KeyValueStorage>, keys: &StorageKeys) -> Self {
        Self {
            storage,
            token_key: keys.access_token.clone(),
            user_key: keys.user.clone(),
        }
    }

    /// Save access token to localStorage
    pub fn save_access_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set_item(&self.token_key, token)
    }

    /// Get access token from localStorage
    pub fn access_token(&self) -> Option<String> {
        self.storage
            .get_item(&self.token_key)
            .ok()
            .flatten()
            .filter(|t| !t.is_empty())
    }

    pub fn save_user(&self, user: &UserInfo) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user)?;
        self.storage.set_item(&self.user_key, &raw)
    }

    /// Stored profile, `None` if missing or unparseable.
    pub fn current_user(&self) -> Option<UserInfo> {
        let raw = self.storage.get_item(&self.user_key).ok().flatten()?;
        match serde_json::from_str::<UserInfo>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("stored user profile is invalid: {}", e);
                None
            }
        }
    }

    /// Removes token and profile. The branch selection is left alone.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.token_key)?;
        self.storage.remove_item(&self.user_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::config;
    use crate::shared::storage::MemoryStorage;

    fn session() -> (AuthSession, MemoryStorage) {
        let storage = MemoryStorage::new();
        (
            AuthSession::new(Rc::new(storage.clone()), &config().storage),
            storage,
        )
    }

    fn staff() -> UserInfo {
        UserInfo {
            id: "u2".to_string(),
            username: "thu".to_string(),
            full_name: Some("Nguyễn Thu".to_string()),
            email: None,
            role: Some("STAFF".to_string()),
            branch_id: Some("b1".to_string()),
        }
    }

    #[test]
    fn test_token_and_user_roundtrip() {
        let (session, _) = session();
        assert!(session.access_token().is_none());
        assert!(session.current_user().is_none());

        session.save_access_token("jwt").unwrap();
        session.save_user(&staff()).unwrap();
        assert_eq!(session.access_token().as_deref(), Some("jwt"));
        assert_eq!(session.current_user(), Some(staff()));
    }

    #[test]
    fn test_corrupt_profile_reads_as_signed_out() {
        let (session, storage) = session();
        storage.set_item(&config().storage.user, "{oops").unwrap();
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_clear_keeps_branch_selection() {
        let (session, storage) = session();
        let branch_key = &config().storage.active_branch;
        storage.set_item(branch_key, "b5").unwrap();
        session.save_access_token("jwt").unwrap();
        session.save_user(&staff()).unwrap();

        session.clear().unwrap();
        assert!(session.access_token().is_none());
        assert!(session.current_user().is_none());
        assert_eq!(storage.get_item(branch_key).unwrap().as_deref(), Some("b5"));
    }
}
