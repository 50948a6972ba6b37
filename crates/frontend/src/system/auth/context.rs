use contracts::system::auth::UserInfo;
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;

use super::storage::AuthSession;
use crate::shared::config::config;
use crate::shared::storage::{use_storage, StorageError};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub access_token: Option<String>,
    pub user_info: Option<UserInfo>,
}

impl AuthState {
    fn from_session(session: &AuthSession) -> Self {
        Self {
            access_token: session.access_token(),
            user_info: session.current_user(),
        }
    }
}

/// Signed-in user as a signal, backed by the stored session.
#[derive(Clone, Copy)]
pub struct AuthContext {
    session: StoredValue<AuthSession, LocalStorage>,
    state: RwSignal<AuthState>,
}

impl AuthContext {
    pub fn new(session: AuthSession) -> Self {
        let state = RwSignal::new(AuthState::from_session(&session));
        Self {
            session: StoredValue::new_local(session),
            state,
        }
    }

    pub fn user(&self) -> Signal<Option<UserInfo>> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.user_info.clone()))
    }

    pub fn access_token(&self) -> Signal<Option<String>> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.access_token.clone()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(|s| s.access_token.is_some())
    }

    /// Persists what the login flow returned and publishes it.
    pub fn sign_in(&self, access_token: &str, user: UserInfo) -> Result<(), StorageError> {
        self.session.with_value(|s| {
            s.save_access_token(access_token)?;
            s.save_user(&user)
        })?;
        self.state.set(AuthState {
            access_token: Some(access_token.to_string()),
            user_info: Some(user),
        });
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), StorageError> {
        self.session.with_value(|s| s.clear())?;
        self.state.set(AuthState::default());
        Ok(())
    }

    /// Re-reads the stored session, e.g. after another tab logged in.
    pub fn refresh(&self) {
        let fresh = self.session.with_value(AuthState::from_session);
        if self.state.with_untracked(|s| *s != fresh) {
            self.state.set(fresh);
        }
    }
}

/// Auth context provider component
#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    let session = AuthSession::new(use_storage(), &config().storage);
    provide_context(AuthContext::new(session));

    children()
}

/// Hook to access auth state
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthProvider not found in component tree")
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::shared::storage::{KeyValueStorage, MemoryStorage};

    fn manager() -> UserInfo {
        UserInfo {
            id: "u3".to_string(),
            username: "hoa".to_string(),
            full_name: None,
            email: None,
            role: Some("MANAGER".to_string()),
            branch_id: None,
        }
    }

    fn context(storage: &MemoryStorage) -> AuthContext {
        AuthContext::new(AuthSession::new(Rc::new(storage.clone()), &config().storage))
    }

    #[test]
    fn test_restores_stored_session() {
        let owner = Owner::new();
        owner.set();

        let storage = MemoryStorage::new();
        let session = AuthSession::new(Rc::new(storage.clone()), &config().storage);
        session.save_access_token("jwt").unwrap();
        session.save_user(&manager()).unwrap();

        let auth = context(&storage);
        assert!(auth.is_authenticated());
        assert_eq!(auth.user().get_untracked(), Some(manager()));
        assert_eq!(auth.access_token().get_untracked().as_deref(), Some("jwt"));
    }

    #[test]
    fn test_sign_in_and_out_update_signals() {
        let owner = Owner::new();
        owner.set();

        let storage = MemoryStorage::new();
        let auth = context(&storage);
        assert!(auth.user().get_untracked().is_none());

        auth.sign_in("jwt", manager()).unwrap();
        assert_eq!(auth.user().get_untracked(), Some(manager()));
        assert!(storage.get_item(&config().storage.access_token).unwrap().is_some());

        auth.sign_out().unwrap();
        assert!(!auth.is_authenticated());
        assert!(auth.user().get_untracked().is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_refresh_picks_up_external_login() {
        let owner = Owner::new();
        owner.set();

        let storage = MemoryStorage::new();
        let auth = context(&storage);
        let other_tab = AuthSession::new(Rc::new(storage.clone()), &config().storage);
        other_tab.save_access_token("jwt2").unwrap();
        other_tab.save_user(&manager()).unwrap();

        assert!(auth.user().get_untracked().is_none());
        auth.refresh();
        assert_eq!(auth.access_token().get_untracked().as_deref(), Some("jwt2"));
    }

    #[test]
    fn test_failed_sign_in_keeps_signed_out_state() {
        let owner = Owner::new();
        owner.set();

        let storage = MemoryStorage::new();
        let auth = context(&storage);
        storage.fail_writes(true);
        assert!(auth.sign_in("jwt", manager()).is_err());
        assert!(!auth.is_authenticated());
    }
}
