//! Which branch scope data queries run under.
//!
//! STAFF users are pinned to their own branch. Everyone else (including an
//! anonymous session) uses the branch picked in the header selector, stored
//! in a single localStorage slot shared by all users of the browser, or
//! `"all"` when nothing was picked.

use std::rc::Rc;

use contracts::system::auth::UserInfo;
use contracts::system::branch::ALL_BRANCHES;
use thiserror::Error;

use crate::shared::storage::{KeyValueStorage, StorageError};

#[derive(Debug, Error)]
pub enum BranchError {
    #[error("branch selection is locked to '{branch_id}' for staff users")]
    Locked { branch_id: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Branch scope for `user` given the stored `preference`.
pub fn resolve_branch_id(user: Option<&UserInfo>, preference: Option<&str>) -> String {
    if let Some(user) = user.filter(|u| u.role().is_branch_locked()) {
        // empty when the account has no branch yet; the API then sees `branchId=`
        return user.branch_id.clone().unwrap_or_default();
    }
    match preference {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => ALL_BRANCHES.to_string(),
    }
}

#[derive(Clone)]
pub struct BranchResolver {
    storage: Rc<dyn KeyValueStorage>,
    key: String,
}

impl BranchResolver {
    pub fn new(storage: Rc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Stored selection, `None` when unset, empty or unreadable.
    pub fn stored_preference(&self) -> Option<String> {
        match self.storage.get_item(&self.key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                log::warn!("failed to read branch preference: {}", e);
                None
            }
        }
    }

    pub fn active_branch_id(&self, user: Option<&UserInfo>) -> String {
        resolve_branch_id(user, self.stored_preference().as_deref())
    }

    /// Stores `branch_id` as the selection. The id is not checked against the
    /// branch list. Staff users cannot change it.
    pub fn set_active_branch_id(
        &self,
        user: Option<&UserInfo>,
        branch_id: &str,
    ) -> Result<(), BranchError> {
        if let Some(user) = user.filter(|u| u.role().is_branch_locked()) {
            log::warn!("user {} tried to switch branch to {}", user.username, branch_id);
            return Err(BranchError::Locked {
                branch_id: user.branch_id.clone().unwrap_or_default(),
            });
        }
        self.storage.set_item(&self.key, branch_id)?;
        log::debug!("active branch -> {}", branch_id);
        Ok(())
    }

    /// Drops the stored selection. Not called on logout by itself.
    pub fn clear_preference(&self) -> Result<(), BranchError> {
        self.storage.remove_item(&self.key)?;
        Ok(())
    }
}
