use contracts::system::auth::UserInfo;
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;

use super::resolver::{BranchError, BranchResolver};
use crate::shared::config::config;
use crate::shared::storage::use_storage;

/// Branch selection shared by all views.
///
/// Nothing is cached here: every read goes back to the resolver with the
/// current user, `revision` only tells reactive readers to re-run.
#[derive(Clone, Copy)]
pub struct BranchState {
    resolver: StoredValue<BranchResolver, LocalStorage>,
    revision: RwSignal<u64>,
}

impl BranchState {
    pub fn new(resolver: BranchResolver) -> Self {
        Self {
            resolver: StoredValue::new_local(resolver),
            revision: RwSignal::new(0),
        }
    }

    /// Tracked: re-runs when the selection changes.
    pub fn active_branch_id(&self, user: Option<&UserInfo>) -> String {
        self.revision.track();
        self.resolver.with_value(|r| r.active_branch_id(user))
    }

    pub fn select(&self, user: Option<&UserInfo>, branch_id: &str) -> Result<(), BranchError> {
        self.resolver
            .with_value(|r| r.set_active_branch_id(user, branch_id))?;
        self.revision.update(|n| *n += 1);
        Ok(())
    }

    pub fn reset(&self) -> Result<(), BranchError> {
        self.resolver.with_value(|r| r.clear_preference())?;
        self.revision.update(|n| *n += 1);
        Ok(())
    }
}

/// Branch context provider component
#[component]
pub fn BranchProvider(children: Children) -> impl IntoView {
    let resolver = BranchResolver::new(use_storage(), config().storage.active_branch.clone());
    provide_context(BranchState::new(resolver));

    children()
}

/// Hook to access the branch selection
pub fn use_branch() -> BranchState {
    use_context::<BranchState>().expect("BranchProvider not found in component tree")
}
