use contracts::system::branch::{is_all_branches, BranchInfo};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::shared::api_utils::fetch_scoped;
use crate::shared::storage::{default_storage, provide_storage};
use crate::system::auth::{use_auth, AuthProvider};
use crate::system::branch::{use_branch, BranchProvider};
use crate::system::cart::{use_cart, CartProvider};

#[component]
pub fn App() -> impl IntoView {
    // One storage handle for session, cart and branch selection.
    provide_storage(default_storage());

    view! {
        <AuthProvider>
            <CartProvider>
                <BranchProvider>
                    <header class="top-header">
                        <BranchBadge />
                        <CartBadge />
                    </header>
                </BranchProvider>
            </CartProvider>
        </AuthProvider>
    }
}

/// Number of units in the cart, kept current by the cart subscription.
#[component]
fn CartBadge() -> impl IntoView {
    let count = use_cart().count();

    view! {
        <span class="cart-badge">{move || count.get()}</span>
    }
}

/// Active branch scope. Shows the branch name once the API confirms it,
/// the raw id until then.
#[component]
fn BranchBadge() -> impl IntoView {
    let auth = use_auth();
    let branch = use_branch();
    let user = auth.user();
    let token = auth.access_token();

    let active_id = Memo::new(move |_| user.with(|u| branch.active_branch_id(u.as_ref())));
    let branch_name = RwSignal::new(None::<String>);

    Effect::new(move |_| {
        let id = active_id.get();
        branch_name.set(None);
        let Some(token) = token.get() else {
            return;
        };
        if id.is_empty() || is_all_branches(&id) {
            return;
        }
        spawn_local(async move {
            match fetch_scoped::<BranchInfo>("/api/branches/current", &id, &token).await {
                // drop answers for a selection that has since changed
                Ok(info) if active_id.get_untracked() == id => branch_name.set(Some(info.name)),
                Ok(_) => {}
                Err(e) => log::warn!("failed to load branch {}: {}", id, e),
            }
        });
    });

    let label = move || {
        let id = active_id.get();
        if is_all_branches(&id) {
            "Tất cả chi nhánh".to_string()
        } else {
            branch_name.get().unwrap_or(id)
        }
    };

    view! {
        <span class="branch-badge">{label}</span>
    }
}
