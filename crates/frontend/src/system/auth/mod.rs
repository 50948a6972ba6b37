pub mod context;
pub mod storage;

pub use context::{use_auth, AuthContext, AuthProvider, AuthState};
pub use storage::AuthSession;
