pub mod context;
pub mod resolver;

pub use context::{use_branch, BranchProvider, BranchState};
pub use resolver::{resolve_branch_id, BranchError, BranchResolver};
