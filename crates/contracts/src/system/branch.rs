//! Branch scope shared between the client and the API.

/// Sentinel meaning "no branch filter".
pub const ALL_BRANCHES: &str = "all";

/// Query parameter the API reads the branch scope from.
pub const BRANCH_QUERY_PARAM: &str = "branchId";

pub fn is_all_branches(branch_id: &str) -> bool {
    branch_id == ALL_BRANCHES
}

/// Branch a scoped request resolved to, as returned by `/api/branches/current`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BranchInfo {
    pub id: String,
    pub name: String,
}
