//! API utilities for frontend-backend communication
//!
//! Provides helper functions for constructing API URLs and making
//! branch-scoped requests.

use std::collections::HashMap;

use contracts::system::branch::BRANCH_QUERY_PARAM;
use gloo_net::http::Request;

use super::config::config;

/// Get the base URL for API requests
///
/// Constructs the API base URL from the current window location,
/// using the configured backend port.
///
/// # Returns
/// - API base URL like "http://localhost:3000"
/// - Empty string if window is not available
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:{}", protocol, hostname, config().api.port)
}

/// Build a full API URL from a path
///
/// # Example
/// ```rust,ignore
/// let url = api_url("/api/products/123");
/// ```
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}

/// Append the branch scope to an API path.
///
/// The id is sent as-is, so `"all"` and an empty id (staff without a
/// branch) both reach the server.
///
/// # Example
/// ```rust,ignore
/// scoped_path("/api/orders?page=2", "b1"); // "/api/orders?page=2&branchId=b1"
/// ```
pub fn scoped_path(path: &str, branch_id: &str) -> String {
    let query = serde_qs::to_string(&HashMap::from([(BRANCH_QUERY_PARAM, branch_id)]))
        .unwrap_or_else(|_| format!("{}=", BRANCH_QUERY_PARAM));
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, separator, query)
}

/// GET a branch-scoped resource with the bearer token attached.
pub async fn fetch_scoped<T>(path: &str, branch_id: &str, access_token: &str) -> Result<T, String>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let url = api_url(&scoped_path(path, branch_id));
    let response = Request::get(&url)
        .header("Authorization", &format!("Bearer {}", access_token))
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if !response.ok() {
        return Err(format!("Request failed: {}", response.status()));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_path_adds_query() {
        assert_eq!(scoped_path("/api/products", "b1"), "/api/products?branchId=b1");
        assert_eq!(scoped_path("/api/products", "all"), "/api/products?branchId=all");
    }

    #[test]
    fn test_scoped_path_keeps_existing_query() {
        assert_eq!(
            scoped_path("/api/orders?page=2", "b1"),
            "/api/orders?page=2&branchId=b1"
        );
    }

    #[test]
    fn test_scoped_path_empty_branch() {
        assert_eq!(scoped_path("/api/stock", ""), "/api/stock?branchId=");
    }
}
