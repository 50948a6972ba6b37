use once_cell::sync::Lazy;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct FrontendConfig {
    pub api: ApiConfig,
    pub storage: StorageKeys,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Backend port, host is taken from the page location.
    pub port: u16,
}

/// localStorage keys owned by the client.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageKeys {
    pub cart: String,
    pub active_branch: String,
    pub access_token: String,
    pub user: String,
}

/// Default configuration embedded in the bundle
const DEFAULT_CONFIG: &str = r#"
[api]
port = 3000

[storage]
cart = "shop_cart_v1"
active_branch = "active_branch_id"
access_token = "auth_access_token"
user = "auth_user"
"#;

static CONFIG: Lazy<FrontendConfig> = Lazy::new(|| {
    FrontendConfig::from_toml_str(DEFAULT_CONFIG).expect("embedded default config is valid")
});

impl FrontendConfig {
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: FrontendConfig = toml::from_str(contents)?;
        Ok(config)
    }
}

/// Process-wide configuration (the embedded default).
pub fn config() -> &'static FrontendConfig {
    &CONFIG
}
