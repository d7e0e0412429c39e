//! Client configuration

use serde::{Deserialize, Serialize};

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend origin (default: http://netmera.com)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Application API key, used as the session token until a user logs in
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Fixed backend identifiers
    #[serde(default)]
    pub profile: BackendProfile,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            profile: BackendProfile::default(),
        }
    }
}

impl ClientConfig {
    /// Default configuration with the given API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Origin without a trailing slash
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn default_base_url() -> String { "http://netmera.com".to_string() }
fn default_timeout_secs() -> u64 { 30 }

/// Service, path and action names the content API expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendProfile {
    pub service_name: String,
    /// Parent path every content record lives under
    pub parent_path: String,
    pub people_path: String,
    pub content_type: String,
    pub create_action: String,
    pub update_action: String,
    /// Field binding a record to its object kind
    pub type_field: String,
    pub privacy_type: String,
    pub moderation_status: String,
}

impl Default for BackendProfile {
    fn default() -> Self {
        Self {
            service_name: "netmera-mobimera".to_string(),
            parent_path: "/mobimeracontents".to_string(),
            people_path: "/people".to_string(),
            content_type: "netmera-mobimera:mobimera".to_string(),
            create_action: "netmera-mobimera:create-mobimera".to_string(),
            update_action: "netmera-mobimera:update-mobimera".to_string(),
            type_field: "netmera-mobimera:api-content-type".to_string(),
            privacy_type: "public".to_string(),
            moderation_status: "production".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::with_api_key("key-1");
        assert_eq!(config.base_url, "http://netmera.com");
        assert_eq!(config.api_key, "key-1");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.profile.parent_path, "/mobimeracontents");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://localhost:9000/", "api_key": "k"}"#).unwrap();
        assert_eq!(config.origin(), "http://localhost:9000");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.profile, BackendProfile::default());
    }
}
