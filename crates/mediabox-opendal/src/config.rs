//! Storage configuration types.

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Storage backend selector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendType {
    /// Process memory; content is lost on exit.
    #[default]
    Memory,
    /// Local filesystem below `root`.
    Fs,
    /// Amazon S3 or a compatible service; `root` names the bucket.
    S3,
}

/// Storage backend configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Backend to store content bytes in
    #[cfg_attr(
        feature = "config",
        arg(
            long = "storage-backend",
            env = "STORAGE_BACKEND",
            value_enum,
            default_value = "memory"
        )
    )]
    #[serde(default)]
    pub backend_type: BackendType,

    /// Filesystem root directory, or bucket name for S3
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-root", env = "STORAGE_ROOT", default_value = "/")
    )]
    #[serde(default = "default_root")]
    pub root: String,

    /// Public base URL prepended to stored paths
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-public-url", env = "STORAGE_PUBLIC_URL")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,

    /// S3 region
    #[cfg_attr(feature = "config", arg(long = "storage-region", env = "STORAGE_REGION"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible services
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-endpoint", env = "STORAGE_ENDPOINT")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// S3 access key id
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-access-key-id", env = "STORAGE_ACCESS_KEY_ID")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    /// S3 secret access key
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-secret-access-key", env = "STORAGE_SECRET_ACCESS_KEY")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

fn default_root() -> String {
    "/".to_owned()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(BackendType::Memory, default_root())
    }
}

impl StorageConfig {
    /// Creates a configuration for a backend rooted at `root`.
    pub fn new(backend_type: BackendType, root: impl Into<String>) -> Self {
        Self {
            backend_type,
            root: root.into(),
            public_url: None,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Creates an in-memory configuration.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Sets the public base URL.
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = Some(public_url.into());
        self
    }

    /// Sets the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets a custom endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend_type", &self.backend_type)
            .field("root", &self.root)
            .field("public_url", &self.public_url)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "***"))
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_masks_credentials() {
        let config = StorageConfig::new(BackendType::S3, "bucket").with_credentials("id", "secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret\""));
        assert!(debug.contains("***"));
    }

    #[test]
    fn deserializes_backend_names() -> serde_json::Result<()> {
        let config: StorageConfig = serde_json::from_str(r#"{"backend_type":"fs","root":"/tmp"}"#)?;
        assert_eq!(config.backend_type, BackendType::Fs);
        assert_eq!(config.root, "/tmp");
        assert_eq!(config.public_url, None);

        let config: StorageConfig = serde_json::from_str("{}")?;
        assert_eq!(config, StorageConfig::memory());
        Ok(())
    }
}
