//! Server configuration surface.
//!
//! Configuration is declarative TOML; the library consumer loads it,
//! instantiates the backend modules the `mounts` section names, and
//! hands both to [`ServerContext::new`](crate::server::ServerContext).

use serde::{Deserialize, Serialize};

/// One backend mount: an export name served by a backend module.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct MountConfig {
    /// Name clients mount, e.g. "share"
    pub export_name: String,
    /// Backend module identifier, e.g. "memfs"
    pub backend_module: String,
    /// Module-specific root path
    pub backend_path: String,
    /// Opaque module configuration, JSON text passed through verbatim
    #[serde(default)]
    pub module_config: String,
}

/// One MOUNT-visible export alias.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExportConfig {
    /// Name advertised by the MOUNT EXPORT procedure
    pub exported_name: String,
    /// Logical path the name maps to
    pub logical_path: String,
}

/// The complete server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Register with the system rpcbind instead of running the built-in
    /// portmap on :111
    #[serde(default)]
    pub external_portmap: bool,
    /// Enable the native RDMA listener
    #[serde(default)]
    pub nfs_rdma: bool,
    /// RDMA bind hostname
    #[serde(default)]
    pub nfs_rdma_hostname: String,
    /// RDMA bind port
    #[serde(default)]
    pub nfs_rdma_port: u16,
    /// Nonzero enables TCP/RDMA emulation; takes precedence over native
    /// RDMA
    #[serde(default)]
    pub nfs_tcp_rdma_port: u16,
    /// Backend mounts
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
    /// MOUNT export aliases
    #[serde(default)]
    pub exports: Vec<ExportConfig>,
}

impl ServerConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<ServerConfig, toml::de::Error> {
        toml::from_str(text)
    }

    /// Serializes the configuration to TOML text.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_surface() {
        let text = r#"
            external_portmap = true
            nfs_tcp_rdma_port = 20049

            [[mounts]]
            export_name = "share"
            backend_module = "memfs"
            backend_path = "/"
            module_config = "{}"

            [[exports]]
            exported_name = "share"
            logical_path = "/share"
        "#;
        let config = ServerConfig::from_toml(text).unwrap();
        assert!(config.external_portmap);
        assert!(!config.nfs_rdma);
        assert_eq!(config.nfs_tcp_rdma_port, 20049);
        assert_eq!(config.mounts.len(), 1);
        assert_eq!(config.mounts[0].export_name, "share");
        assert_eq!(config.exports[0].logical_path, "/share");
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = ServerConfig {
            nfs_rdma: true,
            nfs_rdma_hostname: "0.0.0.0".into(),
            nfs_rdma_port: 20050,
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(ServerConfig::from_toml(&text).unwrap(), config);
    }
}
