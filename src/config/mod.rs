// Configuration module entry point
// Loads configuration and holds the shared application state

mod state;
mod types;

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Environment variable prefix, e.g. `COLLECTOR_SERVER__PORT=8080`
const ENV_PREFIX: &str = "COLLECTOR";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, ENV_PREFIX)
    }

    /// File values first, then `<env_prefix>_SECTION__KEY` variables on top
    fn load_with_env(config_path: &str, env_prefix: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|e| format!("Invalid address {}: {e}", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Resolve the served script location
    ///
    /// Falls back to `../frontend/main.js` relative to the running executable.
    pub fn script_path(&self) -> PathBuf {
        self.assets
            .script_path
            .as_ref()
            .map_or_else(default_script_path, PathBuf::from)
    }
}

fn default_script_path() -> PathBuf {
    let base = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("..").join("frontend").join("main.js")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.storage.data_dir, "collected_data");
        assert_eq!(cfg.cors.allowed_origins, vec!["*".to_string()]);
        assert!(cfg.assets.script_path.is_none());
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "0.0.0.0:5000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collector.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 6001

[storage]
data_dir = "/var/lib/collector"

[cors]
allowed_origins = ["https://a.example", "https://b.example"]
"#,
        )
        .unwrap();

        let base = dir.path().join("collector");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 6001);
        // untouched sections keep their defaults
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.data_dir, "/var/lib/collector");
        assert_eq!(cfg.cors.allowed_origins.len(), 2);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.performance.read_timeout, 30);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("absent");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.storage.data_dir, "collected_data");
    }

    #[test]
    fn test_invalid_host() {
        let mut cfg = Config::default();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_ipv6_host() {
        let mut cfg = Config::default();
        cfg.server.host = "::".to_string();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "[::]:5000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_env_overrides_file() {
        // Own prefix so parallel tests loading with COLLECTOR_ never see these
        const PREFIX: &str = "COLLECTOR_ENVTEST";
        let vars = [
            (format!("{PREFIX}_SERVER__PORT"), "7100"),
            (format!("{PREFIX}_STORAGE__DATA_DIR"), "/srv/records"),
            (
                format!("{PREFIX}_CORS__ALLOWED_ORIGINS"),
                "https://a.example,https://b.example",
            ),
        ];
        for (key, value) in &vars {
            std::env::set_var(key, value);
        }

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("collector.toml"), "[server]\nport = 6001\n").unwrap();
        let base = dir.path().join("collector");
        let loaded = Config::load_with_env(base.to_str().unwrap(), PREFIX);

        for (key, _) in &vars {
            std::env::remove_var(key);
        }

        let cfg = loaded.unwrap();
        assert_eq!(cfg.server.port, 7100);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.data_dir, "/srv/records");
        assert_eq!(
            cfg.cors.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_script_path() {
        let mut cfg = Config::default();
        assert!(cfg.script_path().ends_with("frontend/main.js"));

        cfg.assets.script_path = Some("/srv/static/main.js".to_string());
        assert_eq!(cfg.script_path(), PathBuf::from("/srv/static/main.js"));
    }
}
