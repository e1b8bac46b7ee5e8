use std::path::PathBuf;

/// Host settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// `LISTEN`, default `127.0.0.1:8080`
    pub listen_addr: String,
    /// `PROXY_CONFIG`, default `Metricsfile`
    pub handlers_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let listen_addr =
            std::env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let handlers_path = std::env::var_os("PROXY_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("Metricsfile"));
        Self {
            listen_addr,
            handlers_path,
        }
    }
}
