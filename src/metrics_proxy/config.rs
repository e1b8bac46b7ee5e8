//! Handler configuration: at most one backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::metrics_proxy::backend::{BackendSpec, UnixBackend};
use crate::metrics_proxy::MODULE_NAME;

/// Configuration of one proxy instance.
///
/// Serializes as `{"uds": {"path": "/abs/path"}}`, with `uds` omitted when no
/// backend is set. `Display` renders the equivalent directive text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConfigRepr", into = "ConfigRepr")]
pub struct Config {
    pub backend: Option<BackendSpec>,
}

impl Config {
    pub fn with_backend(backend: BackendSpec) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Checks that a backend is present; the backend itself was validated on
    /// construction.
    pub fn validate(&self) -> Result<&BackendSpec, ValidationError> {
        self.backend.as_ref().ok_or(ValidationError::MissingKind)
    }

    /// Reads the serialized shape from JSON and validates it.
    pub fn from_json(input: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the serialized shape from YAML and validates it.
    pub fn from_yaml(input: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(backend) = &self.backend else {
            return writeln!(f, "{MODULE_NAME}");
        };
        writeln!(f, "{MODULE_NAME} {{")?;
        match backend {
            BackendSpec::UnixSocket { path } => {
                writeln!(f, "\t{} {{", backend.kind())?;
                writeln!(f, "\t\tpath {}", quote(&path.display().to_string()))?;
                writeln!(f, "\t}}")?;
            }
        }
        writeln!(f, "}}")
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uds: Option<UnixBackend>,
}

impl TryFrom<ConfigRepr> for Config {
    type Error = ValidationError;

    fn try_from(repr: ConfigRepr) -> Result<Self, Self::Error> {
        let backend = repr
            .uds
            .map(|uds| BackendSpec::unix_socket(uds.path))
            .transpose()?;
        Ok(Self { backend })
    }
}

impl From<Config> for ConfigRepr {
    fn from(config: Config) -> Self {
        let uds = config.backend.map(|backend| match backend {
            BackendSpec::UnixSocket { path } => UnixBackend {
                path: path.display().to_string(),
            },
        });
        Self { uds }
    }
}
