use std::env;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, ConfigFile};
use crate::core::port::PortId;
use crate::core::tree::DEFAULT_EXCLUDED_DIRS;
use crate::graph::style::DEFAULT_UNMAINTAINED;
use crate::graph::viz::RankDir;

pub const CONFIG_ENV: &str = "PORTGRAPH_CONFIG";
pub const MAKE_ENV: &str = "PORTGRAPH_MAKE";
pub const DOT_ENV: &str = "PORTGRAPH_DOT";

const DEFAULT_LOCALBASE: &str = "/usr/ports";

/// A config file location and whether it has to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub required: bool,
}

/// Command-line values that win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub localbase: Option<PathBuf>,
    pub format: Option<String>,
    pub rankdir: Option<String>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub localbase: PathBuf,
    pub privileged: PortId,
    pub unmaintained: String,
    pub make_command: String,
    pub excluded_dirs: Vec<String>,
    pub format: String,
    pub rankdir: RankDir,
    pub dot_command: String,
    pub output_dir: PathBuf,
}

impl Settings {
    pub fn resolve(file: &ConfigFile, overrides: &Overrides) -> Result<Self, ConfigError> {
        let ports = &file.ports;
        let render = &file.render;

        let privileged = match ports.privileged.as_deref() {
            Some(raw) => raw.parse().map_err(ConfigError::PrivilegedPort)?,
            None => PortId::pkg(),
        };
        let rankdir = overrides
            .rankdir
            .as_deref()
            .or(render.rankdir.as_deref())
            .map(str::parse::<RankDir>)
            .transpose()
            .map_err(ConfigError::Invalid)?
            .unwrap_or_default();
        let format = overrides
            .format
            .clone()
            .or_else(|| render.format.clone())
            .unwrap_or_else(|| "svg".to_string());
        if format.trim().is_empty() {
            return Err(ConfigError::Invalid("output format must not be empty".to_string()));
        }

        Ok(Self {
            localbase: overrides
                .localbase
                .clone()
                .or_else(|| ports.localbase.as_ref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCALBASE)),
            privileged,
            unmaintained: ports
                .unmaintained
                .clone()
                .unwrap_or_else(|| DEFAULT_UNMAINTAINED.to_string()),
            make_command: ports
                .make_command
                .clone()
                .unwrap_or_else(|| "make".to_string()),
            excluded_dirs: ports.excluded_dirs.clone().unwrap_or_else(|| {
                DEFAULT_EXCLUDED_DIRS
                    .iter()
                    .map(|dir| dir.to_string())
                    .collect()
            }),
            format,
            rankdir,
            dot_command: render
                .dot_command
                .clone()
                .unwrap_or_else(|| "dot".to_string()),
            output_dir: overrides
                .output_dir
                .clone()
                .or_else(|| render.output_dir.as_ref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

/// Explicit path, then `PORTGRAPH_CONFIG`, then the per-user config file.
/// Only the per-user file may be absent.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<ConfigLocation> {
    if let Some(path) = explicit {
        return Some(ConfigLocation {
            path,
            required: true,
        });
    }

    if let Ok(path) = env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(ConfigLocation {
                path: PathBuf::from(path),
                required: true,
            });
        }
    }

    let config_home = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(ConfigLocation {
        path: config_home.join("portgraph").join("config.toml"),
        required: false,
    })
}

pub fn load_config(location: Option<&ConfigLocation>) -> Result<ConfigFile, ConfigError> {
    let mut config = match location {
        Some(location) => load_config_file(&location.path, location.required)?,
        None => ConfigFile::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

fn load_config_file(path: &Path, required: bool) -> Result<ConfigFile, ConfigError> {
    if !path.is_file() {
        if required {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }
        return Ok(ConfigFile::default());
    }

    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(config: &mut ConfigFile) {
    if let Ok(make) = env::var(MAKE_ENV) {
        if !make.is_empty() {
            config.ports.make_command = Some(make);
        }
    }
    if let Ok(dot) = env::var(DOT_ENV) {
        if !dot.is_empty() {
            config.render.dot_command = Some(dot);
        }
    }
}
