use serde::Deserialize;

/// On-disk configuration. Every key is optional; absent keys fall back to
/// environment variables and built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub ports: PortsSection,
    #[serde(default)]
    pub render: RenderSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortsSection {
    #[serde(default)]
    pub localbase: Option<String>,
    #[serde(default)]
    pub privileged: Option<String>,
    #[serde(default)]
    pub unmaintained: Option<String>,
    #[serde(default)]
    pub make_command: Option<String>,
    #[serde(default)]
    pub excluded_dirs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSection {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub rankdir: Option<String>,
    #[serde(default)]
    pub dot_command: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
}
