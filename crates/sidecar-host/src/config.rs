use sidecar_kernel::form_cells::DEFAULT_FORM_CELL_TARGET;

pub const DEFAULT_SKIP_PREFIXES: [&str; 7] =
    ["_", "In", "Out", "get_ipython", "exit", "quit", "open"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarConfig {
    /// Comm target form cells sync over.
    pub form_cell_target: String,
    /// Comm target the frontend sends requests on.
    pub inbound_target: String,
    /// Echo every inbound body back as `{status: "received"}`.
    pub echo_inbound: bool,
    /// Namespace names hidden from the variable explorer.
    pub skip_prefixes: Vec<String>,
    pub explorer: ExplorerConfig,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            form_cell_target: DEFAULT_FORM_CELL_TARGET.into(),
            inbound_target: "inbound".into(),
            echo_inbound: false,
            skip_prefixes: DEFAULT_SKIP_PREFIXES.iter().map(|p| p.to_string()).collect(),
            explorer: ExplorerConfig::default(),
        }
    }
}

impl SidecarConfig {
    /// Defaults overridden by `SIDECAR_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(target) = lookup("SIDECAR_FORM_CELL_TARGET").filter(|v| !v.is_empty()) {
            config.form_cell_target = target;
        }
        if let Some(target) = lookup("SIDECAR_INBOUND_TARGET").filter(|v| !v.is_empty()) {
            config.inbound_target = target;
        }
        if let Some(flag) = lookup("SIDECAR_ECHO_INBOUND") {
            config.echo_inbound = parse_flag(&flag);
        }
        if let Some(prefixes) = lookup("SIDECAR_SKIP_PREFIXES") {
            config.skip_prefixes = prefixes
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }
        config
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.skip_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Limits on the samples the variable explorer sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    pub max_list_sample: usize,
    pub max_repr_len: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_list_sample: 5,
            max_repr_len: 1000,
        }
    }
}
