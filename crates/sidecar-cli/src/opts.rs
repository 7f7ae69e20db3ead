//! Global CLI options layered over the `SIDECAR_*` environment.

use clap::Args;
use sidecar_host::SidecarConfig;

#[derive(Args, Debug, Clone)]
pub struct SidecarOpts {
    /// Echo every inbound message back as {"status": "received"}
    #[arg(long, global = true)]
    pub echo: bool,

    /// Comm target form cells sync over (env: SIDECAR_FORM_CELL_TARGET)
    #[arg(long, global = true, env = "SIDECAR_FORM_CELL_TARGET")]
    pub target: Option<String>,

    /// Hide variables with this prefix from the explorer (repeatable, replaces the defaults)
    #[arg(long = "skip-prefix", global = true)]
    pub skip_prefixes: Vec<String>,
}

impl SidecarOpts {
    pub fn config(&self) -> SidecarConfig {
        let mut config = SidecarConfig::from_env();
        if self.echo {
            config.echo_inbound = true;
        }
        if let Some(target) = &self.target {
            config.form_cell_target = target.clone();
        }
        if !self.skip_prefixes.is_empty() {
            config.skip_prefixes = self.skip_prefixes.clone();
        }
        config
    }
}
