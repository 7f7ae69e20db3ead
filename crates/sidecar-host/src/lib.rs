//! Host side of the bridge: message dispatch, variable explorer, prompt
//! helpers, and the stdio channel used by the `sidecar` binary.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod explorer;
pub mod prompt;
pub mod stdio;

pub use config::{ExplorerConfig, SidecarConfig};
pub use dispatch::{Dispatcher, Reply};
pub use error::HostError;
pub use stdio::WriterChannel;
