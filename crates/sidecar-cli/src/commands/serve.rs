//! `sidecar serve`: the message loop.

use std::io::Stdout;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde_json::Value;
use sidecar_host::{Dispatcher, WriterChannel};
use sidecar_kernel::{CellContext, MemNamespace};
use sidecar_protocol::{CommManager, CommOpener};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::opts::SidecarOpts;

pub async fn cmd_serve(opts: &SidecarOpts) -> Result<()> {
    let config = opts.config();
    let namespace = Rc::new(MemNamespace::new());
    let comms: Rc<CommManager<WriterChannel<Stdout>>> = Rc::new(CommManager::new(
        |comm_id, target_name| Ok(WriterChannel::stdout(comm_id, target_name)),
    ));
    let ctx = CellContext::new(namespace, comms.clone());
    let dispatcher = Rc::new(Dispatcher::new(ctx, config.clone()));

    let shared = comms.open_comm(&config.inbound_target)?;
    dispatcher.attach(&shared)?;
    let inbound = comms
        .get(&config.inbound_target)
        .context("inbound comm was not opened")?;
    tracing::info!(
        inbound = %config.inbound_target,
        form_cells = %config.form_cell_target,
        "sidecar listening on stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => inbound.deliver(inbound_body(value)),
            Err(err) => {
                tracing::warn!(%err, "inbound line is not JSON");
                dispatcher.handle_msg(&Value::String(line.to_string()), &*inbound);
            }
        }
    }
    tracing::info!("stdin closed; shutting down");
    Ok(())
}

/// Accepts either a full envelope (`{"body": {...}}`) or a bare body.
fn inbound_body(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("body") => {
            map.remove("body").unwrap_or(Value::Null)
        }
        other => other,
    }
}
