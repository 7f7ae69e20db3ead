//! `sidecar parse`: offline validation of a form cell payload.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;
use sidecar_kernel::ParsedFormCell;

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// JSON file holding the payload (reads stdin when omitted or "-")
    pub path: Option<PathBuf>,

    /// Pretty-print the normalized record
    #[arg(long)]
    pub pretty: bool,
}

pub fn cmd_parse(args: &ParseArgs) -> Result<()> {
    let raw = match &args.path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin")?;
            buf
        }
    };

    let Value::Object(payload) = serde_json::from_str::<Value>(&raw).context("decode payload")?
    else {
        bail!("form cell payload must be a JSON object");
    };
    let parsed = ParsedFormCell::from_payload(payload)?;
    let record = Value::Object(parsed.dump());
    let out = if args.pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };
    println!("{out}");
    Ok(())
}
