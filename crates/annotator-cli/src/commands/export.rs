//! Export command handler

use std::path::PathBuf;

use anyhow::{Context, Result};

use annotator_core::{export_labelled, StoreHandle};

use crate::output::Output;

/// Write the labelled data to `output_dir` (current directory by default)
pub async fn run(handle: &StoreHandle, output_dir: Option<PathBuf>, output: &Output) -> Result<()> {
    let dir = match output_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };

    let summary = handle
        .call(move |store| export_labelled(store, &dir))
        .await
        .context("Export failed")?;

    output.print_export(&summary);
    Ok(())
}
