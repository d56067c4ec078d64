//! Clear command handler

use anyhow::{bail, Context, Result};

use annotator_core::{Document, StoreHandle};

use crate::output::Output;
use crate::prompt::confirm;

/// Delete the stored session
pub async fn run(handle: &StoreHandle, yes: bool, output: &Output) -> Result<()> {
    if !yes {
        if !output.should_prompt() {
            bail!("Refusing to clear without confirmation. Pass --yes to clear.");
        }
        let documents = handle.call(|store| store.count::<Document>()).await?;
        println!("Delete all stored data ({} document(s))?", documents);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    handle.clear_all().await.context("Failed to clear data")?;

    output.success("Cleared all stored data");
    Ok(())
}
