//! Columns command handler

use anyhow::Result;

use annotator_core::{Column, StoreHandle};

use crate::output::Output;

/// List stored columns and their display roles
pub async fn list(handle: &StoreHandle, output: &Output) -> Result<()> {
    let columns = handle.get_all::<Column>().await?;
    output.print_columns(&columns);
    Ok(())
}
