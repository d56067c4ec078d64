//! Status command handler

use anyhow::Result;

use annotator_core::{
    Column, Config, Document, DocumentMetadata, Label, StorageError, StorageStats, StoreHandle,
};

use crate::output::{format_bytes, Output, OutputFormat};

struct Status {
    stats: StorageStats,
    metadata: Option<DocumentMetadata>,
    documents: usize,
    labelled: usize,
    columns: usize,
    labels: usize,
}

/// Show status information
pub async fn show(handle: &StoreHandle, config: &Config, output: &Output) -> Result<()> {
    let status = handle
        .call(|store| {
            let documents = store.get_all::<Document>()?;
            Ok::<_, StorageError>(Status {
                stats: store.stats(),
                metadata: store.metadata()?,
                labelled: documents.iter().filter(|d| d.is_labelled()).count(),
                documents: documents.len(),
                columns: store.count::<Column>()?,
                labels: store.count::<Label>()?,
            })
        })
        .await?;

    match output.format {
        OutputFormat::Json => {
            output.json(&serde_json::json!({
                "file": status.metadata,
                "display_mode": config.display_mode,
                "page_size": config.page_size,
                "storage": {
                    "database_path": status.stats.database_path,
                    "database_exists": status.stats.database_exists,
                    "database_size": status.stats.database_size
                },
                "counts": {
                    "documents": status.documents,
                    "labelled": status.labelled,
                    "columns": status.columns,
                    "labels": status.labels
                }
            }));
        }
        OutputFormat::Quiet => {
            println!("{}/{}", status.labelled, status.documents);
        }
        OutputFormat::Human => {
            println!("Data Annotator Status");
            println!("=====================");
            println!();
            println!("Imported file:");
            match &status.metadata {
                Some(meta) => {
                    println!("  Name: {}", meta.name);
                    println!("  Type: {}", meta.mime_type);
                    println!("  Size: {}", format_bytes(meta.size));
                }
                None => println!("  (none)"),
            }
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Size:     {}", format_bytes(status.stats.database_size));
            println!();
            println!("Contents:");
            println!("  Documents: {}", status.documents);
            println!("  Labelled:  {}", status.labelled);
            println!("  Columns:   {}", status.columns);
            println!("  Labels:    {}", status.labels);
            println!();
            println!("Display: {} ({} per page)", config.display_mode, config.page_size);
        }
    }

    Ok(())
}
