//! Classification command handlers

use anyhow::{Context, Result};

use annotator_core::{ClassificationView, ClassifyError, Config, RecordId, StoreHandle};

use crate::output::Output;

/// Show one page of cards
pub async fn page(
    handle: &StoreHandle,
    config: &Config,
    page_number: usize,
    output: &Output,
) -> Result<()> {
    let (page_size, mode) = (config.page_size, config.display_mode);

    let page = handle
        .call(move |store| {
            let view = ClassificationView::load(store, page_size, mode)?;
            view.page(store, page_number)
        })
        .await
        .with_context(|| format!("Failed to load page {}", page_number))?;

    output.print_card_page(&page);
    Ok(())
}

/// Show a single document's card
pub async fn show(
    handle: &StoreHandle,
    config: &Config,
    id: RecordId,
    output: &Output,
) -> Result<()> {
    let (page_size, mode) = (config.page_size, config.display_mode);

    let card = handle
        .call(move |store| ClassificationView::load(store, page_size, mode)?.card(store, id))
        .await?;

    output.print_card(&card);
    Ok(())
}

/// Label a document
pub async fn label(
    handle: &StoreHandle,
    config: &Config,
    id: RecordId,
    label: String,
    output: &Output,
) -> Result<()> {
    let (page_size, mode) = (config.page_size, config.display_mode);

    let name = label.clone();
    handle
        .call(move |store| {
            ClassificationView::load(store, page_size, mode)?.assign(store, id, &name)
        })
        .await?;

    output.success(&format!("Labelled document {} as {}", id, label));
    Ok(())
}

/// Remove a document's label
pub async fn unlabel(
    handle: &StoreHandle,
    config: &Config,
    id: RecordId,
    output: &Output,
) -> Result<()> {
    let (page_size, mode) = (config.page_size, config.display_mode);

    handle
        .call(move |store| ClassificationView::load(store, page_size, mode)?.unassign(store, id))
        .await?;

    output.success(&format!("Cleared label on document {}", id));
    Ok(())
}

/// List labels with document counts
pub async fn labels(handle: &StoreHandle, config: &Config, output: &Output) -> Result<()> {
    let (page_size, mode) = (config.page_size, config.display_mode);

    let summary = handle
        .call(move |store| {
            ClassificationView::load(store, page_size, mode)?.label_summary(store)
        })
        .await;

    match summary {
        Ok(summary) => output.print_label_summary(&summary),
        Err(ClassifyError::NoSession) => output.message("No labels defined. Import a file first."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
