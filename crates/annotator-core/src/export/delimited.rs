use std::path::Path;

use super::header;
use crate::models::Document;

pub(super) fn write(path: &Path, columns: &[String], documents: &[Document]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header(columns))?;

    for document in documents {
        let cells = columns
            .iter()
            .map(|column| document.get(column).map(ToString::to_string).unwrap_or_default())
            .chain(std::iter::once(document.label.clone().unwrap_or_default()));
        writer.write_record(cells)?;
    }

    writer.flush()?;
    Ok(())
}
