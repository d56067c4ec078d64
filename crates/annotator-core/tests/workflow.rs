//! Import, classify and export a small CSV through the public API.

use std::fs;

use annotator_core::{
    export_labelled, parse_file, parse_file_async, CellValue, ClassificationView, Column,
    Config, DisplayMode, Document, ExportFormat, ImportPlan, Label, Store, StoreHandle,
};
use tempfile::TempDir;

fn config(dir: &TempDir) -> Config {
    Config {
        data_dir: dir.path().join("data"),
        ..Config::default()
    }
}

fn write_people(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("people.csv");
    fs::write(&path, "name,age\nA,1\nB,2\nC,3\n").unwrap();
    path
}

#[test]
fn import_label_and_export_csv() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let mut store = Store::open_with_config(&config).unwrap();

    let imported = parse_file(write_people(&dir)).unwrap();
    let names: Vec<_> = imported.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["name", "age"]);
    assert_eq!(
        imported.documents[2],
        Document::from_fields([("name", "C"), ("age", "3")])
    );

    let mut plan = ImportPlan::from_file(imported, DisplayMode::Multi);
    plan.select_primary("name").unwrap();
    plan.add_named_label("Yes").unwrap();
    plan.add_named_label("No").unwrap();
    plan.commit(&mut store).unwrap();

    let page = store.get_page::<Document>(1, 50).unwrap();
    assert_eq!(page.records.len(), 3);
    assert_eq!(page.total_count, 3);

    let first = page.records[0].with_label(Some("Yes".to_string()));
    store.put(&first).unwrap();

    let documents = store.get_all::<Document>().unwrap();
    assert_eq!(documents[0].label.as_deref(), Some("Yes"));
    assert_eq!(documents[0].get("name"), Some(&CellValue::from("A")));
    assert!(documents[1].label.is_none());
    assert!(documents[2].label.is_none());

    let out = dir.path().join("out");
    let summary = export_labelled(&store, &out).unwrap();
    assert_eq!(summary.format, ExportFormat::Csv);
    assert_eq!(
        fs::read_to_string(out.join("labelled_data.csv")).unwrap(),
        "name,age,label\nA,1,Yes\nB,2,\nC,3,\n"
    );
}

#[test]
fn new_import_replaces_previous_session() {
    let dir = TempDir::new().unwrap();
    let mut store = Store::open_with_config(&config(&dir)).unwrap();

    let mut plan = ImportPlan::from_file(parse_file(write_people(&dir)).unwrap(), DisplayMode::Single);
    plan.select_primary("age").unwrap();
    plan.add_named_label("Adult").unwrap();
    plan.add_named_label("Minor").unwrap();
    plan.commit(&mut store).unwrap();

    let other = dir.path().join("other.csv");
    fs::write(&other, "text\nhello\n").unwrap();
    let mut plan = ImportPlan::from_file(parse_file(&other).unwrap(), DisplayMode::Single);
    plan.select_primary("text").unwrap();
    plan.add_named_label("Greeting").unwrap();
    plan.add_named_label("Other").unwrap();
    plan.commit(&mut store).unwrap();

    assert_eq!(store.count::<Document>().unwrap(), 1);
    assert_eq!(store.get_all::<Column>().unwrap().len(), 1);
    let labels: Vec<_> = store
        .get_all::<Label>()
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(labels, vec!["Greeting", "Other"]);
    assert_eq!(store.metadata().unwrap().unwrap().name, "other.csv");
}

#[tokio::test]
async fn classify_through_the_async_handle() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let handle = StoreHandle::open(config.clone()).await.unwrap();

    let imported = parse_file_async(write_people(&dir)).await.unwrap();
    let mut plan = ImportPlan::from_file(imported, config.display_mode);
    plan.select_primary("name").unwrap();
    plan.toggle_secondary("age").unwrap();
    plan.add_named_label("Yes").unwrap();
    plan.add_named_label("No").unwrap();
    handle.call(move |store| plan.commit(store)).await.unwrap();

    let page_size = config.page_size;
    let mode = config.display_mode;
    let (page, summary) = handle
        .call(move |store| {
            let view = ClassificationView::load(store, page_size, mode)?;
            let id = store.get_all::<Document>()?[1].id.expect("stored id");
            view.assign(store, id, "No")?;
            Ok::<_, annotator_core::ClassifyError>((view.page(store, 1)?, view.label_summary(store)?))
        })
        .await
        .unwrap();

    assert_eq!(page.page_count, 1);
    assert_eq!(page.cards.len(), 3);
    assert_eq!(page.cards[1].label.as_deref(), Some("No"));
    assert_eq!(page.cards[1].secondary[0].column, "age");
    assert_eq!(summary.unlabelled, 2);
}
