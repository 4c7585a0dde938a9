use std::cell::RefCell;
use std::rc::Rc;

use anvil_core::{BoxError, LoadOn, MergeMode, Signal};
use anvil_table::{create_table, table_builder, DataSource, Paging, Table, TableOptions, UsePaging};
use anvil_test::TestHost;
use serde_json::{json, Value};

type Calls = Rc<RefCell<Vec<Value>>>;

/// A loader serving `rows` one page at a time, recording each call.
fn paged(rows: Vec<Value>, calls: &Calls) -> DataSource {
    let calls = Rc::clone(calls);
    let rows = Rc::new(rows);
    DataSource::loader(move |params: Value| {
        calls.borrow_mut().push(params.clone());
        let rows = Rc::clone(&rows);
        async move {
            let page = params["page"].as_u64().unwrap_or(1) as usize;
            let size = params["size"].as_u64().unwrap_or(10) as usize;
            let data = rows.iter().skip((page - 1) * size).take(size).cloned().collect();
            Ok::<_, BoxError>((data, rows.len() as u64))
        }
    })
    .load_on(LoadOn::Never)
}

fn ids(n: u64) -> Vec<Value> {
    (1..=n).map(|id| json!({ "id": id })).collect()
}

fn paged_table(paging: UsePaging, calls: &Calls) -> Table {
    create_table(TableOptions {
        data: Some(paged(ids(2), calls)),
        paging: Some(paging),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn loads_carry_and_record_the_current_page() {
    let calls = Calls::default();
    let table = paged_table(UsePaging::new().page_size(1), &calls);

    table.load(json!({})).await;
    assert_eq!(calls.borrow()[0], json!({ "page": 1, "size": 1 }));
    assert_eq!(table.get_data(), vec![json!({ "id": 1 })]);
    assert_eq!(table.paging().unwrap().current, 1);

    table.load(json!({ "page": 2 })).await;
    assert_eq!(calls.borrow()[1], json!({ "page": 2, "size": 1 }));
    assert_eq!(table.get_data(), vec![json!({ "id": 2 })]);
    assert_eq!(table.paging().unwrap().current, 2);
}

#[tokio::test]
async fn page_results_report_the_total() {
    let calls = Calls::default();
    let table = paged_table(UsePaging::new().page_size(1), &calls);

    table.reload().await;
    let paging = table.paging().unwrap();
    assert_eq!(paging.total, 2);
    assert_eq!(paging.page_size, 1);
    assert!(paging.show_total);
}

#[tokio::test]
async fn reload_stays_on_the_current_page() {
    let calls = Calls::default();
    let table = paged_table(UsePaging::new().page_size(1), &calls);

    table.load(json!({ "page": 2 })).await;
    table.reload().await;
    assert_eq!(calls.borrow()[1]["page"], json!(2));
}

#[tokio::test]
async fn pager_events_drive_navigation() {
    let calls = Calls::default();
    let table = create_table(TableOptions {
        data: Some(paged(ids(45), &calls)),
        paging: Some(UsePaging::new()),
        ..Default::default()
    })
    .unwrap();
    let host = TestHost::setup(table.clone()).unwrap();

    host.emit("Table", "pageChange", &[json!(3)]).await;
    assert_eq!(calls.borrow().last(), Some(&json!({ "page": 3, "size": 10 })));
    assert_eq!(table.get_data().first(), Some(&json!({ "id": 21 })));
    host.assert_state_path("paging.current", 3)
        .assert_state_path("paging.total", 45);

    host.emit("Table", "pageSizeChange", &[json!(20)]).await;
    assert_eq!(calls.borrow().last(), Some(&json!({ "page": 1, "size": 20 })));
    host.assert_state_path("paging.current", 1)
        .assert_state_path("paging.pageSize", 20);

    let pagination = host.find("Table").prop("pagination").cloned().unwrap();
    assert_eq!(pagination["current"], json!(1));
    assert_eq!(pagination["pageSize"], json!(20));
}

#[tokio::test]
async fn page_keys_are_configurable() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&calls);
    let table = create_table(TableOptions {
        data: Some(
            DataSource::loader(move |params: Value| {
                recorded.borrow_mut().push(params);
                async { Ok::<_, BoxError>(Vec::new()) }
            })
            .load_on(LoadOn::Never),
        ),
        paging: Some(UsePaging::new().keys("pageNo", "pageSize").current(2)),
        ..Default::default()
    })
    .unwrap();

    table.reload().await;
    assert_eq!(calls.borrow()[0], json!({ "pageNo": 2, "pageSize": 10 }));

    table.change_page(4).await;
    assert_eq!(calls.borrow()[1], json!({ "pageNo": 4, "pageSize": 10 }));
}

#[test]
fn pager_can_be_switched_off_and_on() {
    let off = Signal::new(true);
    let table = create_table(TableOptions {
        paging: Some(UsePaging::new().disable(off.clone())),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(table.pagination(), json!(false));
    assert!(table.paging().is_some());

    off.set(false);
    assert_eq!(table.pagination()["pageSize"], json!(10));
}

#[test]
fn tables_without_paging_render_no_pager() {
    let table = create_table(TableOptions::default()).unwrap();
    assert!(matches!(table.try_paging(), Ok(None)));
    assert_eq!(table.paging(), None);
    assert_eq!(table.pagination(), json!(false));
}

#[test]
fn factory_config_sets_the_default_page_size() {
    let table = table_builder()
        .set_config(json!({ "paging": { "pageSize": 50 } }), MergeMode::Merge)
        .build()
        .create_with_options(TableOptions {
            paging: Some(UsePaging::new()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(
        table.paging(),
        Some(Paging {
            page_size: 50,
            ..Paging::default()
        })
    );
}

#[tokio::test]
async fn malformed_page_sizes_disable_injection() {
    let calls = Calls::default();
    let table = table_builder()
        .set_config(json!({ "paging": { "pageSize": "10" } }), MergeMode::Merge)
        .build()
        .create_with_options(TableOptions {
            data: Some(paged(ids(2), &calls)),
            paging: Some(UsePaging::new()),
            ..Default::default()
        })
        .unwrap();

    assert!(table.try_paging().is_err());
    assert_eq!(table.paging(), None);

    table.load(json!({})).await;
    assert_eq!(calls.borrow()[0], json!({}));
    assert_eq!(table.get_data().len(), 2);
}

#[tokio::test]
async fn failed_loads_keep_the_page() {
    let table = create_table(TableOptions {
        data: Some(
            DataSource::loader(|_| async { Err::<Vec<Value>, BoxError>("offline".into()) })
                .load_on(LoadOn::Never),
        ),
        paging: Some(UsePaging::new()),
        ..Default::default()
    })
    .unwrap();

    table.change_page(5).await;
    assert_eq!(table.paging().unwrap().current, 1);
}
