use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anvil_core::{Flag, Node, Signal};
use anvil_table::{create_table, Table, TableOptions, ToolbarItem, ToolbarPosition, UseToolbarItem};
use anvil_test::TestHost;
use serde_json::{json, Value};

fn table_with_toolbar(toolbar: Vec<UseToolbarItem>) -> Table {
    create_table(TableOptions {
        toolbar,
        ..Default::default()
    })
    .unwrap()
}

fn is_toolbar(node: &anvil_core::Element) -> bool {
    node.tag == "div" && node.prop("class") == Some(&json!("an-table-toolbar"))
}

// ── Layout ─────────────────────────────────────────────────────────────────

#[test]
fn items_are_ordered_around_the_spacer() {
    let table = table_with_toolbar(vec![
        UseToolbarItem::button("导出").position(ToolbarPosition::Right),
        UseToolbarItem::button("刷新").position(ToolbarPosition::Left),
        UseToolbarItem::button("导入").order(10),
        UseToolbarItem::button("打印"),
    ]);

    let keys: Vec<Option<String>> = table
        .toolbar_items()
        .iter()
        .map(|item| item.is_spacer().then(|| ToolbarItem::SPACER.to_string()).or(item.text.clone()))
        .collect();
    assert_eq!(
        keys,
        vec![
            Some("导入".to_string()),
            Some("刷新".to_string()),
            Some("打印".to_string()),
            Some("spacer".to_string()),
            Some("导出".to_string()),
        ]
    );

    let host = TestHost::setup(table).unwrap();
    let buttons: Vec<String> = host.find_all("Button").iter().map(|b| b.text()).collect();
    assert_eq!(buttons, vec!["导入", "刷新", "打印", "导出"]);
}

#[test]
fn toolbar_renders_before_the_table() {
    let table = table_with_toolbar(vec![UseToolbarItem::button("刷新").key("refresh")]);
    let host = TestHost::setup(table).unwrap();

    let root = host.render();
    let root = root.as_element().expect("element root");
    let keys: Vec<Option<&str>> = root
        .children
        .iter()
        .filter_map(Node::as_element)
        .map(|child| child.key.as_deref())
        .collect();
    assert_eq!(keys, vec![Some("toolbar"), Some("table"), Some("confirms")]);
    assert_eq!(host.find_keyed("Button", "refresh").text(), "刷新");
}

#[test]
fn empty_toolbars_are_not_rendered() {
    let host = TestHost::setup(table_with_toolbar(vec![])).unwrap();
    assert!(host.render().find(is_toolbar).is_none());

    let hidden = table_with_toolbar(vec![UseToolbarItem::button("刷新").visible(false)]);
    let host = TestHost::setup(hidden).unwrap();
    assert!(host.render().find(is_toolbar).is_none());
}

#[test]
fn item_switches_follow_their_cells() {
    let busy = Signal::new(true);
    let table = table_with_toolbar(vec![
        UseToolbarItem::button("保存").disable(busy.clone()),
        UseToolbarItem::button("帮助")
            .visible(Flag::when(|item: &ToolbarItem, _: &()| item.order < 50))
            .order(80),
    ]);
    let host = TestHost::setup(table).unwrap();

    assert_eq!(host.button("保存").prop("disabled"), Some(&json!(true)));
    assert!(host.find_all("Button").iter().all(|b| b.text() != "帮助"));

    busy.set(false);
    assert_eq!(host.button("保存").prop("disabled"), Some(&json!(false)));
}

#[tokio::test]
async fn buttons_run_their_click_with_the_table() {
    let clicks = Rc::new(Cell::new(0));
    let counter = Rc::clone(&clicks);
    let table = table_with_toolbar(vec![UseToolbarItem::button("刷新")
        .icon("IconRefresh")
        .props(json!({ "type": "outline" }))
        .on_click(move |table: &Table| {
            counter.set(counter.get() + table.get_data().len() + 1);
            async {}
        })]);
    table.set_data(vec![json!({ "id": 1 })]);
    let host = TestHost::setup(table).unwrap();

    let button = host.button("刷新");
    assert_eq!(button.prop("type"), Some(&json!("outline")));
    assert!(button.slot("icon").is_some());

    host.click("刷新").await;
    assert_eq!(clicks.get(), 2);
}

// ── Selection ──────────────────────────────────────────────────────────────

fn rows() -> Vec<Value> {
    vec![json!({ "id": 1 }), json!({ "id": 2 }), json!({ "id": 3 })]
}

type Picked = Rc<RefCell<Vec<(Vec<Value>, Vec<Value>)>>>;

fn selecting_table(picked: &Picked) -> Table {
    let picked = Rc::clone(picked);
    let table = table_with_toolbar(vec![UseToolbarItem::button("批量删除")
        .on_select(move |keys, rows| picked.borrow_mut().push((keys, rows)))]);
    table.set_data(rows());
    table
}

#[tokio::test]
async fn selecting_items_receive_the_selection() {
    let picked = Picked::default();
    let host = TestHost::setup(selecting_table(&picked)).unwrap();

    let rendered = host.find("Table");
    assert_eq!(
        rendered.prop("rowSelection"),
        Some(&json!({ "type": "checkbox", "showCheckedAll": true }))
    );
    assert_eq!(rendered.prop("selectedKeys"), Some(&json!([])));

    host.emit("Table", "select", &[json!([3]), json!(3), json!({ "id": 3 })])
        .await;
    host.emit("Table", "select", &[json!([3, 1]), json!(1), json!({ "id": 1 })])
        .await;
    host.click("批量删除").await;
    assert_eq!(
        picked.borrow()[0],
        (vec![json!(3), json!(1)], vec![json!({ "id": 3 }), json!({ "id": 1 })])
    );

    host.emit("Table", "select", &[json!([1]), json!(3), json!({ "id": 3 })])
        .await;
    assert_eq!(host.find("Table").prop("selectedKeys"), Some(&json!([1])));
}

#[tokio::test]
async fn select_all_and_selection_change_rewrite_the_selection() {
    let picked = Picked::default();
    let table = selecting_table(&picked);
    let host = TestHost::setup(table.clone()).unwrap();

    host.emit("Table", "selectAll", &[json!(true)]).await;
    assert_eq!(table.get_selected_row_keys(), vec![json!(1), json!(2), json!(3)]);

    host.emit("Table", "selectionChange", &[json!([2, 3])]).await;
    assert_eq!(table.get_selected_rows(), vec![json!({ "id": 2 }), json!({ "id": 3 })]);

    host.emit("Table", "selectAll", &[json!(false)]).await;
    assert!(table.get_selected_row_keys().is_empty());
}

#[tokio::test]
async fn replacing_rows_clears_the_selection() {
    let picked = Picked::default();
    let table = selecting_table(&picked);
    let host = TestHost::setup(table.clone()).unwrap();

    host.emit("Table", "selectAll", &[json!(true)]).await;
    table.set_data(vec![json!({ "id": 4 })]);
    assert!(table.get_selected_row_keys().is_empty());
}

#[tokio::test]
async fn selection_can_survive_row_changes() {
    let table = create_table(TableOptions {
        config: json!({ "clearSelectedOnChange": false }),
        table_props: json!({ "rowSelection": { "type": "radio" } }),
        ..Default::default()
    })
    .unwrap();
    table.set_data(rows());
    let host = TestHost::setup(table.clone()).unwrap();

    assert_eq!(
        host.find("Table").prop("rowSelection"),
        Some(&json!({ "type": "radio", "showCheckedAll": true }))
    );

    host.emit("Table", "selectionChange", &[json!([2])]).await;
    table.set_data(vec![json!({ "id": 2 })]);
    assert_eq!(table.get_selected_row_keys(), vec![json!(2)]);

    table.clear_selected();
    assert!(table.get_selected_rows().is_empty());
}

#[test]
fn tables_without_selection_have_no_select_handlers() {
    let host = TestHost::setup(table_with_toolbar(vec![])).unwrap();
    let rendered = host.find("Table");
    assert!(!rendered.has_handler("select"));
    assert_eq!(rendered.prop("selectedKeys"), None);
}

#[tokio::test]
async fn caller_table_handlers_still_fire() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let table = create_table(TableOptions {
        table_props: json!({ "rowSelection": {} }),
        table_events: [(
            "select".to_string(),
            anvil_core::sync_handler(move |args| log.borrow_mut().push(args[1].clone())),
        )]
        .into(),
        ..Default::default()
    })
    .unwrap();
    table.set_data(rows());
    let host = TestHost::setup(table.clone()).unwrap();

    host.emit("Table", "select", &[json!([2]), json!(2), json!({ "id": 2 })])
        .await;
    assert_eq!(*seen.borrow(), vec![json!(2)]);
    assert_eq!(table.get_selected_row_keys(), vec![json!(2)]);
}
