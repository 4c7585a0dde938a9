use std::mem::take;
use std::rc::Rc;

use anvil_core::{
    defaults_deep, handler, render_slots, Child, Engine, Handler, HookResult, LoadOn, MergeMode,
    Node, Plugin, SetupContext, Slots,
};
use serde_json::{json, Value};

use crate::column::{CellArg, TableColumn};
use crate::table::{
    DataSpec, Table, TableOptions, TablePlugin, ON_OPTIONS_COLUMN, ON_OPTIONS_COLUMN_AFTER,
};

/// Caller slots of the `Table` element, kept in `shared`.
#[derive(Clone, Default)]
pub struct TableSlots(pub Slots<Table>);

/// Owns the data source, parses columns and renders the `Table` element and
/// the confirmation dialogs.
pub struct TableBase;

impl Plugin<Table> for TableBase {
    fn name(&self) -> &str {
        "table"
    }

    fn on_init(&self, table: &Table) -> HookResult {
        table.set_state(json!({ "tableProps": {} }), MergeMode::Merge);
        Ok(())
    }

    fn on_options(&self, table: &Table, options: &mut TableOptions) -> HookResult {
        let config = table.config();

        let mut table_props = take(&mut options.table_props);
        defaults_deep(&mut table_props, config.section("tableProps"));
        table.set_state(json!({ "tableProps": table_props }), MergeMode::Merge);
        table.shared().insert(TableSlots(take(&mut options.table_slots)));
        for (event, handler) in take(&mut options.table_events) {
            table.add_handler(event, handler);
        }

        let source = options.data.take().unwrap_or_default();
        table.set_data_spec(DataSpec {
            load: source.load,
            load_on: source
                .load_on
                .unwrap_or_else(|| config.get("data.loadOn").unwrap_or_default()),
            show_loading: source
                .show_loading
                .unwrap_or_else(|| config.get_or("data.showLoading", true)),
        });

        let core = table.core();
        let column_defaults = config.section("column");
        let mut columns = Vec::with_capacity(options.columns.len());
        for mut declared in take(&mut options.columns) {
            declared.apply_defaults(column_defaults);
            let mut column = TableColumn::new(&declared);
            core.call_each(ON_OPTIONS_COLUMN, |p| {
                p.on_options_column(table, &declared, &mut column)
            })?;
            core.call_each(ON_OPTIONS_COLUMN_AFTER, |p| {
                p.on_options_column_after(table, &mut column)
            })?;
            columns.push(Rc::new(column));
        }
        tracing::debug!(table = %table.id(), columns = columns.len(), "table columns parsed");
        table.set_columns(columns);

        table.add_child(Child::new(render_table).with_key("table"));
        table.add_child(Child::new(render_confirms).with_key("confirms").with_order(100));
        Ok(())
    }

    fn on_setup(&self, table: &Table, ctx: &mut SetupContext) -> HookResult {
        let table = table.clone();
        match table.data_spec().load_on {
            LoadOn::Setup => ctx.spawn(async move { table.load(json!({})).await }),
            LoadOn::Mounted => ctx.on_mounted(move || async move { table.load(json!({})).await }),
            LoadOn::Never => {}
        }
        Ok(())
    }
}

impl TablePlugin for TableBase {}

fn render_table(table: &Table) -> Node {
    let rows = table.get_data();
    let columns = table.visible_columns();
    let slots = table.shared().get::<TableSlots>().cloned().unwrap_or_default();
    let props = table.table_props();
    let selectable = props.get("rowSelection").is_some_and(|s| !s.is_null());

    let descriptors: Vec<Value> = columns.iter().map(|column| column.descriptor()).collect();
    let mut node = Node::element("Table")
        .props(props)
        .prop("data", rows.clone())
        .prop("columns", descriptors)
        .prop("pagination", table.pagination())
        .slots(render_slots(&slots.0, table))
        .children(columns.iter().map(|column| render_column(table, column, &rows)));
    if selectable {
        node = node.prop("selectedKeys", table.get_selected_row_keys());
    }
    for (event, handler) in table.handlers() {
        node = node.on(event, handler);
    }
    node
}

fn render_column(table: &Table, column: &Rc<TableColumn>, rows: &[Value]) -> Node {
    let cells = match &column.render {
        Some(render) => rows
            .iter()
            .enumerate()
            .map(|(row_index, record)| {
                let arg = CellArg {
                    table: table.clone(),
                    column: Rc::clone(column),
                    record: record.clone(),
                    row_index,
                };
                Node::element("TableCell")
                    .prop("rowIndex", row_index)
                    .child(render(&arg))
            })
            .collect(),
        None => Vec::new(),
    };
    Node::element("TableColumn")
        .key(column.key.clone())
        .props(column.descriptor())
        .children(cells)
}

fn render_confirms(table: &Table) -> Node {
    Node::fragment(table.pending_confirms().into_iter().map(|confirm| {
        Node::element("Modal")
            .key(format!("confirm-{}", confirm.id))
            .props(confirm.props)
            .prop("visible", true)
            .on("ok", resolve_handler(table, confirm.id, true))
            .on("cancel", resolve_handler(table, confirm.id, false))
    }))
}

fn resolve_handler(table: &Table, id: u64, accepted: bool) -> Handler {
    let table = table.downgrade();
    handler(move |_| {
        let table = table.upgrade();
        async move {
            let Some(table) = table else { return };
            if let Err(err) = table.resolve_confirm(id, accepted).await {
                tracing::debug!(error = %err, "confirmation already closed");
            }
        }
    })
}
