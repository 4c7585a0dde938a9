//! Row selection.
//!
//! Enabled when a toolbar item has `on_select` or the caller configured
//! `tableProps.rowSelection`. The selection is kept in selection order and
//! cleared whenever the rows are replaced, unless `clearSelectedOnChange` is
//! `false`.

use std::rc::Rc;

use anvil_core::{sync_handler, Engine, Handler, HookResult, MergeMode, Plugin};
use futures_util::future::{self, FutureExt};
use serde_json::{json, Value};

use crate::table::{Table, TablePlugin, WeakTable};
use crate::toolbar::{ToolbarItem, UseToolbarItem};

/// Marker left in `shared` by toolbar items that consume the selection.
struct SelectionWanted;

pub struct SelectPlugin;

impl Plugin<Table> for SelectPlugin {
    fn name(&self) -> &str {
        "select"
    }

    fn on_options_after(&self, table: &Table) -> HookResult {
        let wanted = table.shared().contains::<SelectionWanted>();
        let configured = table.state().with(|state| {
            state
                .pointer("/tableProps/rowSelection")
                .is_some_and(|selection| !selection.is_null())
        });
        if !wanted && !configured {
            return Ok(());
        }

        let defaults = table.config().section("rowSelection").clone();
        table.set_state(
            json!({ "tableProps": { "rowSelection": defaults } }),
            MergeMode::Defaults,
        );

        let weak = table.downgrade();
        table.add_handler("select", select_handler(weak.clone()));
        table.add_handler("selectAll", select_all_handler(weak.clone()));
        table.add_handler("selectionChange", selection_change_handler(weak.clone()));

        if table.config().get_or("clearSelectedOnChange", true) {
            table.data().subscribe(move || {
                if let Some(table) = weak.upgrade() {
                    table.clear_selected();
                }
            });
        }
        tracing::debug!(table = %table.id(), "row selection enabled");
        Ok(())
    }
}

impl TablePlugin for SelectPlugin {
    fn on_options_toolbar_item(
        &self,
        table: &Table,
        item: &UseToolbarItem,
        target: &mut ToolbarItem,
    ) -> HookResult {
        let Some(on_select) = item.on_select.clone() else {
            return Ok(());
        };
        table.shared().insert(SelectionWanted);
        target.on_click = Some(Rc::new(move |table: &Table| {
            on_select(table.get_selected_row_keys(), table.get_selected_rows());
            future::ready(()).boxed_local()
        }));
        Ok(())
    }
}

/// `select(rowKeys, rowKey, record)`: toggle one row.
fn select_handler(table: WeakTable) -> Handler {
    sync_handler(move |args| {
        let Some(table) = table.upgrade() else { return };
        let (Some(keys), Some(key)) = (args.first().and_then(Value::as_array), args.get(1)) else {
            return;
        };
        let record = args.get(2).cloned().unwrap_or(Value::Null);
        let checked = keys.contains(key);
        table.selection().update(|selection| {
            if checked {
                selection.insert(key.clone(), record);
            } else {
                selection.remove(key);
            }
        });
    })
}

/// `selectAll(checked)`: add or remove every current row.
fn select_all_handler(table: WeakTable) -> Handler {
    sync_handler(move |args| {
        let Some(table) = table.upgrade() else { return };
        let checked = args.first().and_then(Value::as_bool).unwrap_or(false);
        let rows: Vec<(Value, Value)> = table
            .get_data()
            .into_iter()
            .map(|row| (table.key_of(&row), row))
            .collect();
        table.selection().update(|selection| {
            for (key, row) in rows {
                if checked {
                    selection.insert(key, row);
                } else {
                    selection.remove(&key);
                }
            }
        });
    })
}

/// `selectionChange(rowKeys)`: keep exactly the given keys, picking rows for
/// new keys from the current data.
fn selection_change_handler(table: WeakTable) -> Handler {
    sync_handler(move |args| {
        let Some(table) = table.upgrade() else { return };
        let Some(keys) = args.first().and_then(Value::as_array) else {
            return;
        };
        let rows = table.get_data();
        table.selection().update(|selection| {
            selection.retain(|key| keys.contains(key));
            for key in keys {
                if selection.contains(key) {
                    continue;
                }
                if let Some(row) = rows.iter().find(|row| table.key_of(row) == *key) {
                    selection.insert(key.clone(), row.clone());
                }
            }
        });
    })
}
