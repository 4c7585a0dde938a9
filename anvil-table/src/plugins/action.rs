//! Row actions rendered as links inside their column's cells.
//!
//! An action with `confirm` gets a click gate: clicking queues a
//! confirmation on the table and the action's `on_click` runs once it is
//! accepted.

use std::rc::Rc;

use anvil_core::{defaults_deep, handler, Engine, HookResult, Node, Plugin};
use futures_util::future::{self, FutureExt};
use serde_json::Value;

use crate::column::{ActionArg, ActionClick, CellArg, ColumnAction, TableColumn, UseTableColumn};
use crate::table::{Table, TablePlugin, ON_OPTIONS_COLUMN_ACTION};

pub struct ActionPlugin;

impl Plugin<Table> for ActionPlugin {
    fn name(&self) -> &str {
        "action"
    }
}

impl TablePlugin for ActionPlugin {
    fn on_options_column(
        &self,
        table: &Table,
        column: &UseTableColumn,
        target: &mut TableColumn,
    ) -> HookResult {
        if column.actions.is_empty() {
            return Ok(());
        }
        let confirm_defaults = table.config().section("actionConfirm");
        for declared in &column.actions {
            let mut action = ColumnAction::new(declared);
            if let Some(props) = action.confirm.as_mut() {
                defaults_deep(props, confirm_defaults);
                action.click = Some(confirm_gate(props.clone()));
            }
            table.core().call_each(ON_OPTIONS_COLUMN_ACTION, |p| {
                p.on_options_column_action(table, declared, &mut action)
            })?;
            target.actions.push(action);
        }
        if target.render.is_none() {
            target.render = Some(Rc::new(render_actions));
        }
        Ok(())
    }
}

fn confirm_gate(props: Value) -> ActionClick {
    Rc::new(move |arg: &ActionArg| {
        let pending = arg.clone();
        arg.table
            .confirm(props.clone(), move || pending.action().run_on_click(&pending));
        future::ready(()).boxed_local()
    })
}

fn render_actions(cell: &CellArg) -> Node {
    Node::fragment((0..cell.column.actions.len()).filter_map(|index| {
        let arg = ActionArg {
            table: cell.table.clone(),
            column: Rc::clone(&cell.column),
            record: cell.record.clone(),
            row_index: cell.row_index,
            index,
        };
        if !arg.action().is_visible(&arg) {
            return None;
        }
        let custom = arg.action().render.clone();
        Some(match custom {
            Some(render) => render(&arg),
            None => render_link(arg),
        })
    }))
}

fn render_link(arg: ActionArg) -> Node {
    let action = arg.action();
    let mut link = Node::element("Link")
        .props(action.props.clone())
        .prop("disabled", action.is_disabled(&arg));
    if let Some(icon) = &action.icon {
        link = link.slot("icon", Node::element(icon.clone()));
    }
    if let Some(text) = &action.text {
        link = link.child(Node::text(text.clone()));
    }
    let clicked = arg.clone();
    link.on("click", handler(move |_| clicked.action().run(&clicked)))
}
