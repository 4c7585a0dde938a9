use std::rc::Rc;

use anvil_core::{defaults_deep, Engine, HookResult, Plugin};
use futures_util::future::{self, FutureExt};
use serde_json::json;

use crate::column::{ActionArg, TableColumn};
use crate::table::{Table, TablePlugin};

/// Gates `on_delete` actions behind the `deleteConfirm` dialog.
///
/// Wraps the action's `on_click`, so an action that also has its own
/// `confirm` shows both dialogs, its own first.
pub struct DeletePlugin;

impl Plugin<Table> for DeletePlugin {
    fn name(&self) -> &str {
        "delete"
    }
}

impl TablePlugin for DeletePlugin {
    fn on_options_column_after(&self, table: &Table, column: &mut TableColumn) -> HookResult {
        let props = table.config().section("deleteConfirm").clone();
        for action in column.actions.iter_mut().filter(|action| action.on_delete) {
            defaults_deep(&mut action.props, &json!({ "status": "danger" }));
            let inner = action.on_click.take();
            let props = props.clone();
            action.on_click = Some(Rc::new(move |arg: &ActionArg| {
                let (pending, inner) = (arg.clone(), inner.clone());
                arg.table.confirm(props.clone(), move || match &inner {
                    Some(click) => click(&pending),
                    None => future::ready(()).boxed_local(),
                });
                future::ready(()).boxed_local()
            }));
        }
        Ok(())
    }
}
