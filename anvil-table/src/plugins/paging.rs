//! Pager state and page navigation.
//!
//! The pager lives under `state.paging`. Every load gets the current page
//! and size unless the caller passed them; a successful load writes the
//! requested page, size and the reported total back.

use anvil_core::{
    defaults_deep, handler, Engine, Flag, Handler, HookResult, MergeMode, Plugin, Task,
};
use futures_util::FutureExt;
use serde_json::{json, Map, Value};

use crate::table::{LoadReport, Table, TableOptions, TablePlugin, WeakTable};

/// The pager's `disable` switch, kept in `shared`.
#[derive(Clone)]
pub struct PagingSwitch(pub Flag<()>);

pub struct PagingPlugin;

impl Plugin<Table> for PagingPlugin {
    fn name(&self) -> &str {
        "paging"
    }

    fn on_options(&self, table: &Table, options: &mut TableOptions) -> HookResult {
        let Some(paging) = options.paging.take() else {
            return Ok(());
        };

        let mut props = paging.props;
        defaults_deep(&mut props, table.config().section("paging"));
        table.set_state(json!({ "paging": props }), MergeMode::Merge);
        table
            .shared()
            .insert(PagingSwitch(paging.disable.unwrap_or(Flag::Value(false))));

        let weak = table.downgrade();
        table.add_handler("pageChange", page_handler(weak.clone(), false));
        table.add_handler("pageSizeChange", page_handler(weak, true));
        Ok(())
    }
}

impl TablePlugin for PagingPlugin {
    fn on_load_before(&self, table: &Table, params: &mut Value) -> HookResult {
        let (Some(paging), Value::Object(params)) = (table.paging(), params) else {
            return Ok(());
        };
        for (key, value) in [(paging.page_key, paging.current), (paging.size_key, paging.page_size)] {
            if params.get(&key).map_or(true, Value::is_null) {
                params.insert(key, json!(value));
            }
        }
        Ok(())
    }

    fn on_load_after(&self, table: &Table, report: &LoadReport) -> HookResult {
        let Some(paging) = table.paging() else {
            return Ok(());
        };
        if report.error.is_some() {
            return Ok(());
        }

        let positive = |key: &str| report.params.get(key).and_then(Value::as_u64).filter(|n| *n > 0);
        let mut patch = Map::new();
        if let Some(current) = positive(&paging.page_key) {
            patch.insert("current".to_string(), json!(current));
        }
        if let Some(size) = positive(&paging.size_key) {
            patch.insert("pageSize".to_string(), json!(size));
        }
        if let Some(total) = report.result.as_ref().and_then(|result| result.total()) {
            patch.insert("total".to_string(), json!(total));
        }
        table.set_state(json!({ "paging": patch }), MergeMode::Merge);
        Ok(())
    }

    fn on_page_change(&self, table: &Table, page: u64) -> Option<Task> {
        let paging = table.paging()?;
        let mut params = Map::new();
        params.insert(paging.page_key, json!(page));
        let table = table.clone();
        Some(async move { table.load(Value::Object(params)).await }.boxed_local())
    }

    fn on_page_size_change(&self, table: &Table, size: u64) -> Option<Task> {
        let paging = table.paging()?;
        let mut params = Map::new();
        params.insert(paging.page_key, json!(1));
        params.insert(paging.size_key, json!(size));
        let table = table.clone();
        Some(async move { table.load(Value::Object(params)).await }.boxed_local())
    }
}

/// `Table` element handler forwarding the first event argument as a page
/// number, or as a page size when `size` is set.
fn page_handler(table: WeakTable, size: bool) -> Handler {
    handler(move |args| {
        let table = table.upgrade();
        async move {
            let (Some(table), Some(value)) = (table, args.first().and_then(Value::as_u64)) else {
                return;
            };
            if size {
                table.change_page_size(value).await;
            } else {
                table.change_page(value).await;
            }
        }
    })
}
