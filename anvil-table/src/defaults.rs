//! Default table factory.
//!
//! Mirrors the form crate: [`table_builder`] starts from the built-in plugins
//! and configuration, [`create_table`] / [`create_table_with`] use a
//! per-thread factory built from it.

use std::rc::Rc;

use anvil_core::{EngineBuilder, EngineError, Factory, MaybeFn, MergeMode};
use serde_json::{json, Value};

use crate::plugins::{
    ActionPlugin, CreatePlugin, DeletePlugin, PagingPlugin, SearchPlugin, SelectPlugin, TableBase,
    ToolbarPlugin, UpdatePlugin,
};
use crate::table::{Table, TableOptions, TablePlugin};

thread_local! {
    static DEFAULT_FACTORY: Factory<Table> = table_builder().build();
}

/// Built-in plugins in dispatch order.
pub fn default_plugins() -> Vec<Rc<dyn TablePlugin>> {
    let plugins: [Rc<dyn TablePlugin>; 9] = [
        Rc::new(TableBase),
        Rc::new(PagingPlugin),
        Rc::new(ToolbarPlugin),
        Rc::new(SearchPlugin),
        Rc::new(CreatePlugin),
        Rc::new(UpdatePlugin),
        Rc::new(ActionPlugin),
        Rc::new(DeletePlugin),
        Rc::new(SelectPlugin),
    ];
    plugins.into()
}

/// Built-in configuration.
pub fn default_config() -> Value {
    json!({
        "clearSelectedOnChange": true,
        "data": { "loadOn": "mounted", "showLoading": true },
        "tableProps": { "rowKey": "id", "bordered": false },
        "column": { "props": {} },
        "rowSelection": { "type": "checkbox", "showCheckedAll": true },
        "paging": {
            "pageKey": "page",
            "sizeKey": "size",
            "current": 1,
            "pageSize": 10,
            "showTotal": true,
        },
        "toolbar": {
            "order": 25,
            "leftOrder": 25,
            "rightOrder": 75,
            "spacerOrder": 50,
            "itemProps": {},
        },
        "search": {
            "autoSubmitItem": true,
            "labelAsPlaceholder": true,
            "orderInToolbar": 75,
            "searchText": "搜索",
            "formProps": { "layout": "inline" },
            "item": { "itemProps": { "hideLabel": true } },
        },
        "create": {
            "showInToolbar": true,
            "orderInToolbar": 0,
            "triggerText": "新增",
            "modal": { "title": "新增" },
        },
        "update": { "modal": { "title": "修改" } },
        "actionConfirm": {
            "title": "提示",
            "content": "确定执行该操作吗?",
            "titleAlign": "start",
            "width": 380,
            "closable": false,
            "maskClosable": false,
        },
        "deleteConfirm": {
            "title": "提示",
            "content": "确定删除吗?",
            "titleAlign": "start",
            "width": 360,
            "closable": false,
            "maskClosable": false,
            "okButtonProps": { "status": "danger" },
        },
    })
}

/// A builder preloaded with the built-in plugins and configuration.
pub fn table_builder() -> EngineBuilder<Table> {
    EngineBuilder::new("AnTable")
        .set_config(default_config(), MergeMode::Merge)
        .use_plugins(default_plugins())
}

/// Create a table with the default factory.
pub fn create_table(options: TableOptions) -> Result<Table, EngineError> {
    DEFAULT_FACTORY.with(|factory| factory.create_with_options(options))
}

/// Create a table from an options factory called with the new handle.
pub fn create_table_with(
    options: impl FnOnce(&Table) -> TableOptions + 'static,
) -> Result<Table, EngineError> {
    DEFAULT_FACTORY.with(|factory| factory.create(MaybeFn::from_fn(options)))
}
