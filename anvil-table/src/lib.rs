//! Table engine for Anvil.
//!
//! A table is declared as [`TableOptions`]: a data source, columns with row
//! actions, an optional pager, toolbar items and nested search, create and
//! update forms. The [`Table`] handle loads data, tracks the selection and
//! queues confirmation dialogs.
//!
//! ```ignore
//! let table = create_table(TableOptions {
//!     data: Some(DataSource::loader(|params| async move { fetch_users(params).await })),
//!     columns: vec![
//!         UseTableColumn::new("name").title("姓名"),
//!         UseTableColumn::new("action")
//!             .title("操作")
//!             .action(UseColumnAction::new("删除").on_delete().on_click(|arg| {
//!                 let id = arg.record["id"].clone();
//!                 async move { remove_user(id).await }
//!             })),
//!     ],
//!     paging: Some(UsePaging::new().page_size(20)),
//!     search: Some(vec![UseFormItem::new("name").label("姓名")].into()),
//!     ..Default::default()
//! })?;
//! ```

pub mod column;
pub mod defaults;
pub mod error;
pub mod plugins;
pub mod table;
pub mod toolbar;

pub use column::{
    ActionArg, ActionClick, ActionFlag, CellArg, CellSlot, ColumnAction, ColumnFlag, Confirm,
    TableColumn, UseColumnAction, UseTableColumn,
};
pub use defaults::{create_table, create_table_with, default_config, default_plugins, table_builder};
pub use error::{LoadError, TableError};
pub use table::{
    DataSource, LoadOverride, LoadReport, LoadResult, LoadState, Loader, Paging, PendingConfirm,
    SearchSpec, Selection, Table, TableOptions, TablePlugin, TableRef, UsePaging, WeakTable,
    ON_LOAD, ON_LOAD_AFTER, ON_LOAD_BEFORE, ON_OPTIONS_COLUMN, ON_OPTIONS_COLUMN_ACTION,
    ON_OPTIONS_COLUMN_AFTER, ON_OPTIONS_TOOLBAR_ITEM, ON_PAGE_CHANGE, ON_PAGE_SIZE_CHANGE,
};
pub use toolbar::{
    render_button, SelectFn, ToolbarClick, ToolbarFlag, ToolbarItem, ToolbarPosition,
    ToolbarRender, UseToolbarItem,
};
