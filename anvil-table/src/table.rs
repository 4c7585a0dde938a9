//! The table engine.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

use anvil_core::{
    BoxError, Core, Engine, EngineOptions, Flag, Handler, HookResult, LoadOn, MergeMode, Plugin,
    Reserved, Signal, Slots, Task,
};
use anvil_form::{Form, FormOptions, UseFormItem};
use futures_util::future::{self, join_all, FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::column::{ColumnAction, TableColumn, UseColumnAction, UseTableColumn};
use crate::error::{LoadError, TableError};
use crate::plugins::create::CreateForm;
use crate::plugins::paging::PagingSwitch;
use crate::plugins::search::SearchForm;
use crate::plugins::update::UpdateForm;
use crate::toolbar::{ToolbarItem, UseToolbarItem};

// ── Hooks ──────────────────────────────────────────────────────────────────

pub const ON_OPTIONS_COLUMN: &str = "onOptionsColumn";
pub const ON_OPTIONS_COLUMN_AFTER: &str = "onOptionsColumnAfter";
pub const ON_OPTIONS_COLUMN_ACTION: &str = "onOptionsColumnAction";
pub const ON_OPTIONS_TOOLBAR_ITEM: &str = "onOptionsToolbarItem";
pub const ON_LOAD_BEFORE: &str = "onLoadBefore";
pub const ON_LOAD: &str = "onLoad";
pub const ON_LOAD_AFTER: &str = "onLoadAfter";
pub const ON_PAGE_CHANGE: &str = "onPageChange";
pub const ON_PAGE_SIZE_CHANGE: &str = "onPageSizeChange";

/// Result of an `onLoad` override: `None` to let the next plugin (and
/// finally the data source) handle the load.
pub type LoadOverride = LocalBoxFuture<'static, Option<Result<LoadResult, BoxError>>>;

/// Plugin of the table engine.
pub trait TablePlugin: Plugin<Table> {
    /// Runs once per declared column, after the column was parsed.
    fn on_options_column(
        &self,
        _table: &Table,
        _column: &UseTableColumn,
        _target: &mut TableColumn,
    ) -> HookResult {
        Ok(())
    }

    /// Runs once per column after every `onOptionsColumn` hook.
    fn on_options_column_after(&self, _table: &Table, _column: &mut TableColumn) -> HookResult {
        Ok(())
    }

    /// Runs once per declared row action.
    fn on_options_column_action(
        &self,
        _table: &Table,
        _action: &UseColumnAction,
        _target: &mut ColumnAction,
    ) -> HookResult {
        Ok(())
    }

    /// Runs once per toolbar item, including items added by plugins.
    fn on_options_toolbar_item(
        &self,
        _table: &Table,
        _item: &UseToolbarItem,
        _target: &mut ToolbarItem,
    ) -> HookResult {
        Ok(())
    }

    /// Shape the load parameters.
    fn on_load_before(&self, _table: &Table, _params: &mut Value) -> HookResult {
        Ok(())
    }

    /// Claim a load. The first plugin resolving to `Some` replaces the data
    /// source for this call.
    fn on_load(&self, _table: &Table, _params: &Value) -> LoadOverride {
        future::ready(None).boxed_local()
    }

    fn on_load_after(&self, _table: &Table, _report: &LoadReport) -> HookResult {
        Ok(())
    }

    fn on_page_change(&self, _table: &Table, _page: u64) -> Option<Task> {
        None
    }

    fn on_page_size_change(&self, _table: &Table, _size: u64) -> Option<Task> {
        None
    }
}

// ── Data ───────────────────────────────────────────────────────────────────

/// What a loader produces: plain rows, or one page of rows and the total.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    Rows(Vec<Value>),
    Page { data: Vec<Value>, total: u64 },
}

impl LoadResult {
    pub fn rows(&self) -> &[Value] {
        match self {
            LoadResult::Rows(rows) => rows,
            LoadResult::Page { data, .. } => data,
        }
    }

    pub fn total(&self) -> Option<u64> {
        match self {
            LoadResult::Rows(_) => None,
            LoadResult::Page { total, .. } => Some(*total),
        }
    }

    /// Read a JSON result: a row array, or `{ "data": [...], "total": n }`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(rows) => Some(LoadResult::Rows(rows)),
            Value::Object(mut map) => {
                let total = map.get("total").and_then(Value::as_u64);
                match (map.remove("data"), total) {
                    (Some(Value::Array(data)), Some(total)) => Some(LoadResult::Page { data, total }),
                    (Some(Value::Array(data)), None) => Some(LoadResult::Rows(data)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl From<Vec<Value>> for LoadResult {
    fn from(rows: Vec<Value>) -> Self {
        LoadResult::Rows(rows)
    }
}

impl From<(Vec<Value>, u64)> for LoadResult {
    fn from((data, total): (Vec<Value>, u64)) -> Self {
        LoadResult::Page { data, total }
    }
}

/// Caller data loader: receives the load parameters.
pub type Loader = Rc<dyn Fn(Value) -> LocalBoxFuture<'static, Result<LoadResult, BoxError>>>;

/// Where the table takes its rows from.
#[derive(Clone, Default)]
pub struct DataSource {
    pub(crate) load: Option<Loader>,
    pub(crate) load_on: Option<LoadOn>,
    pub(crate) show_loading: Option<bool>,
}

impl DataSource {
    /// A fixed row list.
    pub fn rows(rows: Vec<Value>) -> Self {
        let rows = Rc::new(rows);
        Self {
            load: Some(Rc::new(move |_| {
                future::ready(Ok(LoadResult::Rows(rows.as_ref().clone()))).boxed_local()
            })),
            ..Self::default()
        }
    }

    /// Rows produced by an async loader.
    pub fn loader<F, Fut, R>(load: F) -> Self
    where
        F: Fn(Value) -> Fut + 'static,
        Fut: Future<Output = Result<R, BoxError>> + 'static,
        R: Into<LoadResult>,
    {
        Self {
            load: Some(Rc::new(move |params| {
                load(params).map(|result| result.map(Into::into)).boxed_local()
            })),
            ..Self::default()
        }
    }

    /// Override `data.loadOn`.
    pub fn load_on(mut self, load_on: LoadOn) -> Self {
        self.load_on = Some(load_on);
        self
    }

    /// Override `data.showLoading`.
    pub fn show_loading(mut self, show_loading: bool) -> Self {
        self.show_loading = Some(show_loading);
        self
    }
}

impl From<Vec<Value>> for DataSource {
    fn from(rows: Vec<Value>) -> Self {
        DataSource::rows(rows)
    }
}

/// Resolved data source.
#[derive(Clone, Default)]
pub(crate) struct DataSpec {
    pub(crate) load: Option<Loader>,
    pub(crate) load_on: LoadOn,
    pub(crate) show_loading: bool,
}

/// Outcome of one `load`, handed to `onLoadAfter`.
#[derive(Debug)]
pub struct LoadReport {
    pub result: Option<LoadResult>,
    pub error: Option<LoadError>,
    /// Parameters after `onLoadBefore`.
    pub params: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

// ── Paging ─────────────────────────────────────────────────────────────────

/// Pager state as kept under `state.paging`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paging {
    pub page_key: String,
    pub size_key: String,
    pub current: u64,
    pub page_size: u64,
    pub total: u64,
    pub show_total: bool,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page_key: "page".to_string(),
            size_key: "size".to_string(),
            current: 1,
            page_size: 10,
            total: 0,
            show_total: true,
        }
    }
}

/// Pager options. Props missing here come from `config.paging`.
#[derive(Clone, Default)]
pub struct UsePaging {
    pub props: Value,
    pub disable: Option<Flag<()>>,
}

impl UsePaging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(mut self, current: u64) -> Self {
        self.props["current"] = json!(current);
        self
    }

    pub fn page_size(mut self, page_size: u64) -> Self {
        self.props["pageSize"] = json!(page_size);
        self
    }

    /// Names of the page and size load parameters.
    pub fn keys(mut self, page_key: impl Into<String>, size_key: impl Into<String>) -> Self {
        self.props["pageKey"] = Value::String(page_key.into());
        self.props["sizeKey"] = Value::String(size_key.into());
        self
    }

    pub fn props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    /// Hide the pager while the switch is on, keeping its state.
    pub fn disable(mut self, disable: impl Into<Flag<()>>) -> Self {
        self.disable = Some(disable.into());
        self
    }
}

// ── Selection ──────────────────────────────────────────────────────────────

/// Selected rows in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    entries: Vec<(Value, Value)>,
}

impl Selection {
    pub fn keys(&self) -> Vec<Value> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn rows(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, row)| row.clone()).collect()
    }

    pub fn contains(&self, key: &Value) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Add a row, or refresh the row of an already selected key.
    pub fn insert(&mut self, key: Value, row: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = row,
            None => self.entries.push((key, row)),
        }
    }

    pub fn remove(&mut self, key: &Value) {
        self.entries.retain(|(k, _)| k != key);
    }

    pub fn retain(&mut self, keep: impl Fn(&Value) -> bool) {
        self.entries.retain(|(k, _)| keep(k));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Options ────────────────────────────────────────────────────────────────

/// Search form declaration: bare items, or full form options.
pub enum SearchSpec {
    Items(Vec<UseFormItem>),
    Form(FormOptions),
}

impl From<Vec<UseFormItem>> for SearchSpec {
    fn from(items: Vec<UseFormItem>) -> Self {
        SearchSpec::Items(items)
    }
}

impl From<FormOptions> for SearchSpec {
    fn from(options: FormOptions) -> Self {
        SearchSpec::Form(options)
    }
}

#[derive(Default)]
pub struct TableOptions {
    pub name: Option<String>,
    pub config: Value,
    pub plugins: Vec<Rc<dyn TablePlugin>>,
    pub data: Option<DataSource>,
    pub columns: Vec<UseTableColumn>,
    pub paging: Option<UsePaging>,
    pub table_props: Value,
    pub table_slots: Slots<Table>,
    /// Caller handlers on the `Table` element. Plugin handlers for the same
    /// event run after them.
    pub table_events: BTreeMap<String, Handler>,
    pub toolbar: Vec<UseToolbarItem>,
    /// Shared field declarations; search, create and update items default
    /// from the entry with the same `field`.
    pub items: Vec<UseFormItem>,
    pub search: Option<SearchSpec>,
    pub create: Option<FormOptions>,
    pub update: Option<FormOptions>,
}

impl EngineOptions for TableOptions {
    type Plugin = dyn TablePlugin;

    fn take_reserved(&mut self) -> Reserved<dyn TablePlugin> {
        Reserved {
            name: self.name.take(),
            config: std::mem::take(&mut self.config),
            plugins: std::mem::take(&mut self.plugins),
        }
    }
}

/// Native handle of the rendered table widget.
pub trait TableRef {
    fn select_all(&self, _checked: bool) {}

    fn expand_all(&self, _expanded: bool) {}
}

// ── Confirmations ──────────────────────────────────────────────────────────

type ConfirmAction = Rc<dyn Fn() -> Task>;

/// A confirmation dialog waiting for the user.
#[derive(Clone)]
pub struct PendingConfirm {
    pub id: u64,
    /// `Modal` props.
    pub props: Value,
    on_ok: ConfirmAction,
}

impl fmt::Debug for PendingConfirm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingConfirm")
            .field("id", &self.id)
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

// ── Table ──────────────────────────────────────────────────────────────────

struct TableInner {
    core: Core<Table>,
    data: Signal<Vec<Value>>,
    source: RefCell<DataSpec>,
    load_state: Signal<LoadState>,
    columns: Signal<Vec<Rc<TableColumn>>>,
    toolbar: Signal<Vec<Rc<ToolbarItem>>>,
    selection: Signal<Selection>,
    handlers: RefCell<BTreeMap<String, Handler>>,
    confirms: Signal<Vec<PendingConfirm>>,
    next_confirm: Cell<u64>,
    table_ref: RefCell<Option<Rc<dyn TableRef>>>,
}

/// Handle to a table instance. Cloning is cheap and shares the instance.
#[derive(Clone)]
pub struct Table {
    inner: Rc<TableInner>,
}

/// Non-owning table handle, for callbacks stored inside the table.
#[derive(Clone)]
pub struct WeakTable {
    inner: Weak<TableInner>,
}

impl WeakTable {
    pub fn upgrade(&self) -> Option<Table> {
        self.inner.upgrade().map(|inner| Table { inner })
    }
}

impl Engine for Table {
    type Options = TableOptions;
    type Plugin = dyn TablePlugin;

    fn core(&self) -> &Core<Self> {
        &self.inner.core
    }

    fn from_core(core: Core<Self>) -> Self {
        Table {
            inner: Rc::new(TableInner {
                core,
                data: Signal::new(Vec::new()),
                source: RefCell::new(DataSpec::default()),
                load_state: Signal::new(LoadState::Idle),
                columns: Signal::new(Vec::new()),
                toolbar: Signal::new(Vec::new()),
                selection: Signal::new(Selection::default()),
                handlers: RefCell::new(BTreeMap::new()),
                confirms: Signal::new(Vec::new()),
                next_confirm: Cell::new(1),
                table_ref: RefCell::new(None),
            }),
        }
    }
}

impl Table {
    pub fn downgrade(&self) -> WeakTable {
        WeakTable {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Table) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ── Data ──

    /// The row cell.
    pub fn data(&self) -> &Signal<Vec<Value>> {
        &self.inner.data
    }

    pub fn get_data(&self) -> Vec<Value> {
        self.inner.data.get()
    }

    /// Replace the rows.
    pub fn set_data(&self, rows: Vec<Value>) {
        self.inner.data.set(rows);
    }

    pub(crate) fn set_data_spec(&self, spec: DataSpec) {
        *self.inner.source.borrow_mut() = spec;
    }

    pub(crate) fn data_spec(&self) -> DataSpec {
        self.inner.source.borrow().clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.inner.load_state.get()
    }

    /// The `loading` prop of the rendered table.
    pub fn loading(&self) -> bool {
        self.state().with(|state| {
            state
                .pointer("/tableProps/loading")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
    }

    pub fn set_loading(&self, loading: bool) {
        self.set_state(json!({ "tableProps": { "loading": loading } }), MergeMode::Merge);
    }

    /// Load rows.
    ///
    /// `onLoadBefore` shapes `params`, the first `onLoad` override claiming
    /// the call replaces the data source, and the result replaces the rows.
    /// Failures are logged and reported to `onLoadAfter`, never returned.
    /// Calls are not serialized: when two loads overlap, the one resolving
    /// last sets the rows.
    pub async fn load(&self, params: Value) {
        let mut params = if params.is_object() { params } else { json!({}) };
        let spec = self.data_spec();
        if spec.show_loading {
            self.set_loading(true);
        }
        self.inner.load_state.set(LoadState::Loading);

        let fetched = self.fetch(&spec, &mut params).await;
        if spec.show_loading {
            self.set_loading(false);
        }

        let report = match fetched {
            Ok(result) => {
                if let Some(result) = &result {
                    tracing::debug!(table = %self.id(), rows = result.rows().len(), "table loaded");
                    self.set_data(result.rows().to_vec());
                }
                self.inner.load_state.set(LoadState::Loaded);
                LoadReport {
                    result,
                    error: None,
                    params,
                }
            }
            Err(error) => {
                tracing::warn!(table = %self.id(), %error, "table load failed");
                self.inner.load_state.set(LoadState::Failed);
                LoadReport {
                    result: None,
                    error: Some(error),
                    params,
                }
            }
        };

        if let Err(err) = self
            .core()
            .call_each(ON_LOAD_AFTER, |p| p.on_load_after(self, &report))
        {
            tracing::warn!(table = %self.id(), error = %err, "onLoadAfter failed");
        }
    }

    async fn fetch(&self, spec: &DataSpec, params: &mut Value) -> Result<Option<LoadResult>, LoadError> {
        self.core()
            .call_each(ON_LOAD_BEFORE, |p| p.on_load_before(self, &mut *params))?;
        tracing::debug!(table = %self.id(), %params, "loading table");

        let request = params.clone();
        let claimed = self
            .core()
            .call_first_async(ON_LOAD, |p| p.on_load(self, &request))
            .await;
        let result = match (claimed, &spec.load) {
            (Some(result), _) => result,
            (None, Some(load)) => load(request).await,
            (None, None) => return Ok(None),
        };
        result.map(Some).map_err(LoadError::Loader)
    }

    /// Load again with the current paging and search parameters.
    pub async fn reload(&self) {
        self.load(json!({})).await
    }

    // ── Columns and toolbar ──

    pub fn columns(&self) -> Vec<Rc<TableColumn>> {
        self.inner.columns.get()
    }

    pub fn column(&self, data_index: &str) -> Option<Rc<TableColumn>> {
        self.inner.columns.with(|columns| {
            columns
                .iter()
                .find(|column| column.data_index == data_index)
                .cloned()
        })
    }

    pub(crate) fn set_columns(&self, columns: Vec<Rc<TableColumn>>) {
        self.inner.columns.set(columns);
    }

    pub fn visible_columns(&self) -> Vec<Rc<TableColumn>> {
        self.inner.columns.with(|columns| {
            columns
                .iter()
                .filter(|column| column.visible())
                .cloned()
                .collect()
        })
    }

    /// Toolbar items sorted by order, spacer included.
    pub fn toolbar_items(&self) -> Vec<Rc<ToolbarItem>> {
        self.inner.toolbar.get()
    }

    pub fn visible_toolbar_items(&self) -> Vec<Rc<ToolbarItem>> {
        self.inner.toolbar.with(|items| {
            items
                .iter()
                .filter(|item| item.is_visible())
                .cloned()
                .collect()
        })
    }

    /// Insert an item, keeping the list stably sorted by order.
    pub(crate) fn push_toolbar_item(&self, item: ToolbarItem) {
        self.inner.toolbar.update(|items| {
            items.push(Rc::new(item));
            items.sort_by_key(|item| item.order);
        });
    }

    // ── Table element ──

    /// Props of the rendered `Table` element.
    pub fn table_props(&self) -> Value {
        self.state()
            .with(|state| state.get("tableProps").cloned().unwrap_or_else(|| json!({})))
    }

    /// Name of the row field used as selection key.
    pub fn row_key(&self) -> String {
        self.state().with(|state| {
            state
                .pointer("/tableProps/rowKey")
                .and_then(Value::as_str)
                .unwrap_or("id")
                .to_string()
        })
    }

    pub fn key_of(&self, row: &Value) -> Value {
        row.get(self.row_key()).cloned().unwrap_or(Value::Null)
    }

    /// Attach a handler to the `Table` element. Handlers for the same event
    /// run in registration order.
    pub fn add_handler(&self, event: impl Into<String>, next: Handler) {
        let event = event.into();
        let mut handlers = self.inner.handlers.borrow_mut();
        let chained = match handlers.remove(&event) {
            Some(first) => chain(first, next),
            None => next,
        };
        handlers.insert(event, chained);
    }

    pub fn handlers(&self) -> BTreeMap<String, Handler> {
        self.inner.handlers.borrow().clone()
    }

    // ── Paging ──

    /// Pager state; `None` without paging options. A stored pager that does
    /// not parse is logged and treated as absent, see [`Table::try_paging`].
    pub fn paging(&self) -> Option<Paging> {
        self.try_paging().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring malformed paging state");
            None
        })
    }

    /// Pager state, failing when `state.paging` does not match [`Paging`].
    pub fn try_paging(&self) -> Result<Option<Paging>, serde_json::Error> {
        self.state()
            .with(|state| state.get("paging").cloned())
            .map(serde_json::from_value)
            .transpose()
    }

    /// The `pagination` prop: the pager state, or `false` when paging is
    /// absent or switched off.
    pub fn pagination(&self) -> Value {
        let Some(paging) = self.state().with(|state| state.get("paging").cloned()) else {
            return Value::Bool(false);
        };
        let switch = self.shared().get::<PagingSwitch>().map(|s| s.0.clone());
        if switch.is_some_and(|disable| disable.eval(&(), &())) {
            return Value::Bool(false);
        }
        paging
    }

    /// Run every `onPageChange` task.
    pub async fn change_page(&self, page: u64) {
        let tasks = self
            .core()
            .call_all(ON_PAGE_CHANGE, |p| Ok(p.on_page_change(self, page)))
            .unwrap_or_default();
        join_all(tasks).await;
    }

    /// Run every `onPageSizeChange` task.
    pub async fn change_page_size(&self, size: u64) {
        let tasks = self
            .core()
            .call_all(ON_PAGE_SIZE_CHANGE, |p| Ok(p.on_page_size_change(self, size)))
            .unwrap_or_default();
        join_all(tasks).await;
    }

    // ── Selection ──

    pub fn selection(&self) -> &Signal<Selection> {
        &self.inner.selection
    }

    pub fn get_selected_row_keys(&self) -> Vec<Value> {
        self.inner.selection.with(Selection::keys)
    }

    pub fn get_selected_rows(&self) -> Vec<Value> {
        self.inner.selection.with(Selection::rows)
    }

    pub fn clear_selected(&self) {
        self.inner.selection.update(Selection::clear);
    }

    // ── Confirmations ──

    /// Queue a confirmation dialog; `on_ok` runs when it is accepted.
    pub fn confirm(&self, props: Value, on_ok: impl Fn() -> Task + 'static) -> u64 {
        let id = self.inner.next_confirm.get();
        self.inner.next_confirm.set(id + 1);
        tracing::debug!(table = %self.id(), id, "confirmation queued");
        self.inner.confirms.update(|queue| {
            queue.push(PendingConfirm {
                id,
                props,
                on_ok: Rc::new(on_ok),
            })
        });
        id
    }

    pub fn pending_confirms(&self) -> Vec<PendingConfirm> {
        self.inner.confirms.get()
    }

    /// Close a confirmation dialog, running its action when `accepted`.
    pub async fn resolve_confirm(&self, id: u64, accepted: bool) -> Result<(), TableError> {
        let pending = self
            .inner
            .confirms
            .update(|queue| {
                let index = queue.iter().position(|confirm| confirm.id == id)?;
                Some(queue.remove(index))
            })
            .ok_or(TableError::UnknownConfirm(id))?;
        if accepted {
            (pending.on_ok)().await;
        }
        Ok(())
    }

    // ── Nested forms ──

    pub fn get_search_form(&self) -> Option<Form> {
        self.capability::<SearchForm>().map(|search| search.0.clone())
    }

    pub fn get_create_form(&self) -> Option<Form> {
        self.capability::<CreateForm>().map(|create| create.0.clone())
    }

    pub fn get_update_form(&self) -> Option<Form> {
        self.capability::<UpdateForm>().map(|update| update.0.clone())
    }

    /// Open the create dialog, optionally prefilled.
    pub fn open_create_modal(&self, data: Option<Value>) -> Result<(), TableError> {
        let form = self
            .get_create_form()
            .ok_or(TableError::Unsupported("open_create_modal"))?;
        form.open_modal(data)?;
        Ok(())
    }

    /// Open the update dialog with a row.
    pub fn open_update_modal(&self, data: Option<Value>) -> Result<(), TableError> {
        let form = self
            .get_update_form()
            .ok_or(TableError::Unsupported("open_update_modal"))?;
        form.open_modal(data)?;
        Ok(())
    }

    // ── Host handle ──

    pub fn get_table_ref(&self) -> Option<Rc<dyn TableRef>> {
        self.inner.table_ref.borrow().clone()
    }

    pub fn bind_table_ref(&self, table_ref: Rc<dyn TableRef>) {
        *self.inner.table_ref.borrow_mut() = Some(table_ref);
    }
}

fn chain(first: Handler, second: Handler) -> Handler {
    Rc::new(move |args: &[Value]| {
        let (first, second, args) = (Rc::clone(&first), Rc::clone(&second), args.to_vec());
        async move {
            first(&args).await;
            second(&args).await;
        }
        .boxed_local()
    })
}
