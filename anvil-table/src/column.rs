//! Column and row action model.
//!
//! Columns are declared as [`UseTableColumn`] values and parsed into
//! [`TableColumn`]s. A column may carry row actions ([`UseColumnAction`]),
//! rendered as links in every cell of that column.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use anvil_core::{defaults_deep, Flag, Node, Slot, Task};
use futures_util::future::{self, FutureExt};
use serde_json::{json, Value};

use crate::table::Table;

/// Binding argument of a cell render slot.
#[derive(Clone)]
pub struct CellArg {
    pub table: Table,
    pub column: Rc<TableColumn>,
    pub record: Value,
    pub row_index: usize,
}

pub type CellSlot = Slot<CellArg>;

/// `visible` switch of a column.
pub type ColumnFlag = Flag<TableColumn>;

// ── Declared column ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct UseTableColumn {
    pub data_index: String,
    pub title: Option<String>,
    pub props: Value,
    pub visible: Option<ColumnFlag>,
    pub render: Option<CellSlot>,
    pub actions: Vec<UseColumnAction>,
}

impl UseTableColumn {
    pub fn new(data_index: impl Into<String>) -> Self {
        Self {
            data_index: data_index.into(),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    pub fn visible(mut self, visible: impl Into<ColumnFlag>) -> Self {
        self.visible = Some(visible.into());
        self
    }

    pub fn render(mut self, render: impl Fn(&CellArg) -> Node + 'static) -> Self {
        self.render = Some(Rc::new(render));
        self
    }

    pub fn action(mut self, action: UseColumnAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Fill unset fields from `config.column`.
    pub fn apply_defaults(&mut self, defaults: &Value) {
        if self.title.is_none() {
            self.title = defaults.get("title").and_then(Value::as_str).map(str::to_string);
        }
        if let Some(props) = defaults.get("props") {
            defaults_deep(&mut self.props, props);
        }
    }
}

impl fmt::Debug for UseTableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UseTableColumn")
            .field("data_index", &self.data_index)
            .field("title", &self.title)
            .field("actions", &self.actions.len())
            .finish_non_exhaustive()
    }
}

// ── Parsed column ──────────────────────────────────────────────────────────

pub struct TableColumn {
    pub key: String,
    pub data_index: String,
    pub title: Option<String>,
    pub props: Value,
    pub render: Option<CellSlot>,
    pub actions: Vec<ColumnAction>,
    visible: ColumnFlag,
}

impl TableColumn {
    pub(crate) fn new(column: &UseTableColumn) -> Self {
        let key = column
            .props
            .get("key")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| column.data_index.clone());
        Self {
            key,
            data_index: column.data_index.clone(),
            title: column.title.clone(),
            props: column.props.clone(),
            render: column.render.clone(),
            actions: Vec::new(),
            visible: column.visible.clone().unwrap_or(Flag::Value(true)),
        }
    }

    pub fn visible_flag(&self) -> &ColumnFlag {
        &self.visible
    }

    pub fn visible(&self) -> bool {
        self.visible.eval(self, &())
    }

    /// Column descriptor handed to the host's `Table` widget.
    pub fn descriptor(&self) -> Value {
        let mut descriptor = json!({
            "key": self.key,
            "dataIndex": self.data_index,
            "title": self.title,
        });
        defaults_deep(&mut descriptor, &self.props);
        descriptor
    }
}

impl fmt::Debug for TableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableColumn")
            .field("key", &self.key)
            .field("data_index", &self.data_index)
            .field("title", &self.title)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

// ── Row actions ────────────────────────────────────────────────────────────

/// Binding argument of a row action: the row it was clicked on and the
/// action's position in its column.
#[derive(Clone)]
pub struct ActionArg {
    pub table: Table,
    pub column: Rc<TableColumn>,
    pub record: Value,
    pub row_index: usize,
    pub(crate) index: usize,
}

impl ActionArg {
    pub fn action(&self) -> &ColumnAction {
        &self.column.actions[self.index]
    }
}

pub type ActionFlag = Flag<ActionArg>;
pub type ActionClick = Rc<dyn Fn(&ActionArg) -> Task>;

/// Confirmation dialog in front of an action.
#[derive(Clone, Debug, PartialEq)]
pub enum Confirm {
    /// Dialog content; the rest comes from `config.actionConfirm`.
    Text(String),
    /// Full `Modal` props.
    Props(Value),
}

impl Confirm {
    pub fn into_props(self) -> Value {
        match self {
            Confirm::Text(content) => json!({ "content": content }),
            Confirm::Props(props) => props,
        }
    }
}

impl From<&str> for Confirm {
    fn from(content: &str) -> Self {
        Confirm::Text(content.to_string())
    }
}

impl From<String> for Confirm {
    fn from(content: String) -> Self {
        Confirm::Text(content)
    }
}

impl From<Value> for Confirm {
    fn from(props: Value) -> Self {
        Confirm::Props(props)
    }
}

/// A row action as declared on a column.
#[derive(Clone, Default)]
pub struct UseColumnAction {
    pub text: Option<String>,
    pub icon: Option<String>,
    pub props: Value,
    pub confirm: Option<Confirm>,
    /// Gate the click behind the delete confirmation.
    pub on_delete: bool,
    pub visible: Option<ActionFlag>,
    pub disable: Option<ActionFlag>,
    pub on_click: Option<ActionClick>,
    pub render: Option<Slot<ActionArg>>,
}

impl UseColumnAction {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.props["status"] = Value::String(status.into());
        self
    }

    pub fn confirm(mut self, confirm: impl Into<Confirm>) -> Self {
        self.confirm = Some(confirm.into());
        self
    }

    pub fn on_delete(mut self) -> Self {
        self.on_delete = true;
        self
    }

    pub fn visible(mut self, visible: impl Into<ActionFlag>) -> Self {
        self.visible = Some(visible.into());
        self
    }

    pub fn disable(mut self, disable: impl Into<ActionFlag>) -> Self {
        self.disable = Some(disable.into());
        self
    }

    pub fn on_click<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(&ActionArg) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.on_click = Some(Rc::new(move |arg: &ActionArg| f(arg).boxed_local()));
        self
    }

    pub fn render(mut self, render: impl Fn(&ActionArg) -> Node + 'static) -> Self {
        self.render = Some(Rc::new(render));
        self
    }
}

impl fmt::Debug for UseColumnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UseColumnAction")
            .field("text", &self.text)
            .field("confirm", &self.confirm)
            .field("on_delete", &self.on_delete)
            .finish_non_exhaustive()
    }
}

/// A parsed row action.
///
/// `on_click` is the caller's click, possibly wrapped by plugins (the delete
/// gate). `click`, when set, replaces it as the entry point; the confirm gate
/// lives there and calls back into `on_click` once the dialog is accepted.
#[derive(Clone)]
pub struct ColumnAction {
    pub text: Option<String>,
    pub icon: Option<String>,
    pub props: Value,
    /// Resolved confirmation dialog props.
    pub confirm: Option<Value>,
    pub on_delete: bool,
    pub visible: ActionFlag,
    pub disable: ActionFlag,
    pub on_click: Option<ActionClick>,
    pub click: Option<ActionClick>,
    pub render: Option<Slot<ActionArg>>,
}

impl ColumnAction {
    pub fn new(action: &UseColumnAction) -> Self {
        Self {
            text: action.text.clone(),
            icon: action.icon.clone(),
            props: action.props.clone(),
            confirm: action.confirm.clone().map(Confirm::into_props),
            on_delete: action.on_delete,
            visible: action.visible.clone().unwrap_or(Flag::Value(true)),
            disable: action.disable.clone().unwrap_or(Flag::Value(false)),
            on_click: action.on_click.clone(),
            click: None,
            render: action.render.clone(),
        }
    }

    pub fn is_visible(&self, arg: &ActionArg) -> bool {
        self.visible.eval(arg, &())
    }

    pub fn is_disabled(&self, arg: &ActionArg) -> bool {
        self.disable.eval(arg, &())
    }

    /// Run the action as a click on its link would.
    pub fn run(&self, arg: &ActionArg) -> Task {
        match self.click.as_ref().or(self.on_click.as_ref()) {
            Some(click) => click(arg),
            None => future::ready(()).boxed_local(),
        }
    }

    /// Run `on_click` only, bypassing the `click` gate.
    pub fn run_on_click(&self, arg: &ActionArg) -> Task {
        match &self.on_click {
            Some(click) => click(arg),
            None => future::ready(()).boxed_local(),
        }
    }
}

impl fmt::Debug for ColumnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnAction")
            .field("text", &self.text)
            .field("confirm", &self.confirm)
            .field("on_delete", &self.on_delete)
            .finish_non_exhaustive()
    }
}
