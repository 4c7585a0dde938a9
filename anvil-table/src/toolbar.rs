//! Toolbar item model.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use anvil_core::{handler, Flag, Node, Task};
use futures_util::FutureExt;
use serde_json::Value;

use crate::table::Table;

pub type ToolbarFlag = Flag<ToolbarItem>;
pub type ToolbarClick = Rc<dyn Fn(&Table) -> Task>;
/// Receives the selected row keys and rows.
pub type SelectFn = Rc<dyn Fn(Vec<Value>, Vec<Value>)>;
pub type ToolbarRender = Rc<dyn Fn(&Table, &ToolbarItem) -> Node>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarPosition {
    Left,
    Right,
}

/// A toolbar entry as declared.
#[derive(Clone, Default)]
pub struct UseToolbarItem {
    pub key: Option<String>,
    pub text: Option<String>,
    pub icon: Option<String>,
    pub props: Value,
    pub order: Option<i32>,
    pub position: Option<ToolbarPosition>,
    pub visible: Option<ToolbarFlag>,
    pub disable: Option<ToolbarFlag>,
    pub on_click: Option<ToolbarClick>,
    pub on_select: Option<SelectFn>,
    pub render: Option<ToolbarRender>,
}

impl UseToolbarItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn position(mut self, position: ToolbarPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn visible(mut self, visible: impl Into<ToolbarFlag>) -> Self {
        self.visible = Some(visible.into());
        self
    }

    pub fn disable(mut self, disable: impl Into<ToolbarFlag>) -> Self {
        self.disable = Some(disable.into());
        self
    }

    pub fn on_click<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(&Table) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.on_click = Some(Rc::new(move |table: &Table| f(table).boxed_local()));
        self
    }

    /// Call `f` with the current selection on click. Enables row selection.
    pub fn on_select(mut self, f: impl Fn(Vec<Value>, Vec<Value>) + 'static) -> Self {
        self.on_select = Some(Rc::new(f));
        self
    }

    pub fn render(mut self, render: impl Fn(&Table) -> Node + 'static) -> Self {
        self.render = Some(Rc::new(move |table: &Table, _: &ToolbarItem| render(table)));
        self
    }
}

impl fmt::Debug for UseToolbarItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UseToolbarItem")
            .field("key", &self.key)
            .field("text", &self.text)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// A parsed toolbar entry.
#[derive(Clone)]
pub struct ToolbarItem {
    pub key: String,
    pub order: i32,
    pub text: Option<String>,
    pub icon: Option<String>,
    pub props: Value,
    pub visible: ToolbarFlag,
    pub disable: ToolbarFlag,
    pub on_click: Option<ToolbarClick>,
    pub render: ToolbarRender,
}

impl ToolbarItem {
    pub const SPACER: &'static str = "spacer";

    pub fn new(
        key: impl Into<String>,
        order: i32,
        render: impl Fn(&Table, &ToolbarItem) -> Node + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            order,
            text: None,
            icon: None,
            props: Value::Null,
            visible: Flag::Value(true),
            disable: Flag::Value(false),
            on_click: None,
            render: Rc::new(render),
        }
    }

    /// The flexible gap between left and right items.
    pub fn spacer(order: i32) -> Self {
        Self::new(Self::SPACER, order, |_, _| {
            Node::element("div").prop("style", serde_json::json!({ "flex": 1 }))
        })
    }

    pub fn is_spacer(&self) -> bool {
        self.key == Self::SPACER
    }

    pub fn is_visible(&self) -> bool {
        self.visible.eval(self, &())
    }

    pub fn is_disabled(&self) -> bool {
        self.disable.eval(self, &())
    }

    pub fn render(&self, table: &Table) -> Node {
        (self.render)(table, self).keyed(self.key.clone())
    }
}

impl fmt::Debug for ToolbarItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolbarItem")
            .field("key", &self.key)
            .field("order", &self.order)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

/// Default toolbar entry: a `Button` with the item's text and icon.
pub fn render_button(table: &Table, item: &ToolbarItem) -> Node {
    let mut button = Node::element("Button")
        .props(item.props.clone())
        .prop("disabled", item.is_disabled());
    if let Some(click) = &item.on_click {
        let (click, table) = (Rc::clone(click), table.downgrade());
        button = button.on(
            "click",
            handler(move |_| {
                let task = table.upgrade().map(|table| click(&table));
                async move {
                    if let Some(task) = task {
                        task.await;
                    }
                }
            }),
        );
    }
    if let Some(icon) = &item.icon {
        button = button.slot("icon", Node::element(icon.clone()));
    }
    match &item.text {
        Some(text) => button.child(Node::text(text.clone())),
        None => button,
    }
}
