//! Setter plugins.
//!
//! A setter owns one item tag. It guards on the tag, fills the item from
//! `config.<tag>` and installs a `default` item slot rendering its widget,
//! two-way bound to the model.

pub mod select;
pub mod submit;

use std::rc::Rc;

use anvil_core::{render_slots, Engine, HookResult, Node, Plugin};

use crate::form::{Form, FormPlugin};
use crate::item::{ItemArg, ItemSlot, Setter, UseFormItem};
use crate::plugins::model::bind_model;

pub use select::{load_item_options, OptionLoading, SelectSetter};
pub use submit::SubmitSetter;

/// Setter rendering a single bound widget.
pub struct WidgetSetter {
    tag: &'static str,
    widget: &'static str,
    claims_untagged: bool,
}

impl WidgetSetter {
    /// Setter for a caller-defined tag (`Setter::Custom`).
    pub const fn new(tag: &'static str, widget: &'static str) -> Self {
        Self {
            tag,
            widget,
            claims_untagged: false,
        }
    }

    /// `input`; also claims items declared without a setter.
    pub const fn input() -> Self {
        Self {
            tag: "input",
            widget: "Input",
            claims_untagged: true,
        }
    }

    pub const fn password() -> Self {
        Self::new("password", "InputPassword")
    }

    pub const fn number() -> Self {
        Self::new("number", "InputNumber")
    }

    pub const fn textarea() -> Self {
        Self::new("textarea", "Textarea")
    }

    pub const fn search() -> Self {
        Self::new("search", "InputSearch")
    }

    pub const fn tree_select() -> Self {
        Self::new("treeSelect", "TreeSelect")
    }

    pub const fn cascader() -> Self {
        Self::new("cascader", "Cascader")
    }

    pub const fn time() -> Self {
        Self::new("time", "TimePicker")
    }

    pub const fn date() -> Self {
        Self::new("date", "DatePicker")
    }

    pub const fn date_range() -> Self {
        Self::new("dateRange", "RangePicker")
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

impl Plugin<Form> for WidgetSetter {
    fn name(&self) -> &str {
        self.tag
    }
}

impl FormPlugin for WidgetSetter {
    fn on_options_item_before(&self, form: &Form, item: &mut UseFormItem) -> HookResult {
        if self.claims_untagged && item.setter.is_none() {
            item.setter = Some(Setter::Input);
        }
        if item.setter_tag() != Some(self.tag) {
            return Ok(());
        }
        install_widget(form, item, self.tag, self.widget);
        Ok(())
    }
}

/// Apply `config.<tag>` and install the default widget slot unless the
/// caller supplied one.
pub fn install_widget(form: &Form, item: &mut UseFormItem, tag: &str, widget: &'static str) {
    item.apply_defaults(form.config().section(tag));
    item.item_slots
        .entry("default".to_string())
        .or_insert_with(|| widget_slot(widget));
}

pub fn widget_slot(widget: &'static str) -> ItemSlot {
    Rc::new(move |arg: &ItemArg| render_widget(widget, arg))
}

/// `widget` carrying the setter props, placeholder, disabled state and
/// setter slots, bound to the item's field.
pub fn render_widget(widget: &'static str, arg: &ItemArg) -> Node {
    let ItemArg { form, item } = arg;
    let mut node = Node::element(widget)
        .props(item.setter_props())
        .prop("disabled", item.disabled(form))
        .slots(render_slots(&item.setter_slots, arg));
    if let Some(placeholder) = &item.placeholder {
        node = node.prop("placeholder", placeholder.clone());
    }
    bind_model(node, form, item)
}
