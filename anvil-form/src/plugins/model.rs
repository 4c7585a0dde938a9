use anvil_core::{sync_handler, Engine, HookResult, Node, Plugin};
use serde_json::Value;

use crate::form::{Form, FormPlugin};
use crate::item::{FormItem, UseFormItem};

/// Model as it was right after option parsing; `reset_model` restores it.
#[derive(Debug, Clone)]
pub struct ModelSnapshot(pub Value);

/// Seeds the model with item defaults and snapshots it.
pub struct ModelPlugin;

impl Plugin<Form> for ModelPlugin {
    fn name(&self) -> &str {
        "model"
    }

    fn on_options_after(&self, form: &Form) -> HookResult {
        let snapshot = ModelSnapshot(form.get_model(true));
        form.shared().insert(snapshot);
        Ok(())
    }
}

impl FormPlugin for ModelPlugin {
    fn on_options_item(&self, form: &Form, _item: &UseFormItem, target: &mut FormItem) -> HookResult {
        if let Some(path) = &target.path {
            let value = target.value.clone();
            form.model().update(|model| path.seed(model, value));
        }
        Ok(())
    }
}

/// Two-way bind `node` to the item's field: `modelValue` carries the current
/// value, `update:modelValue` writes the first event argument back.
pub fn bind_model(node: Node, form: &Form, item: &FormItem) -> Node {
    let Some(path) = item.path.clone() else {
        return node;
    };
    let model = form.model().clone();
    node.prop("modelValue", item.get_value(form)).on(
        "update:modelValue",
        sync_handler(move |args| {
            let value = args.first().cloned().unwrap_or(Value::Null);
            model.update(|model| path.set(model, value));
        }),
    )
}
