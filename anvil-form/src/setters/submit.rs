use std::rc::Rc;

use anvil_core::{handler, sync_handler, Engine, HookResult, Node, Plugin};
use serde_json::Value;

use crate::form::{Form, FormPlugin};
use crate::item::{FormItem, ItemArg, ItemSlot, UseFormItem};

/// Renders the submit and reset buttons of a `submit` row.
///
/// Works on the parsed item so rows added during option parsing (the
/// automatic submit row) are covered as well.
pub struct SubmitSetter;

impl Plugin<Form> for SubmitSetter {
    fn name(&self) -> &str {
        "submit"
    }
}

impl FormPlugin for SubmitSetter {
    fn on_options_item(&self, form: &Form, _item: &UseFormItem, target: &mut FormItem) -> HookResult {
        if target.setter_tag() != "submit" {
            return Ok(());
        }
        target.apply_defaults(form.config().section("submit"));
        target
            .item_slots
            .entry("default".to_string())
            .or_insert_with(|| Rc::new(render_buttons) as ItemSlot);
        Ok(())
    }
}

fn render_buttons(arg: &ItemArg) -> Node {
    let ItemArg { form, item } = arg;
    let props = item.setter_props();
    let text = |key: &str, fallback: &str| {
        props
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string()
    };

    let submit = {
        let form = form.clone();
        handler(move |_| {
            let form = form.clone();
            async move {
                if let Err(err) = form.submit().await {
                    tracing::debug!(error = %err, "submit button: submit failed");
                }
            }
        })
    };
    let reset = {
        let form = form.clone();
        sync_handler(move |_| form.reset_model(None))
    };

    Node::fragment([
        Node::element("Button")
            .prop("type", "primary")
            .prop("loading", form.is_loading())
            .on("click", submit)
            .child(Node::text(text("submitText", "提交"))),
        Node::element("Button")
            .on("click", reset)
            .child(Node::text(text("resetText", "重置"))),
    ])
}
