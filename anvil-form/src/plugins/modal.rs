//! Dialog presentation.
//!
//! With `modal` options the form renders as an optional trigger next to a
//! `Modal` whose default slot is the plain form. The dialog's `ok` action
//! submits and closes only on success; closing resets the model. Submit rows
//! are dropped because the dialog chrome provides the submit action.

use std::rc::Rc;

use anvil_core::{
    defaults_deep, handler, render_slots, sync_handler, Engine, HookResult, MergeMode, Node,
    Plugin, Slot, Slots,
};
use serde_json::{json, Value};

use crate::form::{Form, FormOptions, FormPlugin, SubmitOutcome};

/// What opens the dialog.
#[derive(Clone, Default)]
pub enum ModalTrigger {
    /// Opened programmatically only.
    #[default]
    Hidden,
    /// A primary button with the given text.
    Button(String),
    /// A custom node.
    Render(Slot<Form>),
}

impl ModalTrigger {
    pub fn button(text: impl Into<String>) -> Self {
        ModalTrigger::Button(text.into())
    }
}

#[derive(Clone, Default)]
pub struct ModalOptions {
    pub title: Option<String>,
    pub width: Option<Value>,
    pub trigger: ModalTrigger,
    pub modal_props: Value,
    pub modal_slots: Slots<Form>,
}

impl ModalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn width(mut self, width: impl Into<Value>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn trigger(mut self, trigger: ModalTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn modal_props(mut self, props: Value) -> Self {
        self.modal_props = props;
        self
    }

    pub fn modal_slot(mut self, name: impl Into<String>, slot: impl Fn(&Form) -> Node + 'static) -> Self {
        self.modal_slots.insert(name.into(), Rc::new(slot));
        self
    }
}

/// Non-JSON part of the dialog, kept in `shared`.
#[derive(Clone)]
struct ModalChrome {
    trigger: ModalTrigger,
    slots: Slots<Form>,
}

pub struct ModalPlugin;

impl Plugin<Form> for ModalPlugin {
    fn name(&self) -> &str {
        "modal"
    }

    fn on_options(&self, form: &Form, options: &mut FormOptions) -> HookResult {
        let Some(modal) = options.modal.take() else {
            return Ok(());
        };

        let mut spec = json!({
            "title": modal.title,
            "width": modal.width,
            "modalProps": modal.modal_props,
        });
        defaults_deep(&mut spec, form.config().section("modal"));

        form.set_state(json!({ "modal": spec }), MergeMode::Merge);
        form.set_state(json!({ "formProps": { "layout": "vertical" } }), MergeMode::Defaults);
        form.update_items(|items| items.retain(|item| item.setter_tag() != "submit"));
        form.shared().insert(ModalChrome {
            trigger: modal.trigger,
            slots: modal.modal_slots,
        });
        form.core().set_render(render_modal);
        Ok(())
    }
}

impl FormPlugin for ModalPlugin {}

fn render_modal(form: &Form) -> Node {
    let chrome = form.shared().get::<ModalChrome>().cloned();
    let Some(chrome) = chrome else {
        return form.core().render_base(form);
    };
    let modal = form
        .state()
        .with(|state| state.get("modal").cloned().unwrap_or(Value::Null));

    let trigger = match &chrome.trigger {
        ModalTrigger::Hidden => Node::Empty,
        ModalTrigger::Button(text) => {
            let form = form.clone();
            Node::element("Button")
                .prop("type", "primary")
                .on(
                    "click",
                    sync_handler(move |_| {
                        reveal(&form);
                    }),
                )
                .child(Node::text(text.clone()))
        }
        ModalTrigger::Render(slot) => slot(form),
    };

    let mut slots = render_slots(&chrome.slots, form);
    slots
        .entry("default".to_string())
        .or_insert_with(|| form.core().render_base(form));

    let dialog = Node::element("Modal")
        .props(modal.get("modalProps").cloned().unwrap_or(Value::Null))
        .prop("title", modal.get("title").cloned().unwrap_or(Value::Null))
        .prop("width", modal.get("width").cloned().unwrap_or(Value::Null))
        .on("ok", ok_handler(form))
        .on("cancel", {
            let form = form.clone();
            sync_handler(move |_| form.hide_modal())
        })
        .on("update:visible", {
            let form = form.clone();
            sync_handler(move |args| match args.first().and_then(Value::as_bool) {
                Some(true) => {
                    reveal(&form);
                }
                _ => form.hide_modal(),
            })
        })
        .slots(slots);

    Node::fragment([trigger, dialog])
}

/// Open the dialog from its chrome; `false` when the form cannot present one.
fn reveal(form: &Form) -> bool {
    match form.open_modal(None) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "dialog could not be opened");
            false
        }
    }
}

fn ok_handler(form: &Form) -> anvil_core::Handler {
    let form = form.clone();
    handler(move |_| {
        let form = form.clone();
        async move {
            match form.submit().await {
                Ok(SubmitOutcome::Submitted) => form.hide_modal(),
                Ok(outcome) => tracing::debug!(?outcome, "dialog kept open"),
                Err(err) => tracing::debug!(error = %err, "dialog kept open after failed submit"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_form, UseFormItem};

    #[test]
    fn reveal_reports_forms_without_a_dialog() {
        let plain = create_form(FormOptions {
            items: vec![UseFormItem::new("name")],
            ..Default::default()
        })
        .unwrap();
        assert!(!reveal(&plain));

        let dialog = create_form(FormOptions {
            items: vec![UseFormItem::new("name")],
            modal: Some(ModalOptions::new()),
            ..Default::default()
        })
        .unwrap();
        assert!(reveal(&dialog));
        assert!(dialog.is_modal_open());
    }
}
