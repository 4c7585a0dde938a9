use std::rc::Rc;

use anvil_core::{
    defaults_deep, render_slots, Child, Engine, HookResult, MergeMode, Node, Plugin, SetupContext,
};
use serde_json::{json, Value};

use crate::form::{Form, FormOptions, FormPlugin, ON_OPTIONS_ITEM, ON_OPTIONS_ITEM_BEFORE, ON_SETUP_ITEM};
use crate::item::{FormItem, ItemArg, Rule, RuleSpec, Setter, UseFormItem};

/// Parses items, owns the root `Form` render and dispatches the item hooks.
pub struct FormBase;

impl Plugin<Form> for FormBase {
    fn name(&self) -> &str {
        "form"
    }

    fn on_init(&self, form: &Form) -> HookResult {
        form.set_state(json!({ "formProps": {} }), MergeMode::Merge);
        Ok(())
    }

    fn on_options_before(&self, form: &Form) -> HookResult {
        let core = form.core();
        let mut items = std::mem::take(&mut core.options_mut().items);
        let result = items.iter_mut().try_for_each(|item| {
            core.call_each(ON_OPTIONS_ITEM_BEFORE, |p| p.on_options_item_before(form, &mut *item))
        });
        core.options_mut().items = items;
        result
    }

    fn on_options(&self, form: &Form, options: &mut FormOptions) -> HookResult {
        let config = form.config();

        let mut form_props = std::mem::take(&mut options.form_props);
        defaults_deep(&mut form_props, config.section("formProps"));
        let mut model = std::mem::take(&mut options.model);
        defaults_deep(&mut model, config.section("model"));
        if !model.is_object() {
            model = json!({});
        }

        let submit = options.submit.take();
        let has_submit_item = options
            .items
            .iter()
            .any(|item| item.setter_tag() == Some("submit"));
        if submit.is_some() && !has_submit_item {
            options.items.push(UseFormItem::new("").setter(Setter::Submit));
        }

        form.model().set(model);
        form.set_submit(submit);
        form.set_state(json!({ "formProps": form_props }), MergeMode::Merge);

        let item_defaults = config.section("item");
        let named_rules = config.section("rules");
        let mut items = Vec::with_capacity(options.items.len());
        for mut declared in std::mem::take(&mut options.items) {
            declared.apply_defaults(item_defaults);
            let rules = resolve_rules(&declared.rules, named_rules);
            let mut item = FormItem::new(&declared, rules);
            form.core()
                .call_each(ON_OPTIONS_ITEM, |p| p.on_options_item(form, &declared, &mut item))?;
            items.push(Rc::new(item));
        }
        tracing::debug!(form = %form.id(), items = items.len(), "form items parsed");
        form.update_items(|list| *list = items);

        form.add_child(Child::new(render_form).with_key("form"));
        Ok(())
    }

    fn on_setup(&self, form: &Form, ctx: &mut SetupContext) -> HookResult {
        for item in form.items() {
            form.core()
                .call_each(ON_SETUP_ITEM, |p| p.on_setup_item(form, &item, &mut *ctx))?;
        }
        Ok(())
    }
}

impl FormPlugin for FormBase {}

fn resolve_rules(specs: &[RuleSpec], named: &Value) -> Vec<Rule> {
    specs
        .iter()
        .filter_map(|spec| match spec {
            RuleSpec::Rule(rule) => Some(rule.clone()),
            RuleSpec::Named(name) => match named.get(name) {
                Some(props) if !props.is_null() => Some(Rule::new(props.clone())),
                _ => {
                    tracing::warn!(rule = %name, "unknown named rule ignored");
                    None
                }
            },
        })
        .collect()
}

fn render_form(form: &Form) -> Node {
    Node::element("Form")
        .props(form.form_props())
        .prop("model", form.get_model(true))
        .children(
            form.visible_items()
                .iter()
                .map(|item| render_item(form, item)),
        )
}

/// One `FormItem` element with the item's slots bound to `(form, item)`.
pub fn render_item(form: &Form, item: &Rc<FormItem>) -> Node {
    let arg = ItemArg {
        form: form.clone(),
        item: Rc::clone(item),
    };
    Node::element("FormItem")
        .key(item.key.clone())
        .props(item.item_props.clone())
        .prop("field", item.field.clone())
        .prop("label", item.label.clone())
        .prop("required", item.required)
        .prop("disabled", item.disabled(form))
        .prop("rules", item.rules(form))
        .slots(render_slots(&item.item_slots, &arg))
}
