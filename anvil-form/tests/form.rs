use std::cell::RefCell;
use std::rc::Rc;

use anvil_core::{Engine, Flag, HookResult, MergeMode, Plugin, SetupContext, Signal};
use anvil_form::setters::WidgetSetter;
use anvil_form::{
    create_form, form_builder, submit_fn, Form, FormItem, FormOptions, FormPlugin, Rule, Setter,
    UseFormItem,
};
use anvil_test::TestHost;
use serde_json::{json, Value};

fn fields(items: &[Rc<FormItem>]) -> Vec<String> {
    items.iter().map(|item| item.field.clone()).collect()
}

// ── Item parsing ───────────────────────────────────────────────────────────

#[test]
fn untagged_items_render_as_input_with_config_defaults() {
    let form = create_form(FormOptions {
        items: vec![UseFormItem::new("name").label("姓名")],
        ..Default::default()
    })
    .unwrap();

    let host = TestHost::setup(form).unwrap();
    let item = host.find("FormItem");
    assert_eq!(item.prop("field"), Some(&json!("name")));
    assert_eq!(item.prop("label"), Some(&json!("姓名")));

    let input = host.find("Input");
    assert_eq!(input.prop("placeholder"), Some(&json!("请输入")));
    assert_eq!(input.prop("allowClear"), Some(&json!(true)));
    assert!(input.has_handler("update:modelValue"));
}

#[test]
fn explicit_placeholder_beats_the_configured_one() {
    let form = create_form(FormOptions {
        items: vec![UseFormItem::new("name").placeholder("your name")],
        ..Default::default()
    })
    .unwrap();

    let host = TestHost::setup(form).unwrap();
    assert_eq!(host.find("Input").prop("placeholder"), Some(&json!("your name")));
}

#[test]
fn factory_config_overrides_setter_defaults() {
    let form = form_builder()
        .set_config(json!({ "input": { "placeholder": "Type here" } }), MergeMode::Merge)
        .build()
        .create_with_options(FormOptions {
            items: vec![UseFormItem::new("name")],
            ..Default::default()
        })
        .unwrap();

    let host = TestHost::setup(form).unwrap();
    assert_eq!(host.find("Input").prop("placeholder"), Some(&json!("Type here")));
}

#[test]
fn submit_row_is_added_when_a_submit_fn_is_given() {
    let form = create_form(FormOptions {
        items: vec![UseFormItem::new("name")],
        submit: Some(submit_fn(|_, _| async { Ok(()) })),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(form.items().len(), 2);
    assert_eq!(form.items()[1].setter_tag(), "submit");

    let host = TestHost::setup(form).unwrap();
    host.button("提交");
    host.button("重置");
    let row = host.find_with_prop("FormItem", "field", "");
    assert_eq!(row.prop("hideLabel"), Some(&json!(true)));
}

#[test]
fn no_submit_row_without_a_submit_fn() {
    let form = create_form(FormOptions {
        items: vec![UseFormItem::new("name")],
        ..Default::default()
    })
    .unwrap();

    assert_eq!(fields(&form.items()), vec!["name"]);
    let host = TestHost::setup(form).unwrap();
    assert!(host.find_all("Button").is_empty());
}

#[test]
fn declared_submit_row_is_not_duplicated() {
    let form = create_form(FormOptions {
        items: vec![
            UseFormItem::new("name"),
            UseFormItem::new("actions").setter(Setter::Submit),
        ],
        submit: Some(submit_fn(|_, _| async { Ok(()) })),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(fields(&form.items()), vec!["name", "actions"]);
}

#[test]
fn form_props_default_to_vertical_layout() {
    let form = create_form(FormOptions {
        form_props: json!({ "class": "compact" }),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(form.form_props(), json!({ "layout": "vertical", "class": "compact" }));
    let host = TestHost::setup(form).unwrap();
    assert_eq!(host.find("Form").prop("class"), Some(&json!("compact")));
}

// ── Switches and rules ─────────────────────────────────────────────────────

#[test]
fn visible_cell_toggles_rendered_items() {
    let shown = Signal::new(true);
    let form = create_form(FormOptions {
        items: vec![
            UseFormItem::new("a"),
            UseFormItem::new("b").visible(shown.clone()),
        ],
        ..Default::default()
    })
    .unwrap();

    assert_eq!(fields(&form.visible_items()), vec!["a", "b"]);
    shown.set(false);
    assert_eq!(fields(&form.visible_items()), vec!["a"]);

    let host = TestHost::setup(form).unwrap();
    assert_eq!(host.find_all("FormItem").len(), 1);
}

#[test]
fn disable_predicate_follows_the_model() {
    let form = create_form(FormOptions {
        items: vec![
            UseFormItem::new("agree").value(false),
            UseFormItem::new("reason")
                .disable(Flag::when(|_: &FormItem, model: &Value| model["agree"] == json!(false))),
        ],
        ..Default::default()
    })
    .unwrap();

    let reason = form.item("reason").unwrap();
    assert!(reason.disabled(&form));
    form.set_model(json!({ "agree": true }), true);
    assert!(!reason.disabled(&form));

    let host = TestHost::setup(form).unwrap();
    let item = host.find_with_prop("FormItem", "field", "reason");
    assert_eq!(item.prop("disabled"), Some(&json!(false)));
}

#[test]
fn named_rules_resolve_and_disabled_rules_drop_out() {
    let strict = Signal::new(false);
    let form = create_form(FormOptions {
        items: vec![UseFormItem::new("email")
            .rule("required")
            .rule("email")
            .rule("no-such-rule")
            .rule(Rule::new(json!({ "minLength": 3 })).disable(strict.clone()))],
        ..Default::default()
    })
    .unwrap();

    let item = form.item("email").unwrap();
    let rules = item.rules(&form);
    assert_eq!(rules.len(), 3);
    assert_eq!(rules[0]["required"], json!(true));
    assert_eq!(rules[1]["type"], json!("email"));
    assert_eq!(rules[2], json!({ "minLength": 3 }));

    strict.set(true);
    assert_eq!(item.rules(&form).len(), 2);
}

#[test]
fn required_marks_the_item() {
    let form = create_form(FormOptions {
        items: vec![UseFormItem::new("name").required(true)],
        ..Default::default()
    })
    .unwrap();

    let host = TestHost::setup(form).unwrap();
    assert_eq!(host.find("FormItem").prop("required"), Some(&json!(true)));
}

// ── Item hooks ─────────────────────────────────────────────────────────────

type Log = Rc<RefCell<Vec<String>>>;

struct Tracer {
    log: Log,
}

impl Plugin<Form> for Tracer {
    fn name(&self) -> &str {
        "tracer"
    }
}

impl FormPlugin for Tracer {
    fn on_options_item_before(&self, _form: &Form, item: &mut UseFormItem) -> HookResult {
        self.log.borrow_mut().push(format!("before:{}", item.field));
        Ok(())
    }

    fn on_options_item(&self, _form: &Form, item: &UseFormItem, _target: &mut FormItem) -> HookResult {
        self.log.borrow_mut().push(format!("item:{}", item.field));
        Ok(())
    }

    fn on_setup_item(&self, _form: &Form, item: &Rc<FormItem>, _ctx: &mut SetupContext) -> HookResult {
        self.log.borrow_mut().push(format!("setup:{}", item.field));
        Ok(())
    }
}

#[test]
fn item_hooks_run_per_item_in_phase_order() {
    let log: Log = Rc::default();
    let form = create_form(FormOptions {
        plugins: vec![Rc::new(Tracer { log: Rc::clone(&log) })],
        items: vec![UseFormItem::new("a"), UseFormItem::new("b")],
        ..Default::default()
    })
    .unwrap();

    assert_eq!(*log.borrow(), vec!["before:a", "before:b", "item:a", "item:b"]);

    log.borrow_mut().clear();
    form.setup().unwrap();
    assert_eq!(*log.borrow(), vec!["setup:a", "setup:b"]);
}

#[test]
fn custom_setter_plugin_claims_its_tag() {
    let form = create_form(FormOptions {
        plugins: vec![Rc::new(WidgetSetter::new("color", "ColorPicker"))],
        items: vec![UseFormItem::new("theme").setter(Setter::Custom("color".into()))],
        ..Default::default()
    })
    .unwrap();

    let host = TestHost::setup(form).unwrap();
    assert!(host.try_find("Input").is_none());
    assert!(host.find("ColorPicker").has_handler("update:modelValue"));
}
