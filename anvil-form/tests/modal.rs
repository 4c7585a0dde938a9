use std::cell::Cell;
use std::rc::Rc;

use anvil_core::Node;
use anvil_form::{
    create_form, submit_fn, Form, FormError, FormOptions, ModalOptions, ModalTrigger, UseFormItem,
};
use anvil_test::TestHost;
use serde_json::json;

fn dialog_form(fail: bool, calls: &Rc<Cell<u32>>) -> Form {
    let calls = Rc::clone(calls);
    create_form(FormOptions {
        items: vec![UseFormItem::new("name")],
        submit: Some(submit_fn(move |_, _| {
            calls.set(calls.get() + 1);
            async move {
                if fail {
                    Err("rejected".into())
                } else {
                    Ok(())
                }
            }
        })),
        modal: Some(
            ModalOptions::new()
                .title("新增用户")
                .trigger(ModalTrigger::button("新增")),
        ),
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn dialog_forms_drop_the_submit_row() {
    let form = dialog_form(false, &Rc::default());
    assert!(form.is_modal());
    assert!(form.items().iter().all(|item| item.setter_tag() != "submit"));
}

#[test]
fn dialog_renders_closed_with_configured_chrome() {
    let form = dialog_form(false, &Rc::default());
    let host = TestHost::setup(form).unwrap();

    let modal = host.find("Modal");
    assert_eq!(modal.prop("visible"), Some(&json!(false)));
    assert_eq!(modal.prop("title"), Some(&json!("新增用户")));
    assert_eq!(modal.prop("width"), Some(&json!(600)));
    assert_eq!(modal.prop("maskClosable"), Some(&json!(false)));
    assert!(modal.slots.contains_key("default"));

    host.find("Form");
    host.button("新增");
    host.assert_state_path("formProps.layout", "vertical");
}

#[tokio::test]
async fn trigger_opens_and_ok_submits_then_closes() {
    let calls = Rc::new(Cell::new(0));
    let form = dialog_form(false, &calls);
    let host = TestHost::setup(form.clone()).unwrap();

    host.click("新增").await;
    assert!(form.is_modal_open());
    assert_eq!(host.find("Modal").prop("visible"), Some(&json!(true)));

    form.set_model(json!({ "name": "juetan" }), true);
    host.emit("Modal", "ok", &[]).await;

    assert_eq!(calls.get(), 1);
    assert!(!form.is_modal_open());
    assert_eq!(form.get_model(true)["name"], json!(null));
}

#[tokio::test]
async fn failed_submit_keeps_the_dialog_open() {
    let calls = Rc::new(Cell::new(0));
    let form = dialog_form(true, &calls);
    let host = TestHost::setup(form.clone()).unwrap();

    form.open_modal(Some(json!({ "name": "juetan" }))).unwrap();
    host.emit("Modal", "ok", &[]).await;

    assert_eq!(calls.get(), 1);
    assert!(form.is_modal_open());
    assert_eq!(form.get_model(true)["name"], json!("juetan"));
}

#[tokio::test]
async fn cancel_closes_and_resets() {
    let form = dialog_form(false, &Rc::default());
    let host = TestHost::setup(form.clone()).unwrap();

    form.open_modal(Some(json!({ "name": "draft", "ignored": 1 }))).unwrap();
    assert_eq!(form.get_model(true), json!({ "name": "draft" }));

    host.emit("Modal", "cancel", &[]).await;
    assert!(!form.is_modal_open());
    assert_eq!(form.get_model(true), json!({ "name": null }));
}

#[tokio::test]
async fn visibility_updates_from_the_host_are_honored() {
    let form = dialog_form(false, &Rc::default());
    let host = TestHost::setup(form.clone()).unwrap();

    host.emit("Modal", "update:visible", &[json!(true)]).await;
    assert!(form.is_modal_open());
    host.emit("Modal", "update:visible", &[json!(false)]).await;
    assert!(!form.is_modal_open());
}

#[test]
fn close_modal_hides_the_dialog() {
    let form = dialog_form(false, &Rc::default());
    form.open_modal(None).unwrap();
    form.close_modal().unwrap();
    assert!(!form.is_modal_open());
}

#[test]
fn custom_trigger_and_slots_render() {
    let form = create_form(FormOptions {
        items: vec![UseFormItem::new("name")],
        modal: Some(
            ModalOptions::new()
                .trigger(ModalTrigger::Render(Rc::new(|_: &Form| {
                    Node::element("Link").child(Node::text("edit"))
                })))
                .modal_slot("footer", |_| Node::element("Footer")),
        ),
        ..Default::default()
    })
    .unwrap();

    let host = TestHost::setup(form).unwrap();
    assert_eq!(host.find("Link").text(), "edit");
    host.find("Footer");
    assert_eq!(host.find("Modal").prop("title"), Some(&json!("操作")));
}

#[test]
fn plain_forms_reject_dialog_operations() {
    let form = create_form(FormOptions::default()).unwrap();
    assert!(!form.is_modal());
    assert!(matches!(form.open_modal(None), Err(FormError::Unsupported("open_modal"))));
    assert!(matches!(form.close_modal(), Err(FormError::Unsupported("close_modal"))));
}
