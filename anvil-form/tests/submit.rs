use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use anvil_core::{HookResult, MergeMode, Plugin};
use anvil_form::{
    create_form, form_builder, submit_fn, Form, FormError, FormOptions, FormPlugin, FormRef,
    SubmitOutcome, SubmitPhase, UseFormItem,
};
use anvil_test::TestHost;
use futures_util::future::{self, FutureExt, LocalBoxFuture};
use serde_json::{json, Value};

type Seen = Rc<RefCell<Vec<Value>>>;

fn recording_form(seen: &Seen, extra: FormOptions) -> Form {
    let sink = Rc::clone(seen);
    create_form(FormOptions {
        items: vec![
            UseFormItem::new("name").value("juetan"),
            UseFormItem::new("[start,end]").value(json!(["a", "b"])),
        ],
        submit: Some(submit_fn(move |model, _items| {
            let sink = Rc::clone(&sink);
            async move {
                sink.borrow_mut().push(model);
                Ok(())
            }
        })),
        ..extra
    })
    .unwrap()
}

struct Rejecting;

impl FormRef for Rejecting {
    fn validate(&self) -> LocalBoxFuture<'static, Option<Value>> {
        future::ready(Some(json!({ "name": "该项不能为空" }))).boxed_local()
    }
}

struct Accepting;

impl FormRef for Accepting {
    fn validate(&self) -> LocalBoxFuture<'static, Option<Value>> {
        future::ready(None).boxed_local()
    }
}

#[tokio::test]
async fn submit_passes_the_expanded_model() {
    let seen = Seen::default();
    let form = recording_form(&seen, FormOptions::default());
    form.bind_form_ref(Rc::new(Accepting));

    let outcome = form.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Submitted);
    assert_eq!(
        *seen.borrow(),
        vec![json!({ "name": "juetan", "start": "a", "end": "b" })]
    );
    assert_eq!(form.phase(), SubmitPhase::Idle);
}

#[tokio::test]
async fn invalid_model_short_circuits() {
    let seen = Seen::default();
    let form = recording_form(&seen, FormOptions::default());
    form.bind_form_ref(Rc::new(Rejecting));

    let outcome = form.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Invalid(json!({ "name": "该项不能为空" })));
    assert!(seen.borrow().is_empty());
    assert_eq!(form.phase(), SubmitPhase::Idle);
}

#[tokio::test]
async fn submit_without_a_submit_fn_still_validates() {
    let form = create_form(FormOptions::default()).unwrap();
    assert_eq!(form.submit().await.unwrap(), SubmitOutcome::Submitted);
    assert!(!form.has_submit());
}

#[tokio::test]
async fn submit_errors_surface_and_reset_the_phase() {
    let form = create_form(FormOptions {
        submit: Some(submit_fn(|_, _| async { Err("backend down".into()) })),
        ..Default::default()
    })
    .unwrap();

    let err = form.submit().await.unwrap_err();
    assert!(matches!(err, FormError::Submit(ref source) if source.to_string() == "backend down"));
    assert_eq!(form.phase(), SubmitPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn loading_is_reported_while_the_submit_fn_runs() {
    let form = create_form(FormOptions {
        submit: Some(submit_fn(|_, _| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        })),
        ..Default::default()
    })
    .unwrap();

    let (first, (loading, second)) = tokio::join!(form.submit(), async {
        (form.is_loading(), form.submit().await)
    });

    assert!(loading);
    assert_eq!(first.unwrap(), SubmitOutcome::Submitted);
    assert_eq!(second.unwrap(), SubmitOutcome::Busy);
    assert!(!form.is_loading());
}

#[tokio::test(start_paused = true)]
async fn submit_loading_can_be_switched_off() {
    let form = form_builder()
        .set_config(json!({ "submitLoading": false }), MergeMode::Merge)
        .build()
        .create_with_options(FormOptions {
            submit: Some(submit_fn(|_, _| async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(())
            })),
            ..Default::default()
        })
        .unwrap();

    let (_, (phase, loading)) =
        tokio::join!(form.submit(), async { (form.phase(), form.is_loading()) });
    assert_eq!(phase, SubmitPhase::Submitting);
    assert!(!loading);
}

struct Stamp {
    calls: Rc<Cell<u32>>,
}

impl Plugin<Form> for Stamp {
    fn name(&self) -> &str {
        "stamp"
    }
}

impl FormPlugin for Stamp {
    fn on_submit_before(&self, _form: &Form, model: &mut Value) -> HookResult {
        self.calls.set(self.calls.get() + 1);
        model["stamp"] = json!(1);
        Ok(())
    }
}

#[tokio::test]
async fn submit_before_hook_can_rewrite_the_payload() {
    let seen = Seen::default();
    let calls = Rc::new(Cell::new(0));
    let form = recording_form(
        &seen,
        FormOptions {
            plugins: vec![Rc::new(Stamp { calls: Rc::clone(&calls) })],
            ..Default::default()
        },
    );

    form.submit().await.unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(seen.borrow()[0]["stamp"], json!(1));
    assert!(form.get_model(true).get("stamp").is_none());
}

#[tokio::test]
async fn submit_button_runs_the_flow() {
    let seen = Seen::default();
    let form = recording_form(&seen, FormOptions::default());
    let host = TestHost::setup(form).unwrap();

    assert_eq!(host.button("提交").prop("loading"), Some(&json!(false)));
    host.click("提交").await;
    assert_eq!(seen.borrow().len(), 1);
}

#[tokio::test]
async fn reset_button_restores_defaults() {
    let seen = Seen::default();
    let form = recording_form(&seen, FormOptions::default());
    let host = TestHost::setup(form.clone()).unwrap();

    form.set_model(json!({ "name": "changed" }), true);
    host.click("重置").await;
    assert_eq!(form.get_model(true)["name"], json!("juetan"));
}
