//! The form engine.

use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};

use anvil_core::model::{contract, expand};
use anvil_core::{
    assign_deep, BoxError, Core, Engine, EngineOptions, HookResult, Memo, MergeMode, Observable,
    Plugin, Reserved, SetupContext, Signal,
};
use futures_util::future::{FutureExt, LocalBoxFuture};
use serde_json::{json, Value};

use crate::error::FormError;
use crate::item::{FormItem, UseFormItem};
use crate::plugins::model::ModelSnapshot;
use crate::plugins::modal::ModalOptions;
use crate::setters::select::OptionLoading;

// ── Hooks ──────────────────────────────────────────────────────────────────

pub const ON_OPTIONS_ITEM_BEFORE: &str = "onOptionsItemBefore";
pub const ON_OPTIONS_ITEM: &str = "onOptionsItem";
pub const ON_SETUP_ITEM: &str = "onSetupItem";
pub const ON_SUBMIT_BEFORE: &str = "onSubmitBefore";

/// Plugin of the form engine.
pub trait FormPlugin: Plugin<Form> {
    /// Runs over every declared item before any is parsed. Setters install
    /// their defaults and default slot here.
    fn on_options_item_before(&self, _form: &Form, _item: &mut UseFormItem) -> HookResult {
        Ok(())
    }

    /// Runs once per parsed item, before it joins the item list.
    fn on_options_item(
        &self,
        _form: &Form,
        _item: &UseFormItem,
        _target: &mut FormItem,
    ) -> HookResult {
        Ok(())
    }

    /// Runs once per item on every `setup`.
    fn on_setup_item(
        &self,
        _form: &Form,
        _item: &Rc<FormItem>,
        _ctx: &mut SetupContext,
    ) -> HookResult {
        Ok(())
    }

    /// Runs after validation, before the caller's submit function. `model` is
    /// the value about to be submitted.
    fn on_submit_before(&self, _form: &Form, _model: &mut Value) -> HookResult {
        Ok(())
    }
}

// ── Options ────────────────────────────────────────────────────────────────

/// Caller submit function: receives the expanded model and the parsed items.
pub type SubmitFn =
    Rc<dyn Fn(Value, Vec<Rc<FormItem>>) -> LocalBoxFuture<'static, Result<(), BoxError>>>;

/// Wrap an async closure as a [`SubmitFn`].
pub fn submit_fn<F, Fut>(f: F) -> SubmitFn
where
    F: Fn(Value, Vec<Rc<FormItem>>) -> Fut + 'static,
    Fut: Future<Output = Result<(), BoxError>> + 'static,
{
    Rc::new(move |model, items| f(model, items).boxed_local())
}

#[derive(Default)]
pub struct FormOptions {
    pub name: Option<String>,
    pub config: Value,
    pub plugins: Vec<Rc<dyn FormPlugin>>,
    pub form_props: Value,
    pub model: Value,
    pub items: Vec<UseFormItem>,
    pub submit: Option<SubmitFn>,
    pub modal: Option<ModalOptions>,
}

impl EngineOptions for FormOptions {
    type Plugin = dyn FormPlugin;

    fn take_reserved(&mut self) -> Reserved<dyn FormPlugin> {
        Reserved {
            name: self.name.take(),
            config: std::mem::take(&mut self.config),
            plugins: std::mem::take(&mut self.plugins),
        }
    }
}

// ── Host form handle ───────────────────────────────────────────────────────

/// Native handle of the rendered form widget.
pub trait FormRef {
    /// Validate every field. `None` when valid, the field errors otherwise.
    fn validate(&self) -> LocalBoxFuture<'static, Option<Value>>;
}

/// Submit flow position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation passed and the submit function (if any) succeeded.
    Submitted,
    /// Validation failed; carries the field errors.
    Invalid(Value),
    /// Another submit was already in flight.
    Busy,
}

// ── Form ───────────────────────────────────────────────────────────────────

struct FormInner {
    core: Core<Form>,
    model: Signal<Value>,
    items: Signal<Vec<Rc<FormItem>>>,
    submit: RefCell<Option<SubmitFn>>,
    phase: Signal<SubmitPhase>,
    form_ref: RefCell<Option<Rc<dyn FormRef>>>,
    visible_items: Memo<Vec<Rc<FormItem>>>,
}

/// Handle to a form instance. Cloning is cheap and shares the instance.
#[derive(Clone)]
pub struct Form {
    inner: Rc<FormInner>,
}

/// Non-owning form handle, for plugins of nested components.
#[derive(Clone)]
pub struct WeakForm {
    inner: Weak<FormInner>,
}

impl WeakForm {
    pub fn upgrade(&self) -> Option<Form> {
        self.inner.upgrade().map(|inner| Form { inner })
    }
}

impl Engine for Form {
    type Options = FormOptions;
    type Plugin = dyn FormPlugin;

    fn core(&self) -> &Core<Self> {
        &self.inner.core
    }

    fn from_core(core: Core<Self>) -> Self {
        Form {
            inner: Rc::new(FormInner {
                core,
                model: Signal::new(json!({})),
                items: Signal::new(Vec::new()),
                submit: RefCell::new(None),
                phase: Signal::new(SubmitPhase::Idle),
                form_ref: RefCell::new(None),
                visible_items: Memo::new(),
            }),
        }
    }
}

impl Form {
    pub fn downgrade(&self) -> WeakForm {
        WeakForm {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Form) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The bound model cell.
    pub fn model(&self) -> &Signal<Value> {
        &self.inner.model
    }

    pub fn items(&self) -> Vec<Rc<FormItem>> {
        self.inner.items.get()
    }

    pub fn item(&self, field: &str) -> Option<Rc<FormItem>> {
        self.inner
            .items
            .with(|items| items.iter().find(|item| item.field == field).cloned())
    }

    pub(crate) fn update_items(&self, f: impl FnOnce(&mut Vec<Rc<FormItem>>)) {
        self.inner.items.update(f);
    }

    /// Items whose `visible` switch is on, in declaration order.
    pub fn visible_items(&self) -> Vec<Rc<FormItem>> {
        let items = self.items();
        let mut deps: Vec<&dyn Observable> = vec![
            &self.inner.items as &dyn Observable,
            &self.inner.model as &dyn Observable,
        ];
        deps.extend(items.iter().filter_map(|item| item.visible_flag().source()));
        self.inner.visible_items.get(&deps, || {
            items
                .iter()
                .filter(|item| item.visible(self))
                .cloned()
                .collect()
        })
    }

    /// Props of the root `Form` element.
    pub fn form_props(&self) -> Value {
        self.state()
            .with(|state| state.get("formProps").cloned().unwrap_or_else(|| json!({})))
    }

    pub(crate) fn set_submit(&self, submit: Option<SubmitFn>) {
        *self.inner.submit.borrow_mut() = submit;
    }

    pub fn has_submit(&self) -> bool {
        self.inner.submit.borrow().is_some()
    }

    // ── Submit ──

    pub fn phase(&self) -> SubmitPhase {
        self.inner.phase.get()
    }

    pub fn phase_signal(&self) -> &Signal<SubmitPhase> {
        &self.inner.phase
    }

    /// True while the caller's submit function runs, unless
    /// `config.submitLoading` is `false`.
    pub fn is_loading(&self) -> bool {
        self.phase() == SubmitPhase::Submitting && self.config().get_or("submitLoading", true)
    }

    /// Validate, run `onSubmitBefore`, then call the submit function.
    ///
    /// Validation failure short-circuits without calling the submit function.
    /// Errors from the submit function are returned as [`FormError::Submit`].
    pub async fn submit(&self) -> Result<SubmitOutcome, FormError> {
        if self.phase() != SubmitPhase::Idle {
            tracing::debug!(form = %self.id(), "submit already in flight");
            return Ok(SubmitOutcome::Busy);
        }

        self.inner.phase.set(SubmitPhase::Validating);
        let form_ref = self.get_form_ref();
        if let Some(form_ref) = form_ref {
            if let Some(errors) = form_ref.validate().await {
                tracing::debug!(form = %self.id(), %errors, "validation failed");
                self.inner.phase.set(SubmitPhase::Idle);
                return Ok(SubmitOutcome::Invalid(errors));
            }
        }

        let mut model = self.get_model(false);
        if let Err(err) = self
            .core()
            .call_each(ON_SUBMIT_BEFORE, |p| p.on_submit_before(self, &mut model))
        {
            self.inner.phase.set(SubmitPhase::Idle);
            return Err(err.into());
        }

        let submit = self.inner.submit.borrow().clone();
        let Some(submit) = submit else {
            self.inner.phase.set(SubmitPhase::Idle);
            return Ok(SubmitOutcome::Submitted);
        };

        self.inner.phase.set(SubmitPhase::Submitting);
        tracing::debug!(form = %self.id(), "submitting");
        let result = submit(model, self.items()).await;
        self.inner.phase.set(SubmitPhase::Idle);

        match result {
            Ok(()) => Ok(SubmitOutcome::Submitted),
            Err(err) => {
                tracing::warn!(form = %self.id(), error = %err, "submit failed");
                Err(FormError::Submit(err))
            }
        }
    }

    // ── Model ──

    /// The raw model, or the caller-facing view with path fields expanded.
    pub fn get_model(&self, raw: bool) -> Value {
        self.inner
            .model
            .with(|model| if raw { model.clone() } else { expand(model) })
    }

    /// Write `data` into the model: a deep merge into the raw model, or a
    /// path-aware write of an expanded view touching only known keys.
    pub fn set_model(&self, data: Value, raw: bool) {
        self.inner.model.update(|model| {
            if raw {
                assign_deep(model, data);
            } else {
                contract(model, &data);
            }
        });
    }

    /// Restore the snapshot taken after option parsing, then merge `additional`.
    pub fn reset_model(&self, additional: Option<Value>) {
        let snapshot = self.shared().get::<ModelSnapshot>().map(|s| s.0.clone());
        self.inner.model.update(|model| {
            if let Some(snapshot) = snapshot {
                *model = snapshot;
            }
            if let Some(additional) = additional {
                assign_deep(model, additional);
            }
        });
    }

    // ── Modal ──

    pub fn is_modal(&self) -> bool {
        self.state().with(|state| state.get("modal").is_some())
    }

    pub fn is_modal_open(&self) -> bool {
        self.state().with(|state| {
            state
                .pointer("/modal/modalProps/visible")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
    }

    /// Show the dialog, optionally writing `data` into the model first.
    pub fn open_modal(&self, data: Option<Value>) -> Result<(), FormError> {
        if !self.is_modal() {
            return Err(FormError::Unsupported("open_modal"));
        }
        if let Some(data) = data {
            self.set_model(data, false);
        }
        self.set_state(json!({ "modal": { "modalProps": { "visible": true } } }), MergeMode::Merge);
        Ok(())
    }

    /// Hide the dialog and reset the model.
    pub fn close_modal(&self) -> Result<(), FormError> {
        if !self.is_modal() {
            return Err(FormError::Unsupported("close_modal"));
        }
        self.hide_modal();
        Ok(())
    }

    pub(crate) fn hide_modal(&self) {
        self.set_state(json!({ "modal": { "modalProps": { "visible": false } } }), MergeMode::Merge);
        self.reset_model(None);
    }

    // ── Host handle ──

    pub fn get_form_ref(&self) -> Option<Rc<dyn FormRef>> {
        self.inner.form_ref.borrow().clone()
    }

    pub fn bind_form_ref(&self, form_ref: Rc<dyn FormRef>) {
        *self.inner.form_ref.borrow_mut() = Some(form_ref);
    }

    // ── Options loading ──

    /// Run the option loader of the select field bound to `field`.
    pub async fn load_option(&self, field: &str) -> Result<(), FormError> {
        let loading = self
            .capability::<OptionLoading>()
            .copied()
            .ok_or(FormError::Unsupported("load_option"))?;
        let item = self
            .item(field)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))?;
        loading.load(&item).await
    }

    /// Run every select option loader, one after another.
    pub async fn load_options(&self) -> Result<(), FormError> {
        let loading = self
            .capability::<OptionLoading>()
            .copied()
            .ok_or(FormError::Unsupported("load_options"))?;
        for item in self.items() {
            loading.load(&item).await?;
        }
        Ok(())
    }
}
