//! Form engine for Anvil.
//!
//! A form is declared as [`FormOptions`]: a model, a list of
//! [`UseFormItem`]s and an optional submit function. Setter plugins turn every
//! item into a bound widget; the [`Form`] handle drives submit, model access
//! and the optional dialog.
//!
//! ```ignore
//! let form = create_form(FormOptions {
//!     items: vec![
//!         UseFormItem::new("name").label("姓名").rule("required"),
//!         UseFormItem::new("gender")
//!             .label("性别")
//!             .setter(Setter::select(vec![json!({ "label": "男", "value": 1 })])),
//!     ],
//!     submit: Some(submit_fn(|model, _items| async move { save(model).await })),
//!     ..Default::default()
//! })?;
//! ```

pub mod defaults;
pub mod error;
pub mod form;
pub mod item;
pub mod plugins;
pub mod setters;

pub use defaults::{create_form, create_form_with, default_config, default_plugins, form_builder};
pub use error::FormError;
pub use form::{
    submit_fn, Form, FormOptions, FormPlugin, FormRef, SubmitFn, SubmitOutcome, SubmitPhase,
    WeakForm, ON_OPTIONS_ITEM, ON_OPTIONS_ITEM_BEFORE, ON_SETUP_ITEM, ON_SUBMIT_BEFORE,
};
pub use item::{
    FormItem, ItemArg, ItemFlag, ItemSlot, ItemSlots, OptionLoader, Rule, RuleSpec, SelectSource,
    Setter, UseFormItem,
};
pub use plugins::{ModalOptions, ModalTrigger};
