//! Built-in form plugins.

pub mod form;
pub mod modal;
pub mod model;

pub use form::{render_item, FormBase};
pub use modal::{ModalOptions, ModalPlugin, ModalTrigger};
pub use model::{bind_model, ModelPlugin, ModelSnapshot};
