//! Built-in table plugins.

pub mod action;
pub mod create;
pub mod delete;
pub mod paging;
pub mod search;
pub mod select;
pub mod table;
pub mod toolbar;
pub mod update;

pub use action::ActionPlugin;
pub use create::{CreateForm, CreatePlugin};
pub use delete::DeletePlugin;
pub use paging::{PagingPlugin, PagingSwitch};
pub use search::{SearchForm, SearchPlugin};
pub use select::SelectPlugin;
pub use table::{TableBase, TableSlots};
pub use toolbar::{push_toolbar_item, ToolbarPlugin};
pub use update::{UpdateForm, UpdatePlugin};

use anvil_core::{defaults_deep, BoxError, Engine, EngineError};
use anvil_form::{create_form, submit_fn, Form, FormOptions, ModalOptions, SubmitFn, UseFormItem};

use crate::table::{Table, WeakTable};

/// Fill every item from the template declaring the same field.
pub fn defaults_items(items: &mut [UseFormItem], templates: &[UseFormItem]) {
    for item in items {
        if let Some(template) = templates.iter().find(|t| t.field == item.field) {
            item.defaults_from(template);
        }
    }
}

/// Create a dialog form nested in `table`: configuration defaults come from
/// the table's `section`, items from `templates`, and a successful submit
/// reloads the table.
pub(crate) fn modal_form(
    table: &Table,
    mut options: FormOptions,
    section: &str,
    templates: &[UseFormItem],
) -> Result<Form, EngineError> {
    defaults_deep(&mut options.config, table.config().section(section));
    defaults_items(&mut options.items, templates);
    options.modal.get_or_insert_with(ModalOptions::new);
    options.submit = options
        .submit
        .map(|submit| reload_after(submit, table.downgrade()));
    create_form(options)
}

fn reload_after(submit: SubmitFn, table: WeakTable) -> SubmitFn {
    submit_fn(move |model, items| {
        let submitted = submit(model, items);
        let table = table.clone();
        async move {
            submitted.await?;
            if let Some(table) = table.upgrade() {
                table.reload().await;
            }
            Ok::<(), BoxError>(())
        }
    })
}
