//! Update dialog: a nested dialog form without trigger, opened with a row
//! through `Table::open_update_modal`.

use anvil_core::{Child, ComponentSpec, Engine, HookResult, Node, Plugin, SetupContext};
use anvil_form::{Form, ModalOptions, ModalTrigger};

use crate::plugins::modal_form;
use crate::table::{Table, TableOptions, TablePlugin};

/// Capability holding the nested update form.
#[derive(Clone)]
pub struct UpdateForm(pub Form);

pub struct UpdatePlugin;

impl Plugin<Table> for UpdatePlugin {
    fn name(&self) -> &str {
        "update"
    }

    fn on_options(&self, table: &Table, options: &mut TableOptions) -> HookResult {
        let Some(mut update) = options.update.take() else {
            return Ok(());
        };
        update.modal.get_or_insert_with(ModalOptions::new).trigger = ModalTrigger::Hidden;

        let form = modal_form(table, update, "update", &options.items)?;
        tracing::debug!(table = %table.id(), form = %form.id(), "update form created");
        table.shared().insert(UpdateForm(form));
        table.add_child(Child::new(render_update).with_key("update"));
        Ok(())
    }

    fn on_component(&self, table: &Table, component: &mut ComponentSpec) -> HookResult {
        let update = table.shared().get::<UpdateForm>().cloned();
        if let Some(update) = update {
            component.provide(update);
        }
        Ok(())
    }

    fn on_setup(&self, table: &Table, ctx: &mut SetupContext) -> HookResult {
        if let Some(form) = table.get_update_form() {
            ctx.nest(form.setup()?);
        }
        Ok(())
    }
}

impl TablePlugin for UpdatePlugin {}

fn render_update(table: &Table) -> Node {
    table
        .get_update_form()
        .map(|form| form.render())
        .unwrap_or_default()
}
