//! Create dialog.
//!
//! A nested dialog form whose trigger button sits in the toolbar at
//! `create.orderInToolbar`, or next to the table when
//! `create.showInToolbar` is `false`.

use anvil_core::{Child, ComponentSpec, Engine, HookResult, Node, Plugin, SetupContext};
use anvil_form::{Form, ModalOptions, ModalTrigger};

use crate::plugins::modal_form;
use crate::plugins::toolbar::push_toolbar_item;
use crate::table::{Table, TableOptions, TablePlugin};
use crate::toolbar::UseToolbarItem;

/// Capability holding the nested create form.
#[derive(Clone)]
pub struct CreateForm(pub Form);

pub struct CreatePlugin;

impl Plugin<Table> for CreatePlugin {
    fn name(&self) -> &str {
        "create"
    }

    fn on_options(&self, table: &Table, options: &mut TableOptions) -> HookResult {
        let Some(mut create) = options.create.take() else {
            return Ok(());
        };
        let config = table.config();

        let modal = create.modal.get_or_insert_with(ModalOptions::new);
        if matches!(modal.trigger, ModalTrigger::Hidden) {
            modal.trigger = ModalTrigger::button(config.get_or("create.triggerText", "新增".to_string()));
        }
        let form = modal_form(table, create, "create", &options.items)?;
        tracing::debug!(table = %table.id(), form = %form.id(), "create form created");
        table.shared().insert(CreateForm(form));

        if config.get_or("create.showInToolbar", true) {
            push_toolbar_item(
                table,
                UseToolbarItem::new()
                    .key("create")
                    .order(config.get_or("create.orderInToolbar", 0))
                    .render(render_create),
            )?;
        } else {
            table.add_child(Child::new(render_create).with_key("create"));
        }
        Ok(())
    }

    fn on_component(&self, table: &Table, component: &mut ComponentSpec) -> HookResult {
        let create = table.shared().get::<CreateForm>().cloned();
        if let Some(create) = create {
            component.provide(create);
        }
        Ok(())
    }

    fn on_setup(&self, table: &Table, ctx: &mut SetupContext) -> HookResult {
        if let Some(form) = table.get_create_form() {
            ctx.nest(form.setup()?);
        }
        Ok(())
    }
}

impl TablePlugin for CreatePlugin {}

fn render_create(table: &Table) -> Node {
    table
        .get_create_form()
        .map(|form| form.render())
        .unwrap_or_default()
}
