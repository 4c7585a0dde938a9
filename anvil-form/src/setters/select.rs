use std::rc::Rc;

use anvil_core::{ComponentSpec, Engine, HookResult, LoadOn, Plugin, SetupContext};
use serde_json::Value;

use crate::error::FormError;
use crate::form::{Form, FormPlugin};
use crate::item::{FormItem, OptionLoader, Setter, UseFormItem};
use crate::setters::install_widget;

/// Resolved option source of one select item.
#[derive(Clone)]
struct SelectMeta {
    load: OptionLoader,
    load_on: LoadOn,
}

/// Capability behind `Form::load_option` / `Form::load_options`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionLoading;

impl OptionLoading {
    pub async fn load(&self, item: &FormItem) -> Result<(), FormError> {
        load_item_options(item).await
    }
}

/// Run the item's option loader and store the result as the `options`
/// setter prop. Items without a loader are left alone.
pub async fn load_item_options(item: &FormItem) -> Result<(), FormError> {
    let load = item.shared().get::<SelectMeta>().map(|meta| Rc::clone(&meta.load));
    let Some(load) = load else {
        return Ok(());
    };
    let options = load(item).await.map_err(|source| FormError::Load {
        field: item.field.clone(),
        source,
    })?;
    tracing::debug!(field = %item.field, count = options.len(), "select options loaded");
    item.set_setter_prop("options", Value::Array(options));
    Ok(())
}

async fn load_logged(item: Rc<FormItem>) {
    if let Err(err) = load_item_options(&item).await {
        tracing::warn!(error = %err, "select options failed to load");
    }
}

pub struct SelectSetter;

impl Plugin<Form> for SelectSetter {
    fn name(&self) -> &str {
        "select"
    }

    fn on_component(&self, _form: &Form, component: &mut ComponentSpec) -> HookResult {
        component.provide(OptionLoading);
        Ok(())
    }
}

impl FormPlugin for SelectSetter {
    fn on_options_item_before(&self, form: &Form, item: &mut UseFormItem) -> HookResult {
        if item.setter_tag() != Some("select") {
            return Ok(());
        }
        install_widget(form, item, "select", "Select");
        Ok(())
    }

    fn on_options_item(&self, form: &Form, item: &UseFormItem, target: &mut FormItem) -> HookResult {
        let Some(Setter::Select(Some(source))) = &item.setter else {
            return Ok(());
        };
        let load_on = source
            .load_on
            .or_else(|| form.config().get::<LoadOn>("selectOpt.loadOn").ok())
            .unwrap_or_default();
        target.shared_mut().insert(SelectMeta {
            load: Rc::clone(&source.load),
            load_on,
        });
        Ok(())
    }

    fn on_setup_item(&self, _form: &Form, item: &Rc<FormItem>, ctx: &mut SetupContext) -> HookResult {
        let load_on = item.shared().get::<SelectMeta>().map(|meta| meta.load_on);
        match load_on {
            Some(LoadOn::Setup) => ctx.spawn(load_logged(Rc::clone(item))),
            Some(LoadOn::Mounted) => {
                let item = Rc::clone(item);
                ctx.on_mounted(move || load_logged(item));
            }
            Some(LoadOn::Never) | None => {}
        }
        Ok(())
    }
}
