//! Search form rendered inside the toolbar.
//!
//! The search model is merged under every load's parameters. Items default
//! from the table's shared `items`; with `search.labelAsPlaceholder` their
//! label doubles as placeholder, and `search.autoSubmitItem` appends a search
//! button that reloads the table.

use anvil_core::{
    defaults_deep, handler, ComponentSpec, Engine, HookResult, Node, Plugin, SetupContext,
};
use anvil_form::{create_form, Form, FormOptions, ItemArg, Setter, UseFormItem};
use serde_json::{json, Value};

use crate::plugins::defaults_items;
use crate::plugins::toolbar::push_toolbar_item;
use crate::table::{SearchSpec, Table, TableOptions, TablePlugin, WeakTable};
use crate::toolbar::UseToolbarItem;

/// Capability holding the nested search form.
#[derive(Clone)]
pub struct SearchForm(pub Form);

pub struct SearchPlugin;

impl Plugin<Table> for SearchPlugin {
    fn name(&self) -> &str {
        "search"
    }

    fn on_options(&self, table: &Table, options: &mut TableOptions) -> HookResult {
        let Some(spec) = options.search.take() else {
            return Ok(());
        };
        let config = table.config();

        let mut search = match spec {
            SearchSpec::Items(items) => FormOptions {
                items,
                ..Default::default()
            },
            SearchSpec::Form(search) => search,
        };
        search.submit = None;
        search.modal = None;
        defaults_deep(&mut search.config, config.section("search"));
        defaults_items(&mut search.items, &options.items);

        if config.get_or("search.labelAsPlaceholder", true) {
            for item in &mut search.items {
                if item.placeholder.is_none() {
                    item.placeholder = item.label.clone();
                }
            }
        }
        let has_submit = search
            .items
            .iter()
            .any(|item| item.setter_tag() == Some("submit"));
        if config.get_or("search.autoSubmitItem", true) && !has_submit {
            let text = config.get_or("search.searchText", "搜索".to_string());
            search.items.push(search_item(table.downgrade(), text));
        }

        let form = create_form(search)?;
        tracing::debug!(table = %table.id(), form = %form.id(), "search form created");
        table.shared().insert(SearchForm(form));

        push_toolbar_item(
            table,
            UseToolbarItem::new()
                .key("search")
                .order(config.get_or("search.orderInToolbar", 75))
                .render(render_search),
        )
    }

    fn on_component(&self, table: &Table, component: &mut ComponentSpec) -> HookResult {
        let search = table.shared().get::<SearchForm>().cloned();
        if let Some(search) = search {
            component.provide(search);
        }
        Ok(())
    }

    fn on_setup(&self, table: &Table, ctx: &mut SetupContext) -> HookResult {
        if let Some(form) = table.get_search_form() {
            ctx.nest(form.setup()?);
        }
        Ok(())
    }
}

impl TablePlugin for SearchPlugin {
    fn on_load_before(&self, table: &Table, params: &mut Value) -> HookResult {
        if let Some(form) = table.get_search_form() {
            defaults_deep(params, &form.get_model(false));
        }
        Ok(())
    }
}

fn render_search(table: &Table) -> Node {
    match table.get_search_form() {
        Some(form) => Node::element("div")
            .prop("class", "an-table-inline-search")
            .child(form.render()),
        None => Node::Empty,
    }
}

/// Submit row of the search form: one primary button reloading the table.
fn search_item(table: WeakTable, text: String) -> UseFormItem {
    UseFormItem::new("")
        .setter(Setter::Submit)
        .item_props(json!({ "style": { "marginRight": "0" } }))
        .item_slot("default", move |_: &ItemArg| {
            let loading = table.upgrade().is_some_and(|table| table.loading());
            let reload = table.clone();
            Node::element("Button")
                .prop("type", "primary")
                .prop("loading", loading)
                .on(
                    "click",
                    handler(move |_| {
                        let table = reload.upgrade();
                        async move {
                            if let Some(table) = table {
                                table.load(json!({})).await;
                            }
                        }
                    }),
                )
                .slot("icon", Node::element("IconSearch"))
                .child(Node::text(text.clone()))
        })
}
