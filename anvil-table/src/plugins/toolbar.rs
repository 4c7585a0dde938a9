use std::mem::take;
use std::rc::Rc;

use anvil_core::{defaults_deep, unique_id, Child, Engine, Flag, HookResult, Node, Plugin};

use crate::table::{Table, TableOptions, TablePlugin, ON_OPTIONS_TOOLBAR_ITEM};
use crate::toolbar::{render_button, ToolbarItem, ToolbarPosition, UseToolbarItem};

/// Parses toolbar items and renders the toolbar row above the table.
pub struct ToolbarPlugin;

impl Plugin<Table> for ToolbarPlugin {
    fn name(&self) -> &str {
        "toolbar"
    }

    fn on_options(&self, table: &Table, options: &mut TableOptions) -> HookResult {
        for item in take(&mut options.toolbar) {
            push_toolbar_item(table, item)?;
        }
        table.push_toolbar_item(ToolbarItem::spacer(
            table.config().get_or("toolbar.spacerOrder", 50),
        ));
        table.add_child(Child::new(render_toolbar).with_key("toolbar").with_order(5));
        Ok(())
    }
}

impl TablePlugin for ToolbarPlugin {}

/// Parse a toolbar item and add it to the table.
///
/// Order falls back to `toolbar.leftOrder` / `toolbar.rightOrder` by
/// position, then to `toolbar.order`.
pub fn push_toolbar_item(table: &Table, item: UseToolbarItem) -> HookResult {
    let config = table.config();
    let order = item.order.unwrap_or_else(|| match item.position {
        Some(ToolbarPosition::Left) => config.get_or("toolbar.leftOrder", 25),
        Some(ToolbarPosition::Right) => config.get_or("toolbar.rightOrder", 75),
        None => config.get_or("toolbar.order", 25),
    });
    let key = item.key.clone().unwrap_or_else(unique_id);

    let mut target = match &item.render {
        Some(render) => {
            let render = Rc::clone(render);
            ToolbarItem::new(key, order, move |table, item| render(table, item))
        }
        None => ToolbarItem::new(key, order, render_button),
    };
    target.text = item.text.clone();
    target.icon = item.icon.clone();
    target.props = item.props.clone();
    defaults_deep(&mut target.props, config.section("toolbar.itemProps"));
    target.visible = item.visible.clone().unwrap_or(Flag::Value(true));
    target.disable = item.disable.clone().unwrap_or(Flag::Value(false));
    target.on_click = item.on_click.clone();

    table.core().call_each(ON_OPTIONS_TOOLBAR_ITEM, |p| {
        p.on_options_toolbar_item(table, &item, &mut target)
    })?;
    table.push_toolbar_item(target);
    Ok(())
}

fn render_toolbar(table: &Table) -> Node {
    let items = table.visible_toolbar_items();
    if items.iter().all(|item| item.is_spacer()) {
        return Node::Empty;
    }
    Node::element("div")
        .prop("class", "an-table-toolbar")
        .prop("style", serde_json::json!({ "display": "flex", "gap": "8px" }))
        .children(items.iter().map(|item| item.render(table)))
}
