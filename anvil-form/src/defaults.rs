//! Default form factory.
//!
//! [`form_builder`] starts from the built-in plugins and configuration;
//! [`create_form`] / [`create_form_with`] use a per-thread factory built from
//! it.

use std::rc::Rc;

use anvil_core::{EngineBuilder, EngineError, Factory, MaybeFn, MergeMode};
use serde_json::{json, Value};

use crate::form::{Form, FormOptions, FormPlugin};
use crate::plugins::{FormBase, ModalPlugin, ModelPlugin};
use crate::setters::{SelectSetter, SubmitSetter, WidgetSetter};

thread_local! {
    static DEFAULT_FACTORY: Factory<Form> = form_builder().build();
}

/// Built-in plugins in dispatch order.
pub fn default_plugins() -> Vec<Rc<dyn FormPlugin>> {
    let plugins: [Rc<dyn FormPlugin>; 15] = [
        Rc::new(FormBase),
        Rc::new(ModelPlugin),
        Rc::new(ModalPlugin),
        Rc::new(WidgetSetter::input()),
        Rc::new(WidgetSetter::number()),
        Rc::new(WidgetSetter::password()),
        Rc::new(WidgetSetter::search()),
        Rc::new(WidgetSetter::textarea()),
        Rc::new(SelectSetter),
        Rc::new(WidgetSetter::tree_select()),
        Rc::new(WidgetSetter::cascader()),
        Rc::new(WidgetSetter::time()),
        Rc::new(WidgetSetter::date()),
        Rc::new(WidgetSetter::date_range()),
        Rc::new(SubmitSetter),
    ];
    plugins.into()
}

/// Built-in configuration.
pub fn default_config() -> Value {
    json!({
        "formProps": { "layout": "vertical" },
        "item": { "itemProps": {} },
        "model": {},
        "submitLoading": true,
        "rules": {
            "required": { "required": true, "message": "该项不能为空" },
            "string": { "type": "string", "message": "请输入文本" },
            "number": { "type": "number", "message": "请输入数字" },
            "email": { "type": "email", "message": "邮箱格式错误" },
            "url": { "type": "url", "message": "链接格式错误" },
            "ip": { "type": "ip", "message": "IP格式错误" },
            "phone": { "match": "^1[3-9]\\d{9}$", "message": "手机号格式错误" },
            "idcard": { "match": "^\\d{17}[\\dXx]$", "message": "身份证格式错误" },
            "alphabet": { "match": "^[a-zA-Z]+$", "message": "请输入英文字母" },
            "password": { "match": "^\\S{6,21}$", "message": "密码为6-21位非空字符" },
        },
        "modal": {
            "title": "操作",
            "width": 600,
            "modalProps": {
                "titleAlign": "start",
                "closable": false,
                "unmountOnClose": true,
                "maskClosable": false,
                "visible": false,
            },
        },
        "input": { "placeholder": "请输入", "setterProps": { "allowClear": true } },
        "password": { "placeholder": "请输入" },
        "number": { "setterProps": { "defaultValue": 0, "allowClear": true } },
        "textarea": { "placeholder": "请输入" },
        "search": { "placeholder": "请输入" },
        "select": { "placeholder": "请选择", "setterProps": { "allowClear": true } },
        "selectOpt": { "loadOn": "mounted" },
        "treeSelect": { "placeholder": "请输入" },
        "cascader": {
            "placeholder": "请输入",
            "setterProps": { "allowClear": true, "expandTrigger": "hover" },
        },
        "time": { "placeholder": "请输入", "setterProps": { "allowClear": true } },
        "date": { "placeholder": "请输入", "setterProps": { "allowClear": true } },
        "dateRange": { "placeholder": "请输入", "setterProps": { "allowClear": true } },
        "submit": {
            "setterProps": { "submitText": "提交", "resetText": "重置" },
            "itemProps": { "hideLabel": true },
        },
    })
}

/// A builder preloaded with the built-in plugins and configuration.
pub fn form_builder() -> EngineBuilder<Form> {
    EngineBuilder::new("AnForm")
        .set_config(default_config(), MergeMode::Merge)
        .use_plugins(default_plugins())
}

/// Create a form with the default factory.
pub fn create_form(options: FormOptions) -> Result<Form, EngineError> {
    DEFAULT_FACTORY.with(|factory| factory.create_with_options(options))
}

/// Create a form from an options factory called with the new handle.
pub fn create_form_with(
    options: impl FnOnce(&Form) -> FormOptions + 'static,
) -> Result<Form, EngineError> {
    DEFAULT_FACTORY.with(|factory| factory.create(MaybeFn::from_fn(options)))
}
