//! Form item model.
//!
//! Callers declare fields as [`UseFormItem`] values. During option parsing
//! each one is merged with configuration defaults and turned into a
//! [`FormItem`], whose `visible` / `disable` / `rules` switches are evaluated
//! lazily against the bound model.

use std::borrow::Cow;
use std::cell::{RefCell, RefMut};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use anvil_core::{
    defaults_deep, unique_id, BoxError, Extensions, FieldPath, Flag, LoadOn, Memo, Node,
    Observable, Signal, Slot, Slots,
};
use futures_util::future::{self, FutureExt, LocalBoxFuture};
use serde_json::Value;

use crate::form::Form;

/// Binding argument of item and setter slots.
#[derive(Clone)]
pub struct ItemArg {
    pub form: Form,
    pub item: Rc<FormItem>,
}

pub type ItemSlot = Slot<ItemArg>;
pub type ItemSlots = Slots<ItemArg>;

/// `visible` / `disable` switch of an item, evaluated with the item and the model.
pub type ItemFlag = Flag<FormItem, Value>;

// ── Setters ────────────────────────────────────────────────────────────────

/// Async source of select options.
pub type OptionLoader =
    Rc<dyn Fn(&FormItem) -> LocalBoxFuture<'static, Result<Vec<Value>, BoxError>>>;

/// Where a select field takes its options from.
#[derive(Clone)]
pub struct SelectSource {
    pub(crate) load: OptionLoader,
    pub(crate) load_on: Option<LoadOn>,
}

impl SelectSource {
    /// A fixed option list.
    pub fn options(options: Vec<Value>) -> Self {
        let options = Rc::new(options);
        Self {
            load: Rc::new(move |_: &FormItem| {
                future::ready(Ok(options.as_ref().clone())).boxed_local()
            }),
            load_on: None,
        }
    }

    /// Options produced by an async loader.
    pub fn loader<F, Fut>(load: F) -> Self
    where
        F: Fn(&FormItem) -> Fut + 'static,
        Fut: Future<Output = Result<Vec<Value>, BoxError>> + 'static,
    {
        Self {
            load: Rc::new(move |item: &FormItem| load(item).boxed_local()),
            load_on: None,
        }
    }

    /// Override `selectOpt.loadOn` for this field.
    pub fn load_on(mut self, load_on: LoadOn) -> Self {
        self.load_on = Some(load_on);
        self
    }
}

impl From<Vec<Value>> for SelectSource {
    fn from(options: Vec<Value>) -> Self {
        SelectSource::options(options)
    }
}

/// Input kind of an item. Each tag is owned by one setter plugin.
#[derive(Clone)]
pub enum Setter {
    Input,
    Password,
    Number,
    Textarea,
    Search,
    Select(Option<SelectSource>),
    TreeSelect,
    Cascader,
    Time,
    Date,
    DateRange,
    Submit,
    /// Handled by a caller plugin.
    Custom(Cow<'static, str>),
}

impl Setter {
    pub fn select(source: impl Into<SelectSource>) -> Self {
        Setter::Select(Some(source.into()))
    }

    pub fn tag(&self) -> &str {
        match self {
            Setter::Input => "input",
            Setter::Password => "password",
            Setter::Number => "number",
            Setter::Textarea => "textarea",
            Setter::Search => "search",
            Setter::Select(_) => "select",
            Setter::TreeSelect => "treeSelect",
            Setter::Cascader => "cascader",
            Setter::Time => "time",
            Setter::Date => "date",
            Setter::DateRange => "dateRange",
            Setter::Submit => "submit",
            Setter::Custom(tag) => tag,
        }
    }
}

impl fmt::Debug for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Setter({})", self.tag())
    }
}

// ── Rules ──────────────────────────────────────────────────────────────────

/// A validation rule handed to the host's form widget.
#[derive(Clone, Debug)]
pub struct Rule {
    pub props: Value,
    pub disable: Option<ItemFlag>,
}

impl Rule {
    pub fn new(props: Value) -> Self {
        Self {
            props,
            disable: None,
        }
    }

    pub fn disable(mut self, disable: impl Into<ItemFlag>) -> Self {
        self.disable = Some(disable.into());
        self
    }
}

/// A rule as declared: inline, or a name looked up in `config.rules`.
#[derive(Clone, Debug)]
pub enum RuleSpec {
    Named(String),
    Rule(Rule),
}

impl From<&str> for RuleSpec {
    fn from(name: &str) -> Self {
        RuleSpec::Named(name.to_string())
    }
}

impl From<Rule> for RuleSpec {
    fn from(rule: Rule) -> Self {
        RuleSpec::Rule(rule)
    }
}

// ── Declared item ──────────────────────────────────────────────────────────

/// A field as declared in the form options.
#[derive(Clone, Default)]
pub struct UseFormItem {
    pub field: String,
    pub value: Option<Value>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    pub visible: Option<ItemFlag>,
    pub disable: Option<ItemFlag>,
    pub setter: Option<Setter>,
    pub setter_props: Value,
    pub setter_slots: ItemSlots,
    pub item_props: Value,
    pub item_slots: ItemSlots,
    pub rules: Vec<RuleSpec>,
}

impl UseFormItem {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Self::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn visible(mut self, visible: impl Into<ItemFlag>) -> Self {
        self.visible = Some(visible.into());
        self
    }

    pub fn disable(mut self, disable: impl Into<ItemFlag>) -> Self {
        self.disable = Some(disable.into());
        self
    }

    pub fn setter(mut self, setter: Setter) -> Self {
        self.setter = Some(setter);
        self
    }

    pub fn setter_props(mut self, props: Value) -> Self {
        self.setter_props = props;
        self
    }

    pub fn item_props(mut self, props: Value) -> Self {
        self.item_props = props;
        self
    }

    pub fn setter_slot(
        mut self,
        name: impl Into<String>,
        slot: impl Fn(&ItemArg) -> Node + 'static,
    ) -> Self {
        self.setter_slots.insert(name.into(), Rc::new(slot));
        self
    }

    pub fn item_slot(
        mut self,
        name: impl Into<String>,
        slot: impl Fn(&ItemArg) -> Node + 'static,
    ) -> Self {
        self.item_slots.insert(name.into(), Rc::new(slot));
        self
    }

    pub fn rule(mut self, rule: impl Into<RuleSpec>) -> Self {
        self.rules.push(rule.into());
        self
    }

    /// Tag of the declared setter, if any.
    pub fn setter_tag(&self) -> Option<&str> {
        self.setter.as_ref().map(Setter::tag)
    }

    /// Fill unset fields from a configuration section such as `config.input`.
    ///
    /// Recognized keys: `label`, `placeholder`, `value`, `required`,
    /// `setterProps`, `itemProps`.
    pub fn apply_defaults(&mut self, defaults: &Value) {
        if self.label.is_none() {
            self.label = string_at(defaults, "label");
        }
        if self.placeholder.is_none() {
            self.placeholder = string_at(defaults, "placeholder");
        }
        if self.value.is_none() {
            self.value = defaults.get("value").filter(|v| !v.is_null()).cloned();
        }
        if self.required.is_none() {
            self.required = defaults.get("required").and_then(Value::as_bool);
        }
        if let Some(props) = defaults.get("setterProps") {
            defaults_deep(&mut self.setter_props, props);
        }
        if let Some(props) = defaults.get("itemProps") {
            defaults_deep(&mut self.item_props, props);
        }
    }

    /// Fill unset fields from another declaration of the same field.
    pub fn defaults_from(&mut self, source: &UseFormItem) {
        self.value = self.value.take().or_else(|| source.value.clone());
        self.label = self.label.take().or_else(|| source.label.clone());
        self.placeholder = self.placeholder.take().or_else(|| source.placeholder.clone());
        self.required = self.required.or(source.required);
        self.visible = self.visible.take().or_else(|| source.visible.clone());
        self.disable = self.disable.take().or_else(|| source.disable.clone());
        self.setter = self.setter.take().or_else(|| source.setter.clone());
        defaults_deep(&mut self.setter_props, &source.setter_props);
        defaults_deep(&mut self.item_props, &source.item_props);
        for (name, slot) in &source.setter_slots {
            self.setter_slots
                .entry(name.clone())
                .or_insert_with(|| Rc::clone(slot));
        }
        for (name, slot) in &source.item_slots {
            self.item_slots
                .entry(name.clone())
                .or_insert_with(|| Rc::clone(slot));
        }
        if self.rules.is_empty() {
            self.rules = source.rules.clone();
        }
    }
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

impl fmt::Debug for UseFormItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UseFormItem")
            .field("field", &self.field)
            .field("setter", &self.setter)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

// ── Parsed item ────────────────────────────────────────────────────────────

/// A parsed form item.
///
/// Render-relevant fields are plain data; the switches are private and read
/// through [`FormItem::visible`], [`FormItem::disabled`] and
/// [`FormItem::rules`], which cache their result until the model (or a
/// backing cell) changes.
pub struct FormItem {
    /// Stable render key.
    pub key: String,
    pub field: String,
    /// Parsed `field`; `None` for rows without a field (e.g. submit).
    pub path: Option<FieldPath>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub required: bool,
    pub setter: Option<Setter>,
    /// Default value seeded into the model.
    pub value: Value,
    pub item_props: Value,
    pub item_slots: ItemSlots,
    pub setter_slots: ItemSlots,
    visible: ItemFlag,
    disable: ItemFlag,
    rules: Vec<Rule>,
    setter_props: Signal<Value>,
    shared: RefCell<Extensions>,
    visibled: Memo<bool>,
    disabled: Memo<bool>,
    rulesed: Memo<Vec<Value>>,
}

impl FormItem {
    pub(crate) fn new(item: &UseFormItem, rules: Vec<Rule>) -> Self {
        let key = item
            .item_props
            .get("key")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(unique_id);
        let path = (!item.field.is_empty()).then(|| FieldPath::parse(&item.field));
        Self {
            key,
            path,
            field: item.field.clone(),
            label: item.label.clone(),
            placeholder: item.placeholder.clone(),
            required: item.required.unwrap_or(false),
            setter: item.setter.clone(),
            value: item.value.clone().unwrap_or(Value::Null),
            item_props: item.item_props.clone(),
            item_slots: item.item_slots.clone(),
            setter_slots: item.setter_slots.clone(),
            visible: item.visible.clone().unwrap_or(Flag::Value(true)),
            disable: item.disable.clone().unwrap_or(Flag::Value(false)),
            rules,
            setter_props: Signal::new(item.setter_props.clone()),
            shared: RefCell::new(Extensions::new()),
            visibled: Memo::new(),
            disabled: Memo::new(),
            rulesed: Memo::new(),
        }
    }

    /// Fill unset fields of a parsed item from a configuration section.
    pub fn apply_defaults(&mut self, defaults: &Value) {
        if self.label.is_none() {
            self.label = string_at(defaults, "label");
        }
        if self.placeholder.is_none() {
            self.placeholder = string_at(defaults, "placeholder");
        }
        if let Some(props) = defaults.get("setterProps") {
            self.setter_props.update(|current| defaults_deep(current, props));
        }
        if let Some(props) = defaults.get("itemProps") {
            defaults_deep(&mut self.item_props, props);
        }
    }

    pub fn setter_tag(&self) -> &str {
        self.setter.as_ref().map(Setter::tag).unwrap_or_default()
    }

    pub fn visible_flag(&self) -> &ItemFlag {
        &self.visible
    }

    pub fn visible(&self, form: &Form) -> bool {
        let model = form.model();
        let mut deps: Vec<&dyn Observable> = vec![model as &dyn Observable];
        deps.extend(self.visible.source());
        self.visibled
            .get(&deps, || model.with(|m| self.visible.eval(self, m)))
    }

    pub fn disabled(&self, form: &Form) -> bool {
        let model = form.model();
        let mut deps: Vec<&dyn Observable> = vec![model as &dyn Observable];
        deps.extend(self.disable.source());
        self.disabled
            .get(&deps, || model.with(|m| self.disable.eval(self, m)))
    }

    /// Effective rules: every declared rule whose `disable` switch is off.
    pub fn rules(&self, form: &Form) -> Vec<Value> {
        let model = form.model();
        let mut deps: Vec<&dyn Observable> = vec![model as &dyn Observable];
        deps.extend(
            self.rules
                .iter()
                .filter_map(|rule| rule.disable.as_ref().and_then(Flag::source)),
        );
        self.rulesed.get(&deps, || {
            model.with(|m| {
                self.rules
                    .iter()
                    .filter(|rule| !rule.disable.as_ref().is_some_and(|d| d.eval(self, m)))
                    .map(|rule| rule.props.clone())
                    .collect()
            })
        })
    }

    /// Current value of the bound field.
    pub fn get_value(&self, form: &Form) -> Value {
        match &self.path {
            Some(path) => form.model().with(|m| path.get(m)),
            None => Value::Null,
        }
    }

    pub fn setter_props(&self) -> Value {
        self.setter_props.get()
    }

    pub fn set_setter_prop(&self, name: &str, value: Value) {
        self.setter_props.update(|props| {
            if !props.is_object() {
                *props = Value::Object(Default::default());
            }
            if let Value::Object(map) = props {
                map.insert(name.to_string(), value);
            }
        });
    }

    /// Per-item scratch map for setter plugins.
    pub fn shared(&self) -> RefMut<'_, Extensions> {
        self.shared.borrow_mut()
    }

    pub fn shared_mut(&mut self) -> &mut Extensions {
        self.shared.get_mut()
    }
}

impl fmt::Debug for FormItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormItem")
            .field("key", &self.key)
            .field("field", &self.field)
            .field("setter", &self.setter)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
