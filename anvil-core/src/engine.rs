//! The generic component engine.
//!
//! A concrete engine is a cheap, clonable handle (usually an `Rc` around its
//! own state) that embeds a [`Core`]. The core owns the parts every engine
//! shares: effective configuration, ordered plugin list, observable state,
//! ordered children, the `shared` scratch map and the frozen component spec.
//! The [`Engine`] trait exposes them as provided methods.

use std::cell::{OnceCell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::Config;
use crate::error::EngineError;
use crate::extensions::Extensions;
use crate::hooks::{is_hook_name, Hook};
use crate::lifecycle::{Mount, SetupContext};
use crate::merge::{merge_with, MergeMode};
use crate::plugin::{HookResult, Plugin};
use crate::reactive::Signal;
use crate::render::Node;

static EMPTY_CONFIG: Config = Config::empty();

// ── Options ────────────────────────────────────────────────────────────────

/// Engine-reserved option keys, taken out of the options before any hook runs.
pub struct Reserved<P: ?Sized> {
    pub name: Option<String>,
    pub config: Value,
    pub plugins: Vec<Rc<P>>,
}

impl<P: ?Sized> Default for Reserved<P> {
    fn default() -> Self {
        Self {
            name: None,
            config: Value::Null,
            plugins: Vec::new(),
        }
    }
}

/// Domain options of an engine.
///
/// Implementors carry `name`, `config` and `plugins` fields next to their
/// domain fields and hand them over through [`take_reserved`], leaving the
/// domain part for the plugins.
///
/// [`take_reserved`]: EngineOptions::take_reserved
pub trait EngineOptions: Default + 'static {
    type Plugin: ?Sized + 'static;

    fn take_reserved(&mut self) -> Reserved<Self::Plugin>;
}

// ── Component spec ─────────────────────────────────────────────────────────

/// The component description handed to the host.
///
/// Plugins decorate it during `onComponent`; afterwards it is frozen.
/// Capabilities are typed objects a plugin makes available on this instance
/// (e.g. option loading for select fields).
pub struct ComponentSpec {
    name: String,
    capabilities: Extensions,
}

impl ComponentSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: Extensions::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn provide<C: 'static>(&mut self, capability: C) {
        self.capabilities.insert(capability);
    }

    pub fn capability<C: 'static>(&self) -> Option<&C> {
        self.capabilities.get::<C>()
    }
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities.len())
            .finish()
    }
}

// ── Children ───────────────────────────────────────────────────────────────

/// A renderable child of the root element.
pub struct Child<E> {
    key: String,
    order: i32,
    render: Rc<dyn Fn(&E) -> Node>,
}

impl<E> Clone for Child<E> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            order: self.order,
            render: Rc::clone(&self.render),
        }
    }
}

impl<E: 'static> Child<E> {
    pub const DEFAULT_ORDER: i32 = 10;

    /// A child keyed by the identity of its render function.
    pub fn new(render: impl Fn(&E) -> Node + 'static) -> Self {
        let render: Rc<dyn Fn(&E) -> Node> = Rc::new(render);
        let key = format!("child-{:p}", Rc::as_ptr(&render) as *const ());
        Self {
            key,
            order: Self::DEFAULT_ORDER,
            render,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn render(&self, engine: &E) -> Node {
        (self.render)(engine)
    }
}

// ── Core ───────────────────────────────────────────────────────────────────

type RenderFn<E> = Rc<dyn Fn(&E) -> Node>;

/// State shared by every engine.
pub struct Core<E: Engine> {
    id: Uuid,
    config: OnceCell<Config>,
    plugins: OnceCell<Vec<Rc<E::Plugin>>>,
    options: RefCell<E::Options>,
    state: Signal<Value>,
    children: RefCell<Vec<Child<E>>>,
    shared: RefCell<Extensions>,
    component: OnceCell<ComponentSpec>,
    render: RefCell<Option<RenderFn<E>>>,
}

impl<E: Engine> Default for Core<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Engine> Core<E> {
    /// Empty `shared` map and `{ "props": {} }` state.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            config: OnceCell::new(),
            plugins: OnceCell::new(),
            options: RefCell::new(E::Options::default()),
            state: Signal::new(json!({ "props": {} })),
            children: RefCell::new(Vec::new()),
            shared: RefCell::new(Extensions::new()),
            component: OnceCell::new(),
            render: RefCell::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Effective configuration. Empty until the factory resolved it.
    pub fn config(&self) -> &Config {
        self.config.get().unwrap_or(&EMPTY_CONFIG)
    }

    pub fn plugins(&self) -> &[Rc<E::Plugin>] {
        self.plugins.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Domain options. Empty while the `onOptions` pass runs.
    pub fn options(&self) -> Ref<'_, E::Options> {
        self.options.borrow()
    }

    pub fn options_mut(&self) -> RefMut<'_, E::Options> {
        self.options.borrow_mut()
    }

    pub fn state(&self) -> &Signal<Value> {
        &self.state
    }

    pub fn set_state(&self, patch: Value, mode: MergeMode) {
        self.state.update(|state| merge_with(state, patch, mode));
    }

    /// Insert a child, keeping the list stably sorted by order.
    pub fn add_child(&self, child: Child<E>) {
        self.update_children(|children| children.push(child));
    }

    pub fn update_children(&self, f: impl FnOnce(&mut Vec<Child<E>>)) {
        let mut children = self.children.borrow_mut();
        f(&mut children);
        children.sort_by_key(Child::order);
    }

    pub fn children(&self) -> Vec<Child<E>> {
        self.children.borrow().clone()
    }

    pub fn shared(&self) -> RefMut<'_, Extensions> {
        self.shared.borrow_mut()
    }

    pub fn component(&self) -> Option<&ComponentSpec> {
        self.component.get()
    }

    /// Replace the root render function.
    pub fn set_render(&self, render: impl Fn(&E) -> Node + 'static) {
        *self.render.borrow_mut() = Some(Rc::new(render));
    }

    pub fn render(&self, engine: &E) -> Node {
        let custom = self.render.borrow().clone();
        match custom {
            Some(render) => render(engine),
            None => self.render_base(engine),
        }
    }

    /// The ordered children inside a `div` carrying `state.props`.
    pub fn render_base(&self, engine: &E) -> Node {
        let props = self
            .state
            .with(|state| state.get("props").cloned().unwrap_or(Value::Null));
        let children = self.children();
        Node::element("div").props(props).children(
            children
                .iter()
                .map(|child| child.render(engine).keyed(child.key())),
        )
    }

    // ── Dispatch ──

    /// Call-all over hooks without results.
    pub fn call_each(
        &self,
        hook: &'static str,
        mut f: impl FnMut(&E::Plugin) -> HookResult,
    ) -> HookResult {
        debug_assert!(is_hook_name(hook), "not a hook name: {hook}");
        for plugin in self.plugins() {
            tracing::trace!(hook, plugin = plugin.name(), "dispatch");
            f(&**plugin)?;
        }
        Ok(())
    }

    /// Call-all, collecting every `Some` result in plugin order.
    pub fn call_all<R>(
        &self,
        hook: &'static str,
        mut f: impl FnMut(&E::Plugin) -> Result<Option<R>, EngineError>,
    ) -> Result<Vec<R>, EngineError> {
        debug_assert!(is_hook_name(hook), "not a hook name: {hook}");
        let mut results = Vec::new();
        for plugin in self.plugins() {
            tracing::trace!(hook, plugin = plugin.name(), "dispatch");
            if let Some(result) = f(&**plugin)? {
                results.push(result);
            }
        }
        Ok(results)
    }

    /// Call-first: stops at the first plugin returning `Some`.
    pub fn call_first<R>(
        &self,
        hook: &'static str,
        mut f: impl FnMut(&E::Plugin) -> Option<R>,
    ) -> Option<R> {
        debug_assert!(is_hook_name(hook), "not a hook name: {hook}");
        for plugin in self.plugins() {
            if let Some(result) = f(&**plugin) {
                tracing::trace!(hook, plugin = plugin.name(), "claimed");
                return Some(result);
            }
        }
        None
    }

    /// Async call-first: candidates are awaited one after another.
    pub async fn call_first_async<R>(
        &self,
        hook: &'static str,
        mut f: impl FnMut(&E::Plugin) -> LocalBoxFuture<'static, Option<R>>,
    ) -> Option<R> {
        debug_assert!(is_hook_name(hook), "not a hook name: {hook}");
        for plugin in self.plugins() {
            if let Some(result) = f(&**plugin).await {
                tracing::trace!(hook, plugin = plugin.name(), "claimed");
                return Some(result);
            }
        }
        None
    }

    // ── Construction ──

    pub(crate) fn install(&self, config: Config, plugins: Vec<Rc<E::Plugin>>, options: E::Options) {
        let _ = self.config.set(config);
        let _ = self.plugins.set(plugins);
        *self.options.borrow_mut() = options;
    }

    pub(crate) fn construct(&self, engine: &E, name: Option<String>) -> Result<(), EngineError> {
        self.call_each(Hook::Init.name(), |p| p.on_init(engine))?;
        self.call_each(Hook::Config.name(), |p| p.on_config(engine, self.config()))?;
        self.call_each(Hook::OptionsBefore.name(), |p| p.on_options_before(engine))?;

        let mut options = std::mem::take(&mut *self.options.borrow_mut());
        let parsed = self.call_each(Hook::Options.name(), |p| p.on_options(engine, &mut options));
        *self.options.borrow_mut() = options;
        parsed?;

        self.call_each(Hook::OptionsAfter.name(), |p| p.on_options_after(engine))?;

        let name = name
            .or_else(|| self.config().name().map(str::to_string))
            .unwrap_or_default();
        let mut component = ComponentSpec::new(name);
        self.call_each(Hook::Component.name(), |p| p.on_component(engine, &mut component))?;
        tracing::debug!(
            component = component.name(),
            plugins = self.plugins().len(),
            children = self.children.borrow().len(),
            "engine constructed"
        );
        let _ = self.component.set(component);
        Ok(())
    }

    pub(crate) fn setup(&self, engine: &E) -> Result<Mount, EngineError> {
        let mut ctx = SetupContext::new();
        self.call_each(Hook::Setup.name(), |p| p.on_setup(engine, &mut ctx))?;
        Ok(ctx.into_mount())
    }
}

// ── Engine trait ───────────────────────────────────────────────────────────

/// A concrete engine handle.
///
/// Implementors provide access to their [`Core`] and a way to wrap a fresh
/// core; everything else is provided.
pub trait Engine: Clone + Sized + 'static {
    type Options: EngineOptions<Plugin = Self::Plugin>;
    type Plugin: ?Sized + Plugin<Self>;

    fn core(&self) -> &Core<Self>;

    fn from_core(core: Core<Self>) -> Self;

    fn id(&self) -> Uuid {
        self.core().id()
    }

    fn config(&self) -> &Config {
        self.core().config()
    }

    fn state(&self) -> &Signal<Value> {
        self.core().state()
    }

    /// Snapshot of the state container.
    fn get_state(&self) -> Value {
        self.core().state().get()
    }

    fn set_state(&self, patch: Value, mode: MergeMode) -> &Self {
        self.core().set_state(patch, mode);
        self
    }

    fn add_child(&self, child: Child<Self>) -> &Self {
        self.core().add_child(child);
        self
    }

    fn shared(&self) -> RefMut<'_, Extensions> {
        self.core().shared()
    }

    fn capability<C: 'static>(&self) -> Option<&C> {
        self.core()
            .component()
            .and_then(|component| component.capability::<C>())
    }

    /// Component name: options `name`, else `config.name`.
    fn name(&self) -> String {
        match self.core().component() {
            Some(component) => component.name().to_string(),
            None => self.config().name().unwrap_or_default().to_string(),
        }
    }

    fn setup(&self) -> Result<Mount, EngineError> {
        self.core().setup(self)
    }

    fn render(&self) -> Node {
        self.core().render(self)
    }
}
