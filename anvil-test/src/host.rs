use anvil_core::{Element, Engine, EngineError, Mount, Node};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::path::lookup;

/// In-process host for a component engine.
///
/// Plays the part of the rendering framework: runs `setup`, reports the
/// component as mounted, renders the node tree and fires element events.
/// Lookups panic with the rendered tree on failure so test output shows what
/// was actually produced.
pub struct TestHost<E: Engine> {
    engine: E,
    exposes: Map<String, Value>,
    mount: Option<Mount>,
}

impl<E: Engine> TestHost<E> {
    /// Run `setup` only. Eager effects have completed when this returns;
    /// `mounted` callbacks wait for [`TestHost::mounted`].
    pub fn setup(engine: E) -> Result<Self, EngineError> {
        let mount = engine.setup()?;
        Ok(Self {
            engine,
            exposes: mount.exposes().clone(),
            mount: Some(mount),
        })
    }

    /// Run `setup` and the mounted phase to completion.
    pub async fn mount(engine: E) -> Result<Self, EngineError> {
        let mut host = Self::setup(engine)?;
        host.mounted().await;
        Ok(host)
    }

    /// Report the component as mounted. A second call is a no-op.
    pub async fn mounted(&mut self) {
        if let Some(mount) = self.mount.take() {
            mount.mounted().await;
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_none()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn exposes(&self) -> &Map<String, Value> {
        &self.exposes
    }

    pub fn render(&self) -> Node {
        self.engine.render()
    }

    // ── Queries ──

    pub fn try_find(&self, tag: &str) -> Option<Element> {
        self.render().find_by_tag(tag)
    }

    /// First element with `tag`.
    pub fn find(&self, tag: &str) -> Element {
        let tree = self.render();
        tree.find_by_tag(tag)
            .unwrap_or_else(|| panic!("no <{tag}> in rendered tree:\n{tree:#?}"))
    }

    pub fn find_all(&self, tag: &str) -> Vec<Element> {
        self.render().find_all_by_tag(tag)
    }

    /// Element with `tag` whose render key is `key`.
    pub fn find_keyed(&self, tag: &str, key: &str) -> Element {
        let tree = self.render();
        tree.find(|e| e.tag == tag && e.key.as_deref() == Some(key))
            .unwrap_or_else(|| panic!("no <{tag} key={key:?}> in rendered tree:\n{tree:#?}"))
    }

    /// Element with `tag` whose prop `name` equals `value`.
    pub fn find_with_prop(&self, tag: &str, name: &str, value: impl Into<Value>) -> Element {
        let value = value.into();
        let tree = self.render();
        tree.find(|e| e.tag == tag && e.prop(name) == Some(&value))
            .unwrap_or_else(|| panic!("no <{tag} {name}={value}> in rendered tree:\n{tree:#?}"))
    }

    /// `Button` whose text content is `text`.
    pub fn button(&self, text: &str) -> Element {
        let tree = self.render();
        tree.find(|e| e.tag == "Button" && e.text() == text)
            .unwrap_or_else(|| panic!("no <Button>{text}</Button> in rendered tree:\n{tree:#?}"))
    }

    // ── Events ──

    /// Fire `event` on the first element with `tag`.
    pub async fn emit(&self, tag: &str, event: &str, args: &[Value]) {
        let element = self.find(tag);
        assert!(
            element.has_handler(event),
            "<{tag}> has no `{event}` handler, found {:?}",
            element.handlers.keys().collect::<Vec<_>>()
        );
        element.emit(event, args).await;
    }

    /// Click the button labelled `text`.
    pub async fn click(&self, text: &str) {
        self.button(text).emit("click", &[]).await;
    }

    // ── State assertions ──

    /// Read a path such as `paging.current` or `rows.0.id` from the state;
    /// `null` when the path is missing.
    pub fn state_path(&self, path: &str) -> Value {
        lookup(&self.engine.get_state(), path)
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn state_path_as<T: DeserializeOwned>(&self, path: &str) -> T {
        let value = self.state_path(path);
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            panic!("Failed to deserialize state path \"{path}\": {e}\n  Value: {value}")
        })
    }

    pub fn assert_state_path(&self, path: &str, expected: impl Into<Value>) -> &Self {
        let actual = self.state_path(path);
        let expected = expected.into();
        assert_eq!(
            actual,
            expected,
            "state path \"{path}\" assertion failed\n  Expected: {expected}\n  Actual:   {actual}\n  State: {}",
            self.engine.get_state()
        );
        self
    }
}
