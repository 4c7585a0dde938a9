//! Engine factories.
//!
//! Configuration and plugins are accumulated on an [`EngineBuilder`] and
//! frozen into a [`Factory`]. Every instance created from a factory sees the
//! same defaults; there is no process-global registry to mutate.
//!
//! # Example
//!
//! ```ignore
//! let factory = form_builder()
//!     .set_config(json!({ "formProps": { "layout": "inline" } }), MergeMode::Merge)
//!     .use_plugin(Rc::new(AuditPlugin))
//!     .build();
//!
//! let form = factory.create(Init::value(FormOptions { items, ..Default::default() }))?;
//! ```

use std::rc::Rc;

use serde_json::Value;

use crate::config::{yaml_to_json, Config, ConfigError};
use crate::engine::{Core, Engine, EngineOptions};
use crate::error::EngineError;
use crate::merge::{defaults_deep, merge_with, MergeMode};
use crate::utils::MaybeFn;

/// Options value, or a factory called with the engine under construction.
pub type Init<E> = MaybeFn<<E as Engine>::Options, E>;

/// Accumulates factory-level configuration and plugins.
pub struct EngineBuilder<E: Engine> {
    config: Value,
    plugins: Vec<Rc<E::Plugin>>,
}

impl<E: Engine> Default for EngineBuilder<E> {
    fn default() -> Self {
        Self {
            config: Value::Null,
            plugins: Vec::new(),
        }
    }
}

impl<E: Engine> EngineBuilder<E> {
    /// A builder whose configuration carries `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: serde_json::json!({ "name": name.into() }),
            plugins: Vec::new(),
        }
    }

    /// Combine `patch` into the accumulated configuration.
    pub fn set_config(mut self, patch: Value, mode: MergeMode) -> Self {
        merge_with(&mut self.config, patch, mode);
        self
    }

    /// Merge a YAML document into the accumulated configuration.
    pub fn config_yaml(self, yaml: &str) -> Result<Self, ConfigError> {
        let patch = yaml_to_json(yaml)?;
        Ok(self.set_config(patch, MergeMode::Merge))
    }

    /// Append a plugin. Registration order is dispatch order.
    pub fn use_plugin(mut self, plugin: Rc<E::Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn use_plugins(mut self, plugins: impl IntoIterator<Item = Rc<E::Plugin>>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn build(self) -> Factory<E> {
        Factory {
            inner: Rc::new(FactoryInner {
                config: self.config,
                plugins: self.plugins,
            }),
        }
    }
}

struct FactoryInner<E: Engine> {
    config: Value,
    plugins: Vec<Rc<E::Plugin>>,
}

/// Creates engine instances bound to a fixed configuration.
pub struct Factory<E: Engine> {
    inner: Rc<FactoryInner<E>>,
}

impl<E: Engine> Clone for Factory<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: Engine> Factory<E> {
    pub fn config(&self) -> &Value {
        &self.inner.config
    }

    pub fn plugins(&self) -> &[Rc<E::Plugin>] {
        &self.inner.plugins
    }

    /// A builder preloaded with this factory's configuration and plugins.
    pub fn to_builder(&self) -> EngineBuilder<E> {
        EngineBuilder {
            config: self.inner.config.clone(),
            plugins: self.inner.plugins.clone(),
        }
    }

    /// Construct an instance.
    ///
    /// Plugins are the factory plugins followed by the instance plugins; the
    /// instance configuration wins over the factory configuration. Any hook
    /// error aborts construction.
    pub fn create(&self, init: Init<E>) -> Result<E, EngineError> {
        let engine = E::from_core(Core::new());
        let core = engine.core();

        let mut options = init.resolve(&engine);
        let reserved = options.take_reserved();

        let mut plugins = self.inner.plugins.clone();
        plugins.extend(reserved.plugins);

        let mut config = reserved.config;
        defaults_deep(&mut config, &self.inner.config);

        let span = tracing::debug_span!(
            "engine",
            name = config.get("name").and_then(serde_json::Value::as_str).unwrap_or_default(),
            id = %core.id(),
        );
        let _enter = span.enter();

        core.install(Config::new(config), plugins, options);
        core.construct(&engine, reserved.name)?;
        Ok(engine)
    }

    /// Construct an instance from a plain options value.
    pub fn create_with_options(&self, options: E::Options) -> Result<E, EngineError> {
        self.create(MaybeFn::Value(options))
    }
}
