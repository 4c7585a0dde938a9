//! Setup and mount lifecycle.
//!
//! `onSetup` hooks receive a [`SetupContext`]. Effects spawned there are
//! polled once immediately; whatever is still pending, together with the
//! `on_mounted` callbacks, is handed to the host through a [`Mount`] that it
//! awaits once the component is attached.

use std::future::Future;

use futures_util::future::{join_all, LocalBoxFuture};
use futures_util::FutureExt;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A unit of deferred work. Engines are single-threaded, so tasks are `!Send`.
pub type Task = LocalBoxFuture<'static, ()>;

type MountedHook = Box<dyn FnOnce() -> Task>;

/// Collects the effects of one `setup` pass.
#[derive(Default)]
pub struct SetupContext {
    exposes: Map<String, Value>,
    pending: Vec<Task>,
    mounted: Vec<MountedHook>,
}

impl SetupContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a value on the mount result.
    pub fn expose(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.exposes.insert(key.into(), value.into());
    }

    /// Start an effect now. It runs up to its first suspension point before
    /// `spawn` returns; the remainder is driven by [`Mount::mounted`].
    pub fn spawn(&mut self, task: impl Future<Output = ()> + 'static) {
        let mut task = task.boxed_local();
        if (&mut task).now_or_never().is_none() {
            self.pending.push(task);
        }
    }

    /// Defer work until the host reports the component as mounted.
    pub fn on_mounted<F, Fut>(&mut self, hook: F)
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.mounted.push(Box::new(move || hook().boxed_local()));
    }

    /// Adopt the mount of a nested component.
    pub fn nest(&mut self, mount: Mount) {
        self.exposes.extend(mount.exposes);
        self.pending.extend(mount.pending);
        self.mounted.extend(mount.mounted);
    }

    pub fn into_mount(self) -> Mount {
        Mount {
            exposes: self.exposes,
            pending: self.pending,
            mounted: self.mounted,
        }
    }
}

/// Result of `Engine::setup`.
pub struct Mount {
    exposes: Map<String, Value>,
    pending: Vec<Task>,
    mounted: Vec<MountedHook>,
}

impl Mount {
    pub fn exposes(&self) -> &Map<String, Value> {
        &self.exposes
    }

    /// Number of setup effects still in flight.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn mounted_hooks(&self) -> usize {
        self.mounted.len()
    }

    /// Run the mounted callbacks and drive every outstanding effect to completion.
    pub async fn mounted(self) {
        let mut tasks = self.pending;
        tasks.extend(self.mounted.into_iter().map(|hook| hook()));
        join_all(tasks).await;
    }
}

/// When a loader fires on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadOn {
    /// During `setup`.
    Setup,
    /// After the host mounted the component.
    #[default]
    Mounted,
    /// Only on explicit request.
    Never,
}

impl LoadOn {
    /// Parse `"setup"`, `"mounted"` or `false`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s == "setup" => Some(LoadOn::Setup),
            Value::String(s) if s == "mounted" => Some(LoadOn::Mounted),
            Value::Bool(false) | Value::Null => Some(LoadOn::Never),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for LoadOn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        LoadOn::from_value(&value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "expected \"setup\", \"mounted\" or false, got {value}"
            ))
        })
    }
}
