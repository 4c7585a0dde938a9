//! Core engine for Anvil.
//!
//! A component engine turns a declarative options value into live reactive
//! state and a render function. The work is split across an ordered list of
//! plugins that hook into a fixed construction protocol:
//!
//! ```text
//! onInit -> onConfig -> onOptionsBefore -> onOptions -> onOptionsAfter -> onComponent
//! ```
//!
//! Concrete engines (forms, tables) implement [`Engine`] and extend
//! [`Plugin`] with their own hooks.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod extensions;
pub mod hooks;
pub mod lifecycle;
pub mod merge;
pub mod model;
pub mod plugin;
pub mod reactive;
pub mod render;
pub mod utils;

pub use builder::{EngineBuilder, Factory, Init};
pub use config::{Config, ConfigError};
pub use engine::{Child, ComponentSpec, Core, Engine, EngineOptions, Reserved};
pub use error::{BoxError, EngineError};
pub use extensions::Extensions;
pub use hooks::Hook;
pub use lifecycle::{LoadOn, Mount, SetupContext, Task};
pub use merge::{assign_deep, defaults_deep, merge, merge_with, MergeMode};
pub use model::FieldPath;
pub use plugin::{HookResult, Plugin};
pub use reactive::{Computed, Flag, Memo, Observable, Signal, SubscriptionId};
pub use render::{handler, render_slots, sync_handler, Element, Handler, Node, Slot, Slots};
pub use utils::{bind_slots, unique_id, MaybeFn};

pub mod prelude {
    //! Re-exports of the most commonly used types.
    pub use crate::{
        Child, Config, Engine, EngineBuilder, EngineError, Factory, Flag, HookResult, MergeMode,
        Node, Plugin, SetupContext, Signal,
    };
}
