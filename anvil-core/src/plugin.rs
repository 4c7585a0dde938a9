use crate::config::Config;
use crate::engine::{ComponentSpec, Engine};
use crate::error::EngineError;
use crate::lifecycle::SetupContext;

/// Result of a hook invocation. An error aborts the running dispatch.
pub type HookResult = Result<(), EngineError>;

/// A unit of engine behaviour.
///
/// Every hook has a no-op default, so a plugin implements only the phases it
/// cares about. Hooks run in plugin registration order; see
/// [`crate::hooks`] for the dispatch rules.
///
/// Engines extend this trait with their own hooks (`FormPlugin`,
/// `TablePlugin`) and use the extension trait object as
/// [`Engine::Plugin`].
///
/// # Example
///
/// ```ignore
/// use anvil_core::{HookResult, MergeMode, Plugin};
///
/// pub struct Bordered;
///
/// impl Plugin<Table> for Bordered {
///     fn name(&self) -> &str {
///         "bordered"
///     }
///
///     fn on_options_after(&self, table: &Table) -> HookResult {
///         table.set_state(json!({ "tableProps": { "bordered": true } }), MergeMode::Merge);
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin<E: Engine>: 'static {
    /// Plugin name used in diagnostics.
    fn name(&self) -> &str;

    /// First hook; `state` and `shared` exist, options are already resolved.
    fn on_init(&self, _engine: &E) -> HookResult {
        Ok(())
    }

    fn on_config(&self, _engine: &E, _config: &Config) -> HookResult {
        Ok(())
    }

    fn on_options_before(&self, _engine: &E) -> HookResult {
        Ok(())
    }

    /// Parse the domain options into engine state.
    fn on_options(&self, _engine: &E, _options: &mut E::Options) -> HookResult {
        Ok(())
    }

    fn on_options_after(&self, _engine: &E) -> HookResult {
        Ok(())
    }

    /// Decorate the component spec, e.g. provide capabilities.
    fn on_component(&self, _engine: &E, _component: &mut ComponentSpec) -> HookResult {
        Ok(())
    }

    /// Runs on every mount, never re-parses options.
    fn on_setup(&self, _engine: &E, _ctx: &mut SetupContext) -> HookResult {
        Ok(())
    }
}
