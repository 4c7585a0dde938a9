//! Plugin hook protocol.
//!
//! Hooks are dispatched by name over the engine's ordered plugin list with
//! one of three strategies (see [`crate::engine::Core`]):
//!
//! - **call-all** (`call_each`, `call_all`): every plugin, in list order, with
//!   the same arguments. `call_all` collects the `Some` results. The first
//!   error aborts the dispatch.
//! - **call-first** (`call_first`): list order, stops at the first plugin
//!   returning `Some`.
//! - **call-first-async** (`call_first_async`): like call-first, but each
//!   candidate is awaited before the next one is tried. Candidates never run
//!   concurrently.
//!
//! Only names beginning with [`HOOK_PREFIX`] followed by an uppercase letter
//! are hooks.

/// Prefix shared by every hook name.
pub const HOOK_PREFIX: &str = "on";

/// Lifecycle hooks common to every engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Init,
    Config,
    OptionsBefore,
    Options,
    OptionsAfter,
    Component,
    Setup,
}

impl Hook {
    /// Construction hooks in dispatch order.
    pub const CONSTRUCTION: [Hook; 5] = [
        Hook::Init,
        Hook::Config,
        Hook::OptionsBefore,
        Hook::Options,
        Hook::OptionsAfter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Hook::Init => "onInit",
            Hook::Config => "onConfig",
            Hook::OptionsBefore => "onOptionsBefore",
            Hook::Options => "onOptions",
            Hook::OptionsAfter => "onOptionsAfter",
            Hook::Component => "onComponent",
            Hook::Setup => "onSetup",
        }
    }
}

impl std::fmt::Display for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether `name` follows the hook naming convention.
pub fn is_hook_name(name: &str) -> bool {
    name.strip_prefix(HOOK_PREFIX)
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_names_follow_convention() {
        for hook in Hook::CONSTRUCTION {
            assert!(is_hook_name(hook.name()), "{hook}");
        }
        assert!(is_hook_name("onLoadBefore"));
        assert!(!is_hook_name("online"));
        assert!(!is_hook_name("render"));
    }
}
