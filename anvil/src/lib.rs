//! Anvil: declarative forms and tables built from plugins.
//!
//! This facade crate re-exports the Anvil sub-crates through a single
//! dependency with feature flags. Import everything you need with:
//!
//! ```ignore
//! use anvil::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature | Default | Crate         |
//! |---------|---------|---------------|
//! | `form`  | **yes** | `anvil-form`  |
//! | `table` | **yes** | `anvil-table` |
//! | `test`  | no      | `anvil-test`  |

pub extern crate anvil_core;

// Re-export everything from anvil-core at the top level for convenience.
pub use anvil_core::*;

#[cfg(feature = "form")]
pub use anvil_form;

#[cfg(feature = "table")]
pub use anvil_table;

#[cfg(feature = "test")]
pub use anvil_test;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Registry};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,anvil=debug";

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_LOG_FILTER`].
///
/// Fails when a global subscriber is already set.
pub fn init_tracing() -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false);

    Registry::default().with(env_filter).with(fmt_layer).try_init()?;
    tracing::debug!("tracing initialized");
    Ok(())
}

/// Unified prelude: `use anvil::prelude::*`.
///
/// Includes the core prelude plus the entry points of every enabled engine.
pub mod prelude {
    pub use anvil_core::prelude::*;
    pub use anvil_core::{BoxError, LoadOn};

    #[cfg(feature = "form")]
    pub use anvil_form::{
        create_form, form_builder, submit_fn, Form, FormError, FormOptions, FormPlugin,
        ModalOptions, ModalTrigger, SelectSource, Setter, UseFormItem,
    };

    #[cfg(feature = "table")]
    pub use anvil_table::{
        create_table, table_builder, Confirm, DataSource, LoadResult, Table, TableError,
        TableOptions, TablePlugin, ToolbarPosition, UseColumnAction, UsePaging, UseTableColumn,
        UseToolbarItem,
    };

    #[cfg(feature = "test")]
    pub use anvil_test::TestHost;
}
