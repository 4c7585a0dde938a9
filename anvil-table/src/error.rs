use anvil_core::{BoxError, EngineError};
use anvil_form::FormError;

/// Failure captured by `Table::load`.
///
/// Never returned to the caller of `load`; it reaches `onLoadAfter` hooks
/// through the [`LoadReport`](crate::LoadReport) and is logged.
#[derive(Debug)]
pub enum LoadError {
    /// An `onLoadBefore` hook failed.
    Hook(EngineError),
    /// The data loader (or an `onLoad` override) failed.
    Loader(BoxError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Hook(err) => write!(f, "Preparing load failed: {err}"),
            LoadError::Loader(err) => write!(f, "Loading data failed: {err}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Hook(err) => Some(err),
            LoadError::Loader(err) => Some(err.as_ref()),
        }
    }
}

impl From<EngineError> for LoadError {
    fn from(err: EngineError) -> Self {
        LoadError::Hook(err)
    }
}

/// Error returned by table handle operations.
#[derive(Debug)]
pub enum TableError {
    /// A nested form operation failed.
    Form(FormError),
    /// The operation needs a plugin or option that this table does not have.
    Unsupported(&'static str),
    /// No pending confirmation carries this id.
    UnknownConfirm(u64),
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::Form(err) => write!(f, "{err}"),
            TableError::Unsupported(op) => write!(f, "'{op}' is not supported by this table"),
            TableError::UnknownConfirm(id) => write!(f, "No pending confirmation with id {id}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableError::Form(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormError> for TableError {
    fn from(err: FormError) -> Self {
        TableError::Form(err)
    }
}
