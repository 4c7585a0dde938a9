use anvil_core::{BoxError, EngineError};

/// Error returned by form handle operations.
#[derive(Debug)]
pub enum FormError {
    /// The caller's submit function failed.
    Submit(BoxError),
    /// An option loader failed.
    Load { field: String, source: BoxError },
    /// A hook dispatched by the operation failed.
    Engine(EngineError),
    /// No item is bound to the field.
    UnknownField(String),
    /// The operation needs a plugin that is not installed on this form.
    Unsupported(&'static str),
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::Submit(err) => write!(f, "Submit failed: {err}"),
            FormError::Load { field, source } => {
                write!(f, "Loading options for '{field}' failed: {source}")
            }
            FormError::Engine(err) => write!(f, "{err}"),
            FormError::UnknownField(field) => write!(f, "No form item for field '{field}'"),
            FormError::Unsupported(op) => write!(f, "'{op}' is not supported by this form"),
        }
    }
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormError::Submit(err) => Some(err.as_ref()),
            FormError::Load { source, .. } => Some(source.as_ref()),
            FormError::Engine(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EngineError> for FormError {
    fn from(err: EngineError) -> Self {
        FormError::Engine(err)
    }
}
