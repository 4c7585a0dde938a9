use crate::config::ConfigError;

/// Boxed error returned by caller-supplied callbacks (loaders, submit functions).
///
/// Engines are single-threaded, so the box carries no `Send`/`Sync` bounds.
pub type BoxError = Box<dyn std::error::Error>;

/// Error raised while constructing or driving an engine.
///
/// Any error returned from a construction hook aborts `Factory::create`
/// and reaches the caller unchanged.
#[derive(Debug)]
pub enum EngineError {
    /// The effective configuration could not be read.
    Config(ConfigError),
    /// A plugin rejected the options or failed while applying them.
    Plugin { plugin: String, message: String },
    /// The options value is malformed.
    Options(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::Plugin`].
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Config(err) => write!(f, "{err}"),
            EngineError::Plugin { plugin, message } => {
                write!(f, "Plugin '{plugin}' failed: {message}")
            }
            EngineError::Options(msg) => write!(f, "Invalid options: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(err)
    }
}
