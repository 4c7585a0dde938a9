mod host;
mod path;

pub use host::TestHost;
pub use path::lookup;
