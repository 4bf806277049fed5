mod compiler;
mod error;
mod loader;

pub use compiler::{compile, kinds_from_keywords};
pub use error::ResolveError;
pub use loader::{load_file, load_json, load_yaml};
