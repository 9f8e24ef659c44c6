pub mod emitter;
pub mod error;
pub mod snippet;

pub use emitter::{DEFAULT_SCOPE, Emitter, snippet_key};
pub use error::EmitError;
pub use snippet::{Snippet, SnippetFile};
