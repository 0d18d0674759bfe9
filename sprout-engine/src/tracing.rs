//! Tracing support for the engine.

/// The level macros every component module imports.
pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}
