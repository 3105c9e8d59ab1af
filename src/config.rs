//! Tool configuration.

/// Settings file loader
mod loader;
/// Settings types and validation
mod types;

pub use loader::load_from_dir;
pub use types::{
    ConfigError,
    ToolSettings,
    ValidationError,
};
