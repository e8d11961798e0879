//! Configuration loaded from `lockit.toml`.

pub mod settings;

pub use settings::Settings;
