//! Project configuration (`.keeda.toml`).

pub mod settings;

pub use settings::Settings;
