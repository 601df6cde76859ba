//! Configuration management for vnotes

mod settings;

pub use settings::Settings;
