/// Lenient deserializers for model-produced JSON.
pub mod serde_helpers;
/// `newsroom.toml` configuration.
pub mod toml_config;
