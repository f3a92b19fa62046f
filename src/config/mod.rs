pub mod settings;

pub use settings::{AiConfig, AppConfig};
