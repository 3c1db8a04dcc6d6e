pub mod config;
pub mod error;
pub mod settings;
pub mod validate;

pub use error::{SettingsError, ValidationError, ValidationKind};
pub use settings::{ReviewSettings, SettingKey, SettingValue};
