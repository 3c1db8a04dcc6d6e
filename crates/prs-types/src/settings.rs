use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SettingsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    IncludeUnapprovedReviews,
    PreviewSize,
    PaginateSize,
    TrackLocale,
    RequireLogin,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::IncludeUnapprovedReviews,
        SettingKey::PreviewSize,
        SettingKey::PaginateSize,
        SettingKey::TrackLocale,
        SettingKey::RequireLogin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::IncludeUnapprovedReviews => "include_unapproved_reviews",
            SettingKey::PreviewSize => "preview_size",
            SettingKey::PaginateSize => "paginate_size",
            SettingKey::TrackLocale => "track_locale",
            SettingKey::RequireLogin => "require_login",
        }
    }
}

impl Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
}

impl SettingValue {
    /// Parses textual value (CLI, env) according to the type of `key`.
    pub fn parse_for(key: SettingKey, value: &str) -> Result<Self, SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            key,
            value: value.to_string(),
        };
        match key {
            SettingKey::IncludeUnapprovedReviews
            | SettingKey::TrackLocale
            | SettingKey::RequireLogin => value.parse().map(SettingValue::Bool).map_err(|_| invalid()),
            SettingKey::PreviewSize | SettingKey::PaginateSize => {
                value.parse().map(SettingValue::Int).map_err(|_| invalid())
            }
        }
    }
}

impl Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Bool(v) => write!(f, "{v}"),
            SettingValue::Int(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub include_unapproved_reviews: bool,
    pub preview_size: i64,
    pub paginate_size: i64,
    pub track_locale: bool,
    pub require_login: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            include_unapproved_reviews: false,
            preview_size: 3,
            paginate_size: 10,
            track_locale: false,
            require_login: true,
        }
    }
}

/// Shared review settings, clones share the same values.
///
/// Values are read at the moment of use, so a change is visible to every
/// holder immediately.
#[derive(Debug, Clone, Default)]
pub struct ReviewSettings {
    inner: Arc<RwLock<Preferences>>,
}

impl From<Preferences> for ReviewSettings {
    fn from(value: Preferences) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }
}

impl ReviewSettings {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Preferences> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Preferences> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        let prefs = self.read();
        match key {
            SettingKey::IncludeUnapprovedReviews => {
                SettingValue::Bool(prefs.include_unapproved_reviews)
            }
            SettingKey::PreviewSize => SettingValue::Int(prefs.preview_size),
            SettingKey::PaginateSize => SettingValue::Int(prefs.paginate_size),
            SettingKey::TrackLocale => SettingValue::Bool(prefs.track_locale),
            SettingKey::RequireLogin => SettingValue::Bool(prefs.require_login),
        }
    }

    pub fn set(&self, key: SettingKey, value: SettingValue) -> Result<(), SettingsError> {
        let mut prefs = self.write();
        match (key, value) {
            (SettingKey::IncludeUnapprovedReviews, SettingValue::Bool(v)) => {
                prefs.include_unapproved_reviews = v
            }
            (SettingKey::TrackLocale, SettingValue::Bool(v)) => prefs.track_locale = v,
            (SettingKey::RequireLogin, SettingValue::Bool(v)) => prefs.require_login = v,
            (SettingKey::PreviewSize | SettingKey::PaginateSize, SettingValue::Int(v)) if v < 1 => {
                return Err(SettingsError::InvalidValue {
                    key,
                    value: v.to_string(),
                })
            }
            (SettingKey::PreviewSize, SettingValue::Int(v)) => prefs.preview_size = v,
            (SettingKey::PaginateSize, SettingValue::Int(v)) => prefs.paginate_size = v,
            (
                SettingKey::IncludeUnapprovedReviews
                | SettingKey::TrackLocale
                | SettingKey::RequireLogin,
                SettingValue::Int(_),
            ) => {
                return Err(SettingsError::TypeMismatch {
                    key,
                    expected: "boolean",
                })
            }
            (SettingKey::PreviewSize | SettingKey::PaginateSize, SettingValue::Bool(_)) => {
                return Err(SettingsError::TypeMismatch {
                    key,
                    expected: "integer",
                })
            }
        }
        debug!("Setting {key} changed to {value}");
        Ok(())
    }

    pub fn snapshot(&self) -> Preferences {
        self.read().clone()
    }

    pub fn reset(&self) {
        *self.write() = Preferences::default();
    }

    pub fn include_unapproved_reviews(&self) -> bool {
        self.read().include_unapproved_reviews
    }

    pub fn set_include_unapproved_reviews(&self, value: bool) {
        self.write().include_unapproved_reviews = value;
    }

    pub fn preview_size(&self) -> i64 {
        self.read().preview_size
    }

    pub fn paginate_size(&self) -> i64 {
        self.read().paginate_size
    }

    pub fn track_locale(&self) -> bool {
        self.read().track_locale
    }

    pub fn require_login(&self) -> bool {
        self.read().require_login
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ReviewSettings::new();
        assert!(!settings.include_unapproved_reviews());
        assert_eq!(settings.preview_size(), 3);
        assert_eq!(settings.paginate_size(), 10);
        assert!(!settings.track_locale());
        assert!(settings.require_login());
    }

    #[test]
    fn test_clones_share_values() {
        let settings = ReviewSettings::new();
        let other = settings.clone();
        other
            .set(SettingKey::IncludeUnapprovedReviews, SettingValue::Bool(true))
            .unwrap();
        assert!(settings.include_unapproved_reviews());
        assert_eq!(
            settings.get(SettingKey::IncludeUnapprovedReviews),
            SettingValue::Bool(true)
        );

        settings.reset();
        assert!(!other.include_unapproved_reviews());
    }

    #[test]
    fn test_type_mismatch() {
        let settings = ReviewSettings::new();
        let err = settings
            .set(SettingKey::PreviewSize, SettingValue::Bool(true))
            .unwrap_err();
        assert_eq!(
            err,
            SettingsError::TypeMismatch {
                key: SettingKey::PreviewSize,
                expected: "integer"
            }
        );
        assert!(settings
            .set(SettingKey::TrackLocale, SettingValue::Int(1))
            .is_err());
        assert!(settings
            .set(SettingKey::PaginateSize, SettingValue::Int(0))
            .is_err());
        assert_eq!(settings.snapshot(), Preferences::default());
    }

    #[test]
    fn test_parse_keys_and_values() {
        let key: SettingKey = "include_unapproved_reviews".parse().unwrap();
        assert_eq!(key, SettingKey::IncludeUnapprovedReviews);
        assert_eq!(
            SettingValue::parse_for(key, "true").unwrap(),
            SettingValue::Bool(true)
        );
        assert!(SettingValue::parse_for(key, "yes").is_err());
        assert_eq!(
            SettingValue::parse_for(SettingKey::PreviewSize, "5").unwrap(),
            SettingValue::Int(5)
        );
        assert_eq!(
            "show_email".parse::<SettingKey>(),
            Err(SettingsError::UnknownKey("show_email".into()))
        );
    }
}
