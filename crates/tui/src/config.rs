use crate::error::{ConfirmError, ConfirmResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SCOPE: &str = "default";
pub const DEFAULT_GRACE_DELAY_MS: u64 = 800;

const ENV_DEFAULT_SCOPE: &str = "CONFIRM_BOX_DEFAULT_SCOPE";
const ENV_GRACE_MS: &str = "CONFIRM_BOX_GRACE_MS";
const ENV_UNMOUNT_POLICY: &str = "CONFIRM_BOX_UNMOUNT_POLICY";
const ENV_DUPLICATE_PROVIDER: &str = "CONFIRM_BOX_DUPLICATE_PROVIDER";

/// What happens to unresolved requests when their provider unmounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmountPolicy {
    /// Requests stay pending until another provider for the scope resolves them.
    #[default]
    LeavePending,
    /// Requests still open in the unmounting provider resolve to `false`.
    Cancel,
}

/// How a second provider mount for the same scope is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateProviderPolicy {
    /// Log a warning and keep both providers mounted.
    #[default]
    Warn,
    /// Refuse the second mount with [`ConfirmError::DuplicateProvider`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfirmConfig {
    pub default_scope: String,
    pub grace_delay_ms: u64,
    pub unmount_policy: UnmountPolicy,
    pub duplicate_provider: DuplicateProviderPolicy,
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            default_scope: DEFAULT_SCOPE.to_string(),
            grace_delay_ms: DEFAULT_GRACE_DELAY_MS,
            unmount_policy: UnmountPolicy::default(),
            duplicate_provider: DuplicateProviderPolicy::default(),
        }
    }
}

impl ConfirmConfig {
    pub fn from_toml_str(raw: &str) -> ConfirmResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Reads a TOML file and applies `CONFIRM_BOX_*` environment overrides.
    pub fn load(path: &Path) -> ConfirmResult<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    fn load_with(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> ConfirmResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)?.apply_overrides(lookup)
    }

    /// Defaults plus `CONFIRM_BOX_*` environment overrides.
    pub fn from_env() -> ConfirmResult<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> ConfirmResult<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfirmResult<Self> {
        if let Some(scope) = lookup(ENV_DEFAULT_SCOPE) {
            let scope = scope.trim();
            if scope.is_empty() {
                return Err(invalid(ENV_DEFAULT_SCOPE, scope));
            }
            self.default_scope = scope.to_string();
        }
        if let Some(value) = lookup(ENV_GRACE_MS) {
            self.grace_delay_ms = value
                .trim()
                .parse()
                .map_err(|_| invalid(ENV_GRACE_MS, &value))?;
        }
        if let Some(value) = lookup(ENV_UNMOUNT_POLICY) {
            self.unmount_policy = match value.trim().to_ascii_lowercase().as_str() {
                "leave_pending" | "pending" => UnmountPolicy::LeavePending,
                "cancel" => UnmountPolicy::Cancel,
                _ => return Err(invalid(ENV_UNMOUNT_POLICY, &value)),
            };
        }
        if let Some(value) = lookup(ENV_DUPLICATE_PROVIDER) {
            self.duplicate_provider = match value.trim().to_ascii_lowercase().as_str() {
                "warn" => DuplicateProviderPolicy::Warn,
                "reject" => DuplicateProviderPolicy::Reject,
                _ => return Err(invalid(ENV_DUPLICATE_PROVIDER, &value)),
            };
        }
        Ok(self)
    }

    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }
}

fn invalid(key: &'static str, value: &str) -> ConfirmError {
    ConfirmError::InvalidSetting {
        key,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use uuid::Uuid;

    struct TempConfig(PathBuf);

    impl TempConfig {
        fn write(contents: &str) -> Self {
            let path = std::env::temp_dir()
                .join(format!("confirm-box-{}.toml", Uuid::new_v4().simple()));
            std::fs::write(&path, contents).unwrap();
            Self(path)
        }
    }

    impl Drop for TempConfig {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_leave_requests_pending_and_warn() {
        let config = ConfirmConfig::default();
        assert_eq!(config.default_scope, "default");
        assert_eq!(config.grace_delay(), Duration::from_millis(800));
        assert_eq!(config.unmount_policy, UnmountPolicy::LeavePending);
        assert_eq!(config.duplicate_provider, DuplicateProviderPolicy::Warn);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = ConfirmConfig::from_toml_str(
            "grace_delay_ms = 250\nunmount_policy = \"cancel\"\n",
        )
        .unwrap();
        assert_eq!(config.grace_delay_ms, 250);
        assert_eq!(config.unmount_policy, UnmountPolicy::Cancel);
        assert_eq!(config.default_scope, "default");
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = ConfirmConfig::from_toml_str("grace_delay_ms = \"long\"").unwrap_err();
        assert!(matches!(err, ConfirmError::InvalidConfig(_)));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let config = ConfirmConfig::default()
            .apply_overrides(lookup(&[
                ("CONFIRM_BOX_GRACE_MS", "10"),
                ("CONFIRM_BOX_DEFAULT_SCOPE", "main"),
                ("CONFIRM_BOX_DUPLICATE_PROVIDER", "Reject"),
            ]))
            .unwrap();
        assert_eq!(config.grace_delay_ms, 10);
        assert_eq!(config.default_scope, "main");
        assert_eq!(config.duplicate_provider, DuplicateProviderPolicy::Reject);
    }

    #[test]
    fn env_override_with_bad_number_fails() {
        let err = ConfirmConfig::default()
            .apply_overrides(lookup(&[("CONFIRM_BOX_GRACE_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfirmError::InvalidSetting {
                key: "CONFIRM_BOX_GRACE_MS",
                ..
            }
        ));
    }

    #[test]
    fn load_reads_file_and_keeps_missing_keys_at_defaults() {
        let file =
            TempConfig::write("default_scope = \"editor\"\nduplicate_provider = \"reject\"\n");
        let config = ConfirmConfig::load_with(&file.0, |_| None).unwrap();
        assert_eq!(config.default_scope, "editor");
        assert_eq!(config.duplicate_provider, DuplicateProviderPolicy::Reject);
        assert_eq!(config.grace_delay_ms, DEFAULT_GRACE_DELAY_MS);
        assert_eq!(config.unmount_policy, UnmountPolicy::LeavePending);
    }

    #[test]
    fn env_overrides_are_layered_over_file_values() {
        let file = TempConfig::write("default_scope = \"editor\"\ngrace_delay_ms = 300\n");
        let config = ConfirmConfig::load_with(
            &file.0,
            lookup(&[
                ("CONFIRM_BOX_GRACE_MS", "40"),
                ("CONFIRM_BOX_UNMOUNT_POLICY", "cancel"),
            ]),
        )
        .unwrap();
        assert_eq!(config.default_scope, "editor");
        assert_eq!(config.grace_delay_ms, 40);
        assert_eq!(config.unmount_policy, UnmountPolicy::Cancel);
    }

    #[test]
    fn load_reports_missing_file_as_io() {
        let path = std::env::temp_dir().join(format!(
            "confirm-box-missing-{}.toml",
            Uuid::new_v4().simple()
        ));
        let err = ConfirmConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfirmError::Io(_)));
    }

    #[test]
    fn load_reports_malformed_file_as_invalid_config() {
        let file = TempConfig::write("unmount_policy = [1, 2]\n");
        let err = ConfirmConfig::load(&file.0).unwrap_err();
        assert!(matches!(err, ConfirmError::InvalidConfig(_)));
    }
}
