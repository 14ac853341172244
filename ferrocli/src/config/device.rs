//! Raw device configuration, as loaded from a document.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Device configuration with every key optional.
///
/// This is the input to the derivation pass: defaults and hooks fill in
/// missing keys, then [`DeviceProfile::try_from`](super::DeviceProfile)
/// validates the result. Pattern keys are regular expressions.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Unique identifier of the device.
    pub id: Option<String>,

    /// Host name or IP address.
    pub address: Option<String>,

    /// Port to connect to.
    pub port: Option<u16>,

    /// Connection timeout in seconds.
    pub connect_timeout: Option<u64>,

    /// Seconds to wait for a command to complete.
    pub command_timeout: Option<u64>,

    /// Unprivileged prompt.
    pub prompt: Option<String>,

    /// Any privileged prompt (`switch#`, `switch(config-if)#`, ...).
    pub enabled_prompt: Option<String>,

    /// Login password prompt.
    pub password_prompt: Option<String>,

    /// Login password.
    #[serde(deserialize_with = "secret")]
    pub password: Option<SecretString>,

    /// Command that enters privileged EXEC mode.
    pub enable_command: Option<String>,

    /// Enable password prompt.
    pub enable_password_prompt: Option<String>,

    /// Enable password.
    #[serde(deserialize_with = "secret")]
    pub enable_password: Option<SecretString>,

    /// Whether to disable paging after login.
    pub disable_paging: Option<bool>,

    /// Command that disables paging.
    pub disable_paging_command: Option<String>,

    /// Keep engine buffers and log accumulated output.
    pub debug: Option<bool>,
}

fn secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl DeviceConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fill unset keys with the stock Cisco IOS defaults.
    pub fn apply_defaults(&mut self) -> &mut Self {
        self.disable_paging.get_or_insert(true);
        self.disable_paging_command
            .get_or_insert_with(|| "terminal length 0".to_string());
        self.port.get_or_insert(23);
        self.connect_timeout.get_or_insert(5);
        self.command_timeout.get_or_insert(3);
        self.password_prompt
            .get_or_insert_with(|| r"[Pp]assword:\s+$".to_string());
        self.enable_password_prompt
            .get_or_insert_with(|| r"[Pp]assword:\s+$".to_string());
        self.enable_command.get_or_insert_with(|| "enable".to_string());
        self
    }

    /// Return the config with defaults applied.
    pub fn with_defaults(mut self) -> Self {
        self.apply_defaults();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_from_json() {
        let config = DeviceConfig::from_json(
            r#"{
                "id": "core-sw1",
                "address": "10.0.0.1",
                "prompt": "core-sw1>",
                "password": "p4ssw0rD",
                "command_timeout": 10
            }"#,
        )
        .unwrap();

        assert_eq!(config.id.as_deref(), Some("core-sw1"));
        assert_eq!(config.command_timeout, Some(10));
        assert_eq!(
            config.password.as_ref().map(|p| p.expose_secret()),
            Some("p4ssw0rD")
        );
        assert!(config.enable_password.is_none());
        assert!(config.port.is_none());
    }

    #[test]
    fn test_from_json_invalid() {
        let err = DeviceConfig::from_json(r#"{"port": "twenty-three"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_defaults_fill_only_unset_keys() {
        let config = DeviceConfig {
            port: Some(2323),
            enable_command: Some("enable 15".to_string()),
            ..Default::default()
        }
        .with_defaults();

        assert_eq!(config.port, Some(2323));
        assert_eq!(config.enable_command.as_deref(), Some("enable 15"));
        assert_eq!(config.disable_paging, Some(true));
        assert_eq!(
            config.disable_paging_command.as_deref(),
            Some("terminal length 0")
        );
        assert_eq!(config.connect_timeout, Some(5));
        assert_eq!(config.command_timeout, Some(3));
        assert_eq!(config.password_prompt.as_deref(), Some(r"[Pp]assword:\s+$"));
        assert_eq!(
            config.enable_password_prompt.as_deref(),
            Some(r"[Pp]assword:\s+$")
        );
        assert!(config.prompt.is_none());
    }
}
