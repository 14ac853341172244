//! Validated per-session device profile.

use std::time::Duration;

use secrecy::SecretString;

use super::DeviceConfig;
use crate::channel::Pattern;
use crate::error::ConfigError;

/// Immutable device configuration bound to a session.
///
/// The identity, the unprivileged prompt and the command timeout are
/// required. Settings used only by `login()` or `enable()` stay optional
/// and are checked by those operations before they touch the stream.
#[derive(Debug)]
pub struct DeviceProfile {
    /// Unique identifier of the device, used in messages.
    pub id: String,

    /// Transport address (consumed by the caller that connects).
    pub address: Option<String>,

    /// Transport port (consumed by the caller that connects).
    pub port: Option<u16>,

    /// Connection timeout (consumed by the caller that connects).
    pub connect_timeout: Option<Duration>,

    /// How long to wait for a command to complete.
    pub command_timeout: Duration,

    /// Unprivileged prompt.
    pub prompt: Pattern,

    /// Privileged prompt, including configuration sub-modes.
    pub enabled_prompt: Option<Pattern>,

    /// Login password prompt.
    pub password_prompt: Option<Pattern>,

    /// Login password.
    pub password: Option<SecretString>,

    /// Command that enters privileged EXEC mode.
    pub enable_command: Option<String>,

    /// Enable password prompt.
    pub enable_password_prompt: Option<Pattern>,

    /// Enable password.
    pub enable_password: Option<SecretString>,

    /// Whether to disable paging after login.
    pub disable_paging: bool,

    /// Command that disables paging.
    pub disable_paging_command: Option<String>,

    /// Keep engine buffers and log accumulated output.
    pub debug: bool,
}

/// Everything `enable()` needs.
#[derive(Debug)]
pub(crate) struct EnableSettings<'a> {
    pub command: &'a str,
    pub password_prompt: &'a Pattern,
    pub password: &'a SecretString,
    pub enabled_prompt: &'a Pattern,
}

impl DeviceProfile {
    /// Create a profile with the required fields.
    pub fn new(id: impl Into<String>, prompt: Pattern, command_timeout: Duration) -> Self {
        Self {
            id: id.into(),
            address: None,
            port: None,
            connect_timeout: None,
            command_timeout,
            prompt,
            enabled_prompt: None,
            password_prompt: None,
            password: None,
            enable_command: None,
            enable_password_prompt: None,
            enable_password: None,
            disable_paging: false,
            disable_paging_command: None,
            debug: false,
        }
    }

    /// Set the transport address.
    pub fn with_address(mut self, address: impl Into<String>, port: u16) -> Self {
        self.address = Some(address.into());
        self.port = Some(port);
        self
    }

    /// Set the privileged prompt.
    pub fn with_enabled_prompt(mut self, prompt: Pattern) -> Self {
        self.enabled_prompt = Some(prompt);
        self
    }

    /// Set the login prompt and password.
    pub fn with_login(mut self, password_prompt: Pattern, password: impl Into<String>) -> Self {
        self.password_prompt = Some(password_prompt);
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Set the privilege escalation command, prompt and password.
    pub fn with_enable(
        mut self,
        command: impl Into<String>,
        password_prompt: Pattern,
        password: impl Into<String>,
    ) -> Self {
        self.enable_command = Some(command.into());
        self.enable_password_prompt = Some(password_prompt);
        self.enable_password = Some(SecretString::from(password.into()));
        self
    }

    /// Disable paging after login using `command`.
    pub fn with_paging_disabled(mut self, command: impl Into<String>) -> Self {
        self.disable_paging = true;
        self.disable_paging_command = Some(command.into());
        self
    }

    /// Enable debug mode.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The prompt that ends a command at the given privilege.
    pub(crate) fn prompt_for(&self, privileged: bool) -> Result<&Pattern, ConfigError> {
        if privileged {
            self.enabled_prompt
                .as_ref()
                .ok_or(ConfigError::MissingField {
                    field: "enabled_prompt",
                })
        } else {
            Ok(&self.prompt)
        }
    }

    /// The login prompt and password.
    pub(crate) fn login_settings(&self) -> Result<(&Pattern, &SecretString), ConfigError> {
        let prompt = self.password_prompt.as_ref().ok_or(ConfigError::MissingField {
            field: "password_prompt",
        })?;
        let password = self
            .password
            .as_ref()
            .ok_or(ConfigError::MissingField { field: "password" })?;
        Ok((prompt, password))
    }

    /// The paging command to run after login, if paging is to be disabled.
    pub(crate) fn paging_command(&self) -> Result<Option<&str>, ConfigError> {
        if !self.disable_paging {
            return Ok(None);
        }
        self.disable_paging_command
            .as_deref()
            .map(Some)
            .ok_or(ConfigError::MissingField {
                field: "disable_paging_command",
            })
    }

    pub(crate) fn enable_settings(&self) -> Result<EnableSettings<'_>, ConfigError> {
        Ok(EnableSettings {
            command: self
                .enable_command
                .as_deref()
                .ok_or(ConfigError::MissingField {
                    field: "enable_command",
                })?,
            password_prompt: self.enable_password_prompt.as_ref().ok_or(
                ConfigError::MissingField {
                    field: "enable_password_prompt",
                },
            )?,
            password: self
                .enable_password
                .as_ref()
                .ok_or(ConfigError::MissingField {
                    field: "enable_password",
                })?,
            enabled_prompt: self
                .enabled_prompt
                .as_ref()
                .ok_or(ConfigError::MissingField {
                    field: "enabled_prompt",
                })?,
        })
    }
}

fn compile(field: &'static str, pattern: Option<String>) -> Result<Option<Pattern>, ConfigError> {
    pattern
        .map(|p| Pattern::new(&p).map_err(|source| ConfigError::InvalidPattern { field, source }))
        .transpose()
}

impl TryFrom<DeviceConfig> for DeviceProfile {
    type Error = ConfigError;

    fn try_from(config: DeviceConfig) -> Result<Self, Self::Error> {
        let id = config.id.ok_or(ConfigError::MissingField { field: "id" })?;
        let prompt = compile("prompt", config.prompt)?
            .ok_or(ConfigError::MissingField { field: "prompt" })?;
        let command_timeout = config.command_timeout.ok_or(ConfigError::MissingField {
            field: "command_timeout",
        })?;

        let disable_paging = config.disable_paging.unwrap_or(false);
        if disable_paging && config.disable_paging_command.is_none() {
            return Err(ConfigError::MissingField {
                field: "disable_paging_command",
            });
        }

        Ok(Self {
            id,
            address: config.address,
            port: config.port,
            connect_timeout: config.connect_timeout.map(Duration::from_secs),
            command_timeout: Duration::from_secs(command_timeout),
            prompt,
            enabled_prompt: compile("enabled_prompt", config.enabled_prompt)?,
            password_prompt: compile("password_prompt", config.password_prompt)?,
            password: config.password,
            enable_command: config.enable_command,
            enable_password_prompt: compile(
                "enable_password_prompt",
                config.enable_password_prompt,
            )?,
            enable_password: config.enable_password,
            disable_paging,
            disable_paging_command: config.disable_paging_command,
            debug: config.debug.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeriveOptions, default_hooks, derive};
    use secrecy::ExposeSecret;

    fn minimal() -> DeviceConfig {
        DeviceConfig {
            id: Some("switch".to_string()),
            prompt: Some("switch>".to_string()),
            command_timeout: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_profile() {
        let profile = DeviceProfile::try_from(minimal()).unwrap();
        assert_eq!(profile.id, "switch");
        assert_eq!(profile.command_timeout, Duration::from_secs(3));
        assert!(!profile.disable_paging);
        assert!(!profile.debug);
        assert_eq!(profile.paging_command().unwrap(), None);
    }

    #[test]
    fn test_missing_required_fields() {
        let mut config = minimal();
        config.prompt = None;
        assert!(matches!(
            DeviceProfile::try_from(config),
            Err(ConfigError::MissingField { field: "prompt" })
        ));

        let mut config = minimal();
        config.id = None;
        assert!(matches!(
            DeviceProfile::try_from(config),
            Err(ConfigError::MissingField { field: "id" })
        ));
    }

    #[test]
    fn test_invalid_pattern_names_field() {
        let mut config = minimal();
        config.enabled_prompt = Some("switch(#".to_string());
        assert!(matches!(
            DeviceProfile::try_from(config),
            Err(ConfigError::InvalidPattern {
                field: "enabled_prompt",
                ..
            })
        ));
    }

    #[test]
    fn test_paging_without_command_rejected() {
        let mut config = minimal();
        config.disable_paging = Some(true);
        assert!(matches!(
            DeviceProfile::try_from(config),
            Err(ConfigError::MissingField {
                field: "disable_paging_command"
            })
        ));
    }

    #[test]
    fn test_full_pipeline() {
        let config = DeviceConfig {
            id: Some("core".to_string()),
            address: Some("192.0.2.10".to_string()),
            password: Some(SecretString::from("secret")),
            enable_password: Some(SecretString::from("secret2")),
            ..Default::default()
        }
        .with_defaults();
        let config = derive(config, &default_hooks(), DeriveOptions::default()).unwrap();
        let profile = DeviceProfile::try_from(config).unwrap();

        assert_eq!(profile.port, Some(23));
        assert_eq!(profile.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(profile.paging_command().unwrap(), Some("terminal length 0"));

        let (prompt, password) = profile.login_settings().unwrap();
        assert!(prompt.is_match(b"\nPassword: "));
        assert_eq!(password.expose_secret(), "secret");

        let enable = profile.enable_settings().unwrap();
        assert_eq!(enable.command, "enable");
        assert!(enable.enabled_prompt.is_match(b"core#"));
        assert!(profile.prompt_for(true).unwrap().is_match(b"core(config)#"));
        assert!(profile.prompt_for(false).unwrap().is_match(b"core>"));
    }

    #[test]
    fn test_operation_settings_missing() {
        let profile = DeviceProfile::try_from(minimal()).unwrap();
        assert!(matches!(
            profile.login_settings(),
            Err(ConfigError::MissingField {
                field: "password_prompt"
            })
        ));
        assert!(matches!(
            profile.enable_settings(),
            Err(ConfigError::MissingField {
                field: "enable_command"
            })
        ));
        assert!(matches!(
            profile.prompt_for(true),
            Err(ConfigError::MissingField {
                field: "enabled_prompt"
            })
        ));
    }

    #[test]
    fn test_builder_methods() {
        let profile = DeviceProfile::new("r1", Pattern::literal("r1>"), Duration::from_secs(5))
            .with_address("192.0.2.1", 2323)
            .with_login(Pattern::literal("Password:"), "pw")
            .with_paging_disabled("terminal length 0")
            .with_debug(true);

        assert_eq!(profile.address.as_deref(), Some("192.0.2.1"));
        assert_eq!(profile.port, Some(2323));
        assert!(profile.debug);
        assert!(profile.login_settings().is_ok());
        assert_eq!(profile.paging_command().unwrap(), Some("terminal length 0"));
    }
}
