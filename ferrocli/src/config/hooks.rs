//! Derivation pass: compute missing configuration keys from other keys.
//!
//! Each [`Hook`] names the key it populates and a function computing the
//! value from the rest of the config. Hooks run in order, so later hooks
//! can build on values derived by earlier ones.

use std::fmt;

use log::{debug, error, warn};

use super::DeviceConfig;
use crate::error::ConfigError;

type HookFn = dyn Fn(&mut DeviceConfig, bool) -> Result<bool, String> + Send + Sync;

/// A derivation hook for a single config key.
pub struct Hook {
    field: &'static str,
    run: Box<HookFn>,
}

impl Hook {
    /// Create a hook that fills `slot` with the value of `compute`.
    ///
    /// `compute` returns an error message when the value cannot be derived
    /// from what is in the config.
    pub fn new<T, F>(
        field: &'static str,
        slot: fn(&mut DeviceConfig) -> &mut Option<T>,
        compute: F,
    ) -> Self
    where
        T: 'static,
        F: Fn(&DeviceConfig) -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            field,
            run: Box::new(move |config: &mut DeviceConfig, force: bool| -> Result<bool, String> {
                if slot(config).is_some() && !force {
                    return Ok(false);
                }
                let value = compute(config)?;
                *slot(config) = Some(value);
                Ok(true)
            }),
        }
    }

    /// The key this hook populates.
    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("field", &self.field).finish()
    }
}

/// Options for [`derive`].
#[derive(Debug, Clone, Copy)]
pub struct DeriveOptions {
    /// Run hooks even for keys that are already set.
    pub force: bool,

    /// Stop at the first failing hook instead of logging and continuing.
    pub strict: bool,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            force: false,
            strict: true,
        }
    }
}

/// Run `hooks` over `config`.
pub fn derive(
    mut config: DeviceConfig,
    hooks: &[Hook],
    options: DeriveOptions,
) -> Result<DeviceConfig, ConfigError> {
    for hook in hooks {
        match (hook.run)(&mut config, options.force) {
            Ok(true) => debug!("Derived '{}'", hook.field),
            Ok(false) => {}
            Err(message) => {
                let err = ConfigError::Hook {
                    field: hook.field,
                    message,
                };
                if options.strict {
                    error!("An error has occurred while processing configuration: {}", err);
                    return Err(err);
                }
                warn!("An error has occurred while processing configuration: {}", err);
            }
        }
    }
    Ok(config)
}

/// Derive the unprivileged prompt from the device id (`<id>>`).
pub fn prompt_from_id() -> Hook {
    Hook::new(
        "prompt",
        |c| &mut c.prompt,
        |c| {
            c.id.as_deref()
                .map(|id| format!("{}>", regex::escape(id)))
                .ok_or_else(|| "'id' is not set".to_string())
        },
    )
}

/// Derive the privileged prompt from the unprivileged one.
///
/// `switch>` becomes a pattern matching `switch#` as well as configuration
/// sub-modes such as `switch(config-if)#`.
pub fn enabled_prompt_from_prompt() -> Hook {
    Hook::new(
        "enabled_prompt",
        |c| &mut c.enabled_prompt,
        |c| {
            let prompt = c.prompt.as_deref().ok_or("'prompt' is not set")?;
            let (stem, anchor) = match prompt.strip_suffix('$') {
                Some(stem) => (stem, "$"),
                None => (prompt, ""),
            };
            let stem = stem
                .strip_suffix('>')
                .ok_or_else(|| format!("prompt '{prompt}' does not end with '>'"))?;
            Ok(format!(r"{stem}(\([\w.\-]+\))?#{anchor}"))
        },
    )
}

/// The stock hooks, in dependency order.
pub fn default_hooks() -> Vec<Hook> {
    vec![prompt_from_id(), enabled_prompt_from_prompt()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Pattern;

    fn config_with_id(id: &str) -> DeviceConfig {
        DeviceConfig {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_hooks_chain() {
        let config = derive(config_with_id("sw-1.lab"), &default_hooks(), DeriveOptions::default())
            .unwrap();

        let prompt = Pattern::new(config.prompt.as_deref().unwrap()).unwrap();
        assert!(prompt.is_match(b"sw-1.lab>"));
        assert!(!prompt.is_match(b"sw-1xlab>"));

        let enabled = Pattern::new(config.enabled_prompt.as_deref().unwrap()).unwrap();
        assert!(enabled.is_match(b"sw-1.lab#"));
        assert!(enabled.is_match(b"sw-1.lab(config)#"));
        assert!(enabled.is_match(b"sw-1.lab(config-if)#"));
        assert!(!enabled.is_match(b"sw-1.lab>"));
    }

    #[test]
    fn test_anchor_is_preserved() {
        let config = DeviceConfig {
            prompt: Some("router>$".to_string()),
            ..Default::default()
        };
        let config = derive(config, &[enabled_prompt_from_prompt()], DeriveOptions::default())
            .unwrap();
        assert_eq!(
            config.enabled_prompt.as_deref(),
            Some(r"router(\([\w.\-]+\))?#$")
        );
    }

    #[test]
    fn test_existing_keys_are_kept() {
        let mut config = config_with_id("switch");
        config.prompt = Some("custom>".to_string());

        let config = derive(config, &[prompt_from_id()], DeriveOptions::default()).unwrap();
        assert_eq!(config.prompt.as_deref(), Some("custom>"));
    }

    #[test]
    fn test_force_overrides_existing_keys() {
        let mut config = config_with_id("switch");
        config.prompt = Some("custom>".to_string());

        let options = DeriveOptions {
            force: true,
            ..Default::default()
        };
        let config = derive(config, &[prompt_from_id()], options).unwrap();
        assert_eq!(config.prompt.as_deref(), Some("switch>"));
    }

    #[test]
    fn test_strict_stops_on_failure() {
        let err = derive(
            DeviceConfig::default(),
            &default_hooks(),
            DeriveOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Hook { field: "prompt", .. }));
    }

    #[test]
    fn test_lenient_continues_on_failure() {
        let hooks = vec![
            enabled_prompt_from_prompt(),
            Hook::new("command_timeout", |c| &mut c.command_timeout, |_| Ok(10)),
        ];
        let options = DeriveOptions {
            strict: false,
            ..Default::default()
        };
        let config = derive(DeviceConfig::default(), &hooks, options).unwrap();
        assert!(config.enabled_prompt.is_none());
        assert_eq!(config.command_timeout, Some(10));
    }
}
