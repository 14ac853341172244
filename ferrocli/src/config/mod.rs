//! Device configuration.
//!
//! Configuration flows in three steps:
//!
//! 1. Load a [`DeviceConfig`] (every key optional), e.g. from JSON.
//! 2. Fill gaps with [`DeviceConfig::apply_defaults`] and the [`derive`]
//!    hook pass.
//! 3. Validate into a [`DeviceProfile`], which the session is bound to.
//!
//! ```rust
//! use ferrocli::config::{DeriveOptions, DeviceConfig, DeviceProfile, default_hooks, derive};
//!
//! # fn main() -> Result<(), ferrocli::Error> {
//! let config = DeviceConfig::from_json(r#"{"id": "switch", "password": "secret"}"#)?
//!     .with_defaults();
//! let config = derive(config, &default_hooks(), DeriveOptions::default())?;
//! let profile = DeviceProfile::try_from(config)?;
//! assert_eq!(profile.port, Some(23));
//! # Ok(())
//! # }
//! ```

mod device;
mod hooks;
mod profile;

pub use device::DeviceConfig;
pub use hooks::{
    DeriveOptions, Hook, default_hooks, derive, enabled_prompt_from_prompt, prompt_from_id,
};
pub use profile::DeviceProfile;
