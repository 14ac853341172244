//! # Ferrocli
//!
//! Async CLI session driver for Cisco-style network devices.
//!
//! Ferrocli drives an interactive command-line session over any connected
//! byte stream (typically telnet over TCP): it logs in, escalates to
//! privileged EXEC mode, runs commands and returns their cleaned output,
//! turning device error banners into typed errors.
//!
//! ## Features
//!
//! - Pattern-wait engine over any tokio `AsyncRead + AsyncWrite` stream
//! - Efficient pattern buffer matching (tail search with a bounded overlap)
//! - Device error detection for `%` banners, including the caret form
//! - Layered device configuration with defaults and derived prompts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ferrocli::{DeviceConfig, DeviceProfile, SessionBuilder};
//! use ferrocli::config::{DeriveOptions, default_hooks, derive};
//! use tokio::net::TcpStream;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ferrocli::Error> {
//!     let config = DeviceConfig::from_json(
//!         r#"{"id": "switch", "address": "192.0.2.1", "password": "secret"}"#,
//!     )?
//!     .with_defaults();
//!     let config = derive(config, &default_hooks(), DeriveOptions::default())?;
//!     let profile = DeviceProfile::try_from(config)?;
//!
//!     let stream = TcpStream::connect(("192.0.2.1", 23))
//!         .await
//!         .map_err(ferrocli::error::ChannelError::Io)?;
//!     let mut session = SessionBuilder::new(profile).build_stream(stream);
//!
//!     session.login().await?;
//!     println!("{}", session.run_command("show version").await?);
//!     session.exit().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod output;

// Re-export main types for convenience
pub use channel::{Expect, Pattern, StreamChannel};
pub use config::{DeviceConfig, DeviceProfile};
pub use driver::{CiscoSession, CommandOptions, SessionBuilder};
pub use error::{Error, Result};
