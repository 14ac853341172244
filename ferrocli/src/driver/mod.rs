//! Session driver for Cisco-style devices.
//!
//! [`CiscoSession`] drives a CLI over an [`Expect`](crate::channel::Expect)
//! engine: log in, enter privileged mode, run commands and exit. Command
//! output is cleaned and checked for device error banners on the way out.

mod builder;
mod options;
mod session;

pub use builder::SessionBuilder;
pub use options::CommandOptions;
pub use session::CiscoSession;
