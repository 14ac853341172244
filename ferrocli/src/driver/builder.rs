//! Builder for creating sessions.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use super::session::CiscoSession;
use crate::channel::{Expect, StreamChannel, StreamConfig};
use crate::config::DeviceProfile;

/// Builder for constructing a [`CiscoSession`].
///
/// The effective command timeout and debug flag are resolved once, here:
/// an explicit override wins over the profile.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use ferrocli::channel::Pattern;
/// use ferrocli::config::DeviceProfile;
/// use ferrocli::driver::SessionBuilder;
///
/// # async fn example() -> Result<(), ferrocli::Error> {
/// let profile = DeviceProfile::new("switch", Pattern::literal("switch>"), Duration::from_secs(3))
///     .with_login(Pattern::new(r"[Pp]assword:\s+$").unwrap(), "secret");
///
/// let stream = tokio::net::TcpStream::connect("192.0.2.1:23")
///     .await
///     .map_err(ferrocli::error::ChannelError::Io)?;
/// let mut session = SessionBuilder::new(profile)
///     .command_timeout(Duration::from_secs(10))
///     .build_stream(stream);
///
/// session.login().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SessionBuilder {
    profile: DeviceProfile,
    command_timeout: Option<Duration>,
    debug: Option<bool>,
    search_depth: usize,
}

impl SessionBuilder {
    /// Create a new session builder for the given profile.
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            command_timeout: None,
            debug: None,
            search_depth: StreamConfig::default().search_depth,
        }
    }

    /// Override the profile's command timeout.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    /// Override the profile's debug flag.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Set the pattern search overlap used by [`build_stream`](Self::build_stream).
    pub fn search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }

    /// Build a session over an existing engine.
    pub fn build<C: Expect>(self, channel: C) -> CiscoSession<C> {
        let command_timeout = self.command_timeout.unwrap_or(self.profile.command_timeout);
        let debug = self.debug.unwrap_or(self.profile.debug);
        CiscoSession::from_parts(channel, self.profile, command_timeout, debug)
    }

    /// Build a session over a connected stream using [`StreamChannel`].
    ///
    /// In debug mode the channel keeps a transcript of everything received.
    pub fn build_stream<T>(self, stream: T) -> CiscoSession<StreamChannel<T>>
    where
        T: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let config = StreamConfig {
            search_depth: self.search_depth,
            debug: self.debug.unwrap_or(self.profile.debug),
            ..Default::default()
        };
        self.build(StreamChannel::new(stream, config))
    }
}
