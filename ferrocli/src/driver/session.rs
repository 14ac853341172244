//! Session driver for Cisco-style CLIs.

use std::time::Duration;

use log::{debug, info};
use secrecy::ExposeSecret;

use super::builder::SessionBuilder;
use super::options::CommandOptions;
use crate::channel::Expect;
use crate::config::DeviceProfile;
use crate::error::{ChannelError, DriverError, Error, Result};
use crate::output::{self, Classified, OutputOptions};

/// Command that ends the CLI session.
const EXIT_COMMAND: &str = "exit";

/// A CLI session with one device.
///
/// Drives login, privilege escalation and command execution over an
/// [`Expect`] engine, and maps every engine failure onto a [`DriverError`].
///
/// Two pieces of state only ever move one way: once escalated the session
/// stays privileged, and once the remote end has closed the session stays
/// closed and refuses to send anything.
///
/// # Example
///
/// ```rust,no_run
/// use ferrocli::channel::StreamChannel;
/// use ferrocli::config::{DeriveOptions, DeviceConfig, DeviceProfile, default_hooks, derive};
/// use ferrocli::driver::CiscoSession;
///
/// # async fn example(stream: tokio::net::TcpStream) -> Result<(), ferrocli::Error> {
/// let config = DeviceConfig::from_json(r#"{
///     "id": "switch",
///     "password": "secret",
///     "enable_password": "secret2"
/// }"#)?
/// .with_defaults();
/// let config = derive(config, &default_hooks(), DeriveOptions::default())?;
/// let profile = DeviceProfile::try_from(config)?;
///
/// let mut session = CiscoSession::new(StreamChannel::with_defaults(stream), profile);
/// session.login().await?;
/// session.enable().await?;
/// let version = session.run_command("show version").await?;
/// println!("{version}");
/// session.exit().await?;
/// # Ok(())
/// # }
/// ```
pub struct CiscoSession<C> {
    channel: C,
    profile: DeviceProfile,

    /// Whether privileged EXEC mode has been entered.
    privileged: bool,

    /// Whether the remote end has closed the stream.
    closed: bool,

    command_timeout: Duration,
    debug: bool,
}

impl<C: Expect> CiscoSession<C> {
    /// Create a session using the profile's timeout and debug flag.
    pub fn new(channel: C, profile: DeviceProfile) -> Self {
        SessionBuilder::new(profile).build(channel)
    }

    pub(crate) fn from_parts(
        channel: C,
        profile: DeviceProfile,
        command_timeout: Duration,
        debug: bool,
    ) -> Self {
        Self {
            channel,
            profile,
            privileged: false,
            closed: false,
            command_timeout,
            debug,
        }
    }

    /// Whether privileged EXEC mode has been entered.
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Whether the session is known to be closed.
    pub fn is_closed(&self) -> bool {
        self.closed || self.channel.is_eof()
    }

    /// The effective command timeout.
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// Whether debug mode is on.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Get a reference to the device profile.
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Get a reference to the engine.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Unwrap the engine.
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Log in with the profile's password.
    ///
    /// Waits for the password prompt, sends the password and waits for the
    /// prompt. If the profile asks for it, paging is disabled afterwards.
    ///
    /// Fails with `UnexpectedResult` if the password prompt never shows up,
    /// and with `LoginFailed` if the prompt does not follow the password.
    pub async fn login(&mut self) -> Result<()> {
        let (password_prompt, password) = self.profile.login_settings()?;
        let prompt = self.profile.prompt_for(self.privileged)?;
        let paging_command = self.profile.paging_command()?.map(str::to_owned);
        let timeout = self.command_timeout;

        if let Err(e) = self.channel.read_until(password_prompt, timeout).await {
            return Err(match e {
                ChannelError::Timeout {
                    expecting, data, ..
                } => DriverError::UnexpectedResult {
                    command: None,
                    expected: expecting,
                    data,
                }
                .into(),
                ChannelError::ConnectionLost { data, .. } => {
                    self.closed = true;
                    self.login_failed(data)
                }
                other => other.into(),
            });
        }

        send_line(&mut self.channel, password.expose_secret()).await?;

        match self.channel.read_until(prompt, timeout).await {
            Ok(data) => self.log_data(&data),
            Err(ChannelError::Timeout { data, .. }) => return Err(self.login_failed(data)),
            Err(ChannelError::ConnectionLost { data, .. }) => {
                self.closed = true;
                return Err(self.login_failed(data));
            }
            Err(other) => return Err(other.into()),
        }

        info!("Logged in to {}", self.profile.id);

        if let Some(command) = paging_command {
            self.run_command(&command).await?;
        }
        Ok(())
    }

    /// Enter privileged EXEC mode.
    ///
    /// Runs the enable command expecting the enable password prompt, sends
    /// the enable password and waits for the privileged prompt.
    ///
    /// A device error from the enable command itself is returned as is;
    /// a missing prompt fails with `EnableFailed`.
    pub async fn enable(&mut self) -> Result<()> {
        self.enable_with_timeout(self.command_timeout).await
    }

    /// [`enable`](Self::enable) with an explicit timeout for both waits.
    pub async fn enable_with_timeout(&mut self, timeout: Duration) -> Result<()> {
        let settings = self.profile.enable_settings()?;
        let command = settings.command.to_owned();
        let options = CommandOptions::new()
            .prompt(settings.password_prompt.clone())
            .timeout(timeout);

        match self.run_command_with(&command, &options).await {
            Ok(_) => {}
            Err(Error::Driver(DriverError::UnexpectedResult { data, .. })) => {
                return Err(self.enable_failed(data));
            }
            Err(e) => return Err(e),
        }

        let settings = self.profile.enable_settings()?;
        send_line(&mut self.channel, settings.password.expose_secret()).await?;

        match self.channel.read_until(settings.enabled_prompt, timeout).await {
            Ok(data) => self.log_data(&data),
            Err(ChannelError::Timeout { data, .. }) => return Err(self.enable_failed(data)),
            Err(ChannelError::ConnectionLost { data, .. }) => {
                self.closed = true;
                return Err(self.enable_failed(data));
            }
            Err(other) => return Err(other.into()),
        }

        info!("Entered privileged EXEC mode on {}", self.profile.id);
        self.privileged = true;
        Ok(())
    }

    /// Run a command with default options and return its cleaned output.
    pub async fn run_command(&mut self, command: &str) -> Result<String> {
        self.run_command_with(command, &CommandOptions::default())
            .await
    }

    /// Run a command and return its cleaned output.
    ///
    /// Do not include a trailing newline; surrounding whitespace is trimmed
    /// and a newline appended when sending.
    ///
    /// Fails with:
    /// - `NotConnected` if the session is closed (nothing is sent)
    /// - `UnexpectedResult` if the terminating pattern never shows up
    /// - `Disconnected` if the remote end hangs up first
    /// - `CiscoCommandError` if the output contains a device error banner
    pub async fn run_command_with(
        &mut self,
        command: &str,
        options: &CommandOptions,
    ) -> Result<String> {
        let command = command.trim();
        if self.is_closed() {
            return Err(DriverError::NotConnected {
                device: self.profile.id.clone(),
                command: command.to_string(),
            }
            .into());
        }

        let prompt = match &options.prompt {
            Some(prompt) => prompt,
            None => self.profile.prompt_for(self.privileged)?,
        };
        let timeout = options.timeout.unwrap_or(self.command_timeout);

        debug!(
            "Running command '{}' on {}, expecting {}",
            command, self.profile.id, prompt
        );

        send_line(&mut self.channel, command).await?;

        match self
            .channel
            .expect(std::slice::from_ref(prompt), timeout)
            .await
        {
            Ok(m) => {
                self.log_data(&m.data);
                self.finish(command, &m.data, Some(m.match_start), options.output)
            }
            Err(ChannelError::ConnectionLost { data, .. }) => {
                self.closed = true;
                self.log_data(&data);
                if options.may_disconnect {
                    debug!("{} closed the connection after '{}'", self.profile.id, command);
                    let output = OutputOptions {
                        strip_prompt: false,
                        ..options.output
                    };
                    self.finish(command, &data, None, output)
                } else {
                    Err(DriverError::Disconnected {
                        command: command.to_string(),
                        data,
                    }
                    .into())
                }
            }
            Err(ChannelError::Timeout {
                expecting, data, ..
            }) => Err(DriverError::UnexpectedResult {
                command: Some(command.to_string()),
                expected: expecting,
                data,
            }
            .into()),
            Err(other) => Err(other.into()),
        }
    }

    /// Send `exit`, treating the remote end hanging up as success.
    pub async fn exit(&mut self) -> Result<String> {
        self.exit_with(CommandOptions::default()).await
    }

    /// [`exit`](Self::exit) with explicit options.
    pub async fn exit_with(&mut self, options: CommandOptions) -> Result<String> {
        self.run_command_with(EXIT_COMMAND, &options.allow_disconnect())
            .await
    }

    fn finish(
        &self,
        command: &str,
        data: &str,
        prompt_start: Option<usize>,
        options: OutputOptions,
    ) -> Result<String> {
        match output::classify(data, prompt_start, command, options) {
            Classified::Output(text) => Ok(text),
            Classified::DeviceError { error, output } => Err(DriverError::CiscoCommandError {
                device: self.profile.id.clone(),
                command: command.to_string(),
                error,
                output,
            }
            .into()),
        }
    }

    fn login_failed(&self, data: String) -> Error {
        DriverError::LoginFailed {
            device: self.profile.id.clone(),
            data,
        }
        .into()
    }

    fn enable_failed(&self, data: String) -> Error {
        DriverError::EnableFailed {
            device: self.profile.id.clone(),
            data,
        }
        .into()
    }

    fn log_data(&self, data: &str) {
        if self.debug {
            debug!("Received from {}: {:?}", self.profile.id, data);
        }
    }
}

/// Write `line` followed by a newline.
async fn send_line<C: Expect>(channel: &mut C, line: &str) -> Result<()> {
    let mut data = Vec::with_capacity(line.len() + 1);
    data.extend_from_slice(line.as_bytes());
    data.push(b'\n');
    channel.write(&data).await?;
    Ok(())
}
