//! Per-command options.

use std::time::Duration;

use crate::channel::Pattern;
use crate::output::OutputOptions;

/// Options for [`CiscoSession::run_command_with`](super::CiscoSession::run_command_with).
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use ferrocli::channel::Pattern;
/// use ferrocli::driver::CommandOptions;
///
/// let options = CommandOptions::new()
///     .prompt(Pattern::literal("Destination filename [startup-config]?"))
///     .timeout(Duration::from_secs(30))
///     .process_errors(false);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Terminating pattern; defaults to the prompt of the current privilege.
    pub prompt: Option<Pattern>,

    /// Timeout; defaults to the session's command timeout.
    pub timeout: Option<Duration>,

    /// Output cleanup and error detection.
    pub output: OutputOptions,

    /// Treat the remote end hanging up as success.
    pub(crate) may_disconnect: bool,
}

impl CommandOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for `prompt` instead of the current privilege's prompt.
    pub fn prompt(mut self, prompt: Pattern) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Override the command timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether to strip the echoed command.
    pub fn strip_command(mut self, strip: bool) -> Self {
        self.output.strip_command = strip;
        self
    }

    /// Whether to strip the trailing prompt.
    pub fn strip_prompt(mut self, strip: bool) -> Self {
        self.output.strip_prompt = strip;
        self
    }

    /// Whether to look for a device error banner.
    pub fn process_errors(mut self, process: bool) -> Self {
        self.output.process_errors = process;
        self
    }

    pub(crate) fn allow_disconnect(mut self) -> Self {
        self.may_disconnect = true;
        self
    }
}
