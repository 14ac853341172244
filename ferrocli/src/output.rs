//! Command output cleanup and device error detection.
//!
//! Raw captured text looks like this:
//!
//! ```text
//! switch#show qwerty            <- command echo
//!              ^                <- caret under the offending input
//! % Invalid input detected at '^' marker.
//!
//! switch#                       <- trailing prompt
//! ```
//!
//! [`classify`] strips the echo and the prompt and splits a device error
//! banner from the rest of the output. Errors come in two shapes: the three
//! line caret form above, and a single `%` line:
//!
//! ```text
//! switch>123
//! % Unknown command or computer name, or unable to find computer address
//! switch>
//! ```

/// First character of a device error line.
pub const ERROR_MARKER: char = '%';

/// Text in an error line that refers to a caret on the line above.
pub const CARET_MARKER: &str = "'^' marker";

/// Which cleanup steps to apply to captured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// Remove the echoed command from the start.
    pub strip_command: bool,

    /// Remove the trailing prompt.
    pub strip_prompt: bool,

    /// Look for a device error banner.
    pub process_errors: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            strip_command: true,
            strip_prompt: true,
            process_errors: true,
        }
    }
}

/// A device error banner split from the surrounding output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceError {
    /// The banner lines, in order.
    pub error_lines: Vec<String>,

    /// Everything before and after the banner, in order.
    pub output_lines: Vec<String>,
}

impl DeviceError {
    /// The banner as a single string.
    pub fn error(&self) -> String {
        self.error_lines.join("\n")
    }

    /// The remaining output as a single string.
    pub fn output(&self) -> String {
        self.output_lines.join("\n")
    }
}

/// Result of classifying captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Clean output.
    Output(String),

    /// The device reported an error.
    DeviceError { error: String, output: String },
}

/// Find the first device error banner in `text`.
///
/// The first line starting with [`ERROR_MARKER`] is the banner. If it
/// mentions [`CARET_MARKER`], the line before it (the caret) and the line
/// after it are part of the banner too, as far as the text extends.
///
/// Note that the caret's column is not meaningful once the banner is cut
/// out of the output.
pub fn find_device_error(text: &str) -> Option<DeviceError> {
    let lines: Vec<&str> = text.split('\n').collect();
    let index = lines.iter().position(|l| l.starts_with(ERROR_MARKER))?;

    let banner = if lines[index].contains(CARET_MARKER) {
        index.saturating_sub(1)..(index + 2).min(lines.len())
    } else {
        index..index + 1
    };

    let error_lines = lines[banner.clone()]
        .iter()
        .map(|l| l.to_string())
        .collect();
    let output_lines = lines[..banner.start]
        .iter()
        .chain(&lines[banner.end..])
        .map(|l| l.to_string())
        .collect();

    Some(DeviceError {
        error_lines,
        output_lines,
    })
}

/// Strip the trailing prompt and the command echo from `data`.
///
/// `prompt_start` is the byte offset where the terminating pattern matched;
/// `None` means there is no prompt to strip (the stream ended instead).
/// The echo is only removed when the text starts with exactly `command`.
pub fn clean_output<'a>(
    data: &'a str,
    prompt_start: Option<usize>,
    command: &str,
    options: OutputOptions,
) -> &'a str {
    let mut text = data;
    if options.strip_prompt {
        if let Some(start) = prompt_start {
            text = &text[..start.min(text.len())];
        }
    }

    text = text.trim();

    if options.strip_command {
        if let Some(rest) = text.strip_prefix(command) {
            text = rest.trim_start();
        }
    }
    text
}

/// Clean `data` and split off any device error banner.
pub fn classify(
    data: &str,
    prompt_start: Option<usize>,
    command: &str,
    options: OutputOptions,
) -> Classified {
    let text = clean_output(data, prompt_start, command, options);

    if options.process_errors {
        if let Some(err) = find_device_error(text) {
            return Classified::DeviceError {
                error: err.error(),
                output: err.output(),
            };
        }
    }
    Classified::Output(text.to_string())
}
