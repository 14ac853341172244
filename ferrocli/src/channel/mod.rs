//! Channel layer: the stream engine contract and its tokio implementation.
//!
//! The driver talks to a device only through the [`Expect`] trait: write
//! bytes, then wait for one of a set of patterns. [`StreamChannel`] provides
//! that over any connected `AsyncRead + AsyncWrite` stream.

mod buffer;
#[cfg(test)]
pub(crate) mod mock;
mod patterns;
mod stream;

pub use buffer::{BufferMatch, PatternBuffer};
pub use patterns::Pattern;
#[cfg(test)]
pub(crate) use patterns::describe;
pub use stream::{StreamChannel, StreamConfig};

use std::future::Future;
use std::time::Duration;

use crate::error::ChannelError;

/// A successful pattern wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectMatch {
    /// Index of the pattern that matched.
    pub index: usize,

    /// Byte offset in `data` where the match starts.
    pub match_start: usize,

    /// Everything consumed, through the end of the match.
    pub data: String,
}

impl ExpectMatch {
    /// The text before the match.
    pub fn before(&self) -> &str {
        &self.data[..self.match_start]
    }

    /// The matched text itself.
    pub fn matched(&self) -> &str {
        &self.data[self.match_start..]
    }
}

/// Pattern-wait primitives over a character stream.
///
/// Failures are reported as [`ChannelError`]: a wait that runs out of time
/// is `Timeout`, a wait cut short by the remote end closing is
/// `ConnectionLost`. Both carry the data accumulated so far.
pub trait Expect: Send {
    /// Send bytes. Fails with [`ChannelError::Closed`] after end of stream.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Wait for any of `patterns`.
    fn expect(
        &mut self,
        patterns: &[Pattern],
        timeout: Duration,
    ) -> impl Future<Output = Result<ExpectMatch, ChannelError>> + Send;

    /// Wait for `pattern` and return everything through the match.
    fn read_until(
        &mut self,
        pattern: &Pattern,
        timeout: Duration,
    ) -> impl Future<Output = Result<String, ChannelError>> + Send {
        async move {
            let m = self.expect(std::slice::from_ref(pattern), timeout).await?;
            Ok(m.data)
        }
    }

    /// Whether end of stream has been observed.
    fn is_eof(&self) -> bool;
}
