//! Scripted in-memory engine for driver tests.

use std::collections::VecDeque;
use std::time::Duration;

use super::{Expect, ExpectMatch, Pattern};
use crate::error::ChannelError;

/// One scripted reply to a pattern wait.
#[derive(Debug)]
pub(crate) enum Reply {
    /// Device text; must contain a match for one of the awaited patterns.
    Text(&'static str),
    /// Text that never matches: the wait times out.
    Timeout(&'static str),
    /// Text followed by the remote end hanging up.
    Hangup(&'static str),
    /// An arbitrary engine error.
    Fail(ChannelError),
}

/// Engine that replays scripted replies and records every write.
#[derive(Debug, Default)]
pub(crate) struct ScriptedChannel {
    replies: VecDeque<Reply>,
    pub(crate) writes: Vec<String>,
    eof: bool,
}

impl ScriptedChannel {
    pub(crate) fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            writes: Vec::new(),
            eof: false,
        }
    }

    pub(crate) fn closed() -> Self {
        Self {
            eof: true,
            ..Default::default()
        }
    }
}

impl Expect for ScriptedChannel {
    async fn write(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if self.eof {
            return Err(ChannelError::Closed);
        }
        self.writes.push(String::from_utf8_lossy(data).into_owned());
        Ok(())
    }

    async fn expect(
        &mut self,
        patterns: &[Pattern],
        timeout: Duration,
    ) -> Result<ExpectMatch, ChannelError> {
        let expecting = super::describe(patterns);
        match self.replies.pop_front() {
            Some(Reply::Text(text)) => patterns
                .iter()
                .enumerate()
                .find_map(|(index, p)| {
                    p.find_at(text.as_bytes(), 0).map(|(start, end)| ExpectMatch {
                        index,
                        match_start: start,
                        data: text[..end].to_string(),
                    })
                })
                .ok_or(ChannelError::Timeout {
                    timeout,
                    expecting,
                    data: text.to_string(),
                }),
            Some(Reply::Timeout(text)) => Err(ChannelError::Timeout {
                timeout,
                expecting,
                data: text.to_string(),
            }),
            None => Err(ChannelError::Timeout {
                timeout,
                expecting,
                data: String::new(),
            }),
            Some(Reply::Hangup(text)) => {
                self.eof = true;
                Err(ChannelError::ConnectionLost {
                    expecting,
                    data: text.to_string(),
                })
            }
            Some(Reply::Fail(err)) => Err(err),
        }
    }

    fn is_eof(&self) -> bool {
        self.eof
    }
}
