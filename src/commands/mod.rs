// commands/mod.rs
//! Line-oriented serial protocol spoken by the power controller.
//!
//! Two generations of commands share the wire:
//! - signal commands `"<channel><tag><value>w\n"`, typed by a one-letter tag;
//! - legacy toggles `"<channel>c\n"`, which only pulse a channel.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalTag {
    Remote,
    Local,
    Dmx,
}

impl SignalTag {
    pub fn as_char(self) -> char {
        match self {
            SignalTag::Remote => 'r',
            SignalTag::Local => 'l',
            SignalTag::Dmx => 'd',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialCommand {
    Signal {
        channel: i64,
        tag: SignalTag,
        value: i64,
    },
    Toggle {
        channel: i64,
    },
}

impl SerialCommand {
    pub fn signal(tag: SignalTag, channel: i64, value: i64) -> Self {
        SerialCommand::Signal {
            channel,
            tag,
            value,
        }
    }

    pub fn toggle(channel: i64) -> Self {
        SerialCommand::Toggle { channel }
    }

    /// Renders the command as one newline-terminated line.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for SerialCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialCommand::Signal {
                channel,
                tag,
                value,
            } => write!(f, "{}{}{}w", channel, tag.as_char(), value),
            SerialCommand::Toggle { channel } => write!(f, "{}c", channel),
        }
    }
}
