use std::{fmt, io};

use thiserror::Error;

/// The chunks a decode has to find, in the order they are searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Format,
    Data,
}

impl ChunkKind {
    pub fn id(&self) -> &'static [u8; 4] {
        match self {
            Self::Format => b"fmt ",
            Self::Data => b"data",
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format => f.write_str("fmt "),
            Self::Data => f.write_str("data"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Source can't be read")]
    SourceUnavailable(#[from] binrw::Error),
    #[error("Bad RIFF/WAVE header")]
    MalformedContainer,
    #[error("Found no '{0}' chunk in file")]
    ChunkNotFound(ChunkKind),
    #[error("'{0}' chunk ends before its fixed fields")]
    TruncatedChunk(ChunkKind),
    #[error("Non-PCM format tag {0}")]
    UnsupportedFormat(u16),
    #[error("Bad number of channels {0}, only mono or stereo is supported")]
    UnsupportedChannelLayout(u16),
}

impl From<io::Error> for DecodeError {
    fn from(value: io::Error) -> Self {
        Self::SourceUnavailable(binrw::Error::Io(value))
    }
}

/// Problems with the `fmt ` chunk that don't stop decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatWarning {
    /// the body isn't the 16 bytes of a plain PCM format, only those 16 bytes are read
    UnexpectedFormatSize { size: u32 },
    /// the declared block align is still used to read the samples
    BlockAlignMismatch {
        block_align: u16,
        bits_per_sample: u16,
        channels: u16,
    },
}

impl fmt::Display for FormatWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedFormatSize { size } => {
                write!(f, "'fmt ' chunk size seems to be off: {size} instead of 16")
            }
            Self::BlockAlignMismatch {
                block_align,
                bits_per_sample,
                channels,
            } => write!(
                f,
                "'fmt ' has strange bytes/bits/channels configuration: block align {block_align}, {bits_per_sample} bits, {channels} channels"
            ),
        }
    }
}
