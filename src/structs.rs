use binrw::binrw;

use crate::error::DecodeError;

// note: a WAVE file is a RIFF header followed by a flat list of chunks, every chunk
// starts with an 8 byte header. All numbers are little endian.

#[binrw]
#[brw(little)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RiffHeader {
    pub riff: [u8; 4],
    pub file_length: u32,
    pub wave: [u8; 4],
}

impl RiffHeader {
    pub fn byte_len() -> u64 {
        12
    }

    pub fn new(file_length: u32) -> Self {
        Self {
            riff: *b"RIFF",
            file_length,
            wave: *b"WAVE",
        }
    }

    pub fn check(&self) -> Result<(), DecodeError> {
        if &self.riff != b"RIFF" || &self.wave != b"WAVE" || self.file_length == 0 {
            return Err(DecodeError::MalformedContainer);
        }
        Ok(())
    }
}

#[binrw]
#[brw(little)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: [u8; 4],
    // size of the body, without this header
    pub size: u32,
}

impl ChunkHeader {
    pub fn byte_len() -> u64 {
        8
    }

    /// the chunk id for log output, ids are not guaranteed to be ASCII
    pub fn id_lossy(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

/// The `fmt ` chunk, read with the fixed layout of a plain PCM format.
#[binrw]
#[brw(little)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FormatData {
    pub header: ChunkHeader,
    // 1 is linear PCM
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    // bytes of one frame, all channels
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl FormatData {
    pub const PCM: u16 = 1;
    pub const BODY_LEN: u32 = 16;

    pub fn byte_len() -> u64 {
        ChunkHeader::byte_len() + Self::BODY_LEN as u64
    }

    /// canonical PCM format with a 16 byte body and consistent rates
    pub fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        let block_align = channels * bits_per_sample / 8;
        Self {
            header: ChunkHeader {
                id: *b"fmt ",
                size: Self::BODY_LEN,
            },
            format_tag: Self::PCM,
            channels,
            sample_rate,
            byte_rate: sample_rate * block_align as u32,
            block_align,
            bits_per_sample,
        }
    }

    pub fn expected_block_align(&self) -> u32 {
        self.bits_per_sample as u32 * self.channels as u32 / 8
    }

    /// number of whole frames in a data chunk of the given size, leftover bytes are dropped
    pub fn frame_count(&self, data_size: u32) -> usize {
        data_size
            .checked_div(self.block_align.into())
            .unwrap_or(0) as usize
    }
}
