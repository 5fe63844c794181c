use std::io::{self, Read, Seek, SeekFrom};

use binrw::BinReaderExt;
use log::{debug, trace, warn};

use crate::{
    error::{ChunkKind, DecodeError, FormatWarning},
    structs::{ChunkHeader, FormatData, RiffHeader},
};

/// What to do with the cursor after a `fmt ` chunk that is not 16 bytes long.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FmtAlignment {
    /// continue scanning right after the 16 bytes that were read, a larger chunk
    /// leaves the cursor inside its extension bytes
    #[default]
    Compatible,
    /// continue scanning after the declared end of the chunk
    SkipDeclared,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub fmt_alignment: FmtAlignment,
}

/// Where the samples are, `offset` points right after the `data` chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLocation {
    pub offset: u64,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelBuffers {
    Mono(Vec<i16>),
    Stereo(Vec<i16>, Vec<i16>),
}

impl ChannelBuffers {
    pub fn channel_count(&self) -> u8 {
        match self {
            Self::Mono(..) => 1,
            Self::Stereo(..) => 2,
        }
    }

    /// the only channel for mono
    pub fn left(&self) -> &[i16] {
        match self {
            Self::Mono(c) => c,
            Self::Stereo(c, _) => c,
        }
    }

    pub fn right(&self) -> Option<&[i16]> {
        match self {
            Self::Mono(_) => None,
            Self::Stereo(_, c) => Some(c),
        }
    }

    pub fn samples_per_channel(&self) -> usize {
        self.left().len()
    }

    pub fn into_channels(self) -> Vec<Vec<i16>> {
        match self {
            Self::Mono(c) => vec![c],
            Self::Stereo(l, r) => vec![l, r],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedWave {
    pub format: FormatData,
    pub data: DataLocation,
    pub channels: ChannelBuffers,
    pub warnings: Vec<FormatWarning>,
}

impl DecodedWave {
    pub fn into_parts(self) -> (FormatData, ChannelBuffers) {
        (self.format, self.channels)
    }
}

/// Decoding context, owns the source and its cursor for one decode.
pub struct WaveDecoder<R> {
    reader: R,
    options: DecodeOptions,
    warnings: Vec<FormatWarning>,
}

impl<R: Read + Seek> WaveDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecodeOptions::default())
    }

    pub fn with_options(reader: R, options: DecodeOptions) -> Self {
        Self {
            reader,
            options,
            warnings: Vec::new(),
        }
    }

    pub fn decode(mut self) -> Result<DecodedWave, DecodeError> {
        self.reader.rewind()?;
        self.check_container()?;
        let format = self.read_format()?;
        let data = self.locate_data()?;
        let channels = self.read_channels(&format, &data)?;
        debug!(
            "parsed wave: {} channels, {} Hz, {} samples per channel",
            format.channels,
            format.sample_rate,
            channels.samples_per_channel()
        );
        Ok(DecodedWave {
            format,
            data,
            channels,
            warnings: self.warnings,
        })
    }

    fn check_container(&mut self) -> Result<(), DecodeError> {
        let header: RiffHeader = match self.reader.read_le() {
            Ok(header) => header,
            Err(e) if e.is_eof() => return Err(DecodeError::MalformedContainer),
            Err(e) => return Err(e.into()),
        };
        header.check()
    }

    /// Walks the chunk list from the current position until a chunk with the id of
    /// `kind` is found, the cursor is left at the start of its header.
    fn find_chunk(&mut self, kind: ChunkKind) -> Result<u64, DecodeError> {
        loop {
            let chunk_start = self.reader.stream_position()?;
            let header: ChunkHeader = match self.reader.read_le() {
                Ok(header) => header,
                Err(e) if e.is_eof() => return Err(DecodeError::ChunkNotFound(kind)),
                Err(e) => return Err(e.into()),
            };
            if &header.id == kind.id() {
                debug!("found '{kind}' chunk at {chunk_start:#x}, {} bytes", header.size);
                self.reader.seek(SeekFrom::Start(chunk_start))?;
                return Ok(chunk_start);
            }
            trace!(
                "skipping '{}' chunk at {chunk_start:#x}, {} bytes",
                header.id_lossy(),
                header.size
            );
            // seeking past the end is fine, the next header read fails
            self.reader.seek(SeekFrom::Current(header.size.into()))?;
        }
    }

    fn read_format(&mut self) -> Result<FormatData, DecodeError> {
        let chunk_start = self.find_chunk(ChunkKind::Format)?;
        let format: FormatData = self.reader.read_le().map_err(|e| {
            if e.is_eof() {
                DecodeError::TruncatedChunk(ChunkKind::Format)
            } else {
                e.into()
            }
        })?;
        self.check_format(&format)?;
        if self.options.fmt_alignment == FmtAlignment::SkipDeclared
            && format.header.size != FormatData::BODY_LEN
        {
            let chunk_end = chunk_start + ChunkHeader::byte_len() + u64::from(format.header.size);
            self.reader.seek(SeekFrom::Start(chunk_end))?;
        }
        Ok(format)
    }

    fn check_format(&mut self, format: &FormatData) -> Result<(), DecodeError> {
        if format.format_tag != FormatData::PCM {
            return Err(DecodeError::UnsupportedFormat(format.format_tag));
        }
        if format.channels != 1 && format.channels != 2 {
            return Err(DecodeError::UnsupportedChannelLayout(format.channels));
        }
        if format.header.size != FormatData::BODY_LEN {
            self.warn(FormatWarning::UnexpectedFormatSize {
                size: format.header.size,
            });
        }
        if u32::from(format.block_align) != format.expected_block_align() {
            self.warn(FormatWarning::BlockAlignMismatch {
                block_align: format.block_align,
                bits_per_sample: format.bits_per_sample,
                channels: format.channels,
            });
        }
        Ok(())
    }

    fn warn(&mut self, warning: FormatWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    fn locate_data(&mut self) -> Result<DataLocation, DecodeError> {
        self.find_chunk(ChunkKind::Data)?;
        let header: ChunkHeader = self.reader.read_le()?;
        let offset = self.reader.stream_position()?;
        Ok(DataLocation {
            offset,
            size: header.size,
        })
    }

    fn read_channels(
        &mut self,
        format: &FormatData,
        data: &DataLocation,
    ) -> Result<ChannelBuffers, DecodeError> {
        let channel_count = format.channels as usize;
        let frame_count = format.frame_count(data.size);
        // both sizes are derived independently, for well formed 16 bit PCM they agree
        let buffer_bytes = data.size as usize / channel_count / 2 * 2;
        self.reader.seek(SeekFrom::Start(data.offset))?;

        if channel_count == 1 {
            let mut samples = vec![0u8; buffer_bytes];
            let wanted = (format.block_align as usize * frame_count).min(buffer_bytes);
            read_available(&mut self.reader, &mut samples[..wanted])?;
            return Ok(ChannelBuffers::Mono(samples_from_le_bytes(&samples)));
        }

        let mut left = vec![0u8; buffer_bytes];
        let mut right = vec![0u8; buffer_bytes];
        let mut sample = vec![0u8; format.block_align as usize / channel_count];
        'frames: for frame in 0..frame_count {
            for channel in [&mut left, &mut right] {
                let read = read_available(&mut self.reader, &mut sample)?;
                write_clamped(channel, frame * 2, &sample[..read]);
                if read < sample.len() {
                    // end of the source, everything after stays zero
                    break 'frames;
                }
            }
        }
        Ok(ChannelBuffers::Stereo(
            samples_from_le_bytes(&left),
            samples_from_le_bytes(&right),
        ))
    }
}

/// like `read_exact`, but a short read at the end of the source is not an error
fn read_available<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// samples wider than 2 bytes spill into the next slot, which the next frame overwrites
fn write_clamped(channel: &mut [u8], offset: usize, bytes: &[u8]) {
    if let Some(dest) = channel.get_mut(offset..) {
        let len = dest.len().min(bytes.len());
        dest[..len].copy_from_slice(&bytes[..len]);
    }
}

fn samples_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}
