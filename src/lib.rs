use std::{fs::File, io::BufReader, path::Path};

use log::debug;

mod decoder;
pub use decoder::*;
pub mod error;
pub mod structs;

pub use error::{ChunkKind, DecodeError, FormatWarning};
pub use structs::FormatData;

/// Decodes the PCM channels of the WAV file at `path`, the file is closed before returning.
pub fn decode_wave<P: AsRef<Path>>(path: P) -> Result<DecodedWave, DecodeError> {
    decode_wave_with_options(path, DecodeOptions::default())
}

pub fn decode_wave_with_options<P: AsRef<Path>>(
    path: P,
    options: DecodeOptions,
) -> Result<DecodedWave, DecodeError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    debug!("opened {path:?}, {} bytes", file.metadata()?.len());
    WaveDecoder::with_options(BufReader::new(file), options).decode()
}
