use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use wavepcm::{decode_wave_with_options, ChannelBuffers, DecodeOptions, DecodedWave, FmtAlignment};

#[derive(Parser)]
#[command(version)]
/// Prints the PCM format of WAV files
pub struct Args {
    #[arg(required = true)]
    /// Paths to the wav files
    wav_paths: Vec<PathBuf>,
    #[arg(short, long)]
    /// Continue after the declared end of a 'fmt ' chunk that is longer than 16 bytes
    skip_fmt_extension: bool,
    #[arg(short, long)]
    /// If set, writes every channel as raw little endian pcm into this directory
    extract: Option<PathBuf>,
}

fn print_info(path: &Path, wave: &DecodedWave) {
    let format = &wave.format;
    println!("{}", path.display());
    println!(
        "  {} channels, {} Hz, {} bits, block align {}, {} bytes/s",
        format.channels,
        format.sample_rate,
        format.bits_per_sample,
        format.block_align,
        format.byte_rate
    );
    println!(
        "  data: {} bytes at {:#x}, {} samples per channel",
        wave.data.size,
        wave.data.offset,
        wave.channels.samples_per_channel()
    );
    for warning in &wave.warnings {
        println!("  warning: {warning}");
    }
}

fn write_pcm(path: &Path, samples: &[i16]) -> anyhow::Result<()> {
    let mut out = BufWriter::new(
        File::create(path).with_context(|| format!("error creating {}", path.display()))?,
    );
    for sample in samples {
        out.write_all(&sample.to_le_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn extract_channels(dir: &Path, wav_path: &Path, channels: &ChannelBuffers) -> anyhow::Result<()> {
    let stem = wav_path
        .file_stem()
        .context("The input file has no file name")?
        .to_string_lossy();
    let outputs: Vec<(&str, &[i16])> = match channels {
        ChannelBuffers::Mono(c) => vec![("mono", c.as_slice())],
        ChannelBuffers::Stereo(l, r) => vec![("left", l.as_slice()), ("right", r.as_slice())],
    };
    for (name, samples) in outputs {
        let out_path = dir.join(format!("{stem}.{name}.pcm"));
        write_pcm(&out_path, samples)?;
        info!("wrote {} samples to {}", samples.len(), out_path.display());
    }
    Ok(())
}

fn process_file(args: &Args, options: DecodeOptions, path: &Path) -> anyhow::Result<()> {
    let wave = decode_wave_with_options(path, options).context("error reading wav file")?;
    print_info(path, &wave);
    if let Some(dir) = &args.extract {
        extract_channels(dir, path, &wave.channels)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let env = Env::new().default_filter_or("info");
    env_logger::init_from_env(env);
    let args = Args::parse();
    let options = DecodeOptions {
        fmt_alignment: if args.skip_fmt_extension {
            FmtAlignment::SkipDeclared
        } else {
            FmtAlignment::Compatible
        },
    };
    if let Some(dir) = &args.extract {
        std::fs::create_dir_all(dir).context("error creating extract directory")?;
    }
    let mut failed = 0;
    for path in &args.wav_paths {
        if let Err(e) = process_file(&args, options, path) {
            error!("problem with {}: {e:?}", path.display());
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} of {} files failed", args.wav_paths.len());
    }
    Ok(())
}
