
use voicevox_synthesis::{self as vvs, AudioQuery, Waveform};

use std::io::Read;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(about = "Inspect and post-process VOICEVOX audio queries", long_about = None, version)]
struct Cli {
    #[command(subcommand)]
    subcommand: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the phoneme and accent features of an audio query read from stdin
    Features {
        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Print the kana reading of an audio query read from stdin
    Kana,

    /// Apply interrogative upspeak to an audio query read from stdin
    Upspeak,

    /// Apply volume, output rate and stereo settings to a raw decoder WAV read from stdin
    PostProcess {
        /// Volume scale
        #[arg(long, default_value_t = AudioQuery::default().volume_scale)]
        volume_scale: f64,

        /// Output sampling rate
        #[arg(long, default_value_t = AudioQuery::default().output_sampling_rate)]
        output_sampling_rate: u32,

        /// Duplicate the signal into two channels
        #[arg(long)]
        output_stereo: bool,
    },

    /// Join WAV files into one
    #[command(arg_required_else_help = true)]
    Connect {
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct PhonemeFeature {
    index: usize,
    phoneme: &'static str,
    phoneme_id: i64,
    accent: char,
    accent_id: i64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    match args.subcommand {
        Command::Features { json } => {
            let query = read_query()?;
            let flat = vvs::flatten::pre_process(&query.accent_phrases)?;
            let features = flat
                .phonemes
                .iter()
                .zip(&flat.accent_codes)
                .enumerate()
                .map(|(index, (phoneme, accent))| PhonemeFeature {
                    index,
                    phoneme: phoneme.symbol(),
                    phoneme_id: phoneme.id(),
                    accent: accent.symbol(),
                    accent_id: accent.id(),
                })
                .collect::<Vec<_>>();

            if json {
                write_json(&features)?;
            } else {
                println!("INDEX\tPHONEME\tPHONEME_ID\tACCENT\tACCENT_ID");
                for f in features {
                    println!("{}\t{}\t{}\t{}\t{}", f.index, f.phoneme, f.phoneme_id, f.accent, f.accent_id);
                }
            }
        },

        Command::Kana => {
            let query = read_query()?;
            println!("{}", vvs::kana::create_kana(&query.accent_phrases));
        },

        Command::Upspeak => {
            let mut query = read_query()?;
            query.accent_phrases = vvs::upspeak::apply_interrogative_upspeak(&query.accent_phrases);
            write_json(&query)?;
        },

        Command::PostProcess { volume_scale, output_sampling_rate, output_stereo } => {
            let mut bytes = Vec::new();
            std::io::stdin().read_to_end(&mut bytes)?;
            let raw = Waveform::from_wav_bytes(&bytes)?;
            if raw.channels != 1 {
                return Err(anyhow::anyhow!("Expected a mono decoder output, got {} channels", raw.channels));
            }
            log::info!("Read {} samples at {} Hz", raw.samples.len(), raw.sampling_rate);

            let query = AudioQuery {
                volume_scale,
                output_sampling_rate,
                output_stereo,
                ..AudioQuery::default()
            };
            let wave = vvs::synthesis::post_process(raw.samples, raw.sampling_rate, &query)?;
            std::io::stdout().write_all(&wave.to_wav_bytes()?)?;
        },

        Command::Connect { files } => {
            let waves = files
                .iter()
                .map(|path| {
                    log::debug!("Reading {}", path.display());
                    let bytes = std::fs::read(path)?;
                    Ok(Waveform::from_wav_bytes(&bytes)?)
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let wave = vvs::wave::connect_waves(&waves)?;
            log::info!("Connected {} files: {:.2} s at {} Hz", files.len(), wave.duration_secs(), wave.sampling_rate);
            std::io::stdout().write_all(&wave.to_wav_bytes()?)?;
        },
    }

    Ok(())
}

fn read_query() -> anyhow::Result<AudioQuery> {
    let text = std::io::read_to_string(std::io::stdin())?;
    let query = serde_json::from_str(&text)?;
    Ok(query)
}

fn write_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    std::io::stdout().write_all(json.as_bytes())?;
    Ok(())
}
