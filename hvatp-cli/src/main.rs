mod config;
mod logging;
mod ppm;
mod telemetry;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use config::CliConfig;
use hvatp_core::audio::{AudioEncoder, AudioPacketBuilder};
use hvatp_core::sequencing::ReassemblyBuffer;
use hvatp_core::visual::{FrameSequenceEncoder, VisualDecoder, VisualEncoder};
use logging::{FrameDecodedEvent, FrameEncodedEvent, FrameOutcome, LogEvent, StatisticsEvent};
use telemetry::TransferAggregator;

#[derive(Parser, Debug)]
#[command(author, version, about = "HVATP codec demonstration harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a message into a sequence of visual frames (and an announcing
    /// acoustic control packet), writing each frame as a PPM raster.
    Send {
        /// Path to TOML configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Message to encode (overrides any configured default)
        #[arg(short, long)]
        message: Option<String>,

        /// Directory to write per-frame PPM rasters into (overrides config)
        #[arg(short = 'o', long)]
        raster_dir: Option<PathBuf>,

        /// Write the acoustic announce packet to this WAV file (overrides config)
        #[arg(short = 'w', long)]
        wav_output: Option<PathBuf>,
    },

    /// Decode a sequence of PPM rasters back into the original message.
    Recv {
        /// Path to TOML configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// PPM raster files to decode, in any order
        rasters: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    match args.command {
        Command::Send {
            config,
            message,
            raster_dir,
            wav_output,
        } => run_send(config, message, raster_dir, wav_output),
        Command::Recv { config, rasters } => run_recv(config, rasters),
    }
}

fn load_config(path: Option<String>) -> Result<CliConfig> {
    match path {
        Some(path) => CliConfig::from_file(&path).wrap_err_with(|| format!("Failed to load config from {}", path)),
        None => Ok(CliConfig::default()),
    }
}

fn run_send(
    config_path: Option<String>,
    message: Option<String>,
    raster_dir_override: Option<PathBuf>,
    wav_output_override: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    config.visual.validate()?;
    config.audio.validate()?;

    if let Some(dir) = raster_dir_override {
        config.terminal.raster_dir = Some(dir);
    }
    if let Some(wav) = wav_output_override {
        config.terminal.wav_output = Some(wav);
    }

    let mut logger = logging::StructuredLogger::new(config.terminal.logging.clone())?;
    let message = message.unwrap_or_else(|| "Hello, HVATP!".to_string());

    logger.log(LogEvent::Info {
        message: format!("Encoding message of {} bytes", message.len()),
    })?;

    let sequencer = FrameSequenceEncoder::new(VisualEncoder::new(config.visual));
    let frames = sequencer.encode_data(message.as_bytes())?;

    let raster_dir = config
        .terminal
        .raster_dir
        .unwrap_or_else(|| PathBuf::from("hvatp_frames"));
    std::fs::create_dir_all(&raster_dir).wrap_err_with(|| format!("Failed to create {}", raster_dir.display()))?;

    let data_symbols = config.visual.data_symbols();
    let progress = ProgressBar::new(frames.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} frames written")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for (frame_id, raster) in frames.iter().enumerate() {
        let path = raster_dir.join(format!("frame_{:04}.ppm", frame_id));
        ppm::write_ppm(raster, &path)?;

        let chunk_start = frame_id * data_symbols;
        let chunk_len = message.len().saturating_sub(chunk_start).min(data_symbols);
        logger.log(LogEvent::FrameEncoded(FrameEncodedEvent {
            timestamp: chrono::Utc::now(),
            frame_id: frame_id as u32,
            total_frames: frames.len() as u16,
            data_length: chunk_len,
            module_count: config.visual.module_count,
        }))?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    if let Some(wav_path) = &config.terminal.wav_output {
        let builder = AudioPacketBuilder::new(AudioEncoder::new(config.audio.clone()));
        let ops = vec![(0x01u8, (frames.len() as u16).to_be_bytes().to_vec())];
        let samples = builder.build_operator_packet(0, &ops, 0);

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: config.audio.sample_rate as u32,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(wav_path, spec)?;
        for sample in samples.iter() {
            writer.write_sample(*sample as f32)?;
        }
        writer.finalize()?;

        logger.log(LogEvent::Info {
            message: format!("Wrote announce packet ({} frames) to {}", frames.len(), wav_path.display()),
        })?;
    }

    logger.log(LogEvent::Info {
        message: format!("Wrote {} frame(s) to {}", frames.len(), raster_dir.display()),
    })?;

    Ok(())
}

fn run_recv(config_path: Option<String>, raster_paths: Vec<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    config.visual.validate()?;

    let mut logger = logging::StructuredLogger::new(config.terminal.logging.clone())?;
    let mut decoder = VisualDecoder::new(config.visual);
    let mut reassembly = ReassemblyBuffer::new();
    let mut telemetry = TransferAggregator::new();

    let mut paths = raster_paths;
    paths.sort();

    let progress = ProgressBar::new(paths.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} frames decoded")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for path in &paths {
        let raster = ppm::read_ppm(path)?;
        let source = path.display().to_string();

        match decoder.decode_frame(&raster, false) {
            Ok(frame) => {
                telemetry.record(true, Some(frame.error_count));
                logger.log(LogEvent::FrameDecoded(FrameDecodedEvent {
                    timestamp: chrono::Utc::now(),
                    source: source.clone(),
                    outcome: FrameOutcome::Ok {
                        frame_id: frame.frame_id,
                        total_frames: frame.total_frames,
                        data_length: frame.data.len(),
                        error_count: frame.error_count,
                    },
                }))?;

                let metadata = hvatp_core::sequencing::FrameMetadata {
                    frame_id: frame.frame_id,
                    total_frames: frame.total_frames,
                    data_length: frame.data.len() as u16,
                };
                reassembly.insert(metadata, frame.data)?;
            }
            Err(err) => {
                telemetry.record(false, None);
                logger.log(LogEvent::FrameDecoded(FrameDecodedEvent {
                    timestamp: chrono::Utc::now(),
                    source,
                    outcome: FrameOutcome::Failed { reason: err.to_string() },
                }))?;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    logger.log(LogEvent::Statistics(StatisticsEvent {
        timestamp: chrono::Utc::now(),
        duration_secs: logger.elapsed(),
        frames_attempted: telemetry.frames_attempted(),
        frames_successful: telemetry.frames_successful(),
        success_rate: telemetry.success_rate(),
        error_count: telemetry.error_count_summary(),
    }))?;

    if reassembly.is_complete() {
        let data = reassembly.assemble().expect("checked complete above");
        let message = String::from_utf8_lossy(&data);
        logger.log(LogEvent::Info {
            message: format!("Recovered message: {}", message),
        })?;
    } else {
        logger.log(LogEvent::Warn {
            message: format!(
                "Incomplete transfer: {}/{} frames received",
                reassembly.frames_received(),
                reassembly.total_frames().map(|t| t as usize).unwrap_or(0)
            ),
        })?;
    }

    Ok(())
}
