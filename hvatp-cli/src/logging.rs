//! Structured logging for frame and transfer-level events.

use crate::config::{LogFormat, LogTarget, LoggingConfig};
use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Structured log event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    /// One visual frame was encoded.
    FrameEncoded(FrameEncodedEvent),

    /// One visual frame was decoded (or failed to decode).
    FrameDecoded(FrameDecodedEvent),

    /// Final transfer-level statistical summary.
    Statistics(StatisticsEvent),

    /// General info message.
    Info { message: String },

    /// Warning message.
    Warn { message: String },

    /// Error message.
    Error { message: String, details: Option<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameEncodedEvent {
    pub timestamp: DateTime<Utc>,
    pub frame_id: u32,
    pub total_frames: u16,
    pub data_length: usize,
    pub module_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameDecodedEvent {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub outcome: FrameOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FrameOutcome {
    Ok {
        frame_id: u32,
        total_frames: u16,
        data_length: usize,
        error_count: usize,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsEvent {
    pub timestamp: DateTime<Utc>,
    pub duration_secs: f64,
    pub frames_attempted: usize,
    pub frames_successful: usize,
    pub success_rate: f64,
    pub error_count: StatSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSummary {
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

/// Logger that outputs structured logs.
pub struct StructuredLogger {
    config: LoggingConfig,
    writer: Box<dyn Write + Send>,
    start_time: DateTime<Utc>,
}

impl StructuredLogger {
    pub fn new(config: LoggingConfig) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match &config.target {
            LogTarget::Stdout => Box::new(io::stdout()),
            LogTarget::Stderr => Box::new(io::stderr()),
            LogTarget::File => {
                let path = config
                    .file_path
                    .as_ref()
                    .ok_or_else(|| color_eyre::eyre::eyre!("File path required for file logging"))?;
                Box::new(BufWriter::new(File::create(path)?))
            }
        };

        Ok(Self {
            config,
            writer,
            start_time: Utc::now(),
        })
    }

    pub fn log(&mut self, event: LogEvent) -> Result<()> {
        let output = match self.config.format {
            LogFormat::Json => self.format_json(&event)?,
            LogFormat::Logfmt => self.format_logfmt(&event)?,
            LogFormat::Pretty => self.format_pretty(&event)?,
        };

        writeln!(self.writer, "{}", output)?;
        self.writer.flush()?;

        Ok(())
    }

    fn format_json(&self, event: &LogEvent) -> Result<String> {
        Ok(serde_json::to_string(event)?)
    }

    fn format_logfmt(&self, event: &LogEvent) -> Result<String> {
        let ts = Utc::now().to_rfc3339();

        let msg = match event {
            LogEvent::FrameEncoded(f) => format!(
                "ts=\"{}\" type=frame_encoded frame_id={} total_frames={} data_length={} module_count={}",
                ts, f.frame_id, f.total_frames, f.data_length, f.module_count
            ),
            LogEvent::FrameDecoded(f) => match &f.outcome {
                FrameOutcome::Ok {
                    frame_id,
                    total_frames,
                    data_length,
                    error_count,
                } => format!(
                    "ts=\"{}\" type=frame_decoded source=\"{}\" result=ok frame_id={} total_frames={} data_length={} error_count={}",
                    ts, f.source, frame_id, total_frames, data_length, error_count
                ),
                FrameOutcome::Failed { reason } => {
                    format!("ts=\"{}\" type=frame_decoded source=\"{}\" result=failed reason=\"{}\"", ts, f.source, reason)
                }
            },
            LogEvent::Statistics(s) => format!(
                "ts=\"{}\" type=statistics duration_secs={:.2} frames_attempted={} frames_successful={} success_rate={:.4}",
                ts, s.duration_secs, s.frames_attempted, s.frames_successful, s.success_rate
            ),
            LogEvent::Info { message } => format!("ts=\"{}\" level=info msg=\"{}\"", ts, message),
            LogEvent::Warn { message } => format!("ts=\"{}\" level=warn msg=\"{}\"", ts, message),
            LogEvent::Error { message, details } => {
                if let Some(d) = details {
                    format!("ts=\"{}\" level=error msg=\"{}\" details=\"{}\"", ts, message, d)
                } else {
                    format!("ts=\"{}\" level=error msg=\"{}\"", ts, message)
                }
            }
        };

        Ok(msg)
    }

    fn format_pretty(&self, event: &LogEvent) -> Result<String> {
        let ts = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");

        let msg = match event {
            LogEvent::FrameEncoded(f) => format!(
                "[{}] ENCODED frame {}/{}: {} bytes into a {}x{} raster",
                ts, f.frame_id + 1, f.total_frames, f.data_length, f.module_count, f.module_count
            ),
            LogEvent::FrameDecoded(f) => match &f.outcome {
                FrameOutcome::Ok {
                    frame_id,
                    total_frames,
                    data_length,
                    error_count,
                } => format!(
                    "[{}] DECODED {}: frame {}/{}, {} bytes, {} symbol errors corrected",
                    ts, f.source, frame_id + 1, total_frames, data_length, error_count
                ),
                FrameOutcome::Failed { reason } => format!("[{}] DECODE FAILED {}: {}", ts, f.source, reason),
            },
            LogEvent::Statistics(s) => format!(
                "[{}] STATISTICS ({:.2}s): {}/{} frames decoded ({:.1}%) | error_count μ={:.2} σ={:.2} [{:.0},{:.0}]",
                ts,
                s.duration_secs,
                s.frames_successful,
                s.frames_attempted,
                s.success_rate * 100.0,
                s.error_count.mean,
                s.error_count.stddev,
                s.error_count.min,
                s.error_count.max
            ),
            LogEvent::Info { message } => format!("[{}] INFO: {}", ts, message),
            LogEvent::Warn { message } => format!("[{}] WARN: {}", ts, message),
            LogEvent::Error { message, details } => {
                if let Some(d) = details {
                    format!("[{}] ERROR: {} | {}", ts, message, d)
                } else {
                    format!("[{}] ERROR: {}", ts, message)
                }
            }
        };

        Ok(msg)
    }

    pub fn elapsed(&self) -> f64 {
        (Utc::now() - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}
