use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::path::{Path, PathBuf};

use doorsense::audio::{PcmFileSource, SampleSource, WavFileSource};
use doorsense::config::ScanConfig;
use doorsense::constants::SAMPLING_RATE;
use doorsense::{format_timestamp, save_wav, AudioScanner, ScanFlags};

#[derive(Parser, Debug)]
#[command(name = "scan_wav")]
#[command(about = "Batch-analyze audio files for knock and doorbell events", long_about = None)]
struct Args {
    /// Audio files to analyze (.wav or raw 16-bit LE PCM)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// High sensitivity mode
    #[arg(long)]
    high_sensitivity: bool,

    /// Bell fundamental frequency in Hz
    #[arg(long, default_value = "770.0")]
    bell_freq: f32,

    /// Diagnostic tap mask in hex (OR of the OUTP_* flag values)
    #[arg(short = 't', long)]
    taps: Option<String>,

    /// Enable the knock-debugging taps (normalized audio + windowed level)
    #[arg(short = 'k', long)]
    knock_debug: bool,

    /// Enable the ring-debugging taps (normalized audio + bell level)
    #[arg(short = 'r', long)]
    ring_debug: bool,

    /// Directory for tap dumps (one multichannel WAV per input file)
    #[arg(short = 'o', long)]
    dump_taps: Option<PathBuf>,

    /// Processing batch size in samples
    #[arg(long, default_value = "256")]
    batch_size: usize,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f32,
    std_dev: f32,
    min: f32,
    max: f32,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct FileAnalysis {
    filename: String,
    duration_secs: f32,
    knocks: u32,
    rings: u32,
    events: Vec<String>,
    final_threshold: f32,
    threshold: Option<StatsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = ScanConfig::default();
    config.bell.frequency_hz = args.bell_freq;

    let mut flags = ScanFlags::empty();
    if args.high_sensitivity {
        flags |= ScanFlags::HIGH_SENSITIVITY;
    }
    if args.knock_debug {
        flags |= ScanFlags::OUTP_NORMAL_AUDIO | ScanFlags::OUTP_WINDOW_LEVEL;
    }
    if args.ring_debug {
        flags |= ScanFlags::OUTP_NORMAL_AUDIO | ScanFlags::OUTP_FILTER_LEVEL;
    }
    if let Some(ref mask) = args.taps {
        let bits = u32::from_str_radix(mask.trim_start_matches("0x"), 16)?;
        flags |= ScanFlags::from_bits(bits);
    }
    if args.verbose >= 1 {
        flags |= ScanFlags::DISP_EVENTS | ScanFlags::DISP_PEAKS;
    }

    if flags.tap_count() > 0 && args.dump_taps.is_none() {
        anyhow::bail!("Tap flags need --dump-taps to name an output directory");
    }

    let results: Vec<FileAnalysis> = args
        .files
        .iter()
        .map(|path| analyze_file(path, &config, flags, args.batch_size, args.dump_taps.as_deref()))
        .collect();

    match args.format {
        OutputFormat::Text => print_text(&results),
        OutputFormat::Csv => print_csv(&results),
        OutputFormat::Json => print_json(&results)?,
    }

    Ok(())
}

fn analyze_file(
    path: &Path,
    config: &ScanConfig,
    flags: ScanFlags,
    batch_size: usize,
    dump_taps: Option<&Path>,
) -> FileAnalysis {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    match analyze_file_impl(path, config, flags, batch_size, dump_taps) {
        Ok(analysis) => analysis,
        Err(e) => FileAnalysis {
            filename,
            duration_secs: 0.0,
            knocks: 0,
            rings: 0,
            events: Vec::new(),
            final_threshold: 0.0,
            threshold: None,
            error: Some(e.to_string()),
        },
    }
}

fn analyze_file_impl(
    path: &Path,
    config: &ScanConfig,
    flags: ScanFlags,
    batch_size: usize,
    dump_taps: Option<&Path>,
) -> anyhow::Result<FileAnalysis> {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let is_wav = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    let mut source: Box<dyn SampleSource> = if is_wav {
        Box::new(WavFileSource::new(path, batch_size)?)
    } else {
        Box::new(PcmFileSource::new(path, batch_size)?)
    };

    let mut scanner = AudioScanner::new(config)?;
    let tap_count = flags.tap_count();
    let mut tap_samples: Vec<i16> = Vec::new();

    let mut knocks = 0u32;
    let mut rings = 0u32;
    let mut events = Vec::new();
    let mut threshold_stats: Stats<f32> = Stats::new();

    loop {
        let Some(batch) = source.next_batch()? else {
            break;
        };

        let detections = if tap_count > 0 {
            scanner.scan(&batch, Some(&mut tap_samples), flags)
        } else {
            scanner.scan(&batch, None, flags)
        };

        if detections.knock() {
            knocks += 1;
            events.push(format!("{} KNOCK", format_timestamp(scanner.sample_index())));
        }
        if detections.bell() {
            rings += 1;
            events.push(format!("{} RING", format_timestamp(scanner.sample_index())));
        }

        threshold_stats.update(scanner.peak_threshold());
    }

    if let Some(dump_dir) = dump_taps.filter(|_| tap_count > 0) {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let dump_path = dump_dir.join(format!("{}_taps.wav", stem));
        log::info!(
            "Writing {} tap frames to {}",
            tap_samples.len() / tap_count.max(1),
            dump_path.display()
        );
        save_wav(
            dump_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Invalid path"))?,
            &tap_samples,
            SAMPLING_RATE,
            tap_count as u16,
        )?;
    }

    Ok(FileAnalysis {
        filename,
        duration_secs: scanner.sample_index() as f32 / SAMPLING_RATE as f32,
        knocks,
        rings,
        events,
        final_threshold: scanner.peak_threshold(),
        threshold: StatsSummary::from_stats(&threshold_stats),
        error: None,
    })
}

fn print_text(results: &[FileAnalysis]) {
    println!(
        "{:<40} {:>10} {:>8} {:>8} {:>12}",
        "File", "Duration", "Knocks", "Rings", "Threshold"
    );
    println!("{}", "-".repeat(82));

    for result in results {
        if let Some(ref err) = result.error {
            println!("{:<40} ERROR: {}", result.filename, err);
            continue;
        }

        println!(
            "{:<40} {:>9.1}s {:>8} {:>8} {:>12.2}",
            result.filename, result.duration_secs, result.knocks, result.rings,
            result.final_threshold
        );
    }

    for result in results {
        if !result.events.is_empty() {
            println!();
            println!("Events in {}:", result.filename);
            for event in &result.events {
                println!("  {}", event);
            }
        }

        if let Some(ref threshold) = result.threshold {
            println!();
            println!("Threshold for {}:", result.filename);
            println!("  Mean: {:.2}", threshold.mean);
            println!("  Std dev: {:.2}", threshold.std_dev);
            println!("  Range: {:.2} - {:.2}", threshold.min, threshold.max);
        }
    }
}

fn print_csv(results: &[FileAnalysis]) {
    println!("filename,duration_secs,knocks,rings,final_threshold,threshold_mean,threshold_std,error");
    for result in results {
        let threshold_mean = result
            .threshold
            .as_ref()
            .map(|s| format!("{:.4}", s.mean))
            .unwrap_or_default();
        let threshold_std = result
            .threshold
            .as_ref()
            .map(|s| format!("{:.4}", s.std_dev))
            .unwrap_or_default();
        let error = result.error.as_deref().unwrap_or("");

        println!(
            "{},{:.2},{},{},{:.2},{},{},{}",
            result.filename,
            result.duration_secs,
            result.knocks,
            result.rings,
            result.final_threshold,
            threshold_mean,
            threshold_std,
            error
        );
    }
}

fn print_json(results: &[FileAnalysis]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    println!("{}", json);
    Ok(())
}
