use clap::Parser;
use std::path::PathBuf;

use doorsense::audio::{DeviceSource, PcmFileSource, SampleSource, WavFileSource};
use doorsense::config::ScanConfig;
use doorsense::{format_timestamp, AudioScanner, ScanFlags};

#[derive(Parser, Debug)]
#[command(name = "doorsense")]
#[command(about = "Acoustic knock and doorbell detector", long_about = None)]
struct Args {
    /// Input audio file, .wav or raw 16-bit LE PCM (default: live capture)
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// High sensitivity mode (probably more false positives)
    #[arg(long)]
    high_sensitivity: bool,

    /// Bell fundamental frequency in Hz
    #[arg(long, default_value = "770.0")]
    bell_freq: f32,

    /// Bell filter quality factor
    #[arg(long, default_value = "100.0")]
    bell_q: f32,

    /// Log every accepted peak
    #[arg(long)]
    show_peaks: bool,

    /// Log the adaptive threshold every 10 seconds of audio
    #[arg(long)]
    show_thresholds: bool,

    /// Processing batch size in samples
    #[arg(long, default_value = "256")]
    batch_size: usize,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = ScanConfig::default();
    config.bell.frequency_hz = args.bell_freq;
    config.bell.q = args.bell_q;

    let mut flags = ScanFlags::DISP_EVENTS;
    if args.high_sensitivity {
        flags |= ScanFlags::HIGH_SENSITIVITY;
    }
    if args.show_peaks {
        flags |= ScanFlags::DISP_PEAKS;
    }
    if args.show_thresholds {
        flags |= ScanFlags::DISP_THRESHOLDS;
    }

    println!("=== doorsense - knock and doorbell detector ===");
    println!("Bell fundamental: {} Hz (Q = {})", args.bell_freq, args.bell_q);
    println!(
        "Sensitivity: {}",
        if args.high_sensitivity { "high" } else { "normal" }
    );
    println!();

    let (source, live): (Box<dyn SampleSource>, bool) = match &args.input {
        Some(path) => {
            println!("Loading audio file: {}", path.display());
            let is_wav = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
            if is_wav {
                (Box::new(WavFileSource::new(path, args.batch_size)?), false)
            } else {
                (Box::new(PcmFileSource::new(path, args.batch_size)?), false)
            }
        }
        None => {
            println!("Starting audio capture...");
            (Box::new(DeviceSource::new(args.batch_size)?), true)
        }
    };

    println!("Listening...");
    println!();

    let (knocks, bells) = run_detection_loop(source, &config, flags, live)?;

    if args.input.is_some() {
        println!();
        println!("Final results: {} knocks and {} rings detected", knocks, bells);
    }

    Ok(())
}

fn run_detection_loop(
    mut source: Box<dyn SampleSource>,
    config: &ScanConfig,
    flags: ScanFlags,
    live: bool,
) -> anyhow::Result<(u32, u32)> {
    let mut scanner = AudioScanner::new(config)?;
    let mut knocks = 0u32;
    let mut bells = 0u32;

    loop {
        let Some(batch) = source.next_batch()? else {
            break;
        };

        let detections = scanner.scan(&batch, None, flags);
        if detections.is_empty() {
            continue;
        }

        // Live capture reports wall-clock time; file playback reports the
        // position in the stream.
        let timestamp = if live {
            chrono::Local::now().format("%H:%M:%S%.3f").to_string()
        } else {
            format_timestamp(scanner.sample_index())
        };

        if detections.knock() {
            knocks += 1;
            println!("[{}] KNOCK", timestamp);
        }
        if detections.bell() {
            bells += 1;
            println!("[{}] RING", timestamp);
        }
    }

    Ok((knocks, bells))
}
