use hound::{WavSpec, WavWriter};

/// Write 16-bit PCM samples to a WAV file. Multichannel data is expected
/// interleaved; diagnostic tap dumps use one channel per enabled tap.
pub fn save_wav(
    filename: &str,
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(filename, spec)?;

    for &sample in samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    Ok(())
}
