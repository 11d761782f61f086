use anyhow::{Context, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;
use tracing::info;

use super::file::AudioFile;

/// Target format for normalized audio
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Target sample rate (speech services expect 16kHz)
    pub sample_rate: u32,
    /// Target channel count (1 = mono)
    pub channels: u16,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
        }
    }
}

/// Re-encode an audio file as 16-bit PCM WAV at the target rate and channel
/// count. Decode failure aborts without creating the output file.
///
/// A file already at the target format round-trips sample-identically: the
/// downmix and resampler stages are skipped when nothing needs to change.
pub fn normalize(input: &Path, output: &Path, config: &NormalizeConfig) -> Result<()> {
    let audio = AudioFile::open(input)?;

    let samples = if audio.channels > 1 && config.channels == 1 {
        downmix_to_mono(&audio.samples, audio.channels)
    } else {
        audio.samples
    };

    let samples = if audio.sample_rate != config.sample_rate {
        resample(&samples, audio.sample_rate, config.sample_rate)?
    } else {
        samples
    };

    write_wav(output, &samples, config.sample_rate, config.channels)?;

    info!(
        "Normalized {} -> {} ({}Hz, {} channel)",
        input.display(),
        output.display(),
        config.sample_rate,
        config.channels
    );

    Ok(())
}

/// Average interleaved channels into a single channel
fn downmix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    let channels = channels as usize;
    let mut mono = Vec::with_capacity(samples.len() / channels);

    for frame in samples.chunks_exact(channels) {
        let sum: i32 = frame.iter().map(|&s| s as i32).sum();
        let avg = sum / channels as i32;
        mono.push(avg.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
    }

    mono
}

fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Result<Vec<i16>> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let chunk_size = 1024;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .context("Failed to initialize resampler")?;

    let input: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();
    let mut output: Vec<f32> = Vec::with_capacity((input.len() as f64 * ratio) as usize + chunk_size);

    for chunk in input.chunks(chunk_size) {
        let block = if chunk.len() < chunk_size {
            let mut padded = chunk.to_vec();
            padded.resize(chunk_size, 0.0);
            padded
        } else {
            chunk.to_vec()
        };

        let frames = resampler.process(&[block], None).context("Resampling failed")?;

        if let Some(channel) = frames.first() {
            output.extend_from_slice(channel);
        }
    }

    // The final padded block overshoots; trim to the expected length
    let expected_len = (samples.len() as f64 * ratio) as usize;
    output.truncate(expected_len);

    Ok(output
        .iter()
        .map(|&s| (s * 32767.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect())
}

fn write_wav(path: &Path, samples: &[i16], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .context("Failed to write sample to WAV")?;
    }

    writer.finalize().context("Failed to finalize WAV file")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo_averages_pairs() {
        let samples = vec![100, 200, 300, 500, -400, -600];
        let mono = downmix_to_mono(&samples, 2);

        assert_eq!(mono, vec![150, 400, -500]);
    }

    #[test]
    fn test_downmix_quad_averages_frames() {
        let samples = vec![100, 200, 300, 400];
        let mono = downmix_to_mono(&samples, 4);

        assert_eq!(mono, vec![250]);
    }

    #[test]
    fn test_downmix_drops_trailing_partial_frame() {
        let samples = vec![100, 200, 300];
        let mono = downmix_to_mono(&samples, 2);

        assert_eq!(mono.len(), 1);
        assert_eq!(mono[0], 150);
    }

    #[test]
    fn test_downmix_extremes_stay_in_range() {
        let samples = vec![i16::MAX, i16::MAX, i16::MIN, i16::MIN];
        let mono = downmix_to_mono(&samples, 2);

        assert_eq!(mono, vec![i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_resample_halves_length() {
        let samples: Vec<i16> = (0..32000).map(|i| ((i % 100) * 300 - 15000) as i16).collect();
        let resampled = resample(&samples, 32000, 16000).unwrap();

        assert_eq!(resampled.len(), 16000);
    }

    #[test]
    fn test_resample_44100_to_16000_length() {
        let samples: Vec<i16> = vec![0; 44100];
        let resampled = resample(&samples, 44100, 16000).unwrap();

        assert_eq!(resampled.len(), 16000);
    }
}
