//! WAV file export functionality

use std::path::Path;

use log::info;

use crate::pcm::PcmDecoder;
use crate::y8950::Y8950;
use crate::{Result, Y8950Error};

/// Render chip output to a WAV file
///
/// Runs the chip for `sample_count` ticks from its current state and writes
/// the result as 16-bit mono at the chip's output rate.
///
/// # Arguments
///
/// * `chip` - Programmed chip instance
/// * `sample_count` - Number of samples to render
/// * `output_path` - Path where the WAV file will be written
///
/// # Examples
///
/// ```no_run
/// use y8950::{export_to_wav, Y8950};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut chip: Y8950 = Y8950::new(3_579_545, 44_100)?;
/// chip.write_register(0x23, 0x21);
/// chip.write_register(0x63, 0xF0);
/// chip.write_register(0xA0, 0x41);
/// chip.write_register(0xB0, 0x32);
///
/// export_to_wav(&mut chip, 44_100, "tone.wav")?;
/// # Ok(())
/// # }
/// ```
pub fn export_to_wav<P: PcmDecoder, Q: AsRef<Path>>(
    chip: &mut Y8950<P>,
    sample_count: usize,
    output_path: Q,
) -> Result<()> {
    let sample_rate = chip.config().sample_rate;
    info!(
        "rendering {} samples ({:.1}s)",
        sample_count,
        sample_count as f32 / sample_rate as f32
    );
    let samples = chip.generate_samples(sample_count);

    write_wav_file(output_path, &samples, sample_rate)
}

/// Write 16-bit mono samples to a WAV file
///
/// # Errors
///
/// Returns [`Y8950Error::AudioFileError`] if the file cannot be created or
/// written.
pub fn write_wav_file<Q: AsRef<Path>>(path: Q, samples: &[i16], sample_rate: u32) -> Result<()> {
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| {
        Y8950Error::AudioFileError(format!("failed to create {}: {}", path.display(), e))
    })?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| Y8950Error::AudioFileError(format!("failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| Y8950Error::AudioFileError(format!("failed to finalize WAV file: {}", e)))?;

    info!("wrote {} samples to {}", samples.len(), path.display());
    Ok(())
}
