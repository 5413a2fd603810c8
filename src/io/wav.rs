//! WAV decoding through `hound`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::{
    error::LoadError,
    io::{DecodedAudio, SampleDecoder},
};

/// Decodes 8/16/24/32-bit integer and 32-bit float WAV files.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl WavDecoder {
    pub fn decode_reader<R: Read>(reader: R) -> Result<DecodedAudio, LoadError> {
        let reader = WavReader::new(reader)?;
        let spec = reader.spec();
        let num_channels = usize::from(spec.channels.max(1));

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
            SampleFormat::Int => {
                // Full scale for N bits is 2^(N-1)
                let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let frames = interleaved.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];
        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in channels.iter_mut().zip(frame) {
                ch.push(sample);
            }
        }

        Ok(DecodedAudio {
            channels,
            sample_rate: spec.sample_rate,
        })
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav") || e.eq_ignore_ascii_case("wave"))
}

impl SampleDecoder for WavDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, LoadError> {
        if !is_wav(path) {
            return Err(LoadError::Unsupported(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Self::decode_reader(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use std::io::Cursor;

    fn encode(spec: WavSpec, write: impl FnOnce(&mut WavWriter<&mut Cursor<Vec<u8>>>)) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_16_bit_stereo() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let bytes = encode(spec, |w| {
            for s in [16_384i16, -16_384, 0, 8_192] {
                w.write_sample(s).unwrap();
            }
        });

        let decoded = WavDecoder::decode_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(decoded.sample_rate, 48_000);
        assert_eq!(decoded.channels.len(), 2);
        assert_eq!(decoded.channels[0], vec![0.5, 0.0]);
        assert_eq!(decoded.channels[1], vec![-0.5, 0.25]);
    }

    #[test]
    fn decodes_float_mono() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let bytes = encode(spec, |w| {
            for s in [0.25f32, -0.75] {
                w.write_sample(s).unwrap();
            }
        });

        let decoded = WavDecoder::decode_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(decoded.channels, vec![vec![0.25, -0.75]]);
    }

    #[test]
    fn rejects_other_extensions() {
        let err = WavDecoder.decode(Path::new("kick.mp3")).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = WavDecoder
            .decode(Path::new("/definitely/not/here.wav"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = WavDecoder::decode_reader(Cursor::new(b"not a wav".to_vec())).unwrap_err();
        assert!(matches!(err, LoadError::Wav(_)));
    }
}
