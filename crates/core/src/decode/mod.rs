//! Decoding of raw audio bytes into per-channel sample sequences.
//!
//! The pipeline never constructs decoders on the fly. It is handed a
//! [`DecoderService`] that owns the decoder and leases it out for each decode,
//! running the work on Tokio's blocking pool so callers simply `.await` it.

use std::{
    fmt,
    io::Cursor,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use hound::{SampleFormat, WavReader};

use crate::{Result, WaveDiffError};

/// Decoded audio, one sample vector per channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    /// Samples of channel `index`, empty when the channel does not exist.
    pub fn channel(&self, index: usize) -> &[f32] {
        self.channels.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Consumes the audio and keeps only the first channel.
    pub fn into_first_channel(self) -> Vec<f32> {
        self.channels.into_iter().next().unwrap_or_default()
    }

    pub fn frames(&self) -> usize {
        self.channel(0).len()
    }
}

/// Anything able to turn encoded bytes into samples.
pub trait Decoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio>;
}

/// RIFF/WAVE decoder for integer PCM and 32-bit float data.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl Decoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio> {
        let reader = WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels);
        if channels == 0 {
            return Err(WaveDiffError::decode("wav header declares zero channels"));
        }

        let interleaved = read_samples(reader, spec.bits_per_sample, spec.sample_format)?;
        tracing::debug!(
            sample_rate = spec.sample_rate,
            channels,
            samples = interleaved.len(),
            "decoded wav"
        );

        Ok(DecodedAudio {
            sample_rate: spec.sample_rate,
            channels: deinterleave(&interleaved, channels),
        })
    }
}

fn read_samples(
    mut reader: WavReader<Cursor<&[u8]>>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    match sample_format {
        SampleFormat::Float => {
            if bits_per_sample != 32 {
                return Err(WaveDiffError::decode(format!(
                    "unsupported float bit depth {bits_per_sample}"
                )));
            }
            Ok(reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<f32>, _>>()?)
        }
        SampleFormat::Int => {
            if !(1..=32).contains(&bits_per_sample) {
                return Err(WaveDiffError::decode(format!(
                    "unsupported integer bit depth {bits_per_sample}"
                )));
            }
            let full_scale = (1_u64 << (bits_per_sample - 1)) as f32;
            Ok(reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / full_scale))
                .collect::<std::result::Result<Vec<f32>, _>>()?)
        }
    }
}

fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels;
    let mut result = vec![Vec::with_capacity(frames); channels];

    for (index, sample) in samples.iter().enumerate() {
        result[index % channels].push(*sample);
    }

    result
}

/// Owned decoder shared by every pipeline run of an application.
#[derive(Clone)]
pub struct DecoderService {
    decoder: Arc<dyn Decoder>,
    in_flight: Arc<AtomicUsize>,
}

impl DecoderService {
    pub fn new<D: Decoder + 'static>(decoder: D) -> Self {
        Self {
            decoder: Arc::new(decoder),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Service backed by [`WavDecoder`].
    pub fn wav() -> Self {
        Self::new(WavDecoder)
    }

    /// Number of decodes currently holding a lease.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Decodes `bytes` off the async executor.
    ///
    /// The lease travels with the blocking task, so it is released when the
    /// decode itself finishes even if the awaiting future was dropped.
    pub async fn decode(&self, bytes: Arc<[u8]>) -> Result<DecodedAudio> {
        let lease = self.acquire();
        let decoder = Arc::clone(&self.decoder);

        let task = tokio::task::spawn_blocking(move || {
            let _lease = lease;
            decoder.decode(&bytes)
        });

        match task.await {
            Ok(result) => result,
            Err(err) => Err(WaveDiffError::Task(err.to_string())),
        }
    }

    fn acquire(&self) -> DecodeLease {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        DecodeLease {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl Default for DecoderService {
    fn default() -> Self {
        Self::wav()
    }
}

impl fmt::Debug for DecoderService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderService")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Scoped hold on the decoder; dropping it releases the hold.
struct DecodeLease {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for DecodeLease {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    /// Encodes 16-bit PCM samples (interleaved) as an in-memory WAV file.
    pub(crate) fn wav_bytes(samples: &[f32], channels: u16) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for sample in samples {
                writer
                    .write_sample((sample * i16::MAX as f32) as i16)
                    .unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_mono_pcm() {
        let bytes = wav_bytes(&[0.0, 0.5, -0.5, 1.0], 1);
        let audio = WavDecoder.decode(&bytes).unwrap();

        assert_eq!(audio.sample_rate, 8_000);
        assert_eq!(audio.channels.len(), 1);
        let samples = audio.channel(0);
        assert_eq!(samples.len(), 4);
        approx::assert_relative_eq!(samples[1], 0.5, epsilon = 1e-3);
        approx::assert_relative_eq!(samples[2], -0.5, epsilon = 1e-3);
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn splits_stereo_channels() {
        let bytes = wav_bytes(&[0.25, -0.25, 0.5, -0.5, 0.75, -0.75], 2);
        let audio = WavDecoder.decode(&bytes).unwrap();

        assert_eq!(audio.channels.len(), 2);
        assert_eq!(audio.frames(), 3);
        assert!(audio.channel(0).iter().all(|s| *s > 0.0));
        assert!(audio.channel(1).iter().all(|s| *s < 0.0));
        assert!(audio.channel(2).is_empty());
    }

    #[test]
    fn decodes_float_samples() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            writer.write_sample(0.125_f32).unwrap();
            writer.write_sample(-0.875_f32).unwrap();
            writer.finalize().unwrap();
        }

        let audio = WavDecoder.decode(cursor.get_ref()).unwrap();
        assert_eq!(audio.into_first_channel(), vec![0.125, -0.875]);
    }

    fn int_wav_bytes(bits_per_sample: u16, samples: &[i32]) -> Vec<u8> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for sample in samples {
                writer.write_sample(*sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_8bit_pcm() {
        let bytes = int_wav_bytes(8, &[-128, 127, 0]);
        let samples = WavDecoder.decode(&bytes).unwrap().into_first_channel();

        assert_eq!(samples, vec![-1.0, 127.0 / 128.0, 0.0]);
        assert!(samples[1] < 1.0);
    }

    #[test]
    fn decodes_24bit_pcm() {
        let bytes = int_wav_bytes(24, &[-8_388_608, 8_388_607, 0]);
        let samples = WavDecoder.decode(&bytes).unwrap().into_first_channel();

        assert_eq!(samples[0], -1.0);
        assert!(samples[1] < 1.0);
        approx::assert_relative_eq!(samples[1], 1.0, epsilon = 1e-6);
        assert_eq!(samples[2], 0.0);
    }

    #[test]
    fn decodes_32bit_int_pcm() {
        let bytes = int_wav_bytes(32, &[i32::MIN, i32::MAX, 1 << 30]);
        let samples = WavDecoder.decode(&bytes).unwrap().into_first_channel();

        assert_eq!(samples[0], -1.0);
        // 2^31 - 1 rounds to 2^31 in f32, so the top code lands on full scale.
        assert!(samples[1] <= 1.0);
        approx::assert_relative_eq!(samples[1], 1.0, epsilon = 1e-6);
        assert_eq!(samples[2], 0.5);
    }

    #[test]
    fn rejects_64bit_float() {
        let data = 0.5_f64.to_le_bytes();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16_u32.to_le_bytes());
        bytes.extend_from_slice(&3_u16.to_le_bytes()); // IEEE float
        bytes.extend_from_slice(&1_u16.to_le_bytes());
        bytes.extend_from_slice(&8_000_u32.to_le_bytes());
        bytes.extend_from_slice(&(8_000_u32 * 8).to_le_bytes());
        bytes.extend_from_slice(&8_u16.to_le_bytes());
        bytes.extend_from_slice(&64_u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&data);

        let err = WavDecoder.decode(&bytes).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn rejects_garbage() {
        let err = WavDecoder.decode(b"definitely not a wav file").unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn service_releases_lease_after_decode() {
        let service = DecoderService::wav();
        let bytes: Arc<[u8]> = wav_bytes(&[0.1, 0.2], 1).into();

        let audio = service.decode(bytes).await.unwrap();
        assert_eq!(audio.frames(), 2);
        assert_eq!(service.in_flight(), 0);

        let err = service
            .decode(Arc::from(&b"RIFF"[..]))
            .await
            .unwrap_err();
        assert!(err.is_decode());
        assert_eq!(service.in_flight(), 0);
    }
}
