//! End-to-end run for one surface: decode, reduce or diff, map.

use crate::{
    config::RenderConfig,
    decode::DecoderService,
    difference::diff,
    peaks::reduce,
    render::{map, Frame, Layout, PeakSeries, Renderer},
    source::AudioSource,
    surface::{Completion, DisplaySurface},
    Color, Result,
};

/// Inputs of one pipeline run.
#[derive(Debug, Clone)]
pub enum RenderRequest {
    /// Peak envelope of a single recording.
    Waveform {
        source: AudioSource,
        /// Stroke colour, `ColorConfig::single` when `None`.
        color: Option<Color>,
    },
    /// Difference of `first - second`.
    Difference {
        first: AudioSource,
        second: AudioSource,
    },
}

impl RenderRequest {
    pub fn waveform(source: AudioSource) -> Self {
        Self::Waveform {
            source,
            color: None,
        }
    }

    pub fn difference(first: AudioSource, second: AudioSource) -> Self {
        Self::Difference { first, second }
    }
}

/// Owns the decoder and configuration shared by every surface.
#[derive(Debug, Clone)]
pub struct Pipeline {
    decoder: DecoderService,
    config: RenderConfig,
}

impl Pipeline {
    pub fn new(decoder: DecoderService, config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { decoder, config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn decoder(&self) -> &DecoderService {
        &self.decoder
    }

    /// Computes the complete frame for `request`.
    pub async fn run(&self, request: &RenderRequest) -> Result<Frame> {
        let layout = Layout::from(&self.config);
        let colors = &self.config.colors;

        match request {
            RenderRequest::Waveform { source, color } => {
                let samples = self.first_channel(source).await?;
                let peaks = reduce(&samples, self.config.chunk_size);
                Ok(map(
                    PeakSeries::Waveform {
                        peaks: &peaks,
                        color: *color,
                    },
                    colors,
                    layout,
                ))
            }
            RenderRequest::Difference { first, second } => {
                let first_samples = self.first_channel(first).await?;
                let second_samples = self.first_channel(second).await?;
                let peaks = diff(&first_samples, &second_samples, self.config.chunk_size);
                tracing::debug!(
                    first = first_samples.len(),
                    second = second_samples.len(),
                    policy = ?peaks.policy,
                    "compared recordings"
                );
                Ok(map(PeakSeries::Difference(&peaks), colors, layout))
            }
        }
    }

    /// Runs `request` for `surface`, discarding the result if the surface has
    /// moved on to newer inputs in the meantime.
    pub async fn drive<R: Renderer>(
        &self,
        surface: &mut DisplaySurface<R>,
        request: &RenderRequest,
    ) -> Result<Completion> {
        let generation = surface.begin();
        let outcome = self.run(request).await;
        surface.complete(generation, outcome)
    }

    async fn first_channel(&self, source: &AudioSource) -> Result<Vec<f32>> {
        let audio = self
            .decoder
            .decode(source.bytes.clone())
            .await
            .map_err(|err| {
                tracing::warn!(name = %source.name, %err, "decode failed");
                err
            })?;
        Ok(audio.into_first_channel())
    }
}
