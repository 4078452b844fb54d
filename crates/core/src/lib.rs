//! Core library for Wavediff.
//!
//! Turns one or two decoded recordings into a compact visual summary: a peak
//! envelope per recording and, for a pair, a per-chunk difference view whose
//! colouring also tells which recording is longer. Reduction and mapping are
//! pure functions; decoding and painting sit behind the [`Decoder`] and
//! [`Renderer`] traits so the numeric core can be exercised without audio
//! files or a drawing surface.

pub mod config;
pub mod decode;
pub mod difference;
pub mod error;
pub mod peaks;
pub mod pipeline;
pub mod render;
pub mod selection;
pub mod source;
pub mod surface;

pub use config::{Color, ColorConfig, RenderConfig};
pub use decode::{DecodedAudio, Decoder, DecoderService, WavDecoder};
pub use difference::{diff, ColorPolicy, DifferencePeaks, Polarity};
pub use error::{Result, WaveDiffError};
pub use peaks::reduce;
pub use pipeline::{Pipeline, RenderRequest};
pub use render::{
    map, map_difference, map_waveform, DrawPrimitive, Frame, Geometry, Layout, PeakSeries, Point,
    RecordingRenderer, Renderer, SvgRenderer,
};
pub use selection::Selection;
pub use source::{parse_listing, AudioSource, FileLibrary, Fetcher, RemoteEntry, SourceId};
pub use surface::{Completion, DisplaySurface, Generation, SurfaceState};
