//! Display surfaces and their load/render state machine.
//!
//! Every change of inputs bumps the surface's [`Generation`]. A run only gets
//! to paint if the generation it started with is still the latest one when it
//! completes, so the most recent inputs always win.

use std::fmt;

use crate::{
    render::{Frame, Renderer},
    Result,
};

/// Width used for error frames on surfaces that never rendered.
pub const DEFAULT_SURFACE_WIDTH: u32 = 300;

/// Token identifying one set of inputs for a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceState {
    Idle,
    Loading,
    Rendered,
    /// Decoding or painting failed; carries the error message.
    Error(String),
}

/// What happened to the result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The frame was painted onto the surface.
    Applied,
    /// Newer inputs arrived while the run was in flight.
    Discarded,
}

/// One plot area together with the renderer it owns exclusively.
#[derive(Debug)]
pub struct DisplaySurface<R> {
    renderer: R,
    height: u32,
    width: Option<u32>,
    state: SurfaceState,
    generation: Generation,
}

impl<R: Renderer> DisplaySurface<R> {
    pub fn new(renderer: R, height: u32) -> Self {
        Self {
            renderer,
            height,
            width: None,
            state: SurfaceState::Idle,
            generation: Generation::default(),
        }
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// New inputs arrived: supersede any run in flight and start loading.
    pub fn begin(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.state = SurfaceState::Loading;
        tracing::info!(generation = %self.generation, "surface loading");
        self.generation
    }

    /// Inputs became empty or incomplete: supersede any run in flight and go
    /// back to a blank, idle surface. If the surface cannot be blanked it
    /// moves to `Error` instead.
    pub fn reset(&mut self) -> Result<()> {
        self.generation = self.generation.next();
        let width = self.width.unwrap_or(DEFAULT_SURFACE_WIDTH);
        let blanked = self
            .renderer
            .begin_frame(width, self.height)
            .and_then(|()| self.renderer.clear(width, self.height));

        match blanked {
            Ok(()) => {
                self.state = SurfaceState::Idle;
                tracing::info!(generation = %self.generation, "surface idle");
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Applies the outcome of the run started as `generation`.
    ///
    /// Stale outcomes are dropped without touching the surface. A failed run
    /// leaves an error message on a cleared surface and its error is handed
    /// back to the caller; so is a failure of the renderer while painting.
    pub fn complete(
        &mut self,
        generation: Generation,
        outcome: Result<Frame>,
    ) -> Result<Completion> {
        if generation != self.generation {
            tracing::warn!(
                stale = %generation,
                current = %self.generation,
                "discarding superseded render"
            );
            return Ok(Completion::Discarded);
        }

        match outcome {
            Ok(frame) => match frame.paint(&mut self.renderer) {
                Ok(()) => {
                    self.width = Some(frame.width);
                    self.state = SurfaceState::Rendered;
                    tracing::info!(
                        generation = %generation,
                        width = frame.width,
                        "surface rendered"
                    );
                    Ok(Completion::Applied)
                }
                Err(err) => {
                    self.fail(&err);
                    Err(err)
                }
            },
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    fn fail(&mut self, err: &crate::WaveDiffError) {
        tracing::warn!(generation = %self.generation, %err, "surface failed");
        self.state = SurfaceState::Error(err.to_string());

        let width = self.width.unwrap_or(DEFAULT_SURFACE_WIDTH);
        if let Err(paint_err) = Frame::error(width, self.height).paint(&mut self.renderer) {
            tracing::warn!(%paint_err, "could not draw error indicator");
        }
    }
}
