use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Result, WaveDiffError};

/// Top-level configuration consumed by the reduction and mapping stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Number of samples folded into a single drawn column.
    pub chunk_size: usize,
    /// Horizontal inset in pixels on both sides of the plot.
    pub margin: u32,
    /// Pixel height of every surface.
    pub canvas_height: u32,
    pub colors: ColorConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            margin: 10,
            canvas_height: 200,
            colors: ColorConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Parses a (possibly partial) JSON document, filling gaps with defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(WaveDiffError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.canvas_height == 0 {
            return Err(WaveDiffError::Config(
                "canvas_height must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Colours used by the waveform and difference views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Stroke colour for single waveforms once the slot palette runs out.
    pub single: Color,
    /// Dominant colour when the first recording is shorter.
    pub positive: Color,
    /// Dominant colour when the first recording is longer.
    pub negative: Color,
    pub equal_length_positive: Color,
    pub equal_length_negative: Color,
    /// Rounded background fill. The plot is cleared instead when absent.
    pub background: Option<Color>,
    /// Per-selection-slot stroke colours for single waveforms.
    pub slots: Vec<Color>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            single: Color::BLACK,
            positive: Color::rgb(0x00, 0xFF, 0x00),
            negative: Color::rgb(0xFF, 0x00, 0x00),
            equal_length_positive: Color::rgb(0x00, 0xFF, 0x00),
            equal_length_negative: Color::rgb(0xFF, 0x00, 0x00),
            background: None,
            slots: vec![Color::rgb(0x2B, 0x53, 0x60), Color::rgb(0x76, 0x4C, 0x7A)],
        }
    }
}

impl ColorConfig {
    /// Stroke colour for the single waveform shown in selection slot `slot`.
    pub fn slot_color(&self, slot: usize) -> Color {
        self.slots.get(slot).copied().unwrap_or(self.single)
    }
}

/// Opaque RGB colour written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = WaveDiffError;

    /// Accepts `#RGB` and `#RRGGBB` (case-insensitive).
    fn from_str(value: &str) -> Result<Self> {
        let invalid = || WaveDiffError::Config(format!("invalid colour `{value}`"));
        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 0x11);
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = WaveDiffError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}
