use std::fmt::Write as _;

use crate::{Color, Result, WaveDiffError};

use super::{Point, Renderer};

/// Renderer that builds a standalone SVG document.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    size: Option<(u32, u32)>,
    body: String,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the finished document, or `None` before the first frame.
    pub fn document(&self) -> Option<String> {
        let (width, height) = self.size?;
        Some(format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
             viewBox=\"0 0 {width} {height}\">\n{}</svg>\n",
            self.body
        ))
    }

    fn body(&mut self) -> Result<&mut String> {
        match self.size {
            Some(_) => Ok(&mut self.body),
            None => Err(WaveDiffError::Render(
                "svg surface has no frame in progress".to_string(),
            )),
        }
    }
}

impl Renderer for SvgRenderer {
    fn begin_frame(&mut self, width: u32, height: u32) -> Result<()> {
        self.size = Some((width, height));
        self.body.clear();
        Ok(())
    }

    fn clear(&mut self, _width: u32, _height: u32) -> Result<()> {
        // Everything painted so far sits beneath the cleared area.
        self.body()?.clear();
        Ok(())
    }

    fn fill_rounded_rect(
        &mut self,
        width: u32,
        height: u32,
        radius: f32,
        color: Color,
    ) -> Result<()> {
        let body = self.body()?;
        writeln!(
            body,
            "  <rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" rx=\"{radius}\" ry=\"{radius}\" fill=\"{color}\"/>"
        )
        .map_err(|err| WaveDiffError::Render(err.to_string()))
    }

    fn stroke_segment(&mut self, from: Point, to: Point, color: Color) -> Result<()> {
        let body = self.body()?;
        writeln!(
            body,
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{color}\" stroke-width=\"1\"/>",
            from.x, from.y, to.x, to.y
        )
        .map_err(|err| WaveDiffError::Render(err.to_string()))
    }

    fn draw_label(&mut self, at: Point, text: &str, color: Color) -> Result<()> {
        let body = self.body()?;
        writeln!(
            body,
            "  <text x=\"{}\" y=\"{}\" fill=\"{color}\" font-family=\"sans-serif\" font-size=\"12\" text-anchor=\"middle\">{}</text>",
            at.x,
            at.y,
            escape(text)
        )
        .map_err(|err| WaveDiffError::Render(err.to_string()))
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Frame;

    #[test]
    fn drawing_before_a_frame_fails() {
        let mut svg = SvgRenderer::new();
        let err = svg
            .stroke_segment(Point::new(0.0, 0.0), Point::new(0.0, 1.0), Color::BLACK)
            .unwrap_err();
        assert!(matches!(err, WaveDiffError::Render(_)));
        assert!(svg.document().is_none());
    }

    #[test]
    fn writes_lines_and_rounded_background() {
        let mut svg = SvgRenderer::new();
        svg.begin_frame(22, 200).unwrap();
        svg.fill_rounded_rect(22, 200, 10.0, Color::rgb(0x44, 0x44, 0x44))
            .unwrap();
        svg.stroke_segment(
            Point::new(10.0, 100.0),
            Point::new(10.0, -80.0),
            Color::rgb(0xFF, 0, 0),
        )
        .unwrap();

        let document = svg.document().unwrap();
        assert!(document.starts_with("<svg"));
        assert!(document.contains("width=\"22\" height=\"200\""));
        assert!(document.contains("rx=\"10\" ry=\"10\" fill=\"#444444\""));
        assert!(document.contains("x1=\"10\" y1=\"100\" x2=\"10\" y2=\"-80\" stroke=\"#FF0000\""));
    }

    #[test]
    fn new_frame_discards_previous_content() {
        let mut svg = SvgRenderer::new();
        svg.begin_frame(10, 10).unwrap();
        svg.stroke_segment(Point::new(1.0, 1.0), Point::new(1.0, 2.0), Color::BLACK)
            .unwrap();

        Frame::error(300, 200).paint(&mut svg).unwrap();
        let document = svg.document().unwrap();
        assert!(!document.contains("<line"));
        assert!(document.contains("Error loading/processing audio"));
    }

    #[test]
    fn escapes_label_text() {
        assert_eq!(escape("a<b & \"c\">"), "a&lt;b &amp; &quot;c&quot;&gt;");
    }
}
