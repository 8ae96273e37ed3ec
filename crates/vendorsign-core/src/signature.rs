//! Freehand signature capture.
//!
//! [`SignaturePad`] is a small state machine (`Idle` / `Drawing { last }`)
//! driven by pointer events. It knows nothing about pixels: drawing goes
//! through a [`StrokeSink`] and serialization through [`RasterExport`].
//! [`RasterCanvas`] is the bundled backend that rasterizes strokes into an
//! RGBA bitmap and exports a PNG data URL.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 150;
pub const DEFAULT_STROKE: [u8; 3] = [0x1a, 0x36, 0x5d];
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;

const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("expected a base64 data URL")]
    NotADataUrl,

    #[error("unsupported image type '{0}'")]
    UnsupportedImageType(String),

    #[error("signature payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("signature payload is empty")]
    EmptyImage,

    #[error("failed to encode signature image: {0}")]
    Encode(#[from] png::EncodingError),
}

/// A raster signature image stored inline as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureData(String);

impl SignatureData {
    /// Accepts `data:image/<png|jpeg|webp>;base64,<payload>` with a non-empty,
    /// decodable payload.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] describing the first problem found.
    pub fn parse(value: &str) -> Result<Self, SignatureError> {
        let rest = value
            .strip_prefix("data:")
            .ok_or(SignatureError::NotADataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(SignatureError::NotADataUrl)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(SignatureError::NotADataUrl)?;
        if !ACCEPTED_MIME_TYPES.contains(&mime) {
            return Err(SignatureError::UnsupportedImageType(mime.to_string()));
        }
        if STANDARD.decode(payload)?.is_empty() {
            return Err(SignatureError::EmptyImage);
        }
        Ok(Self(value.to_string()))
    }

    fn from_png(bytes: &[u8]) -> Self {
        Self(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// The image bytes behind the data URL.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::InvalidBase64`] if the payload does not decode.
    pub fn decode(&self) -> Result<Vec<u8>, SignatureError> {
        let payload = self
            .0
            .split_once(',')
            .map(|(_, p)| p)
            .ok_or(SignatureError::NotADataUrl)?;
        Ok(STANDARD.decode(payload)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Rendering capability the pad draws through.
pub trait StrokeSink {
    fn line_segment(&mut self, from: Point, to: Point);
    fn clear(&mut self);
}

/// Serializes the current surface.
pub trait RasterExport {
    /// # Errors
    ///
    /// Returns [`SignatureError`] if the surface cannot be encoded.
    fn export(&self) -> Result<SignatureData, SignatureError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadState {
    Idle,
    Drawing { last: Point },
}

/// Pointer-driven signature surface.
///
/// `on_change` receives `Some(data)` after every completed gesture that drew
/// at least one segment, and `None` after [`SignaturePad::clear`].
pub struct SignaturePad<S, F> {
    sink: S,
    state: PadState,
    has_signature: bool,
    on_change: F,
}

impl<S, F> SignaturePad<S, F>
where
    S: StrokeSink + RasterExport,
    F: FnMut(Option<SignatureData>),
{
    pub fn new(sink: S, on_change: F) -> Self {
        Self {
            sink,
            state: PadState::Idle,
            has_signature: false,
            on_change,
        }
    }

    /// Pointer down.
    pub fn begin(&mut self, at: Point) {
        self.state = PadState::Drawing { last: at };
    }

    /// Pointer move. Draws a segment from the previous sample; ignored while idle.
    pub fn move_to(&mut self, to: Point) {
        if let PadState::Drawing { last } = self.state {
            self.sink.line_segment(last, to);
            self.state = PadState::Drawing { last: to };
            self.has_signature = true;
        }
    }

    /// Pointer up / leave / cancel.
    ///
    /// A gesture that never moved leaves `has_signature` untouched, so a bare
    /// tap on an empty pad does not produce a signature.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] if exporting the surface fails.
    pub fn end(&mut self) -> Result<(), SignatureError> {
        if self.state == PadState::Idle {
            return Ok(());
        }
        self.state = PadState::Idle;
        if self.has_signature {
            let data = self.sink.export()?;
            (self.on_change)(Some(data));
        }
        Ok(())
    }

    /// Resets the surface and reports an empty signature.
    pub fn clear(&mut self) {
        self.sink.clear();
        self.state = PadState::Idle;
        self.has_signature = false;
        (self.on_change)(None);
    }

    #[must_use]
    pub fn has_signature(&self) -> bool {
        self.has_signature
    }

    #[must_use]
    pub fn state(&self) -> PadState {
        self.state
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// White RGBA bitmap with round-capped strokes.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    width: u32,
    height: u32,
    stroke: [u8; 3],
    line_width: f32,
    pixels: Vec<u8>,
}

impl Default for RasterCanvas {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl RasterCanvas {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 4;
        Self {
            width,
            height,
            stroke: DEFAULT_STROKE,
            line_width: DEFAULT_LINE_WIDTH,
            pixels: vec![0xff; len],
        }
    }

    #[must_use]
    pub fn with_stroke(mut self, stroke: [u8; 3], line_width: f32) -> Self {
        self.stroke = stroke;
        self.line_width = line_width.max(1.0);
        self
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&b| b == 0xff)
    }

    /// RGB at `(x, y)`, or `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn stamp(&mut self, center: Point) {
        let radius = self.line_width / 2.0;
        let min_x = (center.x - radius).floor().max(0.0) as u32;
        let min_y = (center.y - radius).floor().max(0.0) as u32;
        let max_x = ((center.x + radius).ceil().max(0.0) as u32).min(self.width.saturating_sub(1));
        let max_y = ((center.y + radius).ceil().max(0.0) as u32).min(self.height.saturating_sub(1));
        if self.width == 0 || self.height == 0 || min_x > max_x || min_y > max_y {
            return;
        }
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius * radius + 0.25 {
                    let i = (y as usize * self.width as usize + x as usize) * 4;
                    self.pixels[i..i + 3].copy_from_slice(&self.stroke);
                    self.pixels[i + 3] = 0xff;
                }
            }
        }
    }
}

impl StrokeSink for RasterCanvas {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn line_segment(&mut self, from: Point, to: Point) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let length = (dx * dx + dy * dy).sqrt();
        // Samples past the canvas diagonal never land on a new pixel.
        let max_steps = ((self.width as f32).hypot(self.height as f32) * 2.0).ceil() as u32;
        let steps = ((length * 2.0).ceil() as u32).clamp(1, max_steps.max(1));
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            self.stamp(Point::new(from.x + dx * t, from.y + dy * t));
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(0xff);
    }
}

impl RasterExport for RasterCanvas {
    fn export(&self) -> Result<SignatureData, SignatureError> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(SignatureData::from_png(&bytes))
    }
}

/// Draws the fixed "AO" test signature used for smoke-testing submissions.
///
/// # Errors
///
/// Returns [`SignatureError`] if the canvas cannot be exported.
#[allow(clippy::cast_precision_loss)]
pub fn sample_signature() -> Result<SignatureData, SignatureError> {
    let mut captured = None;
    {
        let mut pad = SignaturePad::new(RasterCanvas::default(), |sig| captured = sig);

        pad.begin(Point::new(30.0, 50.0));
        for (x, y) in [(30.0, 120.0), (70.0, 50.0), (70.0, 120.0)] {
            pad.move_to(Point::new(x, y));
        }
        pad.end()?;

        const SEGMENTS: u16 = 48;
        let (cx, cy, r) = (115.0_f32, 85.0_f32, 35.0_f32);
        pad.begin(Point::new(cx + r, cy));
        for i in 1..=SEGMENTS {
            let theta = f32::from(i) / f32::from(SEGMENTS) * std::f32::consts::TAU;
            pad.move_to(Point::new(cx + r * theta.cos(), cy + r * theta.sin()));
        }
        pad.end()?;
    }
    captured.ok_or(SignatureError::EmptyImage)
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    /// Sink that records segments instead of drawing them.
    #[derive(Default)]
    struct RecordingSink {
        segments: Vec<(Point, Point)>,
        clears: usize,
    }

    impl StrokeSink for RecordingSink {
        fn line_segment(&mut self, from: Point, to: Point) {
            self.segments.push((from, to));
        }

        fn clear(&mut self) {
            self.segments.clear();
            self.clears += 1;
        }
    }

    impl RasterExport for RecordingSink {
        fn export(&self) -> Result<SignatureData, SignatureError> {
            Ok(SignatureData(format!(
                "data:image/png;base64,segments-{}",
                self.segments.len()
            )))
        }
    }

    #[test]
    fn moves_connect_consecutive_samples() {
        let mut pad = SignaturePad::new(RecordingSink::default(), |_| {});
        pad.begin(Point::new(0.0, 0.0));
        pad.move_to(Point::new(10.0, 0.0));
        pad.move_to(Point::new(10.0, 10.0));

        assert_eq!(
            pad.sink().segments,
            vec![
                (Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
                (Point::new(10.0, 0.0), Point::new(10.0, 10.0)),
            ]
        );
        assert_eq!(
            pad.state(),
            PadState::Drawing {
                last: Point::new(10.0, 10.0)
            }
        );
    }

    #[test]
    fn moves_while_idle_are_ignored() {
        let mut pad = SignaturePad::new(RecordingSink::default(), |_| {});
        pad.move_to(Point::new(5.0, 5.0));
        assert!(pad.sink().segments.is_empty());
        assert!(!pad.has_signature());
    }

    #[test]
    fn completed_stroke_reports_exported_signature() {
        let (tx, rx) = mpsc::channel();
        let mut pad = SignaturePad::new(RecordingSink::default(), move |sig| {
            tx.send(sig).expect("receiver alive");
        });
        pad.begin(Point::new(1.0, 1.0));
        pad.move_to(Point::new(2.0, 2.0));
        pad.end().expect("export");

        assert!(pad.has_signature());
        assert_eq!(pad.state(), PadState::Idle);
        let reported = rx.try_recv().expect("callback fired");
        assert_eq!(
            reported.map(SignatureData::into_string).as_deref(),
            Some("data:image/png;base64,segments-1")
        );
    }

    #[test]
    fn tap_without_movement_is_not_a_signature() {
        let (tx, rx) = mpsc::channel();
        let mut pad = SignaturePad::new(RecordingSink::default(), move |sig| {
            tx.send(sig).expect("receiver alive");
        });
        pad.begin(Point::new(3.0, 3.0));
        pad.end().expect("end");

        assert!(!pad.has_signature());
        assert!(rx.try_recv().is_err(), "no callback for a bare tap");
    }

    #[test]
    fn end_while_idle_does_nothing() {
        let (tx, rx) = mpsc::channel();
        let mut pad = SignaturePad::new(RecordingSink::default(), move |sig| {
            tx.send(sig).expect("receiver alive");
        });
        pad.end().expect("end");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn clear_resets_and_reports_none() {
        let (tx, rx) = mpsc::channel();
        let mut pad = SignaturePad::new(RecordingSink::default(), move |sig| {
            tx.send(sig).expect("receiver alive");
        });
        pad.begin(Point::new(0.0, 0.0));
        pad.move_to(Point::new(4.0, 4.0));
        pad.end().expect("export");
        let _ = rx.try_recv().expect("signature reported");

        pad.clear();

        assert!(!pad.has_signature());
        assert_eq!(pad.state(), PadState::Idle);
        assert_eq!(pad.sink().clears, 1);
        assert!(pad.sink().segments.is_empty());
        assert_eq!(rx.try_recv().expect("clear reported"), None);
    }

    #[test]
    fn raster_canvas_draws_stroke_pixels() {
        let mut canvas = RasterCanvas::new(20, 10);
        assert!(canvas.is_blank());
        canvas.line_segment(Point::new(2.0, 5.0), Point::new(17.0, 5.0));

        assert!(!canvas.is_blank());
        assert_eq!(canvas.pixel(10, 5), Some(DEFAULT_STROKE));
        assert_eq!(canvas.pixel(10, 0), Some([0xff, 0xff, 0xff]));
        assert_eq!(canvas.pixel(20, 5), None);

        StrokeSink::clear(&mut canvas);
        assert!(canvas.is_blank());
    }

    #[test]
    fn raster_canvas_clips_strokes_outside_bounds() {
        let mut canvas = RasterCanvas::new(8, 8);
        canvas.line_segment(Point::new(-20.0, -20.0), Point::new(-10.0, -10.0));
        assert!(canvas.is_blank());
        canvas.line_segment(Point::new(-4.0, 4.0), Point::new(40.0, 4.0));
        assert_eq!(canvas.pixel(0, 4), Some(DEFAULT_STROKE));
        assert_eq!(canvas.pixel(7, 4), Some(DEFAULT_STROKE));
    }

    #[test]
    fn raster_canvas_bounds_work_for_huge_segments() {
        let mut canvas = RasterCanvas::new(8, 8);
        canvas.line_segment(Point::new(0.0, 4.0), Point::new(f32::MAX, 4.0));
        assert_eq!(canvas.pixel(0, 4), Some(DEFAULT_STROKE));

        canvas.line_segment(Point::new(0.0, 0.0), Point::new(f32::INFINITY, f32::INFINITY));
        canvas.line_segment(Point::new(f32::NAN, 1.0), Point::new(2.0, 2.0));
    }

    #[test]
    fn raster_export_is_a_decodable_png() {
        let mut canvas = RasterCanvas::new(32, 16);
        canvas.line_segment(Point::new(1.0, 1.0), Point::new(30.0, 14.0));
        let data = canvas.export().expect("export");

        assert!(data.as_str().starts_with("data:image/png;base64,"));
        let bytes = data.decode().expect("base64");
        let decoder = png::Decoder::new(bytes.as_slice());
        let reader = decoder.read_info().expect("png header");
        assert_eq!(reader.info().width, 32);
        assert_eq!(reader.info().height, 16);

        let reparsed = SignatureData::parse(data.as_str()).expect("parse own export");
        assert_eq!(reparsed, data);
    }

    #[test]
    fn sample_signature_is_valid_png_data_url() {
        let sig = sample_signature().expect("sample");
        assert!(SignatureData::parse(sig.as_str()).is_ok());
    }

    #[test]
    fn parse_rejects_non_image_and_bad_payloads() {
        assert!(matches!(
            SignatureData::parse("hello"),
            Err(SignatureError::NotADataUrl)
        ));
        assert!(matches!(
            SignatureData::parse("data:text/plain;base64,aGk="),
            Err(SignatureError::UnsupportedImageType(ref m)) if m == "text/plain"
        ));
        assert!(matches!(
            SignatureData::parse("data:image/png;base64,***"),
            Err(SignatureError::InvalidBase64(_))
        ));
        assert!(matches!(
            SignatureData::parse("data:image/png;base64,"),
            Err(SignatureError::EmptyImage)
        ));
    }
}
