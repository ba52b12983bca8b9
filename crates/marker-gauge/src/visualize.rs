//! Overlay rendering for measured frames.

use crate::SelectedMethod;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use marker_gauge_core::{MarkerObservation, PixelPoint, SupportSegment};

#[derive(thiserror::Error, Debug)]
pub enum VisualizationError {
    #[error(transparent)]
    Encode(#[from] image::ImageError),
    #[error("frame is empty")]
    EmptyFrame,
}

/// What to draw on top of a frame. Coordinates are in the frame's pixels.
#[derive(Clone, Debug)]
pub struct Overlay<'a> {
    pub markers: &'a [MarkerObservation; 2],
    pub support: &'a [SupportSegment],
    pub distance_m: f64,
    pub method: SelectedMethod,
    pub confidence: f64,
}

/// Renders an [`Overlay`] and returns encoded image bytes.
pub trait Visualizer: Send + Sync {
    fn render(
        &self,
        frame: &RgbImage,
        overlay: &Overlay<'_>,
        jpeg_quality: u8,
    ) -> Result<Vec<u8>, VisualizationError>;
}

/// Marker outlines, support segments and a confidence bar, JPEG-encoded.
#[derive(Clone, Debug)]
pub struct OverlayRenderer {
    pub outline: Rgb<u8>,
    pub stroke: i32,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self {
            outline: Rgb([0, 255, 0]),
            stroke: 3,
        }
    }
}

fn method_color(method: SelectedMethod) -> Rgb<u8> {
    match method {
        SelectedMethod::TemporalFilter => Rgb([0, 200, 255]),
        SelectedMethod::MultiPoint => Rgb([255, 0, 255]),
        SelectedMethod::Perspective => Rgb([255, 200, 0]),
        SelectedMethod::Edge => Rgb([255, 0, 0]),
    }
}

fn as_f32(p: &PixelPoint) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

impl OverlayRenderer {
    fn thick_line(&self, canvas: &mut RgbImage, a: &PixelPoint, b: &PixelPoint, color: Rgb<u8>) {
        let (ax, ay) = as_f32(a);
        let (bx, by) = as_f32(b);
        let half = self.stroke / 2;
        for o in -half..=half {
            let o = o as f32;
            draw_line_segment_mut(canvas, (ax + o, ay), (bx + o, by), color);
            draw_line_segment_mut(canvas, (ax, ay + o), (bx, by + o), color);
        }
    }

    /// Draw onto `canvas` without encoding.
    pub fn draw(&self, canvas: &mut RgbImage, overlay: &Overlay<'_>) {
        for marker in overlay.markers {
            for i in 0..4 {
                let a = &marker.corners[i];
                let b = &marker.corners[(i + 1) % 4];
                self.thick_line(canvas, a, b, self.outline);
            }
        }

        let color = method_color(overlay.method);
        let radius = (self.stroke * 2).max(2);
        for seg in overlay.support {
            self.thick_line(canvas, &seg.from, &seg.to, color);
            for p in [&seg.from, &seg.to] {
                draw_filled_circle_mut(canvas, (p.x.round() as i32, p.y.round() as i32), radius, color);
            }
        }

        let bar_w = (canvas.width() / 4).max(1);
        let filled = ((bar_w as f64) * overlay.confidence.clamp(0.0, 1.0)).round() as u32;
        let bar_h = (canvas.height() / 40).max(4);
        draw_filled_rect_mut(canvas, Rect::at(8, 8).of_size(bar_w, bar_h), Rgb([40, 40, 40]));
        if filled > 0 {
            draw_filled_rect_mut(canvas, Rect::at(8, 8).of_size(filled, bar_h), color);
        }
    }
}

impl Visualizer for OverlayRenderer {
    fn render(
        &self,
        frame: &RgbImage,
        overlay: &Overlay<'_>,
        jpeg_quality: u8,
    ) -> Result<Vec<u8>, VisualizationError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(VisualizationError::EmptyFrame);
        }
        let mut canvas = frame.clone();
        self.draw(&mut canvas, overlay);

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, jpeg_quality.clamp(1, 100))
            .encode_image(&canvas)?;
        log::debug!(
            "overlay: {}x{} -> {} bytes at quality {}",
            canvas.width(),
            canvas.height(),
            bytes.len(),
            jpeg_quality
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay_markers() -> [MarkerObservation; 2] {
        [
            MarkerObservation::from_xy(1, [[10.0, 10.0], [30.0, 10.0], [30.0, 30.0], [10.0, 30.0]]),
            MarkerObservation::from_xy(2, [[60.0, 10.0], [80.0, 10.0], [80.0, 30.0], [60.0, 30.0]]),
        ]
    }

    #[test]
    fn renders_jpeg_bytes() {
        let markers = overlay_markers();
        let support = [SupportSegment::new(markers[0].corners[1], markers[1].corners[0])];
        let overlay = Overlay {
            markers: &markers,
            support: &support,
            distance_m: 0.03,
            method: SelectedMethod::Edge,
            confidence: 0.5,
        };
        let frame = RgbImage::from_pixel(100, 60, Rgb([255, 255, 255]));
        let bytes = OverlayRenderer::default().render(&frame, &overlay, 80).unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn draws_outline_pixels() {
        let markers = overlay_markers();
        let overlay = Overlay {
            markers: &markers,
            support: &[],
            distance_m: 0.0,
            method: SelectedMethod::Perspective,
            confidence: 0.0,
        };
        let mut canvas = RgbImage::from_pixel(100, 60, Rgb([0, 0, 0]));
        let renderer = OverlayRenderer::default();
        renderer.draw(&mut canvas, &overlay);
        assert_eq!(*canvas.get_pixel(20, 30), renderer.outline);
        assert_eq!(*canvas.get_pixel(45, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn empty_frame_is_an_error() {
        let markers = overlay_markers();
        let overlay = Overlay {
            markers: &markers,
            support: &[],
            distance_m: 0.0,
            method: SelectedMethod::Edge,
            confidence: 0.0,
        };
        let frame = RgbImage::new(0, 0);
        assert!(matches!(
            OverlayRenderer::default().render(&frame, &overlay, 80),
            Err(VisualizationError::EmptyFrame)
        ));
    }
}
