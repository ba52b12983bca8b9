//! End-to-end request handling: decode, detect, measure, render.

use crate::{
    DetectionConfig, DetectionProfile, FinalMeasurement, GaugeConfig, MarkerDetector,
    MeasureError, MeasureRequest, MeasureResponse, MeasurementPipeline, Overlay, ServiceReply,
    Visualizer,
};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use marker_gauge_core::{FrameSize, GeometryError, GrayImageView};
use marker_gauge_temporal::SessionRegistry;
use std::sync::{PoisonError, RwLock};

/// A measurement service: one detector, one visualizer, many sessions.
///
/// All methods take `&self`; the service can be shared across threads behind
/// an `Arc`. Requests on the same session serialize on that session's lock.
pub struct MeasurementService<D, V> {
    config: GaugeConfig,
    profile: RwLock<DetectionProfile>,
    sessions: SessionRegistry,
    pipeline: MeasurementPipeline,
    detector: D,
    visualizer: V,
}

impl<D: MarkerDetector, V: Visualizer> MeasurementService<D, V> {
    pub fn new(config: GaugeConfig, detector: D, visualizer: V) -> Self {
        Self {
            profile: RwLock::new(config.profile),
            sessions: SessionRegistry::new(config.temporal.clone()),
            pipeline: MeasurementPipeline::from_config(&config),
            config,
            detector,
            visualizer,
        }
    }

    /// Settings the service was built with. The active profile may have
    /// changed since; see [`Self::profile`].
    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn profile(&self) -> DetectionProfile {
        *self.profile.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn detection_config(&self) -> DetectionConfig {
        DetectionConfig::for_profile(self.profile())
    }

    /// Switch profiles by name. An unknown name leaves the profile unchanged.
    pub fn set_profile(&self, name: &str) -> Result<DetectionProfile, MeasureError> {
        let profile = name.parse::<DetectionProfile>().map_err(|e| {
            log::warn!("rejected profile change: {e}");
            e
        })?;
        *self.profile.write().unwrap_or_else(PoisonError::into_inner) = profile;
        log::info!("detection profile set to {profile}");
        Ok(profile)
    }

    /// A request with a side length of `None` uses the configured default.
    pub fn request(&self, image: Vec<u8>, side_length_m: Option<f64>) -> MeasureRequest {
        MeasureRequest::new(image)
            .with_side_length(side_length_m.unwrap_or(self.config.side_length_m))
            .with_visualization(self.config.visualize)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "info", skip(self, request), fields(bytes = request.image.len()))
    )]
    pub fn measure(
        &self,
        session_id: &str,
        request: &MeasureRequest,
        now: f64,
    ) -> Result<MeasureResponse, MeasureError> {
        let side = request.side_length_m;
        if !(side.is_finite() && side > 0.0) {
            return Err(GeometryError::NonPositiveSideLength { meters: side }.into());
        }

        if request.image.is_empty() {
            return Err(MeasureError::InvalidRequest(
                "image payload is empty".to_owned(),
            ));
        }

        let decoded = image::load_from_memory(&request.image)?;
        let luma = decoded.to_luma8();
        let (full_w, full_h) = luma.dimensions();

        let detection = self.detection_config();
        let (gray, factor) = match detection.downscale_bounds() {
            Some((max_w, max_h)) => fit_within(luma, max_w, max_h),
            None => (luma, 1.0),
        };
        let view = GrayImageView {
            width: gray.width() as usize,
            height: gray.height() as usize,
            data: gray.as_raw().as_slice(),
        };
        log::debug!(
            "frame {}x{} -> detection {}x{} ({})",
            full_w,
            full_h,
            view.width,
            view.height,
            detection.profile
        );

        let markers = self.detector.detect(&view, &detection).unwrap_or_default();
        if markers.len() < 2 {
            return Err(MeasureError::InsufficientMarkers {
                found: markers.len(),
            });
        }

        let frame = FrameSize::new(view.width as u32, view.height as u32);
        let measurement = {
            let handle = self.sessions.session(session_id);
            let mut filter = handle.lock().unwrap_or_else(PoisonError::into_inner);
            self.pipeline
                .measure(&markers, side, frame, &mut filter, now)?
        };

        let visualization = if request.visualize {
            self.render(&decoded, &measurement, factor, detection.jpeg_quality)
        } else {
            None
        };
        Ok(MeasureResponse::from_measurement(&measurement, visualization))
    }

    /// [`Self::measure`] with every error turned into a tagged reply.
    pub fn handle(&self, session_id: &str, request: &MeasureRequest, now: f64) -> ServiceReply {
        ServiceReply::from_result(self.measure(session_id, request, now))
    }

    /// Overlay on the original frame; failures are logged and dropped.
    fn render(
        &self,
        frame: &DynamicImage,
        measurement: &FinalMeasurement,
        factor: f64,
        jpeg_quality: u8,
    ) -> Option<Vec<u8>> {
        let back = 1.0 / factor;
        let [a, b] = &measurement.diagnostics.markers;
        let markers = [a.scaled(back), b.scaled(back)];
        let support: Vec<_> = measurement
            .diagnostics
            .support
            .iter()
            .map(|s| s.scaled(back))
            .collect();
        let overlay = Overlay {
            markers: &markers,
            support: &support,
            distance_m: measurement.distance_m,
            method: measurement.method,
            confidence: measurement.confidence,
        };
        match self.visualizer.render(&frame.to_rgb8(), &overlay, jpeg_quality) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::warn!("visualization failed: {err}");
                None
            }
        }
    }
}

/// Shrink `luma` to fit inside `max_w x max_h`, keeping aspect.
///
/// Returns the image handed to detection and the applied factor
/// (`new = old * factor`); frames that already fit come back untouched.
fn fit_within(luma: GrayImage, max_w: u32, max_h: u32) -> (GrayImage, f64) {
    let (w, h) = luma.dimensions();
    if (w <= max_w && h <= max_h) || w == 0 || h == 0 || max_w == 0 || max_h == 0 {
        return (luma, 1.0);
    }
    let scale = (f64::from(max_w) / f64::from(w)).min(f64::from(max_h) / f64::from(h));
    let new_w = ((f64::from(w) * scale) as u32).max(1);
    let new_h = ((f64::from(h) * scale) as u32).max(1);
    let small = imageops::resize(&luma, new_w, new_h, FilterType::Triangle);
    (small, f64::from(new_w) / f64::from(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            image::Luma([(x * 255 / (width - 1)) as u8])
        })
    }

    #[test]
    fn frames_within_bounds_are_left_alone() {
        let (img, factor) = fit_within(ramp(64, 48), 800, 600);
        assert_eq!(img.dimensions(), (64, 48));
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn large_frames_shrink_keeping_aspect() {
        let (img, factor) = fit_within(ramp(1600, 900), 800, 600);
        assert_eq!(img.dimensions(), (800, 450));
        assert_eq!(factor, 0.5);
        // the horizontal ramp survives resampling
        assert!(img.get_pixel(0, 0)[0] < img.get_pixel(799, 0)[0]);
    }
}
