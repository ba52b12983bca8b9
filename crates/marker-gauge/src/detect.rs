use crate::DetectionConfig;
use marker_gauge_core::{GrayImageView, MarkerObservation};

/// Finds square fiducial markers in a grayscale frame.
///
/// Implementations return corners in the coordinates of `image`, in a
/// consistent winding, in any id order. `None` and a list shorter than two
/// are both treated as "not enough markers".
pub trait MarkerDetector: Send + Sync {
    fn detect(
        &self,
        image: &GrayImageView<'_>,
        config: &DetectionConfig,
    ) -> Option<Vec<MarkerObservation>>;
}

impl<F> MarkerDetector for F
where
    F: Fn(&GrayImageView<'_>, &DetectionConfig) -> Option<Vec<MarkerObservation>> + Send + Sync,
{
    fn detect(
        &self,
        image: &GrayImageView<'_>,
        config: &DetectionConfig,
    ) -> Option<Vec<MarkerObservation>> {
        self(image, config)
    }
}

/// Returns the same observations for every frame.
///
/// Useful for replaying recorded detections.
#[derive(Clone, Debug, Default)]
pub struct FixedDetector {
    markers: Vec<MarkerObservation>,
}

impl FixedDetector {
    pub fn new(markers: Vec<MarkerObservation>) -> Self {
        Self { markers }
    }
}

impl MarkerDetector for FixedDetector {
    fn detect(
        &self,
        _image: &GrayImageView<'_>,
        _config: &DetectionConfig,
    ) -> Option<Vec<MarkerObservation>> {
        (!self.markers.is_empty()).then(|| self.markers.clone())
    }
}
