//! Webcam frame source with an embedded MediaPipe Hands model.
//!
//! Frames are captured with nokhwa, mirrored into a selfie view and handed
//! to MediaPipe through pyo3. Requires a Python environment with the
//! `mediapipe` package importable.

use anyhow::{Context, Result};
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use numpy::ndarray::Array3;
use numpy::IntoPyArray;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use tracing::{info, warn};

use super::{FrameOutcome, FrameSource};
use crate::config::DetectorConfig;
use crate::geometry::Point3;
use crate::skeleton::HandPose;
use crate::tracker::HandRouter;

/// MediaPipe `solutions.hands.Hands` instance.
struct MediaPipeHands {
    hands: Py<PyAny>,
}

impl MediaPipeHands {
    fn new(config: &DetectorConfig) -> Result<Self> {
        let hands = Python::with_gil(|py| -> PyResult<Py<PyAny>> {
            let solution = py.import("mediapipe")?.getattr("solutions")?.getattr("hands")?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("min_detection_confidence", config.min_detection_confidence)?;
            kwargs.set_item("min_tracking_confidence", config.min_tracking_confidence)?;
            kwargs.set_item("max_num_hands", config.max_num_hands)?;

            let hands = solution.call_method("Hands", (), Some(&kwargs))?;
            Ok(hands.unbind())
        })
        .context("failed to load MediaPipe Hands (is the mediapipe package installed?)")?;

        Ok(Self { hands })
    }

    /// Run the model on an RGB frame.
    fn detect(&self, frame: &RgbImage) -> Result<Vec<HandPose>> {
        let (width, height) = frame.dimensions();
        let shape = (height as usize, width as usize, 3);
        let array = Array3::from_shape_vec(shape, frame.as_raw().clone())?;

        Python::with_gil(|py| -> Result<Vec<HandPose>> {
            let results = self
                .hands
                .call_method1(py, "process", (array.into_pyarray(py),))?;
            let multi_hand_landmarks = results.bind(py).getattr("multi_hand_landmarks")?;

            let mut poses = Vec::new();
            if multi_hand_landmarks.is_none() {
                return Ok(poses);
            }

            for hand in multi_hand_landmarks.try_iter()? {
                let mut points = Vec::with_capacity(21);
                for landmark in hand?.getattr("landmark")?.try_iter()? {
                    let landmark = landmark?;
                    points.push(Point3::new(
                        landmark.getattr("x")?.extract()?,
                        landmark.getattr("y")?.extract()?,
                        landmark.getattr("z")?.extract()?,
                    ));
                }
                match HandPose::from_points(&points) {
                    Ok(pose) => poses.push(pose),
                    Err(e) => warn!("skipping hand: {}", e),
                }
            }
            Ok(poses)
        })
    }
}

impl Drop for MediaPipeHands {
    fn drop(&mut self) {
        Python::with_gil(|py| {
            if let Err(e) = self.hands.call_method0(py, "close") {
                warn!("failed to close MediaPipe Hands: {}", e);
            }
        });
    }
}

/// Frame source reading the webcam.
pub struct CameraSource {
    camera: Camera,
    hands: MediaPipeHands,
    router: HandRouter,
}

impl CameraSource {
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(config.camera_index), requested)
            .with_context(|| format!("unable to open video source {}", config.camera_index))?;
        camera.open_stream().context("failed to start camera stream")?;

        let resolution = camera.resolution();
        info!(
            "camera {} open at {}x{}",
            config.camera_index,
            resolution.width(),
            resolution.height()
        );

        let hands = MediaPipeHands::new(config)?;
        info!("MediaPipe Hands ready");

        Ok(Self {
            camera,
            hands,
            router: HandRouter::new(),
        })
    }

    fn capture(&mut self) -> Result<RgbImage> {
        let buffer = self.camera.frame()?;
        let mut frame = buffer.decode_image::<RgbFormat>()?;
        // Selfie view: handedness classification assumes a mirrored image.
        image::imageops::flip_horizontal_in_place(&mut frame);
        Ok(frame)
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<FrameOutcome> {
        let frame = match self.capture() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("frame capture failed: {}", e);
                return Ok(FrameOutcome::Missed);
            }
        };

        match self.hands.detect(&frame) {
            Ok(poses) => Ok(FrameOutcome::Captured(self.router.route(poses))),
            Err(e) => {
                warn!("hand detection failed: {}", e);
                Ok(FrameOutcome::Missed)
            }
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            warn!("failed to stop camera stream: {}", e);
        }
    }
}
