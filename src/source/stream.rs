//! Landmark stream: hand detections read as JSON lines.
//!
//! The pose model runs out of process and writes one JSON object per
//! captured frame:
//!
//! ```json
//! {"hands": [{"score": 0.97, "landmarks": [{"x": 0.5, "y": 0.8, "z": 0.0}, ...]}], "error": null}
//! ```
//!
//! `landmarks` must hold exactly 21 points in MediaPipe order. A line with
//! `"success": false` or a non-null `error` is a missed frame. A spawned
//! detector prints `READY` on its first line before any frame.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Command, Stdio};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{FrameOutcome, FrameSource};
use crate::geometry::Point3;
use crate::skeleton::HandPose;
use crate::tracker::HandRouter;

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default = "default_score")]
    score: f32,
    landmarks: Vec<Point3>,
}

fn default_score() -> f32 { 1.0 }
fn default_success() -> bool { true }

#[derive(Deserialize, Debug)]
struct DetectionLine {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Frame source over a stream of JSON detection lines.
pub struct LandmarkStream {
    reader: Box<dyn BufRead>,
    /// Detector subprocess, if we spawned one
    child: Option<Child>,
    router: HandRouter,
    /// Minimum detection score for a hand to be used
    min_confidence: f32,
    line: Vec<u8>,
}

impl LandmarkStream {
    pub fn from_reader<R: BufRead + 'static>(reader: R, min_confidence: f32) -> Self {
        Self {
            reader: Box::new(reader),
            child: None,
            router: HandRouter::new(),
            min_confidence,
            line: Vec::new(),
        }
    }

    /// Read detections from a file, or from stdin when `path` is `-`.
    pub fn open<P: AsRef<Path>>(path: P, min_confidence: f32) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str() == "-" {
            info!("reading landmarks from stdin");
            return Ok(Self::from_reader(BufReader::new(io::stdin()), min_confidence));
        }
        let file = File::open(path)
            .with_context(|| format!("failed to open landmark file {}", path.display()))?;
        info!("reading landmarks from {}", path.display());
        Ok(Self::from_reader(BufReader::new(file), min_confidence))
    }

    /// Start a detector process and read detections from its stdout.
    pub fn spawn(program: &str, args: &[String], min_confidence: f32) -> Result<Self> {
        info!("starting hand detector: {} {}", program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to start detector {program}"))?;

        let stdout = child.stdout.take().context("failed to get detector stdout")?;
        let mut reader = BufReader::new(stdout);

        let mut ready = String::new();
        let handshake = match reader.read_line(&mut ready) {
            Ok(_) if ready.trim() == "READY" => Ok(()),
            Ok(_) => Err(anyhow!("detector did not signal ready, got: {:?}", ready.trim())),
            Err(e) => Err(anyhow!(e).context("failed to read detector handshake")),
        };
        if let Err(e) = handshake {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
        info!("hand detector ready");

        let mut stream = Self::from_reader(reader, min_confidence);
        stream.child = Some(child);
        Ok(stream)
    }

    fn parse_hands(&self, line: &str) -> Option<Vec<HandPose>> {
        let detection: DetectionLine = match serde_json::from_str(line) {
            Ok(detection) => detection,
            Err(e) => {
                warn!("unreadable detector line: {}", e);
                return None;
            }
        };

        if let Some(error) = detection.error {
            warn!("detector error: {}", error);
            return None;
        }
        if !detection.success {
            return None;
        }

        let mut poses = Vec::with_capacity(detection.hands.len());
        for hand in detection.hands {
            if hand.score < self.min_confidence {
                debug!(score = hand.score, "hand below confidence threshold");
                continue;
            }
            match HandPose::from_points(&hand.landmarks) {
                Ok(pose) => poses.push(pose),
                Err(e) => warn!("skipping hand: {}", e),
            }
        }
        Some(poses)
    }
}

impl FrameSource for LandmarkStream {
    fn next_frame(&mut self) -> Result<FrameOutcome> {
        self.line.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.line)
            .context("failed to read landmark stream")?;
        if read == 0 {
            return Ok(FrameOutcome::Exhausted);
        }

        let line = match std::str::from_utf8(&self.line) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!("detector line is not UTF-8: {}", e);
                return Ok(FrameOutcome::Missed);
            }
        };
        if line.is_empty() {
            return Ok(FrameOutcome::Missed);
        }

        match self.parse_hands(line) {
            Some(poses) => Ok(FrameOutcome::Captured(self.router.route(poses))),
            None => Ok(FrameOutcome::Missed),
        }
    }
}

impl Drop for LandmarkStream {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
