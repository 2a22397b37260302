//! Hand skeletons and the named-point view the classifier works on.
//!
//! A detected hand is always exactly 21 landmarks in MediaPipe order. A
//! hand slot that saw nothing this frame holds [`Skeleton::NotDetected`]
//! instead of an empty landmark list.

use anyhow::{ensure, Result};

use crate::geometry::Point3;

/// Positions in the 21-point MediaPipe skeleton that the classifier reads.
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;
}

/// Number of landmarks in a detected hand.
pub const LANDMARK_COUNT: usize = 21;

/// The four non-thumb fingers, in classifier priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinkie,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinkie];

    /// Landmark index of the fingertip.
    pub fn tip(self) -> usize {
        match self {
            Self::Index => landmarks::INDEX_FINGER_TIP,
            Self::Middle => landmarks::MIDDLE_FINGER_TIP,
            Self::Ring => landmarks::RING_FINGER_TIP,
            Self::Pinkie => landmarks::PINKY_TIP,
        }
    }

    /// Landmark index of the middle joint used for curl detection.
    pub fn pip(self) -> usize {
        match self {
            Self::Index => landmarks::INDEX_FINGER_PIP,
            Self::Middle => landmarks::MIDDLE_FINGER_PIP,
            Self::Ring => landmarks::RING_FINGER_PIP,
            Self::Pinkie => landmarks::PINKY_PIP,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinkie => "pinkie",
        }
    }
}

/// Which physical hand a skeleton belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// A fully populated hand: exactly 21 landmarks.
#[derive(Clone, Debug, PartialEq)]
pub struct HandPose {
    landmarks: [Point3; LANDMARK_COUNT],
}

impl HandPose {
    pub fn new(landmarks: [Point3; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build a pose from a landmark slice, rejecting anything that is not
    /// exactly 21 points.
    pub fn from_points(points: &[Point3]) -> Result<Self> {
        ensure!(
            points.len() == LANDMARK_COUNT,
            "hand skeleton must have {} landmarks, got {}",
            LANDMARK_COUNT,
            points.len()
        );
        let mut landmarks = [Point3::default(); LANDMARK_COUNT];
        landmarks.copy_from_slice(points);
        Ok(Self { landmarks })
    }

    pub fn landmarks(&self) -> &[Point3; LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn point(&self, index: usize) -> Point3 {
        self.landmarks[index]
    }

    /// Project the landmarks the classifier reads.
    pub fn named_points(&self) -> NamedPoints {
        NamedPoints {
            palm: self.landmarks[landmarks::WRIST],
            thumb: self.landmarks[landmarks::THUMB_TIP],
            index: self.landmarks[landmarks::INDEX_FINGER_TIP],
            middle: self.landmarks[landmarks::MIDDLE_FINGER_TIP],
            ring: self.landmarks[landmarks::RING_FINGER_TIP],
            pinkie: self.landmarks[landmarks::PINKY_TIP],
        }
    }

    /// Whether `finger` is curled: its tip sits below its middle joint in
    /// image space.
    pub fn is_curled(&self, finger: Finger) -> bool {
        self.landmarks[finger.tip()].y > self.landmarks[finger.pip()].y
    }

    /// A closed fist: all four non-thumb fingers curled at once. The thumb
    /// does not take part.
    pub fn is_fist(&self) -> bool {
        Finger::ALL.iter().all(|&finger| self.is_curled(finger))
    }

    /// Handedness for a mirrored (selfie) camera image: a right hand has
    /// its thumb base left of its pinkie base.
    pub fn handedness(&self) -> Hand {
        if self.landmarks[landmarks::THUMB_MCP].x < self.landmarks[landmarks::PINKY_MCP].x {
            Hand::Right
        } else {
            Hand::Left
        }
    }
}

/// One hand slot's content for a single frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Skeleton {
    Detected(HandPose),
    #[default]
    NotDetected,
}

impl Skeleton {
    pub fn pose(&self) -> Option<&HandPose> {
        match self {
            Self::Detected(pose) => Some(pose),
            Self::NotDetected => None,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected(_))
    }
}

impl From<HandPose> for Skeleton {
    fn from(pose: HandPose) -> Self {
        Self::Detected(pose)
    }
}

/// The landmarks the classifier reads, by name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NamedPoints {
    pub palm: Point3,
    pub thumb: Point3,
    pub index: Point3,
    pub middle: Point3,
    pub ring: Point3,
    pub pinkie: Point3,
}

impl NamedPoints {
    pub fn fingertip(&self, finger: Finger) -> Point3 {
        match finger {
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinkie => self.pinkie,
        }
    }
}

/// Hand fixtures for tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Builder for synthetic hands.
    ///
    /// The default is an open right hand: every fingertip above its middle
    /// joint and well away from the thumb tip.
    #[derive(Clone, Debug)]
    pub(crate) struct HandBuilder {
        points: [Point3; LANDMARK_COUNT],
    }

    impl HandBuilder {
        pub(crate) fn open() -> Self {
            let mut points = [Point3::default(); LANDMARK_COUNT];
            points[landmarks::WRIST] = Point3::new(0.5, 0.8, 0.0);
            points[landmarks::THUMB_MCP] = Point3::new(0.35, 0.65, 0.0);
            points[landmarks::THUMB_TIP] = Point3::new(0.3, 0.5, 0.0);
            points[landmarks::PINKY_MCP] = Point3::new(0.7, 0.55, 0.0);

            let columns = [
                (Finger::Index, 0.4, 0.3),
                (Finger::Middle, 0.5, 0.25),
                (Finger::Ring, 0.6, 0.3),
                (Finger::Pinkie, 0.7, 0.35),
            ];
            for (finger, x, tip_y) in columns {
                points[finger.pip()] = Point3::new(x, 0.45, 0.0);
                points[finger.tip()] = Point3::new(x, tip_y, 0.0);
            }
            Self { points }
        }

        /// Every fingertip curled below its middle joint, away from the thumb.
        pub(crate) fn fist() -> Self {
            let mut builder = Self::open();
            for finger in Finger::ALL {
                let pip = builder.points[finger.pip()];
                builder.points[finger.tip()] = Point3::new(pip.x, pip.y + 0.05, 0.0);
            }
            builder
        }

        /// Curl a single finger.
        pub(crate) fn curl(mut self, finger: Finger) -> Self {
            let pip = self.points[finger.pip()];
            self.points[finger.tip()] = Point3::new(pip.x, pip.y + 0.05, 0.0);
            self
        }

        /// Put `finger`'s tip `gap` to the right of the thumb tip.
        pub(crate) fn gap(mut self, finger: Finger, gap: f32) -> Self {
            let thumb = self.points[landmarks::THUMB_TIP];
            self.points[finger.tip()] = thumb.offset(gap, 0.0, 0.0);
            self
        }

        /// Move the whole hand.
        pub(crate) fn shift(mut self, dx: f32, dy: f32, dz: f32) -> Self {
            for p in self.points.iter_mut() {
                *p = p.offset(dx, dy, dz);
            }
            self
        }

        pub(crate) fn set(mut self, index: usize, point: Point3) -> Self {
            self.points[index] = point;
            self
        }

        pub(crate) fn pose(&self) -> HandPose {
            HandPose::new(self.points)
        }

        pub(crate) fn skeleton(&self) -> Skeleton {
            Skeleton::Detected(self.pose())
        }
    }
}
