//! Per-hand slot bookkeeping between frames.
//!
//! Each physical hand has a slot holding this frame's skeleton and the
//! last skeleton seen in that slot before this frame. The router owns the
//! rotation, so the classifier only ever compares two poses it is handed.

use tracing::debug;

use crate::skeleton::{Hand, HandPose, Skeleton};

/// Current and previous skeleton for one hand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandSlot {
    pub current: Skeleton,
    pub previous: Skeleton,
}

impl HandSlot {
    /// Both skeletons, when both are detected.
    pub fn poses(&self) -> Option<(&HandPose, &HandPose)> {
        Some((self.current.pose()?, self.previous.pose()?))
    }
}

/// Exactly two slots, one per hand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandSlots {
    pub left: HandSlot,
    pub right: HandSlot,
}

impl HandSlots {
    pub fn get(&self, hand: Hand) -> &HandSlot {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }
}

/// Routes detections into hand slots and carries the previous pose
/// forward across frames in which a hand is missing.
#[derive(Debug, Default)]
pub struct HandRouter {
    last_left: Skeleton,
    last_right: Skeleton,
}

impl HandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build this frame's slots from the detected poses.
    ///
    /// `previous` is the last pose seen in the slot before this frame, not
    /// necessarily the previous frame's. When two poses classify to the
    /// same hand the later one wins.
    pub fn route(&mut self, detections: Vec<HandPose>) -> HandSlots {
        let mut current_left = Skeleton::NotDetected;
        let mut current_right = Skeleton::NotDetected;

        for pose in detections {
            let hand = pose.handedness();
            let slot = match hand {
                Hand::Left => &mut current_left,
                Hand::Right => &mut current_right,
            };
            if slot.is_detected() {
                debug!(hand = hand.as_str(), "hand detected twice, keeping the later pose");
            }
            *slot = Skeleton::Detected(pose);
        }

        HandSlots {
            left: Self::rotate(&mut self.last_left, current_left),
            right: Self::rotate(&mut self.last_right, current_right),
        }
    }

    fn rotate(last: &mut Skeleton, current: Skeleton) -> HandSlot {
        let previous = last.clone();
        if current.is_detected() {
            *last = current.clone();
        }
        HandSlot { current, previous }
    }

    /// Forget every remembered pose.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
