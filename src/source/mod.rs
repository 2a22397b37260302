//! Frame sources: where hand skeletons come from each tick.

#[cfg(feature = "camera")]
pub mod camera;
pub mod stream;

use anyhow::Result;

use crate::tracker::HandSlots;

#[cfg(feature = "camera")]
pub use camera::CameraSource;
pub use stream::LandmarkStream;

/// Result of pulling one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// A frame was captured; both slots are filled in, possibly with
    /// `NotDetected`.
    Captured(HandSlots),
    /// Capture failed this tick. Not an error; the loop carries on.
    Missed,
    /// The source has nothing more to give.
    Exhausted,
}

/// Produces hand slots once per tick.
///
/// Implementations guarantee every skeleton is a full 21-point pose or
/// `NotDetected`, and that `previous` is the last pose seen in that slot.
/// Camera and model handles are released when the source is dropped.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<FrameOutcome>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> Result<FrameOutcome> {
        (**self).next_frame()
    }
}
