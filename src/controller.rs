//! The presentation loop: frame source in, OS input out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::action::ActionSink;
use crate::session::InputSession;
use crate::source::{FrameOutcome, FrameSource};
use crate::translator::Translator;
use crate::tracker::HandSlots;

/// Ties a frame source to the translator and the input session.
///
/// The left hand drives the mouse and the right hand drives the keyboard.
/// Ticks run one after another with a fixed delay between them.
pub struct GestureController<S: FrameSource, K: ActionSink> {
    source: S,
    session: InputSession<K>,
    translator: Translator,
    delay: Duration,
    /// Set from outside (signal handler) to stop the loop
    shutdown: Arc<AtomicBool>,
}

impl<S: FrameSource, K: ActionSink> GestureController<S, K> {
    pub fn new(source: S, sink: K, translator: Translator, delay: Duration) -> Self {
        Self {
            source,
            session: InputSession::new(sink),
            translator,
            delay,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops `run` after the current tick once set.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn translator_mut(&mut self) -> &mut Translator {
        &mut self.translator
    }

    pub fn session(&self) -> &InputSession<K> {
        &self.session
    }

    /// Classify one frame's hands and apply the resulting actions.
    pub fn step(&mut self, hands: &HandSlots) {
        if hands.left.poses().is_some() {
            if let Some(cursor) = self.session.cursor_position() {
                let left = &hands.left;
                let action = self.translator.classify_mouse(&left.current, &left.previous, cursor);
                if let Some(action) = action {
                    self.session.apply_mouse(&action);
                }
            }
        }

        if hands.right.poses().is_some() {
            let actions = self
                .translator
                .classify_keyboard(&hands.right.current, &hands.right.previous);
            for action in &actions {
                self.session.apply_keyboard(action);
            }
        }
    }

    /// Pull one frame and process it. Returns `false` once the source is
    /// exhausted.
    pub fn tick(&mut self) -> Result<bool> {
        match self.source.next_frame()? {
            FrameOutcome::Captured(hands) => self.step(&hands),
            FrameOutcome::Missed => debug!("no frame this tick"),
            FrameOutcome::Exhausted => return Ok(false),
        }
        Ok(true)
    }

    /// Run until the source is exhausted, fails, or the shutdown flag is
    /// set. Held keys are released on every exit path.
    pub fn run(&mut self) -> Result<()> {
        info!("gesture loop running, tick delay {:?}", self.delay);
        let result = self.run_ticks();
        self.session.teardown();
        info!("gesture loop stopped");
        result
    }

    fn run_ticks(&mut self) -> Result<()> {
        while !self.shutdown.load(Ordering::Relaxed) {
            if !self.tick()? {
                return Ok(());
            }
            thread::sleep(self.delay);
        }
        info!("shutdown requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::recording::{Call, RecordingSink};
    use crate::action::KeyChord;
    use crate::skeleton::testing::HandBuilder;
    use crate::skeleton::{Finger, Skeleton};
    use crate::tracker::HandSlot;
    use std::collections::VecDeque;

    struct ScriptedSource {
        frames: VecDeque<Result<FrameOutcome>>,
    }

    impl ScriptedSource {
        fn new(frames: Vec<Result<FrameOutcome>>) -> Self {
            Self {
                frames: frames.into(),
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<FrameOutcome> {
            self.frames.pop_front().unwrap_or(Ok(FrameOutcome::Exhausted))
        }
    }

    fn controller(
        frames: Vec<Result<FrameOutcome>>,
    ) -> GestureController<ScriptedSource, RecordingSink> {
        let sink = RecordingSink {
            cursor: (100, 100),
            ..Default::default()
        };
        GestureController::new(
            ScriptedSource::new(frames),
            sink,
            Translator::default(),
            Duration::ZERO,
        )
    }

    fn slot(current: &HandBuilder, previous: &HandBuilder) -> HandSlot {
        HandSlot {
            current: current.skeleton(),
            previous: previous.skeleton(),
        }
    }

    fn calls(c: &GestureController<ScriptedSource, RecordingSink>) -> &[Call] {
        &c.session().sink().calls
    }

    #[test]
    fn test_left_hand_drives_mouse() {
        let mut c = controller(Vec::new());
        let previous = HandBuilder::open();
        let current = previous.clone().shift(0.01, 0.0, 0.0);
        c.step(&HandSlots {
            left: slot(&current, &previous),
            right: HandSlot::default(),
        });
        assert_eq!(calls(&c), &[Call::MoveTo(130, 100)]);
    }

    #[test]
    fn test_right_hand_drives_keyboard() {
        let mut c = controller(Vec::new());
        let previous = HandBuilder::open().gap(Finger::Pinkie, 0.02);
        let current = HandBuilder::open();
        c.step(&HandSlots {
            left: HandSlot::default(),
            right: slot(&current, &previous),
        });
        assert_eq!(calls(&c), &[Call::Send("escape".into())]);
    }

    #[test]
    fn test_missing_previous_is_ignored() {
        let mut c = controller(Vec::new());
        let hand = HandBuilder::fist().skeleton();
        c.step(&HandSlots {
            left: HandSlot {
                current: hand.clone(),
                previous: Skeleton::NotDetected,
            },
            right: HandSlot {
                current: hand,
                previous: Skeleton::NotDetected,
            },
        });
        assert!(calls(&c).is_empty());
    }

    #[test]
    fn test_both_hands_left_first() {
        let mut c = controller(Vec::new());
        let open = HandBuilder::open();
        let clicking = open.clone().gap(Finger::Index, 0.02).shift(0.0, 0.01, 0.0);
        let fist = HandBuilder::fist();
        c.step(&HandSlots {
            left: slot(&clicking, &open),
            right: slot(&fist, &open),
        });
        assert_eq!(calls(&c), &[Call::Click, Call::Press("alt+tab".into())]);
    }

    #[test]
    fn test_run_releases_alt_tab_at_end() {
        let open = HandBuilder::open();
        let fist = HandBuilder::fist();
        let frames = vec![
            Ok(FrameOutcome::Missed),
            Ok(FrameOutcome::Captured(HandSlots {
                left: HandSlot::default(),
                right: slot(&fist, &open),
            })),
        ];
        let mut c = controller(frames);
        c.run().unwrap();

        assert_eq!(
            calls(&c),
            &[Call::Press("alt+tab".into()), Call::Release("alt+tab".into())]
        );
        assert!(c.session().latched().is_empty());
    }

    #[test]
    fn test_run_releases_on_source_error() {
        let open = HandBuilder::open();
        let fist = HandBuilder::fist();
        let frames = vec![
            Ok(FrameOutcome::Captured(HandSlots {
                left: HandSlot::default(),
                right: slot(&fist, &open),
            })),
            Err(anyhow::anyhow!("camera unplugged")),
        ];
        let mut c = controller(frames);
        assert!(c.run().is_err());
        assert_eq!(
            calls(&c).last(),
            Some(&Call::Release(KeyChord::alt_tab().to_string()))
        );
    }

    #[test]
    fn test_fist_cycle_through_router() {
        use crate::tracker::HandRouter;

        let mut router = HandRouter::new();
        let open = HandBuilder::open();
        let fist = HandBuilder::fist();
        let frames = vec![
            Ok(FrameOutcome::Captured(router.route(vec![open.pose()]))),
            Ok(FrameOutcome::Captured(router.route(vec![fist.pose()]))),
            Ok(FrameOutcome::Captured(router.route(Vec::new()))),
            Ok(FrameOutcome::Captured(router.route(vec![fist.pose()]))),
            Ok(FrameOutcome::Captured(router.route(vec![open.pose()]))),
        ];
        let mut c = controller(frames);
        c.run().unwrap();

        // The vanished frame does not break the held fist.
        assert_eq!(
            calls(&c),
            &[Call::Press("alt+tab".into()), Call::Release("alt+tab".into())]
        );
    }

    #[test]
    fn test_shutdown_flag_stops_loop_and_releases() {
        struct EndlessFist {
            router: crate::tracker::HandRouter,
            ticks: usize,
            shutdown: Option<Arc<AtomicBool>>,
        }

        impl FrameSource for EndlessFist {
            fn next_frame(&mut self) -> Result<FrameOutcome> {
                self.ticks += 1;
                let pose = if self.ticks == 1 {
                    HandBuilder::open().pose()
                } else {
                    HandBuilder::fist().pose()
                };
                if self.ticks == 3 {
                    if let Some(flag) = &self.shutdown {
                        flag.store(true, Ordering::Relaxed);
                    }
                }
                Ok(FrameOutcome::Captured(self.router.route(vec![pose])))
            }
        }

        let source = EndlessFist {
            router: crate::tracker::HandRouter::new(),
            ticks: 0,
            shutdown: None,
        };
        let mut c = GestureController::new(
            source,
            RecordingSink::default(),
            Translator::default(),
            Duration::ZERO,
        );
        c.source.shutdown = Some(c.shutdown_flag());
        c.run().unwrap();

        assert_eq!(c.source.ticks, 3);
        assert_eq!(
            &c.session().sink().calls,
            &[Call::Press("alt+tab".into()), Call::Release("alt+tab".into())]
        );
        assert!(c.session().latched().is_empty());
    }

    #[test]
    fn test_preset_shutdown_runs_no_ticks() {
        let mut c = controller(vec![Err(anyhow::anyhow!("never read"))]);
        c.shutdown_flag().store(true, Ordering::Relaxed);
        c.run().unwrap();
        assert!(calls(&c).is_empty());
    }
}
