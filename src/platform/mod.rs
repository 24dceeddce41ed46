//! Platform abstraction layer
//!
//! The browser drives frames with `requestAnimationFrame`; headless runs and
//! tests drive them by hand. The simulation only ever asks for "one more frame".

use std::cell::Cell;
use std::rc::Rc;

/// Ability to schedule the next frame callback
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Scheduler whose requests are polled by the owner of the loop.
///
/// Clones share state, so the host keeps one clone and hands another to the game.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    pending: Rc<Cell<bool>>,
    requested: Rc<Cell<u64>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a pending request; `true` means run one frame
    pub fn take_pending(&self) -> bool {
        self.pending.replace(false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Total frames ever requested
    pub fn requested(&self) -> u64 {
        self.requested.get()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.pending.set(true);
        self.requested.set(self.requested.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_requests() {
        let host = ManualScheduler::new();
        let mut game_side = host.clone();
        assert!(!host.take_pending());

        game_side.request_frame();
        assert!(host.is_pending());
        assert!(host.take_pending());
        assert!(!host.take_pending());
        assert_eq!(host.requested(), 1);
    }
}
