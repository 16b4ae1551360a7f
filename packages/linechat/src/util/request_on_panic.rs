//! Thread utility.

use crate::shutdown::{Shutdown, ShutdownCause};
use std::thread;


/// Guard held by a stage thread that requests shutdown if the thread unwinds.
///
/// Without it, a panicking stage would leave its peers and the coordinator waiting for a
/// sentinel that may never come.
pub struct RequestOnPanic {
    shutdown: Shutdown,
    stage: &'static str,
}

impl RequestOnPanic {
    /// Arm a guard for the named stage.
    pub fn new(shutdown: Shutdown, stage: &'static str) -> Self {
        RequestOnPanic { shutdown, stage }
    }
}

impl Drop for RequestOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(stage = self.stage, "stage panicked, requesting shutdown");
            self.shutdown.request(ShutdownCause::StagePanicked(self.stage));
        }
    }
}
