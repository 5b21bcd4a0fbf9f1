//! Public health metadata for delta flush attempts.

use std::time::SystemTime;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FlushHealth {
    pub last_attempt_at: Option<SystemTime>,
    pub last_success_at: Option<SystemTime>,
    pub last_attempt_succeeded: Option<bool>,
    pub previous_attempt_succeeded: Option<bool>,
    pub successful_flushes: u64,
    pub failed_flushes: u64,
    pub resyncs_requested: u64,
}

impl FlushHealth {
    pub(crate) fn record_attempt(&mut self, succeeded: bool) {
        let now = SystemTime::now();
        self.previous_attempt_succeeded = self.last_attempt_succeeded;
        self.last_attempt_succeeded = Some(succeeded);
        self.last_attempt_at = Some(now);
        if succeeded {
            self.last_success_at = Some(now);
            self.successful_flushes += 1;
        } else {
            self.failed_flushes += 1;
        }
    }

    pub(crate) fn record_resync(&mut self) {
        self.resyncs_requested += 1;
    }

    /// `true` once a failure was followed by a success.
    pub fn recovered(&self) -> bool {
        self.previous_attempt_succeeded == Some(false) && self.last_attempt_succeeded == Some(true)
    }
}
