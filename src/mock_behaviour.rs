//! Failure injection for store writes, used to test how callers react to a failing store
#![cfg(any(test, feature = "mock_store_failures"))]

use crate::error::PlannerError;

/// How many times a given write should succeed, then fail, before it succeeds for good
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    pub successes: u32,
    pub failures: u32,
}

impl Countdown {
    pub fn new(successes: u32, failures: u32) -> Self {
        Self { successes, failures }
    }

    /// Consume one step of the countdown
    fn step(&mut self, operation: &str) -> Result<(), PlannerError> {
        if self.successes > 0 {
            self.successes -= 1;
        } else if self.failures > 0 {
            self.failures -= 1;
            log::debug!("Mock store: failing {} ({} more failure(s) to come)", operation, self.failures);
            return Err(PlannerError::Store(format!("{} failed (mocked failure)", operation)));
        }
        log::debug!("Mock store: allowing {}", operation);
        Ok(())
    }
}

/// Failure plans for each kind of store write.
///
/// A store holding one of these checks it before every write, and aborts the write on error.
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// While suspended, every write is allowed and the countdowns are left untouched
    pub is_suspended: bool,

    pub add_item: Countdown,
    pub update_item: Countdown,
    pub delete_item: Countdown,
    pub update_completion: Countdown,
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every kind of write fails for its next `n_fails` attempts
    pub fn fail_now(n_fails: u32) -> Self {
        let countdown = Countdown::new(0, n_fails);
        Self {
            is_suspended: false,
            add_item: countdown,
            update_item: countdown,
            delete_item: countdown,
            update_completion: countdown,
        }
    }

    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn can_add_item(&mut self) -> Result<(), PlannerError> {
        let suspended = self.is_suspended;
        check(suspended, &mut self.add_item, "add_item")
    }
    pub fn can_update_item(&mut self) -> Result<(), PlannerError> {
        let suspended = self.is_suspended;
        check(suspended, &mut self.update_item, "update_item")
    }
    pub fn can_delete_item(&mut self) -> Result<(), PlannerError> {
        let suspended = self.is_suspended;
        check(suspended, &mut self.delete_item, "delete_item")
    }
    pub fn can_update_completion(&mut self) -> Result<(), PlannerError> {
        let suspended = self.is_suspended;
        check(suspended, &mut self.update_completion, "update_completion")
    }
}

fn check(suspended: bool, countdown: &mut Countdown, operation: &str) -> Result<(), PlannerError> {
    if suspended {
        return Ok(());
    }
    countdown.step(operation)
}
