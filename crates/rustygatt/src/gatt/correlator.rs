//! Completion correlation between the calling thread and the event context
//!
//! Acknowledged operations park the calling thread here until the
//! controller's event context posts the matching completion. There is one
//! slot per characteristic, and holding it is what enforces the
//! one-outstanding-operation rule: a second claim before the first
//! operation finishes fails with `OperationInFlight`.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use super::error::{GattError, GattResult};

/// Progress of an in-flight long write.
///
/// `tail` is an owned copy of the bytes not yet acknowledged; each prepare
/// acknowledgment drains the acknowledged span and advances `next_offset`.
#[derive(Debug)]
pub(crate) struct LongWriteCursor {
    pub tail: Vec<u8>,
    pub next_offset: u16,
}

/// What the characteristic is currently waiting on.
#[derive(Debug, Default)]
pub(crate) enum OpState {
    #[default]
    Idle,
    AwaitingRead,
    AwaitingWrite,
    AwaitingLongWrite(LongWriteCursor),
}

/// Coarse view of the slot state, for event routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpKind {
    Idle,
    Read,
    Write,
    LongWrite,
}

/// Completion posted by the event context: the acknowledged payload for
/// reads, an empty vector for writes.
pub(crate) type OpOutcome = GattResult<Vec<u8>>;

#[derive(Debug, Default)]
struct Slot {
    state: OpState,
    outcome: Option<OpOutcome>,
}

/// Single-slot blocking handshake (see module docs).
#[derive(Debug, Default)]
pub(crate) struct OpSlot {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl OpSlot {
    /// Claim the slot for a new operation.
    pub fn begin(&self, state: OpState) -> GattResult<()> {
        let mut slot = self.slot.lock().unwrap();
        if !matches!(slot.state, OpState::Idle) {
            return Err(GattError::OperationInFlight);
        }
        slot.state = state;
        slot.outcome = None;
        Ok(())
    }

    /// Block until the event context posts an outcome or `timeout` passes.
    ///
    /// The slot is idle again when this returns, on every path, so a late
    /// acknowledgment after a timeout finds nothing to wake.
    pub fn wait(&self, timeout: Duration) -> GattResult<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock().unwrap();
        loop {
            if let Some(outcome) = slot.outcome.take() {
                slot.state = OpState::Idle;
                return outcome;
            }
            let now = Instant::now();
            if now >= deadline {
                slot.state = OpState::Idle;
                return Err(GattError::Timeout);
            }
            let (guard, _) = self.ready.wait_timeout(slot, deadline - now).unwrap();
            slot = guard;
        }
    }

    /// Release a claim whose request never made it onto the wire.
    pub fn abort(&self) {
        let mut slot = self.slot.lock().unwrap();
        slot.state = OpState::Idle;
        slot.outcome = None;
    }

    /// Post a completion from the event context and wake the waiter.
    ///
    /// A no-op when the slot is idle: late or duplicate acknowledgments
    /// must not disturb whatever runs next.
    pub fn complete(&self, outcome: OpOutcome) {
        let mut slot = self.slot.lock().unwrap();
        if matches!(slot.state, OpState::Idle) {
            return;
        }
        slot.outcome = Some(outcome);
        self.ready.notify_one();
    }

    /// Current state, for routing inbound acknowledgments.
    pub fn kind(&self) -> OpKind {
        match self.slot.lock().unwrap().state {
            OpState::Idle => OpKind::Idle,
            OpState::AwaitingRead => OpKind::Read,
            OpState::AwaitingWrite => OpKind::Write,
            OpState::AwaitingLongWrite(_) => OpKind::LongWrite,
        }
    }

    /// Run `f` against the long-write cursor, if one is in flight.
    ///
    /// `f` runs under the slot lock; it must not call back into the slot.
    pub fn with_long_write<R>(&self, f: impl FnOnce(&mut LongWriteCursor) -> R) -> Option<R> {
        let mut slot = self.slot.lock().unwrap();
        match &mut slot.state {
            OpState::AwaitingLongWrite(cursor) => Some(f(cursor)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn completed_outcome_is_returned() {
        let slot = OpSlot::default();
        slot.begin(OpState::AwaitingRead).unwrap();
        slot.complete(Ok(vec![1, 2, 3]));
        let value = slot.wait(Duration::from_millis(100)).unwrap();
        assert_eq!(value, vec![1, 2, 3]);
        assert_eq!(slot.kind(), OpKind::Idle);
    }

    #[test]
    fn second_claim_is_rejected() {
        let slot = OpSlot::default();
        slot.begin(OpState::AwaitingWrite).unwrap();
        assert!(matches!(
            slot.begin(OpState::AwaitingRead),
            Err(GattError::OperationInFlight)
        ));
    }

    #[test]
    fn wait_times_out_and_frees_the_slot() {
        let slot = OpSlot::default();
        slot.begin(OpState::AwaitingWrite).unwrap();
        assert!(matches!(
            slot.wait(Duration::from_millis(10)),
            Err(GattError::Timeout)
        ));
        // the slot must be reusable after a timeout
        slot.begin(OpState::AwaitingRead).unwrap();
        slot.abort();
    }

    #[test]
    fn stale_completion_is_a_no_op() {
        let slot = OpSlot::default();
        slot.complete(Ok(Vec::new()));
        assert_eq!(slot.kind(), OpKind::Idle);
        // a fresh claim must not see the stale outcome
        slot.begin(OpState::AwaitingWrite).unwrap();
        assert!(matches!(
            slot.wait(Duration::from_millis(10)),
            Err(GattError::Timeout)
        ));
    }

    #[test]
    fn abort_releases_the_claim() {
        let slot = OpSlot::default();
        slot.begin(OpState::AwaitingRead).unwrap();
        slot.abort();
        slot.begin(OpState::AwaitingWrite).unwrap();
    }
}
