// Miscellaneous utilities for cells.
use std::cell::Cell;
use crate::cell::Phase;

/// Emits a `tracing` trace event when the `tracing` feature is enabled.
macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    }};
}
pub(crate) use trace;

/// Emits a `tracing` debug event when the `tracing` feature is enabled.
macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    }};
}
pub(crate) use debug;

/// Rearm: holds a producer that has been checked out of its cell.
///
/// While a producer runs, the cell reports `Phase::Evaluating` and its producer slot
/// is empty. If the guard is dropped without being disarmed (the producer panicked,
/// returned an error, or a producer clone unwound), the producer goes back into
/// the slot and the cell is `Pending` again, so a later read can retry.
pub(crate) struct Rearm<'a, F> {
    slot: &'a Cell<Option<F>>,
    phase: &'a Cell<Phase>,
    producer: Option<F>,
}
impl<'a, F> Rearm<'a, F> {
    /// Check the producer out of `slot`, marking the cell as evaluating.
    /// Returns None if the slot holds no producer.
    pub(crate) fn check_out(slot: &'a Cell<Option<F>>, phase: &'a Cell<Phase>) -> Option<Self> {
        let producer = slot.take()?;
        phase.set(Phase::Evaluating);
        Some(Self { slot, phase, producer: Some(producer) })
    }

    pub(crate) fn producer(&self) -> &F {
        match self.producer.as_ref() {
            Some(producer) => producer,
            None => unreachable!("producer is only released by disarm"),
        }
    }

    pub(crate) fn producer_mut(&mut self) -> &mut F {
        match self.producer.as_mut() {
            Some(producer) => producer,
            None => unreachable!("producer is only released by disarm"),
        }
    }

    /// Put the producer back and mark the cell pending again.
    pub(crate) fn put_back(mut self) {
        if let Some(producer) = self.producer.take() {
            self.slot.set(Some(producer));
            self.phase.set(Phase::Pending);
        }
    }

    /// Release the producer without putting it back.
    /// The caller is responsible for setting the cell's phase.
    pub(crate) fn disarm(mut self) -> Option<F> {
        self.producer.take()
    }
}
impl<'a, F> Drop for Rearm<'a, F> {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            debug!("producer did not complete; cell re-armed");
            self.slot.set(Some(producer));
            self.phase.set(Phase::Pending);
        }
    }
}
