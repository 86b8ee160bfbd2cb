//! Cancellable work handed out by a slot.
//!
//! Each asynchronous step is wrapped in an [`Abortable`] future tagged with
//! the [`Ticket`] of the edit session that requested it. The slot keeps the
//! matching [`AbortHandle`]; moving to another session aborts the future and
//! any completion that still arrives carries a ticket the slot no longer
//! recognises.

use futures::future::{AbortHandle, Abortable, Aborted, BoxFuture};
use futures::FutureExt;

use super::SlotError;
use crate::decode::SourceImage;
use crate::encode::ExportedAsset;
use crate::guard::AcceptedSource;

/// Identifies one edit session of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub(crate) u64);

/// A guarded source together with its decoded pixels.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub accepted: AcceptedSource,
    pub image: SourceImage,
}

/// Output of a select step.
#[derive(Debug, Clone)]
pub enum Selection {
    /// Guarded only, for slots that commit the source as is.
    Guarded(AcceptedSource),
    /// Guarded and decoded, ready for the cropper.
    Loaded(LoadedSource),
}

/// An in-flight step; drive it with [`Pending::run`].
pub struct Pending<T> {
    ticket: Ticket,
    task: Abortable<BoxFuture<'static, Result<T, SlotError>>>,
}

/// The outcome of a [`Pending`] step, to be handed back to the slot.
#[derive(Debug)]
pub struct Completion<T> {
    pub(crate) ticket: Ticket,
    pub(crate) outcome: Result<Result<T, SlotError>, Aborted>,
}

pub type PendingSelect = Pending<Selection>;
pub type PendingExport = Pending<ExportedAsset>;
pub type SelectCompletion = Completion<Selection>;
pub type ExportCompletion = Completion<ExportedAsset>;

impl<T: Send + 'static> Pending<T> {
    /// Wrap `work` for `ticket`, returning the handle that aborts it.
    pub(crate) fn spawn<F>(ticket: Ticket, work: F) -> (Self, AbortHandle)
    where
        F: FnOnce() -> Result<T, SlotError> + Send + 'static,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let future = async move { work() }.boxed();
        let pending = Self {
            ticket,
            task: Abortable::new(future, registration),
        };
        (pending, handle)
    }
}

impl<T> Pending<T> {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Drive the step to completion. An aborted step still completes, with
    /// an aborted outcome the slot will discard.
    pub async fn run(self) -> Completion<T> {
        Completion {
            ticket: self.ticket,
            outcome: self.task.await,
        }
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending")
            .field("ticket", &self.ticket)
            .field("aborted", &self.task.is_aborted())
            .finish()
    }
}

impl<T> Completion<T> {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn is_aborted(&self) -> bool {
        self.outcome.is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_run_yields_work_result() {
        let (pending, _handle) = Pending::spawn(Ticket(3), || Ok(7u32));
        assert_eq!(pending.ticket(), Ticket(3));

        let completion = block_on(pending.run());
        assert_eq!(completion.ticket(), Ticket(3));
        assert!(matches!(completion.outcome, Ok(Ok(7))));
    }

    #[test]
    fn test_aborted_before_run_skips_work() {
        let (pending, handle) = Pending::<u32>::spawn(Ticket(1), || {
            panic!("aborted work must not run");
        });
        handle.abort();

        let completion = block_on(pending.run());
        assert!(completion.is_aborted());
    }
}
