//! Countdown queue for work that must wait a few ticks before running.

use rampart_core::PieceId;

/// Work items the world can defer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DeferredTask {
    /// Recompute the connections of a piece and its surroundings.
    RecomputeConnections(PieceId),
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    remaining: u32,
    task: DeferredTask,
}

/// Tasks waiting on a tick countdown, released in scheduling order.
#[derive(Clone, Debug, Default)]
pub(crate) struct DeferredQueue {
    pending: Vec<Pending>,
}

impl DeferredQueue {
    /// Schedules `task` to run once `ticks` more ticks have elapsed.
    pub(crate) fn schedule(&mut self, ticks: u32, task: DeferredTask) {
        self.pending.push(Pending {
            remaining: ticks,
            task,
        });
    }

    /// Counts one tick down and moves every task that came due into `out`.
    pub(crate) fn advance(&mut self, out: &mut Vec<DeferredTask>) {
        out.clear();
        for pending in &mut self.pending {
            pending.remaining = pending.remaining.saturating_sub(1);
        }
        out.extend(
            self.pending
                .iter()
                .filter(|pending| pending.remaining == 0)
                .map(|pending| pending.task),
        );
        self.pending.retain(|pending| pending.remaining > 0);
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}
