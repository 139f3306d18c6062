//! Decides which waiting job requests to move ahead and in what order.
//!
//! Every bump call puts its target at the very head of the remote queue, so
//! the last request bumped ends up first. Bumping the manual/CI requests in
//! reverse snapshot order therefore leaves them at the head in their original
//! order.

use super::inspector::QueueSnapshot;
use crate::devops::WaitClass;

/// Request ids to bump for one pool, in the order the calls must be issued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BumpPlan {
    request_ids: Vec<i64>,
    scheduled_waiting: usize,
    non_scheduled_waiting: usize,
}

impl BumpPlan {
    pub fn request_ids(&self) -> &[i64] {
        &self.request_ids
    }

    pub fn len(&self) -> usize {
        self.request_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.request_ids.is_empty()
    }

    /// Waiting requests queued by a schedule trigger.
    pub fn scheduled_waiting(&self) -> usize {
        self.scheduled_waiting
    }

    /// Waiting requests queued manually or by CI, whether or not they get bumped.
    pub fn non_scheduled_waiting(&self) -> usize {
        self.non_scheduled_waiting
    }
}

/// Build the bump plan for a single snapshot.
///
/// Empty when no scheduled request is waiting: nothing would be overtaken.
pub fn plan_bumps(snapshot: &QueueSnapshot) -> BumpPlan {
    let mut to_bump = Vec::new();
    let mut scheduled_waiting = 0;

    for request in snapshot.requests() {
        match request.wait_class() {
            Some(WaitClass::NonScheduled) => to_bump.push(request.request_id),
            Some(WaitClass::Scheduled) => scheduled_waiting += 1,
            None => {}
        }
    }

    let non_scheduled_waiting = to_bump.len();
    if scheduled_waiting == 0 {
        to_bump.clear();
    } else {
        to_bump.reverse();
    }

    BumpPlan {
        request_ids: to_bump,
        scheduled_waiting,
        non_scheduled_waiting,
    }
}
