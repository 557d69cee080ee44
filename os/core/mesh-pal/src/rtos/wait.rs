use crate::platform::TaskId;
use alloc::vec::Vec;

#[derive(Debug, Copy, Clone)]
struct Waiter {
    task: TaskId,
    priority: u8,
}

/// Tasks blocked on one side of a kernel object.
///
/// Ordered by descending priority, first come first served among equal
/// priorities. Only the task at the front may complete its operation.
#[derive(Debug, Default)]
pub(crate) struct WaitList {
    waiters: Vec<Waiter>,
}

impl WaitList {
    pub(crate) fn insert(&mut self, task: TaskId, priority: u8) {
        let pos = self
            .waiters
            .iter()
            .position(|w| w.priority < priority)
            .unwrap_or(self.waiters.len());
        self.waiters.insert(pos, Waiter { task, priority });
    }

    pub(crate) fn remove(&mut self, task: TaskId) {
        self.waiters.retain(|w| w.task != task);
    }

    pub(crate) fn is_first(&self, task: TaskId) -> bool {
        self.waiters.first().is_some_and(|w| w.task == task)
    }

    pub(crate) fn len(&self) -> usize {
        self.waiters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_priority_then_arrival() {
        let mut list = WaitList::default();
        list.insert(TaskId(1), 2);
        list.insert(TaskId(2), 5);
        list.insert(TaskId(3), 2);
        list.insert(TaskId(4), 5);

        assert!(list.is_first(TaskId(2)));
        list.remove(TaskId(2));
        assert!(list.is_first(TaskId(4)));
        list.remove(TaskId(4));
        assert!(list.is_first(TaskId(1)));
        list.remove(TaskId(1));
        assert!(list.is_first(TaskId(3)));
        assert_eq!(list.len(), 1);
    }
}
