//! One-shot delayed tasks driven by the frame loop
//!
//! Replaces free-floating timers: a task only fires when its owner advances
//! the clock, and everything pending disappears with `cancel_all` or when
//! the scheduler is dropped, so nothing can run after teardown.

/// Handle returned by [`Scheduler::schedule`], used to cancel the task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    handle: TaskHandle,
    due_ms: f64,
    task: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: f64,
    next_handle: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_handle: 1,
            pending: Vec::new(),
        }
    }

    /// Current scheduler time (sum of all advances)
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Run `task` once `delay_ms` more milliseconds have been advanced
    pub fn schedule(&mut self, delay_ms: f64, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Pending {
            handle,
            due_ms: self.now_ms + delay_ms.max(0.0),
            task,
        });
        handle
    }

    /// Returns false if the task already fired or was cancelled
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.pending.iter().position(|p| p.handle == handle) {
            Some(i) => {
                self.pending.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward and return every task now due, earliest first
    /// (ties in scheduling order)
    pub fn advance(&mut self, elapsed_ms: f64) -> Vec<T> {
        if elapsed_ms > 0.0 {
            self.now_ms += elapsed_ms;
        }
        let now = self.now_ms;

        let (mut due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.due_ms <= now);
        self.pending = waiting;

        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.handle.cmp(&b.handle)));
        due.into_iter().map(|p| p.task).collect()
    }
}
