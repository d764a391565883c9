/// Rate-limiting policy for scroll-triggered evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Debounce {
    /// Quiet period in milliseconds.
    #[cfg_attr(feature = "serde", serde(rename = "wait"))]
    pub wait_ms: u64,
    /// `true`: run on the leading edge only. `false`: run on the trailing edge only.
    pub immediate: bool,
}

impl Debounce {
    pub fn new(wait_ms: u64, immediate: bool) -> Self {
        Self { wait_ms, immediate }
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Self {
            wait_ms: 0,
            immediate: true,
        }
    }
}

/// A clock-agnostic debounce state machine.
///
/// The caller supplies `now_ms` from a monotonic clock and is responsible for calling
/// [`Debouncer::poll`] once [`Debouncer::deadline`] has passed (typically from a timer).
///
/// Every [`Debouncer::call`] re-arms the timer to `now_ms + wait_ms`:
/// - leading mode runs only when no timer is armed, so a burst produces one run at its start;
/// - trailing mode never runs from `call`; `poll` reports the run once the burst has been quiet
///   for `wait_ms`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Debouncer {
    policy: Debounce,
    deadline: Option<u64>,
}

impl Debouncer {
    pub fn new(policy: Debounce) -> Self {
        Self {
            policy,
            deadline: None,
        }
    }

    pub fn policy(&self) -> Debounce {
        self.policy
    }

    /// When the armed timer expires, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Registers a trigger at `now_ms`. Returns `true` if the debounced work should run now.
    ///
    /// A timer whose deadline has already passed is treated as expired. In trailing mode,
    /// call [`Debouncer::poll`] first so an overdue trailing run is not folded into the new one.
    pub fn call(&mut self, now_ms: u64) -> bool {
        if self.deadline.is_some_and(|deadline| now_ms >= deadline) {
            self.deadline = None;
        }
        let call_now = self.policy.immediate && self.deadline.is_none();
        self.deadline = Some(now_ms.saturating_add(self.policy.wait_ms));
        call_now
    }

    /// Expires the timer if its deadline has passed.
    ///
    /// Returns `true` when a trailing run is due.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                !self.policy.immediate
            }
            _ => false,
        }
    }

    /// Drops the armed timer without running anything.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
