/// A one-shot deadline driven by the caller's clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Deadline {
    due_ms: Option<u64>,
}

impl Deadline {
    pub(crate) fn start(&mut self, now_ms: u64, duration_ms: u64) {
        self.due_ms = Some(now_ms.saturating_add(duration_ms));
    }

    pub(crate) fn clear(&mut self) {
        self.due_ms = None;
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.due_ms.is_some()
    }

    /// Disarms and returns `true` once `now_ms` reached the deadline.
    pub(crate) fn fire(&mut self, now_ms: u64) -> bool {
        match self.due_ms {
            Some(due) if now_ms >= due => {
                self.due_ms = None;
                true
            }
            _ => false,
        }
    }
}
