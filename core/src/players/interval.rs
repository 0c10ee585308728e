use serde::Serialize;

/// Half-open interval `[start, end)`. `end == None` means still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeInterval {
    pub start: i64,
    pub end: Option<i64>,
}

impl TimeInterval {
    pub fn open(start: i64) -> Self {
        Self { start, end: None }
    }

    pub fn closed(start: i64, end: i64) -> Self {
        Self {
            start,
            end: Some(end.max(start)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Close at `end`, never before `start`. Closing twice keeps the first end.
    pub fn close(&mut self, end: i64) {
        if self.end.is_none() {
            self.end = Some(end.max(self.start));
        }
    }

    /// Length of the intersection with `[lo, hi)`. Open intervals run to `hi`.
    pub fn clamped_duration(&self, lo: i64, hi: i64) -> i64 {
        let end = self.end.unwrap_or(hi).min(hi);
        let start = self.start.max(lo);
        (end - start).max(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeIntervalWithContext<C> {
    pub interval: TimeInterval,
    pub context: C,
}

impl<C> TimeIntervalWithContext<C> {
    pub fn open(start: i64, context: C) -> Self {
        Self {
            interval: TimeInterval::open(start),
            context,
        }
    }
}
