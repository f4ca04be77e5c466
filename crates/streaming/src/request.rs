/// Sequence number tagging one fetch cycle.
///
/// Small and copyable so it can travel with the in-flight future and be
/// compared at resolution time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(pub u64);

/// Monotonic issuer for [`RequestSeq`]; the most recently issued number is the
/// only one whose results may still be applied.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    latest: u64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestSeq {
        self.latest += 1;
        RequestSeq(self.latest)
    }

    /// Makes every issued number stale without starting a new cycle.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_latest(&self, seq: RequestSeq) -> bool {
        seq.0 == self.latest
    }
}
