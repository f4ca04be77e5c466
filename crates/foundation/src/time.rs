/// Logical timestamp in milliseconds.
///
/// Interaction code is driven by caller-supplied time rather than the wall
/// clock so pointer sequences can be recorded and replayed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub u64);

impl Time {
    pub const ZERO: Time = Time(0);

    pub fn from_millis(ms: u64) -> Self {
        Time(ms)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    pub fn after_millis(self, ms: u64) -> Self {
        Time(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn since(self, earlier: Time) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn arithmetic_saturates() {
        assert_eq!(Time(10).after_millis(60), Time(70));
        assert_eq!(Time(u64::MAX).after_millis(1), Time(u64::MAX));
        assert_eq!(Time(70).since(Time(10)), 60);
        assert_eq!(Time(10).since(Time(70)), 0);
    }
}
