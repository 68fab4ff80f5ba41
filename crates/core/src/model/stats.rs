/// Completed vs. available course counts for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionStats {
    completed: u32,
    total: u32,
}

impl CompletionStats {
    #[must_use]
    pub fn new(completed: u32, total: u32) -> Self {
        Self { completed, total }
    }

    #[must_use]
    pub fn completed(&self) -> u32 {
        self.completed
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// `round(100 * completed / total)`, or 0 when there are no courses.
    ///
    /// Halves round away from zero. The result is not clamped: stale
    /// progress rows for deleted courses can push it past 100.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let completed = u64::from(self.completed);
        let total = u64::from(self.total);
        let rounded = (completed * 200 + total) / (total * 2);
        u32::try_from(rounded).unwrap_or(u32::MAX)
    }

    /// Every available course is done.
    #[must_use]
    pub fn is_all_complete(&self) -> bool {
        self.total > 0 && self.percentage() == 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_is_zero_percent() {
        let stats = CompletionStats::new(0, 0);
        assert_eq!(stats.percentage(), 0);
        assert!(!stats.is_all_complete());
    }

    #[test]
    fn three_of_four_is_seventy_five() {
        assert_eq!(CompletionStats::new(3, 4).percentage(), 75);
    }

    #[test]
    fn rounds_to_nearest() {
        assert_eq!(CompletionStats::new(1, 3).percentage(), 33);
        assert_eq!(CompletionStats::new(2, 3).percentage(), 67);
        assert_eq!(CompletionStats::new(1, 8).percentage(), 13);
    }

    #[test]
    fn all_done_is_exactly_one_hundred_and_celebrates() {
        let stats = CompletionStats::new(5, 5);
        assert_eq!(stats.percentage(), 100);
        assert!(stats.is_all_complete());
    }

    #[test]
    fn celebration_follows_the_rounded_percentage() {
        let stats = CompletionStats::new(199, 200);
        assert_eq!(stats.percentage(), 100);
        assert!(stats.is_all_complete());

        let stats = CompletionStats::new(198, 200);
        assert_eq!(stats.percentage(), 99);
        assert!(!stats.is_all_complete());
    }
}
