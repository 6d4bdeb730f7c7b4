use std::time::{Duration, Instant};

/// Default quiet period before a search refetch.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds back search input until it has been quiet for `delay`.
///
/// Time is passed in by the caller so the session loop and tests drive it.
#[derive(Debug, Clone)]
pub struct SearchDebounce {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for SearchDebounce {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl SearchDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record new input, restarting the quiet period.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now));
    }

    /// When the pending input becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Take the pending input once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self.deadline().is_some_and(|deadline| now >= deadline);
        if due {
            self.pending.take().map(|(text, _)| text)
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_quiet_period() {
        let start = Instant::now();
        let mut debounce = SearchDebounce::new(Duration::from_millis(300));
        debounce.input("bio", start);
        assert_eq!(debounce.poll(start + Duration::from_millis(299)), None);
        assert_eq!(
            debounce.poll(start + Duration::from_millis(300)).as_deref(),
            Some("bio")
        );
        assert!(!debounce.is_pending());
        assert_eq!(debounce.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn new_input_restarts_the_timer_and_wins() {
        let start = Instant::now();
        let mut debounce = SearchDebounce::new(Duration::from_millis(300));
        debounce.input("b", start);
        debounce.input("bi", start + Duration::from_millis(200));
        assert_eq!(debounce.poll(start + Duration::from_millis(400)), None);
        assert_eq!(
            debounce.deadline(),
            Some(start + Duration::from_millis(500))
        );
        assert_eq!(
            debounce.poll(start + Duration::from_millis(500)).as_deref(),
            Some("bi")
        );
    }

    #[test]
    fn cancel_drops_pending_input() {
        let start = Instant::now();
        let mut debounce = SearchDebounce::default();
        debounce.input("pet", start);
        debounce.cancel();
        assert_eq!(debounce.deadline(), None);
        assert_eq!(debounce.poll(start + Duration::from_secs(1)), None);
    }
}
