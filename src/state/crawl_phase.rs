/// Crawl controller phases
///
/// This module defines the states the crawl controller moves through while
/// harvesting one listing, and which moves between them are legal.
use std::fmt;

/// Represents the controller's current position in the crawl cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active States =====
    /// Reading the checkpoint to decide between resume, restart, and no-op
    ResumeCheck,

    /// Requesting the current listing page (possibly a retry)
    Fetching,

    /// Turning the fetched page into records and committing them
    Extracting,

    /// Honouring the rate-limit telemetry of the last response
    RateCheck,

    // ===== Terminal States =====
    /// The listing is exhausted (or was already exhausted)
    Done,

    /// A page ran out of retries
    Failed,
}

impl CrawlPhase {
    /// Returns true if the controller stops in this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// `Fetching -> Fetching` is a retry of the same page, and
    /// `Extracting -> Fetching` is a retry after a malformed page.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        matches!(
            (self, next),
            (ResumeCheck, Fetching)
                | (ResumeCheck, Done)
                | (Fetching, Fetching)
                | (Fetching, Extracting)
                | (Fetching, Failed)
                | (Extracting, RateCheck)
                | (Extracting, Fetching)
                | (Extracting, Done)
                | (Extracting, Failed)
                | (RateCheck, Fetching)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResumeCheck => "resume_check",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::RateCheck => "rate_check",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!CrawlPhase::ResumeCheck.is_terminal());
        assert!(!CrawlPhase::Fetching.is_terminal());
        assert!(!CrawlPhase::Extracting.is_terminal());
        assert!(!CrawlPhase::RateCheck.is_terminal());

        assert!(CrawlPhase::Done.is_terminal());
        assert!(CrawlPhase::Failed.is_terminal());
    }

    #[test]
    fn test_happy_path_transitions() {
        assert!(CrawlPhase::ResumeCheck.can_transition_to(CrawlPhase::Fetching));
        assert!(CrawlPhase::Fetching.can_transition_to(CrawlPhase::Extracting));
        assert!(CrawlPhase::Extracting.can_transition_to(CrawlPhase::RateCheck));
        assert!(CrawlPhase::RateCheck.can_transition_to(CrawlPhase::Fetching));
        assert!(CrawlPhase::Extracting.can_transition_to(CrawlPhase::Done));
    }

    #[test]
    fn test_no_op_resume_goes_straight_to_done() {
        assert!(CrawlPhase::ResumeCheck.can_transition_to(CrawlPhase::Done));
        assert!(!CrawlPhase::ResumeCheck.can_transition_to(CrawlPhase::Extracting));
    }

    #[test]
    fn test_rate_check_never_ends_the_crawl() {
        assert!(!CrawlPhase::RateCheck.can_transition_to(CrawlPhase::Done));
        assert!(!CrawlPhase::RateCheck.can_transition_to(CrawlPhase::Failed));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for next in [
            CrawlPhase::ResumeCheck,
            CrawlPhase::Fetching,
            CrawlPhase::Extracting,
            CrawlPhase::RateCheck,
            CrawlPhase::Done,
            CrawlPhase::Failed,
        ] {
            assert!(!CrawlPhase::Done.can_transition_to(next));
            assert!(!CrawlPhase::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlPhase::ResumeCheck), "resume_check");
        assert_eq!(format!("{}", CrawlPhase::RateCheck), "rate_check");
    }
}
