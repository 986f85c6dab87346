use std::fmt;

use crate::types::Reviewer;

/// Reviewer votes partitioned by sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub up: usize,
    pub down: usize,
    pub waiting: usize,
}

impl VoteTally {
    pub fn from_reviewers(reviewers: &[Reviewer]) -> Self {
        reviewers
            .iter()
            .fold(VoteTally::default(), |mut tally, reviewer| {
                match reviewer.vote.signum() {
                    1 => tally.up += 1,
                    -1 => tally.down += 1,
                    _ => tally.waiting += 1,
                }
                tally
            })
    }

    pub fn total(&self) -> usize {
        self.up + self.down + self.waiting
    }
}

/// Formats the tally as `-down/total`, `+up/total` or `~waiting/total`,
/// in that order of precedence. A rejection always wins.
impl fmt::Display for VoteTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total();
        if total == 0 {
            write!(f, "0")
        } else if self.down > 0 {
            write!(f, "-{}/{}", self.down, total)
        } else if self.up > 0 {
            write!(f, "+{}/{}", self.up, total)
        } else if self.waiting > 0 {
            write!(f, "~{}/{}", self.waiting, total)
        } else {
            write!(f, "{total}")
        }
    }
}

pub fn summarize_votes(reviewers: &[Reviewer]) -> String {
    VoteTally::from_reviewers(reviewers).to_string()
}
