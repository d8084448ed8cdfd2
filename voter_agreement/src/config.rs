// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDateTime;

/// The value of a vote, as cast by a voter.
///
/// A missing or unreadable vote is represented with `None` at the event level,
/// never with one of these values.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum VoteValue {
    Oppose,
    Neutral,
    Support,
}

impl VoteValue {
    /// The numeric encoding used in the dumps: -1, 0 or 1.
    pub fn as_i64(self) -> i64 {
        match self {
            VoteValue::Oppose => -1,
            VoteValue::Neutral => 0,
            VoteValue::Support => 1,
        }
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = DataError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(VoteValue::Oppose),
            0 => Ok(VoteValue::Neutral),
            1 => Ok(VoteValue::Support),
            x => Err(DataError::InvalidVoteValue(x)),
        }
    }
}

/// One line of the vote log, after typing.
///
/// The election id is not stored on the event: it is assigned by the
/// [`crate::builder::Builder`] and carried by the [`Election`] that holds the event.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteEvent {
    /// The voter. Anonymous votes have no source.
    pub source: Option<String>,
    /// The candidate.
    pub target: String,
    pub vote: Option<VoteValue>,
    /// True if the election this vote belongs to promoted the candidate.
    pub result: bool,
    pub year: Option<i32>,
    pub timestamp: Option<NaiveDateTime>,
    pub comment: String,
}

/// A maximal run of consecutive events sharing the same target.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election {
    pub id: u32,
    pub target: String,
    /// Outcome, as reported by the first event of the run.
    pub result: bool,
    pub events: Vec<VoteEvent>,
}

impl AsRef<[VoteEvent]> for Election {
    fn as_ref(&self) -> &[VoteEvent] {
        &self.events
    }
}

// ******** Output data structures *********

/// The ratios derived from an agreement record.
///
/// `None` means that the denominator was zero: there is not enough data to say anything,
/// which is different from a ratio of zero.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct AgreementRatios {
    pub agreement: Option<f64>,
    pub agreement_before_a: Option<f64>,
    pub agreement_before_b: Option<f64>,
}

impl AgreementRatios {
    pub const UNDEFINED: AgreementRatios = AgreementRatios {
        agreement: None,
        agreement_before_a: None,
        agreement_before_b: None,
    };
}

/// Statistics for one unordered pair of voters who voted in at least one common election.
///
/// `voter_a` is the voter that came first in the earliest election both took part in.
#[derive(PartialEq, Debug, Clone)]
pub struct AgreementRecord {
    pub voter_a: String,
    pub voter_b: String,
    pub total_votes: u64,
    pub agreed: u64,
    pub total_before_a: u64,
    pub total_before_b: u64,
    pub agreed_before_a: u64,
    pub agreed_before_b: u64,
    pub ratios: AgreementRatios,
}

/// Errors in the data handed over to the library.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DataError {
    InvalidVoteValue(i64),
    EmptyTarget,
}

impl Error for DataError {}

impl Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::InvalidVoteValue(x) => write!(f, "invalid vote value {}", x),
            DataError::EmptyTarget => write!(f, "vote event without a target"),
        }
    }
}

// ********* Configuration **********

/// How the pairs of an election log are counted.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Parallelism {
    /// One pass over the elections, in order.
    Sequential,
    /// Elections are spread over the rayon thread pool and the partial
    /// tables are merged at the end. The output is identical to the sequential mode.
    Rayon,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AgreementRules {
    pub parallelism: Parallelism,
}

impl AgreementRules {
    pub const DEFAULT_RULES: AgreementRules = AgreementRules {
        parallelism: Parallelism::Sequential,
    };
}
