mod config;
mod index;

pub mod builder;
pub mod manual;
pub mod markup;
pub mod summary;

use log::{debug, info};
use rayon::prelude::*;

use std::{
    collections::HashMap,
    ops::{Add, AddAssign},
};

pub use crate::config::*;
pub use crate::index::ElectionIndex;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct VoterId(u32);

/// Interned voter names, numbered in order of first appearance in the log.
struct VoterRegistry {
    ids: HashMap<String, VoterId>,
    names: Vec<String>,
}

impl VoterRegistry {
    fn from_elections<E: AsRef<[VoteEvent]>>(elections: &[E]) -> VoterRegistry {
        let mut ids: HashMap<String, VoterId> = HashMap::new();
        let mut names: Vec<String> = Vec::new();
        for election in elections.iter() {
            for source in election.as_ref().iter().filter_map(|e| e.source.as_ref()) {
                if !ids.contains_key(source) {
                    ids.insert(source.clone(), VoterId(names.len() as u32));
                    names.push(source.clone());
                }
            }
        }
        VoterRegistry { ids, names }
    }

    fn get(&self, name: &str) -> Option<VoterId> {
        self.ids.get(name).copied()
    }

    fn name(&self, vid: VoterId) -> &str {
        self.names[vid.0 as usize].as_str()
    }
}

/// Canonical key for an unordered pair of voters.
// Invariant: lo < hi.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
struct PairKey {
    lo: VoterId,
    hi: VoterId,
}

impl PairKey {
    /// Returns the key and whether `first` ended up on the `lo` side.
    fn new(first: VoterId, second: VoterId) -> (PairKey, bool) {
        if first < second {
            (
                PairKey {
                    lo: first,
                    hi: second,
                },
                true,
            )
        } else {
            (
                PairKey {
                    lo: second,
                    hi: first,
                },
                false,
            )
        }
    }
}

/// Where a pair was seen: election position, then the positions of the two events in it.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Ord, PartialOrd)]
struct Encounter {
    group: usize,
    first: usize,
    second: usize,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
struct SideCount {
    total_before: u64,
    agreed_before: u64,
}

impl Add for SideCount {
    type Output = SideCount;
    fn add(self: SideCount, rhs: SideCount) -> SideCount {
        SideCount {
            total_before: self.total_before + rhs.total_before,
            agreed_before: self.agreed_before + rhs.agreed_before,
        }
    }
}

/// The counters of one pair, stored in key orientation (`lo`, `hi`).
#[derive(Eq, PartialEq, Debug, Clone)]
struct PairCount {
    total: u64,
    agreed: u64,
    lo: SideCount,
    hi: SideCount,
    first_seen: Encounter,
    // The voter who came first at `first_seen` is the `lo` voter.
    lo_first: bool,
}

impl PairCount {
    fn new(first_seen: Encounter, lo_first: bool) -> PairCount {
        PairCount {
            total: 0,
            agreed: 0,
            lo: SideCount::default(),
            hi: SideCount::default(),
            first_seen,
            lo_first,
        }
    }

    fn record(&mut self, agreed: bool, lo_before: bool, hi_before: bool) {
        self.total += 1;
        if agreed {
            self.agreed += 1;
        }
        if lo_before {
            self.lo.total_before += 1;
            if agreed {
                self.lo.agreed_before += 1;
            }
        }
        if hi_before {
            self.hi.total_before += 1;
            if agreed {
                self.hi.agreed_before += 1;
            }
        }
    }
}

// Merging is commutative: counters add up and the earliest encounter wins.
impl AddAssign for PairCount {
    fn add_assign(&mut self, rhs: PairCount) {
        self.total += rhs.total;
        self.agreed += rhs.agreed;
        self.lo = self.lo + rhs.lo;
        self.hi = self.hi + rhs.hi;
        if rhs.first_seen < self.first_seen {
            self.first_seen = rhs.first_seen;
            self.lo_first = rhs.lo_first;
        }
    }
}

/// An event reduced to what the pair counting needs.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct ResolvedVote {
    voter: Option<VoterId>,
    vote: Option<VoteValue>,
    before_own_election: bool,
}

fn resolve_group(
    events: &[VoteEvent],
    registry: &VoterRegistry,
    index: &ElectionIndex,
) -> Vec<ResolvedVote> {
    debug_assert!(
        events.windows(2).all(|w| w[0].target == w[1].target),
        "election group mixes several targets"
    );
    events
        .iter()
        .map(|e| ResolvedVote {
            voter: e.source.as_deref().and_then(|s| registry.get(s)),
            vote: e.vote,
            before_own_election: e
                .source
                .as_deref()
                .map(|s| index.is_before_own_election(s, e.timestamp))
                .unwrap_or(false),
        })
        .collect()
}

/// Two votes agree only if both are present and identical.
/// Two missing votes do not agree.
fn votes_agree(a: Option<VoteValue>, b: Option<VoteValue>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x == y)
}

#[derive(Debug, Default)]
struct PairTable {
    pairs: HashMap<PairKey, PairCount>,
    num_groups: usize,
}

impl PairTable {
    fn add_group(&mut self, group: usize, votes: &[ResolvedVote]) {
        self.num_groups += 1;
        for (i, first) in votes.iter().enumerate() {
            let first_id = match first.voter {
                Some(vid) => vid,
                None => continue,
            };
            for (j, second) in votes.iter().enumerate().skip(i + 1) {
                let second_id = match second.voter {
                    // A voter is not paired with themselves.
                    Some(vid) if vid != first_id => vid,
                    _ => continue,
                };
                let (key, first_is_lo) = PairKey::new(first_id, second_id);
                let (lo, hi) = if first_is_lo {
                    (first, second)
                } else {
                    (second, first)
                };
                let agreed = votes_agree(first.vote, second.vote);
                let e = self.pairs.entry(key).or_insert_with(|| {
                    PairCount::new(
                        Encounter {
                            group,
                            first: i,
                            second: j,
                        },
                        first_is_lo,
                    )
                });
                e.record(agreed, lo.before_own_election, hi.before_own_election);
            }
        }
    }

    fn merge(mut self, other: PairTable) -> PairTable {
        self.num_groups += other.num_groups;
        for (key, count) in other.pairs {
            match self.pairs.get_mut(&key) {
                Some(e) => *e += count,
                None => {
                    self.pairs.insert(key, count);
                }
            }
        }
        self
    }

    fn into_records(self, registry: &VoterRegistry) -> Vec<AgreementRecord> {
        let mut entries: Vec<(PairKey, PairCount)> = self.pairs.into_iter().collect();
        entries.sort_by_key(|(_, count)| count.first_seen);
        entries
            .into_iter()
            .map(|(key, count)| {
                let (a, b, side_a, side_b) = if count.lo_first {
                    (key.lo, key.hi, count.lo, count.hi)
                } else {
                    (key.hi, key.lo, count.hi, count.lo)
                };
                let mut record = AgreementRecord {
                    voter_a: registry.name(a).to_string(),
                    voter_b: registry.name(b).to_string(),
                    total_votes: count.total,
                    agreed: count.agreed,
                    total_before_a: side_a.total_before,
                    total_before_b: side_b.total_before,
                    agreed_before_a: side_a.agreed_before,
                    agreed_before_b: side_b.agreed_before,
                    ratios: AgreementRatios::UNDEFINED,
                };
                record.ratios = derive_ratios(&record);
                record
            })
            .collect()
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Computes the three agreement ratios of a record.
///
/// A ratio is `None` when its denominator is zero.
pub fn derive_ratios(record: &AgreementRecord) -> AgreementRatios {
    AgreementRatios {
        agreement: ratio(record.agreed, record.total_votes),
        agreement_before_a: ratio(record.agreed_before_a, record.total_before_a),
        agreement_before_b: ratio(record.agreed_before_b, record.total_before_b),
    }
}

/// Computes the agreement statistics of every pair of voters who voted in a common election.
///
/// Arguments:
/// * `elections` the elections, each one being the contiguous run of events of one target.
/// The grouping is trusted as given: events are never paired across two elements of this slice.
/// * `index` the date of the first own election of each voter
/// * `rules` how to run the computation
///
/// The records are returned in order of first encounter. Anonymous events and pairs made of
/// two votes from the same voter are not counted.
pub fn run_agreement_stats<E: AsRef<[VoteEvent]> + Sync>(
    elections: &[E],
    index: &ElectionIndex,
    rules: &AgreementRules,
) -> Vec<AgreementRecord> {
    info!(
        "Processing {:?} elections, {:?} indexed candidates, rules: {:?}",
        elections.len(),
        index.len(),
        rules
    );
    let registry = VoterRegistry::from_elections(elections);
    debug!("run_agreement_stats: {} distinct voters", registry.names.len());

    let table = match rules.parallelism {
        Parallelism::Sequential => {
            let mut table = PairTable::default();
            for (idx, election) in elections.iter().enumerate() {
                let votes = resolve_group(election.as_ref(), &registry, index);
                table.add_group(idx, &votes);
            }
            table
        }
        Parallelism::Rayon => elections
            .par_iter()
            .enumerate()
            .fold(PairTable::default, |mut table, (idx, election)| {
                let votes = resolve_group(election.as_ref(), &registry, index);
                table.add_group(idx, &votes);
                table
            })
            .reduce(PairTable::default, PairTable::merge),
    };

    info!(
        "Counted {:?} voter pairs over {:?} elections",
        table.pairs.len(),
        table.num_groups
    );
    table.into_records(&registry)
}
