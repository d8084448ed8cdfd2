//! Per-election, per-candidate and per-voter aggregates.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDateTime;
use log::debug;

use crate::config::*;
use crate::index::{election_end, election_start, ElectionIndex};

/// How the votes of a group of events split.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct VoteTally {
    pub support: u64,
    pub neutral: u64,
    pub oppose: u64,
    /// Events that carry no vote value.
    pub missing: u64,
}

impl VoteTally {
    fn add(&mut self, vote: Option<VoteValue>) {
        match vote {
            Some(VoteValue::Support) => self.support += 1,
            Some(VoteValue::Neutral) => self.neutral += 1,
            Some(VoteValue::Oppose) => self.oppose += 1,
            None => self.missing += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.support + self.neutral + self.oppose + self.missing
    }

    /// Share of support among the votes that have a value.
    pub fn support_ratio(&self) -> Option<f64> {
        let cast = self.support + self.neutral + self.oppose;
        if cast == 0 {
            None
        } else {
            Some(self.support as f64 / cast as f64)
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ElectionSummary {
    pub id: u32,
    pub target: String,
    pub result: bool,
    pub year: Option<i32>,
    pub tally: VoteTally,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CandidateSummary {
    pub target: String,
    pub elections: u64,
    pub promotions: u64,
    pub first_election: Option<NaiveDateTime>,
    pub last_election: Option<NaiveDateTime>,
    /// All the votes received, over all the elections.
    pub tally: VoteTally,
    /// Mean length of the comments left with the votes received, in characters.
    /// A vote without comment counts as an empty comment.
    pub average_comment_length: Option<f64>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct VoterSummary {
    pub source: String,
    pub tally: VoteTally,
    pub elections: u64,
    /// Distinct years of the votes, in increasing order.
    pub active_years: Vec<i32>,
    pub first_vote: Option<NaiveDateTime>,
    pub last_vote: Option<NaiveDateTime>,
    pub own_first_election: Option<NaiveDateTime>,
    pub votes_before_own_election: u64,
    /// Votes whose value equals the result of the election, read as 1 for a
    /// promotion and 0 otherwise: support in a promotion, neutral in a rejection.
    pub votes_matching_result: u64,
}

impl VoterSummary {
    /// Share of all the votes cast that match the result. Votes without a value never match.
    pub fn similar_ratio(&self) -> Option<f64> {
        let total = self.tally.total();
        if total == 0 {
            None
        } else {
            Some(self.votes_matching_result as f64 / total as f64)
        }
    }

    pub fn different_ratio(&self) -> Option<f64> {
        self.similar_ratio().map(|r| 1.0 - r)
    }
}

pub fn summarize_elections(elections: &[Election]) -> Vec<ElectionSummary> {
    elections
        .iter()
        .map(|election| {
            let mut tally = VoteTally::default();
            for e in election.events.iter() {
                tally.add(e.vote);
            }
            ElectionSummary {
                id: election.id,
                target: election.target.clone(),
                result: election.result,
                year: election.events.iter().find_map(|e| e.year),
                tally,
                start: election_start(election),
                end: election_end(election),
            }
        })
        .collect()
}

/// Candidates are returned sorted by name.
pub fn summarize_candidates(elections: &[Election]) -> Vec<CandidateSummary> {
    // The second field sums the comment lengths.
    let mut by_target: BTreeMap<&str, (CandidateSummary, u64)> = BTreeMap::new();
    for election in elections.iter() {
        let (c, comment_chars) = by_target
            .entry(election.target.as_str())
            .or_insert_with(|| {
                (
                    CandidateSummary {
                        target: election.target.clone(),
                        elections: 0,
                        promotions: 0,
                        first_election: None,
                        last_election: None,
                        tally: VoteTally::default(),
                        average_comment_length: None,
                    },
                    0,
                )
            });
        c.elections += 1;
        if election.result {
            c.promotions += 1;
        }
        if let Some(start) = election_start(election) {
            c.first_election = Some(c.first_election.map_or(start, |d| d.min(start)));
            c.last_election = Some(c.last_election.map_or(start, |d| d.max(start)));
        }
        for e in election.events.iter() {
            c.tally.add(e.vote);
            *comment_chars += e.comment.chars().count() as u64;
        }
    }
    debug!("summarize_candidates: {} candidates", by_target.len());
    by_target
        .into_values()
        .map(|(mut c, comment_chars)| {
            let received = c.tally.total();
            if received > 0 {
                c.average_comment_length = Some(comment_chars as f64 / received as f64);
            }
            c
        })
        .collect()
}

/// Voters are returned sorted by name. Anonymous votes are not attributed to anyone.
pub fn summarize_voters(elections: &[Election], index: &ElectionIndex) -> Vec<VoterSummary> {
    let mut by_source: BTreeMap<&str, (VoterSummary, HashSet<u32>, BTreeSet<i32>)> =
        BTreeMap::new();
    for election in elections.iter() {
        for e in election.events.iter() {
            let source = match e.source.as_deref() {
                Some(s) => s,
                None => continue,
            };
            let (v, seen, years) = by_source.entry(source).or_insert_with(|| {
                (
                    VoterSummary {
                        source: source.to_string(),
                        tally: VoteTally::default(),
                        elections: 0,
                        active_years: Vec::new(),
                        first_vote: None,
                        last_vote: None,
                        own_first_election: index.get(source),
                        votes_before_own_election: 0,
                        votes_matching_result: 0,
                    },
                    HashSet::new(),
                    BTreeSet::new(),
                )
            });
            v.tally.add(e.vote);
            if seen.insert(election.id) {
                v.elections += 1;
            }
            if let Some(y) = e.year {
                years.insert(y);
            }
            if let Some(ts) = e.timestamp {
                v.first_vote = Some(v.first_vote.map_or(ts, |d| d.min(ts)));
                v.last_vote = Some(v.last_vote.map_or(ts, |d| d.max(ts)));
            }
            if index.is_before_own_election(source, e.timestamp) {
                v.votes_before_own_election += 1;
            }
            if e.vote.map(|x| x.as_i64()) == Some(election.result as i64) {
                v.votes_matching_result += 1;
            }
        }
    }
    debug!("summarize_voters: {} voters", by_source.len());
    by_source
        .into_values()
        .map(|(mut v, _, years)| {
            v.active_years = years.into_iter().collect();
            v
        })
        .collect()
}
