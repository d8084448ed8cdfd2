use std::collections::HashMap;

use chrono::NaiveDateTime;
use log::debug;

use crate::config::*;

/// For every voter who was once a candidate, the earliest timestamp of their own elections.
///
/// Voters who never ran are simply absent from the index.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ElectionIndex {
    first_dates: HashMap<String, NaiveDateTime>,
}

impl ElectionIndex {
    pub fn new() -> ElectionIndex {
        ElectionIndex::default()
    }

    /// Builds the index from segmented elections.
    ///
    /// The date of an election is the earliest timestamp among its events. Elections
    /// without any timestamp do not contribute.
    pub fn from_elections(elections: &[Election]) -> ElectionIndex {
        let mut index = ElectionIndex::new();
        for election in elections.iter() {
            if let Some(start) = election_start(election) {
                index.insert(election.target.clone(), start);
            }
        }
        debug!(
            "from_elections: {} elections, {} candidates indexed",
            elections.len(),
            index.len()
        );
        index
    }

    /// Records a date for this voter, keeping the earliest one seen so far.
    pub fn insert(&mut self, voter: String, date: NaiveDateTime) {
        let e = self.first_dates.entry(voter).or_insert(date);
        if date < *e {
            *e = date;
        }
    }

    pub fn get(&self, voter: &str) -> Option<NaiveDateTime> {
        self.first_dates.get(voter).copied()
    }

    /// True if the voter has an entry and the timestamp is at or before it.
    /// Any missing piece of information means false.
    pub fn is_before_own_election(&self, voter: &str, timestamp: Option<NaiveDateTime>) -> bool {
        match (timestamp, self.get(voter)) {
            (Some(ts), Some(first)) => ts <= first,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.first_dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_dates.is_empty()
    }
}

impl FromIterator<(String, NaiveDateTime)> for ElectionIndex {
    fn from_iter<I: IntoIterator<Item = (String, NaiveDateTime)>>(iter: I) -> Self {
        let mut index = ElectionIndex::new();
        for (voter, date) in iter {
            index.insert(voter, date);
        }
        index
    }
}

pub(crate) fn election_start(election: &Election) -> Option<NaiveDateTime> {
    election.events.iter().filter_map(|e| e.timestamp).min()
}

pub(crate) fn election_end(election: &Election) -> Option<NaiveDateTime> {
    election.events.iter().filter_map(|e| e.timestamp).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2010, 1, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn event(source: &str, target: &str, timestamp: Option<NaiveDateTime>) -> VoteEvent {
        VoteEvent {
            source: Some(source.to_string()),
            target: target.to_string(),
            vote: Some(VoteValue::Support),
            result: true,
            year: Some(2010),
            timestamp,
            comment: String::new(),
        }
    }

    fn election(id: u32, target: &str, events: Vec<VoteEvent>) -> Election {
        Election {
            id,
            target: target.to_string(),
            result: true,
            events,
        }
    }

    #[test]
    fn earliest_date_over_all_elections() {
        let elections = vec![
            election(
                0,
                "Alice",
                vec![event("Bob", "Alice", Some(ts(10))), event("Carl", "Alice", Some(ts(8)))],
            ),
            election(1, "Bob", vec![event("Alice", "Bob", Some(ts(9)))]),
            election(2, "Alice", vec![event("Bob", "Alice", Some(ts(3)))]),
        ];
        let index = ElectionIndex::from_elections(&elections);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Alice"), Some(ts(3)));
        assert_eq!(index.get("Bob"), Some(ts(9)));
        assert_eq!(index.get("Carl"), None);
    }

    #[test]
    fn elections_without_timestamps_are_ignored() {
        let elections = vec![election(0, "Alice", vec![event("Bob", "Alice", None)])];
        let index = ElectionIndex::from_elections(&elections);
        assert!(index.is_empty());
    }

    #[test]
    fn before_own_election_is_inclusive() {
        let index: ElectionIndex = vec![("Alice".to_string(), ts(5))].into_iter().collect();
        assert!(index.is_before_own_election("Alice", Some(ts(5))));
        assert!(index.is_before_own_election("Alice", Some(ts(4))));
        assert!(!index.is_before_own_election("Alice", Some(ts(6))));
        assert!(!index.is_before_own_election("Alice", None));
        assert!(!index.is_before_own_election("Bob", Some(ts(1))));
    }
}
