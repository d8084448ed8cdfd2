// Primitives for reading the colon-delimited vote dumps.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDateTime;

use crate::rfa::{
    io_common::{parse_integer, parse_timestamp},
    *,
};

/// Corrections of the dates that cannot be parsed in the public RfA dump,
/// by position of the vote in the file (starting at 0).
pub const KNOWN_DATE_CORRECTIONS: [(usize, &str); 4] = [
    (6821, "2012-07-01 14:47"),
    (27608, "2010-01-03 20:44"),
    (116963, "2007-05-26 14:47"),
    (70591, "2008-05-24 03:29"),
];

/// A vote, as read from the dump. Nothing is interpreted yet.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ParsedVote {
    /// Line of the first field of this vote.
    pub lineno: usize,
    pub source: Option<String>,
    pub target: Option<String>,
    pub vote: Option<String>,
    pub result: Option<String>,
    pub year: Option<String>,
    pub date: Option<String>,
    pub text: Option<String>,
}

impl ParsedVote {
    fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.target.is_none()
            && self.vote.is_none()
            && self.result.is_none()
            && self.year.is_none()
            && self.date.is_none()
            && self.text.is_none()
    }

    /// The slot for a key, or None if the key is not known.
    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "SRC" => Some(&mut self.source),
            "TGT" => Some(&mut self.target),
            "VOT" => Some(&mut self.vote),
            "RES" => Some(&mut self.result),
            "YEA" => Some(&mut self.year),
            "DAT" => Some(&mut self.date),
            "TXT" => Some(&mut self.text),
            _ => None,
        }
    }
}

pub fn read_dump(path: &Path) -> RfaResult<Vec<ParsedVote>> {
    info!("Attempting to read vote dump {:?}", path);
    let file = File::open(path).context(OpeningDumpSnafu {
        path: path.display().to_string(),
    })?;
    parse_dump(BufReader::new(file))
}

/// Splits a dump into votes.
///
/// A vote ends at a blank line, or when one of its keys shows up a second time.
pub fn parse_dump<R: BufRead>(reader: R) -> RfaResult<Vec<ParsedVote>> {
    let mut res: Vec<ParsedVote> = Vec::new();
    let mut current = ParsedVote::default();
    for (idx, line_r) in reader.lines().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(ReadingDumpSnafu { lineno })?;
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                res.push(std::mem::take(&mut current));
            }
            continue;
        }
        let (key, value) = line.split_once(':').context(MalformedLineSnafu {
            lineno,
            line: line.to_string(),
        })?;
        if current.slot(key).is_none() {
            warn!("parse_dump: line {}: unknown key {:?}, skipping", lineno, key);
            continue;
        }
        if matches!(current.slot(key), Some(Some(_))) {
            res.push(std::mem::take(&mut current));
        }
        if current.is_empty() {
            current.lineno = lineno;
        }
        if let Some(slot) = current.slot(key) {
            *slot = Some(value.trim().to_string());
        }
    }
    if !current.is_empty() {
        res.push(current);
    }
    debug!("parse_dump: {} votes", res.len());
    Ok(res)
}

fn non_empty(x: &Option<String>) -> Option<&str> {
    x.as_deref().map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Types one vote. Values that cannot be understood become missing values.
pub fn type_vote(pv: &ParsedVote) -> VoteEvent {
    let vote = non_empty(&pv.vote).and_then(|s| match parse_integer(s) {
        Some(x) => match VoteValue::try_from(x) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("type_vote: line {}: {}", pv.lineno, e);
                None
            }
        },
        None => {
            warn!("type_vote: line {}: could not read vote {:?}", pv.lineno, s);
            None
        }
    });
    let timestamp = non_empty(&pv.date).and_then(|s| {
        let ts = parse_timestamp(s);
        if ts.is_none() {
            debug!("type_vote: line {}: could not read date {:?}", pv.lineno, s);
        }
        ts
    });
    VoteEvent {
        source: non_empty(&pv.source).map(|s| s.to_string()),
        target: non_empty(&pv.target).unwrap_or("").to_string(),
        vote,
        result: non_empty(&pv.result).and_then(parse_integer) == Some(1),
        year: non_empty(&pv.year)
            .and_then(parse_integer)
            .and_then(|y| i32::try_from(y).ok()),
        timestamp,
        comment: pv.text.clone().unwrap_or_default(),
    }
}

/// Overwrites the dates of the votes at the given positions.
pub fn apply_date_corrections(events: &mut [VoteEvent], corrections: &[(usize, NaiveDateTime)]) {
    for (pos, date) in corrections.iter() {
        match events.get_mut(*pos) {
            Some(e) => {
                debug!(
                    "apply_date_corrections: vote {}: {:?} -> {:?}",
                    pos, e.timestamp, date
                );
                e.timestamp = Some(*date);
            }
            None => {
                warn!(
                    "apply_date_corrections: no vote at position {} ({} votes), skipping",
                    pos,
                    events.len()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    const DUMP: &str = "SRC:Ann
TGT:Bob
VOT:1
RES:1
YEA:2008
DAT:19:53, 25 January 2008
TXT:'''Support''' see: [[WP:RFA]]

SRC:
TGT:Bob
VOT:oops
RES:-1
YEA:2008
DAT:not a date
TXT:
SRC:Cid
TGT:Bob
VOT:-1
";

    #[test]
    fn splits_votes() {
        let votes = parse_dump(Cursor::new(DUMP)).unwrap();
        assert_eq!(votes.len(), 3);
        assert_eq!(votes[0].lineno, 1);
        assert_eq!(votes[0].source.as_deref(), Some("Ann"));
        // Only the first colon separates the key.
        assert_eq!(
            votes[0].text.as_deref(),
            Some("'''Support''' see: [[WP:RFA]]")
        );
        // A repeated key starts a new vote even without a blank line.
        assert_eq!(votes[1].lineno, 9);
        assert_eq!(votes[1].source.as_deref(), Some(""));
        assert_eq!(votes[2].lineno, 16);
        assert_eq!(votes[2].source.as_deref(), Some("Cid"));
        assert_eq!(votes[2].date, None);
    }

    #[test]
    fn types_votes() {
        let votes: Vec<VoteEvent> = parse_dump(Cursor::new(DUMP))
            .unwrap()
            .iter()
            .map(type_vote)
            .collect();
        let first = &votes[0];
        assert_eq!(first.source.as_deref(), Some("Ann"));
        assert_eq!(first.target, "Bob");
        assert_eq!(first.vote, Some(VoteValue::Support));
        assert!(first.result);
        assert_eq!(first.year, Some(2008));
        assert_eq!(
            first.timestamp,
            NaiveDate::from_ymd_opt(2008, 1, 25)
                .unwrap()
                .and_hms_opt(19, 53, 0)
        );

        let second = &votes[1];
        assert_eq!(second.source, None);
        assert_eq!(second.vote, None);
        assert!(!second.result);
        assert_eq!(second.timestamp, None);
        assert_eq!(second.comment, "");

        assert_eq!(votes[2].vote, Some(VoteValue::Oppose));
        assert!(!votes[2].result);
    }

    #[test]
    fn out_of_range_votes_are_missing() {
        let votes = parse_dump(Cursor::new("SRC:a\nTGT:b\nVOT:3\n")).unwrap();
        assert_eq!(type_vote(&votes[0]).vote, None);
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let votes = parse_dump(Cursor::new("SRC:a\nFOO:bar\nTGT:b\n")).unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].target.as_deref(), Some("b"));
    }

    #[test]
    fn lines_without_colon_fail() {
        let res = parse_dump(Cursor::new("SRC:a\nnonsense\n"));
        assert!(matches!(res, Err(RfaError::MalformedLine { lineno: 2, .. })));
    }

    #[test]
    fn date_corrections() {
        let mut votes: Vec<VoteEvent> = parse_dump(Cursor::new(DUMP))
            .unwrap()
            .iter()
            .map(type_vote)
            .collect();
        let date = NaiveDate::from_ymd_opt(2008, 2, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        apply_date_corrections(&mut votes, &[(1, date), (99, date)]);
        assert_eq!(votes[1].timestamp, Some(date));
        assert_eq!(votes[2].timestamp, None);
    }
}
