// Primitives for writing the CSV reports.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use voter_agreement::markup::strip_wiki_markup;
use voter_agreement::summary::*;

use crate::rfa::{io_common::format_timestamp, *};

pub const AGREEMENT_HEADER: [&str; 11] = [
    "voterA",
    "voterB",
    "totalVotes",
    "agreed",
    "totalBeforeA",
    "totalBeforeB",
    "agreedBeforeA",
    "agreedBeforeB",
    "agreementRatio",
    "agreementRatioBeforeA",
    "agreementRatioBeforeB",
];

/// Undefined ratios are written as NaN, never as 0.
pub fn format_ratio(x: Option<f64>) -> String {
    match x {
        Some(r) => r.to_string(),
        None => "NaN".to_string(),
    }
}

fn format_vote(v: Option<VoteValue>) -> String {
    v.map(|x| x.as_i64().to_string()).unwrap_or_default()
}

/// Years separated by semicolons, so that the list stays in one column.
fn format_years(years: &[i32]) -> String {
    years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<String>>()
        .join(";")
}

fn format_opt<T: ToString>(x: Option<T>) -> String {
    x.map(|v| v.to_string()).unwrap_or_default()
}

fn open_writer(path: &Path) -> RfaResult<Writer<File>> {
    debug!("open_writer: {:?}", path);
    Writer::from_path(path).context(WritingCsvSnafu {
        path: path.display().to_string(),
    })
}

fn finish(mut wtr: Writer<File>, path: &Path) -> RfaResult<()> {
    wtr.flush().context(CreatingOutputSnafu {
        path: path.display().to_string(),
    })
}

fn write_row(wtr: &mut Writer<File>, path: &Path, row: &[String]) -> RfaResult<()> {
    wtr.write_record(row).context(WritingCsvSnafu {
        path: path.display().to_string(),
    })
}

pub fn write_agreements(path: &Path, records: &[AgreementRecord]) -> RfaResult<()> {
    let mut wtr = open_writer(path)?;
    let header: Vec<String> = AGREEMENT_HEADER.iter().map(|s| s.to_string()).collect();
    write_row(&mut wtr, path, &header)?;
    for r in records.iter() {
        write_row(
            &mut wtr,
            path,
            &[
                r.voter_a.clone(),
                r.voter_b.clone(),
                r.total_votes.to_string(),
                r.agreed.to_string(),
                r.total_before_a.to_string(),
                r.total_before_b.to_string(),
                r.agreed_before_a.to_string(),
                r.agreed_before_b.to_string(),
                format_ratio(r.ratios.agreement),
                format_ratio(r.ratios.agreement_before_a),
                format_ratio(r.ratios.agreement_before_b),
            ],
        )?;
    }
    finish(wtr, path)
}

pub fn write_elections(path: &Path, summaries: &[ElectionSummary]) -> RfaResult<()> {
    let mut wtr = open_writer(path)?;
    let header: Vec<String> = [
        "electionId",
        "target",
        "result",
        "year",
        "votes",
        "support",
        "neutral",
        "oppose",
        "missing",
        "supportRatio",
        "start",
        "end",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    write_row(&mut wtr, path, &header)?;
    for s in summaries.iter() {
        write_row(
            &mut wtr,
            path,
            &[
                s.id.to_string(),
                s.target.clone(),
                (s.result as u8).to_string(),
                format_opt(s.year),
                s.tally.total().to_string(),
                s.tally.support.to_string(),
                s.tally.neutral.to_string(),
                s.tally.oppose.to_string(),
                s.tally.missing.to_string(),
                format_ratio(s.tally.support_ratio()),
                format_timestamp(s.start),
                format_timestamp(s.end),
            ],
        )?;
    }
    finish(wtr, path)
}

pub fn write_candidates(path: &Path, summaries: &[CandidateSummary]) -> RfaResult<()> {
    let mut wtr = open_writer(path)?;
    let header: Vec<String> = [
        "target",
        "elections",
        "promotions",
        "firstElection",
        "lastElection",
        "votesReceived",
        "support",
        "neutral",
        "oppose",
        "supportRatio",
        "averageCommentLength",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    write_row(&mut wtr, path, &header)?;
    for s in summaries.iter() {
        write_row(
            &mut wtr,
            path,
            &[
                s.target.clone(),
                s.elections.to_string(),
                s.promotions.to_string(),
                format_timestamp(s.first_election),
                format_timestamp(s.last_election),
                s.tally.total().to_string(),
                s.tally.support.to_string(),
                s.tally.neutral.to_string(),
                s.tally.oppose.to_string(),
                format_ratio(s.tally.support_ratio()),
                format_ratio(s.average_comment_length),
            ],
        )?;
    }
    finish(wtr, path)
}

pub fn write_voters(path: &Path, summaries: &[VoterSummary]) -> RfaResult<()> {
    let mut wtr = open_writer(path)?;
    let header: Vec<String> = [
        "source",
        "votes",
        "support",
        "neutral",
        "oppose",
        "missing",
        "elections",
        "activeYears",
        "firstVote",
        "lastVote",
        "ownFirstElection",
        "votesBeforeOwnElection",
        "votesMatchingResult",
        "similarRatio",
        "differentRatio",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    write_row(&mut wtr, path, &header)?;
    for s in summaries.iter() {
        write_row(
            &mut wtr,
            path,
            &[
                s.source.clone(),
                s.tally.total().to_string(),
                s.tally.support.to_string(),
                s.tally.neutral.to_string(),
                s.tally.oppose.to_string(),
                s.tally.missing.to_string(),
                s.elections.to_string(),
                format_years(&s.active_years),
                format_timestamp(s.first_vote),
                format_timestamp(s.last_vote),
                format_timestamp(s.own_first_election),
                s.votes_before_own_election.to_string(),
                s.votes_matching_result.to_string(),
                format_ratio(s.similar_ratio()),
                format_ratio(s.different_ratio()),
            ],
        )?;
    }
    finish(wtr, path)
}

/// The typed vote log, with the election ids.
pub fn write_events(path: &Path, elections: &[Election], strip_markup: bool) -> RfaResult<()> {
    let mut wtr = open_writer(path)?;
    let header: Vec<String> = [
        "electionId",
        "source",
        "target",
        "vote",
        "result",
        "year",
        "timestamp",
        "comment",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    write_row(&mut wtr, path, &header)?;
    for election in elections.iter() {
        for e in election.events.iter() {
            let comment = if strip_markup {
                strip_wiki_markup(&e.comment)
            } else {
                e.comment.clone()
            };
            write_row(
                &mut wtr,
                path,
                &[
                    election.id.to_string(),
                    e.source.clone().unwrap_or_default(),
                    e.target.clone(),
                    format_vote(e.vote),
                    (e.result as u8).to_string(),
                    format_opt(e.year),
                    format_timestamp(e.timestamp),
                    comment,
                ],
            )?;
        }
    }
    finish(wtr, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios() {
        assert_eq!(format_ratio(Some(0.5)), "0.5");
        assert_eq!(format_ratio(Some(1.0)), "1");
        assert_eq!(format_ratio(None), "NaN");
    }

    #[test]
    fn years() {
        assert_eq!(format_years(&[2006, 2008]), "2006;2008");
        assert_eq!(format_years(&[]), "");
    }

    #[test]
    fn votes() {
        assert_eq!(format_vote(Some(VoteValue::Oppose)), "-1");
        assert_eq!(format_vote(None), "");
    }
}
