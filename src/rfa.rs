use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use voter_agreement::builder::Builder;
use voter_agreement::summary::*;
use voter_agreement::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::rfa::config_reader::*;
use crate::rfa::io_common::{resolve_path, simplify_file_name};

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_dump;

#[derive(Debug, Snafu)]
pub enum RfaError {
    #[snafu(display("Error opening file {path}"))]
    OpeningDump {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading line {lineno}"))]
    ReadingDump {
        source: std::io::Error,
        lineno: usize,
    },
    #[snafu(display("Line {lineno} is not a KEY:value line: {line:?}"))]
    MalformedLine { lineno: usize, line: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Could not understand the date {date:?} of a date correction"))]
    InvalidDateCorrection { date: String },
    #[snafu(display("Error writing {path}"))]
    CreatingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing CSV file {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
    #[snafu(display("No input: provide a configuration file or an input file"))]
    MissingInput {},
}

pub type RfaResult<T> = Result<T, RfaError>;

pub const AGREEMENTS_FILE: &str = "agreements.csv";
pub const ELECTIONS_FILE: &str = "elections.csv";
pub const CANDIDATES_FILE: &str = "candidates.csv";
pub const VOTERS_FILE: &str = "voters.csv";
pub const EVENTS_FILE: &str = "events.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// What the command line asks for. Anything given here wins over the configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunRequest {
    pub config: Option<String>,
    pub input: Option<String>,
    pub out: Option<String>,
    pub reference: Option<String>,
    pub parallel: bool,
}

/// Everything the run produced, before it gets written.
struct Analysis {
    num_records: usize,
    num_skipped: usize,
    elections: Vec<Election>,
    agreements: Vec<AgreementRecord>,
    election_summaries: Vec<ElectionSummary>,
    candidate_summaries: Vec<CandidateSummary>,
    voter_summaries: Vec<VoterSummary>,
}

fn load_config(request: &RunRequest) -> RfaResult<(RfaConfig, PathBuf)> {
    let (mut config, root) = match (&request.config, &request.input) {
        (Some(config_path), _) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        (None, Some(input)) => (RfaConfig::for_input(input.clone()), PathBuf::new()),
        (None, None) => return MissingInputSnafu {}.fail(),
    };
    // Command line paths are relative to the working directory, not to the config file.
    if let Some(input) = &request.input {
        config.input_settings.file_path = absolute_or_cwd(input);
    }
    if let Some(out) = &request.out {
        config.output_settings.output_directory = Some(absolute_or_cwd(out));
    }
    if request.parallel {
        config.engine.parallel = Some(true);
    }
    info!("config: {:?}", config);
    Ok((config, root))
}

fn absolute_or_cwd(p: &str) -> String {
    match std::env::current_dir() {
        Ok(cwd) => resolve_path(&cwd, p).display().to_string(),
        Err(_) => p.to_string(),
    }
}

fn analyze(config: &RfaConfig, root: &Path) -> RfaResult<Analysis> {
    let input_path = resolve_path(root, &config.input_settings.file_path);
    let parsed = io_dump::read_dump(&input_path)?;
    let mut events: Vec<VoteEvent> = parsed.iter().map(io_dump::type_vote).collect();
    io_dump::apply_date_corrections(&mut events, &config.date_corrections()?);

    let num_records = events.len();
    let mut num_skipped = 0;
    let mut builder = Builder::new();
    for (pv, event) in parsed.iter().zip(events) {
        if let Err(e) = builder.add_event(event) {
            warn!("analyze: line {}: skipping vote: {}", pv.lineno, e);
            num_skipped += 1;
        }
    }
    let elections = builder.build();
    info!(
        "analyze: {} votes, {} skipped, {} elections",
        num_records,
        num_skipped,
        elections.len()
    );

    let index = ElectionIndex::from_elections(&elections);
    let agreements = run_agreement_stats(&elections, &index, &config.agreement_rules());
    let election_summaries = summarize_elections(&elections);
    let candidate_summaries = summarize_candidates(&elections);
    let voter_summaries = summarize_voters(&elections, &index);
    Ok(Analysis {
        num_records,
        num_skipped,
        elections,
        agreements,
        election_summaries,
        candidate_summaries,
        voter_summaries,
    })
}

fn write_reports(config: &RfaConfig, out_dir: &Path, analysis: &Analysis) -> RfaResult<Vec<String>> {
    fs::create_dir_all(out_dir).context(CreatingOutputSnafu {
        path: out_dir.display().to_string(),
    })?;
    io_csv::write_agreements(&out_dir.join(AGREEMENTS_FILE), &analysis.agreements)?;
    io_csv::write_elections(&out_dir.join(ELECTIONS_FILE), &analysis.election_summaries)?;
    io_csv::write_candidates(&out_dir.join(CANDIDATES_FILE), &analysis.candidate_summaries)?;
    io_csv::write_voters(&out_dir.join(VOTERS_FILE), &analysis.voter_summaries)?;
    let mut written: Vec<String> = vec![
        AGREEMENTS_FILE.to_string(),
        ELECTIONS_FILE.to_string(),
        CANDIDATES_FILE.to_string(),
        VOTERS_FILE.to_string(),
    ];
    if config.write_events() {
        io_csv::write_events(
            &out_dir.join(EVENTS_FILE),
            &analysis.elections,
            config.strip_markup(),
        )?;
        written.push(EVENTS_FILE.to_string());
    }
    Ok(written)
}

fn build_summary_js(config: &RfaConfig, analysis: &Analysis, written: &[String]) -> JSValue {
    let with_agreement_before = analysis
        .agreements
        .iter()
        .filter(|r| r.total_before_a > 0 || r.total_before_b > 0)
        .count();
    json!({
        "input": simplify_file_name(&config.input_settings.file_path),
        "records": analysis.num_records,
        "skippedRecords": analysis.num_skipped,
        "elections": analysis.elections.len(),
        "candidates": analysis.candidate_summaries.len(),
        "voters": analysis.voter_summaries.len(),
        "agreementPairs": analysis.agreements.len(),
        "agreementPairsWithVotesBeforeOwnElection": with_agreement_before,
        "outputs": written,
    })
}

/// Compares the summary of the run with a reference summary, printing the differences.
fn check_reference(pretty_js_stats: &str, reference_path: String) -> RfaResult<()> {
    let contents =
        fs::read_to_string(&reference_path).context(OpeningJsonSnafu { path: reference_path })?;
    let summary_ref: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    Ok(())
}

/// Runs the whole analysis and returns the summary of the run.
pub fn run_analysis(request: &RunRequest) -> RfaResult<JSValue> {
    let (config, root) = load_config(request)?;
    let analysis = analyze(&config, &root)?;

    let out_dir = resolve_path(&root, config.output_directory());
    info!("Writing reports to {:?}", out_dir);
    let written = write_reports(&config, &out_dir, &analysis)?;

    let result_js = build_summary_js(&config, &analysis, &written);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    let summary_path = out_dir.join(SUMMARY_FILE);
    fs::write(&summary_path, &pretty_js_stats).context(CreatingOutputSnafu {
        path: summary_path.display().to_string(),
    })?;
    println!("{}", pretty_js_stats);

    if let Some(reference_path) = request.reference.clone() {
        check_reference(&pretty_js_stats, reference_path)?;
    }
    Ok(result_js)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Two elections for Cid and one for Ann, with an anonymous vote and a vote without target.
    const DUMP: &str = "SRC:Ann
TGT:Cid
VOT:1
RES:1
YEA:2008
DAT:10:00, 1 March 2008
TXT:'''Support''' [[WP:NOBIGDEAL]]

SRC:Bob
TGT:Cid
VOT:1
RES:1
YEA:2008
DAT:11:00, 2 March 2008
TXT:Per ''Ann''

SRC:
TGT:Cid
VOT:-1
RES:1
YEA:2008
DAT:12:00, 2 March 2008
TXT:anonymous

SRC:Bob
TGT:Ann
VOT:-1
RES:0
YEA:2009
DAT:10:00, 5 May 2009
TXT:Not yet -- sorry

SRC:Cid
TGT:Ann
VOT:1
RES:0
YEA:2009
DAT:10:30, 5 May 2009
TXT:

SRC:Dan
TGT:
VOT:1
RES:0
YEA:2009
DAT:
TXT:lost

SRC:Ann
TGT:Cid
VOT:0
RES:0
YEA:2010
DAT:09:00, 1 June 2010
TXT:

SRC:Bob
TGT:Cid
VOT:0
RES:0
YEA:2010
DAT:
TXT:
";

    // The directory is removed when the returned TempDir is dropped.
    fn setup(config: &str) -> (TempDir, RunRequest) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("votes.txt"), DUMP).unwrap();
        fs::write(dir.path().join("config.json"), config).unwrap();
        let request = RunRequest {
            config: Some(dir.path().join("config.json").display().to_string()),
            ..RunRequest::default()
        };
        (dir, request)
    }

    const CONFIG: &str = r#"{
        "inputSettings": {"filePath": "votes.txt", "applyKnownDateCorrections": false},
        "outputSettings": {"outputDirectory": "out"}
    }"#;

    #[test]
    fn full_run() {
        let (dir, request) = setup(CONFIG);
        let js = run_analysis(&request).unwrap();
        assert_eq!(js["records"], 8);
        assert_eq!(js["skippedRecords"], 1);
        assert_eq!(js["elections"], 3);
        assert_eq!(js["candidates"], 2);
        assert_eq!(js["voters"], 3);
        assert_eq!(js["agreementPairs"], 2);

        let out = dir.path().join("out");
        let agreements = fs::read_to_string(out.join(AGREEMENTS_FILE)).unwrap();
        let lines: Vec<&str> = agreements.lines().collect();
        assert_eq!(
            lines,
            vec![
                "voterA,voterB,totalVotes,agreed,totalBeforeA,totalBeforeB,agreedBeforeA,agreedBeforeB,agreementRatio,agreementRatioBeforeA,agreementRatioBeforeB",
                // Ann runs in May 2009: only her 2008 vote counts as before.
                "Ann,Bob,2,2,1,0,1,0,1,1,NaN",
                // Cid ran in March 2008, before voting for Ann.
                "Bob,Cid,1,0,0,0,0,0,0,NaN,NaN",
            ]
        );

        let events = fs::read_to_string(out.join(EVENTS_FILE)).unwrap();
        assert!(events.contains("Support "));
        assert!(!events.contains("'''"));
        assert!(events.contains("Not yet   sorry"));
        assert!(out.join(SUMMARY_FILE).exists());

        // Elections are numbered from 1.
        let elections = fs::read_to_string(out.join(ELECTIONS_FILE)).unwrap();
        let ids: Vec<&str> = elections
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(events.lines().nth(1).unwrap().starts_with("1,Ann,Cid,"));
    }

    #[test]
    fn parallel_run_gives_the_same_reports() {
        let (dir, mut request) = setup(CONFIG);
        run_analysis(&request).unwrap();
        let sequential = fs::read_to_string(dir.path().join("out").join(AGREEMENTS_FILE)).unwrap();
        request.parallel = true;
        request.out = Some(dir.path().join("out_par").display().to_string());
        run_analysis(&request).unwrap();
        let parallel =
            fs::read_to_string(dir.path().join("out_par").join(AGREEMENTS_FILE)).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn reference_summary() {
        let (dir, mut request) = setup(CONFIG);
        run_analysis(&request).unwrap();
        let summary = dir.path().join("out").join(SUMMARY_FILE);
        request.reference = Some(summary.display().to_string());
        assert!(run_analysis(&request).is_ok());

        let bad = dir.path().join("bad_summary.json");
        fs::write(&bad, r#"{"records": 1}"#).unwrap();
        request.reference = Some(bad.display().to_string());
        assert!(matches!(
            run_analysis(&request),
            Err(RfaError::ReferenceMismatch {})
        ));
    }

    #[test]
    fn input_without_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("votes.txt"), DUMP).unwrap();
        let request = RunRequest {
            input: Some(dir.path().join("votes.txt").display().to_string()),
            out: Some(dir.path().join("plain").display().to_string()),
            ..RunRequest::default()
        };
        let js = run_analysis(&request).unwrap();
        assert_eq!(js["input"], "votes.txt");
        assert!(dir.path().join("plain").join(VOTERS_FILE).exists());
    }

    #[test]
    fn missing_input() {
        assert!(matches!(
            run_analysis(&RunRequest::default()),
            Err(RfaError::MissingInput {})
        ));
    }

    #[test]
    fn missing_dump() {
        let (_dir, request) = setup(r#"{"inputSettings": {"filePath": "nowhere.txt"}}"#);
        assert!(matches!(
            run_analysis(&request),
            Err(RfaError::OpeningDump { .. })
        ));
    }
}
