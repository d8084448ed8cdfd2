use clap::Parser;

/// Agreement and career statistics for the Wikipedia Requests for Adminship vote logs.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration of the run. See the manual of the
    /// voter_agreement crate for the format of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) The vote dump to analyze. Setting this option overrides the path that
    /// may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (directory path, optional) Where the reports are written. Setting this option overrides
    /// the directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the JSON summary of a run. If provided, rfastats will
    /// check that the summary of this run matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, the voter pairs are counted on all the available cores.
    #[clap(long, takes_value = false)]
    pub parallel: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
