use clap::Parser;
use log::{debug, LevelFilter};
use std::error::Error;

mod args;
mod rfa;

use crate::args::Args;
use crate::rfa::RunRequest;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", args);

    let request = RunRequest {
        config: args.config,
        input: args.input,
        out: args.out,
        reference: args.reference,
        parallel: args.parallel,
    };

    if let Err(e) = rfa::run_analysis(&request) {
        eprintln!("An error occured: {}", e);
        let mut source = e.source();
        while let Some(s) = source {
            eprintln!("  caused by: {}", s);
            source = s.source();
        }
        std::process::exit(1);
    }
}
