use clap::Parser;
use snafu::ErrorCompat;

mod args;
mod poll;

use crate::args::{Args, Command};

fn main() {
    let args = Args::parse();
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    let res = match args.command {
        Command::Vote {
            ref name,
            ref email,
            ref primary,
            ref secondary,
        } => poll::run_vote(
            &args.config,
            &args.database,
            name,
            email.as_deref(),
            primary,
            secondary,
        ),
        Command::Results {
            ref admin,
            ref out,
            ref reference,
        } => poll::run_results(&args.config, &args.database, admin, out, reference),
        Command::Show { ref name } => poll::run_show(&args.config, &args.database, name),
    };

    if let Err(e) = res {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
