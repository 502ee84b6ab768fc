use clap::{Parser, Subcommand};

/// This is a meeting poll: participants vote on time slots, the poll ranks them.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON description of the poll: title, days, times,
    /// admin secret. When omitted, the built-in default poll is used.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) The vote database. Defaults to the path named in the
    /// poll description, or poll_data.sqlite in the current directory.
    #[clap(short, long, value_parser)]
    pub database: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Record a vote, or overwrite the existing vote of the same participant.
    Vote {
        /// The participant name. Names are unique per poll, ignoring case.
        #[clap(short, long, value_parser)]
        name: String,

        /// (optional) A contact email, stored with the vote.
        #[clap(short, long, value_parser)]
        email: Option<String>,

        /// A first-choice slot identifier ("Mo 10.02. 16:30"). Repeat the flag
        /// for every slot.
        #[clap(short, long, value_parser)]
        primary: Vec<String>,

        /// An acceptable-fallback slot identifier. Repeat the flag for every slot.
        #[clap(short, long, value_parser)]
        secondary: Vec<String>,
    },

    /// Tabulate all votes and print a JSON summary.
    Results {
        /// Requests the admin view (slot ranking and voter listing). Pass the
        /// shared secret as a value; when the poll has no secret configured,
        /// the bare flag is enough.
        #[clap(long, value_parser)]
        admin: Option<Option<String>>,

        /// (file path, 'stdout' or empty) If specified, the summary is written to
        /// the given location instead of the standard output.
        #[clap(short, long, value_parser)]
        out: Option<String>,

        /// (file path) A reference summary in JSON format. If provided, termpoll
        /// will check that the tabulated output matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },

    /// Print the stored vote of one participant.
    Show {
        /// The participant name (matched ignoring case).
        #[clap(short, long, value_parser)]
        name: String,
    },
}
