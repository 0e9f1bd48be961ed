use clap::Parser;

/// This is an election counting program: it validates the responses to a question and counts them.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election description in JSON.
    /// For more information about the file format, read the documentation of election_count::manual
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the text report of an election. If provided, efcount will
    /// check that the printed report matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the ballots are read from this file instead of the sources listed
    /// in the configuration. Without a configuration, the ballots are counted by instant runoff.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or json.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
