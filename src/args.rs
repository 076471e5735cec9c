use clap::Parser;

/// This is a program to draw random winners from a list of participants.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A draw plan in JSON format, describing the participant sources, the draws and the
    /// outputs. For more information about the file format, read the documentation of the draw_ledger manual.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path or URL) The list of participants. Setting this option overrides the sources that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv, xlsx or gsheet) The type of the input. By default, it is guessed from the file extension,
    /// and URLs are read as Google Sheets.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 1) The number of winners of each draw.
    #[clap(short = 'n', long, value_parser)]
    pub count: Option<usize>,

    /// (repeatable) The name of a draw. One draw is made for each name, in order. Setting this option
    /// overrides the draws that may be specified with the --config option.
    #[clap(long, value_parser)]
    pub name: Option<Vec<String>>,

    /// If passed as an argument, the winners of the previous draws cannot win again.
    #[clap(long, takes_value = false)]
    pub exclude_previous: bool,

    /// (directory, 'stdout' or empty) If specified, the result files are written in this directory.
    /// With 'stdout', all the winners are printed in CSV format. Setting this option overrides the directory
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (csv or xlsx) The format of the result files. By default, Excel inputs produce Excel files and
    /// other inputs produce CSV files.
    #[clap(long, value_parser)]
    pub format: Option<String>,

    /// (number, optional) Seeds the random generator, which makes a run repeatable.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
