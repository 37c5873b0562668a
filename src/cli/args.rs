use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "section-grades",
    version,
    about = "Marks and grade-distribution report for one class section"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a marks sheet and write the HTML report and companion files
    Run(RunArgs),
    /// Print the summary for a marks sheet without writing any files
    Summary(SummaryArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Sheet with `Total` and `Grade` columns: .xlsx, or CSV/semicolon/tab text, optionally .gz
    pub marks: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    /// Defaults to the input file name without extensions
    #[arg(long)]
    pub section_name: Option<String>,

    /// Ignored for .xlsx workbooks
    #[arg(long, value_enum, default_value_t = DelimiterArg::Auto)]
    pub delimiter: DelimiterArg,

    /// Limit the data preview to the first N rows
    #[arg(long)]
    pub preview_rows: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub no_zip: bool,

    #[arg(long, default_value_t = false)]
    pub export_latex: bool,
}

#[derive(Parser)]
pub struct SummaryArgs {
    pub marks: PathBuf,

    #[arg(long, value_enum, default_value_t = DelimiterArg::Auto)]
    pub delimiter: DelimiterArg,

    /// Print the statistics as JSON instead of the narrative
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DelimiterArg {
    #[value(name = "auto")]
    Auto,
    #[value(name = "comma")]
    Comma,
    #[value(name = "semicolon")]
    Semicolon,
    #[value(name = "tab")]
    Tab,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["section-grades", "run", "7B.csv", "--out", "out"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.marks, PathBuf::from("7B.csv"));
                assert!(matches!(args.delimiter, DelimiterArg::Auto));
                assert!(args.preview_rows.is_none());
                assert!(!args.no_zip);
                assert!(!args.export_latex);
            }
            Commands::Summary(_) => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_requires_out() {
        assert!(Cli::try_parse_from(["section-grades", "run", "7B.csv"]).is_err());
    }

    #[test]
    fn test_parse_summary_json() {
        let cli = Cli::try_parse_from([
            "section-grades",
            "summary",
            "7B.tsv",
            "--delimiter",
            "tab",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Summary(args) => {
                assert!(args.json);
                assert!(matches!(args.delimiter, DelimiterArg::Tab));
            }
            Commands::Run(_) => panic!("expected summary"),
        }
    }
}
