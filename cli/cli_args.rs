use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "repox",
    author,
    version,
    about = "Convert repository structure and contents to a text artifact.",
    long_about = "repox walks a repository, applies gitignore-style ignore rules, include \nglobs and an optional path regex, transforms recognized source files \n(interface extraction, normalization, import listing), and renders the \nresult as a repo map, flat concatenation, or import list.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  repox . -i '*.lock' -i 'target/'\n  repox ../project -p imports -s import_list -o stdout\n  repox . -r '*.py' --path-pattern '^src/'"
)]
pub struct Cli {
    #[arg(value_name = "REPO_PATH", default_value = ".", help = "Input directory path.")]
    pub repo_path: PathBuf,

    #[arg(
        short = 'i',
        long = "ignore-pattern",
        value_name = "PATTERN",
        action = clap::ArgAction::Append,
        help = "Pattern to ignore, in gitignore format - can be repeated.",
        help_heading = "Filtering"
    )]
    pub ignore_patterns: Vec<String>,

    #[arg(
        short = 'r',
        long = "include-pattern",
        value_name = "PATTERN",
        action = clap::ArgAction::Append,
        help = "Glob pattern files must match to be included - can be repeated.",
        help_heading = "Filtering"
    )]
    pub include_patterns: Vec<String>,

    #[arg(
        long = "path-pattern",
        value_name = "REGEX",
        help = "Regex that repo-relative paths must additionally match.",
        help_heading = "Filtering"
    )]
    pub path_pattern: Option<String>,

    #[arg(
        short = 'p',
        long = "rule",
        value_name = "RULE",
        value_parser = ["raw-content", "interface", "integral", "imports"],
        help = "Processing rule applied to recognized source files.",
        help_heading = "Processing"
    )]
    pub rule: Option<String>,

    #[arg(
        short = 's',
        long = "output-style",
        value_name = "STYLE",
        value_parser = ["repo_map", "flat", "import_list"],
        help = "One of: repo_map, flat (contents only), or import_list (for --rule imports).",
        help_heading = "Output"
    )]
    pub output_style: Option<String>,

    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        help = "Output directory. Use 'stdout' to print to the console.",
        help_heading = "Output"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        short = 'n',
        long = "output-filename",
        value_name = "NAME",
        help = "Output filename.",
        help_heading = "Output"
    )]
    pub output_filename: Option<String>,

    #[arg(
        long = "config-file",
        value_name = "PATH",
        conflicts_with = "no_config_file",
        help = "Path of the TOML config file (default: repox.toml in the repo root).",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<PathBuf>,

    #[arg(
        long = "no-config-file",
        conflicts_with = "config_file",
        help = "Disable loading any TOML config file.",
        help_heading = "Project Setup"
    )]
    pub no_config_file: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence informational messages and warnings.")]
    pub quiet: bool,
}
