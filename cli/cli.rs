mod cli_args;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::Path;
use std::process;

use cli_args::Cli;
use repox_core::{AppError, Config, OutputStyle, OutputTarget, ProcessingRule, RepoxProcessor};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;
    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Conversion finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = match e.downcast_ref::<AppError>() {
                Some(AppError::Config(_)) | Some(AppError::TomlParse(_)) => 1,
                Some(AppError::Io(_))
                | Some(AppError::FileRead { .. })
                | Some(AppError::FileWrite { .. })
                | Some(AppError::DirCreation { .. })
                | Some(AppError::WalkDir(_))
                | Some(AppError::Ignore(_))
                | Some(AppError::Glob(_)) => 2,
                Some(AppError::NoFilesFound { .. }) => 3,
                Some(AppError::InvalidArgument(_)) | Some(AppError::PathPattern(_)) => 5,
                Some(_) => 1,
                None => 1,
            };

            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Conversion failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(args: Cli, quiet: bool) -> Result<()> {
    let repo_path = args
        .repo_path
        .canonicalize()
        .with_context(|| format!("Repo path '{}' does not exist", args.repo_path.display()))?;
    if !repo_path.is_dir() {
        anyhow::bail!(AppError::Config(format!(
            "Repo path '{}' is not a directory",
            repo_path.display()
        )));
    }
    log::info!("Repository root resolved: {}", repo_path.display());

    let config = load_config(&repo_path, &args)?;

    let target = if config.is_stdout() {
        OutputTarget::Stdout
    } else {
        OutputTarget::File(config.output.dir.join(&config.output.filename))
    };

    let processor = RepoxProcessor::new(&repo_path, &config)
        .context("Failed to prepare repository conversion")?;
    processor
        .execute(&target)
        .context("Failed to convert repository")?;

    if let OutputTarget::File(path) = &target {
        if !quiet {
            println!(
                "{} Output saved to: {}",
                "✅".green(),
                path.display().to_string().blue()
            );
        }
    }
    Ok(())
}

// Config file values fill in whatever the CLI left unset; explicit flags win.
fn load_config(repo_root: &Path, args: &Cli) -> Result<Config> {
    let config_path =
        Config::resolve_config_path(repo_root, args.config_file.as_ref(), args.no_config_file)
            .context("Failed to resolve configuration path")?;

    let mut config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if !args.ignore_patterns.is_empty() {
        config.filter.ignore_patterns = args.ignore_patterns.clone();
    }
    if !args.include_patterns.is_empty() {
        config.filter.include_patterns = args.include_patterns.clone();
    }
    if let Some(pattern) = &args.path_pattern {
        config.filter.path_pattern = Some(pattern.clone());
    }
    if let Some(rule) = &args.rule {
        config.processing.rule = rule
            .parse()
            .map_err(|e: String| AppError::InvalidArgument(e))?;
    }
    if let Some(style) = &args.output_style {
        config.output.style = style
            .parse()
            .map_err(|e: String| AppError::InvalidArgument(e))?;
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(filename) = &args.output_filename {
        config.output.filename = filename.clone();
    }

    if config.output.style == OutputStyle::ImportList
        && config.processing.rule != ProcessingRule::Imports
    {
        log::warn!(
            "Output style 'import_list' is only meaningful with --rule imports (current rule: {})",
            config.processing.rule
        );
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_config_file_values() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("repox.toml"),
            "[processing]\nrule = \"integral\"\n\n[output]\nstyle = \"flat\"\ndir = \"from-config\"\n",
        )
        .unwrap();
        let args = Cli::parse_from(["repox", ".", "-p", "imports", "-o", "stdout"]);
        let config = load_config(dir.path(), &args).unwrap();
        assert_eq!(config.processing.rule, ProcessingRule::Imports);
        assert_eq!(config.output.style, OutputStyle::Flat);
        assert!(config.is_stdout());
    }

    #[test]
    fn defaults_apply_without_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = Cli::parse_from(["repox"]);
        let config = load_config(dir.path(), &args).unwrap();
        assert_eq!(config.processing.rule, ProcessingRule::Interface);
        assert_eq!(config.output.style, OutputStyle::RepoMap);
        assert_eq!(config.output.dir, std::path::PathBuf::from("results"));
        assert_eq!(config.output.filename, "repo-to-text.txt");
    }

    #[test]
    fn no_config_file_flag_skips_loading() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("repox.toml"), "[processing]\nrule = \"imports\"\n")
            .unwrap();
        let args = Cli::parse_from(["repox", "--no-config-file"]);
        let config = load_config(dir.path(), &args).unwrap();
        assert_eq!(config.processing.rule, ProcessingRule::Interface);
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = Cli::parse_from(["repox", "--config-file", "absent.toml"]);
        assert!(load_config(dir.path(), &args).is_err());
    }
}
