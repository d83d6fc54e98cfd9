use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tscat::config::get_default_exclusions;
use tscat::parse::collect_ts_files;
use tscat::{
    prune, run_check, run_search, run_stats, PruneOptions, ReferenceTreeBuilder, SearchQuery,
    Settings, SimpleFormatter, TreeFormatter, Translator, TsParser, TsWriter,
};

/// tscat - inspect, check and maintain Qt Linguist TS catalogs
#[derive(Parser, Debug)]
#[command(name = "tscat")]
#[command(author, version, about, long_about = None)]
#[command(help_template = "{name} {version}\n{about}\n\nUSAGE:\n    {usage}\n\n{all-args}")]
struct Cli {
    /// Print debug logging and skipped files
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (default: nearest .tscat.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find messages whose source or translation contains TEXT
    Search {
        #[arg(value_name = "TEXT")]
        text: String,

        /// File or directory to search (default: current directory)
        #[arg(long, value_name = "DIR")]
        path: Option<PathBuf>,

        #[arg(short, long)]
        case_sensitive: bool,

        /// Treat TEXT as a regular expression
        #[arg(short, long)]
        regex: bool,

        /// One match per line: file:line:context: 'source' => 'translation'
        #[arg(long, conflicts_with = "json")]
        simple: bool,

        #[arg(long)]
        json: bool,
    },
    /// Validate catalogs; exits with 1 when any error is found
    Check {
        /// TS files or directories containing them
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Rule id to skip (repeatable)
        #[arg(long, value_name = "RULE")]
        disable: Vec<String>,

        #[arg(long)]
        json: bool,
    },
    /// Completion statistics per context
    Stats {
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        #[arg(long)]
        json: bool,
    },
    /// Translate one string the way the Qt runtime would
    Lookup {
        file: PathBuf,

        #[arg(long)]
        context: String,

        #[arg(long)]
        source: String,

        /// Disambiguation comment
        #[arg(long)]
        comment: Option<String>,

        /// Count for plural messages
        #[arg(short = 'n', long = "count", value_name = "N")]
        count: Option<u64>,
    },
    /// Rewrite a catalog in canonical lupdate layout
    Fmt {
        file: PathBuf,

        /// Write here instead of in place
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
    /// Remove obsolete messages and empty contexts
    Prune {
        file: PathBuf,

        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Also drop unfinished messages without a translation
        #[arg(long)]
        drop_unfinished: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    match cli.command {
        Commands::Search {
            text,
            path,
            case_sensitive,
            regex,
            simple,
            json,
        } => {
            if text.trim().is_empty() {
                bail!("search text cannot be empty");
            }
            let base_dir = path.unwrap_or_else(|| current_dir.clone());
            let settings =
                Settings::discover(cli.config.as_deref(), &settings_dir(&base_dir))?;

            let query = SearchQuery::new(text)
                .with_base_dir(base_dir)
                .with_case_sensitive(case_sensitive)
                .with_regex(regex)
                .with_exclusions(settings.search.exclusions)
                .with_verbose(cli.verbose)
                .with_quiet(simple || json);
            let result = run_search(query)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result.translation_entries)?);
            } else if simple {
                print!("{}", SimpleFormatter::new().format(&result));
            } else if result.translation_entries.is_empty() {
                println!("No matches found for '{}'", result.query);
            } else {
                let tree = ReferenceTreeBuilder::build(&result);
                print!("{}", TreeFormatter::new().format(&tree));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            files,
            disable,
            json,
        } => {
            // Settings belong to the catalogs' project, not to wherever tscat runs from
            let start_dir = files
                .first()
                .map(|f| settings_dir(f))
                .unwrap_or_else(|| current_dir.clone());
            let mut settings = Settings::discover(cli.config.as_deref(), &start_dir)?;
            settings.check.disabled.extend(disable);

            let files = expand_files(&files)?;
            let report = run_check(&files, &settings.check)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", SimpleFormatter::new().format_report(&report));
                if report.has_errors() {
                    eprintln!("{}", "check failed".red());
                } else {
                    eprintln!("{}", "check passed".green());
                }
            }

            Ok(if report.has_errors() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Stats { files, json } => {
            let files = expand_files(&files)?;
            let stats = run_stats(&files)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", SimpleFormatter::new().format_stats(&stats));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Lookup {
            file,
            context,
            source,
            comment,
            count,
        } => {
            let catalog = TsParser::parse_file(&file)?;
            let translator = Translator::new(&catalog);
            let text = match count {
                Some(n) => translator.translate_plural(&context, &source, comment.as_deref(), n),
                None => translator.translate(&context, &source, comment.as_deref()),
            };
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Fmt { file, output } => {
            let catalog = TsParser::parse_file(&file)?;
            let target = output.unwrap_or(file);
            TsWriter::write_file(&catalog, &target)
                .with_context(|| format!("writing {}", target.display()))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Prune {
            file,
            output,
            drop_unfinished,
        } => {
            let mut catalog = TsParser::parse_file(&file)?;
            let summary = prune(
                &mut catalog,
                PruneOptions {
                    drop_untranslated: drop_unfinished,
                },
            );
            let target = output.unwrap_or(file);
            TsWriter::write_file(&catalog, &target)
                .with_context(|| format!("writing {}", target.display()))?;
            eprintln!(
                "Removed {} message{} and {} context{}",
                summary.removed_messages,
                if summary.removed_messages == 1 { "" } else { "s" },
                summary.removed_contexts,
                if summary.removed_contexts == 1 { "" } else { "s" },
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Directory where `.tscat.toml` discovery starts for a file or directory argument
fn settings_dir(path: &Path) -> PathBuf {
    if path.is_file() {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    } else {
        path.to_path_buf()
    }
}

/// Replace directory arguments by the TS files below them
fn expand_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let exclusions: Vec<String> = get_default_exclusions(tscat::config::ProjectType::Generic)
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(collect_ts_files(path, &exclusions));
        } else if path.exists() {
            files.push(path.clone());
        } else {
            bail!("{} does not exist", path.display());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_with_disabled_rules() {
        let cli = Cli::try_parse_from([
            "tscat",
            "check",
            "fr.ts",
            "--disable",
            "accelerator",
            "--disable",
            "place-marker",
        ])
        .unwrap();
        match cli.command {
            Commands::Check { files, disable, .. } => {
                assert_eq!(files, vec![PathBuf::from("fr.ts")]);
                assert_eq!(disable, vec!["accelerator", "place-marker"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_simple_and_json_conflict() {
        assert!(Cli::try_parse_from(["tscat", "search", "fit", "--simple", "--json"]).is_err());
    }

    #[test]
    fn test_expand_files_walks_directories() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("app_fr.ts"),
            "<?xml version=\"1.0\"?>\n<!DOCTYPE TS>\n<TS version=\"2.1\"></TS>\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a catalog").unwrap();

        let files = expand_files(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files, vec![dir.path().join("app_fr.ts")]);
    }

    #[test]
    fn test_settings_dir_of_file_is_its_parent() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("app_fr.ts");
        fs::write(&file, "<TS version=\"2.1\"></TS>\n").unwrap();

        assert_eq!(settings_dir(&file), dir.path());
        assert_eq!(settings_dir(dir.path()), dir.path());
    }

    #[test]
    fn test_expand_files_missing_path() {
        assert!(expand_files(&[PathBuf::from("/nonexistent/fr.ts")]).is_err());
    }
}
