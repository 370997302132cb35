//! File discovery and rewriting for the linemark CLI

use anyhow::{Context, Result, bail};
use colored::*;
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use linemark_lib::annotator::{Annotation, Annotator};
use linemark_lib::config::Config;
use memmap2::Mmap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Threshold for using memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// File extensions treated as rendered HTML output
const HTML_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];

/// Expands directory-style patterns to also match files within them.
/// Pattern "dir/path" becomes ["dir/path", "dir/path/**"] to match both
/// the directory itself and all contents recursively.
///
/// Patterns containing glob characters (*, ?, [) are returned unchanged.
fn expand_directory_pattern(pattern: &str) -> Vec<String> {
    if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
        return vec![pattern.to_string()];
    }

    let base = pattern.trim_end_matches('/');
    vec![
        base.to_string(),     // Match the directory itself
        format!("{base}/**"), // Match everything underneath
    ]
}

/// First exclude pattern matching `path`, if any.
fn matching_exclude<'a>(path: &str, patterns: &'a [String]) -> Option<&'a str> {
    patterns.iter().find_map(|pattern| {
        let glob = globset::Glob::new(pattern).ok()?;
        glob.compile_matcher().is_match(path).then_some(pattern.as_str())
    })
}

fn is_html_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| HTML_EXTENSIONS.iter().any(|h| ext.eq_ignore_ascii_case(h)))
}

/// Efficiently read file content using memory mapping for large files
pub fn read_file_efficiently(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).with_context(|| format!("Failed to stat file {}", path.display()))?;

    if metadata.len() > MMAP_THRESHOLD {
        let file = fs::File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;
        // SAFETY: the mapping is read immediately and not kept; concurrent
        // truncation of site output during a build is not a supported mode.
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to mmap file {}", path.display()))?;
        String::from_utf8(mmap.to_vec()).with_context(|| format!("Invalid UTF-8 in file {}", path.display()))
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
    }
}

/// Discover the files to process.
///
/// Include patterns: CLI > config (discovery mode only) > default HTML
/// extensions (discovery mode only). Exclude patterns: CLI > config, unless
/// `--no-exclude`. Explicitly passed file paths bypass the extension filter
/// but are still checked against exclude patterns.
pub fn find_files(paths: &[String], args: &crate::ProcessArgs, config: &Config) -> Result<Vec<String>> {
    let first_path = paths.first().cloned().unwrap_or_else(|| ".".to_string());
    let mut walk_builder = WalkBuilder::new(&first_path);
    for path in paths.iter().skip(1) {
        walk_builder.add(path);
    }

    let is_discovery_mode = paths.is_empty() || paths == ["."];
    let has_explicit_cli_include = args.include.is_some();

    // Restrict the walk to HTML output unless --include takes over
    if !has_explicit_cli_include {
        let mut types_builder = ignore::types::TypesBuilder::new();
        for ext in HTML_EXTENSIONS {
            types_builder.add("html", &format!("*.{ext}"))?;
        }
        types_builder.select("html");
        walk_builder.types(types_builder.build()?);
    }

    let final_include_patterns: Vec<String> = if let Some(cli_include) = args.include.as_deref() {
        cli_include
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    } else if is_discovery_mode && !config.global.include.is_empty() {
        config.global.include.clone()
    } else {
        Vec::new()
    };

    let final_exclude_patterns: Vec<String> = if args.no_exclude {
        Vec::new()
    } else if let Some(cli_exclude) = args.exclude.as_deref() {
        cli_exclude
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .flat_map(|p| expand_directory_pattern(&p))
            .collect()
    } else {
        config
            .global
            .exclude
            .iter()
            .flat_map(|p| expand_directory_pattern(p))
            .collect()
    };

    if args.verbose {
        log::debug!("Exclude patterns: {final_exclude_patterns:?}");
    }

    if !final_include_patterns.is_empty() || !final_exclude_patterns.is_empty() {
        let mut override_builder = OverrideBuilder::new(".");

        for pattern in &final_include_patterns {
            if let Err(e) = override_builder.add(pattern) {
                eprintln!("Warning: Invalid include pattern '{pattern}': {e}");
            }
        }

        // Exclude patterns must start with '!' for ignore crate overrides
        for pattern in &final_exclude_patterns {
            let exclude_rule = if pattern.starts_with('!') {
                pattern.clone()
            } else {
                format!("!{pattern}")
            };
            if let Err(e) = override_builder.add(&exclude_rule) {
                eprintln!("Warning: Invalid exclude pattern '{pattern}': {e}");
            }
        }

        match override_builder.build() {
            Ok(overrides) => {
                walk_builder.overrides(overrides);
            }
            Err(e) => {
                eprintln!("Error building path overrides: {e}");
            }
        }
    }

    // CLI wins over the config file, which defaults to respecting gitignore
    let use_gitignore = args.respect_gitignore.unwrap_or(config.global.respect_gitignore);
    walk_builder.ignore(use_gitignore);
    walk_builder.git_ignore(use_gitignore);
    walk_builder.git_global(use_gitignore);
    walk_builder.git_exclude(use_gitignore);
    walk_builder.parents(use_gitignore);
    walk_builder.hidden(false);
    walk_builder.require_git(false);

    let mut files = BTreeSet::new();

    // Explicit file paths skip the type filter, but exclude patterns still
    // apply so the CLI config and any pre-commit config stay in agreement.
    if !is_discovery_mode {
        for path_str in paths {
            let path = Path::new(path_str);
            if !path.exists() {
                bail!("File not found: {path_str}");
            }
            if path.is_file() {
                if let Some(pattern) = matching_exclude(path_str, &final_exclude_patterns) {
                    eprintln!(
                        "warning: {path_str} ignored because of exclude pattern '{pattern}'. Use --no-exclude to override"
                    );
                } else {
                    files.insert(path_str.clone());
                }
            }
        }
    }

    for result in walk_builder.build() {
        match result {
            Ok(entry) => {
                if entry.file_type().is_some_and(|t| t.is_file()) {
                    let path = entry.path().to_string_lossy().to_string();
                    if has_explicit_cli_include || is_html_file(&path) {
                        files.insert(path);
                    }
                }
            }
            Err(e) => log::warn!("Error walking directory: {e}"),
        }
    }

    Ok(files.into_iter().collect())
}

/// What happened to one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: String,
    pub changed: bool,
    pub annotations: Vec<Annotation>,
}

/// Aggregated results across all files.
#[derive(Debug, Default)]
pub struct Summary {
    pub files_processed: usize,
    pub files_changed: usize,
    pub blocks_annotated: usize,
    pub lines_marked: usize,
    pub errors: usize,
}

pub fn process_file(
    path: &str,
    annotators: &[Box<dyn Annotator>],
    config: &Config,
    write: bool,
) -> Result<FileOutcome> {
    let content = read_file_efficiently(Path::new(path))?;
    let outcome = linemark_lib::process_content(&content, annotators, &config.markup)?;

    if outcome.changed && write {
        fs::write(path, &outcome.content).with_context(|| format!("Failed to write file {path}"))?;
    }

    Ok(FileOutcome {
        path: path.to_string(),
        changed: outcome.changed,
        annotations: outcome.annotations,
    })
}

fn report_file(outcome: &FileOutcome, write: bool, quiet: bool) {
    if quiet {
        return;
    }
    for annotation in &outcome.annotations {
        let action = if write { "marked" } else { "would mark" };
        println!(
            "{}:{}: {} {} {} line(s)",
            outcome.path.blue().underline(),
            annotation.line.to_string().cyan(),
            format!("[{}]", annotation.annotator).yellow(),
            action,
            annotation.lines_marked
        );
    }
}

/// Process every file, in parallel when the `parallel` feature is enabled.
pub fn process_files(
    files: &[String],
    annotators: &[Box<dyn Annotator>],
    config: &Config,
    write: bool,
    verbose: bool,
    quiet: bool,
    silent: bool,
) -> Summary {
    #[cfg(feature = "parallel")]
    let results: Vec<Result<FileOutcome>> = {
        use rayon::prelude::*;
        files
            .par_iter()
            .map(|path| process_file(path, annotators, config, write))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<FileOutcome>> = files
        .iter()
        .map(|path| process_file(path, annotators, config, write))
        .collect();

    let mut summary = Summary::default();
    for result in results {
        match result {
            Ok(outcome) => {
                summary.files_processed += 1;
                if outcome.changed {
                    summary.files_changed += 1;
                }
                summary.blocks_annotated += outcome.annotations.len();
                summary.lines_marked += outcome.annotations.iter().map(|a| a.lines_marked).sum::<usize>();
                if verbose {
                    report_file(&outcome, write, quiet);
                }
            }
            Err(e) => {
                summary.errors += 1;
                if !silent {
                    eprintln!("{}: {e:#}", "Error".red().bold());
                }
            }
        }
    }
    summary
}
