//! Headless front end: apply command-line requests to the state and print the folder view

use anyhow::{bail, Context, Result};
use app_core::{AppState, FileHandle, NavigationOutcome, Route, UploadStatus};
use app_fs::{breadcrumbs, Item};
use chrono::Utc;

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
pub struct Args {
    /// Route URL, e.g. "/file-manager-dashboard?folder=documents"
    pub route: Option<String>,
    pub mkdir: Option<String>,
    pub uploads: Vec<FileHandle>,
    pub search: Option<String>,
    pub json: bool,
}

impl Args {
    pub const USAGE: &'static str = "usage: file_deck [ROUTE] [--mkdir NAME] [--upload NAME:BYTES]... [--search QUERY] [--json]";

    pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--mkdir" => parsed.mkdir = Some(args.next().context("--mkdir needs a name")?),
                "--search" => parsed.search = Some(args.next().context("--search needs a query")?),
                "--upload" => {
                    let spec = args.next().context("--upload needs NAME:BYTES")?;
                    parsed.uploads.push(parse_upload(&spec)?);
                }
                "--json" => parsed.json = true,
                flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, Self::USAGE),
                route if parsed.route.is_none() => parsed.route = Some(route.to_string()),
                extra => bail!("unexpected argument {}\n{}", extra, Self::USAGE),
            }
        }

        Ok(parsed)
    }
}

fn parse_upload(spec: &str) -> Result<FileHandle> {
    let (name, size) = spec
        .rsplit_once(':')
        .with_context(|| format!("expected NAME:BYTES, got {}", spec))?;
    let size = size
        .parse()
        .with_context(|| format!("invalid size in {}", spec))?;
    Ok(FileHandle::new(name, size))
}

pub async fn run(state: &mut AppState, args: Args) -> Result<()> {
    if let Some(url) = &args.route {
        let route = Route::parse(url)?;
        if let NavigationOutcome::FellBackToRoot { requested } = state.navigate(route) {
            eprintln!("Folder /{} does not exist, showing the root folder", requested);
        }
    }

    if let Some(name) = &args.mkdir {
        let id = state.create_folder(name, Utc::now())?;
        tracing::info!("Created folder {} ({})", name, id);
    }

    if !args.uploads.is_empty() {
        upload(state, args.uploads).await?;
    }

    if let Some(query) = &args.search {
        state.submit_search(query)?;
    }

    if args.json {
        print_json(state)
    } else {
        print_listing(state);
        Ok(())
    }
}

async fn upload(state: &mut AppState, files: Vec<FileHandle>) -> Result<()> {
    let report = state.upload(files)?;
    for error in &report.rejected {
        eprintln!("rejected {} ({:?}): {}", error.file_name, error.kind, error.detail);
    }
    for (from, to) in &report.renamed {
        println!("{} will be stored as {}", from, to);
    }

    state.uploads().settle().await;

    for entry in state.uploads().entries() {
        match entry.status {
            UploadStatus::Completed => println!("uploaded {} ({})", entry.name, format_size(entry.size)),
            _ => println!(
                "failed   {} at {}%: {}",
                entry.name,
                entry.progress,
                entry.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    if let Some(rate) = state.uploads().rate() {
        println!("average {}/s", format_size(rate.bytes_per_sec as u64));
    }

    let added = state.commit_uploads(Utc::now())?;
    tracing::info!("{} uploads added to the collection", added);
    Ok(())
}

fn print_listing(state: &AppState) {
    let folder = state.current_folder().display();
    let trail: Vec<String> = breadcrumbs(&folder, &state.config().browser.root_label)
        .into_iter()
        .map(|c| c.label)
        .collect();

    match state.navigation().current() {
        Route::Search { query } => println!("Search \"{}\"", query),
        _ => println!("{}", trail.join(" > ")),
    }
    println!();

    let results = state.visible();
    for item in &results.items {
        println!("{}", describe(item));
    }

    let storage = state.storage_info();
    println!();
    println!(
        "{} items | {} of {} used",
        results.count,
        format_size(storage.used),
        format_size(storage.total)
    );
}

fn print_json(state: &AppState) -> Result<()> {
    let results = state.visible();
    let out = serde_json::json!({
        "route": state.navigation().current().to_string(),
        "count": results.count,
        "items": results.items,
        "storage": state.storage_info(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn describe(item: &Item) -> String {
    let size = if item.is_folder() {
        "-".to_string()
    } else {
        format_size(item.size)
    };
    let name = if item.is_folder() {
        format!("{}/", item.name)
    } else {
        item.name.clone()
    };
    format!(
        "{:<40} {:>10}  {}",
        name,
        size,
        item.modified_at.format("%Y-%m-%d %H:%M")
    )
}

/// Format file size for display
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
