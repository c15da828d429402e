use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::commands::{Cli, Commands};
use crate::cli::output;
use crate::io::config_io::load_config_near;
use crate::io::document_io::{load_document, read_document_text};
use crate::io::watcher::{DocumentWatcher, TrackEvent};
use crate::ops::{check_document, link_report};
use crate::parse::locate;

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let json = cli.json;
    match cli.command {
        Commands::Parse(args) => cmd_parse(&args.file, json),
        Commands::Show(args) => cmd_show(&args.file, &args.id, json),
        Commands::Links(args) => cmd_links(&args.file, json),
        Commands::Locate(args) => cmd_locate(&args.file, &args.id, json),
        Commands::Check(args) => cmd_check(&args.file, json),
        Commands::Watch(args) => cmd_watch(&args.file, args.interval_ms, json),
    }
}

/// Resolve to an absolute path; relative link targets resolve against the
/// document's directory, so the attribution path must be absolute.
fn absolute(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    std::fs::canonicalize(path)
        .map_err(|e| format!("cannot resolve path '{}': {}", path.display(), e).into())
}

fn cmd_parse(file: &Path, json: bool) -> Result<(), Box<dyn Error>> {
    let path = absolute(file)?;
    let config = load_config_near(&path)?;
    let doc = load_document(&path, &config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print!("{}", output::render_document(&doc));
    }
    Ok(())
}

fn cmd_show(file: &Path, id: &str, json: bool) -> Result<(), Box<dyn Error>> {
    let path = absolute(file)?;
    let config = load_config_near(&path)?;
    let doc = load_document(&path, &config)?;
    let task = doc
        .find(id)
        .ok_or_else(|| format!("task not found: {}", id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        print!("{}", output::render_task_detail(task));
    }
    Ok(())
}

fn cmd_links(file: &Path, json: bool) -> Result<(), Box<dyn Error>> {
    let path = absolute(file)?;
    let config = load_config_near(&path)?;
    let doc = load_document(&path, &config)?;
    let report = link_report(&doc);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::render_link_report(&report));
    }
    Ok(())
}

fn cmd_locate(file: &Path, id: &str, json: bool) -> Result<(), Box<dyn Error>> {
    let path = absolute(file)?;
    let config = load_config_near(&path)?;
    let text = read_document_text(&path, config.parse.normalize_legacy)?;
    let range = locate(&text, id)?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "id": id, "start": range.start, "end": range.end })
        );
    } else {
        println!("{}: lines {}..{}", id, range.start, range.end);
    }
    Ok(())
}

fn cmd_check(file: &Path, json: bool) -> Result<(), Box<dyn Error>> {
    let path = absolute(file)?;
    let config = load_config_near(&path)?;
    let doc = load_document(&path, &config)?;
    let report = check_document(&doc);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::render_check(&report));
    }
    if !report.valid {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_watch(file: &Path, interval_ms: Option<u64>, json: bool) -> Result<(), Box<dyn Error>> {
    let path = absolute(file)?;
    let config = load_config_near(&path)?;
    let interval = Duration::from_millis(interval_ms.unwrap_or(config.watch.interval_ms));
    let watcher = DocumentWatcher::start(&path, interval, config.parse.normalize_legacy)?;

    if !json {
        println!("watching {} (every {}ms)", path.display(), interval.as_millis());
    }
    loop {
        std::thread::sleep(Duration::from_millis(100));
        for event in watcher.poll() {
            print_event(&event, json);
        }
    }
}

fn print_event(event: &TrackEvent, json: bool) {
    let now = chrono::Local::now().format("%H:%M:%S");
    match event {
        TrackEvent::Replaced(doc) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "time": now.to_string(),
                        "event": "replaced",
                        "stats": doc.stats(),
                    })
                );
            } else {
                let stats = doc.stats();
                println!(
                    "{} document replaced ({} tasks, {} completed)",
                    now, stats.total, stats.completed
                );
            }
        }
        TrackEvent::LinksUpdated { nodes } => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "time": now.to_string(),
                        "event": "linksUpdated",
                        "nodes": nodes,
                    })
                );
            } else {
                println!("{} link refresh: {} node(s) updated", now, nodes);
            }
        }
    }
}
