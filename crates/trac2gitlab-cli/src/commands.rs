//! CLI command implementations

use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::Path;
use tabled::{Table, Tabled};
use trac2gitlab_core::{
    Config, EntityKind, Migrator, ProjectExtract, RunSummary, SinkOptions, SinkRegistry, UserMap,
};

use crate::MigrateArgs;

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

pub fn migrate(config_file: Option<&Path>, args: MigrateArgs, json: bool) -> Result<()> {
    let mut config = load_config(config_file)?;
    if let Some(project_id) = args.project_id {
        config.project_id = project_id;
    }
    if let Some(version) = args.gitlab_version {
        config.gitlab_version = version;
    }
    if let Some(fallback) = args.fallback_user {
        config.fallback_user = fallback;
    }
    config.validate()?;

    let mut usermap = UserMap::from_config(&config)?;
    for pair in &args.usermap {
        let (source, target) = UserMap::parse_pair(pair)?;
        usermap.insert(source, target);
    }
    for path in &args.usermap_files {
        usermap.merge_file(path)?;
    }

    let extract = ProjectExtract::load(&args.extract)?;
    tracing::info!(
        "Loaded {} tickets, {} milestones, {} wiki pages from {}",
        extract.tickets.len(),
        extract.milestones.len(),
        extract.wiki.len(),
        args.extract.display()
    );

    let options = SinkOptions {
        output: args.output.clone(),
        dry_run: args.dry_run,
        users: if args.dry_run {
            dry_run_identities(&usermap)
        } else {
            BTreeMap::new()
        },
    };
    if !args.dry_run && args.output.is_none() {
        bail!("--output is required unless --dry-run is given");
    }
    let mut sink = SinkRegistry::default().create(&config.gitlab_version, &options)?;

    let mut migrator = Migrator::new(&config, usermap);
    let result = migrator.run(&extract, sink.as_mut());

    if let Some(path) = &args.audit {
        migrator
            .audit()
            .write_jsonl(path)
            .with_context(|| format!("Failed to write audit log to {}", path.display()))?;
    }

    let summary = result.context("Migration aborted")?;
    print_summary(&summary, args.dry_run, json)
}

/// Synthetic identities for every mapped target user plus the fallback
fn dry_run_identities(usermap: &UserMap) -> BTreeMap<String, u64> {
    let mut names: Vec<&str> = usermap.iter().map(|(_, target)| target).collect();
    names.push(usermap.fallback());
    names.sort_unstable();
    names.dedup();
    names
        .into_iter()
        .zip(1u64..)
        .map(|(name, id)| (name.to_string(), id))
        .collect()
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Entity")]
    kind: String,
    #[tabled(rename = "Created")]
    created: usize,
    #[tabled(rename = "Skipped")]
    skipped: usize,
}

fn print_summary(summary: &RunSummary, dry_run: bool, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    let rows: Vec<SummaryRow> = [
        EntityKind::Milestone,
        EntityKind::Issue,
        EntityKind::Note,
        EntityKind::WikiPage,
        EntityKind::Attachment,
    ]
    .into_iter()
    .map(|kind| SummaryRow {
        kind: kind.to_string(),
        created: summary.created(kind),
        skipped: summary.skipped.iter().filter(|s| s.kind == kind).count(),
    })
    .collect();

    println!("{}", Table::new(rows));

    if !summary.skipped.is_empty() {
        println!();
        println!("{}", "Skipped:".bold());
        for skipped in &summary.skipped {
            println!("  {} {} - {}", skipped.kind, skipped.source_id.cyan(), skipped.reason);
        }
    }
    if summary.decode_failures > 0 {
        println!(
            "{} {} attachment(s) could not be decoded and were stored empty",
            "!".yellow(),
            summary.decode_failures
        );
    }

    let verb = if dry_run { "Dry run" } else { "Migration" };
    if summary.cancelled {
        println!("{} {} cancelled (run {})", "!".yellow(), verb, summary.run_id);
    } else if summary.is_clean() {
        println!("{} {} complete (run {})", "✓".green(), verb, summary.run_id);
    } else {
        println!(
            "{} {} complete with skipped entities (run {})",
            "!".yellow(),
            verb,
            summary.run_id
        );
    }

    Ok(())
}

pub fn users(
    extract: &Path,
    from_wiki: bool,
    from_tickets: bool,
    template: bool,
    json: bool,
) -> Result<()> {
    let extract = ProjectExtract::load(extract)?;
    let authors = extract.authors(from_wiki, from_tickets);

    if json {
        println!("{}", serde_json::to_string(&authors)?);
    } else if template {
        let skeleton: BTreeMap<&str, &str> = authors.iter().map(|a| (a.as_str(), a.as_str())).collect();
        println!("# source = \"target\"");
        print!("{}", toml::to_string(&skeleton)?);
    } else if authors.is_empty() {
        println!("No users found");
    } else {
        for author in &authors {
            println!("{}", author);
        }
    }

    Ok(())
}

pub fn versions(json: bool) -> Result<()> {
    let registry = SinkRegistry::default();
    let versions = registry.versions();

    if json {
        println!("{}", serde_json::to_string(&versions)?);
    } else {
        println!("{}", "Supported GitLab versions:".bold());
        for version in versions {
            println!("  {}", version);
        }
    }

    Ok(())
}

pub fn config_show(config_file: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        if let Some(path) = config_file {
            println!("{} {}", "Configuration:".bold(), path.display());
            println!();
        }
        print!("{}", toml::to_string_pretty(&config)?);
    }

    Ok(())
}

pub fn config_init(config_file: Option<&Path>, force: bool) -> Result<()> {
    let Some(path) = config_file else {
        bail!("No configuration path; pass --config-file");
    };
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default_with_comments())?;

    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}
