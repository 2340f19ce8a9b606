//! Deep clone command line
//!
//! Runs the cloner against a JSON store snapshot:
//! - `discover <ROOT>`: list the reference closure
//! - `tree <ROOT>`: print the reference tree, marking disabled nodes
//! - `clone <ROOT>`: deep clone and optionally write the resulting snapshot

#![warn(unreachable_pub)]

mod render;

pub use render::render_tree;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use deepclone_core::{ClonerConfig, ReferenceGraphCloner, TracingProgress, TreePath};
use deepclone_model::{ContentTypeId, RecordId};
use deepclone_store::{InMemoryStore, StoreSnapshot};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

/// Command line definition
#[must_use]
pub fn cli() -> Command {
    Command::new("deepclone")
        .version(deepclone_core::VERSION)
        .about("Clone a record together with the records it references")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .short('s')
                .env("DEEPCLONE_SNAPSHOT")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON store snapshot to load"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML cloner configuration"),
        )
        .arg(
            Arg::new("clone-text")
                .long("clone-text")
                .global(true)
                .help("Text added to the title of every clone"),
        )
        .arg(
            Arg::new("append")
                .long("append")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Put the clone text after the title instead of before"),
        )
        .arg(
            Arg::new("blocked-type")
                .long("blocked-type")
                .global(true)
                .action(ArgAction::Append)
                .help("Content type that is referenced but never cloned (repeatable)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("discover")
                .about("List every record reachable from ROOT")
                .arg(root_arg()),
        )
        .subcommand(
            Command::new("tree")
                .about("Print the reference tree of ROOT")
                .arg(root_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("clone")
                .about("Deep clone ROOT")
                .arg(root_arg())
                .arg(
                    Arg::new("select")
                        .long("select")
                        .action(ArgAction::Append)
                        .help("Id of a referenced record to clone as well (repeatable)"),
                )
                .arg(
                    Arg::new("path")
                        .long("path")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(TreePath))
                        .help("Tree path (`root:child:...`) of a record to clone (repeatable)"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .conflicts_with_all(["select", "path"])
                        .help("Clone every record that can be cloned"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the resulting store snapshot here"),
                ),
        )
}

fn root_arg() -> Arg {
    Arg::new("root")
        .required(true)
        .help("Id of the root record")
}

/// Whether logs should be JSON
#[must_use]
pub fn wants_json_logs(matches: &ArgMatches) -> bool {
    matches
        .subcommand()
        .map_or(matches.get_flag("log-json"), |(_, args)| args.get_flag("log-json"))
}

/// Run the selected subcommand and return what it prints
pub async fn run(matches: &ArgMatches) -> Result<String> {
    let Some((name, args)) = matches.subcommand() else {
        bail!("no subcommand given");
    };

    let config = load_config(args)?;
    let store = Arc::new(load_store(args)?);
    let cloner = ReferenceGraphCloner::new(store.clone(), config.clone())?
        .with_progress(Arc::new(TracingProgress));
    let root = RecordId::new(required(args, "root")?);

    match name {
        "discover" => {
            let closure = cloner.discover_references(&root).await;
            if !closure.contains(&root) {
                bail!("root record {root} not found");
            }
            let mut out = format!("{} records reachable from {root}\n", closure.len());
            for record in closure.records() {
                writeln!(out, "{}\t{}", record.id, record.content_type_id)?;
            }
            Ok(out)
        }
        "tree" => {
            let tree = cloner.references_tree(&root).await?;
            if args.get_flag("json") {
                Ok(serde_json::to_string_pretty(&tree)?)
            } else {
                let disabled = tree.disabled_paths(&config.reference_only_content_types);
                Ok(render_tree(&tree, &disabled))
            }
        }
        "clone" => {
            let selected = selection(store.clone(), &root, &config, args).await?;
            let clone = cloner.clone_entry(&root, &selected).await?;
            let progress = cloner.progress();

            let mut out = String::new();
            writeln!(out, "cloned {root} into {}", clone.id)?;
            writeln!(
                out,
                "discovered {}, cloned {}, updated {}",
                progress.discovered, progress.cloned, progress.updated
            )?;
            if let Some(path) = args.get_one::<PathBuf>("output") {
                store
                    .snapshot()
                    .save(path)
                    .with_context(|| format!("writing snapshot to {}", path.display()))?;
                writeln!(out, "wrote {}", path.display())?;
            }
            Ok(out)
        }
        other => bail!("unknown command {other}"),
    }
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a String> {
    args.get_one::<String>(name)
        .with_context(|| format!("missing <{name}>"))
}

/// Configuration file, then flag overrides
fn load_config(args: &ArgMatches) -> Result<ClonerConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => ClonerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ClonerConfig::default(),
    };
    if let Some(text) = args.get_one::<String>("clone-text") {
        config.clone_text.clone_from(text);
    }
    if args.get_flag("append") {
        config.prepend_before_title = false;
    }
    if let Some(blocked) = args.get_many::<String>("blocked-type") {
        config
            .reference_only_content_types
            .extend(blocked.map(|ct| ContentTypeId::new(ct.as_str())));
    }
    config.validate()?;
    Ok(config)
}

fn load_store(args: &ArgMatches) -> Result<InMemoryStore> {
    let path = args
        .get_one::<PathBuf>("snapshot")
        .context("--snapshot (or DEEPCLONE_SNAPSHOT) is required")?;
    let snapshot = StoreSnapshot::load(path)
        .with_context(|| format!("loading snapshot {}", path.display()))?;
    tracing::info!(
        records = snapshot.records.len(),
        content_types = snapshot.content_types.len(),
        "loaded snapshot"
    );
    Ok(InMemoryStore::from_snapshot(snapshot))
}

/// Ids to clone from `--select`, `--path` or `--all`.
///
/// The tree is built by a separate cloner so its discovery does not show up
/// in the reported counts.
async fn selection(
    store: Arc<InMemoryStore>,
    root: &RecordId,
    config: &ClonerConfig,
    args: &ArgMatches,
) -> Result<HashSet<RecordId>> {
    let mut selected: HashSet<RecordId> = args
        .get_many::<String>("select")
        .into_iter()
        .flatten()
        .map(|id| RecordId::new(id.as_str()))
        .collect();

    let all = args.get_flag("all");
    let paths: Vec<&TreePath> = args.get_many::<TreePath>("path").into_iter().flatten().collect();
    if all || !paths.is_empty() {
        let tree = ReferenceGraphCloner::new(store, config.clone())?
            .references_tree(root)
            .await?;
        let blocked = &config.reference_only_content_types;
        let chosen = if all {
            tree.selection_from_paths(&tree.all_paths(), blocked)
        } else {
            tree.selection_from_paths(paths, blocked)
        };
        selected.extend(chosen);
    }
    Ok(selected)
}
