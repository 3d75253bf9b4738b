//! ArgMatches → CliAction conversion.

use std::path::{Path, PathBuf};

use clap::ArgMatches;
use fieldsnap_engine::{ExportSelection, CONFIG_FILE_NAME};

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum CliAction {
    /// Import a snapshot file into a site fixture.
    Import {
        file: PathBuf,
        site: PathBuf,
        config: PathBuf,
        no_rollback: bool,
    },
    /// Export a selection from a site fixture.
    Export {
        site: PathBuf,
        config: PathBuf,
        selection: ExportSelection,
        output: Option<PathBuf>,
    },
    /// Parse and structure-check a snapshot file.
    Validate { file: PathBuf },
    /// Write the default config file.
    InitConfig { path: PathBuf },
}

/// Convert parsed arguments into a [`CliAction`].
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    match matches.subcommand() {
        Some(("import", sub)) => {
            let site = path_arg(sub, "site")?;
            Ok(CliAction::Import {
                file: path_arg(sub, "file")?,
                config: config_path(sub, &site),
                site,
                no_rollback: sub.get_flag("no-rollback"),
            })
        }
        Some(("export", sub)) => parse_export(sub),
        Some(("validate", sub)) => Ok(CliAction::Validate {
            file: path_arg(sub, "file")?,
        }),
        Some(("init-config", sub)) => Ok(CliAction::InitConfig {
            path: sub
                .get_one::<String>("path")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
        }),
        Some((name, _)) => Err(format!("Unknown command: {}", name)),
        None => Err("No command given. Run with --help for usage.".to_string()),
    }
}

fn parse_export(sub: &ArgMatches) -> Result<CliAction, String> {
    let site = path_arg(sub, "site")?;
    let strings = |name: &str| -> Vec<String> {
        sub.get_many::<String>(name)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default()
    };

    let mut selection = ExportSelection::groups(strings("group"));
    for spec in strings("post-type") {
        let (post_type, ids) = parse_id_assignment(&spec)?;
        selection.post_types.insert(post_type, ids);
    }
    for spec in strings("taxonomy") {
        let (taxonomy, ids) = parse_id_assignment(&spec)?;
        selection.taxonomies.insert(taxonomy, ids);
    }
    selection.options = sub.get_flag("options");
    selection.comments = sub.get_flag("comments");
    selection.user_roles = strings("user-role");
    selection.user_ids = sub
        .get_many::<u64>("user")
        .map(|vals| vals.copied().collect())
        .unwrap_or_default();

    Ok(CliAction::Export {
        config: config_path(sub, &site),
        site,
        selection,
        output: sub.get_one::<String>("output").map(PathBuf::from),
    })
}

/// Parse `name=1,2,3` into a name and its ids. `name=` selects no ids.
pub fn parse_id_assignment(spec: &str) -> Result<(String, Vec<u64>), String> {
    let (name, ids) = spec
        .split_once('=')
        .ok_or_else(|| format!("Expected NAME=ID,ID..., got '{}'", spec))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Missing name in '{}'", spec));
    }

    let ids = ids
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| format!("Invalid id '{}' in '{}'", s, spec))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((name.to_string(), ids))
}

fn path_arg(matches: &ArgMatches, name: &str) -> Result<PathBuf, String> {
    matches
        .get_one::<String>(name)
        .map(PathBuf::from)
        .ok_or_else(|| format!("Missing required argument: {}", name))
}

/// `--config`, or `fieldsnap.toml` in the site's directory.
fn config_path(matches: &ArgMatches, site: &Path) -> PathBuf {
    match matches.get_one::<String>("config") {
        Some(path) => PathBuf::from(path),
        None => site
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(CONFIG_FILE_NAME),
    }
}
