//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("fieldsnap")
        .about("Export and import custom-field snapshots")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the event log as JSON")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Config file (default: fieldsnap.toml next to the site)")
                .global(true),
        )
        .subcommand(build_import())
        .subcommand(build_export())
        .subcommand(build_validate())
        .subcommand(build_init())
}

fn build_import() -> Command {
    Command::new("import")
        .about("Import a snapshot into a site")
        .arg(
            Arg::new("file")
                .help("Snapshot file (.json)")
                .required(true),
        )
        .arg(
            Arg::new("site")
                .long("site")
                .help("Site fixture to import into")
                .required(true),
        )
        .arg(
            Arg::new("no-rollback")
                .long("no-rollback")
                .help("Keep already-applied changes when the import fails")
                .action(ArgAction::SetTrue),
        )
}

fn build_export() -> Command {
    Command::new("export")
        .about("Export field values from a site")
        .arg(
            Arg::new("site")
                .long("site")
                .help("Site fixture to export from")
                .required(true),
        )
        .arg(
            Arg::new("group")
                .long("group")
                .help("Field group key (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("post-type")
                .long("post-type")
                .value_name("TYPE=IDS")
                .help("Post type and comma-separated post ids, e.g. post=1,2 (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("taxonomy")
                .long("taxonomy")
                .value_name("TAX=IDS")
                .help("Taxonomy and comma-separated term ids, e.g. category=3 (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("options")
                .long("options")
                .help("Export option values")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("comments")
                .long("comments")
                .help("Export approved comments of the selected post types")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("user-role")
                .long("user-role")
                .help("Export users with this role (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .help("Export this user id (repeatable)")
                .value_parser(clap::value_parser!(u64))
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output path (default: <prefix>-YYYY-MM-DD.json)"),
        )
}

fn build_validate() -> Command {
    Command::new("validate")
        .about("Check a snapshot file without importing it")
        .arg(
            Arg::new("file")
                .help("Snapshot file (.json)")
                .required(true),
        )
}

fn build_init() -> Command {
    Command::new("init-config")
        .about("Write a default fieldsnap.toml if none exists")
        .arg(
            Arg::new("path")
                .help("Where to write the config (default: ./fieldsnap.toml)"),
        )
}
