// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn force_arg() -> Arg {
    Arg::new("force")
        .short('f')
        .long("force")
        .action(ArgAction::SetTrue)
        .help("Overwrite an existing snapshot without asking")
}

fn build_cli() -> Command {
    Command::new("modsweep")
        .version(env!("CARGO_PKG_VERSION"))
        .author("modsweep Contributors")
        .about("Remove installed mods you are no longer subscribed to")
        .subcommand_required(false)
        .arg(
            Arg::new("data_dir")
                .short('D')
                .long("data-dir")
                .value_name("DIR")
                .default_value(".")
                .global(true)
                .help("Directory holding user.json and the snapshots"),
        )
        .subcommand(
            Command::new("setup")
                .about("Verify a mod.io token and save the session")
                .arg(
                    Arg::new("mods_path")
                        .short('m')
                        .long("mods-path")
                        .value_name("DIR")
                        .required(true)
                        .help("Mods directory to manage"),
                )
                .arg(
                    Arg::new("token")
                        .short('t')
                        .long("token")
                        .required(true)
                        .help("OAuth2 token (https://mod.io/me/access)"),
                ),
        )
        .subcommand(
            Command::new("subscriptions")
                .about("Fetch subscribed mods and save subscriptions.json")
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("scan")
                .about("Scan the mods directory and save installedMods.json")
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("sweep").about("Delete installed mods that are no longer subscribed"),
        )
        .subcommand(Command::new("status").about("Show the session and snapshot counts"))
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("modsweep.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
