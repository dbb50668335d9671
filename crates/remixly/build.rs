use std::fs;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

// cli.rs only depends on clap + clap_complete, both build-dependencies.
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir: PathBuf =
        std::env::var_os("OUT_DIR").expect("OUT_DIR not set by Cargo").into();
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");

    let cmd = cli::Cli::command();
    render_pages(&cmd, &man_dir);
}

/// Write `remixly.1` plus one `remixly-<sub>.1` page per visible subcommand.
fn render_pages(cmd: &clap::Command, dir: &Path) {
    let name = cmd.get_name().to_owned();
    let path = dir.join(format!("{name}.1"));

    let mut buf = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut buf)
        .unwrap_or_else(|e| panic!("failed to render man page for `{name}`: {e}"));
    fs::write(&path, buf).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let sub = sub.clone().name(format!("{name}-{}", sub.get_name()));
        render_pages(&sub, dir);
    }
}
