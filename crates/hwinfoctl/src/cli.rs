//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Hardware inventory browser
#[derive(Parser, Debug)]
#[command(name = "hwinfoctl")]
#[command(about = "Hardware inventory as a labeled tree", long_about = None)]
#[command(version = env!("HWINFOCTL_VERSION"))]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (defaults to /etc/hwinfo/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk the probe tree and print it
    Tree {
        /// Read the inventory from a snapshot instead of this system
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Start the walk here instead of the configured root
        #[arg(long)]
        root: Option<String>,

        /// Additional paths not to probe (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,

        /// Output the tree as JSON
        #[arg(long)]
        json: bool,

        /// Write the output to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Never show the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Capture this system's inventory into a snapshot file
    Snapshot {
        /// Snapshot file to write
        #[arg(long, short)]
        output: PathBuf,

        /// Capture below this path instead of the configured root
        #[arg(long)]
        root: Option<String>,
    },

    /// Render an arbitrary JSON document as a tree
    Render {
        /// JSON file to render
        file: PathBuf,
    },

    /// Print a short system summary (system, processor, memory)
    Summary {
        /// Read the inventory from a snapshot instead of this system
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Also list every detected device
        #[arg(long)]
        devices: bool,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,

        /// Write the output to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List the paths the tree walk will skip
    Excluded {
        /// Decide UML exclusions from a snapshot instead of this system
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_defaults() {
        let cli = Cli::try_parse_from(["hwinfoctl", "tree"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Tree {
                snapshot,
                root,
                exclude,
                json,
                output,
                no_progress,
            } => {
                assert!(snapshot.is_none());
                assert!(root.is_none());
                assert!(exclude.is_empty());
                assert!(!json);
                assert!(output.is_none());
                assert!(!no_progress);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_repeated_exclude_and_global_flags() {
        let cli = Cli::try_parse_from([
            "hwinfoctl",
            "tree",
            "--exclude",
            "probe.usb",
            "--exclude",
            "probe.pci",
            "-vv",
            "--config",
            "/tmp/hwinfo.toml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/hwinfo.toml")));
        match cli.command {
            Commands::Tree { exclude, .. } => assert_eq!(exclude, vec!["probe.usb", "probe.pci"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_requires_output() {
        assert!(Cli::try_parse_from(["hwinfoctl", "snapshot"]).is_err());
        let cli = Cli::try_parse_from(["hwinfoctl", "snapshot", "-o", "inv.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Snapshot { .. }));
    }

    #[test]
    fn test_render_takes_file() {
        let cli = Cli::try_parse_from(["hwinfoctl", "render", "doc.json"]).unwrap();
        match cli.command {
            Commands::Render { file } => assert_eq!(file, PathBuf::from("doc.json")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_summary_flags() {
        let cli =
            Cli::try_parse_from(["hwinfoctl", "summary", "--devices", "--snapshot", "inv.json"])
                .unwrap();
        match cli.command {
            Commands::Summary {
                snapshot,
                devices,
                json,
                output,
            } => {
                assert_eq!(snapshot, Some(PathBuf::from("inv.json")));
                assert!(devices);
                assert!(!json);
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_no_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["hwinfoctl"]).is_err());
    }
}
