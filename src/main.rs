use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use mingit::commands;
use mingit::git::objects::ObjectKind;

#[derive(Debug, Parser)]
#[command(name = "mingit")]
#[command(about = "A minimal content-addressed vcs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Initialize a new, empty repository
    Init {
        /// Where to create the repository
        path: Option<String>,
    },
    /// Provide the raw content of a repository object
    CatFile {
        /// The expected object type
        #[arg(value_enum)]
        kind: ObjectKind,
        /// The object to display
        object: String,
    },
    /// Compute the object id and optionally store a file
    HashObject {
        /// The object type to hash as
        #[arg(short = 't', long = "type", value_enum, default_value_t = ObjectKind::Blob)]
        kind: ObjectKind,
        /// Actually write the object into the store
        #[arg(short = 'w')]
        write: bool,
        /// The file to hash
        path: PathBuf,
    },
    /// Display the history of a commit as a Graphviz graph
    Log {
        /// Commit to start at
        #[arg(default_value = "HEAD")]
        commit: String,
    },
    /// Pretty-print a tree object
    LsTree {
        /// Recurse into sub-trees
        #[arg(short = 'r')]
        recursive: bool,
        /// The tree to list
        tree: String,
    },
    /// Materialize a commit inside an empty directory
    Checkout {
        /// The commit or tree to check out
        commit: String,
        /// The empty directory to check out into
        path: PathBuf,
    },
    /// List references
    ShowRef,
    /// List tags, or create one
    Tag {
        /// Create an annotated tag object
        #[arg(short = 'a')]
        annotate: bool,
        /// The tag message (annotated tags only)
        #[arg(short = 'm')]
        message: Option<String>,
        /// The new tag's name; without it, existing tags are listed
        name: Option<String>,
        /// The object the new tag points at
        #[arg(default_value = "HEAD")]
        object: String,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Commands::Init { path } => commands::init::run(path.as_deref()),
        Commands::CatFile { kind, object } => commands::cat_file::run(kind, &object),
        Commands::HashObject { kind, write, path } => commands::hash_object::run(write, kind, &path),
        Commands::Log { commit } => commands::log::run(&commit),
        Commands::LsTree { recursive, tree } => commands::ls_tree::run(&tree, recursive),
        Commands::Checkout { commit, path } => commands::checkout::run(&commit, &path),
        Commands::ShowRef => commands::show_ref::run(),
        Commands::Tag {
            annotate,
            message,
            name,
            object,
        } => commands::tag::run(annotate, message.as_deref(), name.as_deref(), &object),
    }
}
