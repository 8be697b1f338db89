use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod checkout;
mod commands;
mod config;
mod error;
mod ignore;
mod index;
mod kvlm;
mod object;
mod refs;
mod repo;
mod resolve;
mod tree;
mod treesynth;

use repo::Repository;

#[derive(Parser, Debug)]
#[command(name = "tea", about = "A minimal, Git-compatible-in-spirit version control engine")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a repository.
    Init { path: Option<PathBuf> },
    /// Stage file(s).
    Add { paths: Vec<PathBuf> },
    /// Unstage and delete file(s).
    Rm { paths: Vec<PathBuf> },
    /// Synthesize trees, write a commit, advance the branch.
    Commit {
        #[arg(short = 'm')]
        message: String,
    },
    /// Print branch, HEAD-vs-index, and index-vs-worktree diffs.
    Status,
    /// Print a DOT digraph of ancestry.
    Log { commit: Option<String> },
    /// List index entries.
    #[command(name = "ls-files")]
    LsFiles {
        #[arg(long)]
        verbose: bool,
    },
    /// List tree leaves.
    #[command(name = "ls-tree")]
    LsTree {
        #[arg(short = 'r')]
        recursive: bool,
        tree_ish: String,
    },
    /// Write a raw serialized object to stdout.
    #[command(name = "cat-file")]
    CatFile { kind: String, object: String },
    /// Compute (and optionally store) the hash of a file.
    #[command(name = "hash-object")]
    HashObject {
        #[arg(short = 't', default_value = "blob")]
        kind: String,
        #[arg(short = 'w')]
        write: bool,
        path: PathBuf,
    },
    /// Materialize a tree into an empty directory.
    Checkout { commit: String, dest: PathBuf },
    /// Print which of the given paths are ignored.
    #[command(name = "check-ignore")]
    CheckIgnore { paths: Vec<PathBuf> },
    /// Print every ref, resolved to its hash.
    #[command(name = "show-ref")]
    ShowRef,
    /// List or create a tag.
    Tag {
        #[arg(short = 'a')]
        annotate: bool,
        name: Option<String>,
        object: Option<String>,
    },
    /// Resolve a name to a hash, optionally peeling to a target kind.
    #[command(name = "rev-parse")]
    RevParse {
        #[arg(long = "tea-type")]
        tea_type: Option<String>,
        name: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Command::Init { path } = &args.command {
        let path = path.clone().unwrap_or_else(|| PathBuf::from("."));
        return commands::init::run(&path);
    }

    let cwd = env::current_dir()?;
    let repo = Repository::find_required(&cwd)?;

    match args.command {
        Command::Init { .. } => unreachable!("handled above"),
        Command::Add { paths } => commands::add::run(&repo, &paths),
        Command::Rm { paths } => commands::rm::run(&repo, &paths),
        Command::Commit { message } => commands::commit::run(&repo, &message),
        Command::Status => commands::status::run(&repo),
        Command::Log { commit } => commands::log::run(&repo, commit.as_deref()),
        Command::LsFiles { verbose } => commands::ls_files::run(&repo, verbose),
        Command::LsTree { recursive, tree_ish } => commands::ls_tree::run(&repo, recursive, &tree_ish),
        Command::CatFile { kind, object } => commands::cat_file::run(&repo, &kind, &object),
        Command::HashObject { kind, write, path } => {
            commands::hash_object::run(Some(&repo), &kind, write, &path)
        }
        Command::Checkout { commit, dest } => commands::checkout::run(&repo, &commit, &dest),
        Command::CheckIgnore { paths } => commands::check_ignore::run(&repo, &paths),
        Command::ShowRef => commands::show_ref::run(&repo),
        Command::Tag { annotate, name, object } => commands::tag::run(&repo, annotate, name, object),
        Command::RevParse { tea_type, name } => {
            commands::rev_parse::run(&repo, tea_type.as_deref(), &name)
        }
    }
}
