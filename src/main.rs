use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use kdbopts::{CommitOutcome, KdbTree, OptionsSession, V1Tree, V2Tree, VariantDict, format};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Generation {
    V1,
    V2,
}

#[derive(Debug, Parser)]
#[command(name = "kdbopts")]
#[command(
    version,
    about = "Inspect and edit the crypto settings of a dumped database tree."
)]
struct Cli {
    /// Path to the JSON tree dump
    #[arg(long, global = true, value_name = "PATH", env = "KDBOPTS_TREE")]
    tree: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Writes a fresh tree dump with default settings
    Init {
        #[arg(long, value_enum, default_value = "v2")]
        format: Generation,
    },

    /// Shows the database summary, cipher, KDF and parameters
    Show,

    /// Selects the encryption cipher by name
    #[command(arg_required_else_help = true)]
    SetCipher { name: String },

    /// Selects the key derivation function by name (version 2.x only)
    #[command(arg_required_else_help = true)]
    SetKdf { name: String },

    /// Sets a KDF parameter of the active variant
    #[command(arg_required_else_help = true)]
    SetParam { name: String, value: String },
}

fn tree_path(path: Option<PathBuf>) -> Result<PathBuf> {
    path.context("no tree dump given; pass --tree or set KDBOPTS_TREE")
}

fn load_tree(path: &Path) -> Result<KdbTree> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read tree dump '{}'", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("'{}' is not a valid tree dump", path.display()))
}

fn save_tree(path: &Path, tree: &KdbTree) -> Result<()> {
    let data = serde_json::to_string_pretty(tree)?;
    fs::write(path, data)
        .with_context(|| format!("failed to write tree dump '{}'", path.display()))
}

fn default_tree(generation: Generation) -> KdbTree {
    match generation {
        Generation::V1 => KdbTree::V1(V1Tree {
            flags: format::v1::FLAG_SHA2 | format::v1::FLAG_RIJNDAEL,
            rounds: 60_000,
        }),
        Generation::V2 => {
            let mut kdf = VariantDict::new();
            kdf.set_bytes(format::v2::KDF_KEY_UUID, format::v2::KDF_AES.to_vec());
            kdf.set_u64(format::v2::KDF_AES_KEY_ROUNDS, 60_000);
            KdbTree::V2(V2Tree {
                database_name: "Database".to_string(),
                database_description: String::new(),
                cipher_uuid: format::v2::CIPHER_AES,
                kdf,
            })
        }
    }
}

fn label_index(labels: &[&str], name: &str) -> Result<usize> {
    labels
        .iter()
        .position(|l| l.eq_ignore_ascii_case(name))
        .with_context(|| format!("unknown option '{name}', expected one of: {}", labels.join(", ")))
}

fn print_session(session: &OptionsSession) {
    println!("{}", session.info());
    println!();
    println!("Algorithm: {}", session.cipher_labels()[session.selected_cipher()]);
    if let Some(kdf) = session.selected_kdf() {
        println!("Function:  {}", session.kdf_labels()[kdf]);
    }
    for (label, value) in session.parameters() {
        println!("{label}: {value}");
    }
}

fn finish(path: &Path, mut session: OptionsSession) -> Result<()> {
    match session.commit()? {
        CommitOutcome::Applied => {
            save_tree(path, session.tree())?;
            println!("options updated");
        }
        CommitOutcome::Unchanged => println!("no change"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let path = tree_path(args.tree)?;

    match args.command {
        Commands::Init { format } => {
            if path.exists() {
                bail!("tree dump '{}' already exists", path.display());
            }
            save_tree(&path, &default_tree(format))?;
            println!("tree dump created");
        }
        Commands::Show => {
            let session = OptionsSession::open(load_tree(&path)?);
            print_session(&session);
        }
        Commands::SetCipher { name } => {
            let mut session = OptionsSession::open(load_tree(&path)?);
            let index = label_index(session.cipher_labels(), &name)?;
            session.select_cipher(index)?;
            finish(&path, session)?;
        }
        Commands::SetKdf { name } => {
            let mut session = OptionsSession::open(load_tree(&path)?);
            let index = label_index(session.kdf_labels(), &name)?;
            session.select_kdf(index)?;
            finish(&path, session)?;
        }
        Commands::SetParam { name, value } => {
            let mut session = OptionsSession::open(load_tree(&path)?);
            session.set_parameter_text(&name, &value)?;
            finish(&path, session)?;
        }
    }

    Ok(())
}
