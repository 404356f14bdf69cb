use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::codec::{Codec, CodecConfig};
use crate::config::Config;
use crate::domain::TagSet;
use crate::reader::Id3Reader;
use crate::storage::{TagStore, fs};

#[derive(Parser)]
#[command(name = "tagdeck")]
#[command(version = "0.1")]
#[command(about = "Audio tag reader and tag library")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse the tags of one file and print them
    Parse { file: PathBuf },
    /// Scan the library, parse every music file and store its tags
    Scan,
    /// Print the stored tags of a file
    Show { file: PathBuf },
    /// Decode a persisted tag set and print it re-encoded
    Decode { json_file: PathBuf },
    /// List all user tags in the store
    Tags,
    /// List files whose stored tag matches a value
    Find {
        /// Tag type: title, artist, genre or length
        tag_type: String,
        value: String,
    },
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match &cli.command {
        Commands::Parse { file } => {
            let codec = Codec::new(codec_config(&cli.config)?);
            let mut set = TagSet::new(file);
            set.parse(&Id3Reader)?;
            print_encoded(&codec, &set)?;
        }

        Commands::Decode { json_file } => {
            let codec = Codec::new(codec_config(&cli.config)?);
            let text = std::fs::read_to_string(json_file)
                .with_context(|| format!("Failed to read {}", json_file.display()))?;
            match codec.decode::<TagSet>(&text)? {
                Some(set) => print_encoded(&codec, &set)?,
                None => println!("null"),
            }
        }

        Commands::Scan => {
            let cfg = Config::load(&cli.config)?;
            let mut store = TagStore::new(&cfg.database, Codec::new(cfg.codec))?;

            let paths = fs::scan_dirs(&Id3Reader, &cfg.library)?;
            log::info!("found {} taggable files", paths.len());

            let sets = fs::parse_all(&Id3Reader, &paths);
            let parsed = sets.iter().filter(|s| s.is_parsed()).count();
            for set in &sets {
                store.save(set)?;
            }
            log::info!("stored {} files, {} parsed", sets.len(), parsed);
        }

        Commands::Show { file } => {
            let cfg = Config::load(&cli.config)?;
            let store = TagStore::new(&cfg.database, Codec::new(cfg.codec))?;
            let set = store.load(file)?;
            print_encoded(store.codec(), &set)?;
        }

        Commands::Tags => {
            let cfg = Config::load(&cli.config)?;
            let store = TagStore::new(&cfg.database, Codec::new(cfg.codec))?;
            for tag in store.all_user_tags()? {
                println!("{tag}");
                for path in store.files_with_user_tag(&tag)? {
                    println!("    - {}", path.to_string_lossy());
                }
            }
        }

        Commands::Find { tag_type, value } => {
            let cfg = Config::load(&cli.config)?;
            let store = TagStore::new(&cfg.database, Codec::new(cfg.codec))?;
            for path in store.files_with_tag(tag_type, value)? {
                println!("{}", path.to_string_lossy());
            }
        }
    }

    Ok(())
}

/// Commands that never touch the store run without a config file.
fn codec_config(path: &Path) -> anyhow::Result<CodecConfig> {
    if path.exists() {
        Ok(Config::load(path)?.codec)
    } else {
        log::debug!("no config at {}, using codec defaults", path.display());
        Ok(CodecConfig::default())
    }
}

fn print_encoded(codec: &Codec, set: &TagSet) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    codec.encode_to_writer(&mut stdout, set)?;
    writeln!(stdout)?;
    Ok(())
}
