use std::path::PathBuf;

use seqio_stream::HashKind;
use structopt::clap::AppSettings::*;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "seqio",
    about = "Replicate, hash and verify files through buffered streams.",
    settings = &[SubcommandRequiredElseHelp, DisableHelpSubcommand, VersionlessSubcommands]
)]
pub struct CliOpts {
    #[structopt(short, long, help = "Show verbose output", global = true)]
    pub verbose: bool,

    #[structopt(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, StructOpt)]
pub enum Commands {
    #[structopt(name = "replicate", about = "Copy a file to several destinations at once")]
    Replicate(ReplicateArgs),

    #[structopt(name = "hash", about = "Print the content hash of files")]
    Hash(HashArgs),

    #[structopt(name = "manifest", about = "Write a size and hash manifest of files")]
    Manifest(ManifestArgs),

    #[structopt(name = "verify", about = "Check files against a manifest")]
    Verify(VerifyArgs),
}

#[derive(Debug, StructOpt)]
pub struct ReplicateArgs {
    #[structopt(long, help = "Sync every destination to disk before closing")]
    pub sync: bool,

    #[structopt(short, long, default_value = "sip13", help = "Hash function [sip13, blake3]")]
    pub kind: HashKind,

    #[structopt(parse(from_os_str), help = "File to copy")]
    pub source: PathBuf,

    #[structopt(parse(from_os_str), required = true, help = "Files to create")]
    pub destinations: Vec<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct HashArgs {
    #[structopt(short, long, default_value = "sip13", help = "Hash function [sip13, blake3]")]
    pub kind: HashKind,

    #[structopt(parse(from_os_str), required = true, help = "Files to hash")]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct ManifestArgs {
    #[structopt(short, long, default_value = "sip13", help = "Hash function [sip13, blake3]")]
    pub kind: HashKind,

    #[structopt(
        short,
        long = "output",
        parse(from_os_str),
        required = true,
        number_of_values = 1,
        help = "Manifest to write; repeat to write several copies"
    )]
    pub outputs: Vec<PathBuf>,

    #[structopt(parse(from_os_str), required = true, help = "Files to list")]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct VerifyArgs {
    #[structopt(short, long, default_value = "sip13", help = "Hash function the manifest was made with")]
    pub kind: HashKind,

    #[structopt(parse(from_os_str), help = "Manifest to check")]
    pub manifest: PathBuf,
}
