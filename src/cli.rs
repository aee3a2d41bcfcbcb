use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::descriptor::parse_object_id;
use crate::model::ObjectId;

#[derive(Debug, Clone, Parser)]
#[command(name = "heap-navigator")]
#[command(about = "Query classes, GC roots, referrers and referees in a Java heap snapshot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "FILE", global = true)]
    pub snapshot: Option<PathBuf>,

    #[arg(long, value_name = "FILE", global = true)]
    pub excludes: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub format: OutputFormat,

    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Summary,
    Class {
        descriptor: String,
    },
    Instance {
        #[arg(value_parser = parse_id_arg)]
        id: ObjectId,
    },
    Root {
        #[arg(value_parser = parse_id_arg)]
        id: ObjectId,
    },
    Classes {
        #[arg(long, value_name = "REGEX")]
        pattern: Option<String>,
    },
    Instances {
        descriptor: String,

        #[arg(long)]
        subclasses: bool,

        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
    Referrers {
        #[arg(value_parser = parse_id_arg)]
        id: ObjectId,

        #[arg(long)]
        weak: bool,
    },
    Referees {
        #[arg(value_parser = parse_id_arg)]
        id: ObjectId,

        #[arg(long)]
        weak: bool,
    },
    Finalizers,
    Roots {
        #[arg(long)]
        objects: bool,
    },
    Render {
        #[arg(value_parser = parse_id_arg)]
        id: ObjectId,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

pub fn parse_id_arg(raw: &str) -> Result<ObjectId, String> {
    parse_object_id(raw).ok_or_else(|| format!("invalid object id `{raw}` (use decimal or 0x-hex)"))
}
