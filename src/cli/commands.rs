use crate::config::{DEFAULT_ADDR, DEFAULT_INPUT_FILE, DEFAULT_TOP_K};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "newsrag", about = "Load news embeddings into a local vector collection and retrieve nearest documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upsert a JSON file of pre-embedded articles into the collection
    Ingest {
        /// JSON array of objects with embedding, content, title, link
        #[arg(default_value = DEFAULT_INPUT_FILE)]
        file: PathBuf,
    },
    /// Serve POST /retrieve over HTTP
    Serve {
        #[arg(long, default_value = DEFAULT_ADDR)]
        addr: SocketAddr,
    },
    /// Run one retrieval from the command line
    Query {
        text: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Show collection statistics
    Stats,
    /// Print one stored record by id
    Get {
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_defaults_to_embeddings_json() {
        let cli = Cli::try_parse_from(["newsrag", "ingest"]).unwrap();
        match cli.command {
            Commands::Ingest { file } => assert_eq!(file, PathBuf::from("embeddings.json")),
            _ => panic!("expected ingest"),
        }
    }

    #[test]
    fn query_top_k_flag() {
        let cli = Cli::try_parse_from(["newsrag", "query", "rust news", "--top-k", "5"]).unwrap();
        match cli.command {
            Commands::Query { text, top_k } => {
                assert_eq!(text, "rust news");
                assert_eq!(top_k, 5);
            }
            _ => panic!("expected query"),
        }
    }

    #[test]
    fn serve_rejects_bad_addr() {
        assert!(Cli::try_parse_from(["newsrag", "serve", "--addr", "not-an-addr"]).is_err());
    }
}
