use affinidi_jsonld::{HashAlgorithm, JsonLdOptionsBuilder, normalize, normalize_hash};
use clap::Parser;
use std::fs;
use tracing_subscriber::filter;

/// Print the canonical N-Quads of a JSON-LD document
#[derive(Parser)]
#[command(name = "canonicalize")]
#[command(bin_name = "canonicalize")]
struct Cli {
    /// JSON-LD file to canonicalize
    #[arg(short, long)]
    file_name: String,

    /// Base IRI for relative references
    #[arg(short, long)]
    base: Option<String>,

    /// Print the SHA-256 digest of the canonical form instead of the N-Quads
    #[arg(long)]
    hash: bool,
}

fn load_file(file: &str) -> String {
    fs::read_to_string(file).unwrap_or_else(|_| panic!("Failed to read file: {file}"))
}

fn main() {
    let args = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Logging failed, exiting...");

    let input = load_file(&args.file_name);
    let document = serde_json::from_str(&input).expect("Couldn't deserialize input");

    let mut builder = JsonLdOptionsBuilder::default().with_hash_algorithm(HashAlgorithm::Sha256);
    if let Some(base) = &args.base {
        builder = builder.with_base(base);
    }
    let options = builder.build();

    if args.hash {
        let digest = normalize_hash(&document, &options).expect("Failed to canonicalize");
        println!("{digest}");
    } else {
        let nquads = normalize(&document, &options).expect("Failed to canonicalize");
        print!("{nquads}");
    }
}
