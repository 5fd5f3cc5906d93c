//! tagctl - tag classifier CLI client
//!
//! Control and test interface for tagd.

use clap::{Parser, Subcommand};
use tag_classifier::client::{ClassifierClient, DEFAULT_URL};
use tag_classifier::{ClassificationResult, ClassifyRequest};

/// Tag classifier CLI client
#[derive(Parser)]
#[command(name = "tagctl")]
#[command(version = tag_classifier::PKG_VERSION)]
#[command(about = "Tag classifier client")]
struct Args {
    /// Server address
    #[arg(short, long, env = "TAGD_ADDRESS", default_value = DEFAULT_URL)]
    address: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check service health
    Health,

    /// Show service information
    Info,

    /// Classify tags into one of the given categories
    Classify {
        /// Comma-separated tags
        #[arg(short, long, value_delimiter = ',', required = true)]
        tags: Vec<String>,
        /// Comma-separated candidate categories
        #[arg(short, long, value_delimiter = ',', required = true)]
        categories: Vec<String>,
        /// Judge each category independently
        #[arg(long)]
        multi_label: bool,
        /// Print the full score distribution
        #[arg(long)]
        scores: bool,
    },

    /// Run example classifications against the server
    Demo,
}

const DEMO_CATEGORIES: &[&str] = &["animals", "landscape", "portrait", "architecture"];

/// (tags, categories, show scores)
const DEMO_CASES: &[(&[&str], &[&str], bool)] = &[
    (&["dog", "park", "outdoor"], DEMO_CATEGORIES, false),
    (&["sunset", "mountains", "hiking"], DEMO_CATEGORIES, true),
    (&["woman", "smiling", "close-up", "face"], DEMO_CATEGORIES, true),
    (
        &["Hund", "Park", "spielend"],
        &["Tiere", "Landschaft", "Portrait", "Architektur"],
        false,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let client = ClassifierClient::new(&args.address)?;

    match args.command {
        Command::Health => {
            let health = client.health().await?;
            println!("tagd {}", health.version);
            println!("status: {}", health.status);
            println!("model:  {}", health.model);
            println!("time:   {}", health.timestamp);
        }

        Command::Info => {
            let info = client.info().await?;
            println!("{} {}", info.name, info.version);
            println!("model: {}", info.model);
            println!("endpoints:");
            for (path, description) in &info.endpoints {
                println!("  {path}: {description}");
            }
        }

        Command::Classify {
            tags,
            categories,
            multi_label,
            scores,
        } => {
            let request = ClassifyRequest::new(tags, categories)
                .multi_label(multi_label)
                .return_scores(scores);
            let result = client.classify(&request).await?;
            print_result(&result);
        }

        Command::Demo => run_demo(&client).await?,
    }

    Ok(())
}

async fn run_demo(client: &ClassifierClient) -> Result<(), Box<dyn std::error::Error>> {
    let health = client.health().await?;
    println!("tagd {} at {} ({})", health.version, client.base_url(), health.model);

    for (tags, categories, scores) in DEMO_CASES {
        println!();
        println!("tags:       {}", tags.join(", "));
        println!("categories: {}", categories.join(", "));
        let request = ClassifyRequest::new(tags.iter().copied(), categories.iter().copied())
            .return_scores(*scores);
        match client.classify(&request).await {
            Ok(result) => print_result(&result),
            Err(e) => println!("error: {e}"),
        }
    }

    // Rejected requests
    for (tags, categories) in [
        (&[][..], DEMO_CATEGORIES),
        (&["dog"][..], &["only_one"][..]),
    ] {
        println!();
        let request = ClassifyRequest::new(tags.iter().copied(), categories.iter().copied());
        match client.classify(&request).await {
            Ok(result) => println!("unexpected success: {}", result.category),
            Err(e) => println!("rejected as expected: {e}"),
        }
    }

    Ok(())
}

fn print_result(result: &ClassificationResult) {
    println!("category: {} ({:.2}%)", result.category, result.score * 100.0);
    if let Some(all_scores) = &result.all_scores {
        for (category, score) in all_scores.iter() {
            println!("  {category:<16} {:.2}%", score * 100.0);
        }
    }
}
