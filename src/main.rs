use anyhow::{Context, Result};
use clap::Parser;
use gibscraper::{export, extract, fetch};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Command-line args: output paths for the CSV exports.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Export the Gibraltar HM Customs harmonised tariff to CSV"
)]
struct Args {
    /// Output CSV for the flat chapter/code/description table
    #[arg(long, default_value = "gibraltar_tariff.csv")]
    outfile: PathBuf,

    /// Optional output CSV for chapter titles
    #[arg(long)]
    chapters_outfile: Option<PathBuf>,

    /// Optional output CSV for the full heading/subheading hierarchy
    #[arg(long)]
    hierarchy_outfile: Option<PathBuf>,
}

/// Fixed spacing between chapter requests.
const REQUEST_DELAY: Duration = Duration::from_millis(300);

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let client = fetch::client()?;

    let mut records = Vec::new();
    let mut chapters = Vec::new();

    for chapter in fetch::CHAPTERS {
        info!(chapter, "fetching chapter");
        let text = match fetch::fetch_chapter_text(&client, chapter).await {
            Ok(text) => text,
            Err(err) => {
                warn!(chapter, %err, "chapter fetch failed, skipping");
                continue;
            }
        };

        chapters.push(extract::chapter_title(&text, chapter));

        let found = extract::extract_records(&text, chapter);
        info!(chapter, codes = found.len(), "extracted codes");
        records.extend(found);

        sleep(REQUEST_DELAY).await;
    }

    info!(total = records.len(), "writing exports");
    export::write_flat_csv(&args.outfile, &records)
        .with_context(|| format!("writing {}", args.outfile.display()))?;
    info!(path = %args.outfile.display(), "wrote tariff CSV");

    if let Some(path) = &args.chapters_outfile {
        export::write_chapters_csv(path, &chapters)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote chapters CSV");
    }

    if let Some(path) = &args.hierarchy_outfile {
        export::write_hierarchy_csv(path, &records)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote hierarchy CSV");
    }

    info!("all done");
    Ok(())
}
