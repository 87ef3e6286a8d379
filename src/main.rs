use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use esa_attachments::{Client, ClientConfig};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upload local files as esa.io attachments and print their URLs
#[derive(Parser, Debug)]
#[command(name = "esa-upload", version)]
struct Args {
    /// Team name (the `<team>` in `<team>.esa.io`)
    #[arg(short, long, env = "ESA_TEAM")]
    team: String,

    /// Files to upload, in order
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "esa_attachments=info,esa_upload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = ClientConfig::from_env();
    if config.access_token.is_none() {
        warn!("⚠️  ESA_ACCESS_TOKEN is not set; policy requests will be unauthenticated");
    }
    let client = Client::new(config).context("failed to build esa client")?;
    let attachments = client.attachments();

    info!(
        "📎 Uploading {} file(s) to team {} via {}",
        args.paths.len(),
        args.team,
        client.base_url()
    );

    for path in &args.paths {
        let url = attachments
            .upload_file(&args.team, path)
            .await
            .with_context(|| format!("failed to upload {}", path.display()))?;
        println!("{url}");
    }

    Ok(())
}
