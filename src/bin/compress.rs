use clap::Parser;
use dotenvy::dotenv;
use pdf_compressor::client::{CompressFlow, HttpTransport, SelectedFile, UploadSession};
use pdf_compressor::config::ClientConfig;
use pdf_compressor::utils::format::{format_file_size, format_ratio};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compress a PDF through the compression server", long_about = None)]
struct Args {
    /// PDF file to compress
    file: PathBuf,

    /// Base URL of the compression server
    #[arg(short, long)]
    server: Option<String>,

    /// Directory the compressed file is written to
    #[arg(short, long)]
    output: Option<String>,

    /// Skip the local pass and let the server do all the work
    #[arg(long)]
    server_only: bool,

    /// Largest upload allowed after the local pass, in bytes
    #[arg(long)]
    max_upload: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_compressor=warn,compress=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = ClientConfig::from_env();
    if let Some(server) = args.server {
        config.server_url = server;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(max_upload) = args.max_upload {
        config.upload_ceiling = max_upload;
    }
    if args.server_only {
        config.local_pass = false;
    }

    let transport = Arc::new(HttpTransport::from_config(&config));
    let flow = CompressFlow::new(config, transport);
    let mut session = UploadSession::new();

    let file = SelectedFile::from_path(&args.file).await?;
    if let Err(e) = session.select_file(file) {
        eprintln!("❌ {}", session.error().unwrap_or("An error occurred"));
        return Err(e.into());
    }

    if let Some(file) = session.file() {
        println!("File: {}", file.name);
        println!("Size: {}", format_file_size(file.size()));
    }

    let mode = if flow.config().local_pass {
        "local + server"
    } else {
        "server"
    };
    println!("Compressing ({})...", mode);

    match flow.run(&mut session).await {
        Ok(download) => {
            let stats = &download.stats;
            println!();
            println!("Compression Results");
            println!("  Original Size:     {}", format_file_size(stats.original_size));
            if let Some(intermediate) = stats.intermediate_size {
                println!("  After Local Pass:  {}", format_file_size(intermediate));
            }
            println!("  Compressed Size:   {}", format_file_size(stats.final_size));
            println!("  Compression:       {}%", format_ratio(stats.ratio_percent));
            println!();
            println!("✅ Saved to {}", download.path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", session.error().unwrap_or("An error occurred"));
            Err(e.into())
        }
    }
}
