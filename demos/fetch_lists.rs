//! Download every URL list under a path
//!
//! Usage: cargo run --example fetch_lists -- <output_dir> <list.txt | dir>...
//!
//! Set `RUST_LOG=photo_dl=debug` to see every attempt.

use photo_dl::{Config, Event, PhotoDownloader, SourceList, StatusLine};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(output_dir) = args.next() else {
        eprintln!("usage: fetch_lists <output_dir> <list.txt | dir>...");
        std::process::exit(2);
    };

    let mut sources = SourceList::new();
    for arg in args {
        match sources.add(Path::new(&arg)) {
            Ok(added) => println!("Added {} source file(s) from {}", added, arg),
            Err(e) => eprintln!("Skipping {}: {}", arg, e),
        }
    }

    let config = Config {
        output_dir: PathBuf::from(output_dir),
        sources: sources.into_vec(),
        ..Default::default()
    };
    let downloader = PhotoDownloader::new(config)?;

    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::SourceSkipped { path, error } => {
                    eprintln!("\nSkipped {}: {}", path.display(), error);
                }
                Event::FolderComplete { folder } => {
                    eprintln!("\nFinished folder {}", folder.display());
                }
                _ => {}
            }
        }
    });

    let summary = downloader.run(&mut StatusLine::stdout()).await?;
    for entry in &summary.abandoned {
        eprintln!("Gave up on {} ({})", entry, entry.url);
    }

    Ok(())
}
