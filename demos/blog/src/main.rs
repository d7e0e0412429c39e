//! netmera-blog: post, list and search blog entries

mod blog;
mod config;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog::{Blog, Post};
use config::{Args, Command};
use netmera_sdk::NetmeraClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("netmera_blog={0},netmera_sdk={0},netmera_client={0}", args.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let client = NetmeraClient::new(args.client_config())?;
    let blog = Blog::new(client);

    match args.command {
        Command::Add { title, text } => {
            let path = blog.add(&title, &text).await?;
            info!(%path, "entry published");
            println!("{}", path);
        }
        Command::List { max } => print_posts(&blog.list(max).await?),
        Command::Search { text } => print_posts(&blog.search(&text).await?),
    }

    Ok(())
}

fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("No entries.");
        return;
    }
    for post in posts {
        match &post.path {
            Some(path) => println!("# {} ({})", post.title, path),
            None => println!("# {}", post.title),
        }
        println!("{}", post.text);
        println!();
    }
}
