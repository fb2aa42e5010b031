mod cli;

use bazaar::listing::{Marketplace, Submission};
use bazaar::{config, state};
use bazaar_common::paths::is_accepted_image;
use bazaar_db::catalog::SqliteCatalog;
use bazaar_db::migrations::schema_version;
use bazaar_db::pool::get_conn;
use bazaar_db::models::Item;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn print_items(items: &[Item]) {
    for item in items {
        print_item(item);
    }
}

fn print_item(item: &Item) {
    println!("{}\t{}\t{}\t{}", item.id, item.name, item.category, item.image);
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    if !is_accepted_image(path) {
        anyhow::bail!("only .jpg or .jpeg files are allowed: {:?}", path);
    }

    let data =
        std::fs::read(path).with_context(|| format!("Failed to read image file: {:?}", path))?;
    if data.is_empty() {
        anyhow::bail!("image data is empty: {:?}", path);
    }
    Ok(data)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "bazaar=trace,bazaar_db=debug,bazaar_common=debug".to_string()
        } else {
            "bazaar=info,bazaar_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    let open = || -> Result<(config::Config, Marketplace<SqliteCatalog>)> {
        let config = config::load_config_or_default(config_path)?;
        let market = state::open_marketplace(&config)?;
        Ok((config, market))
    };

    match cli.command {
        Commands::Init => {
            let (config, market) = open()?;
            println!("Database: {}", config.database.path.display());
            println!("Images: {}", market.images().root().display());

            let conn = get_conn(market.catalog().pool())?;
            println!("Schema version: {}", schema_version(&conn)?);
        }
        Commands::Add {
            name,
            category,
            image,
        } => {
            let (_, market) = open()?;
            let mut submission = Submission::new(name, category);
            if let Some(path) = image {
                submission = submission.with_image(read_image(&path)?);
            }
            let id = market.submit(&submission)?;
            println!("item received: {} (id {})", submission.name, id);
        }
        Commands::List { json } => {
            let (_, market) = open()?;
            let items = market.items()?;
            if json {
                println!("{}", serde_json::json!({ "items": items }));
            } else {
                print_items(&items);
            }
        }
        Commands::Get { id, json } => {
            let (_, market) = open()?;
            let item = market.item(&id)?;
            if json {
                println!("{}", serde_json::to_string(&item)?);
            } else {
                print_item(&item);
            }
        }
        Commands::Search { keyword, json } => {
            let (_, market) = open()?;
            let items = market.search(&keyword)?;
            if json {
                println!("{}", serde_json::to_string(&items)?);
            } else {
                print_items(&items);
            }
        }
        Commands::Image { filename } => {
            let (_, market) = open()?;
            let path = market.image_path(&filename)?;
            println!("{}", path.display());
        }
        Commands::Validate { config: path } => {
            // Validation never touches the database or image directory
            config::load_config_or_default(path.as_deref().or(config_path))?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
