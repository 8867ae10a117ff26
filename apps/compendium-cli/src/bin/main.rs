use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use compendium_cli::{init_tracing, open_session, print_hits};
use compendium_core::taxonomy::{filter_groups, parse_selection, CATEGORIES, QUICK_ACCESS};
use compendium_core::types::{Category, SearchHit};
use compendium_session::FilterApplication;

#[derive(Parser, Debug)]
#[command(name = "compendium")]
#[command(about = "Look up D&D 5e SRD content", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log more (-v debug, -vv trace); default is RUST_LOG or info
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List browsable categories
    #[command(alias = "ls")]
    Categories,

    /// List the filter groups a category offers
    Groups { category: String },

    /// Search a category by name
    #[command(alias = "s")]
    Search {
        category: String,
        /// Case-insensitive name fragment; omit to list everything
        query: Option<String>,
    },

    /// Search, then narrow by attributes
    #[command(alias = "f")]
    Filter {
        category: String,
        #[arg(short, long)]
        query: Option<String>,
        /// group=value[,value...], repeatable (e.g. --where level=3 --where school=evocation)
        #[arg(short = 'w', long = "where", required = true)]
        filters: Vec<String>,
    },

    /// Show one record
    #[command(alias = "v")]
    Show { category: String, index: String },
}

fn emit_hits(hits: &[SearchHit], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(hits)?);
    } else {
        print_hits(hits);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Categories => {
            println!("Quick access:");
            for q in QUICK_ACCESS {
                println!("  {:<16} {}", q.slug, q.description);
            }
            println!();
            println!("All categories:");
            for c in CATEGORIES {
                println!("  {:<20} {}", c.slug, c.label);
            }
        }
        Commands::Groups { category } => {
            let category = Category::new(category);
            let groups = filter_groups(&category);
            if groups.is_empty() {
                println!("{} has no attribute filters.", category);
            }
            for group in groups {
                let values: Vec<&str> = group.options.iter().map(|o| o.value).collect();
                println!("{} ({}): {}", group.id, group.label, values.join(", "));
            }
        }
        Commands::Search { category, query } => {
            let session = open_session()?;
            let hits = session.search(query.as_deref().unwrap_or(""), &Category::new(category)).await;
            emit_hits(&hits, cli.json)?;
        }
        Commands::Filter { category, query, filters } => {
            let category = Category::new(category);
            let selection = parse_selection(&category, &filters)?;
            let session = open_session()?;
            session.search(query.as_deref().unwrap_or(""), &category).await;
            match session.apply_filters(selection).await {
                FilterApplication::Applied(_) => emit_hits(&session.displayed(), cli.json)?,
                other => bail!("Filtering did not complete: {:?}", other),
            }
        }
        Commands::Show { category, index } => {
            let category = Category::new(category);
            let session = open_session()?;
            session.set_category(category.clone());
            let hit = SearchHit::from_id(&category, &index);
            let view = session
                .show(&hit)
                .await
                .with_context(|| format!("Could not load {} '{}'", category, index))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", view);
            }
        }
    }
    Ok(())
}
