use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};

use compendium_cli::{init_tracing, open_session, print_hits, Session};
use compendium_core::taxonomy::{category_info, filter_groups, parse_selection, QUICK_ACCESS};
use compendium_core::types::Category;
use compendium_session::FilterApplication;

fn show_help() {
    println!("Commands:");
    println!("  /help               - Show this help message");
    println!("  /cat <category>     - Switch category (quick: {})", quick_slugs().join(", "));
    println!("  /groups             - List filter groups for the current category");
    println!("  /filter g=v,v g=v   - Narrow the current results by attributes");
    println!("  /clear              - Drop all filters");
    println!("  /results            - Print the displayed results again");
    println!("  /show <n|index>     - Show a record by list number or index");
    println!("  /quit               - Exit");
    println!("  <text>              - Search the current category by name");
}

fn quick_slugs() -> Vec<&'static str> {
    QUICK_ACCESS.iter().map(|q| q.slug).collect()
}

fn report(application: FilterApplication, session: &Session) {
    match application {
        FilterApplication::Applied(_) => print_hits(&session.displayed()),
        FilterApplication::Superseded => println!("Superseded by a newer filter."),
        FilterApplication::Skipped => println!("Pick a category first (/cat <category>)."),
    }
}

async fn handle(session: &Session, input: &str) -> anyhow::Result<bool> {
    let (command, rest) = input.split_once(' ').map_or((input, ""), |(c, r)| (c, r.trim()));
    match command {
        "/help" | "/h" => show_help(),
        "/quit" | "/q" | "quit" | "exit" => return Ok(false),
        "/cat" | "/c" => {
            if rest.is_empty() {
                println!("Usage: /cat <category>");
            } else {
                let category = Category::new(rest);
                if category_info(category.slug()).is_none() {
                    println!("Unknown category '{}'; trying it anyway.", category);
                }
                let hits = session.search("", &category).await;
                print_hits(&hits);
            }
        }
        "/groups" | "/g" => match session.category() {
            Some(category) => {
                let active = session.active_filters();
                for group in filter_groups(&category) {
                    let values: Vec<String> = group
                        .options
                        .iter()
                        .map(|o| {
                            let on = active.values(group.id).is_some_and(|v| v.contains(o.value));
                            if on { format!("*{}", o.value) } else { o.value.to_string() }
                        })
                        .collect();
                    println!("  {:<20} {}", group.id, values.join(" "));
                }
            }
            None => println!("No category selected."),
        },
        "/filter" | "/f" => {
            let Some(category) = session.category() else {
                println!("Pick a category first (/cat <category>).");
                return Ok(true);
            };
            let clauses: Vec<&str> = rest.split_whitespace().collect();
            match parse_selection(&category, &clauses) {
                Ok(selection) => report(session.apply_filters(selection).await, session),
                Err(e) => println!("{}", e),
            }
        }
        "/clear" => report(session.clear_filters().await, session),
        "/results" | "/r" => print_hits(&session.displayed()),
        "/show" | "/s" => {
            let displayed = session.displayed();
            let hit = match rest.parse::<usize>() {
                Ok(n) if n >= 1 && n <= displayed.len() => Some(displayed[n - 1].clone()),
                _ => displayed.into_iter().find(|h| h.id == rest),
            };
            match hit {
                Some(hit) => match session.show(&hit).await {
                    Some(view) => print!("{}", view),
                    None => println!("Could not load '{}'.", hit.id),
                },
                None => println!("No result '{}' in the current list.", rest),
            }
        }
        _ if command.starts_with('/') => println!("Unknown command {}; try /help", command),
        _ => match session.category() {
            Some(category) => print_hits(&session.search(input, &category).await),
            None => println!("Pick a category first (/cat <category>)."),
        },
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(0);
    let session = open_session()?;

    println!("D&D 5e Compendium");
    println!("=================");
    show_help();
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let prompt = session.category().map_or_else(|| "compendium".to_string(), |c| c.to_string());
        print!("{}> ", prompt);
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if !handle(&session, input).await? {
            println!("Goodbye!");
            break;
        }
        println!();
    }
    Ok(())
}
