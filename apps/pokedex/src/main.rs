use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    item_path, parse_deep_link, CatalogCoordinator, HttpResourceClient, Navigator,
    PageFetchFailure, PokedexCoordinator, MAX_OFFSET, PAGE_SIZE,
};
use shared::domain::{ItemId, Pokemon};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{error, info, warn};

mod config;
mod script;

use config::load_settings;
use script::Action;

#[derive(Parser, Debug)]
#[command(about = "Page through the catalog and inspect items from the terminal")]
struct Args {
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    collection: Option<String>,
    #[arg(long)]
    route_prefix: Option<String>,
    /// Navigation target to start from, e.g. /pokedex/45
    #[arg(long)]
    path: Option<String>,
    /// Actions replayed after the first page loads: next, prev, select=<id>
    actions: Vec<Action>,
}

/// Stands in for the browser router: logs the route it would push.
struct LoggingNavigator {
    route_prefix: String,
}

impl Navigator for LoggingNavigator {
    fn navigate_to_item(&self, item_id: ItemId) {
        info!(path = %item_path(&self.route_prefix, item_id), "navigate");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    settings.apply_overrides(args.api_url, args.collection, args.route_prefix);

    let client = HttpResourceClient::new(&settings.api_url, &settings.collection)
        .with_context(|| format!("invalid catalog url '{}'", settings.api_url))?;
    let navigator = Arc::new(LoggingNavigator {
        route_prefix: settings.route_prefix.clone(),
    });
    let coordinator: Arc<PokedexCoordinator> =
        CatalogCoordinator::new_with_navigator(client, navigator);
    let mut errors = coordinator.subscribe_errors();

    let deep_link = args
        .path
        .as_deref()
        .and_then(|path| parse_deep_link(path, &settings.route_prefix));
    if let (Some(path), None) = (args.path.as_deref(), deep_link) {
        warn!(path, "not an item route; starting from the list");
    }

    coordinator.initialize(deep_link);
    wait_until_idle(&coordinator, &mut errors).await?;
    print_state(&coordinator);

    for action in args.actions {
        match action {
            Action::Next => coordinator.next_page(),
            Action::Previous => coordinator.previous_page(),
            Action::Select(item_id) => {
                match coordinator
                    .items()
                    .into_iter()
                    .find(|pokemon| pokemon.id == item_id)
                {
                    Some(pokemon) => coordinator.select_item(pokemon),
                    None => warn!(item_id = item_id.0, "item is not on the current page"),
                }
            }
        }
        wait_until_idle(&coordinator, &mut errors).await?;
        print_state(&coordinator);
    }

    Ok(())
}

async fn wait_until_idle(
    coordinator: &PokedexCoordinator,
    errors: &mut broadcast::Receiver<PageFetchFailure>,
) -> Result<()> {
    let mut loading = coordinator.subscribe_loading();
    while loading.recv().await.context("loading state closed")? {}

    loop {
        match errors.try_recv() {
            Ok(failure) => report_failure(&failure),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "missed page fetch failures");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

fn report_failure(failure: &PageFetchFailure) {
    error!(
        offset = failure.offset,
        error = %failure.error,
        "page fetch failed; keeping the previous page"
    );
    if failure.error.code().is_some_and(|code| code.is_retryable()) {
        println!("Catalog temporarily unavailable; try again later.");
    }
}

fn print_state(coordinator: &PokedexCoordinator) {
    let offset = coordinator.offset();
    println!(
        "page {}/{} (offset {offset}){}{}",
        coordinator.page_index() + 1,
        MAX_OFFSET / PAGE_SIZE + 1,
        if coordinator.can_go_previous() { " [prev]" } else { "" },
        if coordinator.can_go_next() { " [next]" } else { "" },
    );
    for pokemon in coordinator.items() {
        println!("  #{:<4} {}", pokemon.id.0, pokemon.name);
    }
    if let Some(selected) = coordinator.selected_item() {
        print_details(&selected);
    }
}

fn print_details(pokemon: &Pokemon) {
    println!(
        "selected #{} {} [{}] height={} weight={}",
        pokemon.id,
        pokemon.name,
        pokemon.type_names().join(", "),
        pokemon.height,
        pokemon.weight,
    );
    for stat in &pokemon.stats {
        println!("  {:<16} {}", stat.stat.name, stat.base_stat);
    }
}
