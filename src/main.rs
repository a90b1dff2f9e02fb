use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use bedrate::catalog::Catalog;
use bedrate::config::Config;
use bedrate::engine::{self, EngineError};
use bedrate::model::{PriceListDocument, RoomType};
use bedrate::store;

// ── CLI definition ───────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "bedrate",
    about = "Occupancy variants and pricing rules for a price-list document"
)]
struct Cli {
    #[command(flatten)]
    config: Config,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
enum Command {
    /// Print a room type's occupancy table as JSON
    Table { room_type_id: String },
    /// Regenerate a room type's pricing rules, discarding edited prices
    Regenerate { room_type_id: String },
    /// Apply a stored pricing matrix to the room types it targets
    ApplyMatrix { matrix_id: String },
    /// Set one base price on every rule of a room type
    SetBase { room_type_id: String, price: f64 },
    /// Print validation problems; exits non-zero when there are any
    Validate,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let Cli { config, command } = Cli::parse();
    info!("bedrate {command:?} on {}", config.file.display());
    info!("  ordering: {:?}", config.ordering());

    let mut doc = store::load(&config.file)?;
    run(&config, command, &mut doc)
}

fn run(
    config: &Config,
    command: Command,
    doc: &mut PriceListDocument,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Command::Table { room_type_id } => {
            let room = find_room(doc, &room_type_id)?;
            print_json(&engine::occupancy_table(room), config.pretty)?;
        }
        Command::Regenerate { room_type_id } => {
            let room = find_room(doc, &room_type_id)?.clone();
            let catalog = catalog_for(doc)?;
            if doc.price_list.person_categories.is_empty() {
                doc.price_list.person_categories = catalog.categories().to_vec();
            }
            let warnings =
                engine::regenerate(&mut doc.price_list, &room, &catalog, config.ordering())?;
            store::save(&config.file, doc, config.pretty)?;
            print_json(&warnings, config.pretty)?;
        }
        Command::ApplyMatrix { matrix_id } => {
            let repriced = engine::apply_to_price_list(&mut doc.price_list, &matrix_id)?;
            store::save(&config.file, doc, config.pretty)?;
            println!("{repriced}");
        }
        Command::SetBase { room_type_id, price } => {
            let pricing = doc
                .price_list
                .room_type_pricing_mut(&room_type_id)
                .ok_or_else(|| EngineError::RoomTypeNotFound(room_type_id.clone()))?;
            engine::set_base_price(pricing, price)?;
            store::save(&config.file, doc, config.pretty)?;
        }
        Command::Validate => {
            let problems = engine::validate_price_list(&doc.price_list);
            print_json(&problems, config.pretty)?;
            if !problems.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn find_room<'a>(doc: &'a PriceListDocument, id: &str) -> Result<&'a RoomType, EngineError> {
    doc.room(id).ok_or_else(|| EngineError::RoomTypeNotFound(id.to_string()))
}

/// The price list's own categories, or the default catalog for a fresh list.
fn catalog_for(doc: &PriceListDocument) -> Result<Catalog, EngineError> {
    if doc.price_list.person_categories.is_empty() {
        warn!("price list {} has no person categories, using defaults", doc.price_list.id);
        return Ok(Catalog::default());
    }
    Catalog::new(doc.price_list.person_categories.clone())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
