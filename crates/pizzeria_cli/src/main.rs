//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire configuration, logging, storage and services end to end.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `pizzeria_cli [version|seed|list]` (default `list`).

use clap::{Parser, Subcommand};
use log::info;
use pizzeria_core::db::{open_db, open_db_in_memory};
use pizzeria_core::{
    init_logging_from_config, CatalogService, CoreConfig, Pizza, PizzaDraft, PizzaService,
    SqliteCategoryRepository, SqliteIngredientRepository, SqlitePizzaRepository,
};
use rusqlite::Connection;
use std::error::Error;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "pizzeria_cli")]
#[command(about = "Pizzeria menu smoke checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Print the core library version
    Version,
    /// Insert the demo menu, then list it
    Seed,
    /// List pizzas (the default)
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command.unwrap_or(Command::List)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let config = CoreConfig::from_env()?;
    init_logging_from_config(&config)?;

    if command == Command::Version {
        println!("pizzeria_core version={}", pizzeria_core::core_version());
        return Ok(());
    }

    let in_memory = config.db_path.is_none();
    let conn = match config.db_path.as_ref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };

    match command {
        Command::Seed => seed_demo_menu(&conn)?,
        Command::List if in_memory => {
            // Nothing persisted between runs; show the demo menu instead.
            seed_demo_menu(&conn)?;
        }
        Command::List | Command::Version => {}
    }

    let pizzas = PizzaService::with_limits(
        SqlitePizzaRepository::try_new(&conn)?,
        config.list_limits,
    );
    let listed = pizzas.list_pizzas(None, 0)?;
    info!(
        "event=cli_list module=cli status=ok count={} applied_limit={}",
        listed.items.len(),
        listed.applied_limit
    );
    for pizza in &listed.items {
        println!("{}", render_pizza(pizza));
    }
    Ok(())
}

fn seed_demo_menu(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let catalog = CatalogService::new(
        SqliteCategoryRepository::try_new(conn)?,
        SqliteIngredientRepository::try_new(conn)?,
    );
    let classic = catalog.create_category("Classiche")?;
    let spicy = catalog.create_category("Piccanti")?;
    let mozzarella = catalog.create_ingredient("Mozzarella")?;
    let tomato = catalog.create_ingredient("Pomodoro")?;
    let salami = catalog.create_ingredient("Salame piccante")?;

    let pizzas = PizzaService::new(SqlitePizzaRepository::try_new(conn)?);
    pizzas.create_pizza(
        &PizzaDraft::new("Margherita", 7.5)
            .with_description("pomodoro, mozzarella, basilico")
            .with_category(classic.id)
            .with_ingredients([tomato.id, mozzarella.id]),
    )?;
    pizzas.create_pizza(
        &PizzaDraft::new("Diavola", 8.0)
            .with_category(spicy.id)
            .with_ingredients([tomato.id, mozzarella.id, salami.id]),
    )?;
    pizzas.create_pizza(&PizzaDraft::new("Marinara", 6.0).with_ingredients([tomato.id]))?;
    Ok(())
}

fn render_pizza(pizza: &Pizza) -> String {
    let category = pizza
        .category
        .as_ref()
        .map_or("-", |category| category.name.as_str());
    format!(
        "#{} {} ({:.2}) [{}] {}",
        pizza.id,
        pizza.name,
        pizza.price,
        category,
        pizza.ingredient_names().join(", ")
    )
}
