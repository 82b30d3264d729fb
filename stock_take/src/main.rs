//! Stock Take - pantry and bar stock tracker
//!
//! Command-line front-end: each invocation loads the item list (store first,
//! local mirror as fallback), performs one action and prints the result.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use stock_common::{CategoryGroup, CategorySet, Item, ItemDraft, ItemId};
use stock_take::{
    today, Backend, Config, Confirm, LineSource, LoadSource, ProductLookup, Result, ScanOutcome,
    ScanSession, StockController, Submitted, Tab,
};
use tokio::io::BufReader;

/// Track pantry or bar stock, shopping list and expiring items
#[derive(Parser, Debug)]
#[command(name = "stock_take")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the config file (default: ~/.config/stock_take/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Item store to use
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Kind of stock: pantry or bar
    #[arg(long)]
    category_set: Option<CategorySet>,

    /// Directory for the local mirror and SQLite database
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to the SQLite database file (sqlite backend)
    #[arg(long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the items of one category
    List {
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Items at or below their reorder threshold
    Shopping,
    /// Items expiring today or tomorrow
    Expiring,
    /// Search item names within a category
    Search {
        term: String,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Add a new item
    Add(ItemArgs),
    /// Change fields of an existing item
    Edit {
        id: String,
        #[command(flatten)]
        changes: ItemArgs,
    },
    /// Delete an item
    Delete {
        id: String,
        /// Do not ask for confirmation
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
    /// Read a barcode from stdin, look up the product and add it
    Scan(ItemArgs),
    /// Reload from the store and refresh the local mirror
    Sync,
}

#[derive(ClapArgs, Debug, Default)]
struct ItemArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    quantity: Option<String>,
    #[arg(long)]
    threshold: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    expiry: Option<String>,
}

impl ItemArgs {
    fn apply(&self, draft: &mut ItemDraft) {
        let fields = [
            (&self.name, &mut draft.name),
            (&self.quantity, &mut draft.quantity),
            (&self.threshold, &mut draft.threshold),
            (&self.category, &mut draft.category),
            (&self.expiry, &mut draft.expiry),
        ];
        for (value, target) in fields {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
    }
}

/// y/N prompt on the terminal
struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(set) = args.category_set {
        config.category_set = set;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(db) = args.database {
        config.database = Some(db);
    }

    let store = config.open_store()?;
    let mut controller =
        StockController::new(store, config.category_set).with_mirror(config.mirror());

    if !matches!(args.command, Command::Sync) && controller.load().await == LoadSource::Mirror {
        eprintln!("Store unreachable, showing the local copy");
    }

    match args.command {
        Command::List { category } => {
            if let Some(category) = category {
                controller.set_category(&category)?;
            }
            print_groups(&controller.current_view(today()));
        }
        Command::Shopping => {
            controller.set_tab(Tab::Shopping);
            print_groups(&controller.current_view(today()));
        }
        Command::Expiring => {
            controller.set_tab(Tab::Expiry);
            print_groups(&controller.current_view(today()));
        }
        Command::Search { term, category } => {
            if let Some(category) = category {
                controller.set_category(&category)?;
            }
            controller.set_search(term);
            print_groups(&controller.current_view(today()));
        }
        Command::Add(item) => {
            item.apply(controller.draft_mut());
            report(controller.submit().await?);
        }
        Command::Edit { id, changes } => {
            controller.edit(&ItemId::new(id))?;
            changes.apply(controller.draft_mut());
            report(controller.submit().await?);
        }
        Command::Delete { id, yes } => {
            let id = ItemId::new(id);
            let deleted = if yes {
                controller.delete(&id, &|_: &str| true).await?
            } else {
                controller.delete(&id, &TerminalConfirm).await?
            };
            if deleted {
                println!("Deleted {}", id);
            }
        }
        Command::Scan(item) => scan(&mut controller, &config, item).await?,
        Command::Sync => {
            let count = controller.sync().await?;
            println!("Synced {} items", count);
        }
    }

    Ok(())
}

async fn scan(controller: &mut StockController, config: &Config, item: ItemArgs) -> Result<()> {
    // Quantity and expiry typed up front are kept by the prefill
    let up_front = ItemArgs {
        quantity: item.quantity.clone(),
        expiry: item.expiry.clone(),
        ..ItemArgs::default()
    };
    up_front.apply(controller.draft_mut());

    println!("Scan a barcode (empty line cancels):");
    let session = ScanSession::new(LineSource::new(BufReader::new(tokio::io::stdin())));
    let lookup = config.product_lookup();
    let scanned = controller
        .scan(session, lookup.as_ref().map(|l| l as &dyn ProductLookup), today())
        .await;

    match scanned.outcome {
        ScanOutcome::Unavailable => {
            eprintln!("Barcode capture is not available");
            return Ok(());
        }
        ScanOutcome::Cancelled if item.name.is_none() => return Ok(()),
        ScanOutcome::Detected(ref d) => println!("Scanned {}", d.barcode),
        ScanOutcome::Cancelled => {}
    }

    if let Some(e) = scanned.lookup_error {
        eprintln!("Product not recognized: {}", e);
        if item.name.is_none() {
            return Ok(());
        }
    }

    // Explicit flags win over whatever the scan filled in
    item.apply(controller.draft_mut());

    report(controller.submit().await?);
    Ok(())
}

fn report(submitted: Submitted) {
    match submitted {
        Submitted::Created(id) => println!("Added {}", id),
        Submitted::Updated(id) => println!("Updated {}", id),
    }
}

fn print_groups(groups: &[CategoryGroup<'_>]) {
    for group in groups {
        println!("{}", group.category);
        if group.is_empty() {
            println!("  (none)");
        }
        for item in &group.items {
            print_item(item);
        }
    }
}

fn print_item(item: &Item) {
    let expiry = item
        .fields
        .expiry
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {:<28} qty {:>6}  threshold {:>6}  expiry {:<10}  [{}]",
        item.fields.name, item.fields.quantity, item.fields.threshold, expiry, item.id
    );
}
