//! Friendstore CLI - command-line interface for the friends record store

use clap::{Parser, Subcommand};
use friendstore::config::{self, FriendstoreConfig};
use friendstore::contract::{COLUMN_NAME, COLUMN_NUM_FRIENDS, DEFAULT_AUTHORITY, FriendsContract};
use friendstore::ui::{self, Icons};
use friendstore::{
    ChangeNotifier, ContentUri, ContentValues, Friend, FriendsDatabase, FriendsProvider, Selection, Value,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "friendstore")]
#[command(version)]
#[command(about = "URI-addressed record store for a friends table")]
#[command(long_about = r#"
Friendstore keeps a small SQLite table of friends (name, friend count)
and addresses it with content URIs:

  content://<authority>/friends       every friend
  content://<authority>/friends/<id>  one friend

Example usage:
  friendstore insert --name Dan --friends 555
  friendstore query --sort "name ASC"
  friendstore type --uri content://com.example.android.exampleprovider.app/friends/1
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Skip headers and summaries (also FRIENDSTORE_QUIET=1)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file (defaults to ./friendstore.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// List friends, or one friend by id
    Query {
        /// Record id (queries the item address)
        #[arg(long)]
        id: Option<i64>,

        /// Columns to return, comma-separated
        #[arg(short, long, value_delimiter = ',')]
        projection: Option<Vec<String>>,

        /// WHERE clause with ? placeholders (collection queries only)
        #[arg(short, long = "where")]
        selection: Option<String>,

        /// Placeholder values, in order
        #[arg(short, long = "arg", allow_hyphen_values = true)]
        args: Vec<String>,

        /// ORDER BY clause
        #[arg(long)]
        sort: Option<String>,
    },

    /// Insert one friend
    Insert {
        #[arg(short, long)]
        name: String,

        /// Number of friends
        #[arg(short, long, allow_hyphen_values = true)]
        friends: i64,
    },

    /// Insert friends from a JSON array of objects in one transaction
    BulkInsert {
        /// JSON file, e.g. [{"name": "Dan", "num_friends": 523}]
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Change one friend
    Update {
        #[arg(long)]
        id: i64,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long, allow_hyphen_values = true)]
        friends: Option<i64>,
    },

    /// Delete one friend, or everyone when no id is given
    Delete {
        #[arg(long)]
        id: Option<i64>,
    },

    /// Print the type descriptor for a URI
    Type {
        #[arg(short, long)]
        uri: String,
    },

    /// Insert the sample friends if the table is empty
    Seed,

    /// Serve the store over HTTP
    Serve {
        #[arg(short, long, default_value = "7878")]
        port: u16,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

fn emit_success(mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        let envelope = serde_json::json!({
            "ok": true,
            "command": command,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

/// Command-line placeholder values: integers bind as integers, anything else as text
fn parse_arg(raw: &str) -> Value {
    raw.parse::<i64>()
        .map(Value::Integer)
        .unwrap_or_else(|_| Value::Text(raw.to_string()))
}

fn open_provider(cli: &Cli) -> anyhow::Result<FriendsProvider> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let loaded = FriendstoreConfig::load(&config_path)?;
    let cwd = std::env::current_dir()?;
    let db_path = config::resolve_database_path(cli.database.as_deref(), loaded.as_ref(), &cwd);
    config::prepare_database_dir(&db_path)?;

    let authority = loaded
        .as_ref()
        .map(|c| c.authority().to_string())
        .unwrap_or_else(|| DEFAULT_AUTHORITY.to_string());

    tracing::debug!("Opening {:?} for authority {}", db_path, authority);
    let db = FriendsDatabase::open(&db_path)?;
    Ok(FriendsProvider::new(db, FriendsContract::new(authority), ChangeNotifier::new()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    ui::set_quiet(cli.quiet || ui::quiet_from_env());
    let mode = if cli.json { OutputMode::Json } else { OutputMode::Human };

    match &cli.command {
        Commands::Init { force } => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            let cfg = FriendstoreConfig {
                database: Some(
                    config::default_database_path_in(std::path::Path::new("."))
                        .display()
                        .to_string(),
                ),
                authority: Some(DEFAULT_AUTHORITY.to_string()),
            };
            cfg.save(&path, *force)?;

            if mode.is_human() {
                ui::success(&format!("Wrote {}", path.display()));
            }
            emit_success(mode, "init", serde_json::json!({ "path": path }))?;
        }

        Commands::Query { id, projection, selection, args, sort } => {
            let provider = open_provider(&cli)?;
            let uri = match id {
                Some(id) => provider.contract().item_uri(*id),
                None => provider.contract().collection_uri(),
            };
            let selection = match selection {
                Some(clause) => Selection::new(clause.clone(), args.iter().map(|a| parse_arg(a)).collect()),
                None => Selection::all(),
            };
            let columns: Option<Vec<&str>> =
                projection.as_ref().map(|p| p.iter().map(String::as_str).collect());

            let cursor = provider.query(&uri, columns.as_deref(), &selection, sort.as_deref())?;

            if mode.is_human() {
                ui::header(&format!("{} {}", Icons::SEARCH, uri));
                if cursor.is_empty() {
                    println!("{} No friends found.", Icons::CROSS);
                } else if projection.is_none() {
                    println!("{}", ui::friends_table(&Friend::all_from(&cursor)));
                    ui::summary_row("Rows:", &cursor.count().to_string());
                } else {
                    println!("{}", ui::cursor_table(&cursor));
                    ui::summary_row("Rows:", &cursor.count().to_string());
                }
            }
            emit_success(
                mode,
                "query",
                serde_json::json!({ "uri": uri, "rows": cursor.to_values() }),
            )?;
            cursor.close();
        }

        Commands::Insert { name, friends } => {
            let provider = open_provider(&cli)?;
            let table = provider.contract().collection_uri();
            let values = Friend::values(name.clone(), *friends);

            match provider.insert(&table, Some(&values))? {
                Some(uri) => {
                    if mode.is_human() {
                        println!("{} Inserted {}", Icons::NEW, uri);
                    }
                    emit_success(mode, "insert", serde_json::json!({ "uri": uri }))?;
                }
                None => anyhow::bail!("Insert rejected: missing field or duplicate name '{}'", name),
            }
        }

        Commands::BulkInsert { file } => {
            let mut provider = open_provider(&cli)?;
            let contents = std::fs::read_to_string(file)?;
            let entries: Vec<ContentValues> = serde_json::from_str(&contents)?;
            let table = provider.contract().collection_uri();

            let inserted = provider.bulk_insert(&table, &entries)?;

            if mode.is_human() {
                println!("{} Inserted {} of {} friends", Icons::NEW, inserted, entries.len());
                if inserted < entries.len() {
                    ui::warn(&format!("{} entries skipped", entries.len() - inserted));
                }
            }
            emit_success(
                mode,
                "bulk-insert",
                serde_json::json!({ "requested": entries.len(), "inserted": inserted }),
            )?;
        }

        Commands::Update { id, name, friends } => {
            let provider = open_provider(&cli)?;
            let uri = provider.contract().item_uri(*id);
            let mut values = ContentValues::new();
            if let Some(name) = name {
                values.put(COLUMN_NAME, name.clone());
            }
            if let Some(friends) = friends {
                values.put(COLUMN_NUM_FRIENDS, *friends);
            }

            let updated = provider.update(&uri, &values, &Selection::all())?;

            if mode.is_human() {
                if updated == 0 {
                    ui::warn(&format!("Nothing updated at {}", uri));
                } else {
                    println!("{} Updated {}", Icons::MOD, uri);
                }
            }
            emit_success(mode, "update", serde_json::json!({ "uri": uri, "updated": updated }))?;
        }

        Commands::Delete { id } => {
            let provider = open_provider(&cli)?;
            let uri = match id {
                Some(id) => provider.contract().item_uri(*id),
                None => provider.contract().collection_uri(),
            };

            let deleted = provider.delete(&uri, &Selection::all())?;

            if mode.is_human() {
                println!("{} Deleted {} row(s) at {}", Icons::DEL, deleted, uri);
            }
            emit_success(mode, "delete", serde_json::json!({ "uri": uri, "deleted": deleted }))?;
        }

        Commands::Type { uri } => {
            let provider = open_provider(&cli)?;
            let parsed = ContentUri::parse(uri)?;
            let descriptor = provider.get_type(&parsed)?;

            if mode.is_human() {
                ui::info("Type", &descriptor);
            }
            emit_success(mode, "type", serde_json::json!({ "uri": parsed, "type": descriptor }))?;
        }

        Commands::Seed => {
            let mut provider = open_provider(&cli)?;
            let inserted = provider.seed_if_empty()?;

            if mode.is_human() {
                if inserted == 0 {
                    ui::info("Seed", "table already has friends, nothing inserted");
                } else {
                    println!("{} Seeded {} friends", Icons::PERSON, inserted);
                }
            }
            emit_success(mode, "seed", serde_json::json!({ "inserted": inserted }))?;
        }

        Commands::Serve { port } => {
            let provider = open_provider(&cli)?;
            if mode.is_human() {
                ui::info("Database", &format!("{} {}", Icons::DATABASE, provider.contract().collection_uri()));
            }
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(friendstore::server::start_server(*port, provider))?;
        }
    }

    Ok(())
}
