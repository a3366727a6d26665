use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokeniser::application::sale::SaleProcessor;
use tokeniser::application::vault::TokenVault;
use tokeniser::config::{GatewayPolicy, VaultConfig};
use tokeniser::domain::card::mask_pan;
use tokeniser::domain::generator::SecureTokenGenerator;
use tokeniser::domain::ports::{CardStoreBox, TokenStoreBox};
use tokeniser::domain::validator::normalize_number;
use tokeniser::infrastructure::in_memory::{InMemoryCardStore, InMemoryTokenStore};
use tokeniser::infrastructure::sandbox::SandboxGateway;
use tokeniser::interfaces::csv::card_reader::CardReader;
use tokeniser::interfaces::csv::outcome_writer::{OutcomeWriter, SaleOutcomeRow, TokenRow};
use tokeniser::interfaces::csv::sale_reader::SaleReader;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Candidate tokens tried per card before issuance fails
    #[arg(long, global = true)]
    issue_attempts: Option<u32>,

    /// Timeout for a single gateway call, in milliseconds
    #[arg(long, global = true)]
    gateway_timeout_ms: Option<u64>,

    /// Gateway attempts per sale when the transport fails
    #[arg(long, global = true)]
    gateway_attempts: Option<u32>,

    /// Base delay between gateway retries, in milliseconds
    #[arg(long, global = true)]
    gateway_backoff_ms: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Tokenise every card of a `pan, expiry` CSV file
    Tokenise {
        /// Input cards CSV file
        input: PathBuf,
    },
    /// Charge every `token, amount` row of a CSV file against the sandbox gateway.
    ///
    /// Tokens are only known across runs when the vault is persistent, so
    /// this needs `--db-path` with the `storage-rocksdb` feature.
    Sale {
        /// Input sales CSV file
        input: PathBuf,
    },
}

impl Cli {
    fn vault_config(&self) -> VaultConfig {
        let mut config = VaultConfig::default();
        if let Some(attempts) = self.issue_attempts {
            config.max_issue_attempts = attempts;
        }
        config
    }

    fn gateway_policy(&self) -> GatewayPolicy {
        let mut policy = GatewayPolicy::default();
        if let Some(ms) = self.gateway_timeout_ms {
            policy.timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = self.gateway_attempts {
            policy.max_attempts = attempts;
        }
        if let Some(ms) = self.gateway_backoff_ms {
            policy.backoff = Duration::from_millis(ms);
        }
        policy
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(io::stderr().is_terminal()).init();
    }
}

fn in_memory_stores() -> (CardStoreBox, TokenStoreBox) {
    (
        Box::new(InMemoryCardStore::new()),
        Box::new(InMemoryTokenStore::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<&Path>) -> Result<(CardStoreBox, TokenStoreBox)> {
    use tokeniser::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            tracing::info!(path = %path.display(), "using RocksDB storage");
            Ok((Box::new(store.clone()), Box::new(store)))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<&Path>) -> Result<(CardStoreBox, TokenStoreBox)> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(in_memory_stores())
}

async fn run_tokenise(vault: &TokenVault, input: File, out: impl Write) -> Result<()> {
    let reader = CardReader::new(input);
    let mut writer = OutcomeWriter::new(out);

    for (index, row) in reader.cards().enumerate() {
        let row_number = index + 1;
        match row {
            Ok(card) => match vault.tokenise(&card.pan, &card.expiry).await {
                Ok(token) => writer
                    .write(&TokenRow {
                        card: mask_pan(&normalize_number(&card.pan)),
                        token_id: token.id,
                        token: token.value,
                    })
                    .into_diagnostic()?,
                Err(e) => error!(row = row_number, kind = %e.kind(), "Error tokenising card: {e}"),
            },
            Err(e) => error!(row = row_number, "Error reading card: {e}"),
        }
    }

    writer.flush().into_diagnostic()
}

async fn run_sale(processor: &SaleProcessor, input: File, out: impl Write) -> Result<()> {
    let reader = SaleReader::new(input);
    let mut writer = OutcomeWriter::new(out);

    for (index, row) in reader.sales().enumerate() {
        let sale = match row {
            Ok(sale) => sale,
            Err(e) => {
                error!(row = index + 1, "Error reading sale: {e}");
                continue;
            }
        };

        let result = processor.sale(&sale.token, sale.amount).await;
        let outcome = match result {
            Ok(message) => SaleOutcomeRow {
                token: sale.token,
                status: "approved".to_string(),
                message,
            },
            Err(e) => SaleOutcomeRow {
                token: sale.token,
                status: e.kind().to_string(),
                message: e.to_string(),
            },
        };
        writer.write(&outcome).into_diagnostic()?;
    }

    writer.flush().into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let (card_store, token_store) = open_stores(cli.db_path.as_deref())?;
    let vault = Arc::new(TokenVault::new(
        card_store,
        token_store,
        Box::new(SecureTokenGenerator::new()),
        cli.vault_config(),
    ));

    let stdout = io::stdout();
    match &cli.command {
        Command::Tokenise { input } => {
            let file = File::open(input).into_diagnostic()?;
            run_tokenise(&vault, file, stdout.lock()).await?;
        }
        Command::Sale { input } => {
            let file = File::open(input).into_diagnostic()?;
            if cli.db_path.is_none() || !cfg!(feature = "storage-rocksdb") {
                warn!(
                    "Running sales against an empty in-memory vault; every token will be unknown. Use --db-path for a persistent vault."
                );
            }
            let processor = SaleProcessor::new(
                vault.clone(),
                Box::new(SandboxGateway::new()),
                cli.gateway_policy(),
            );
            run_sale(&processor, file, stdout.lock()).await?;
        }
    }

    Ok(())
}
