use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use ccx_wallet_core::display::{
    self, TRANSACTION_FEE, format_balance, format_fee, format_overview, format_summary, parse_amount,
};
use ccx_wallet_core::outbox::Outbox;
use ccx_wallet_core::wallet::{Transaction, Wallet};
use ccx_wallet_core::{
    AddressMasker, PasswordPolicy, PasswordVerifier, SendCoordinator, SendField, SubmitOutcome,
    TransactionSummaryBuilder, UserSettings, WalletFile, WalletSource, WalletStore,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "ccx-wallet", about = "Conceal (CCX) wallet: compose, confirm and queue sends", version)]
struct Cli {
    /// Wallet file (default: <data dir>/ccx-wallet/wallets.json)
    #[arg(long, env = "CCX_WALLET_FILE")]
    wallet_file: Option<PathBuf>,

    /// Settings file (default: <data dir>/ccx-wallet/settings.json)
    #[arg(long, env = "CCX_SETTINGS")]
    settings: Option<PathBuf>,

    /// Outbox file (default: <data dir>/ccx-wallet/outbox.json)
    #[arg(long, env = "CCX_OUTBOX")]
    outbox: Option<PathBuf>,

    /// Wallet id to act on (default: the first wallet)
    #[arg(long)]
    wallet: Option<String>,

    /// Read password from stdin (for scripting)
    #[arg(long)]
    password_stdin: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a wallet and, on first use, set the spending password
    Init {
        #[arg(long)]
        id: String,
        #[arg(long)]
        address: String,
    },
    /// List wallets with their balances
    Wallets,
    /// Balance and transaction history of the selected wallet
    Overview,
    /// Apply a settled transaction reported by the daemon
    Record {
        #[arg(long)]
        hash: String,
        #[arg(long, value_enum)]
        direction: Direction,
        /// Amount in CCX, excluding the fee
        #[arg(long)]
        amount: String,
        /// Counterparty address
        #[arg(long)]
        address: String,
        /// Fee in CCX (sent transactions only)
        #[arg(long)]
        fee: Option<String>,
        /// Unix timestamp (default: now)
        #[arg(long)]
        timestamp: Option<i64>,
        #[arg(long)]
        message: Option<String>,
    },
    /// Compose, confirm and submit a send
    Send {
        #[arg(long)]
        to: String,
        /// Amount in CCX, e.g. 1.5
        #[arg(long)]
        amount: String,
        #[arg(long)]
        payment_id: Option<String>,
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        label: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List sends waiting in the outbox
    Outbox,
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Received,
    Sent,
}

impl Cli {
    fn wallet_file(&self) -> Result<WalletFile> {
        let path = match &self.wallet_file {
            Some(path) => path.clone(),
            None => WalletFile::default_path()?,
        };
        Ok(WalletFile::at(path))
    }

    fn settings(&self) -> Result<UserSettings> {
        match &self.settings {
            Some(path) => UserSettings::open_at(path),
            None => UserSettings::open(),
        }
    }

    fn outbox_path(&self) -> Result<PathBuf> {
        match &self.outbox {
            Some(path) => Ok(path.clone()),
            None => Outbox::default_path(),
        }
    }

    fn store(&self, file: &WalletFile) -> Result<WalletStore> {
        if !file.exists() {
            bail!(
                "Wallet file not found: {}. Create one first with `ccx-wallet init`.",
                file.path().display()
            );
        }
        let mut store = WalletStore::load(file)?;
        if let Some(id) = &self.wallet {
            store.select_by_id(id)?;
        }
        Ok(store)
    }

    fn read_password(&self, prompt: &str) -> Result<Zeroizing<String>> {
        if self.password_stdin {
            read_password_stdin()
        } else {
            Ok(Zeroizing::new(
                rpassword::prompt_password(prompt).context("Failed to read password")?,
            ))
        }
    }
}

fn read_password_stdin() -> Result<Zeroizing<String>> {
    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .context("Failed to read password from stdin")?;
    let trimmed = password
        .trim_end_matches('\n')
        .trim_end_matches('\r')
        .to_string();
    use zeroize::Zeroize;
    password.zeroize();
    Ok(Zeroizing::new(trimmed))
}

fn confirm_prompt(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Init { id, address } => run_init(&cli, id, address),
        Command::Wallets => run_wallets(&cli),
        Command::Overview => run_overview(&cli),
        Command::Record {
            hash,
            direction,
            amount,
            address,
            fee,
            timestamp,
            message,
        } => {
            let amount = parse_amount(amount).map_err(|e| anyhow::anyhow!(e))?;
            let fee = match fee {
                Some(fee) => parse_amount(fee).map_err(|e| anyhow::anyhow!(e))?,
                None => TRANSACTION_FEE,
            };
            let timestamp = (*timestamp).unwrap_or_else(unix_now);
            let mut tx = match direction {
                Direction::Received => Transaction::received(hash, timestamp, amount, address)?,
                Direction::Sent => Transaction::sent(hash, timestamp, amount, fee, address)?,
            };
            if let Some(message) = message {
                tx = tx.with_message(message);
            }
            run_record(&cli, tx)
        }
        Command::Send {
            to,
            amount,
            payment_id,
            message,
            label,
            yes,
        } => {
            let mut fields = vec![
                SendField::ToAddress(to.clone()),
                SendField::Amount(parse_amount(amount).map_err(|e| anyhow::anyhow!(e))?),
            ];
            fields.extend(payment_id.clone().map(SendField::PaymentId));
            fields.extend(message.clone().map(SendField::Message));
            fields.extend(label.clone().map(SendField::Label));
            run_send(&cli, fields, *yes).await
        }
        Command::Outbox => run_outbox(&cli).await,
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn run_init(cli: &Cli, id: &str, address: &str) -> Result<()> {
    let file = cli.wallet_file()?;
    let mut wallets = file.get_wallets()?;
    if wallets.iter().any(|w| w.id() == id) {
        bail!("Wallet '{id}' already exists in {}.", file.path().display());
    }

    if file.spend_password()?.is_none() {
        let policy = PasswordPolicy::from_settings(&cli.settings()?);
        let password = cli.read_password("New spending password: ")?;
        policy.check(&password)?;
        if !cli.password_stdin {
            let again = cli.read_password("Repeat spending password: ")?;
            if *again != *password {
                bail!("Passwords do not match.");
            }
        }
        file.set_spend_password(PasswordVerifier::create(&password)?)?;
    }

    wallets.push(Wallet::new(id, address));
    file.save(&wallets)?;
    println!("Wallet '{id}' saved to {}", file.path().display());
    Ok(())
}

fn run_wallets(cli: &Cli) -> Result<()> {
    let file = cli.wallet_file()?;
    let store = cli.store(&file)?;
    let masker = AddressMasker::from_settings(&cli.settings()?);

    if cli.json {
        let list: Vec<_> = store
            .wallets()
            .iter()
            .map(|w| {
                serde_json::json!({
                    "id": w.id(),
                    "address": w.address(),
                    "balance_atomic": w.balance(),
                    "balance": display::format_amount(w.balance()),
                    "unit": w.unit(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    for (index, wallet) in store.wallets().iter().enumerate() {
        let marker = if index == store.selected_index() { "*" } else { " " };
        println!(
            "{marker} {:<16} {:<20} {}",
            wallet.id(),
            masker.mask(wallet.address()),
            format_balance(wallet.balance(), wallet.unit())
        );
    }
    Ok(())
}

fn run_overview(cli: &Cli) -> Result<()> {
    let file = cli.wallet_file()?;
    let store = cli.store(&file)?;
    let wallet = store.selected_wallet();
    if cli.json {
        println!("{}", display::format_balance_json(wallet));
    } else {
        let masker = AddressMasker::from_settings(&cli.settings()?);
        println!("{}", format_overview(wallet, &masker));
    }
    Ok(())
}

fn run_record(cli: &Cli, tx: Transaction) -> Result<()> {
    let file = cli.wallet_file()?;
    let mut store = cli.store(&file)?;
    let wallet_id = store.selected_wallet().id().to_string();
    let hash = tx.hash.clone();
    store.record_transaction(&wallet_id, tx)?;
    file.save(store.wallets())?;

    let wallet = store.selected_wallet();
    println!(
        "Recorded {hash} on '{wallet_id}'. Balance: {}",
        format_balance(wallet.balance(), wallet.unit())
    );
    Ok(())
}

async fn run_send(cli: &Cli, fields: Vec<SendField>, yes: bool) -> Result<()> {
    if cli.password_stdin && !yes {
        bail!("--password-stdin needs --yes: stdin cannot answer the confirmation prompt as well.");
    }

    let file = cli.wallet_file()?;
    let mut store = cli.store(&file)?;
    let settings = cli.settings()?;
    let verifier = file
        .spend_password()?
        .context("No spending password set. Run `ccx-wallet init` first.")?;
    let outbox = Arc::new(Outbox::open_at(cli.outbox_path()?, verifier)?);
    let mut coordinator = SendCoordinator::new(outbox, PasswordPolicy::from_settings(&settings));

    coordinator.open_compose(&mut store)?;
    for field in fields {
        store.update_send_request(field);
    }
    coordinator.confirm(&mut store)?;

    let wallet = store.selected_wallet();
    let request = store.send_request();
    let summary = TransactionSummaryBuilder::new(AddressMasker::from_settings(&settings)).build(request, wallet);
    println!("  {:<16} {}", "Amount:", format_balance(request.amount, wallet.unit()));
    println!("{}", format_summary(&summary));

    if !yes && !confirm_prompt("Send?")? {
        coordinator.cancel(&mut store)?;
        println!("Cancelled.");
        return Ok(());
    }

    let password = cli.read_password("Spending password: ")?;
    store.update_send_request(SendField::Password(password));

    match coordinator.submit(&mut store).await? {
        SubmitOutcome::Completed(receipt) => {
            println!("Send queued in outbox as {}.", receipt.id);
            Ok(())
        }
        SubmitOutcome::Failed(err) => match coordinator.alert() {
            Some(alert) => bail!("{}: {}", alert.title, alert.message),
            None => Err(err.into()),
        },
        SubmitOutcome::Ignored => Ok(()),
    }
}

async fn run_outbox(cli: &Cli) -> Result<()> {
    let file = cli.wallet_file()?;
    let verifier = file
        .spend_password()?
        .context("No spending password set. Run `ccx-wallet init` first.")?;
    let outbox = Outbox::open_at(cli.outbox_path()?, verifier)?;
    let entries = outbox.entries().await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("Outbox is empty.");
        return Ok(());
    }
    for entry in entries {
        println!(
            "{}  {}  -> {}  {} (fee: {})",
            display::format_timestamp(entry.queued_at),
            entry.id,
            entry.to_address,
            display::format_amount(entry.amount),
            format_fee(entry.fee, display::CURRENCY),
        );
    }
    Ok(())
}
