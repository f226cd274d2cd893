use anyhow::{anyhow, Result};
use clap::Parser;
use multisender::app::App;
use multisender::chain::{ChainCalls, ChainView};
use multisender::checkpoint::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
use multisender::config::{account_explorer_url, Config};
use multisender::dry_run::DryRunCalls;
use multisender::import::load_recipients_file;
use multisender::notifications::NotificationKind;
use multisender::submission::SubmissionProgress;
use multisender::types::SendMode;
use multisender::user_settings::UserSettings;
use multisender::operation_log;
use multisender::utils::{format_token, parse_token_str_to_base_units, trim_account_id};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(
    name = "multisender",
    version,
    about = "Batch fungible-token transfers through a NEAR multisender contract"
)]
struct Cli {
    /// Recipients file: `account amount` per line, or a .csv
    file: Option<PathBuf>,

    /// Network id (mainnet, testnet)
    #[arg(long, env = "NEAR_NETWORK")]
    network: Option<String>,

    /// Signed-in account id
    #[arg(long, env = "NEAR_ACCOUNT_ID")]
    account: Option<String>,

    /// Continue with the recipients left by an interrupted run
    #[arg(long)]
    resume: bool,

    /// Drop recipients that are not existing accounts
    #[arg(long)]
    verify: bool,

    /// Register token storage for recipients that lack it
    #[arg(long)]
    check_storage: bool,

    /// Register token storage for the signed-in account itself
    #[arg(long)]
    request_storage: bool,

    /// Deposit exactly what the app balance is missing for this list
    #[arg(long)]
    deposit_missing: bool,

    /// Deposit a fixed amount (defaults to the saved deposit value)
    #[arg(long, value_name = "AMOUNT", num_args = 0..=1, default_missing_value = "")]
    deposit: Option<String>,

    /// Send the list in chunks: `safe` or `unsafe` (defaults to the saved mode)
    #[arg(long, value_name = "MODE", num_args = 0..=1)]
    send: Option<Option<SendMode>>,

    /// Withdraw the whole app balance
    #[arg(long)]
    withdraw_all: bool,

    /// Log contract calls instead of submitting them
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn needs_calls(&self) -> bool {
        self.check_storage
            || self.request_storage
            || self.deposit_missing
            || self.deposit.is_some()
            || self.send.is_some()
            || self.withdraw_all
    }
}

fn build_config(cli: &Cli, settings: &UserSettings) -> Result<Config> {
    let mut config = settings.to_config(cli.network.as_deref())?;
    config.apply_env_overrides()?;
    if let Some(account) = &cli.account {
        config.sign_in(account);
    }
    Ok(config)
}

fn print_list(app: &App) {
    let config = app.config();
    let aggregate = app.aggregate();

    for entry in app.state.recipients.entries() {
        println!(
            "  {:<30} {}",
            trim_account_id(&entry.account_id),
            format_token(entry.amount)
        );
    }
    println!(
        "Total: {} {} to {} recipient(s)",
        format_token(aggregate.total),
        config.token_ticker,
        aggregate.count
    );

    if let Some(account_id) = &config.account_id {
        println!(
            "Account: {} ({})",
            account_id,
            account_explorer_url(&config.network_id, account_id)
        );
        println!(
            "App balance: {} {}",
            format_token(app.state.balance),
            config.token_ticker
        );
        let shortfall = aggregate.shortfall(app.state.balance);
        if !shortfall.is_zero() {
            println!("Missing: {} {}", format_token(shortfall), config.token_ticker);
        }
    } else {
        println!("Not signed in");
    }
    println!(
        "send={} send_unsafe={} deposit={} withdraw={} storage_check={}",
        aggregate.send_enabled,
        aggregate.send_unsafe_enabled,
        aggregate.deposit_enabled,
        aggregate.withdraw_enabled,
        aggregate.storage_check_enabled
    );
}

fn print_notifications(app: &mut App) {
    for entry in app.state.notifications.drain(..) {
        match entry.kind {
            NotificationKind::Failure => eprintln!("✗ {}", entry.message),
            NotificationKind::Complete => println!("✓ {}", entry.message),
            NotificationKind::Text => println!("• {}", entry.message),
        }
    }
}

fn print_progress(progress: SubmissionProgress) {
    match progress {
        SubmissionProgress::Started { total_chunks } => {
            println!("Submitting {} chunk(s)...", total_chunks)
        }
        SubmissionProgress::ChunkSubmitted {
            submitted,
            total_chunks,
        } => println!("  chunk {}/{} accepted", submitted, total_chunks),
        SubmissionProgress::Failed { index, error } => {
            eprintln!("  chunk {} failed: {}", index, error)
        }
        SubmissionProgress::Completed { total_chunks } => {
            println!("All {} chunk(s) submitted", total_chunks)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut settings = UserSettings::load();
    let config = build_config(&cli, &settings)?;

    if cli.needs_calls() && !cli.dry_run {
        return Err(anyhow!(
            "Contract calls are signed by the wallet; rerun with --dry-run to preview them"
        ));
    }

    let view: Arc<dyn ChainView> = config.get_client()?;
    let calls: Arc<dyn ChainCalls> = Arc::new(DryRunCalls::new(
        &config.multisender_contract,
        &config.token_contract,
    ));
    let file_store = FileCheckpointStore::in_app_data_dir();
    let pending = file_store.load()?;
    // Dry runs checkpoint in memory so the real pending list survives them
    let store: Arc<dyn CheckpointStore> = if cli.dry_run {
        let memory = MemoryCheckpointStore::new();
        memory.save(&pending)?;
        Arc::new(memory)
    } else {
        Arc::new(file_store.clone())
    };

    let log_path = if cli.dry_run {
        operation_log::app_data_dir().join("dry_run_log.txt")
    } else {
        operation_log::log_path()
    };

    let mut app = App::new(config.clone(), view, calls, store).with_log_path(log_path.clone());
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    app.set_progress_sender(progress_tx);
    let printer = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            print_progress(progress);
        }
    });

    println!(
        "Network: {} ({}), contract {}",
        config.network_label(),
        config.rpc_url,
        config.multisender_contract
    );

    if cli.resume {
        let restored = app.restore_checkpoint()?;
        if restored == 0 {
            println!("Nothing to resume");
        } else {
            println!(
                "Resuming {} pending recipient(s) from {}",
                restored,
                file_store.path().display()
            );
        }
    } else if let Some(file) = &cli.file {
        if !pending.is_empty() {
            println!(
                "{} recipient(s) are pending from an interrupted run; pass --resume to continue them",
                pending.len()
            );
        }
        let text = load_recipients_file(file)?;
        app.set_input(&text);
    } else if !cli.withdraw_all && !cli.request_storage {
        return Err(anyhow!("Provide a recipients FILE or --resume"));
    }

    if app.config().is_signed_in() {
        if let Err(e) = app.refresh_balance().await {
            tracing::warn!("Could not load app balance: {}", e);
        }
    }
    print_list(&app);

    let result = run_actions(&cli, &settings, &mut app).await;
    print_notifications(&mut app);

    if let Some(account_id) = &app.config().account_id {
        if settings.account_id.as_ref() != Some(account_id) {
            settings.account_id = Some(account_id.clone());
            if let Err(e) = settings.save() {
                tracing::warn!("Failed to save settings: {}", e);
            }
        }
    }

    drop(app);
    let _ = printer.await;

    if result.is_ok() {
        println!("Operation log: {}", log_path.display());
    }
    result
}

async fn run_actions(cli: &Cli, settings: &UserSettings, app: &mut App) -> Result<()> {
    if cli.request_storage {
        app.request_storage().await?;
    }
    if cli.verify {
        app.verify_accounts().await?;
        print_notifications(app);
        print_list(app);
    }
    if cli.check_storage {
        app.check_storage().await?;
    }
    if let Some(amount) = &cli.deposit {
        let amount = if amount.trim().is_empty() {
            settings.default_deposit_value.as_str()
        } else {
            amount.as_str()
        };
        app.deposit(parse_token_str_to_base_units(amount)?).await?;
    }
    if cli.deposit_missing {
        let deposited = app.deposit_missing().await?;
        println!(
            "Deposited {} {}",
            format_token(deposited),
            app.config().token_ticker
        );
    }
    if let Some(mode) = cli.send {
        app.send(mode.unwrap_or(settings.preferred_send_mode)).await?;
    }
    if cli.withdraw_all {
        app.withdraw_all().await?;
    }
    Ok(())
}
