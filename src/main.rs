use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dompet::cli::{
    handle_ai_command, handle_audit_command, handle_backup_command, handle_bill_command,
    handle_budget_command, handle_chat_command, handle_export_command, handle_goal_command,
    handle_notify_command, handle_report_command, handle_summary_command,
    handle_transaction_command, AiCommands, BackupCommands, BillCommands, BudgetCommands,
    ChatArgs, ExportCommands, GoalCommands, NotifyCommands, ReportCommands, TransactionCommands,
};
use dompet::config::{paths::DompetPaths, settings::Settings};
use dompet::storage::init::needs_initialization;
use dompet::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "dompet",
    version,
    about = "Personal finance tracker for Rupiah",
    long_about = "Dompet tracks income and expenses in Rupiah, with monthly budgets, \
                  savings goals, bill reminders and an AI assistant that can record \
                  transactions from chat, free text or receipt photos."
)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and default settings
    Init,

    /// Show paths and settings
    Config,

    /// Record and browse transactions
    #[command(subcommand, alias = "tx")]
    Transaction(TransactionCommands),

    /// Monthly category budgets
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Savings goals
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Recurring bills
    #[command(subcommand)]
    Bill(BillCommands),

    /// Budget, bill and goal alerts
    #[command(subcommand, alias = "notifications")]
    Notify(NotifyCommands),

    /// Dashboard for a month
    Summary {
        /// Month (YYYY-MM, "current", "last")
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Monthly and spending reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export data to CSV, JSON or YAML
    #[command(subcommand)]
    Export(ExportCommands),

    /// Create, list and restore backups
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Show recent changes from the audit log
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Talk to the assistant
    Chat(ChatArgs),

    /// Parse free text or a receipt photo into a transaction
    #[command(subcommand)]
    Ai(AiCommands),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = DompetPaths::new()?;

    if let Some(Commands::Init) = cli.command {
        println!("Initializing Dompet at: {}", paths.data_dir().display());
        initialize_storage(&paths)?;
        let settings = Settings::load_or_create(&paths)?;
        settings.save(&paths)?;
        println!("Initialization complete.");
        println!();
        println!("Try:");
        println!("  dompet tx add expense 35000 makanan -m \"Makan siang\"");
        println!("  dompet summary");
        return Ok(());
    }

    if needs_initialization(&paths) {
        info!(path = %paths.data_dir().display(), "first run, initializing data directory");
        initialize_storage(&paths)?;
    }

    let settings = Settings::load_or_create(&paths)?;
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Init) => {}
        Some(Commands::Config) => {
            println!("Dompet configuration");
            println!("====================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings ({}):", paths.settings_file().display());
            println!("  Currency:             {}", settings.currency_symbol);
            println!(
                "  Budget warning at:    {}%",
                settings.notifications.budget_warning_percent
            );
            println!(
                "  Bill reminder:        {} day(s) ahead",
                settings.notifications.bill_reminder_days
            );
            println!(
                "  Goal deadline alert:  {} day(s) ahead",
                settings.notifications.goal_deadline_days
            );
            println!("  Chat model:           {}", settings.ai.gemini_model);
            println!("  Parsing model:        {}", settings.ai.openrouter_model);
            println!(
                "  Backups kept:         {} daily, {} monthly",
                settings.backup_retention.daily_count, settings.backup_retention.monthly_count
            );
        }
        Some(Commands::Transaction(cmd)) => handle_transaction_command(&storage, &settings, cmd)?,
        Some(Commands::Budget(cmd)) => handle_budget_command(&storage, &settings, cmd)?,
        Some(Commands::Goal(cmd)) => handle_goal_command(&storage, &settings, cmd)?,
        Some(Commands::Bill(cmd)) => handle_bill_command(&storage, &settings, cmd)?,
        Some(Commands::Notify(cmd)) => handle_notify_command(&storage, &settings, cmd)?,
        Some(Commands::Summary { month }) => handle_summary_command(&storage, &settings, month)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&storage, cmd)?,
        Some(Commands::Backup(cmd)) => handle_backup_command(&paths, &settings, cmd)?,
        Some(Commands::Audit { limit }) => handle_audit_command(&storage, limit)?,
        Some(Commands::Chat(args)) => handle_chat_command(&storage, &settings, args)?,
        Some(Commands::Ai(cmd)) => handle_ai_command(&storage, &settings, cmd)?,
        None => {
            println!("Dompet - personal finance tracker");
            println!();
            println!("Run 'dompet --help' for usage information.");
            println!("Run 'dompet summary' for this month at a glance.");
        }
    }

    Ok(())
}
