use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use inventory_valuator::{
    input, report, ChannelSink, Config, DispatcherConfig, FetcherConfig, InventoryFetcher,
    ProxyParser, ProxyPool, ProxyType, RecordBuilder, StatusSink, TracingSink, WorkDispatcher,
};
use inventory_valuator::tui::ProgressApp;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Concurrent inventory valuation through rotating proxies
#[derive(Parser)]
#[command(name = "inventory-valuator")]
#[command(about = "Values account inventories through a rotating proxy pool")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Value every profile listed in the input file (default)
    Run(RunArgs),
    /// Parse a proxy file and list the usable entries
    Proxies {
        /// Input file containing proxies
        input: PathBuf,
    },
}

#[derive(Args, Clone)]
struct RunArgs {
    /// File with one profile URL per line
    #[arg(long, default_value_os_t = Config::default().ids_path)]
    ids: PathBuf,
    /// File with one proxy per line
    #[arg(long, default_value_os_t = Config::default().proxies_path)]
    proxies: PathBuf,
    /// File with item names to leave out of valuations
    #[arg(long, default_value_os_t = Config::default().exclude_path)]
    exclude: PathBuf,
    /// CSV report destination
    #[arg(short, long, default_value_os_t = Config::default().output_path)]
    output: PathBuf,
    /// Number of concurrent workers
    #[arg(short = 'n', long, default_value = "4")]
    threads: usize,
    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
    /// Attempt cycles over the proxy pool per profile
    #[arg(long, default_value = "5")]
    attempts: u32,
    /// Pause between attempt cycles in seconds
    #[arg(long, default_value = "7")]
    cooldown: u64,
    /// Write records in completion order instead of input order
    #[arg(long)]
    unordered: bool,
    /// Show the interactive progress view
    #[arg(long)]
    tui: bool,
    /// Log file used while the progress view owns the terminal
    #[arg(long, default_value = "inventory-valuator.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Proxies { input: path }) => {
            init_logging(None)?;
            list_proxies(&path)
        }
        Some(Commands::Run(args)) => run(args).await,
        None => run(cli.run).await,
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {:?}", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }
    Ok(())
}

fn list_proxies(path: &Path) -> Result<()> {
    let lines = input::load_proxy_lines(path)
        .with_context(|| format!("Failed to load proxies from {:?}", path))?;

    let mut usable = 0;
    for line in &lines {
        match ProxyParser::parse_line(line, ProxyType::Http) {
            Ok(Some(proxy)) => {
                usable += 1;
                let auth = if proxy.auth.is_some() { " (auth)" } else { "" };
                println!("{}{}", proxy, auth);
            }
            Ok(None) => {}
            Err(e) => eprintln!("Skipped {:?}: {}", line, e),
        }
    }

    println!("{} usable of {} proxies in {:?}", usable, lines.len(), path);
    Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
    init_logging(args.tui.then_some(args.log_file.as_path()))?;

    let lines = input::load_identifier_lines(&args.ids)
        .with_context(|| format!("Failed to load profile list from {:?}", args.ids))?;
    println!("Found {} links in {:?}", lines.len(), args.ids);

    let proxy_lines = input::load_proxy_lines(&args.proxies)
        .with_context(|| format!("Failed to load proxies from {:?}", args.proxies))?;
    let pool = ProxyPool::parse(&proxy_lines)
        .with_context(|| format!("No available proxies in {:?}", args.proxies))?;
    info!(proxies = pool.len(), "Proxy pool loaded");

    let exclusions = input::load_exclusions(&args.exclude)?;
    if !exclusions.is_empty() {
        println!("Loaded {} items to exclude", exclusions.len());
    }

    let fetcher_config = FetcherConfig::new()
        .with_timeout(Duration::from_secs(args.timeout))
        .with_max_attempts(args.attempts)
        .with_cooldown(Duration::from_secs(args.cooldown));
    let dispatcher_config = DispatcherConfig::new()
        .with_concurrency(args.threads)
        .with_preserve_order(!args.unordered);

    let input_lines = lines.len();
    let total = lines.iter().filter(|l| !l.trim().is_empty()).count();
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining lookups");
            ctrl_c.cancel();
        }
    });

    let pool = Arc::new(pool);
    let builder = RecordBuilder::new(Arc::new(exclusions));

    let records = if args.tui {
        let (sink, rx) = ChannelSink::new();
        let sink: Arc<dyn StatusSink> = Arc::new(sink);
        let dispatcher = WorkDispatcher::new(
            dispatcher_config,
            InventoryFetcher::new(fetcher_config, pool, Arc::clone(&sink)),
            builder,
            sink,
        );

        let worker_cancel = cancel.clone();
        let handle = tokio::spawn(async move { dispatcher.run(&lines, &worker_cancel).await });

        let mut app = ProgressApp::new(total, cancel.clone());
        app.run(rx).await?;
        handle.await.context("Dispatcher task failed")?
    } else {
        let sink: Arc<dyn StatusSink> = Arc::new(TracingSink::new(total));
        let dispatcher = WorkDispatcher::new(
            dispatcher_config,
            InventoryFetcher::new(fetcher_config, pool, Arc::clone(&sink)),
            builder,
            sink,
        );
        dispatcher.run(&lines, &cancel).await
    };

    let retained = report::finalize(records.clone());
    let summary = report::RunSummary::new(input_lines, &records, &retained);

    println!();
    println!("Total balance across all accounts: {:.2}$", summary.total_balance);

    if report::write_csv_file(&retained, &args.output)
        .with_context(|| format!("Failed to write report to {:?}", args.output))?
    {
        println!("Data successfully written to {:?}", args.output);
    }
    info!(
        records = summary.records,
        retained = summary.retained,
        "Run finished"
    );

    Ok(())
}
