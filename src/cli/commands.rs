use crate::{
    config::AppConfig,
    fixture,
    greeter::GreeterServer,
    logging::init_logging,
    ordered::insert_checked,
    pipeline::{generator, step},
    runtime_config::RuntimeConfig,
    server::{hello_service, HttpServer},
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line interface for patternkit
#[derive(Parser)]
#[command(name = "patternkit")]
#[command(about = "patternkit CLI", long_about = None)]
pub struct Cli {
    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, env = "PKIT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Serve the hello-world HTTP app
    ServeHttp {
        /// Listen address (overrides the config file)
        #[arg(short, long, env = "PKIT_HTTP_ADDR")]
        addr: Option<String>,

        /// YAML configuration file
        #[arg(short, long, env = "PKIT_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Serve the TCP greeter
    ServeGreeter {
        /// Listen address (overrides the config file)
        #[arg(short, long, env = "PKIT_GREETER_ADDR")]
        addr: Option<String>,

        /// Line sent to every client (overrides the config file)
        #[arg(short, long)]
        greeting: Option<String>,

        /// YAML configuration file
        #[arg(short, long, env = "PKIT_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Insert a value into a sorted list of integers
    Insert {
        /// Value to insert
        #[arg(short, long, allow_negative_numbers = true)]
        value: i64,

        /// Sorted (non-decreasing) integers
        #[arg(allow_negative_numbers = true)]
        items: Vec<i64>,
    },
    /// Square integers through a generator -> step pipeline
    Pipeline {
        #[arg(allow_negative_numbers = true)]
        items: Vec<i64>,
    },
    /// Print the hello-world fixture output
    Hello {
        /// Extra arguments to echo
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Apply CLI overrides to the config file values.
pub(crate) fn resolve_config(
    config: Option<&Path>,
    http_addr: Option<String>,
    greeter_addr: Option<String>,
    greeting: Option<String>,
) -> anyhow::Result<AppConfig> {
    let mut app = AppConfig::load_or_default(config).context("failed to load configuration")?;
    if let Some(addr) = http_addr {
        app.http.addr = addr;
    }
    if let Some(addr) = greeter_addr {
        app.greeter.addr = addr;
    }
    if let Some(greeting) = greeting {
        app.greeter.greeting = greeting;
    }
    Ok(app)
}

/// `insert` subcommand body: the sorted result.
pub(crate) fn insert_command(value: i64, items: &[i64]) -> anyhow::Result<Vec<i64>> {
    Ok(insert_checked(items, value)?)
}

/// `pipeline` subcommand body: every item squared, in input order.
pub(crate) fn pipeline_command(items: Vec<i64>) -> anyhow::Result<Vec<i64>> {
    let numbers = generator(items).context("failed to spawn generator")?;
    let squares =
        step(numbers, |n: i64| (n, n.checked_mul(n))).context("failed to spawn step")?;
    squares
        .collect_checked()?
        .into_iter()
        .map(|(n, square)| square.ok_or_else(|| anyhow::anyhow!("{} squared overflows i64", n)))
        .collect()
}

fn format_list(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Block until SIGINT or SIGTERM.
#[cfg(unix)]
fn wait_for_shutdown() -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Shutdown signal received");
    }
    Ok(())
}

/// Parse the process arguments and run the chosen command.
///
/// # Errors
///
/// Returns any configuration, bind or input error; the binary prints it and
/// exits non-zero.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli)
}

/// Run an already parsed [`Cli`].
///
/// # Errors
///
/// See [`run_cli`].
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::ServeHttp { addr, config } => {
            let _guard = init_logging(&cli.log_level)?;
            RuntimeConfig::from_env().apply();
            let app = resolve_config(config.as_deref(), addr, None, None)?;
            let service = hello_service().context("failed to build routes")?;
            let handle = HttpServer(service)
                .start(app.http.addr.as_str())
                .with_context(|| format!("failed to start HTTP server on {}", app.http.addr))?;
            handle.wait_ready().context("HTTP server did not become ready")?;
            info!(addr = %handle.addr(), "Server is ready");

            #[cfg(unix)]
            {
                wait_for_shutdown()?;
                handle.stop();
            }
            #[cfg(not(unix))]
            {
                handle
                    .join()
                    .map_err(|_| anyhow::anyhow!("HTTP server coroutine panicked"))?;
            }
            Ok(())
        }
        Commands::ServeGreeter {
            addr,
            greeting,
            config,
        } => {
            let _guard = init_logging(&cli.log_level)?;
            RuntimeConfig::from_env().apply();
            let app = resolve_config(config.as_deref(), None, addr, greeting)?;
            let bind_addr = app.greeter.addr.clone();
            let handle = GreeterServer::new(app.greeter)
                .start()
                .with_context(|| format!("failed to start greeter on {}", bind_addr))?;

            #[cfg(unix)]
            {
                wait_for_shutdown()?;
                handle.stop();
            }
            #[cfg(not(unix))]
            {
                handle
                    .join()
                    .map_err(|_| anyhow::anyhow!("greeter coroutine panicked"))?;
            }
            Ok(())
        }
        Commands::Insert { value, items } => {
            let sorted = insert_command(value, &items)?;
            println!("{}", format_list(&sorted));
            Ok(())
        }
        Commands::Pipeline { items } => {
            RuntimeConfig::from_env().apply();
            for value in pipeline_command(items)? {
                println!("{}", value);
            }
            Ok(())
        }
        Commands::Hello { args } => {
            for line in fixture::hello_lines(&args) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}
