use std::{path::PathBuf, time::Duration};
use clap::{Parser, Subcommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use signal_hook::consts::signal::*;
use signal_hook_tokio::Signals;
use futures::stream::StreamExt;

use lokanala::{config::DatasourceConfig, ext::LoggableError};
#[cfg(feature = "cli")]
use lokanala_cli as cli;

#[cfg(feature = "migrate")]
use lokanala_migrations as migrations;

#[cfg(feature = "serve")]
use lokanala_routes as routes;

#[cfg(feature = "worker")]
use lokanala_worker as worker;


#[derive(Parser)]
/// local merchant directory: catalog, reviews, follows and push notifications
struct Args {
	#[clap(subcommand)]
	command: Mode,

	/// toml config file, built-in defaults are used without one
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// database url, takes precedence over [datasource] connection_string
	#[arg(long = "db")]
	database: Option<String>,

	/// log at debug level
	#[arg(long, default_value_t = false)]
	debug: bool,

	/// async runtime worker threads, one per core when unset
	#[arg(long)]
	threads: Option<usize>,
}

#[derive(Clone, Subcommand)]
enum Mode {
	/// print the effective configuration as toml
	Config,

	#[cfg(feature = "migrate")]
	/// bring the database schema up to date
	Migrate,

	#[cfg(feature = "cli")]
	/// maintenance tasks
	Cli {
		#[clap(subcommand)]
		command: cli::CliCommand,
	},

	#[cfg(all(feature = "serve", feature = "worker"))]
	/// serve the api and hand push notifications to a background worker
	Monolith {
		#[arg(short, long, default_value = "127.0.0.1:3000")]
		bind: String,

		/// notification batches delivered at the same time
		#[arg(short, long, default_value_t = 4)]
		tasks: usize,
	},

	#[cfg(feature = "serve")]
	/// serve the api, sending push notifications within each request
	Serve {
		#[arg(short, long, default_value = "127.0.0.1:3000")]
		bind: String,
	},
}

fn main() {
	let args = Args::parse();

	tracing_subscriber::fmt()
		.compact()
		.with_max_level(if args.debug { tracing::Level::DEBUG } else { tracing::Level::INFO })
		.init();

	let config = lokanala::Config::load(args.config.as_ref());

	if matches!(args.command, Mode::Config) {
		println!("{}", toml::to_string_pretty(&config).expect("failed serializing config"));
		return;
	}

	let mut runtime = tokio::runtime::Builder::new_multi_thread();
	if let Some(threads) = args.threads {
		runtime.worker_threads(threads);
	}

	runtime
		.enable_io()
		.enable_time()
		.thread_name("lokanala-runtime")
		.build()
		.expect("failed creating tokio async runtime")
		.block_on(init(args, config))
}

fn connect_options(url: &str, cfg: &DatasourceConfig) -> ConnectOptions {
	let slow_level = if cfg.slow_query_warn_enable { tracing::log::LevelFilter::Warn } else { tracing::log::LevelFilter::Debug };
	let mut opts = ConnectOptions::new(url);
	opts
		.sqlx_logging(true)
		.sqlx_logging_level(tracing::log::LevelFilter::Debug)
		.sqlx_slow_statements_logging_settings(slow_level, Duration::from_secs(cfg.slow_query_warn_seconds))
		.max_connections(cfg.max_connections)
		.min_connections(cfg.min_connections)
		.acquire_timeout(Duration::from_secs(cfg.acquire_timeout_seconds))
		.connect_timeout(Duration::from_secs(cfg.connect_timeout_seconds));
	opts
}

fn context(db: DatabaseConnection, config: lokanala::Config, queue: Option<Box<dyn lokanala::push::PushQueue>>) -> lokanala::Context {
	let push = lokanala::push::provider(&config.push);
	lokanala::Context::new(db, config, push, queue)
}

async fn init(args: Args, config: lokanala::Config) {
	let url = args.database.unwrap_or_else(|| config.datasource.connection_string.clone());
	let db = Database::connect(connect_options(&url, &config.datasource))
		.await.expect("error connecting to db");

	#[cfg(feature = "migrate")]
	if matches!(args.command, Mode::Migrate) {
		use migrations::MigratorTrait;
		migrations::Migrator::up(&db, None)
			.await.expect("error applying migrations");
		tracing::info!("database schema is up to date");
		return;
	}

	let (tx, rx) = tokio::sync::watch::channel(false);
	let signals = Signals::new([SIGTERM, SIGINT]).expect("failed registering signal handler");
	let signals_handle = signals.handle();
	let signals_task = tokio::spawn(forward_signals(signals, tx));
	let shutdown = Shutdown(rx);

	match args.command {
		#[cfg(feature = "cli")]
		Mode::Cli { command } =>
			cli::run(context(db, config, None), command)
				.await.expect("failed running cli task"),

		#[cfg(feature = "serve")]
		Mode::Serve { bind } =>
			routes::serve(context(db, config, None), bind, shutdown)
				.await.expect("failed serving api routes"),

		#[cfg(all(feature = "serve", feature = "worker"))]
		Mode::Monolith { bind, tasks } => {
			let (queue, batches) = worker::channel(config.push.queue_capacity);
			let ctx = context(db, config, Some(Box::new(queue)));
			let deliveries = worker::spawn(ctx.clone(), batches, tasks, shutdown.clone());

			routes::serve(ctx, bind, shutdown)
				.await.expect("failed serving api routes");

			deliveries.await.err_failed("failed joining push worker");
		},

		Mode::Config => unreachable!(),
		#[cfg(feature = "migrate")]
		Mode::Migrate => unreachable!(),
	}

	signals_handle.close();
	signals_task.await.err_failed("failed joining signal handler task");
}

/// flips to true once SIGINT or SIGTERM arrives
#[derive(Clone)]
struct Shutdown(tokio::sync::watch::Receiver<bool>);

#[cfg(feature = "worker")]
impl worker::StopToken for Shutdown {
	fn stop(&self) -> bool {
		*self.0.borrow()
	}
}

#[cfg(feature = "serve")]
impl routes::ShutdownToken for Shutdown {
	fn event(mut self) -> impl std::future::Future<Output = ()> + std::marker::Send {
		async move {
			self.0.wait_for(|stop| *stop).await.warn_failed("shutdown channel closed");
		}
	}
}

async fn forward_signals(mut signals: Signals, tx: tokio::sync::watch::Sender<bool>) {
	while let Some(signal) = signals.next().await {
		tracing::info!("received signal {signal}, shutting down");
		tx.send(true).info_failed("nobody left to stop");
	}
}
