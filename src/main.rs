//! Renewable site simulator entry point: CLI wiring, history seeding and the
//! dashboard API server.

use std::path::Path;
use std::process;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use renewable_sim::config::AppConfig;
use renewable_sim::io::export::export_csv;
use renewable_sim::sim::kpi::HistoryKpis;
use renewable_sim::sim::{Engine, EngineSettings};
use renewable_sim::telemetry::init_tracing;

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    seed_override: Option<u64>,
    offline: bool,
    history_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: Option<u16>,
}

fn print_help() {
    eprintln!("renewable-sim — Renewable energy site simulator");
    eprintln!();
    eprintln!("Usage: renewable-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load settings from TOML config file");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --offline                Use the built-in weather table instead of Open-Meteo");
    eprintln!("  --history-out <path>     Export seeded history to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --no-serve               Print a history report and exit");
        eprintln!("  --port <u16>             API server port (default: 5000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("Without --config, a Mumbai demo site with default settings is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        seed_override: None,
        offline: false,
        history_out: None,
        #[cfg(feature = "api")]
        serve: true,
        #[cfg(feature = "api")]
        port: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --config requires a path argument");
                    process::exit(1);
                }
                cli.config_path = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--offline" => {
                cli.offline = true;
            }
            "--history-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --history-out requires a path argument");
                    process::exit(1);
                }
                cli.history_out = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--no-serve" => {
                cli.serve = false;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port = Some(p);
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    let mut cfg = match cli.config_path {
        Some(ref path) => AppConfig::from_toml_file(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        }),
        None => AppConfig::default(),
    };

    if let Some(seed) = cli.seed_override {
        cfg.simulation.seed = Some(seed);
    }
    if cli.offline {
        cfg.weather.provider = "offline".to_string();
    }
    #[cfg(feature = "api")]
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    init_tracing(cfg.logging.json);

    let rng = match cfg.simulation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let settings = EngineSettings::from(&cfg.simulation);
    let mut engine = Engine::new(settings, cfg.simulation.history_capacity, rng);

    if let Err(e) = engine.seed_history(&cfg.site, cfg.simulation.seed_days, Utc::now()) {
        eprintln!("error: failed to seed history: {e}");
        process::exit(1);
    }

    if let Some(ref path) = cli.history_out {
        if let Err(e) = export_csv(engine.history().iter(), Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(%path, records = engine.history().len(), "history exported");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        run_server(cfg, engine);
        return;
    }

    println!("{}", HistoryKpis::from_records(engine.history().iter()));
}

#[cfg(feature = "api")]
fn run_server(cfg: AppConfig, engine: Engine<StdRng>) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use renewable_sim::api::{AppState, serve};
    use renewable_sim::site::InMemoryConfigStore;
    use renewable_sim::weather::provider_from_config;

    let weather = provider_from_config(&cfg.weather, engine.settings().offset).unwrap_or_else(|e| {
        eprintln!("error: failed to build weather provider: {e}");
        process::exit(1);
    });
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .unwrap_or_else(|e| {
            eprintln!(
                "error: invalid listen address \"{}:{}\": {e}",
                cfg.server.host, cfg.server.port
            );
            process::exit(1);
        });

    let state = Arc::new(AppState::new(
        Arc::new(InMemoryConfigStore::new(cfg.site)),
        engine,
        weather,
        cfg.auth,
    ));
    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    if let Err(e) = rt.block_on(serve(state, addr)) {
        eprintln!("error: server failed: {e}");
        process::exit(1);
    }
}
