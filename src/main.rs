// File: main.rs
// Location: /src/main.rs

use chrono::Local;
use clap::Parser;
use gtk4::prelude::*;
use libadwaita as adw;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use adwaita_qr::config::{self, Settings};
use adwaita_qr::line_mode;
use adwaita_qr::qr::QrEncoder;
use adwaita_qr::window::QrWindow;

const APP_ID: &str = "com.github.adwaita-qr";

#[derive(Parser, Debug)]
#[command(name = "adwaita-qr", version, about = "Generate a QR code for a URL")]
struct Cli {
    /// URL to encode
    #[arg(short, long)]
    url: Option<String>,

    /// Output file path (line mode only)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Force line mode instead of opening a window
    #[arg(long)]
    cli: bool,

    /// JSON settings file overriding the built-in encoder and window defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let log_path = std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".local/share/adwaita-qr"))
        .unwrap_or_else(|_| PathBuf::from("/tmp"));

    let _ = std::fs::create_dir_all(&log_path);
    let log_file_path = log_path.join("adwaita-qr.log");

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .format(move |buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .ok();

    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
    {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(file, "\n[{}] [INFO] ========== Adwaita QR Started ==========", now);
    }
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => config::load_settings(path),
        None => Ok(Settings::default()),
    }
}

fn main() -> glib::ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    log::debug!("Arguments: {:?}", cli);

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load settings: {:#}", e);
            eprintln!("Error: {:#}", e);
            return glib::ExitCode::FAILURE;
        }
    };

    let encoder = match QrEncoder::from_settings(&settings.encoder) {
        Ok(encoder) => encoder,
        Err(e) => {
            eprintln!("Error: {}", e);
            return glib::ExitCode::FAILURE;
        }
    };

    if !cli.cli {
        match gtk4::init() {
            Ok(()) => return run_gui(encoder, settings, cli.url),
            Err(e) => {
                log::warn!("GTK unavailable, falling back to line mode: {}", e);
                println!("GUI mode not available. Using command-line mode instead.");
            }
        }
    }

    let stdin = std::io::stdin();
    let outcome = line_mode::run(&encoder, cli.url, cli.output, stdin.lock(), std::io::stdout());
    if outcome.exit_code() == 0 {
        glib::ExitCode::SUCCESS
    } else {
        glib::ExitCode::FAILURE
    }
}

fn run_gui(encoder: QrEncoder, settings: Settings, url: Option<String>) -> glib::ExitCode {
    log::info!("Application starting...");

    let app = adw::Application::builder()
        .application_id(APP_ID)
        .build();

    app.connect_activate(move |app| {
        log::info!("Building UI...");
        let window = QrWindow::new(app, encoder, settings.shell.clone(), url.as_deref());
        window.present();
    });

    // Our flags are already parsed; keep GTK from seeing them.
    app.run_with_args::<&str>(&[])
}
