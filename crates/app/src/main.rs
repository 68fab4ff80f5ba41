use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use learnly_core::Clock;
use services::AppServices;
use storage::remote::{ANON_KEY_VAR, BACKEND_URL_VAR};
use storage::seed::{DEMO_EMAIL, DEMO_PASSWORD};
use storage::{BackendConfig, ConfigError, FileSessionStore, SessionStore};
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

const SESSION_FILE_VAR: &str = "LEARNLY_SESSION_FILE";
const DEFAULT_SESSION_FILE: &str = "learnly-session.json";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    EmptyValue { flag: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::EmptyValue { flag } => write!(f, "{flag} cannot be empty"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    let value = args.next().ok_or(ArgsError::MissingValue { flag })?;
    if value.trim().is_empty() {
        return Err(ArgsError::EmptyValue { flag });
    }
    Ok(value)
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    backend_url: Option<String>,
    anon_key: Option<String>,
    session_file: PathBuf,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui   [--backend-url <url>] [--anon-key <key>]");
    eprintln!("                           [--session-file <path>]");
    eprintln!("  cargo run -p app -- demo   # in-memory backend with sample courses");
    eprintln!();
    eprintln!("Defaults for ui:");
    eprintln!("  --session-file {DEFAULT_SESSION_FILE}");
    eprintln!();
    eprintln!("Environment (also read from .env):");
    eprintln!("  {BACKEND_URL_VAR}, {ANON_KEY_VAR}, {SESSION_FILE_VAR}, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Demo,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "demo" => Some(Self::Demo),
            _ => None,
        }
    }
}

impl Args {
    /// Flags override the environment; `env` looks a variable up by name.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let non_blank = |name: &str| env(name).filter(|value| !value.trim().is_empty());
        let mut backend_url = non_blank(BACKEND_URL_VAR);
        let mut anon_key = non_blank(ANON_KEY_VAR);
        let mut session_file = non_blank(SESSION_FILE_VAR)
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--backend-url" => backend_url = Some(require_value(args, "--backend-url")?),
                "--anon-key" => anon_key = Some(require_value(args, "--anon-key")?),
                "--session-file" => {
                    session_file = PathBuf::from(require_value(args, "--session-file")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            backend_url,
            anon_key,
            session_file,
        })
    }

    fn backend_config(&self) -> Result<BackendConfig, ConfigError> {
        let url = self
            .backend_url
            .as_deref()
            .ok_or(ConfigError::Missing(BACKEND_URL_VAR))?;
        let key = self
            .anon_key
            .clone()
            .ok_or(ConfigError::Missing(ANON_KEY_VAR))?;
        BackendConfig::new(url, key)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn launch(services: AppServices) {
    let app: Arc<dyn UiApp> = Arc::new(services);
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Learnly")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI against the hosted backend.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter, |name| std::env::var(name).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let clock = Clock::default_clock();
    match cmd {
        Command::Ui => {
            let config = parsed.backend_config()?;
            let sessions: Arc<dyn SessionStore> =
                Arc::new(FileSessionStore::new(&parsed.session_file));
            tracing::debug!(session_file = %parsed.session_file.display(), "session store");
            launch(AppServices::remote(config, sessions, clock));
            Ok(())
        }
        Command::Demo => {
            let services = AppServices::demo(clock)?;
            eprintln!("demo account: {DEMO_EMAIL} / {DEMO_PASSWORD}");
            launch(services);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(error = %err, "startup failed");
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter, |name| {
            env.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
        })
    }

    #[test]
    fn flags_override_environment() {
        let args = parse(
            &["--backend-url", "https://flag.example.com"],
            &[
                (BACKEND_URL_VAR, "https://env.example.com"),
                (ANON_KEY_VAR, "anon"),
            ],
        )
        .unwrap();
        assert_eq!(args.backend_url.as_deref(), Some("https://flag.example.com"));
        assert_eq!(args.anon_key.as_deref(), Some("anon"));
        assert_eq!(args.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
    }

    #[test]
    fn missing_backend_settings_are_reported() {
        let args = parse(&[], &[]).unwrap();
        assert!(matches!(
            args.backend_config(),
            Err(ConfigError::Missing(BACKEND_URL_VAR))
        ));
    }

    #[test]
    fn flag_without_value_is_rejected() {
        assert!(matches!(
            parse(&["--anon-key"], &[]),
            Err(ArgsError::MissingValue { flag: "--anon-key" })
        ));
        assert!(matches!(
            parse(&["--verbose"], &[]),
            Err(ArgsError::UnknownArg(arg)) if arg == "--verbose"
        ));
    }
}
