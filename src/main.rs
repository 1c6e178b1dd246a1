mod cli;

use clap::Parser;
use cli::{Cli, Command};
use connect_downloader::connect::{
    ConnectConfig, CookieStore, Session, TrackListEvent, spawn_track_loader,
};
use connect_downloader::domain::{SortOrder, TrackTable};
use connect_downloader::download::{
    BatchEvent, BatchRequest, CancelToken, load_album_ids, run_batch,
};
use connect_downloader::error::AppError;
use connect_downloader::logging;
use connect_downloader::settings::{AppSettings, load_settings, save_settings};
use connect_downloader::ui;
use std::io::{self, Write};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut cfg = ConnectConfig::default();
    if let Some(v) = cli.data_dir.clone() {
        cfg.data_dir = v;
    }
    if let Some(v) = cli.base_url.clone() {
        cfg.base_url = v;
    }

    let _log_guard = logging::init(
        &cfg.data_dir,
        logging::LogConfig {
            dir: cli.log_dir.clone(),
            filter: cli.log_filter.clone(),
        },
    );

    let settings = load_settings(&cfg.data_dir);
    cfg.connect_timeout_secs = Some(settings.connect_timeout_secs);
    tracing::info!(data_dir = %cfg.data_dir.display(), base_url = %cfg.base_url, "connect-downloader starting");

    let command = cli.command.clone().unwrap_or(Command::Tracks {
        sort: None,
        desc: false,
    });
    let result = match command {
        Command::Login { remember } => login(cfg, &cli, remember).await,
        Command::Logout => logout(cfg),
        Command::Status => status(cfg).await,
        Command::Tracks { sort, desc } => {
            let order = if desc {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            tracks(cfg, &cli, sort.map(|c| (c.index(), order))).await
        }
        Command::Download {
            input,
            format,
            out,
            policy,
        } => {
            let settings = AppSettings {
                format: format.unwrap_or(settings.format),
                download_dir: out.or(settings.download_dir),
                failure_policy: policy.unwrap_or(settings.failure_policy),
                ..settings
            };
            download(cfg, &cli, input, &settings).await
        }
        Command::Settings {
            format,
            out,
            policy,
        } => update_settings(&cfg, settings, format, out, policy),
    };

    if let Err(e) = &result {
        tracing::error!(err = %e, "command failed");
    }
    result
}

async fn login(cfg: ConnectConfig, cli: &Cli, remember: bool) -> Result<(), AppError> {
    let email = match cli.email.clone() {
        Some(v) => v,
        None => prompt("Email", ui::read_line)?,
    };
    let password = match cli.password.clone() {
        Some(v) => v,
        None => prompt("Password", ui::read_hidden)?,
    };

    let mut session = Session::new(cfg, CookieStore::new())?;
    session.login(&email, &password).await?;
    println!("Signed in.");

    if remember {
        session.persist()?;
        println!("Session saved to {}", session.cfg.cookie_path().display());
    }
    Ok(())
}

fn logout(cfg: ConnectConfig) -> Result<(), AppError> {
    let (mut session, _) = Session::open(cfg)?;
    session.forget()?;
    println!("Signed out.");
    Ok(())
}

async fn status(cfg: ConnectConfig) -> Result<(), AppError> {
    let (mut session, found) = Session::open(cfg)?;
    if !found {
        println!("No stored session.");
        return Ok(());
    }
    if session.is_authenticated().await? {
        println!("Signed in.");
    } else {
        println!("Stored session is no longer signed in.");
    }
    Ok(())
}

/// Restores the stored session. Without a jar, credentials from the command
/// line or environment are used for a one-off sign-in that is not saved.
async fn signed_in_session(cfg: ConnectConfig, cli: &Cli) -> Result<Session, AppError> {
    let (mut session, found) = Session::open(cfg)?;
    if !found && let (Some(email), Some(password)) = (&cli.email, &cli.password) {
        match session.login(email, password).await {
            Ok(()) => {}
            Err(e) if e.is_auth_error() => return Err(AppError::NotSignedIn(e.to_string())),
            Err(e) => return Err(e.into()),
        }
    }
    if !session.is_authenticated().await? {
        return Err(AppError::NotSignedIn(
            "run `connect-downloader login --remember` first".to_owned(),
        ));
    }
    Ok(session)
}

async fn tracks(
    cfg: ConnectConfig,
    cli: &Cli,
    sort: Option<(usize, SortOrder)>,
) -> Result<(), AppError> {
    let session = signed_in_session(cfg, cli).await?;
    let mut rx = spawn_track_loader(session);

    match rx.recv().await {
        Some(TrackListEvent::Loaded { rows }) => {
            let mut table = TrackTable::new(rows);
            if let Some((column, order)) = sort {
                table.sort(column, order);
            }
            print!("{}", ui::render_table(&table, ui::MAX_COLUMN_WIDTH));
            Ok(())
        }
        Some(TrackListEvent::Failed { message }) => Err(AppError::Other(message)),
        None => Err(AppError::Other("track loader stopped".to_owned())),
    }
}

async fn download(
    cfg: ConnectConfig,
    cli: &Cli,
    input: PathBuf,
    settings: &AppSettings,
) -> Result<(), AppError> {
    let album_ids = load_album_ids(&input)?;
    let dest_dir = match settings.download_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut session = signed_in_session(cfg, cli).await?;

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let req = BatchRequest {
        album_ids: &album_ids,
        format: settings.format,
        dest_dir: &dest_dir,
        policy: settings.failure_policy,
    };
    let report = run_batch(&mut session, &req, &cancel, |event| {
        let line = ui::describe_event(&event);
        let mut stdout = io::stdout().lock();
        let _ = match event {
            BatchEvent::Progress { .. } => write!(stdout, "{line}"),
            _ => writeln!(stdout, "{line}"),
        };
        let _ = stdout.flush();
    })
    .await;

    println!("{}", ui::summary_line(&report));
    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(AppError::Other(format!(
            "{} of {} albums failed",
            report.failed.len(),
            album_ids.len()
        )))
    }
}

fn update_settings(
    cfg: &ConnectConfig,
    mut settings: AppSettings,
    format: Option<connect_downloader::connect::DownloadFormat>,
    out: Option<PathBuf>,
    policy: Option<connect_downloader::download::FailurePolicy>,
) -> Result<(), AppError> {
    let changed = format.is_some() || out.is_some() || policy.is_some();
    if let Some(v) = format {
        settings.format = v;
    }
    if let Some(v) = out {
        settings.download_dir = Some(v);
    }
    if let Some(v) = policy {
        settings.failure_policy = v;
    }
    if changed {
        save_settings(&cfg.data_dir, &settings)?;
        tracing::info!(?settings, "settings saved");
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn prompt(name: &str, read: fn(&str) -> io::Result<String>) -> Result<String, AppError> {
    let value = read(&format!("{name}: "))?;
    if value.is_empty() {
        return Err(AppError::Other(format!("{name} is required")));
    }
    Ok(value)
}
