use clap::Parser;
use crosscore_adb_run::adb::{AdbBackend, AdbError, select_device};
use crosscore_adb_run::args::{Cli, Command};
use crosscore_adb_run::config::{AutomationConfig, ConfigError};
use crosscore_adb_run::device_record::DeviceRecord;
use crosscore_adb_run::game_automation::{
    AutomationError, MatchEngine, ScreenDevice, Scheduler, TaskRunner, TaskSet, TemplateLibrary,
    TesseractRecognizer, crosscore_registry,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const STATUS_LOG_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Adb(#[from] AdbError),
    #[error(transparent)]
    Automation(#[from] AutomationError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No ready device found")]
    NoReadyDevice,
    #[error("Device '{0}' is not connected or not ready")]
    DeviceNotReady(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AutomationConfig::load(cli.config.as_deref())?;
    let record_path = config
        .device_record_path
        .clone()
        .or_else(DeviceRecord::default_path);

    match &cli.command {
        Command::Tasks => {
            let registry = crosscore_registry(&config.game_package);
            println!("📋 Available tasks:");
            for task in registry.tasks() {
                println!("    {:<10} {}", task.name(), task.label());
            }
            Ok(())
        }
        Command::Devices => list_devices(&cli, record_path.as_deref()).await,
        Command::Run { tasks, all } => {
            let runner = connect(&cli, &config, record_path.as_deref()).await?;
            let set = if *all {
                runner.registry().all()
            } else {
                TaskSet::new(tasks.iter().cloned())
            };
            let report = runner.try_run(&set).await?;
            println!(
                "✅ Completed {} in {:.1}s",
                report.completed.join(", "),
                report.elapsed.as_secs_f64()
            );
            Ok(())
        }
        Command::Schedule { every, tasks } => {
            let runner = connect(&cli, &config, record_path.as_deref()).await?;
            schedule(runner, TaskSet::new(tasks.iter().cloned()), *every).await
        }
        Command::Dump => {
            let runner = connect(&cli, &config, record_path.as_deref()).await?;
            let boxes = runner.dump().await?;
            println!("🩺 {} text boxes recognized", boxes.len());
            Ok(())
        }
        Command::Screenshot { path } => {
            let runner = connect(&cli, &config, record_path.as_deref()).await?;
            let frame = runner.capture().await?;
            tokio::fs::write(path, frame.png_bytes()).await?;
            println!(
                "✅ Screenshot ({} bytes) saved to {}",
                frame.png_bytes().len(),
                path.display()
            );
            Ok(())
        }
    }
}

async fn list_devices(cli: &Cli, record_path: Option<&Path>) -> Result<(), CliError> {
    let devices = AdbBackend::list_devices(cli.adb_impl.use_rust()).await?;
    let last = record_path
        .map(DeviceRecord::load)
        .and_then(|r| r.last_device);
    if devices.is_empty() {
        println!("❌ No devices found");
        return Ok(());
    }
    println!("📱 Devices:");
    for device in &devices {
        let marker = if last.as_deref() == Some(device.name.as_str()) {
            " (last used)"
        } else {
            ""
        };
        println!("    {:<24} {}{}", device.name, device.status, marker);
    }
    Ok(())
}

/// Picks and opens a device, remembers it, and wires up the runner.
async fn connect(
    cli: &Cli,
    config: &AutomationConfig,
    record_path: Option<&Path>,
) -> Result<Arc<TaskRunner>, CliError> {
    let use_rust = cli.adb_impl.use_rust();
    let last = record_path
        .map(DeviceRecord::load)
        .and_then(|r| r.last_device);
    let devices = AdbBackend::list_devices(use_rust).await?;
    let name = select_device(&devices, cli.device.as_deref(), last.as_deref())
        .ok_or_else(|| match &cli.device {
            Some(requested) => CliError::DeviceNotReady(requested.clone()),
            None => CliError::NoReadyDevice,
        })?;

    let backend = AdbBackend::new_with_device(&name, use_rust).await?;
    let (width, height) = backend.screen_dimensions();
    log::info!(
        "📱 Connected to {} ({}x{}, impl={:?})",
        backend.device_name(),
        width,
        height,
        cli.adb_impl
    );
    if let Some(path) = record_path
        && let Err(e) = DeviceRecord::remember(path, &name)
    {
        log::warn!("⚠️ Could not save device record: {}", e);
    }

    let device: Arc<dyn ScreenDevice> = Arc::new(backend);
    let recognizer = Arc::new(TesseractRecognizer::new(
        config.tesseract_bin.clone(),
        config.ocr_language.clone(),
    ));
    let templates = Arc::new(TemplateLibrary::new(config.template_dir.clone()));
    match templates.available() {
        Ok(names) => log::debug!("🖼️ Templates: {}", names.join(", ")),
        Err(e) => log::warn!("⚠️ {}", e),
    }

    let engine = MatchEngine::new(device, recognizer, templates)
        .with_text_poll_interval(config.text_poll_interval())
        .with_target_defaults(config.target_defaults());
    let registry = Arc::new(crosscore_registry(&config.game_package));
    let diagnostics_dir: Option<PathBuf> = config.diagnostics_dir.clone();
    Ok(Arc::new(
        TaskRunner::new(registry, engine).with_diagnostics_dir(diagnostics_dir),
    ))
}

async fn schedule(runner: Arc<TaskRunner>, set: TaskSet, every: i64) -> Result<(), CliError> {
    let scheduler = Scheduler::new();
    scheduler.attach(runner).await;
    scheduler.start(set, every).await?;
    println!("⏱️ Scheduler running, press Ctrl-C to stop");

    let mut status_tick = tokio::time::interval(STATUS_LOG_INTERVAL);
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    log::warn!("⚠️ Ctrl-C handler failed: {}", e);
                }
                break;
            }
            _ = status_tick.tick() => {
                let status = scheduler.status().await;
                log::info!(
                    "⏱️ {} next run in {} (runs {}, failures {})",
                    status.task_set,
                    status.countdown(),
                    status.runs,
                    status.failures
                );
            }
        }
    }

    scheduler.detach().await;
    Ok(())
}
