use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::warn;

use pushforge_bridge::{system_notifier, InventoryError, ProcessRunner, TokioProcessRunner};
use pushforge_core::payload::{auto_fix_common_issues, byte_count, content_or_default, minify, pretty_print};
use pushforge_core::{
    extract_content, validate, SendStatus, TargetPlatform, TemplateCatalog, TemplatePlatform, ValidationVerdict,
};
use pushforge_engine::{Dispatcher, DispatcherConfig, ToolAvailability};
use pushforge_settings::ForgeSettings;
use pushforge_store::{Database, HistoryStore, MemoryHistoryStore, SavedDeviceRepo, SqliteHistoryStore};

use crate::cli::{Command, PayloadArg, SavedAction, SendArgs};

pub async fn run(command: Command, settings: ForgeSettings) -> Result<ExitCode> {
    match command {
        Command::Validate { payload, target, json } => {
            let text = read_payload(&payload)?;
            let verdict = validate(&text, target);
            if json {
                println!("{}", serde_json::to_string_pretty(&verdict)?);
            } else {
                for line in verdict_lines(&verdict) {
                    println!("{line}");
                }
                println!("{} bytes", byte_count(&text));
            }
            Ok(exit_code(verdict.is_valid()))
        }
        Command::Fix { payload } => {
            print!("{}", auto_fix_common_issues(&read_payload(&payload)?));
            Ok(ExitCode::SUCCESS)
        }
        Command::Format { payload, minify: compact } => {
            let text = read_payload(&payload)?;
            let formatted = if compact { minify(&text) } else { pretty_print(&text) };
            let formatted =
                formatted.context("payload is not valid JSON; run `pushforge validate` for details")?;
            println!("{formatted}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Extract { payload } => {
            let text = read_payload(&payload)?;
            let content = match extract_content(&text) {
                Some(content) => content,
                None => {
                    eprintln!("no displayable content; a send would use these defaults");
                    content_or_default(&text)
                }
            };
            println!("{}", serde_json::to_string_pretty(&content)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Devices { target } => devices(&settings, target).await,
        Command::Boot { udid } => {
            let mut dispatcher = build_dispatcher(
                &settings,
                Arc::new(MemoryHistoryStore::new()),
                TargetPlatform::IosSimulator,
            );
            dispatcher.boot_simulator(&udid).await?;
            match dispatcher.selected_simulator() {
                Some(device) => println!("booted {} ({})", device.name, device.udid),
                None => println!("booted {udid}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Apps { target, device } => {
            let mut dispatcher = build_dispatcher(&settings, Arc::new(MemoryHistoryStore::new()), target);
            prepare_target(&mut dispatcher, device.as_deref()).await?;
            for app in dispatcher.discover_apps().await {
                println!("{:<40} {}", app.bundle_id, app.name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Templates { platform, show } => {
            let catalog = TemplateCatalog::load(Some(settings.templates.user_dir.as_path()))?;
            if let Some(id) = show {
                let template = catalog.get(&id).with_context(|| format!("no template named {id:?}"))?;
                println!("{}", template.payload);
                return Ok(ExitCode::SUCCESS);
            }
            let platform = match platform.as_deref() {
                Some(name) => Some(
                    TemplatePlatform::from_name(name)
                        .with_context(|| format!("unknown template platform {name:?} (ios, android, web)"))?,
                ),
                None => None,
            };
            for template in catalog.all().iter().filter(|t| platform.map_or(true, |p| t.platform == p)) {
                println!(
                    "{:<18} {:<8} {:<9} {} - {}",
                    template.id,
                    template.platform.as_str(),
                    template.category.as_str(),
                    template.name,
                    template.description
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Send(args) => send(&settings, args).await,
        Command::History { limit, clear, json } => {
            let history = SqliteHistoryStore::new(open_database(&settings)?);
            if clear {
                println!("cleared {} records", history.clear()?);
                return Ok(ExitCode::SUCCESS);
            }
            let records = history.list(Some(limit))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(ExitCode::SUCCESS);
            }
            for record in records {
                let error = record.error_message.as_deref().map(|e| format!("  {e}")).unwrap_or_default();
                println!(
                    "{}  {:<7}  {} ({})  {}{}",
                    record.sent_at.format("%Y-%m-%d %H:%M:%S"),
                    record.status_label(),
                    record.device_label,
                    record.device_identifier,
                    record.bundle_identifier,
                    error
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Saved { action } => {
            let repo = SavedDeviceRepo::new(open_database(&settings)?);
            match action {
                SavedAction::List => {
                    for saved in repo.list()? {
                        let last_used = saved
                            .last_used_at
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "never".to_string());
                        println!(
                            "{:>4}  {}  {} -> {}  (last used {last_used})",
                            saved.id, saved.label, saved.device_identifier, saved.bundle_identifier
                        );
                    }
                }
                SavedAction::Add {
                    label,
                    device,
                    bundle_id,
                    device_type,
                } => {
                    let saved = repo.add(&label, &bundle_id, &device, &device_type)?;
                    println!("saved #{} {}", saved.id, saved.label);
                }
                SavedAction::Remove { id } => {
                    if !repo.remove(id)? {
                        bail!("no saved device #{id}");
                    }
                    println!("removed #{id}");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn send(settings: &ForgeSettings, args: SendArgs) -> Result<ExitCode> {
    let text = match &args.template {
        Some(id) => {
            let catalog = TemplateCatalog::load(Some(settings.templates.user_dir.as_path()))?;
            catalog
                .get(id)
                .with_context(|| format!("no template named {id:?}"))?
                .payload
                .clone()
        }
        None => read_payload(&args.payload)?,
    };

    let saved = match args.saved {
        Some(id) => Some(SavedDeviceRepo::new(open_database(settings)?).get(id)?),
        None => None,
    };
    let (target, device, app) = match &saved {
        Some(saved) => (
            TargetPlatform::IosSimulator,
            Some(saved.device_identifier.clone()),
            saved.bundle_identifier.clone(),
        ),
        None => (args.target, args.device, args.app),
    };

    let verdict = validate(&text, target);
    if !verdict.is_valid() {
        for line in verdict_lines(&verdict) {
            eprintln!("{line}");
        }
        if !args.force {
            bail!("payload failed validation; pass --force to send anyway");
        }
    } else if verdict.is_warning() {
        for line in verdict_lines(&verdict) {
            eprintln!("{line}");
        }
    }

    let history: Arc<dyn HistoryStore> = if args.no_history {
        Arc::new(MemoryHistoryStore::new())
    } else {
        Arc::new(SqliteHistoryStore::new(open_database(settings)?))
    };
    let mut dispatcher = build_dispatcher(settings, history, target);
    prepare_target(&mut dispatcher, device.as_deref()).await?;

    let status = dispatcher.send_push(&text, &app).await?;
    if let Some(saved) = &saved {
        mark_used(settings, saved.id);
    }

    match status {
        SendStatus::Failure(message) => {
            eprintln!("send failed: {message}");
            Ok(ExitCode::FAILURE)
        }
        status => {
            println!("{status}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn devices(settings: &ForgeSettings, only: Option<TargetPlatform>) -> Result<ExitCode> {
    let mut dispatcher = build_dispatcher(
        settings,
        Arc::new(MemoryHistoryStore::new()),
        TargetPlatform::default(),
    );
    let platforms: Vec<TargetPlatform> = match only {
        Some(platform) => vec![platform],
        None => TargetPlatform::ALL.to_vec(),
    };

    for platform in platforms {
        println!("{}", platform.label());
        match platform {
            TargetPlatform::IosSimulator => match dispatcher.refresh_simulators().await {
                Ok(_) => {
                    for device in dispatcher.simulators() {
                        let state = if device.is_booted() { "booted" } else { "-" };
                        println!("  {:<7} {:<28} {:<12} {}", state, device.name, device.runtime, device.udid);
                    }
                }
                Err(e) => println!("  {}", unavailable(&e, dispatcher.tool_availability(platform))),
            },
            TargetPlatform::AndroidEmulator => match dispatcher.refresh_emulators().await {
                Ok(_) => {
                    for emulator in dispatcher.emulators() {
                        let state = if emulator.is_online() { "online" } else { "offline" };
                        println!("  {:<7} {:<28} {}", state, emulator.name, emulator.serial);
                    }
                }
                Err(e) => println!("  {}", unavailable(&e, dispatcher.tool_availability(platform))),
            },
            TargetPlatform::Desktop => println!("  local notifications (always ready)"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Only sends that reached the device path count as a use.
fn mark_used(settings: &ForgeSettings, id: i64) {
    let touched = open_database(settings).and_then(|db| Ok(SavedDeviceRepo::new(db).touch(id)?));
    if let Err(e) = touched {
        warn!(id, error = %e, "could not update saved device");
    }
}

fn unavailable(error: &InventoryError, availability: ToolAvailability) -> String {
    match availability {
        ToolAvailability::Missing => format!("not installed ({error})"),
        _ => format!("unavailable: {error}"),
    }
}

/// Refreshes the target's devices and applies an explicit device choice.
async fn prepare_target(dispatcher: &mut Dispatcher, device: Option<&str>) -> Result<()> {
    if let Err(e) = dispatcher.refresh().await {
        warn!(error = %e, "device refresh failed");
    }
    let Some(device) = device else {
        return Ok(());
    };
    match dispatcher.target() {
        TargetPlatform::IosSimulator => dispatcher.select_simulator(device)?,
        TargetPlatform::AndroidEmulator => dispatcher.select_emulator(device)?,
        TargetPlatform::Desktop => warn!(device, "desktop target ignores --device"),
    }
    Ok(())
}

fn build_dispatcher(settings: &ForgeSettings, history: Arc<dyn HistoryStore>, target: TargetPlatform) -> Dispatcher {
    let config = DispatcherConfig::from_settings(settings);
    let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner);
    let notifier = system_notifier(
        runner.clone(),
        &settings.process.osascript_path,
        &settings.process.notify_send_path,
        config.timeout,
    );
    Dispatcher::new(runner, notifier, history, config).with_target(target)
}

fn open_database(settings: &ForgeSettings) -> Result<Database> {
    let path = &settings.history.db_path;
    Database::open(path).with_context(|| format!("opening {}", path.display()))
}

fn read_payload(arg: &PayloadArg) -> Result<String> {
    match arg.file.as_deref() {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
            Ok(text)
        }
    }
}

fn verdict_lines(verdict: &ValidationVerdict) -> Vec<String> {
    let label = if !verdict.is_valid() {
        "invalid"
    } else if verdict.is_warning() {
        "warning"
    } else {
        "ok"
    };
    let mut lines = vec![format!("{label}: {}", verdict.message())];
    if let Some(fix) = verdict.fix() {
        lines.push(format!("fix: {fix}"));
    }
    lines
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
