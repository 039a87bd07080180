//! DeepMiner interactive entrypoint.
//!
//! Runs one guided interview session on stdin/stdout. Without configured
//! credentials the offline mock gateway is used, so the loop is exercisable
//! end to end with no provider account.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deepminer::adapters::gateway::{HttpChatGateway, MockChatGateway};
use deepminer::adapters::storage::{FileHistoryStore, FilePresetStore};
use deepminer::config::AppConfig;
use deepminer::domain::catalog::ModeCatalog;
use deepminer::domain::session::{SendOutcome, SessionEngine};
use deepminer::ports::{ChatGateway, GatewayConfig, PresetStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(true))
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        tracing::error!("invalid configuration: {e}");
        std::process::exit(1);
    }

    // A saved preset (the default one, or the first) overrides the
    // environment defaults wholesale when it carries a key.
    let preset_store = FilePresetStore::new(config.storage.presets_path());
    let preset_config = match preset_store.load_all().await {
        Ok(presets) => presets
            .iter()
            .find(|p| p.is_default)
            .or_else(|| presets.first())
            .map(|p| p.to_gateway_config()),
        Err(e) => {
            tracing::warn!("could not load credential presets: {e}");
            None
        }
    };
    let defaults = config.gateway.to_gateway_config();
    let gateway_config = GatewayConfig::resolve(preset_config.as_ref(), &defaults).clone();

    let gateway: Arc<dyn ChatGateway> = if gateway_config.has_key() {
        tracing::info!(provider = %gateway_config.provider, "using HTTP gateway");
        Arc::new(HttpChatGateway::new())
    } else {
        tracing::info!("no credentials configured, using offline mock gateway");
        Arc::new(MockChatGateway::new())
    };
    let history_store = Arc::new(FileHistoryStore::new(config.storage.history_path()));

    let mut engine = SessionEngine::new(
        ModeCatalog::with_builtins(),
        gateway,
        gateway_config,
        history_store,
    );
    if let Err(e) = engine.bootstrap().await {
        tracing::warn!("could not load saved history: {e}");
    }

    println!("DeepMiner — 深挖式诊断访谈");
    print_modes(&engine);
    println!("命令：/mode <id>  /history  /load <id>  /delete <id>  /new  /report  /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&engine);
        let Ok(Some(line)) = lines.next_line().await else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.split_once(' ').unwrap_or((input, "")) {
            ("/quit", _) => break,
            ("/mode", id) => {
                engine.init_mode(id.trim()).await;
                match engine.state().messages().last() {
                    Some(msg) => println!("\n{}\n", msg.content()),
                    None => println!("未知模式：{}", id.trim()),
                }
            }
            ("/history", _) => {
                for item in engine.history() {
                    let marker = if item.active { "*" } else { " " };
                    println!(
                        "{marker} {}  [{}]  {}",
                        item.id,
                        item.timestamp.date_string(),
                        item.title
                    );
                }
            }
            ("/load", id) => {
                if engine.load_session(id.trim()).await {
                    println!("已恢复会话。");
                    if let Some(msg) = engine.state().messages().last() {
                        println!("\n{}\n", msg.content());
                    }
                } else if let Some(error) = engine.history_error() {
                    println!("{error}");
                }
            }
            ("/delete", id) => {
                engine.delete_session(id.trim()).await;
                println!("已删除。");
            }
            ("/new", _) => {
                engine.reset().await;
                print_modes(&engine);
            }
            ("/report", _) => {
                for entry in engine.report_entries() {
                    println!("[{} {}] {}", entry.phase, entry.title, entry.answer);
                }
            }
            _ => match engine.send_message(input).await {
                SendOutcome::Blocked { warning } => println!("\n{warning}\n"),
                SendOutcome::Failed { warning } => println!("\n{warning}\n"),
                SendOutcome::Replied { completed, .. } => {
                    if let Some(msg) = engine.state().messages().last() {
                        println!("\n{}\n", msg.content());
                    }
                    if completed {
                        println!("本次访谈已完成，可用 /report 导出回答。");
                    }
                }
                SendOutcome::Ignored => {
                    println!("请先用 /mode <id> 选择一个模式。");
                }
            },
        }
    }
}

fn print_modes(engine: &SessionEngine) {
    println!("可用模式：");
    for mode in engine.catalog().modes() {
        println!("  {} — {}", mode.id(), mode.name());
    }
}

fn prompt(engine: &SessionEngine) {
    match engine.phase_progress() {
        Some(progress) => print!("[{}/{} {}] > ", progress.position, progress.total, progress.title),
        None => print!("> "),
    }
    let _ = std::io::stdout().flush();
}
