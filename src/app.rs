use crate::api::RestClient;
use crate::cli::command::UiCommand;
use crate::cli::Args;
use crate::controller::state::ControllerSettings;
use crate::controller::{ AppEvent, ChatController, Flow };
use crate::view::render::render;
use crate::websocket;

use log::{ info, error, debug };
use std::error::Error;
use std::io::{ BufRead, Write };
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{ self, UnboundedSender };

const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Reads terminal lines and turns them into UI events until EOF.
///
/// Runs on a plain thread: a blocked stdin read must not hold up runtime shutdown.
fn read_terminal(events: UnboundedSender<AppEvent>) {
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        };
        let event = match UiCommand::parse(&line) {
            Ok(Some(command)) => AppEvent::Ui(command),
            Ok(None) => {
                continue;
            }
            Err(e) => AppEvent::InputError(e.to_string()),
        };
        if events.send(event).is_err() {
            return;
        }
    }
    debug!("stdin closed");
    let _ = events.send(AppEvent::Ui(UiCommand::Quit));
}

async fn tick(events: UnboundedSender<AppEvent>) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    loop {
        interval.tick().await;
        if events.send(AppEvent::Tick).is_err() {
            return;
        }
    }
}

fn draw(controller: &ChatController, clear: bool) {
    let frame = render(controller.view(), clear);
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(frame.as_bytes());
    let _ = stdout.flush();
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Client Configuration ---");
    info!("Server URL: {}", args.server_url);
    info!("API Base URL: {}", args.api_base_url);
    info!("API Key Configured: {}", args.server_api_key.is_some());
    info!("Default Collection: {}", args.default_collection);
    info!("Max Message Length: {}", args.max_message_len);
    info!("Notification TTL (ms): {}", args.notification_ttl_ms);
    info!("Assume Yes: {}", args.assume_yes);
    info!("----------------------------");

    let url = websocket::build_url(&args.server_url, args.server_api_key.as_deref())?;
    let api = Arc::new(
        RestClient::new(&args.api_base_url, Duration::from_secs(args.http_timeout_secs))?
    );

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let mut controller = ChatController::new(
        ControllerSettings::from(&args),
        outbound_tx,
        events_tx.clone(),
        api
    );

    let transport_events = events_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = websocket::run_transport(url, outbound_rx, transport_events).await {
            error!("Transport stopped: {}", e);
        }
    });
    let terminal_events = events_tx.clone();
    std::thread::spawn(move || read_terminal(terminal_events));
    tokio::spawn(tick(events_tx));

    let clear = !args.no_clear;
    controller.start();
    draw(&controller, clear);

    while let Some(event) = events_rx.recv().await {
        match controller.handle(event) {
            Flow::Redraw => draw(&controller, clear),
            Flow::Unchanged => {}
            Flow::Quit => {
                info!("Quit requested");
                break;
            }
        }
    }

    println!();
    Ok(())
}
