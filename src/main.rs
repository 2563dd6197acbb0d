use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::Mutex;

use band_site::audio::{media_event_channel, open_output, AudioOutput};
use band_site::config::Config;
use band_site::controller::AppController;
use band_site::logging;
use band_site::model::{AppModel, BandApiClient, Page};
use band_site::player::PlayerEngine;
use band_site::view::{AppView, ViewData};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!(api_base = %config.api_base, "=== band-site starting ===");

    let api = BandApiClient::new(&config.api_base, config.request_timeout())?;

    let (events_tx, events_rx) = media_event_channel();
    let output = open_output(events_tx, config.silent);
    tracing::info!(output = output.name(), "Audio output ready");
    let player = Arc::new(Mutex::new(PlayerEngine::new(output, config.volume)));

    let model = Arc::new(Mutex::new(AppModel::new()));
    let controller = AppController::new(model.clone(), player, api);
    controller.start_player_event_listener(events_rx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    controller.go_to(Page::Home).await;

    let res = run_app(&mut terminal, model, controller.clone()).await;

    controller.stop_player().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("band-site shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let player = controller.tick_player().await;

        // Get current state
        let (ui_state, content_state, session, form, playlist, should_quit) = {
            let model_guard = model.lock().await;

            // Notices clear themselves after a few seconds
            model_guard.auto_clear_old_notices().await;

            (
                model_guard.get_ui_state().await,
                model_guard.get_content_state().await,
                model_guard.get_session().await,
                model_guard.get_form().await,
                model_guard.get_playlist().await,
                model_guard.should_quit().await,
            )
        };

        let data = ViewData {
            player: &player,
            ui_state: &ui_state,
            content: &content_state,
            session: session.as_ref(),
            form: form.as_ref(),
            playlist: &playlist,
        };

        terminal.draw(|f| {
            AppView::render(f, &data);
        })?;

        if should_quit {
            break;
        }

        // Short poll keeps the progress bar moving
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
