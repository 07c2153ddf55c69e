use anyhow::Result;
use iwtui::{
    app::App,
    config::Config,
    event::{Event, EventHandler},
    handler::handle_key_events,
    logging,
    tui::Tui,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let log_path = logging::init();
    let config = Config::load();
    info!(
        "iwtui {} starting (log: {:?})",
        env!("CARGO_PKG_VERSION"),
        log_path
    );

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    let events = EventHandler::new(config.tick());
    let mut tui = Tui::new(terminal, events);
    tui.init()?;

    let mut app = App::new(config).await;

    while app.running {
        tui.draw(&mut app)?;

        match tui.events.next().await? {
            Event::Tick => app.tick().await,
            Event::Key(key_event) => handle_key_events(key_event, &mut app).await,
            Event::Resize(_, _) => {}
        }
    }

    tui.exit()?;
    info!("iwtui exiting");
    Ok(())
}
