use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub async fn handle_key_events(key_event: KeyEvent, app: &mut App) {
    let keys = app.keybinds().clone();

    match key_event.code {
        KeyCode::Char('c' | 'C') if key_event.modifiers == KeyModifiers::CONTROL => app.quit(),
        KeyCode::Esc if app.config.esc_quit => app.quit(),
        KeyCode::Down => app.select_next(),
        KeyCode::Up => app.select_prev(),

        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            c if c == keys.quit => app.quit(),
            c if c == keys.down => app.select_next(),
            c if c == keys.up => app.select_prev(),
            c if c == keys.refresh => app.reload().await,
            c if c == keys.tx_power => {
                app.clear_error();
                app.toggle_tx_power().await;
            }
            c if c == keys.channel_auto => {
                app.clear_error();
                app.channel_auto().await;
            }
            c if c == keys.essid_any => {
                app.clear_error();
                app.essid_any().await;
            }
            _ => {}
        },

        _ => {}
    }
}
