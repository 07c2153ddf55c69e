mod components;
mod layout;
mod wireless;

use crate::app::App;
use ratatui::Frame;

pub fn render(app: &mut App, frame: &mut Frame) {
    layout::render(app, frame);
}
