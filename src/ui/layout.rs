use crate::{
    app::App,
    ui::{components, wireless},
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

const MIN_WIDTH: u16 = 90;
const MIN_HEIGHT: u16 = 22;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        components::render_too_small(frame, area, MIN_WIDTH, MIN_HEIGHT);
        return;
    }

    let [header, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(10),
        Constraint::Length(2),
    ])
    .margin(1)
    .areas(area);

    components::render_header(app, frame, header);
    wireless::render(app, frame, body);
    components::render_footer(app, frame, footer);

    // A refresh error hides any pending toast.
    match (&app.last_error, &app.toast) {
        (Some(err), _) => components::render_error_popup(frame, err),
        (None, Some(t)) => components::render_toast_popup(frame, t.kind, &t.msg),
        (None, None) => {}
    }
}
