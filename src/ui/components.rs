use crate::{app::App, domain::common::ToastKind};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

pub fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let count = app.wireless.ifaces.len();
    let noun = if count == 1 { "interface" } else { "interfaces" };
    let mut spans = vec![
        Span::from(count.to_string()).bold().fg(Color::Cyan),
        Span::from(format!(" wireless {noun}")),
    ];
    if let Some(action) = &app.last_action {
        spans.push(Span::from("  last: "));
        spans.push(Span::from(action.clone()).italic());
    }

    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(framed(" iwtui ", Color::Green));
    frame.render_widget(header, area);
}

pub fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let keys = app.keybinds();
    let navigation = hints(&[
        (format!("{}/↑", keys.up), "up"),
        (format!("{}/↓", keys.down), "down"),
        (keys.refresh.to_string(), "refresh"),
        (keys.quit.to_string(), "quit"),
    ]);
    let actions = hints(&[
        (keys.tx_power.to_string(), "radio on/off"),
        (keys.channel_auto.to_string(), "channel auto"),
        (keys.essid_any.to_string(), "ESSID any"),
    ]);

    let p = Paragraph::new(vec![navigation, actions])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Blue));
    frame.render_widget(p, area);
}

pub fn render_error_popup(frame: &mut Frame, msg: &str) {
    let area = centered_rect(80, 40, frame.area());
    popup(frame, area, " Error ", Color::Red, msg);
}

pub fn render_toast_popup(frame: &mut Frame, kind: ToastKind, msg: &str) {
    let color = match kind {
        ToastKind::Info => Color::Cyan,
        ToastKind::Success => Color::Green,
        ToastKind::Error => Color::Red,
    };

    let screen = frame.area();
    let rows = msg.lines().count().max(1) as u16;
    let width = screen.width.saturating_sub(2).clamp(24, 58);
    let area = top_right_rect(width, (rows + 2).clamp(4, 8), screen);
    popup(frame, area, kind.title(), color, msg);
}

pub fn render_too_small(frame: &mut Frame, area: Rect, min_w: u16, min_h: u16) {
    let block = framed(" iwtui ", Color::Yellow);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::from("Terminal too small").bold(),
        Line::from(""),
        Line::from(format!("need {min_w}x{min_h}, have {}x{}", area.width, area.height)),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn hints(pairs: &[(String, &'static str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(pairs.len() * 3);
    for (i, (key, label)) in pairs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::from(" | "));
        }
        spans.push(Span::from(key.clone()).bold());
        spans.push(Span::from(format!(" {label}")));
    }
    Line::from(spans)
}

fn framed(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(color))
}

fn popup(frame: &mut Frame, area: Rect, title: &str, color: Color, msg: &str) {
    frame.render_widget(Clear, area);
    let p = Paragraph::new(msg)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false })
        .block(framed(title, color));
    frame.render_widget(p, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(r);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Anchors a `width` x `height` box one cell in from the top-right corner.
fn top_right_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.right().saturating_sub(width + 1);
    Rect::new(x, area.y + 1, width, height)
}
