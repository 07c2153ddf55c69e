use crate::{
    app::App,
    domain::wireless::{NOISE_FLOOR_DBM, WirelessIface},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Wrap},
};

pub fn render(app: &mut App, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_interfaces(app, frame, chunks[0]);
    render_parameters(app, frame, chunks[1]);
}

fn render_interfaces(app: &mut App, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = app
        .wireless
        .ifaces
        .iter()
        .map(|i| {
            let marker = if i.error.is_some() {
                "!"
            } else if i.is_associated() {
                "󰤨"
            } else {
                ""
            };
            Row::new(vec![
                Cell::from(marker),
                Cell::from(i.name.clone()),
                Cell::from(i.essid.clone()),
                Cell::from(mode_label(i)),
                Cell::from(channel_label(i.channel)),
                Cell::from(dbm_label(i.signal_level_dbm)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(12),
            Constraint::Min(14),
            Constraint::Length(10),
            Constraint::Length(4),
            Constraint::Length(9),
        ],
    )
    .header(
        Row::new(vec!["", "Interface", "ESSID", "Mode", "Ch", "Signal"])
            .style(Style::default().fg(Color::Yellow).bold())
            .bottom_margin(1),
    )
    .block(section_block(" Interfaces "))
    .row_highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_stateful_widget(table, area, &mut app.iface_state);
}

fn render_parameters(app: &App, frame: &mut Frame, area: Rect) {
    let Some(iface) = app.selected_iface() else {
        let p = Paragraph::new(vec![
            Line::from("No wireless interface found."),
            Line::from(""),
            Line::from("iwconfig did not report any interface with wireless extensions."),
        ])
        .block(section_block(" Parameters "))
        .wrap(Wrap { trim: true });
        frame.render_widget(p, area);
        return;
    };

    if let Some(err) = &iface.error {
        let p = Paragraph::new(vec![
            Line::from("Parameters unavailable:").bold(),
            Line::from(""),
            Line::from(err.clone()).fg(Color::Red),
        ])
        .block(section_block(" Parameters "))
        .wrap(Wrap { trim: true });
        frame.render_widget(p, area);
        return;
    }

    let rows: Vec<Row> = parameter_rows(iface)
        .into_iter()
        .map(|(label, value)| Row::new(vec![Cell::from(label).bold(), Cell::from(value)]))
        .collect();

    let title = format!(" Parameters ({}) ", iface.name);
    let table = Table::new(rows, [Constraint::Length(16), Constraint::Min(10)])
        .block(section_block(&title));

    frame.render_widget(table, area);
}

fn parameter_rows(i: &WirelessIface) -> Vec<(&'static str, String)> {
    vec![
        ("ESSID", i.essid.clone()),
        ("Access Point", i.access_point.clone()),
        ("Mode", mode_label(i)),
        ("Frequency", frequency_label(i.frequency_hz)),
        ("Channel", channel_label(i.channel)),
        ("Bit Rate", rate_label(i.bit_rate_mbps)),
        ("TX Power", dbm_label(i.tx_power_dbm)),
        ("Signal Level", dbm_label(i.signal_level_dbm)),
        ("RTS thr", threshold_label(i.rts_threshold)),
        ("Fragment thr", threshold_label(i.frag_threshold)),
        ("Retry limit", i.retry_limit.to_string()),
    ]
}

fn section_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(Color::Green))
}

fn mode_label(i: &WirelessIface) -> String {
    i.operating_mode()
        .map(|m| m.keyword().to_string())
        .unwrap_or_else(|| format!("mode {}", i.mode))
}

fn dbm_label(v: f64) -> String {
    if v <= NOISE_FLOOR_DBM {
        "off".to_string()
    } else {
        format!("{v} dBm")
    }
}

fn frequency_label(hz: f64) -> String {
    if hz <= 0.0 {
        "-".to_string()
    } else {
        format!("{:.3} GHz", hz / 1e9)
    }
}

fn channel_label(channel: i32) -> String {
    if channel <= 0 {
        "-".to_string()
    } else {
        channel.to_string()
    }
}

fn rate_label(mbps: f64) -> String {
    if mbps <= 0.0 {
        "-".to_string()
    } else {
        format!("{mbps} Mb/s")
    }
}

fn threshold_label(bytes: f64) -> String {
    if bytes <= 0.0 {
        "off".to_string()
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(dbm_label(NOISE_FLOOR_DBM), "off");
        assert_eq!(dbm_label(-59.0), "-59 dBm");
        assert_eq!(frequency_label(2.437e9), "2.437 GHz");
        assert_eq!(frequency_label(0.0), "-");
        assert_eq!(channel_label(0), "-");
        assert_eq!(rate_label(144.4), "144.4 Mb/s");
        assert_eq!(threshold_label(2347.0), "2347 B");
        assert_eq!(threshold_label(0.0), "off");
    }

    #[test]
    fn unknown_mode_codes_are_shown_raw() {
        let mut iface = WirelessIface::named("wlan0");
        assert_eq!(mode_label(&iface), "auto");
        iface.mode = 7;
        assert_eq!(mode_label(&iface), "mode 7");
    }

    #[test]
    fn parameter_panel_covers_every_field() {
        let rows = parameter_rows(&WirelessIface::named("wlan0"));
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[0], ("ESSID", "off/any".to_string()));
    }
}
