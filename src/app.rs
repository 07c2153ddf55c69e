use crate::{
    backend::{
        iwconfig::Iwconfig,
        traits::{CommandResult, WirelessBackend},
    },
    config::{Config, Keybinds},
    domain::{
        common::{Toast, ToastKind},
        settings::{ChannelSetting, EssidSetting, TxPower},
        wireless::{WirelessIface, WirelessState},
    },
    error::IwError,
};
use anyhow::Result;
use ratatui::widgets::TableState;
use std::{sync::Arc, time::Instant};
use tokio::task::{self, JoinHandle};
use tracing::{info, warn};

pub struct App {
    pub running: bool,
    pub config: Config,

    pub wireless: WirelessState,
    pub iface_state: TableState,

    pub last_error: Option<String>,
    pub last_action: Option<String>,
    pub toast: Option<Toast>,

    backend: Arc<Iwconfig>,
    /// Snapshot being collected on a blocking thread.
    pending: Option<JoinHandle<Result<WirelessState>>>,
}

impl App {
    pub async fn new(config: Config) -> Self {
        let backend = Iwconfig::new(config.tools.clone(), config.command_timeout());
        Self::with_backend(config, backend).await
    }

    pub async fn with_backend(config: Config, backend: Iwconfig) -> Self {
        let mut app = Self {
            running: true,
            config,
            wireless: WirelessState::empty(),
            iface_state: TableState::default(),
            last_error: None,
            last_action: None,
            toast: None,
            backend: Arc::new(backend),
            pending: None,
        };

        app.refresh().await;
        app
    }

    pub fn keybinds(&self) -> &Keybinds {
        &self.config.keys
    }

    /// Expires the toast and keeps one background refresh in flight.
    ///
    /// A finished snapshot is applied on the next tick, so slow tools never
    /// hold up key handling.
    pub async fn tick(&mut self) {
        if let Some(t) = &self.toast
            && t.expired_at(Instant::now())
        {
            self.toast = None;
        }

        if self.pending.as_ref().is_some_and(JoinHandle::is_finished) {
            self.finish_refresh().await;
        }
        self.start_refresh();
    }

    /// Takes a fresh snapshot and waits for it.
    pub async fn refresh(&mut self) {
        // An in-flight snapshot may predate the last setter.
        self.finish_refresh().await;
        self.start_refresh();
        self.finish_refresh().await;
    }

    /// Refresh requested from the keyboard.
    pub async fn reload(&mut self) {
        self.clear_error();
        self.refresh().await;
        if self.last_error.is_none() {
            let count = self.wireless.ifaces.len();
            self.set_toast(ToastKind::Info, format!("Refreshed {count} interface(s)"));
        }
    }

    fn start_refresh(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let backend = Arc::clone(&self.backend);
        self.pending = Some(task::spawn_blocking(move || backend.query_state()));
    }

    async fn finish_refresh(&mut self) {
        let Some(handle) = self.pending.take() else {
            return;
        };
        let selected = self.selected_iface().map(|i| i.name.clone());

        match handle.await.map_err(anyhow::Error::from).and_then(|r| r) {
            Ok(state) => {
                self.wireless = state;
                self.restore_selection(selected);
                self.last_error = None;
            }
            Err(e) => {
                warn!("refresh failed: {e:#}");
                self.last_error = Some(format!("{e:#}"));
            }
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn select_next(&mut self) {
        select_next_in_state(&mut self.iface_state, self.wireless.ifaces.len());
    }

    pub fn select_prev(&mut self) {
        select_prev_in_state(&mut self.iface_state, self.wireless.ifaces.len());
    }

    pub fn selected_iface(&self) -> Option<&WirelessIface> {
        self.iface_state
            .selected()
            .and_then(|i| self.wireless.ifaces.get(i))
    }

    pub fn set_toast(&mut self, kind: ToastKind, msg: impl Into<String>) {
        self.toast = Some(Toast::new(kind, msg));
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Switches the radio of the selected interface off, or back on when it
    /// is already off.
    pub async fn toggle_tx_power(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };
        let radio_off = self.selected_iface().is_some_and(WirelessIface::radio_off);
        let power = if radio_off { TxPower::On } else { TxPower::Off };

        let iface = name.clone();
        let result = self
            .on_backend(move |iw| iw.set_tx_power(&iface, power))
            .await;
        self.report(&name, &format!("TX power {power}"), result).await;
    }

    pub async fn channel_auto(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };
        let iface = name.clone();
        let result = self
            .on_backend(move |iw| iw.set_channel(&iface, ChannelSetting::Auto))
            .await;
        self.report(&name, "channel auto", result).await;
    }

    pub async fn essid_any(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };
        let iface = name.clone();
        let result = self
            .on_backend(move |iw| iw.set_essid(&iface, &EssidSetting::Any))
            .await;
        self.report(&name, "ESSID any", result).await;
    }

    /// Runs one blocking backend call off the async runtime.
    async fn on_backend<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Iwconfig) -> Result<T, IwError> + Send + 'static,
        T: Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        Ok(task::spawn_blocking(move || f(&backend)).await??)
    }

    fn selected_name(&mut self) -> Option<String> {
        let name = self.selected_iface().map(|i| i.name.clone());
        if name.is_none() {
            self.set_toast(ToastKind::Error, "No wireless interface selected");
        }
        name
    }

    async fn report(&mut self, iface: &str, action: &str, result: Result<CommandResult>) {
        match result {
            Ok(out) if out.success() => {
                info!("{iface}: {action}");
                self.last_action = Some(format!("{iface}: {action}"));
                self.set_toast(ToastKind::Success, format!("{iface}: {action}"));
                self.refresh().await;
            }
            Ok(out) => {
                let msg = friendly_error(action, out.output.trim());
                self.set_toast(ToastKind::Error, format!("{iface}: {msg}"));
            }
            Err(e) => {
                let msg = friendly_error(action, &format!("{e:#}"));
                self.set_toast(ToastKind::Error, msg);
            }
        }
    }

    fn restore_selection(&mut self, selected: Option<String>) {
        if let Some(name) = selected
            && let Some(idx) = self.wireless.position(&name)
        {
            self.iface_state.select(Some(idx));
            return;
        }
        clamp_selected(&mut self.iface_state, self.wireless.ifaces.len());
    }
}

fn friendly_error(action: &str, msg: &str) -> String {
    let lower = msg.to_lowercase();
    if lower.contains("permission denied") || lower.contains("operation not permitted") {
        return format!(
            "{} requires elevated permissions. Run with proper privileges and retry.",
            action
        );
    }
    if msg.is_empty() {
        return format!("{action} failed");
    }
    msg.to_string()
}

fn select_next_in_state(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) => (i + 1).min(len - 1),
        None => 0,
    };
    state.select(Some(i));
}

fn select_prev_in_state(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) => i.saturating_sub(1),
        None => 0,
    };
    state.select(Some(i));
}

fn clamp_selected(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let idx = state.selected().unwrap_or(0).min(len - 1);
    state.select(Some(idx));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        iwconfig::{
            ToolPaths,
            tests::{STATUS, ScriptedRunner, scripted_wlan0},
        },
        traits::CommandRunner,
    };
    use std::time::Duration;

    async fn app_with(runner: impl CommandRunner + 'static) -> App {
        App::with_backend(
            Config::default(),
            Iwconfig::with_runner(Box::new(runner), ToolPaths::default()),
        )
        .await
    }

    #[tokio::test]
    async fn startup_selects_first_interface() {
        let app = app_with(scripted_wlan0()).await;
        assert_eq!(app.selected_iface().map(|i| i.name.as_str()), Some("wlan0"));
        assert!(app.last_error.is_none());
        assert!(app.pending.is_none());
    }

    #[tokio::test]
    async fn toggle_turns_a_live_radio_off() {
        let runner = scripted_wlan0();
        let calls = runner.calls.clone();
        let mut app = app_with(runner).await;
        app.toggle_tx_power().await;
        assert!(
            calls
                .lock()
                .unwrap()
                .iter()
                .any(|c| c == "iwconfig wlan0 txpower off")
        );
        assert_eq!(app.last_action.as_deref(), Some("wlan0: TX power off"));
    }

    #[tokio::test]
    async fn permission_failures_are_reworded() {
        let runner = scripted_wlan0().reply(
            "iwconfig wlan0 channel auto",
            250,
            "SET failed on device wlan0 ; Operation not permitted.",
        );
        let mut app = app_with(runner).await;
        app.channel_auto().await;
        let toast = app.toast.expect("toast");
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.msg.contains("requires elevated permissions"));
        assert!(app.last_action.is_none());
    }

    #[tokio::test]
    async fn actions_need_a_selection() {
        let mut app = app_with(ScriptedRunner::default()).await;
        assert!(app.selected_iface().is_none());
        app.essid_any().await;
        assert_eq!(app.toast.map(|t| t.kind), Some(ToastKind::Error));
    }

    #[tokio::test]
    async fn manual_reload_shows_an_info_toast() {
        let mut app = app_with(scripted_wlan0()).await;
        app.reload().await;
        let toast = app.toast.expect("toast");
        assert_eq!(toast.kind, ToastKind::Info);
        assert_eq!(toast.msg, "Refreshed 1 interface(s)");
    }

    #[tokio::test]
    async fn tick_applies_snapshots_in_the_background() {
        let mut app = app_with(scripted_wlan0()).await;
        app.wireless = WirelessState::empty();

        app.tick().await;
        assert!(app.pending.is_some());
        assert!(app.wireless.ifaces.is_empty());

        app.finish_refresh().await;
        assert_eq!(app.wireless.ifaces.len(), 1);
        assert_eq!(app.selected_iface().map(|i| i.name.as_str()), Some("wlan0"));
    }

    struct SlowTools;

    impl CommandRunner for SlowTools {
        fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, IwError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(CommandResult {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                status: Some(0),
                output: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn slow_tools_do_not_hold_up_ticks() {
        let mut app = app_with(SlowTools).await;

        let started = Instant::now();
        app.tick().await;
        app.tick().await;
        assert!(started.elapsed() < Duration::from_millis(150));
        assert!(app.pending.is_some());
    }

    #[tokio::test]
    async fn selection_follows_interface_name() {
        let two = format!("{}{STATUS}", STATUS.replace("wlan0", "wlan1"));
        let mut app = app_with(scripted_wlan0().reply("iwconfig", 0, &two)).await;
        app.select_next();
        assert_eq!(app.selected_iface().map(|i| i.name.as_str()), Some("wlan0"));

        app.wireless.ifaces.reverse();
        app.restore_selection(Some("wlan0".to_string()));
        assert_eq!(app.iface_state.selected(), Some(0));
    }

    #[test]
    fn selection_is_clamped() {
        let mut state = TableState::default();
        select_prev_in_state(&mut state, 3);
        assert_eq!(state.selected(), Some(0));
        select_next_in_state(&mut state, 3);
        select_next_in_state(&mut state, 3);
        select_next_in_state(&mut state, 3);
        assert_eq!(state.selected(), Some(2));
        clamp_selected(&mut state, 1);
        assert_eq!(state.selected(), Some(0));
        select_next_in_state(&mut state, 0);
        assert_eq!(state.selected(), None);
    }
}
