use crate::backend::iwconfig::ToolPaths;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinds {
    pub quit: char,
    pub refresh: char,
    pub up: char,
    pub down: char,
    pub tx_power: char,
    pub channel_auto: char,
    pub essid_any: char,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            quit: 'q',
            refresh: 'r',
            up: 'k',
            down: 'j',
            tx_power: 'p',
            channel_auto: 'c',
            essid_any: 'a',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tick_ms: u64,
    pub command_timeout_ms: u64,
    pub tools: ToolPaths,
    pub esc_quit: bool,
    pub keys: Keybinds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            command_timeout_ms: 2000,
            tools: ToolPaths::default(),
            esc_quit: true,
            keys: Keybinds::default(),
        }
    }
}

impl Config {
    /// Loads `~/.config/iwtui/config.toml`, creating it from the bundled
    /// template on first run. Never fails: problems fall back to defaults.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };

        ensure_default_config_exists(&path);
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("unable to read {}: {e}", path.display());
                return Self::default();
            }
        };

        match Self::from_toml(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring malformed {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        let file = toml::from_str::<ConfigFile>(raw)?;
        let mut out = Self::default();

        if let Some(general) = file.general {
            apply_positive(&mut out.tick_ms, general.tick_ms);
            apply_positive(&mut out.command_timeout_ms, general.command_timeout_ms);
            apply_program(&mut out.tools.iwconfig, general.iwconfig);
            apply_program(&mut out.tools.iwgetid, general.iwgetid);
            if let Some(esc_quit) = general.esc_quit {
                out.esc_quit = esc_quit;
            }
        }

        if let Some(keys) = file.keys {
            apply_key(&mut out.keys.quit, keys.quit);
            apply_key(&mut out.keys.refresh, keys.refresh);
            apply_key(&mut out.keys.up, keys.up);
            apply_key(&mut out.keys.down, keys.down);
            apply_key(&mut out.keys.tx_power, keys.tx_power);
            apply_key(&mut out.keys.channel_auto, keys.channel_auto);
            apply_key(&mut out.keys.essid_any, keys.essid_any);
        }

        Ok(out)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    general: Option<GeneralPartial>,
    keys: Option<KeybindsPartial>,
}

#[derive(Debug, Default, Deserialize)]
struct GeneralPartial {
    tick_ms: Option<u64>,
    command_timeout_ms: Option<u64>,
    iwconfig: Option<String>,
    iwgetid: Option<String>,
    esc_quit: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct KeybindsPartial {
    quit: Option<String>,
    refresh: Option<String>,
    up: Option<String>,
    down: Option<String>,
    tx_power: Option<String>,
    channel_auto: Option<String>,
    essid_any: Option<String>,
}

fn config_path() -> Option<PathBuf> {
    let home = env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config/iwtui/config.toml"))
}

fn ensure_default_config_exists(path: &Path) {
    if path.exists() {
        return;
    }
    let Some(parent) = path.parent() else {
        return;
    };
    if fs::create_dir_all(parent).is_err() {
        return;
    }

    match fs::write(path, default_config_template()) {
        Ok(()) => info!("wrote default configuration to {}", path.display()),
        Err(e) => warn!("unable to write {}: {e}", path.display()),
    }
}

fn default_config_template() -> &'static str {
    include_str!("../config/config.toml.example")
}

fn apply_positive(target: &mut u64, value: Option<u64>) {
    if let Some(v) = value
        && v > 0
    {
        *target = v;
    }
}

fn apply_program(target: &mut String, value: Option<String>) {
    let Some(raw) = value else {
        return;
    };
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        *target = trimmed.to_string();
    }
}

fn apply_key(target: &mut char, value: Option<String>) {
    let Some(raw) = value else {
        return;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let mut chars = trimmed.chars();
    let Some(c) = chars.next() else {
        return;
    };
    if chars.next().is_some() {
        return;
    }
    *target = c.to_ascii_lowercase();
}
