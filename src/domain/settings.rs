use std::fmt;

/// Value for `iwconfig <iface> txpower ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPower {
    Auto,
    Off,
    On,
    Dbm(i32),
    MilliWatt(i32),
}

impl fmt::Display for TxPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxPower::Auto => f.write_str("auto"),
            TxPower::Off => f.write_str("off"),
            TxPower::On => f.write_str("on"),
            TxPower::Dbm(v) => write!(f, "{v}"),
            TxPower::MilliWatt(v) => write!(f, "{v}mW"),
        }
    }
}

/// Scale suffix for frequencies and bit rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreqUnit {
    #[default]
    Raw,
    KHz,
    MHz,
    GHz,
}

impl FreqUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            FreqUnit::Raw => "",
            FreqUnit::KHz => "k",
            FreqUnit::MHz => "M",
            FreqUnit::GHz => "G",
        }
    }

    /// Renders `value` as one token, e.g. `2.412G` or `54M`.
    ///
    /// iwconfig only honours the suffix when it is glued to the number.
    pub fn scaled(self, value: f64) -> String {
        format!("{value}{}", self.suffix())
    }
}

/// Operating mode of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    AdHoc,
    Managed,
    Master,
    Repeater,
    Secondary,
    Monitor,
    Auto,
}

impl OperatingMode {
    /// Decodes the `IW_MODE_*` number printed by `iwgetid --raw --mode`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(OperatingMode::Auto),
            1 => Some(OperatingMode::AdHoc),
            2 => Some(OperatingMode::Managed),
            3 => Some(OperatingMode::Master),
            4 => Some(OperatingMode::Repeater),
            5 => Some(OperatingMode::Secondary),
            6 => Some(OperatingMode::Monitor),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            OperatingMode::AdHoc => "Ad-Hoc",
            OperatingMode::Managed => "Managed",
            OperatingMode::Master => "Master",
            OperatingMode::Repeater => "Repeater",
            OperatingMode::Secondary => "Secondary",
            OperatingMode::Monitor => "Monitor",
            OperatingMode::Auto => "auto",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// RTS and fragmentation threshold policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    Auto,
    Off,
    Fixed,
    Bytes(u32),
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Auto => f.write_str("auto"),
            Threshold::Off => f.write_str("off"),
            Threshold::Fixed => f.write_str("fixed"),
            Threshold::Bytes(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSetting {
    Auto,
    Number(u32),
}

impl From<i32> for ChannelSetting {
    /// Non-positive channel numbers select `auto`.
    fn from(value: i32) -> Self {
        match u32::try_from(value) {
            Ok(n) if n > 0 => ChannelSetting::Number(n),
            _ => ChannelSetting::Auto,
        }
    }
}

impl fmt::Display for ChannelSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSetting::Auto => f.write_str("auto"),
            ChannelSetting::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Value for `iwconfig <iface> essid ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EssidSetting {
    Any,
    On,
    Off,
    Name(String),
}

impl EssidSetting {
    /// Arguments following the `essid` keyword.
    pub fn args(&self) -> Vec<String> {
        match self {
            EssidSetting::Any => vec!["any".to_string()],
            EssidSetting::On => vec!["on".to_string()],
            EssidSetting::Off => vec!["off".to_string()],
            EssidSetting::Name(name) => {
                // iwconfig reads these words as keywords unless escaped with `--`.
                let reserved = ["any", "on", "off", "--"]
                    .iter()
                    .any(|k| name.eq_ignore_ascii_case(k));
                if reserved {
                    vec!["--".to_string(), name.clone()]
                } else {
                    vec![name.clone()]
                }
            }
        }
    }
}
