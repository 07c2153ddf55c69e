use crate::domain::settings::OperatingMode;

/// Reported for TX power and signal level when the value is absent or `off`.
pub const NOISE_FLOOR_DBM: f64 = -174.0;
/// ESSID reported when the card is not bound to a network.
pub const ESSID_ANY: &str = "off/any";
pub const NO_ACCESS_POINT: &str = "No Access Point";

/// Everything iwconfig/iwgetid report for one interface.
#[derive(Debug, Clone, PartialEq)]
pub struct WirelessIface {
    pub name: String,
    pub essid: String,
    /// `IW_MODE_*` code as printed by `iwgetid --raw --mode`.
    pub mode: i32,
    pub frequency_hz: f64,
    pub channel: i32,
    pub access_point: String,
    pub bit_rate_mbps: f64,
    pub tx_power_dbm: f64,
    pub signal_level_dbm: f64,
    pub rts_threshold: f64,
    pub frag_threshold: f64,
    pub retry_limit: i32,
    pub error: Option<String>,
}

impl WirelessIface {
    /// An interface with every field at its documented default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            essid: ESSID_ANY.to_string(),
            mode: 0,
            frequency_hz: 0.0,
            channel: 0,
            access_point: NO_ACCESS_POINT.to_string(),
            bit_rate_mbps: 0.0,
            tx_power_dbm: NOISE_FLOOR_DBM,
            signal_level_dbm: NOISE_FLOOR_DBM,
            rts_threshold: 0.0,
            frag_threshold: 0.0,
            retry_limit: 0,
            error: None,
        }
    }

    pub fn unavailable(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::named(name)
        }
    }

    pub fn operating_mode(&self) -> Option<OperatingMode> {
        OperatingMode::from_code(self.mode)
    }

    pub fn radio_off(&self) -> bool {
        self.tx_power_dbm <= NOISE_FLOOR_DBM
    }

    pub fn is_associated(&self) -> bool {
        self.access_point != NO_ACCESS_POINT && self.essid != ESSID_ANY
    }
}

#[derive(Debug, Clone, Default)]
pub struct WirelessState {
    pub ifaces: Vec<WirelessIface>,
}

impl WirelessState {
    pub fn empty() -> Self {
        Self { ifaces: Vec::new() }
    }

    pub fn has_adapter(&self) -> bool {
        !self.ifaces.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.ifaces.iter().position(|i| i.name == name)
    }
}
