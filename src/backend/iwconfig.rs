use crate::{
    backend::{
        exec::SystemRunner,
        scrape,
        traits::{CommandResult, CommandRunner, WirelessBackend},
    },
    domain::{
        settings::{ChannelSetting, EssidSetting, FreqUnit, OperatingMode, Threshold, TxPower},
        wireless::{WirelessIface, WirelessState},
    },
    error::IwError,
};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Program names (or paths) of the wireless-tools binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub iwconfig: String,
    pub iwgetid: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            iwconfig: "iwconfig".to_string(),
            iwgetid: "iwgetid".to_string(),
        }
    }
}

/// Getters and setters for wireless parameters, backed by `iwconfig` and
/// `iwgetid`.
///
/// Every call runs the tool afresh; nothing is cached between calls.
pub struct Iwconfig {
    runner: Box<dyn CommandRunner>,
    tools: ToolPaths,
}

impl Iwconfig {
    pub fn new(tools: ToolPaths, timeout: Duration) -> Self {
        Self::with_runner(Box::new(SystemRunner::new(timeout)), tools)
    }

    pub fn with_runner(runner: Box<dyn CommandRunner>, tools: ToolPaths) -> Self {
        Self { runner, tools }
    }

    /// Wireless interfaces known to `iwconfig`, in the order it prints them.
    pub fn list_interfaces(&self) -> Result<Vec<String>, IwError> {
        let out = self.runner.run(&self.tools.iwconfig, &[])?;
        Ok(scrape::list_interfaces(&out.output))
    }

    pub fn interface_count(&self) -> Result<usize, IwError> {
        let out = self.runner.run(&self.tools.iwconfig, &[])?;
        Ok(scrape::count_interfaces(&out.output))
    }

    pub fn essid(&self, iface: &str) -> Result<String, IwError> {
        scrape::essid(&self.status_text(iface)?)
    }

    pub fn set_essid(&self, iface: &str, essid: &EssidSetting) -> Result<CommandResult, IwError> {
        let args = essid.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.apply(iface, "essid", &args)
    }

    pub fn tx_power(&self, iface: &str) -> Result<f64, IwError> {
        scrape::tx_power(&self.status_text(iface)?)
    }

    pub fn set_tx_power(&self, iface: &str, power: TxPower) -> Result<CommandResult, IwError> {
        self.apply(iface, "txpower", &[power.to_string().as_str()])
    }

    pub fn signal_level(&self, iface: &str) -> Result<f64, IwError> {
        scrape::signal_level(&self.status_text(iface)?)
    }

    pub fn set_sensitivity(&self, iface: &str, sensitivity: i32) -> Result<CommandResult, IwError> {
        self.apply(iface, "sens", &[sensitivity.to_string().as_str()])
    }

    /// Current frequency in Hz, 0 when the card reports none.
    pub fn frequency(&self, iface: &str) -> Result<f64, IwError> {
        scrape::frequency(&self.iwgetid(iface, "--freq")?)
    }

    pub fn set_frequency(&self, iface: &str, value: f64, unit: FreqUnit) -> Result<CommandResult, IwError> {
        self.apply(iface, "freq", &[unit.scaled(value).as_str()])
    }

    pub fn channel(&self, iface: &str) -> Result<i32, IwError> {
        scrape::channel(&self.iwgetid(iface, "--channel")?)
    }

    pub fn set_channel(&self, iface: &str, channel: ChannelSetting) -> Result<CommandResult, IwError> {
        self.apply(iface, "channel", &[channel.to_string().as_str()])
    }

    /// `IW_MODE_*` code; see [`OperatingMode::from_code`].
    pub fn mode(&self, iface: &str) -> Result<i32, IwError> {
        scrape::mode(&self.iwgetid(iface, "--mode")?)
    }

    pub fn set_mode(&self, iface: &str, mode: OperatingMode) -> Result<CommandResult, IwError> {
        self.apply(iface, "mode", &[mode.keyword()])
    }

    pub fn access_point(&self, iface: &str) -> Result<String, IwError> {
        Ok(scrape::access_point(&self.iwgetid(iface, "--ap")?))
    }

    /// `ap` accepts a MAC address or one of `any`, `off`, `auto`.
    pub fn set_access_point(&self, iface: &str, ap: &str) -> Result<CommandResult, IwError> {
        self.apply(iface, "ap", &[ap])
    }

    /// Bit rate in Mb/s.
    pub fn bit_rate(&self, iface: &str) -> Result<f64, IwError> {
        scrape::bit_rate(&self.status_text(iface)?)
    }

    pub fn set_bit_rate(&self, iface: &str, value: f64, unit: FreqUnit) -> Result<CommandResult, IwError> {
        self.apply(iface, "rate", &[unit.scaled(value).as_str()])
    }

    pub fn rts_threshold(&self, iface: &str) -> Result<f64, IwError> {
        scrape::rts_threshold(&self.status_text(iface)?)
    }

    pub fn set_rts_threshold(&self, iface: &str, rts: Threshold) -> Result<CommandResult, IwError> {
        self.apply(iface, "rts", &[rts.to_string().as_str()])
    }

    pub fn frag_threshold(&self, iface: &str) -> Result<f64, IwError> {
        scrape::frag_threshold(&self.status_text(iface)?)
    }

    pub fn set_frag_threshold(&self, iface: &str, frag: Threshold) -> Result<CommandResult, IwError> {
        self.apply(iface, "frag", &[frag.to_string().as_str()])
    }

    pub fn retry_limit(&self, iface: &str) -> Result<i32, IwError> {
        scrape::retry_limit(&self.status_text(iface)?)
    }

    pub fn set_retry_limit(&self, iface: &str, limit: i32) -> Result<CommandResult, IwError> {
        self.apply(iface, "retry", &[limit.to_string().as_str()])
    }

    /// Snapshot of one interface: a single `iwconfig <iface>` capture for the
    /// scraped fields plus the `iwgetid` queries.
    pub fn status(&self, iface: &str) -> Result<WirelessIface, IwError> {
        let text = self.status_text(iface)?;
        Ok(WirelessIface {
            name: iface.to_string(),
            essid: scrape::essid(&text)?,
            mode: self.mode(iface)?,
            frequency_hz: self.frequency(iface)?,
            channel: self.channel(iface)?,
            access_point: self.access_point(iface)?,
            bit_rate_mbps: scrape::bit_rate(&text)?,
            tx_power_dbm: scrape::tx_power(&text)?,
            signal_level_dbm: scrape::signal_level(&text)?,
            rts_threshold: scrape::rts_threshold(&text)?,
            frag_threshold: scrape::frag_threshold(&text)?,
            retry_limit: scrape::retry_limit(&text)?,
            error: None,
        })
    }

    fn status_text(&self, iface: &str) -> Result<String, IwError> {
        check_iface(iface)?;
        Ok(self.runner.run(&self.tools.iwconfig, &[iface])?.output)
    }

    /// `iwgetid` exits non-zero without output when it has nothing to report.
    fn iwgetid(&self, iface: &str, flag: &str) -> Result<String, IwError> {
        check_iface(iface)?;
        let out = self.runner.run(&self.tools.iwgetid, &[iface, "--raw", flag])?;
        if out.success() {
            return Ok(out.output);
        }
        debug!("{iface}: no {flag} reported ({:?})", out.output.trim());
        Ok(String::new())
    }

    fn apply(&self, iface: &str, keyword: &str, values: &[&str]) -> Result<CommandResult, IwError> {
        check_iface(iface)?;
        let mut args = vec![iface, keyword];
        args.extend_from_slice(values);

        let out = self.runner.run(&self.tools.iwconfig, &args)?;
        if out.success() {
            info!("applied `{}`", out.command_line());
        } else {
            warn!("`{}` failed: {}", out.command_line(), out.output.trim());
        }
        Ok(out)
    }
}

impl WirelessBackend for Iwconfig {
    fn query_state(&self) -> Result<WirelessState> {
        let names = self
            .list_interfaces()
            .context("listing wireless interfaces failed")?;

        let ifaces = names
            .into_iter()
            .map(|name| match self.status(&name) {
                Ok(iface) => iface,
                Err(e) => {
                    warn!("{name}: {e}");
                    WirelessIface::unavailable(name, e.to_string())
                }
            })
            .collect();

        Ok(WirelessState { ifaces })
    }
}

fn check_iface(iface: &str) -> Result<(), IwError> {
    if iface.trim().is_empty() {
        return Err(IwError::InvalidInterface(iface.to_string()));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::wireless::{ESSID_ANY, NO_ACCESS_POINT, NOISE_FLOOR_DBM};
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    /// Replies to command lines from a table and records every call.
    #[derive(Default)]
    pub(crate) struct ScriptedRunner {
        replies: HashMap<String, (i32, String)>,
        pub(crate) calls: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedRunner {
        pub(crate) fn reply(mut self, command_line: &str, status: i32, output: &str) -> Self {
            self.replies
                .insert(command_line.to_string(), (status, output.to_string()));
            self
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, IwError> {
            let line = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            self.calls.lock().unwrap().push(line.clone());
            let (status, output) = self.replies.get(&line).cloned().unwrap_or((0, String::new()));
            Ok(CommandResult {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                status: Some(status),
                output,
            })
        }
    }

    struct MissingTool;

    impl CommandRunner for MissingTool {
        fn run(&self, program: &str, _args: &[&str]) -> Result<CommandResult, IwError> {
            Err(IwError::Spawn {
                program: program.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    pub(crate) const STATUS: &str = concat!(
        "wlan0     IEEE 802.11  ESSID:\"MyNet\"  \n",
        "          Mode:Managed  Frequency:2.437 GHz  Access Point: 00:11:22:33:44:55   \n",
        "          Bit Rate=144.4 Mb/s   Tx-Power=22 dBm   \n",
        "          Retry short limit:7   RTS thr=2347 B   Fragment thr:off\n",
        "          Link Quality=51/70  Signal level=-59 dBm  \n",
        "\n",
    );

    pub(crate) fn scripted_wlan0() -> ScriptedRunner {
        ScriptedRunner::default()
            .reply("iwconfig", 0, &format!("lo        no wireless extensions.\n\n{STATUS}"))
            .reply("iwconfig wlan0", 0, STATUS)
            .reply("iwgetid wlan0 --raw --freq", 0, "2.437e+09\n")
            .reply("iwgetid wlan0 --raw --channel", 0, "6\n")
            .reply("iwgetid wlan0 --raw --mode", 0, "2\n")
            .reply("iwgetid wlan0 --raw --ap", 0, "00:11:22:33:44:55\n")
    }

    fn backend(runner: ScriptedRunner) -> (Iwconfig, Arc<Mutex<Vec<String>>>) {
        let calls = runner.calls.clone();
        (Iwconfig::with_runner(Box::new(runner), ToolPaths::default()), calls)
    }

    #[test]
    fn getters_scrape_the_interface_status() {
        let (iw, _) = backend(scripted_wlan0());
        assert_eq!(iw.list_interfaces().unwrap(), vec!["wlan0"]);
        assert_eq!(iw.interface_count().unwrap(), 1);
        assert_eq!(iw.essid("wlan0").unwrap(), "MyNet");
        assert_eq!(iw.tx_power("wlan0").unwrap(), 22.0);
        assert_eq!(iw.signal_level("wlan0").unwrap(), -59.0);
        assert_eq!(iw.bit_rate("wlan0").unwrap(), 144.4);
        assert_eq!(iw.rts_threshold("wlan0").unwrap(), 2347.0);
        assert_eq!(iw.frag_threshold("wlan0").unwrap(), 0.0);
        assert_eq!(iw.retry_limit("wlan0").unwrap(), 7);
        assert_eq!(iw.frequency("wlan0").unwrap(), 2.437e9);
        assert_eq!(iw.channel("wlan0").unwrap(), 6);
        assert_eq!(iw.mode("wlan0").unwrap(), 2);
        assert_eq!(iw.access_point("wlan0").unwrap(), "00:11:22:33:44:55");
    }

    #[test]
    fn iwgetid_failure_means_nothing_to_report() {
        let runner = ScriptedRunner::default()
            .reply("iwgetid wlan1 --raw --freq", 255, "")
            .reply("iwgetid wlan1 --raw --ap", 255, "wlan1: no such device\n");
        let (iw, _) = backend(runner);
        assert_eq!(iw.frequency("wlan1").unwrap(), 0.0);
        assert_eq!(iw.access_point("wlan1").unwrap(), NO_ACCESS_POINT);
    }

    #[test]
    fn status_uses_one_iwconfig_capture() {
        let (iw, calls) = backend(scripted_wlan0());
        let iface = iw.status("wlan0").unwrap();
        assert_eq!(iface.essid, "MyNet");
        assert_eq!(iface.channel, 6);
        assert_eq!(iface.operating_mode(), Some(OperatingMode::Managed));
        assert!(iface.is_associated());
        let iwconfig_calls = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("iwconfig"))
            .count();
        assert_eq!(iwconfig_calls, 1);
    }

    #[test]
    fn defaults_for_a_quiet_interface() {
        let (iw, _) = backend(ScriptedRunner::default());
        let iface = iw.status("wlan7").unwrap();
        assert_eq!(iface, WirelessIface::named("wlan7"));
        assert_eq!(iface.essid, ESSID_ANY);
        assert_eq!(iface.tx_power_dbm, NOISE_FLOOR_DBM);
        assert!(iface.radio_off());
    }

    #[test]
    fn setters_build_argument_vectors() {
        let (iw, calls) = backend(ScriptedRunner::default());
        iw.set_essid("wlan0", &EssidSetting::Name("Cafe Wifi".into())).unwrap();
        iw.set_essid("wlan0", &EssidSetting::Any).unwrap();
        iw.set_tx_power("wlan0", TxPower::MilliWatt(30)).unwrap();
        iw.set_tx_power("wlan0", TxPower::Off).unwrap();
        iw.set_sensitivity("wlan0", -80).unwrap();
        iw.set_frequency("wlan0", 2.422, FreqUnit::GHz).unwrap();
        iw.set_channel("wlan0", ChannelSetting::from(0)).unwrap();
        iw.set_mode("wlan0", OperatingMode::AdHoc).unwrap();
        iw.set_access_point("wlan0", "00:60:1D:01:23:45").unwrap();
        iw.set_bit_rate("wlan0", 11.0, FreqUnit::MHz).unwrap();
        iw.set_rts_threshold("wlan0", Threshold::Bytes(250)).unwrap();
        iw.set_frag_threshold("wlan0", Threshold::Fixed).unwrap();
        iw.set_retry_limit("wlan0", 16).unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "iwconfig wlan0 essid Cafe Wifi",
                "iwconfig wlan0 essid any",
                "iwconfig wlan0 txpower 30mW",
                "iwconfig wlan0 txpower off",
                "iwconfig wlan0 sens -80",
                "iwconfig wlan0 freq 2.422G",
                "iwconfig wlan0 channel auto",
                "iwconfig wlan0 mode Ad-Hoc",
                "iwconfig wlan0 ap 00:60:1D:01:23:45",
                "iwconfig wlan0 rate 11M",
                "iwconfig wlan0 rts 250",
                "iwconfig wlan0 frag fixed",
                "iwconfig wlan0 retry 16",
            ]
        );
    }

    #[test]
    fn shell_metacharacters_stay_in_one_argument() {
        struct ArgCount(Arc<Mutex<Vec<usize>>>);
        impl CommandRunner for ArgCount {
            fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, IwError> {
                self.0.lock().unwrap().push(args.len());
                Ok(CommandResult {
                    program: program.to_string(),
                    args: args.iter().map(|a| a.to_string()).collect(),
                    status: Some(0),
                    output: String::new(),
                })
            }
        }

        let counts = Arc::new(Mutex::new(Vec::new()));
        let iw = Iwconfig::with_runner(Box::new(ArgCount(counts.clone())), ToolPaths::default());
        iw.set_essid("wlan0", &EssidSetting::Name("x; rm -rf / #".into()))
            .unwrap();
        assert_eq!(*counts.lock().unwrap(), vec![3]);
    }

    #[test]
    fn failed_setter_still_returns_the_reply() {
        let runner = ScriptedRunner::default().reply(
            "iwconfig wlan0 mode Monitor",
            250,
            "Error for wireless request \"Set Mode\" (8B06) :\n    SET failed on device wlan0 ; Operation not permitted.\n",
        );
        let (iw, _) = backend(runner);
        let out = iw.set_mode("wlan0", OperatingMode::Monitor).unwrap();
        assert!(!out.success());
        assert!(out.output.contains("Operation not permitted"));
    }

    #[test]
    fn empty_interface_name_is_rejected() {
        let (iw, calls) = backend(ScriptedRunner::default());
        assert!(matches!(iw.tx_power(""), Err(IwError::InvalidInterface(_))));
        assert!(matches!(
            iw.set_retry_limit(" ", 3),
            Err(IwError::InvalidInterface(_))
        ));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_tool_is_reported() {
        let iw = Iwconfig::with_runner(Box::new(MissingTool), ToolPaths::default());
        assert!(matches!(iw.list_interfaces(), Err(IwError::Spawn { .. })));
        assert!(iw.query_state().is_err());
    }

    #[test]
    fn query_state_keeps_broken_interfaces() {
        let broken = "wlan1     IEEE 802.11  ESSID:\"Unterminated\n\n";
        let runner = scripted_wlan0()
            .reply("iwconfig", 0, &format!("{STATUS}{broken}"))
            .reply("iwconfig wlan1", 0, broken);
        let (iw, _) = backend(runner);
        let state = iw.query_state().unwrap();
        assert_eq!(state.ifaces.len(), 2);
        assert!(state.ifaces[0].error.is_none());
        assert!(state.ifaces[1].error.is_some());
        assert_eq!(state.ifaces[1].name, "wlan1");
    }
}
