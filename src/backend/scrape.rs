//! Field extraction from `iwconfig`/`iwgetid` text.
//!
//! These functions only look at text. The label strings and separators are
//! whatever the wireless-tools release on the host prints, so a reformatted
//! tool output shows up here first.

use crate::{
    domain::wireless::{ESSID_ANY, NO_ACCESS_POINT, NOISE_FLOOR_DBM},
    error::IwError,
};

/// Printed by `iwconfig` for interfaces without wireless extensions.
pub const NO_WIRELESS_MARKER: &str = "no wireless extensions.";

const TX_POWER: &str = "Tx-Power=";
const SIGNAL_LEVEL: &str = "Signal level=";
const RTS_THR: &str = "RTS thr";
const FRAGMENT_THR: &str = "Fragment thr";
const BIT_RATE: &str = "Bit Rate=";
const RETRY_SHORT: &str = "Retry short limit:";
const RETRY_SHORT_LONG: &str = "Retry short  long limit:";
const ESSID: &str = "ESSID:";
const OFF: &str = "off";

/// Interface names in `iwconfig` output, in order of appearance.
///
/// A line opens an interface block when its first character is not a space;
/// the name runs up to the first space. Blank lines and lines carrying
/// [`NO_WIRELESS_MARKER`] are skipped.
fn interface_names(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .filter(|line| !line.is_empty())
        .filter(|line| !line.contains(NO_WIRELESS_MARKER))
        .filter(|line| !line.starts_with(' '))
        .map(|line| line.split_once(' ').map_or(line, |(name, _)| name))
}

pub fn list_interfaces(text: &str) -> Vec<String> {
    interface_names(text).map(str::to_string).collect()
}

pub fn count_interfaces(text: &str) -> usize {
    interface_names(text).count()
}

/// Text following `label`, after skipping `skip` separator characters.
fn value_after<'a>(text: &'a str, label: &str, skip: usize) -> Option<&'a str> {
    let start = text.find(label)? + label.len();
    let rest = &text[start..];
    Some(rest.char_indices().nth(skip).map_or("", |(i, _)| &rest[i..]))
}

fn current_line(value: &str) -> &str {
    value.lines().next().unwrap_or("")
}

fn first_token(value: &str) -> &str {
    value.split_whitespace().next().unwrap_or("")
}

/// Longest prefix that looks like a decimal number (`-45`, `20`, `2.5`).
fn leading_number(value: &str) -> &str {
    let value = value.trim_start();
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(value.len(), |(i, _)| i);
    &value[..end]
}

fn power_level(text: &str, label: &str, field: &'static str) -> Result<f64, IwError> {
    let Some(value) = value_after(text, label, 0) else {
        return Ok(NOISE_FLOOR_DBM);
    };
    if value.starts_with(OFF) {
        return Ok(NOISE_FLOOR_DBM);
    }
    leading_number(value)
        .parse()
        .map_err(|_| IwError::unparseable(field, first_token(value)))
}

/// `RTS thr:off` / `RTS thr=2347 B` style fields. The label is followed by a
/// one character separator (`:` or `=`), the value ends at `B`.
fn threshold(text: &str, label: &str, field: &'static str) -> Result<f64, IwError> {
    let Some(value) = value_after(text, label, 1) else {
        return Ok(0.0);
    };
    if value.starts_with(OFF) {
        return Ok(0.0);
    }
    let line = current_line(value);
    let Some(end) = line.find('B') else {
        return Err(IwError::unparseable(field, line.trim()));
    };
    let number = line[..end].trim();
    number
        .parse()
        .map_err(|_| IwError::unparseable(field, number))
}

/// TX power in dBm; [`NOISE_FLOOR_DBM`] when absent or `off`.
pub fn tx_power(text: &str) -> Result<f64, IwError> {
    power_level(text, TX_POWER, "TX power")
}

/// Signal level in dBm; [`NOISE_FLOOR_DBM`] when absent or `off`.
pub fn signal_level(text: &str) -> Result<f64, IwError> {
    power_level(text, SIGNAL_LEVEL, "signal level")
}

pub fn rts_threshold(text: &str) -> Result<f64, IwError> {
    threshold(text, RTS_THR, "RTS threshold")
}

pub fn frag_threshold(text: &str) -> Result<f64, IwError> {
    threshold(text, FRAGMENT_THR, "fragmentation threshold")
}

/// Bit rate in Mb/s, 0 when absent.
///
/// iwconfig switches to `Gb/s` or `kb/s` for rates outside the Mb/s range;
/// those are scaled back to Mb/s.
pub fn bit_rate(text: &str) -> Result<f64, IwError> {
    let Some(value) = value_after(text, BIT_RATE, 0) else {
        return Ok(0.0);
    };
    let line = current_line(value);
    let (end, scale) = [("Mb/s", 1.0), ("Gb/s", 1000.0), ("kb/s", 0.001)]
        .into_iter()
        .find_map(|(unit, scale)| line.find(unit).map(|end| (end, scale)))
        .ok_or_else(|| IwError::unparseable("bit rate", line.trim()))?;
    let number = line[..end].trim();
    number
        .parse::<f64>()
        .map(|rate| rate * scale)
        .map_err(|_| IwError::unparseable("bit rate", number))
}

/// Short retry limit, falling back to the combined short/long label.
pub fn retry_limit(text: &str) -> Result<i32, IwError> {
    let value = value_after(text, RETRY_SHORT, 0).or_else(|| value_after(text, RETRY_SHORT_LONG, 0));
    let Some(value) = value else {
        return Ok(0);
    };
    leading_number(value)
        .parse()
        .map_err(|_| IwError::unparseable("retry limit", first_token(value)))
}

/// The quoted ESSID, or the literal `off/any` window when unquoted.
pub fn essid(text: &str) -> Result<String, IwError> {
    let Some(value) = value_after(text, ESSID, 0) else {
        return Ok(ESSID_ANY.to_string());
    };
    if let Some(quoted) = value.strip_prefix('"') {
        return match quoted.find('"') {
            Some(end) => Ok(quoted[..end].to_string()),
            None => Err(IwError::unparseable("ESSID", current_line(value))),
        };
    }
    Ok(value.chars().take(ESSID_ANY.len()).collect())
}

fn raw_number<T: std::str::FromStr + Default>(reply: &str, field: &'static str) -> Result<T, IwError> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Ok(T::default());
    }
    reply
        .parse()
        .map_err(|_| IwError::unparseable(field, reply))
}

/// `iwgetid --raw --freq` reply, in Hz.
pub fn frequency(reply: &str) -> Result<f64, IwError> {
    raw_number(reply, "frequency")
}

/// `iwgetid --raw --channel` reply.
pub fn channel(reply: &str) -> Result<i32, IwError> {
    raw_number(reply, "channel")
}

/// `iwgetid --raw --mode` reply.
pub fn mode(reply: &str) -> Result<i32, IwError> {
    raw_number(reply, "mode")
}

/// `iwgetid --raw --ap` reply.
pub fn access_point(reply: &str) -> String {
    let reply = reply.trim();
    if reply.is_empty() {
        NO_ACCESS_POINT.to_string()
    } else {
        reply.to_string()
    }
}
