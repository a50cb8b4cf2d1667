//! Typed model of Kasa device replies.
//! Mirrors the firmware's nested reply schema, keyed by functional area.
//! Every section is optional because devices only echo the areas a command
//! touched; absent sections deserialize to their defaults.

use crate::error::Result;
use serde::Deserialize;

/// Per-command status carried by every reply section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Status {
    pub err_code: i32,
    pub err_msg: String,
}

impl Status {
    pub fn ok(&self) -> bool {
        self.err_code == 0
    }
}

/// Top-level reply envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Response {
    pub system: SystemSection,
    #[serde(rename = "cnCloud")]
    pub cloud: CloudSection,
    pub time: TimeSection,
    pub schedule: ScheduleSection,
    pub netif: NetifSection,
    pub emeter: EmeterSection,
}

impl Response {
    /// Parse a decoded plaintext reply body.
    ///
    /// Transport-level failures never reach this point; any error here means
    /// the device sent something that is not a well-formed reply.
    pub fn parse(plaintext: &str) -> Result<Response> {
        serde_json::from_str(plaintext).map_err(Into::into)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemSection {
    pub get_sysinfo: Option<SysInfo>,
    pub set_dev_alias: Status,
    pub set_relay_state: Status,
    pub set_led_off: Status,
    pub reboot: Status,
    pub reset: Status,
}

/// Device state as reported by `get_sysinfo`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SysInfo {
    /// Software version
    pub sw_ver: String,
    /// Hardware version
    pub hw_ver: String,
    #[serde(rename = "hwId")]
    pub hardware_id: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub model: String,
    #[serde(rename = "mac")]
    pub mac_address: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(rename = "fwId")]
    pub firmware_id: String,
    #[serde(rename = "oemId")]
    pub oem_id: String,
    /// User-assigned description, e.g. "Basement light"
    pub alias: String,
    pub icon_hash: String,
    /// 0 = off, 1 = on
    pub relay_state: i32,
    /// "schedule" when schedule mode is active
    pub active_mode: String,
    /// Feature string, e.g. "TIM:ENE" (timer, energy monitor)
    pub feature: String,
    pub updating: i32,
    /// Signal strength in dBm, e.g. -35
    pub rssi: i32,
    /// 0 = status LED on (default), 1 = LED off
    pub led_off: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub err_code: i32,
}

impl SysInfo {
    pub fn is_on(&self) -> bool {
        self.relay_state == 1
    }

    pub fn is_led_on(&self) -> bool {
        self.led_off == 0
    }

    /// Whether the feature string advertises energy metering.
    pub fn has_energy_meter(&self) -> bool {
        self.feature.split(':').any(|f| f == "ENE")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CloudSection {
    pub get_info: Option<CloudInfo>,
    pub set_server_url: Status,
    pub bind: Status,
    pub unbind: Status,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CloudInfo {
    pub username: String,
    pub server: String,
    pub binded: i32,
    pub err_code: i32,
}

impl CloudInfo {
    pub fn is_bound(&self) -> bool {
        self.binded == 1
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimeSection {
    pub get_time: Option<DeviceTime>,
    pub get_timezone: Option<DeviceTimezone>,
    pub set_timezone: Status,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceTime {
    pub year: u32,
    pub month: u32,
    #[serde(rename = "mday")]
    pub day: u32,
    pub hour: u32,
    pub min: u32,
    pub sec: u32,
    pub err_code: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceTimezone {
    pub index: i32,
    pub err_code: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleSection {
    pub get_next_action: Option<NextAction>,
    pub get_rules: Option<RuleList>,
    pub add_rule: Option<AddRuleResult>,
    pub edit_rule: Status,
    pub delete_rule: Status,
    pub delete_all_rules: Status,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NextAction {
    pub id: String,
    #[serde(rename = "type")]
    pub action_type: i32,
    /// Seconds until the scheduled action fires
    pub schd_time: i64,
    pub action: i32,
    pub err_code: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuleList {
    pub rule_list: Vec<Rule>,
    pub enable: i32,
    pub err_code: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub enable: i32,
    #[serde(rename = "smin")]
    pub minutes: u32,
    pub repeat: i32,
    #[serde(rename = "sact")]
    pub action: i32,
    /// Sunday-first 0/1 repeat flags
    #[serde(rename = "wday")]
    pub weekdays: Vec<u8>,
    /// One-shot rules (repeat = 0) carry an explicit date
    pub year: u32,
    pub month: u32,
    pub day: u32,
    /// 0 = fixed time, 1 = sunrise, 2 = sunset
    pub stime_opt: i32,
}

impl Rule {
    pub fn is_enabled(&self) -> bool {
        self.enable == 1
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddRuleResult {
    pub id: String,
    pub err_code: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetifSection {
    pub get_scaninfo: Option<ScanInfo>,
    pub set_stainfo: Status,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanInfo {
    pub ap_list: Vec<AccessPoint>,
    pub err_code: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccessPoint {
    pub ssid: String,
    pub key_type: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmeterSection {
    pub get_realtime: Option<Realtime>,
    pub get_daystat: Option<DayStats>,
    pub get_monthstat: Option<MonthStats>,
    pub erase_emeter_stat: Status,
}

/// Instantaneous meter reading (HS110).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Realtime {
    /// Amperes
    pub current: f64,
    /// Volts
    pub voltage: f64,
    /// Watts
    pub power: f64,
    /// Cumulative kWh
    pub total: f64,
    pub err_code: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DayStats {
    pub day_list: Vec<DailyUsage>,
    pub err_code: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailyUsage {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub energy: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonthStats {
    pub month_list: Vec<MonthlyUsage>,
    pub err_code: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonthlyUsage {
    pub year: u32,
    pub month: u32,
    pub energy: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KasaError;

    const SYSINFO_REPLY: &str = r#"{
        "system": {"get_sysinfo": {
            "sw_ver": "1.5.8 Build 180815 Rel.135935",
            "hw_ver": "2.1",
            "type": "IOT.SMARTPLUGSWITCH",
            "model": "HS110(EU)",
            "mac": "50:C7:BF:00:00:01",
            "deviceId": "8006E8A5D2B9C6F1A6E24C2A0F3D6A1C",
            "alias": "Basement light",
            "relay_state": 1,
            "active_mode": "schedule",
            "feature": "TIM:ENE",
            "rssi": -42,
            "led_off": 0,
            "err_code": 0
        }}
    }"#;

    #[test]
    fn parses_sysinfo() {
        let resp = Response::parse(SYSINFO_REPLY).unwrap();
        let info = resp.system.get_sysinfo.unwrap();
        assert_eq!(info.alias, "Basement light");
        assert_eq!(info.model, "HS110(EU)");
        assert!(info.is_on());
        assert!(info.is_led_on());
        assert!(info.has_energy_meter());
        assert_eq!(info.rssi, -42);
    }

    #[test]
    fn parses_relay_status() {
        let resp =
            Response::parse(r#"{"system":{"set_relay_state":{"err_code":0}}}"#).unwrap();
        assert!(resp.system.set_relay_state.ok());
        assert!(resp.system.get_sysinfo.is_none());
    }

    #[test]
    fn parses_error_status() {
        let resp = Response::parse(
            r#"{"emeter":{"err_code":-1,"err_msg":"module not support"}}"#,
        )
        .unwrap();
        assert!(resp.emeter.get_realtime.is_none());
    }

    #[test]
    fn parses_realtime_meter() {
        let resp = Response::parse(
            r#"{"emeter":{"get_realtime":{"current":0.5,"voltage":230.1,"power":112.3,"total":4.2,"err_code":0}}}"#,
        )
        .unwrap();
        let rt = resp.emeter.get_realtime.unwrap();
        assert_eq!(rt.voltage, 230.1);
        assert_eq!(rt.err_code, 0);
    }

    #[test]
    fn parses_schedule_rules() {
        let resp = Response::parse(
            r#"{"schedule":{"get_rules":{"rule_list":[
                {"id":"8AA75A50A","name":"night","enable":1,"smin":1200,
                 "repeat":1,"sact":0,"wday":[1,0,0,0,0,0,1],"stime_opt":0}
            ],"enable":1,"err_code":0}}}"#,
        )
        .unwrap();
        let rules = resp.schedule.get_rules.unwrap();
        assert_eq!(rules.rule_list.len(), 1);
        let rule = &rules.rule_list[0];
        assert!(rule.is_enabled());
        assert_eq!(rule.minutes, 1200);
        assert_eq!(rule.weekdays, vec![1, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn malformed_reply_is_distinct_error() {
        let err = Response::parse("not json at all").unwrap_err();
        assert!(matches!(err, KasaError::MalformedReply(_)));
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let resp = Response::parse(
            r#"{"system":{"get_sysinfo":{"relay_state":0,"fancy_new_field":true}}}"#,
        )
        .unwrap();
        assert!(!resp.system.get_sysinfo.unwrap().is_on());
    }
}
