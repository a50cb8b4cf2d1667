//! Kasa command catalog.
//! Builds the plaintext JSON command bodies understood by the HS100/HS105/HS110
//! plug family. Commands are grouped by functional area (system, netif,
//! cnCloud, time, schedule, emeter), mirroring the device firmware's schema.

use serde_json::json;

/// UDP port Kasa devices listen on for both unicast and broadcast traffic.
pub const DEVICE_PORT: u16 = 9999;
/// Local UDP port on which discovery replies are collected.
pub const DISCOVERY_PORT: u16 = 8755;

/// Relay/schedule action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Off,
    On,
}

impl Action {
    pub fn value(self) -> u8 {
        match self {
            Action::Off => 0,
            Action::On => 1,
        }
    }
}

/// Start-time mode for schedule rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeOption {
    #[default]
    None,
    Sunrise,
    Sunset,
}

impl TimeOption {
    pub fn value(self) -> u8 {
        match self {
            TimeOption::None => 0,
            TimeOption::Sunrise => 1,
            TimeOption::Sunset => 2,
        }
    }
}

/// Weekday repeat mask for schedule rules, Sunday first as the firmware expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Weekdays {
    pub sunday: bool,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
}

impl Weekdays {
    /// Firmware wire form: seven 0/1 flags, Sunday through Saturday.
    pub fn mask(&self) -> [u8; 7] {
        [
            self.sunday as u8,
            self.monday as u8,
            self.tuesday as u8,
            self.wednesday as u8,
            self.thursday as u8,
            self.friday as u8,
            self.saturday as u8,
        ]
    }
}

/// Parameters for adding or editing a schedule rule.
#[derive(Debug, Clone, Default)]
pub struct RuleSpec {
    pub name: String,
    pub enable: bool,
    /// Minutes after midnight at which the rule fires.
    pub minutes: u32,
    pub action: Action,
    pub repeat: bool,
    pub weekdays: Weekdays,
    pub time_option: TimeOption,
    /// One-shot rules (repeat = false) carry an explicit date.
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

// --- System commands (all plug models) ---

pub const GET_SYSINFO: &str = r#"{"system":{"get_sysinfo":{}}}"#;
pub const TURN_ON: &str = r#"{"system":{"set_relay_state":{"state":1}}}"#;
pub const TURN_OFF: &str = r#"{"system":{"set_relay_state":{"state":0}}}"#;
pub const TURN_LED_ON: &str = r#"{"system":{"set_led_off":{"off":0}}}"#;
pub const TURN_LED_OFF: &str = r#"{"system":{"set_led_off":{"off":1}}}"#;

pub fn set_relay_state(action: Action) -> String {
    json!({"system":{"set_relay_state":{"state": action.value()}}}).to_string()
}

pub fn reboot(delay_secs: u32) -> String {
    json!({"system":{"reboot":{"delay": delay_secs}}}).to_string()
}

pub fn factory_reset(delay_secs: u32) -> String {
    json!({"system":{"reset":{"delay": delay_secs}}}).to_string()
}

pub fn set_alias(alias: &str) -> String {
    json!({"system":{"set_dev_alias":{"alias": alias}}}).to_string()
}

// --- WLAN commands ---

pub const SCAN_WIFI: &str = r#"{"netif":{"get_scaninfo":{"refresh":1}}}"#;

pub fn set_wifi(ssid: &str, password: &str, key_type: u8) -> String {
    json!({"netif":{"set_stainfo":{"ssid": ssid, "password": password, "key_type": key_type}}})
        .to_string()
}

// --- Cloud commands ---

pub const GET_CLOUD_INFO: &str = r#"{"cnCloud":{"get_info":null}}"#;
pub const CLOUD_UNBIND: &str = r#"{"cnCloud":{"unbind":null}}"#;

pub fn set_cloud_url(server: &str) -> String {
    json!({"cnCloud":{"set_server_url":{"server": server}}}).to_string()
}

pub fn cloud_bind(username: &str, password: &str) -> String {
    json!({"cnCloud":{"bind":{"username": username, "password": password}}}).to_string()
}

// --- Time commands ---

pub const GET_TIME: &str = r#"{"time":{"get_time":{}}}"#;
pub const GET_TIMEZONE: &str = r#"{"time":{"get_timezone":null}}"#;

#[allow(clippy::too_many_arguments)]
pub fn set_timezone(
    year: u32,
    month: u32,
    mday: u32,
    hour: u32,
    min: u32,
    sec: u32,
    index: i32,
) -> String {
    json!({"time":{"set_timezone":{
        "year": year, "month": month, "mday": mday,
        "hour": hour, "min": min, "sec": sec, "index": index,
    }}})
    .to_string()
}

// --- Schedule commands ---

pub const GET_NEXT_SCHEDULE_ACTION: &str = r#"{"schedule":{"get_next_action":null}}"#;
pub const GET_SCHEDULE_RULES: &str = r#"{"schedule":{"get_rules":null}}"#;
pub const DELETE_ALL_SCHEDULE_RULES: &str =
    r#"{"schedule":{"delete_all_rules":null,"erase_runtime_stat":null}}"#;

fn rule_body(rule: &RuleSpec) -> serde_json::Value {
    json!({
        "stime_opt": rule.time_option.value(),
        "wday": rule.weekdays.mask(),
        "smin": rule.minutes,
        "enable": rule.enable as u8,
        "repeat": rule.repeat as u8,
        "etime_opt": -1,
        "name": rule.name,
        "eact": -1,
        "month": rule.month,
        "sact": rule.action.value(),
        "year": rule.year,
        "longitude": 0,
        "day": rule.day,
        "force": 0,
        "latitude": 0,
        "emin": 0,
    })
}

pub fn add_schedule_rule(rule: &RuleSpec) -> String {
    json!({"schedule":{
        "add_rule": rule_body(rule),
        "set_overall_enable": {"enable": 1},
    }})
    .to_string()
}

pub fn edit_schedule_rule(id: &str, rule: &RuleSpec) -> String {
    let mut body = rule_body(rule);
    body["id"] = json!(id);
    json!({"schedule":{"edit_rule": body}}).to_string()
}

pub fn delete_schedule_rule(id: &str) -> String {
    json!({"schedule":{"delete_rule":{"id": id}}}).to_string()
}

// --- Energy metering commands (HS110 only) ---

/// Sysinfo plus realtime meter reading and calibration gains in one query.
pub const GET_METER: &str =
    r#"{"system":{"get_sysinfo":{}}, "emeter":{"get_realtime":{},"get_vgain_igain":{}}}"#;
pub const ERASE_METER_STATS: &str = r#"{"emeter":{"erase_emeter_stat":null}}"#;

pub fn get_daily_stats(month: u32, year: u32) -> String {
    json!({"emeter":{"get_daystat":{"month": month, "year": year}}}).to_string()
}

pub fn get_monthly_stats(year: u32) -> String {
    json!({"emeter":{"get_monthstat":{"year": year}}}).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn as_json(s: &str) -> Value {
        serde_json::from_str(s).expect("command body must be valid JSON")
    }

    #[test]
    fn constants_are_valid_json() {
        for cmd in [
            GET_SYSINFO,
            TURN_ON,
            TURN_OFF,
            TURN_LED_ON,
            TURN_LED_OFF,
            SCAN_WIFI,
            GET_CLOUD_INFO,
            CLOUD_UNBIND,
            GET_TIME,
            GET_TIMEZONE,
            GET_NEXT_SCHEDULE_ACTION,
            GET_SCHEDULE_RULES,
            DELETE_ALL_SCHEDULE_RULES,
            GET_METER,
            ERASE_METER_STATS,
        ] {
            as_json(cmd);
        }
    }

    #[test]
    fn relay_state_matches_constants() {
        assert_eq!(
            as_json(&set_relay_state(Action::On)),
            as_json(TURN_ON),
        );
        assert_eq!(
            as_json(&set_relay_state(Action::Off)),
            as_json(TURN_OFF),
        );
    }

    #[test]
    fn set_alias_embeds_name() {
        let v = as_json(&set_alias("Basement light"));
        assert_eq!(v["system"]["set_dev_alias"]["alias"], "Basement light");
    }

    #[test]
    fn weekday_mask_is_sunday_first() {
        let days = Weekdays {
            monday: true,
            friday: true,
            ..Default::default()
        };
        assert_eq!(days.mask(), [0, 1, 0, 0, 0, 1, 0]);
    }

    #[test]
    fn add_rule_carries_overall_enable() {
        let rule = RuleSpec {
            name: "evening".into(),
            enable: true,
            minutes: 18 * 60,
            action: Action::On,
            repeat: true,
            weekdays: Weekdays {
                saturday: true,
                sunday: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let v = as_json(&add_schedule_rule(&rule));
        assert_eq!(v["schedule"]["add_rule"]["smin"], 1080);
        assert_eq!(v["schedule"]["add_rule"]["sact"], 1);
        assert_eq!(v["schedule"]["add_rule"]["etime_opt"], -1);
        assert_eq!(v["schedule"]["set_overall_enable"]["enable"], 1);
    }

    #[test]
    fn edit_rule_carries_id() {
        let rule = RuleSpec::default();
        let v = as_json(&edit_schedule_rule("8AA75A50A", &rule));
        assert_eq!(v["schedule"]["edit_rule"]["id"], "8AA75A50A");
    }

    #[test]
    fn daily_stats_parameters() {
        let v = as_json(&get_daily_stats(8, 2026));
        assert_eq!(v["emeter"]["get_daystat"]["month"], 8);
        assert_eq!(v["emeter"]["get_daystat"]["year"], 2026);
    }
}
