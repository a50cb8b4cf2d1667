//! Smart plug handles.
//! Thin convenience layer over [`transport::exchange_addr`]: each method
//! builds one command body, performs one exchange, and parses the reply.
//! Model differences (energy metering on the HS110) are explicit capability
//! branches rather than structural inheritance.

use crate::error::{KasaError, Result};
use crate::protocol::{self, Action, DEVICE_PORT, RuleSpec};
use crate::response::{
    AccessPoint, AddRuleResult, CloudInfo, DayStats, DeviceTime, DeviceTimezone, MonthStats,
    NextAction, Realtime, Response, Rule, Status, SysInfo,
};
use crate::transport;
use log::debug;
use std::net::{IpAddr, SocketAddr};
use tokio::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Plug hardware model.
///
/// The HS105 behaves identically to the HS100; it is a separate variant so
/// that model-specific behavior, if any emerges, is an explicit branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlugModel {
    Hs100,
    Hs105,
    Hs110,
}

impl PlugModel {
    /// Only the HS110 carries an energy meter.
    pub fn supports_energy_metering(self) -> bool {
        matches!(self, PlugModel::Hs110)
    }
}

/// A single Kasa smart plug on the local network.
#[derive(Debug, Clone)]
pub struct SmartPlug {
    addr: SocketAddr,
    model: PlugModel,
    timeout: Duration,
}

impl SmartPlug {
    /// Create a handle for a plug at the given host on the standard port.
    pub fn new(model: PlugModel, host: IpAddr) -> Self {
        Self {
            addr: SocketAddr::new(host, DEVICE_PORT),
            model,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn hs100(host: IpAddr) -> Self {
        Self::new(PlugModel::Hs100, host)
    }

    pub fn hs105(host: IpAddr) -> Self {
        Self::new(PlugModel::Hs105, host)
    }

    pub fn hs110(host: IpAddr) -> Self {
        Self::new(PlugModel::Hs110, host)
    }

    /// Override the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the target port (the standard port is 9999).
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    pub fn model(&self) -> PlugModel {
        self.model
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// One exchange: send the command body, parse the reply envelope.
    async fn run(&self, command: &str) -> Result<Response> {
        debug!("{} <- {}", self.addr, command);
        let plaintext = transport::exchange_addr(self.addr, command, self.timeout).await?;
        Response::parse(&plaintext)
    }

    // --- System ---

    /// Query device state.
    pub async fn sysinfo(&self) -> Result<SysInfo> {
        let resp = self.run(protocol::GET_SYSINFO).await?;
        section(resp.system.get_sysinfo, "sysinfo")
    }

    pub async fn set_relay(&self, action: Action) -> Result<Status> {
        let resp = self.run(&protocol::set_relay_state(action)).await?;
        Ok(resp.system.set_relay_state)
    }

    pub async fn turn_on(&self) -> Result<Status> {
        self.set_relay(Action::On).await
    }

    pub async fn turn_off(&self) -> Result<Status> {
        self.set_relay(Action::Off).await
    }

    /// Switch the status LED on or off.
    pub async fn set_led(&self, on: bool) -> Result<Status> {
        let cmd = if on {
            protocol::TURN_LED_ON
        } else {
            protocol::TURN_LED_OFF
        };
        let resp = self.run(cmd).await?;
        Ok(resp.system.set_led_off)
    }

    pub async fn set_alias(&self, alias: &str) -> Result<Status> {
        let resp = self.run(&protocol::set_alias(alias)).await?;
        Ok(resp.system.set_dev_alias)
    }

    pub async fn reboot(&self, delay_secs: u32) -> Result<Status> {
        let resp = self.run(&protocol::reboot(delay_secs)).await?;
        Ok(resp.system.reboot)
    }

    /// Factory reset. Destructive: wipes the device configuration.
    pub async fn factory_reset(&self, delay_secs: u32) -> Result<Status> {
        let resp = self.run(&protocol::factory_reset(delay_secs)).await?;
        Ok(resp.system.reset)
    }

    // --- WLAN ---

    pub async fn scan_wifi(&self) -> Result<Vec<AccessPoint>> {
        let resp = self.run(protocol::SCAN_WIFI).await?;
        Ok(section(resp.netif.get_scaninfo, "scan results")?.ap_list)
    }

    pub async fn join_wifi(&self, ssid: &str, password: &str, key_type: u8) -> Result<Status> {
        let resp = self
            .run(&protocol::set_wifi(ssid, password, key_type))
            .await?;
        Ok(resp.netif.set_stainfo)
    }

    // --- Cloud ---

    pub async fn cloud_info(&self) -> Result<CloudInfo> {
        let resp = self.run(protocol::GET_CLOUD_INFO).await?;
        section(resp.cloud.get_info, "cloud info")
    }

    pub async fn set_cloud_url(&self, server: &str) -> Result<Status> {
        let resp = self.run(&protocol::set_cloud_url(server)).await?;
        Ok(resp.cloud.set_server_url)
    }

    pub async fn cloud_bind(&self, username: &str, password: &str) -> Result<Status> {
        let resp = self.run(&protocol::cloud_bind(username, password)).await?;
        Ok(resp.cloud.bind)
    }

    pub async fn cloud_unbind(&self) -> Result<Status> {
        let resp = self.run(protocol::CLOUD_UNBIND).await?;
        Ok(resp.cloud.unbind)
    }

    // --- Time ---

    pub async fn time(&self) -> Result<DeviceTime> {
        let resp = self.run(protocol::GET_TIME).await?;
        section(resp.time.get_time, "device time")
    }

    pub async fn timezone(&self) -> Result<DeviceTimezone> {
        let resp = self.run(protocol::GET_TIMEZONE).await?;
        section(resp.time.get_timezone, "timezone")
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn set_timezone(
        &self,
        year: u32,
        month: u32,
        mday: u32,
        hour: u32,
        min: u32,
        sec: u32,
        index: i32,
    ) -> Result<Status> {
        let resp = self
            .run(&protocol::set_timezone(year, month, mday, hour, min, sec, index))
            .await?;
        Ok(resp.time.set_timezone)
    }

    // --- Schedule ---

    pub async fn next_scheduled_action(&self) -> Result<NextAction> {
        let resp = self.run(protocol::GET_NEXT_SCHEDULE_ACTION).await?;
        section(resp.schedule.get_next_action, "next action")
    }

    pub async fn schedule_rules(&self) -> Result<Vec<Rule>> {
        let resp = self.run(protocol::GET_SCHEDULE_RULES).await?;
        Ok(section(resp.schedule.get_rules, "schedule rules")?.rule_list)
    }

    /// Add a rule; the reply carries the device-assigned rule id.
    pub async fn add_schedule_rule(&self, rule: &RuleSpec) -> Result<AddRuleResult> {
        let resp = self.run(&protocol::add_schedule_rule(rule)).await?;
        section(resp.schedule.add_rule, "rule id")
    }

    pub async fn edit_schedule_rule(&self, id: &str, rule: &RuleSpec) -> Result<Status> {
        let resp = self.run(&protocol::edit_schedule_rule(id, rule)).await?;
        Ok(resp.schedule.edit_rule)
    }

    pub async fn delete_schedule_rule(&self, id: &str) -> Result<Status> {
        let resp = self.run(&protocol::delete_schedule_rule(id)).await?;
        Ok(resp.schedule.delete_rule)
    }

    pub async fn delete_all_schedule_rules(&self) -> Result<Status> {
        let resp = self.run(protocol::DELETE_ALL_SCHEDULE_RULES).await?;
        Ok(resp.schedule.delete_all_rules)
    }

    // --- Energy metering (HS110) ---

    fn require_meter(&self) -> Result<()> {
        if self.model.supports_energy_metering() {
            Ok(())
        } else {
            Err(KasaError::Unsupported("energy metering requires an HS110"))
        }
    }

    pub async fn realtime_meter(&self) -> Result<Realtime> {
        self.require_meter()?;
        let resp = self.run(protocol::GET_METER).await?;
        section(resp.emeter.get_realtime, "meter reading")
    }

    pub async fn daily_stats(&self, month: u32, year: u32) -> Result<DayStats> {
        self.require_meter()?;
        let resp = self.run(&protocol::get_daily_stats(month, year)).await?;
        section(resp.emeter.get_daystat, "daily stats")
    }

    pub async fn monthly_stats(&self, year: u32) -> Result<MonthStats> {
        self.require_meter()?;
        let resp = self.run(&protocol::get_monthly_stats(year)).await?;
        section(resp.emeter.get_monthstat, "monthly stats")
    }

    pub async fn erase_meter_stats(&self) -> Result<Status> {
        self.require_meter()?;
        let resp = self.run(protocol::ERASE_METER_STATS).await?;
        Ok(resp.emeter.erase_emeter_stat)
    }
}

fn section<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| KasaError::MalformedReply(format!("reply carried no {what}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hs110_is_the_only_metering_model() {
        assert!(!PlugModel::Hs100.supports_energy_metering());
        assert!(!PlugModel::Hs105.supports_energy_metering());
        assert!(PlugModel::Hs110.supports_energy_metering());
    }

    #[tokio::test]
    async fn metering_on_hs100_is_rejected_without_io() {
        // Unroutable TEST-NET address; the capability check must fire first.
        let plug = SmartPlug::hs100("192.0.2.1".parse().unwrap())
            .with_timeout(Duration::from_millis(10));
        let err = plug.realtime_meter().await.unwrap_err();
        assert!(matches!(err, KasaError::Unsupported(_)));
    }

    #[test]
    fn port_override() {
        let plug = SmartPlug::hs105("127.0.0.1".parse().unwrap()).with_port(19999);
        assert_eq!(plug.addr().port(), 19999);
        assert_eq!(plug.model(), PlugModel::Hs105);
    }
}
