//! Console commands
//!
//! One command per line:
//!
//! ```text
//! start | pause | toggle | home | stop | refresh | states | services
//! select <zone>
//! press <restart|edgecut>
//! call <service> [json data]
//! ```

use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use landroid_cloud::{ButtonKind, LandroidDevice};
use serde_json::Value;
use tracing::info;

use crate::host::LoggingHost;

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCommand {
    Start,
    Pause,
    StartPause,
    ReturnToBase,
    Stop,
    Refresh,
    States,
    Services,
    Select(String),
    Press(ButtonKind),
    Call { service: String, data: Value },
}

impl FromStr for BridgeCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word {
            "start" => BridgeCommand::Start,
            "pause" => BridgeCommand::Pause,
            "toggle" => BridgeCommand::StartPause,
            "home" => BridgeCommand::ReturnToBase,
            "stop" => BridgeCommand::Stop,
            "refresh" => BridgeCommand::Refresh,
            "states" => BridgeCommand::States,
            "services" => BridgeCommand::Services,
            "select" if !rest.is_empty() => BridgeCommand::Select(rest.to_string()),
            "press" => {
                let kind = ButtonKind::ALL
                    .into_iter()
                    .find(|kind| kind.key() == rest)
                    .ok_or_else(|| anyhow!("unknown button '{}'", rest))?;
                BridgeCommand::Press(kind)
            }
            "call" if !rest.is_empty() => {
                let (service, data) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let data = if data.trim().is_empty() {
                    Value::Object(Default::default())
                } else {
                    serde_json::from_str(data.trim())
                        .with_context(|| format!("invalid data for '{}'", service))?
                };
                BridgeCommand::Call {
                    service: service.to_string(),
                    data,
                }
            }
            "" => bail!("empty command"),
            other => bail!("unknown command '{}'", other),
        };
        Ok(command)
    }
}

impl BridgeCommand {
    pub async fn execute(self, device: &LandroidDevice, host: &LoggingHost) -> anyhow::Result<()> {
        match self {
            BridgeCommand::Start => device.mower.start().await?,
            BridgeCommand::Pause => device.mower.pause().await?,
            BridgeCommand::StartPause => device.mower.start_pause().await?,
            BridgeCommand::ReturnToBase => device.mower.return_to_base().await?,
            BridgeCommand::Stop => device.mower.stop().await?,
            BridgeCommand::Refresh => {
                if !device.api.refresh().await {
                    bail!("refresh failed");
                }
            }
            BridgeCommand::States => {
                for (entity_id, state) in host.states() {
                    info!(
                        "{} = {} {}",
                        entity_id,
                        state.state,
                        serde_json::to_string(&state.attributes)?
                    );
                }
            }
            BridgeCommand::Services => {
                let services: Vec<&str> = device
                    .services
                    .operations()
                    .into_iter()
                    .map(|op| op.service_name())
                    .collect();
                info!("Services: {}", services.join(", "));
            }
            BridgeCommand::Select(option) => {
                let select = device
                    .zone_select
                    .as_ref()
                    .ok_or_else(|| anyhow!("device has no zone select"))?;
                select.select_option(&option).await?;
            }
            BridgeCommand::Press(kind) => {
                let button = device
                    .button(kind)
                    .ok_or_else(|| anyhow!("device has no {} button", kind.key()))?;
                button.press().await?;
            }
            BridgeCommand::Call { service, data } => device.mower.call_service(&service, data).await?,
        }
        Ok(())
    }
}
