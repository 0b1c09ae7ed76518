use std::io;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{error, info};

use crate::config::Cec;

/// Runs the configured CEC tool to change the projector's power state.
/// Every failure reduces to `false`; callers never see an error.
pub struct CecController {
    tool: String,
    device: Option<String>,
    logical_address: Option<String>,
}

impl CecController {
    pub fn new(cfg: Cec) -> Self {
        Self {
            tool: cfg.tool,
            device: cfg.device,
            logical_address: cfg.logical_address,
        }
    }

    pub async fn power_on(&self) -> bool {
        self.run(&["--power", "on"]).await
    }

    pub async fn power_off(&self) -> bool {
        self.run(&["--standby"]).await
    }

    fn command_line(&self, action: &[&str]) -> Vec<String> {
        let mut command = vec![self.tool.clone()];
        if let Some(device) = self.device.as_deref().filter(|d| !d.is_empty()) {
            command.extend(["--device".to_string(), device.to_string()]);
        }
        if let Some(addr) = self.logical_address.as_deref().filter(|a| !a.is_empty()) {
            command.extend(["--to".to_string(), addr.to_string()]);
        }
        command.extend(action.iter().map(|s| s.to_string()));
        command
    }

    async fn run(&self, action: &[&str]) -> bool {
        if self.tool.is_empty() {
            error!("CEC tool is not configured; skipping projector command");
            return false;
        }

        let command = self.command_line(action);
        let status = Command::new(&command[0])
            .args(&command[1..])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => {
                info!(command = command.join(" "), "sent CEC command");
                true
            }
            Ok(status) => {
                error!(
                    code = ?status.code(),
                    command = command.join(" "),
                    "CEC command failed"
                );
                false
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                error!(
                    tool = %self.tool,
                    "CEC tool not found. Install it or configure PROJECTOR_CEC_TOOL."
                );
                false
            }
            Err(e) => {
                error!(tool = %self.tool, %e, "failed to run CEC tool");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_full() {
        let controller = CecController::new(Cec {
            tool: "cec-ctl".to_string(),
            device: Some("/dev/cec1".to_string()),
            logical_address: Some("0".to_string()),
        });
        assert_eq!(
            controller.command_line(&["--power", "on"]),
            vec!["cec-ctl", "--device", "/dev/cec1", "--to", "0", "--power", "on"]
        );
    }

    #[test]
    fn test_command_line_skips_empty_parts() {
        let controller = CecController::new(Cec {
            tool: "cec-ctl".to_string(),
            device: None,
            logical_address: Some("".to_string()),
        });
        assert_eq!(
            controller.command_line(&["--standby"]),
            vec!["cec-ctl", "--standby"]
        );
    }

    #[tokio::test]
    async fn test_missing_tool_reports_false() {
        let controller = CecController::new(Cec {
            tool: "definitely-not-a-cec-tool".to_string(),
            device: None,
            logical_address: None,
        });
        assert!(!controller.power_on().await);
        assert!(!controller.power_off().await);
    }
}
