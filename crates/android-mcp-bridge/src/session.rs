//! Device session resolution.

use std::path::Path;
use std::time::Duration;

use android_mcp_core::{DeviceEntry, Error, Result, SessionTarget};
use tracing::{debug, info};

use crate::executor::{CommandRequest, CommandRunner};

/// Decides which device each invocation addresses.
///
/// The resolver holds no state besides the immutable override: without one,
/// every call queries the device list afresh.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    override_serial: Option<String>,
    devices_timeout: Duration,
}

impl SessionResolver {
    /// Create a resolver with an optional serial override.
    pub fn new(override_serial: Option<String>, devices_timeout: Duration) -> Self {
        Self {
            override_serial,
            devices_timeout,
        }
    }

    /// Configured serial override, if any.
    pub fn override_serial(&self) -> Option<&str> {
        self.override_serial.as_deref()
    }

    /// Resolve the target for one invocation.
    pub async fn resolve<R: CommandRunner>(
        &self,
        runner: &R,
        bridge: &Path,
    ) -> Result<SessionTarget> {
        if let Some(serial) = &self.override_serial {
            debug!(serial = %serial, "Using configured device");
            return Ok(SessionTarget::Explicit(serial.clone()));
        }

        let request = CommandRequest::new(bridge, vec!["devices".to_string()], self.devices_timeout);
        let output = runner.run(&request).await?;
        if !output.success() {
            return Err(Error::bridge_failed(output.exit_code, &output.stderr));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        let devices = DeviceEntry::parse_list(&listing);
        select_device(&devices)
    }
}

/// Pick the sole authorized device from a device list.
pub fn select_device(devices: &[DeviceEntry]) -> Result<SessionTarget> {
    let authorized: Vec<&DeviceEntry> = devices.iter().filter(|d| d.is_authorized()).collect();

    match authorized.as_slice() {
        [] => {
            let mut message = "no authorized device in `adb devices`".to_string();
            if !devices.is_empty() {
                let seen: Vec<String> = devices.iter().map(ToString::to_string).collect();
                message.push_str(&format!(
                    "; found {} (accept the USB debugging prompt or reconnect)",
                    seen.join(", ")
                ));
            }
            Err(Error::NoDeviceAttached(message))
        }
        [only] => {
            info!(serial = %only.serial, "Targeting sole attached device");
            Ok(SessionTarget::Implicit(only.serial.clone()))
        }
        many => Err(Error::AmbiguousDevice {
            serials: many.iter().map(|d| d.serial.clone()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, ScriptedRunner};
    use std::path::PathBuf;

    fn bridge() -> PathBuf {
        PathBuf::from("/opt/sdk/platform-tools/adb")
    }

    fn resolver(serial: Option<&str>) -> SessionResolver {
        SessionResolver::new(serial.map(String::from), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_zero_devices() {
        let runner = ScriptedRunner::new().on("devices", Reply::stdout("List of devices attached\n\n"));
        let err = resolver(None).resolve(&runner, &bridge()).await.unwrap_err();
        assert!(matches!(err, Error::NoDeviceAttached(_)));
    }

    #[tokio::test]
    async fn test_unauthorized_only_is_not_attached() {
        let runner = ScriptedRunner::new().on(
            "devices",
            Reply::stdout("List of devices attached\nR58M12ABC\tunauthorized\n"),
        );
        let err = resolver(None).resolve(&runner, &bridge()).await.unwrap_err();
        match err {
            Error::NoDeviceAttached(message) => assert!(message.contains("R58M12ABC (unauthorized)")),
            other => panic!("expected NoDeviceAttached, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_single_device_implicit() {
        let runner = ScriptedRunner::new().on(
            "devices",
            Reply::stdout("List of devices attached\nemulator-5554\tdevice\nR58M12ABC\toffline\n"),
        );
        let target = resolver(None).resolve(&runner, &bridge()).await.unwrap();
        assert_eq!(target, SessionTarget::Implicit("emulator-5554".to_string()));

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec!["devices"]);
    }

    #[tokio::test]
    async fn test_multiple_devices_ambiguous() {
        let runner = ScriptedRunner::new().on(
            "devices",
            Reply::stdout("List of devices attached\nemulator-5554\tdevice\nemulator-5556\tdevice\n"),
        );
        let err = resolver(None).resolve(&runner, &bridge()).await.unwrap_err();
        match err {
            Error::AmbiguousDevice { serials } => {
                assert_eq!(serials, vec!["emulator-5554", "emulator-5556"])
            }
            other => panic!("expected AmbiguousDevice, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_override_wins_without_query() {
        for listing in [
            "List of devices attached\n",
            "List of devices attached\nemulator-5554\tdevice\n",
            "List of devices attached\nemulator-5554\tdevice\nemulator-5556\tdevice\n",
        ] {
            let runner = ScriptedRunner::new().on("devices", Reply::stdout(listing));
            let target = resolver(Some("emulator-5556"))
                .resolve(&runner, &bridge())
                .await
                .unwrap();
            assert_eq!(target, SessionTarget::Explicit("emulator-5556".to_string()));
            assert!(runner.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_devices_failure_propagates() {
        let runner = ScriptedRunner::new().on(
            "devices",
            Reply::failure(1, "cannot connect to daemon"),
        );
        let err = resolver(None).resolve(&runner, &bridge()).await.unwrap_err();
        assert!(matches!(err, Error::BridgeExecutionFailed { exit_code: Some(1), .. }));
    }

    #[tokio::test]
    async fn test_resolves_afresh_each_call() {
        let runner = ScriptedRunner::new().on(
            "devices",
            Reply::stdout("List of devices attached\nemulator-5554\tdevice\n"),
        );
        let resolver = resolver(None);
        resolver.resolve(&runner, &bridge()).await.unwrap();
        resolver.resolve(&runner, &bridge()).await.unwrap();
        assert_eq!(runner.calls().len(), 2);
    }
}
