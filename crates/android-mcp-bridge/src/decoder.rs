//! Result decoder: turns raw bridge output into typed results.
//!
//! Text parsing is line-oriented and tolerant: fields the device does not
//! report come back as [`Reported::Unknown`]. Completely empty output is
//! [`Error::NoData`], and numbers outside their valid range are
//! [`Error::MalformedOutput`].

use android_mcp_core::{
    ActionReport, BatteryInfo, BatteryStatus, CurrentApp, DeviceInfo, Error, InstalledApps,
    Invocation, Operation, Reported, Result, ScreenSize, ShellOutput,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::encoder::BridgeCommand;
use crate::executor::ProcessOutput;

lazy_static! {
    static ref COMPONENT: Regex =
        Regex::new(r"([A-Za-z][A-Za-z0-9_.]*)/(\.?[A-Za-z0-9_.$]+)").unwrap();
}

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Final chunk of every complete PNG: zero length, `IEND`, CRC.
pub const PNG_IEND: [u8; 12] = [
    0x00, 0x00, 0x00, 0x00, b'I', b'E', b'N', b'D', 0xae, 0x42, 0x60, 0x82,
];

/// Bridge report for a package without a launcher activity.
pub const NO_ACTIVITIES_MARKER: &str = "No activities found";

/// Typed result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// PNG screenshot
    Image(Vec<u8>),
    /// Screen size
    ScreenSize(ScreenSize),
    /// Input or navigation action performed
    Action(ActionReport),
    /// Foreground activity
    CurrentApp(CurrentApp),
    /// Installed packages
    InstalledApps(InstalledApps),
    /// Device info
    DeviceInfo(DeviceInfo),
    /// Shell passthrough result
    Shell(ShellOutput),
}

/// Decode the output of `command`, run for `invocation` against `serial`.
pub fn decode(
    invocation: &Invocation,
    command: &BridgeCommand,
    output: ProcessOutput,
    serial: &str,
) -> Result<Decoded> {
    let operation = invocation.operation();

    if let Invocation::Shell(_) = invocation {
        return Ok(Decoded::Shell(ShellOutput {
            exit_code: output.exit_code,
            stdout: lossy_text(&output.stdout),
            stderr: lossy_text(&output.stderr),
        }));
    }

    if let Invocation::LaunchApp(params) = invocation {
        let combined = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        if combined.contains(NO_ACTIVITIES_MARKER) {
            return Err(Error::PackageNotFound(params.package.clone()));
        }
    }

    if !output.success() {
        warn!(operation = %operation, exit_code = ?output.exit_code, "Bridge command failed");
        return Err(Error::bridge_failed(output.exit_code, &output.stderr));
    }

    let decoded = match operation {
        Operation::Screenshot => Decoded::Image(validate_png(output.stdout)?),
        Operation::GetScreenSize => {
            Decoded::ScreenSize(parse_screen_size(&require_text(&output, "wm size")?)?)
        }
        Operation::GetCurrentApp => Decoded::CurrentApp(parse_current_app(&require_text(
            &output,
            "dumpsys activity activities",
        )?)),
        Operation::ListInstalledApps => Decoded::InstalledApps(parse_packages(&require_text(
            &output,
            "pm list packages",
        )?)),
        Operation::GetDeviceInfo => Decoded::DeviceInfo(parse_device_info(
            &require_text(&output, "device info script")?,
            serial,
        )?),
        _ => Decoded::Action(ActionReport {
            action: operation.name(),
            message: command.summary.clone(),
        }),
    };

    Ok(decoded)
}

/// Decode bytes lossily and normalise CRLF line endings.
pub fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace("\r\n", "\n")
}

pub(crate) fn require_text(output: &ProcessOutput, what: &str) -> Result<String> {
    let text = lossy_text(&output.stdout);
    if text.trim().is_empty() {
        return Err(Error::NoData(format!("{what} produced no output")));
    }
    Ok(text)
}

/// Check that `bytes` is a complete PNG file and return it unchanged.
pub fn validate_png(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(Error::NoData("screencap produced no output".to_string()));
    }
    if bytes.len() < PNG_SIGNATURE.len() {
        return Err(Error::MalformedOutput(format!(
            "screencap output is {} bytes, shorter than a PNG signature",
            bytes.len()
        )));
    }
    if bytes[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(64)]).into_owned();
        return Err(Error::MalformedOutput(format!(
            "screencap output is not a PNG (starts with {head:?})"
        )));
    }
    if !bytes.ends_with(&PNG_IEND) {
        return Err(Error::MalformedOutput(format!(
            "PNG of {} bytes is truncated (missing IEND chunk)",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Parse `wm size` output. An override size wins over the physical size.
pub fn parse_screen_size(text: &str) -> Result<ScreenSize> {
    let mut physical = None;
    let mut overridden = None;
    let mut last_candidate = None;

    for line in text.lines().map(str::trim) {
        if let Some((label, value)) = line.split_once(':') {
            match label.trim() {
                "Override size" => overridden = Some(value.trim()),
                "Physical size" => physical = Some(value.trim()),
                _ => {}
            }
        } else if line.contains('x') {
            last_candidate = Some(line);
        }
    }

    let value = overridden.or(physical).or(last_candidate).ok_or_else(|| {
        Error::MalformedOutput(format!("no screen size in wm output: {:?}", text.trim()))
    })?;
    ScreenSize::parse(value)
}

/// Parse the foreground activity from `dumpsys activity activities`.
pub fn parse_current_app(text: &str) -> CurrentApp {
    let Some(line) = text
        .lines()
        .map(str::trim)
        .find(|line| line.contains("ResumedActivity") && COMPONENT.is_match(line))
    else {
        return CurrentApp::default();
    };

    let (package, activity) = match COMPONENT.captures(line) {
        Some(caps) => {
            let package = caps[1].to_string();
            let activity = match caps[2].strip_prefix('.') {
                Some(short) => format!("{package}.{short}"),
                None => caps[2].to_string(),
            };
            (Reported::Known(package), Reported::Known(activity))
        }
        None => (Reported::Unknown, Reported::Unknown),
    };

    CurrentApp {
        package,
        activity,
        raw: Reported::Known(line.to_string()),
    }
}

/// Parse `pm list packages` output.
pub fn parse_packages(text: &str) -> InstalledApps {
    InstalledApps::new(
        text.lines()
            .filter_map(|line| line.trim().strip_prefix("package:"))
            .map(str::trim)
            .filter(|pkg| !pkg.is_empty())
            .map(String::from)
            .collect(),
    )
}

/// Parse `dumpsys battery` output.
pub fn parse_battery(text: &str) -> Result<BatteryInfo> {
    let mut info = BatteryInfo::default();

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "level" => {
                let level = value
                    .parse::<u8>()
                    .ok()
                    .filter(|l| *l <= 100)
                    .ok_or_else(|| {
                        Error::MalformedOutput(format!("battery level '{value}' outside 0..=100"))
                    })?;
                info.level = Reported::Known(level);
            }
            "status" => {
                info.status =
                    Reported::from_option(value.parse::<u8>().ok().and_then(BatteryStatus::from_code));
            }
            _ => {}
        }
    }

    Ok(info)
}

/// Split the device info script output into `[section]` bodies.
fn sections(text: &str) -> Vec<(&str, Vec<&str>)> {
    let mut sections: Vec<(&str, Vec<&str>)> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            sections.push((name, Vec::new()));
        } else if let Some((_, body)) = sections.last_mut() {
            if !trimmed.is_empty() {
                body.push(line);
            }
        }
    }
    sections
}

/// Parse the output of the device info script.
///
/// Absent or unreadable sections are reported as unknown; they never fail the call.
pub fn parse_device_info(text: &str, serial: &str) -> Result<DeviceInfo> {
    let sections = sections(text);
    let body = |name: &str| -> Option<String> {
        sections
            .iter()
            .find(|(n, _)| *n == name)
            .filter(|(_, lines)| !lines.is_empty())
            .map(|(_, lines)| lines.join("\n"))
    };
    let first_line = |name: &str| body(name).and_then(|b| b.lines().next().map(|l| l.trim().to_string()));

    let sdk = match first_line("sdk") {
        Some(value) => match value.parse::<u32>() {
            Ok(level) => Reported::Known(level),
            Err(_) => {
                warn!(sdk = %value, "SDK level is not a number, reporting unknown");
                Reported::Unknown
            }
        },
        None => Reported::Unknown,
    };

    let screen = match body("screen") {
        Some(wm) => match parse_screen_size(&wm) {
            Ok(size) => Reported::Known(size),
            Err(e) => {
                warn!(error = %e, "Unreadable screen section, reporting unknown");
                Reported::Unknown
            }
        },
        None => Reported::Unknown,
    };

    let battery = match body("battery") {
        Some(dump) => parse_battery(&dump).unwrap_or_else(|e| {
            warn!(error = %e, "Unreadable battery section, reporting unknown");
            BatteryInfo::default()
        }),
        None => BatteryInfo::default(),
    };

    Ok(DeviceInfo {
        serial: serial.to_string(),
        model: first_line("model").into(),
        manufacturer: first_line("manufacturer").into(),
        android_version: first_line("android_version").into(),
        sdk,
        screen,
        battery,
    })
}
