//! Operation catalogue and typed invocations.
//!
//! [`Operation`] is the fixed catalogue exposed to callers. [`Invocation`] is
//! one validated call: each variant carries its own typed parameter record,
//! built from the loosely typed JSON arguments by [`Invocation::parse`].

use lazy_static::lazy_static;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::TimeoutClass;
use crate::geometry::{Point, SwipeDirection};
use crate::key::AndroidKey;
use crate::{Error, Result};

lazy_static! {
    static ref PACKAGE_NAME: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap();
}

/// Longest package identifier accepted by `launch_app`.
pub const MAX_PACKAGE_LEN: usize = 255;

/// A named device-control capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Capture the screen as PNG
    Screenshot,
    /// Query the screen size
    GetScreenSize,
    /// Tap a point
    Tap,
    /// Tap a point twice
    DoubleTap,
    /// Press and hold a point
    LongPress,
    /// Type text into the focused field
    TypeText,
    /// Send a key event
    PressKey,
    /// Swipe in a direction
    Swipe,
    /// Drag between two points
    Drag,
    /// Press Home
    PressHome,
    /// Press Back
    PressBack,
    /// Expand the notification shade
    OpenNotifications,
    /// Expand quick settings
    OpenQuickSettings,
    /// Launch an app by package
    LaunchApp,
    /// Query the foreground activity
    GetCurrentApp,
    /// List third-party packages
    ListInstalledApps,
    /// Run a device shell command
    Shell,
    /// Query model, OS version, screen and battery
    GetDeviceInfo,
}

/// Semantic type of an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Non-negative integer
    Integer,
    /// Free text
    String,
    /// One of a fixed set of names
    Enum(&'static [&'static str]),
}

/// Declared parameter of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name
    pub name: &'static str,
    /// Semantic type
    pub kind: ParamKind,
    /// Whether the caller must supply it
    pub required: bool,
}

impl ParamSpec {
    const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind, required: true }
    }

    const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind, required: false }
    }
}

const NO_PARAMS: &[ParamSpec] = &[];
const POINT_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("x", ParamKind::Integer),
    ParamSpec::required("y", ParamKind::Integer),
];
const DRAG_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("start_x", ParamKind::Integer),
    ParamSpec::required("start_y", ParamKind::Integer),
    ParamSpec::required("end_x", ParamKind::Integer),
    ParamSpec::required("end_y", ParamKind::Integer),
];
const TEXT_PARAMS: &[ParamSpec] = &[ParamSpec::required("text", ParamKind::String)];
const KEY_NAMES: &[&str] = &[
    "enter", "backspace", "delete", "tab", "space", "home", "back", "menu", "search",
    "volume_up", "volume_down", "power", "escape", "dpad_up", "dpad_down", "dpad_left",
    "dpad_right", "app_switch",
];
const KEY_PARAMS: &[ParamSpec] = &[ParamSpec::required("key", ParamKind::Enum(KEY_NAMES))];
const SWIPE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("direction", ParamKind::Enum(&SwipeDirection::NAMES)),
    ParamSpec::optional("distance", ParamKind::Integer),
    ParamSpec::optional("x", ParamKind::Integer),
    ParamSpec::optional("y", ParamKind::Integer),
];
const PACKAGE_PARAMS: &[ParamSpec] = &[ParamSpec::required("package", ParamKind::String)];
const SHELL_PARAMS: &[ParamSpec] = &[ParamSpec::required("command", ParamKind::String)];

impl Operation {
    /// The whole catalogue, in presentation order.
    pub const ALL: [Operation; 18] = [
        Operation::Screenshot,
        Operation::GetScreenSize,
        Operation::Tap,
        Operation::DoubleTap,
        Operation::LongPress,
        Operation::TypeText,
        Operation::PressKey,
        Operation::Swipe,
        Operation::Drag,
        Operation::PressHome,
        Operation::PressBack,
        Operation::OpenNotifications,
        Operation::OpenQuickSettings,
        Operation::LaunchApp,
        Operation::GetCurrentApp,
        Operation::ListInstalledApps,
        Operation::Shell,
        Operation::GetDeviceInfo,
    ];

    /// Look up an operation by its wire name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| Error::UnknownOperation(name.to_string()))
    }

    /// Wire name of the operation.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Screenshot => "screenshot",
            Operation::GetScreenSize => "get_screen_size",
            Operation::Tap => "tap",
            Operation::DoubleTap => "double_tap",
            Operation::LongPress => "long_press",
            Operation::TypeText => "type_text",
            Operation::PressKey => "press_key",
            Operation::Swipe => "swipe",
            Operation::Drag => "drag",
            Operation::PressHome => "press_home",
            Operation::PressBack => "press_back",
            Operation::OpenNotifications => "open_notifications",
            Operation::OpenQuickSettings => "open_quick_settings",
            Operation::LaunchApp => "launch_app",
            Operation::GetCurrentApp => "get_current_app",
            Operation::ListInstalledApps => "list_installed_apps",
            Operation::Shell => "shell",
            Operation::GetDeviceInfo => "get_device_info",
        }
    }

    /// Human description shown to clients.
    pub fn description(self) -> &'static str {
        match self {
            Operation::Screenshot => {
                "Take a screenshot of the Android screen. Returns the current screen as a PNG image."
            }
            Operation::GetScreenSize => "Get the screen size of the Android device in pixels.",
            Operation::Tap => "Tap at (x, y) pixel coordinates on the screen.",
            Operation::DoubleTap => "Double-tap at (x, y) pixel coordinates on the screen.",
            Operation::LongPress => "Long-press at (x, y) pixel coordinates (holds for 1 second).",
            Operation::TypeText => {
                "Type text into the currently focused input field. Spaces and special characters are escaped automatically."
            }
            Operation::PressKey => {
                "Press a key: enter, backspace, delete, tab, space, home, back, menu, search, volume_up, volume_down, power, escape, dpad_up, dpad_down, dpad_left, dpad_right, app_switch."
            }
            Operation::Swipe => {
                "Swipe the screen in a direction (up, down, left, right). By default the gesture spans the middle 60% of the screen. Optionally give a start point (x, y, defaulting to the screen centre) and a distance in pixels (default 500); the end point is clamped to the screen."
            }
            Operation::Drag => "Drag from (start_x, start_y) to (end_x, end_y) over 300ms.",
            Operation::PressHome => "Press the Home button.",
            Operation::PressBack => "Press the Back button.",
            Operation::OpenNotifications => "Open the notification shade.",
            Operation::OpenQuickSettings => "Open the quick settings panel.",
            Operation::LaunchApp => {
                "Launch an Android app by its package name (e.g. com.android.chrome)."
            }
            Operation::GetCurrentApp => {
                "Get the currently visible app (package name and activity)."
            }
            Operation::ListInstalledApps => "List third-party installed apps (package names).",
            Operation::Shell => {
                "Run an arbitrary shell command on the device and return its output. The command runs with full device shell privileges and is passed through unmodified."
            }
            Operation::GetDeviceInfo => {
                "Get device information: model, manufacturer, Android version, screen size and battery."
            }
        }
    }

    /// Declared parameters, in order.
    pub fn parameters(self) -> &'static [ParamSpec] {
        match self {
            Operation::Tap | Operation::DoubleTap | Operation::LongPress => POINT_PARAMS,
            Operation::Drag => DRAG_PARAMS,
            Operation::TypeText => TEXT_PARAMS,
            Operation::PressKey => KEY_PARAMS,
            Operation::Swipe => SWIPE_PARAMS,
            Operation::LaunchApp => PACKAGE_PARAMS,
            Operation::Shell => SHELL_PARAMS,
            Operation::Screenshot
            | Operation::GetScreenSize
            | Operation::PressHome
            | Operation::PressBack
            | Operation::OpenNotifications
            | Operation::OpenQuickSettings
            | Operation::GetCurrentApp
            | Operation::ListInstalledApps
            | Operation::GetDeviceInfo => NO_PARAMS,
        }
    }

    /// JSON Schema of the parameter record, generated from its Rust type.
    pub fn input_schema(self) -> Value {
        let schema = match self {
            Operation::Tap | Operation::DoubleTap | Operation::LongPress => {
                schemars::schema_for!(PointParams)
            }
            Operation::Drag => schemars::schema_for!(DragParams),
            Operation::TypeText => schemars::schema_for!(TypeTextParams),
            Operation::PressKey => schemars::schema_for!(PressKeyParams),
            Operation::Swipe => schemars::schema_for!(SwipeParams),
            Operation::LaunchApp => schemars::schema_for!(LaunchAppParams),
            Operation::Shell => schemars::schema_for!(ShellParams),
            _ => schemars::schema_for!(NoParams),
        };
        schema.to_value()
    }

    /// Whether the operation injects input events into the device.
    pub fn injects_input(self) -> bool {
        matches!(
            self,
            Operation::Tap
                | Operation::DoubleTap
                | Operation::LongPress
                | Operation::TypeText
                | Operation::PressKey
                | Operation::Swipe
                | Operation::Drag
                | Operation::PressHome
                | Operation::PressBack
        )
    }

    /// Timeout class of the operation's bridge command.
    pub fn timeout_class(self) -> TimeoutClass {
        match self {
            Operation::Screenshot => TimeoutClass::Screenshot,
            Operation::Shell => TimeoutClass::Shell,
            op if op.injects_input() => TimeoutClass::Input,
            _ => TimeoutClass::Query,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for operations that take none
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Parameters for tap, double_tap and long_press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PointParams {
    /// X pixel coordinate (0 = left edge)
    pub x: u32,
    /// Y pixel coordinate (0 = top edge)
    pub y: u32,
}

impl PointParams {
    /// The target point.
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Parameters for drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DragParams {
    /// Starting X pixel coordinate
    pub start_x: u32,
    /// Starting Y pixel coordinate
    pub start_y: u32,
    /// Ending X pixel coordinate
    pub end_x: u32,
    /// Ending Y pixel coordinate
    pub end_y: u32,
}

impl DragParams {
    /// Touch-down point.
    pub fn from(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    /// Touch-up point.
    pub fn to(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }
}

/// Parameters for type_text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TypeTextParams {
    /// Text to type into the focused field
    pub text: String,
}

/// Parameters for press_key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PressKeyParams {
    /// Key to press
    pub key: AndroidKey,
}

/// Parameters for swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SwipeParams {
    /// Direction the finger travels
    pub direction: SwipeDirection,
    /// Travel distance in pixels (default 500 when a start point is given)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    /// Starting X pixel coordinate (default: screen centre)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<u32>,
    /// Starting Y pixel coordinate (default: screen centre)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<u32>,
}

impl SwipeParams {
    /// A swipe over the default screen band.
    pub fn new(direction: SwipeDirection) -> Self {
        Self {
            direction,
            distance: None,
            x: None,
            y: None,
        }
    }

    /// Whether no start point or distance was given.
    pub fn is_banded(&self) -> bool {
        self.distance.is_none() && self.x.is_none() && self.y.is_none()
    }
}

/// Parameters for launch_app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LaunchAppParams {
    /// Package name in reverse-domain form (e.g. com.android.chrome)
    pub package: String,
}

/// Parameters for shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ShellParams {
    /// Command line run by the device shell
    pub command: String,
}

/// One validated call of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// screenshot()
    Screenshot,
    /// get_screen_size()
    GetScreenSize,
    /// tap(x, y)
    Tap(PointParams),
    /// double_tap(x, y)
    DoubleTap(PointParams),
    /// long_press(x, y)
    LongPress(PointParams),
    /// type_text(text)
    TypeText(TypeTextParams),
    /// press_key(key)
    PressKey(PressKeyParams),
    /// swipe(direction)
    Swipe(SwipeParams),
    /// drag(start_x, start_y, end_x, end_y)
    Drag(DragParams),
    /// press_home()
    PressHome,
    /// press_back()
    PressBack,
    /// open_notifications()
    OpenNotifications,
    /// open_quick_settings()
    OpenQuickSettings,
    /// launch_app(package)
    LaunchApp(LaunchAppParams),
    /// get_current_app()
    GetCurrentApp,
    /// list_installed_apps()
    ListInstalledApps,
    /// shell(command)
    Shell(ShellParams),
    /// get_device_info()
    GetDeviceInfo,
}

impl Invocation {
    /// Look up `name` and validate `args` against its parameters.
    ///
    /// Unknown extra arguments are ignored.
    pub fn parse(name: &str, args: &Map<String, Value>) -> Result<Self> {
        let operation = Operation::from_name(name)?;
        let reader = ParamReader { operation, args };

        let invocation = match operation {
            Operation::Screenshot => Invocation::Screenshot,
            Operation::GetScreenSize => Invocation::GetScreenSize,
            Operation::Tap => Invocation::Tap(reader.point()?),
            Operation::DoubleTap => Invocation::DoubleTap(reader.point()?),
            Operation::LongPress => Invocation::LongPress(reader.point()?),
            Operation::TypeText => Invocation::TypeText(TypeTextParams {
                text: reader.string("text")?,
            }),
            Operation::PressKey => Invocation::PressKey(PressKeyParams {
                key: AndroidKey::parse(&reader.string("key")?)?,
            }),
            Operation::Swipe => {
                let raw = reader.string("direction")?;
                let direction = SwipeDirection::parse(&raw).ok_or_else(|| {
                    reader.invalid(
                        "direction",
                        format!(
                            "'{raw}' is not one of {}",
                            SwipeDirection::NAMES.join(", ")
                        ),
                    )
                })?;
                let distance = reader.optional_coordinate("distance")?;
                if distance == Some(0) {
                    return Err(reader.invalid("distance", "must be greater than 0"));
                }
                Invocation::Swipe(SwipeParams {
                    direction,
                    distance,
                    x: reader.optional_coordinate("x")?,
                    y: reader.optional_coordinate("y")?,
                })
            }
            Operation::Drag => Invocation::Drag(DragParams {
                start_x: reader.coordinate("start_x")?,
                start_y: reader.coordinate("start_y")?,
                end_x: reader.coordinate("end_x")?,
                end_y: reader.coordinate("end_y")?,
            }),
            Operation::PressHome => Invocation::PressHome,
            Operation::PressBack => Invocation::PressBack,
            Operation::OpenNotifications => Invocation::OpenNotifications,
            Operation::OpenQuickSettings => Invocation::OpenQuickSettings,
            Operation::LaunchApp => {
                let package = reader.string("package")?;
                validate_package(&package).map_err(|reason| reader.invalid("package", reason))?;
                Invocation::LaunchApp(LaunchAppParams { package })
            }
            Operation::GetCurrentApp => Invocation::GetCurrentApp,
            Operation::ListInstalledApps => Invocation::ListInstalledApps,
            Operation::Shell => Invocation::Shell(ShellParams {
                command: reader.string("command")?,
            }),
            Operation::GetDeviceInfo => Invocation::GetDeviceInfo,
        };

        Ok(invocation)
    }

    /// The operation this invocation calls.
    pub fn operation(&self) -> Operation {
        match self {
            Invocation::Screenshot => Operation::Screenshot,
            Invocation::GetScreenSize => Operation::GetScreenSize,
            Invocation::Tap(_) => Operation::Tap,
            Invocation::DoubleTap(_) => Operation::DoubleTap,
            Invocation::LongPress(_) => Operation::LongPress,
            Invocation::TypeText(_) => Operation::TypeText,
            Invocation::PressKey(_) => Operation::PressKey,
            Invocation::Swipe(_) => Operation::Swipe,
            Invocation::Drag(_) => Operation::Drag,
            Invocation::PressHome => Operation::PressHome,
            Invocation::PressBack => Operation::PressBack,
            Invocation::OpenNotifications => Operation::OpenNotifications,
            Invocation::OpenQuickSettings => Operation::OpenQuickSettings,
            Invocation::LaunchApp(_) => Operation::LaunchApp,
            Invocation::GetCurrentApp => Operation::GetCurrentApp,
            Invocation::ListInstalledApps => Operation::ListInstalledApps,
            Invocation::Shell(_) => Operation::Shell,
            Invocation::GetDeviceInfo => Operation::GetDeviceInfo,
        }
    }
}

/// Check that a package identifier looks like `com.example.app`.
pub fn validate_package(package: &str) -> std::result::Result<(), String> {
    if package.len() > MAX_PACKAGE_LEN {
        return Err(format!("longer than {MAX_PACKAGE_LEN} characters"));
    }
    if !PACKAGE_NAME.is_match(package) {
        return Err(format!(
            "'{package}' is not a reverse-domain package name (e.g. com.android.chrome)"
        ));
    }
    Ok(())
}

/// Reads and coerces loosely typed JSON arguments for one operation.
struct ParamReader<'a> {
    operation: Operation,
    args: &'a Map<String, Value>,
}

impl ParamReader<'_> {
    fn invalid(&self, field: &str, reason: impl Into<String>) -> Error {
        Error::invalid_param(self.operation.name(), field, reason)
    }

    fn required(&self, field: &str) -> Result<&Value> {
        match self.args.get(field) {
            None | Some(Value::Null) => Err(self.invalid(field, "missing required parameter")),
            Some(value) => Ok(value),
        }
    }

    fn point(&self) -> Result<PointParams> {
        Ok(PointParams {
            x: self.coordinate("x")?,
            y: self.coordinate("y")?,
        })
    }

    /// A non-negative integer; accepts JSON integers, integral floats and numeric strings.
    fn coordinate(&self, field: &str) -> Result<u32> {
        let value = self.required(field)?;
        let number = match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i
                } else if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0) {
                    if f < i64::MIN as f64 || f > i64::MAX as f64 {
                        return Err(self.invalid(field, format!("{n} is out of range")));
                    }
                    f as i64
                } else {
                    return Err(self.invalid(field, format!("{n} is not an integer")));
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.invalid(field, format!("'{s}' is not an integer")))?,
            other => {
                return Err(self.invalid(
                    field,
                    format!("expected a non-negative integer, got {}", json_type(other)),
                ))
            }
        };

        if number < 0 {
            return Err(self.invalid(field, format!("{number} is negative")));
        }
        u32::try_from(number).map_err(|_| self.invalid(field, format!("{number} is out of range")))
    }

    /// Like [`Self::coordinate`], but absent or null means `None`.
    fn optional_coordinate(&self, field: &str) -> Result<Option<u32>> {
        match self.args.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.coordinate(field).map(Some),
        }
    }

    /// A non-empty string; numbers are accepted and rendered as text.
    fn string(&self, field: &str) -> Result<String> {
        let text = match self.required(field)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(self.invalid(
                    field,
                    format!("expected a string, got {}", json_type(other)),
                ))
            }
        };
        if text.is_empty() {
            return Err(self.invalid(field, "must not be empty"));
        }
        Ok(text)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
