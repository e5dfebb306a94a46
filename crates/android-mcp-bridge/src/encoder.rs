//! Command encoder: maps invocations to adb argument vectors.
//!
//! `adb shell` joins its arguments with spaces and hands the line to the
//! device shell, so every free-text value that reaches the device shell is
//! single-quoted here. Numeric arguments are emitted as decimal integers.

use std::path::Path;

use android_mcp_core::operation::validate_package;
use android_mcp_core::{
    AndroidKey, Error, Gesture, Invocation, Point, Result, ScreenSize, SessionTarget,
    TimeoutClass, TimeoutSettings, SWIPE_DEFAULT_DISTANCE,
};

use crate::executor::{CaptureMode, CommandRequest};

/// Intent category used to launch an app's main activity.
pub const LAUNCHER_CATEGORY: &str = "android.intent.category.LAUNCHER";

/// Device-side script printing every `get_device_info` field under a `[section]` marker.
pub const DEVICE_INFO_SCRIPT: &str = "echo '[model]'; getprop ro.product.model; \
     echo '[manufacturer]'; getprop ro.product.manufacturer; \
     echo '[android_version]'; getprop ro.build.version.release; \
     echo '[sdk]'; getprop ro.build.version.sdk; \
     echo '[screen]'; wm size; \
     echo '[battery]'; dumpsys battery; true";

/// A fully encoded bridge command, minus the device selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeCommand {
    /// Arguments after the selector
    pub args: Vec<String>,
    /// How stdout is interpreted
    pub capture: CaptureMode,
    /// Timeout bucket
    pub timeout_class: TimeoutClass,
    /// Human summary of the action
    pub summary: String,
}

impl BridgeCommand {
    fn text(args: Vec<String>, timeout_class: TimeoutClass, summary: String) -> Self {
        Self {
            args,
            capture: CaptureMode::Text,
            timeout_class,
            summary,
        }
    }

    /// Build the process request, injecting `-s <serial>` ahead of the subcommand.
    pub fn into_request(
        self,
        bridge: &Path,
        target: &SessionTarget,
        timeouts: &TimeoutSettings,
    ) -> CommandRequest {
        let mut args = Vec::with_capacity(self.args.len() + 2);
        args.extend(target.selector_args());
        args.extend(self.args);
        CommandRequest::new(bridge, args, timeouts.for_class(self.timeout_class))
            .with_capture(self.capture)
    }
}

/// Encode an invocation.
///
/// `screen` must hold a freshly queried screen size for `swipe`; other
/// operations ignore it.
pub fn encode(invocation: &Invocation, screen: Option<ScreenSize>) -> Result<BridgeCommand> {
    let class = invocation.operation().timeout_class();

    let command = match invocation {
        Invocation::Screenshot => BridgeCommand {
            args: args(&["exec-out", "screencap", "-p"]),
            capture: CaptureMode::Binary,
            timeout_class: class,
            summary: "Captured screenshot".to_string(),
        },
        Invocation::GetScreenSize => {
            BridgeCommand::text(args(&["shell", "wm", "size"]), class, "Queried screen size".into())
        }
        Invocation::Tap(p) => {
            let at = p.point();
            BridgeCommand::text(tap_args(at), class, format!("Tapped at {at}"))
        }
        Invocation::DoubleTap(p) => {
            let at = p.point();
            let mut argv = tap_args(at);
            argv.push("&&".to_string());
            argv.extend(tap_args(at).into_iter().skip(1));
            BridgeCommand::text(argv, class, format!("Double-tapped at {at}"))
        }
        Invocation::LongPress(p) => {
            let at = p.point();
            BridgeCommand::text(
                swipe_args(Gesture::long_press(at)),
                class,
                format!("Long-pressed at {at}"),
            )
        }
        Invocation::TypeText(params) => {
            let segments = escape_text(&params.text);
            if segments.is_empty() {
                return Err(Error::invalid_param(
                    "type_text",
                    "text",
                    "contains no typeable characters",
                ));
            }
            let mut argv = vec!["shell".to_string()];
            for (i, segment) in segments.into_iter().enumerate() {
                if i > 0 {
                    argv.push("&&".to_string());
                }
                argv.extend(["input".to_string(), "text".to_string(), segment]);
            }
            let typed = params.text.chars().filter(|c| *c != '\0').count();
            BridgeCommand::text(argv, class, format!("Typed {typed} characters"))
        }
        Invocation::PressKey(params) => BridgeCommand::text(
            keyevent_args(params.key),
            class,
            format!("Pressed key {} ({})", params.key, params.key.code()),
        ),
        Invocation::Swipe(params) => {
            let screen = screen.ok_or_else(|| {
                Error::NoData("screen size is required to synthesize a swipe".to_string())
            })?;
            let gesture = if params.is_banded() {
                params.direction.gesture(screen)
            } else {
                let center = screen.center();
                let start = Point::new(
                    params.x.unwrap_or(center.x),
                    params.y.unwrap_or(center.y),
                );
                if start.x >= screen.width {
                    return Err(Error::invalid_param(
                        "swipe",
                        "x",
                        format!("{} is outside the {screen} screen", start.x),
                    ));
                }
                if start.y >= screen.height {
                    return Err(Error::invalid_param(
                        "swipe",
                        "y",
                        format!("{} is outside the {screen} screen", start.y),
                    ));
                }
                params.direction.gesture_from(
                    screen,
                    start,
                    params.distance.unwrap_or(SWIPE_DEFAULT_DISTANCE),
                )
            };
            BridgeCommand::text(
                swipe_args(gesture),
                class,
                format!(
                    "Swiped {} from {} to {} on {screen}",
                    params.direction.name(),
                    gesture.from,
                    gesture.to
                ),
            )
        }
        Invocation::Drag(params) => {
            let gesture = Gesture::drag(params.from(), params.to());
            BridgeCommand::text(
                swipe_args(gesture),
                class,
                format!("Dragged from {} to {}", gesture.from, gesture.to),
            )
        }
        Invocation::PressHome => {
            BridgeCommand::text(keyevent_args(AndroidKey::Home), class, "Pressed Home".into())
        }
        Invocation::PressBack => {
            BridgeCommand::text(keyevent_args(AndroidKey::Back), class, "Pressed Back".into())
        }
        Invocation::OpenNotifications => BridgeCommand::text(
            args(&["shell", "cmd", "statusbar", "expand-notifications"]),
            class,
            "Opened notification shade".into(),
        ),
        Invocation::OpenQuickSettings => BridgeCommand::text(
            args(&["shell", "cmd", "statusbar", "expand-settings"]),
            class,
            "Opened quick settings".into(),
        ),
        Invocation::LaunchApp(params) => {
            validate_package(&params.package)
                .map_err(|reason| Error::invalid_param("launch_app", "package", reason))?;
            let mut argv = args(&["shell", "monkey", "-p"]);
            argv.push(params.package.clone());
            argv.extend(args(&["-c", LAUNCHER_CATEGORY, "1"]));
            BridgeCommand::text(argv, class, format!("Launched {}", params.package))
        }
        Invocation::GetCurrentApp => BridgeCommand::text(
            args(&["shell", "dumpsys", "activity", "activities"]),
            class,
            "Queried foreground activity".into(),
        ),
        Invocation::ListInstalledApps => BridgeCommand::text(
            args(&["shell", "pm", "list", "packages", "-3"]),
            class,
            "Listed third-party packages".into(),
        ),
        Invocation::Shell(params) => BridgeCommand::text(
            vec!["shell".to_string(), params.command.clone()],
            class,
            "Ran shell command".into(),
        ),
        Invocation::GetDeviceInfo => BridgeCommand::text(
            vec!["shell".to_string(), DEVICE_INFO_SCRIPT.to_string()],
            class,
            "Queried device info".into(),
        ),
    };

    Ok(command)
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn tap_args(at: Point) -> Vec<String> {
    vec![
        "shell".to_string(),
        "input".to_string(),
        "tap".to_string(),
        at.x.to_string(),
        at.y.to_string(),
    ]
}

fn swipe_args(gesture: Gesture) -> Vec<String> {
    vec![
        "shell".to_string(),
        "input".to_string(),
        "swipe".to_string(),
        gesture.from.x.to_string(),
        gesture.from.y.to_string(),
        gesture.to.x.to_string(),
        gesture.to.y.to_string(),
        gesture.duration_ms.to_string(),
    ]
}

fn keyevent_args(key: AndroidKey) -> Vec<String> {
    vec![
        "shell".to_string(),
        "input".to_string(),
        "keyevent".to_string(),
        key.code().to_string(),
    ]
}

/// Wrap `s` in POSIX single quotes.
pub fn shell_quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

/// Escape text for `input text`, returning one quoted shell word per segment.
///
/// `input text` turns `%s` into a space and has no escape for a literal `%s`,
/// so the text is split between every `%` and a following `s`. Within each
/// segment spaces become `%s`, then the segment is single-quoted. NUL
/// characters are dropped. Returns no segments for text that is empty after
/// dropping NULs.
pub fn escape_text(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().filter(|c| *c != '\0').collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == 's' && i > 0 && chars[i - 1] == '%' {
            segments.push(std::mem::take(&mut current));
        }
        if c == ' ' {
            current.push_str("%s");
        } else {
            current.push(c);
        }
    }
    segments.push(current);

    segments.iter().map(|s| shell_quote(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use android_mcp_core::operation::{
        DragParams, LaunchAppParams, PointParams, PressKeyParams, ShellParams, SwipeParams,
        TypeTextParams,
    };
    use android_mcp_core::SwipeDirection;
    use proptest::prelude::*;
    use std::path::PathBuf;

    /// Token of a POSIX shell command line.
    #[derive(Debug, Clone, PartialEq)]
    enum Token {
        Word(String),
        AndIf,
        /// Unquoted metacharacter the device shell would act on
        Meta(char),
    }

    /// Tokenize a device shell line the way `sh` would, flagging any unquoted
    /// metacharacter or expansion.
    fn tokenize(line: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut word = String::new();
        let mut in_word = false;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                ' ' | '\t' => {
                    if in_word {
                        tokens.push(Token::Word(std::mem::take(&mut word)));
                        in_word = false;
                    }
                }
                '\'' => {
                    in_word = true;
                    loop {
                        match chars.next() {
                            Some('\'') => break,
                            Some(q) => word.push(q),
                            None => {
                                tokens.push(Token::Meta('\''));
                                break;
                            }
                        }
                    }
                }
                '\\' => {
                    in_word = true;
                    if let Some(next) = chars.next() {
                        word.push(next);
                    }
                }
                '&' if chars.peek() == Some(&'&') => {
                    chars.next();
                    if in_word {
                        tokens.push(Token::Word(std::mem::take(&mut word)));
                        in_word = false;
                    }
                    tokens.push(Token::AndIf);
                }
                '"' | '&' | ';' | '|' | '<' | '>' | '(' | ')' | '`' | '$' | '*' | '?' | '['
                | '\n' => tokens.push(Token::Meta(c)),
                '#' | '~' if !in_word => tokens.push(Token::Meta(c)),
                other => {
                    in_word = true;
                    word.push(other);
                }
            }
        }
        if in_word {
            tokens.push(Token::Word(word));
        }
        tokens
    }

    /// Android `input text` decoding: `%s` becomes a space.
    fn input_text_decode(arg: &str) -> String {
        let mut buff: Vec<char> = arg.chars().collect();
        let mut escape = false;
        let mut i = 0;
        while i < buff.len() {
            if escape {
                escape = false;
                if buff[i] == 's' {
                    buff[i] = ' ';
                    buff.remove(i - 1);
                    i -= 1;
                }
            }
            if buff[i] == '%' {
                escape = true;
            }
            i += 1;
        }
        buff.into_iter().collect()
    }

    /// Run `adb shell <args>` against a simulated device, returning the typed text.
    fn simulate_typing(argv: &[String]) -> String {
        assert_eq!(argv[0], "shell");
        let line = argv[1..].join(" ");
        let tokens = tokenize(&line);

        let mut typed = String::new();
        for command in tokens.split(|t| *t == Token::AndIf) {
            match command {
                [Token::Word(input), Token::Word(text), Token::Word(arg)]
                    if input == "input" && text == "text" =>
                {
                    typed.push_str(&input_text_decode(arg));
                }
                other => panic!("device shell would run {other:?} from line {line:?}"),
            }
        }
        typed
    }

    fn type_text_argv(text: &str) -> Vec<String> {
        let inv = Invocation::TypeText(TypeTextParams {
            text: text.to_string(),
        });
        encode(&inv, None).unwrap().args
    }

    fn tap(x: u32, y: u32) -> Invocation {
        Invocation::Tap(PointParams { x, y })
    }

    #[test]
    fn test_tap_encoding() {
        let cmd = encode(&tap(540, 1200), None).unwrap();
        assert_eq!(cmd.args, ["shell", "input", "tap", "540", "1200"]);
        assert_eq!(cmd.capture, CaptureMode::Text);
        assert_eq!(cmd.timeout_class, TimeoutClass::Input);
    }

    #[test]
    fn test_double_tap_is_one_shell_call() {
        let inv = Invocation::DoubleTap(PointParams { x: 10, y: 20 });
        let cmd = encode(&inv, None).unwrap();
        assert_eq!(
            cmd.args,
            ["shell", "input", "tap", "10", "20", "&&", "input", "tap", "10", "20"]
        );
    }

    #[test]
    fn test_long_press_holds_in_place() {
        let inv = Invocation::LongPress(PointParams { x: 300, y: 700 });
        let cmd = encode(&inv, None).unwrap();
        assert_eq!(
            cmd.args,
            ["shell", "input", "swipe", "300", "700", "300", "700", "1000"]
        );
    }

    #[test]
    fn test_drag_order() {
        let inv = Invocation::Drag(DragParams {
            start_x: 1,
            start_y: 2,
            end_x: 3,
            end_y: 4,
        });
        let cmd = encode(&inv, None).unwrap();
        assert_eq!(cmd.args, ["shell", "input", "swipe", "1", "2", "3", "4", "300"]);
    }

    #[test]
    fn test_press_enter() {
        let inv = Invocation::PressKey(PressKeyParams {
            key: AndroidKey::parse("enter").unwrap(),
        });
        let cmd = encode(&inv, None).unwrap();
        assert_eq!(cmd.args, ["shell", "input", "keyevent", "66"]);
        assert!(cmd.summary.contains("enter"));
    }

    #[test]
    fn test_home_and_back() {
        assert_eq!(
            encode(&Invocation::PressHome, None).unwrap().args,
            ["shell", "input", "keyevent", "3"]
        );
        assert_eq!(
            encode(&Invocation::PressBack, None).unwrap().args,
            ["shell", "input", "keyevent", "4"]
        );
    }

    #[test]
    fn test_swipe_up_uses_screen_size() {
        let screen = ScreenSize::new(1080, 2400).unwrap();
        let inv = Invocation::Swipe(SwipeParams::new(SwipeDirection::Up));
        let cmd = encode(&inv, Some(screen)).unwrap();

        let g = SwipeDirection::Up.gesture(screen);
        let expected = [
            "shell".to_string(),
            "input".to_string(),
            "swipe".to_string(),
            (screen.width / 2).to_string(),
            (screen.height * 80 / 100).to_string(),
            (screen.width / 2).to_string(),
            (screen.height * 20 / 100).to_string(),
            g.duration_ms.to_string(),
        ];
        assert_eq!(cmd.args, expected);
    }

    #[test]
    fn test_swipe_without_screen_fails() {
        let inv = Invocation::Swipe(SwipeParams::new(SwipeDirection::Left));
        assert!(matches!(encode(&inv, None), Err(Error::NoData(_))));
    }

    fn swipe_tail(params: SwipeParams, screen: ScreenSize) -> Vec<String> {
        encode(&Invocation::Swipe(params), Some(screen)).unwrap().args[3..].to_vec()
    }

    #[test]
    fn test_swipe_from_given_start() {
        let screen = ScreenSize::new(1080, 2400).unwrap();
        let params = SwipeParams {
            distance: Some(300),
            x: Some(900),
            y: Some(1200),
            ..SwipeParams::new(SwipeDirection::Left)
        };
        assert_eq!(swipe_tail(params, screen), ["900", "1200", "600", "1200", "300"]);
    }

    #[test]
    fn test_swipe_start_defaults_to_centre() {
        let screen = ScreenSize::new(1080, 2400).unwrap();
        let center = screen.center();

        let params = SwipeParams {
            distance: Some(400),
            ..SwipeParams::new(SwipeDirection::Down)
        };
        let expected_end = (center.y + 400).to_string();
        assert_eq!(
            swipe_tail(params, screen),
            [
                center.x.to_string(),
                center.y.to_string(),
                center.x.to_string(),
                expected_end,
                "300".to_string(),
            ]
        );

        let params = SwipeParams {
            y: Some(2000),
            ..SwipeParams::new(SwipeDirection::Up)
        };
        let expected_end = (2000 - SWIPE_DEFAULT_DISTANCE).to_string();
        assert_eq!(swipe_tail(params, screen)[3], expected_end);
    }

    #[test]
    fn test_swipe_end_clamped_to_screen() {
        let screen = ScreenSize::new(1080, 2400).unwrap();
        let params = SwipeParams {
            distance: Some(5000),
            x: Some(100),
            ..SwipeParams::new(SwipeDirection::Right)
        };
        assert_eq!(swipe_tail(params, screen)[2], (screen.width - 1).to_string());
    }

    #[test]
    fn test_swipe_start_off_screen_rejected() {
        let screen = ScreenSize::new(1080, 2400).unwrap();
        let params = SwipeParams {
            x: Some(1080),
            ..SwipeParams::new(SwipeDirection::Up)
        };
        let err = encode(&Invocation::Swipe(params), Some(screen)).unwrap_err();
        assert!(matches!(err, Error::InvalidParameters { ref field, .. } if field == "x"));
    }

    #[test]
    fn test_panels() {
        assert_eq!(
            encode(&Invocation::OpenNotifications, None).unwrap().args,
            ["shell", "cmd", "statusbar", "expand-notifications"]
        );
        assert_eq!(
            encode(&Invocation::OpenQuickSettings, None).unwrap().args,
            ["shell", "cmd", "statusbar", "expand-settings"]
        );
    }

    #[test]
    fn test_launch_app() {
        let inv = Invocation::LaunchApp(LaunchAppParams {
            package: "com.android.chrome".to_string(),
        });
        let cmd = encode(&inv, None).unwrap();
        assert_eq!(
            cmd.args,
            [
                "shell",
                "monkey",
                "-p",
                "com.android.chrome",
                "-c",
                "android.intent.category.LAUNCHER",
                "1"
            ]
        );
    }

    #[test]
    fn test_launch_app_revalidates_package() {
        let inv = Invocation::LaunchApp(LaunchAppParams {
            package: "com.x; reboot".to_string(),
        });
        let err = encode(&inv, None).unwrap_err();
        assert!(matches!(err, Error::InvalidParameters { ref field, .. } if field == "package"));
    }

    #[test]
    fn test_queries() {
        assert_eq!(
            encode(&Invocation::GetCurrentApp, None).unwrap().args,
            ["shell", "dumpsys", "activity", "activities"]
        );
        assert_eq!(
            encode(&Invocation::ListInstalledApps, None).unwrap().args,
            ["shell", "pm", "list", "packages", "-3"]
        );
        assert_eq!(
            encode(&Invocation::GetScreenSize, None).unwrap().args,
            ["shell", "wm", "size"]
        );

        let info = encode(&Invocation::GetDeviceInfo, None).unwrap();
        assert_eq!(info.args.len(), 2);
        assert_eq!(info.timeout_class, TimeoutClass::Query);
    }

    #[test]
    fn test_shell_passthrough_single_argument() {
        let inv = Invocation::Shell(ShellParams {
            command: "ls -la /sdcard | head -n 3; echo $HOME".to_string(),
        });
        let cmd = encode(&inv, None).unwrap();
        assert_eq!(
            cmd.args,
            ["shell", "ls -la /sdcard | head -n 3; echo $HOME"]
        );
        assert_eq!(cmd.timeout_class, TimeoutClass::Shell);
    }

    #[test]
    fn test_screenshot_is_binary() {
        let cmd = encode(&Invocation::Screenshot, None).unwrap();
        assert_eq!(cmd.args, ["exec-out", "screencap", "-p"]);
        assert_eq!(cmd.capture, CaptureMode::Binary);
        assert_eq!(cmd.timeout_class, TimeoutClass::Screenshot);
    }

    #[test]
    fn test_selector_injected_first() {
        let target = SessionTarget::Implicit("emulator-5554".to_string());
        let request = encode(&tap(1, 2), None).unwrap().into_request(
            &PathBuf::from("adb"),
            &target,
            &TimeoutSettings::default(),
        );
        assert_eq!(
            request.args,
            ["-s", "emulator-5554", "shell", "input", "tap", "1", "2"]
        );
        assert_eq!(request.timeout, TimeoutSettings::default().for_class(TimeoutClass::Input));
    }

    #[test]
    fn test_type_text_spaces() {
        assert_eq!(
            type_text_argv("hello world"),
            ["shell", "input", "text", "'hello%sworld'"]
        );
    }

    #[test]
    fn test_type_text_single_quote() {
        let argv = type_text_argv("it's");
        assert_eq!(argv[3], "'it'\\''s'");
        assert_eq!(simulate_typing(&argv), "it's");
    }

    #[test]
    fn test_type_text_metacharacters() {
        let text = "a(b)&c;d|e<f>g`h`$i \"j\" \\k *?[l] ~#m\nn";
        let argv = type_text_argv(text);
        assert_eq!(argv.len(), 4);
        assert_eq!(simulate_typing(&argv), text);
    }

    #[test]
    fn test_type_text_literal_percent_s() {
        let argv = type_text_argv("50%sale");
        assert_eq!(
            argv,
            ["shell", "input", "text", "'50%'", "&&", "input", "text", "'sale'"]
        );
        assert_eq!(simulate_typing(&argv), "50%sale");
    }

    #[test]
    fn test_type_text_percent_before_space() {
        let argv = type_text_argv("100% sure");
        assert_eq!(argv[3], "'100%%ssure'");
        assert_eq!(simulate_typing(&argv), "100% sure");
    }

    #[test]
    fn test_type_text_drops_nul() {
        assert_eq!(simulate_typing(&type_text_argv("a\0b")), "ab");

        let inv = Invocation::TypeText(TypeTextParams {
            text: "\0\0".to_string(),
        });
        assert!(matches!(
            encode(&inv, None),
            Err(Error::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_tokenizer_flags_injection() {
        assert!(tokenize("input text a;reboot").contains(&Token::Meta(';')));
        assert!(tokenize("input text $(id)").contains(&Token::Meta('$')));
    }

    proptest! {
        #[test]
        fn prop_tap_encodes_coordinates_unmodified(x in 0u32..100_000, y in 0u32..100_000) {
            let cmd = encode(&tap(x, y), None).unwrap();
            prop_assert_eq!(cmd.args.len(), 5);
            prop_assert_eq!(cmd.args[3].parse::<u32>().unwrap(), x);
            prop_assert_eq!(cmd.args[4].parse::<u32>().unwrap(), y);
        }

        #[test]
        fn prop_drag_encodes_coordinates_in_order(
            sx in 0u32..100_000, sy in 0u32..100_000, ex in 0u32..100_000, ey in 0u32..100_000
        ) {
            let inv = Invocation::Drag(DragParams { start_x: sx, start_y: sy, end_x: ex, end_y: ey });
            let cmd = encode(&inv, None).unwrap();
            let numbers: Vec<u32> = cmd.args[3..7].iter().map(|a| a.parse().unwrap()).collect();
            prop_assert_eq!(numbers, vec![sx, sy, ex, ey]);
        }

        #[test]
        fn prop_ascii_printable_round_trips(text in "[ -~]{1,64}") {
            let argv = type_text_argv(&text);
            prop_assert_eq!(simulate_typing(&argv), text);
        }

        #[test]
        fn prop_each_segment_is_one_shell_word(text in "[ -~\n\t]{1,64}") {
            let argv = type_text_argv(&text);
            let segments = escape_text(&text);
            let tokens = tokenize(&argv[1..].join(" "));

            prop_assert!(!tokens.iter().any(|t| matches!(t, Token::Meta(_))));
            prop_assert_eq!(tokens.len(), segments.len() * 4 - 1);
        }

        #[test]
        fn prop_any_text_round_trips(text in any::<String>()) {
            let expected: String = text.chars().filter(|c| *c != '\0').collect();
            prop_assume!(!expected.is_empty());
            prop_assert_eq!(simulate_typing(&type_text_argv(&text)), expected);
        }
    }
}
