//! Screen coordinates, screen size and gesture synthesis.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Swipe start position, as a percentage along the travel axis.
pub const SWIPE_NEAR_PERCENT: u32 = 80;

/// Swipe end position, as a percentage along the travel axis.
pub const SWIPE_FAR_PERCENT: u32 = 20;

/// Duration of a synthesized swipe.
pub const SWIPE_DURATION_MS: u32 = 300;

/// Travel of a swipe that starts from a given point, when no distance is given.
pub const SWIPE_DEFAULT_DISTANCE: u32 = 500;

/// Duration of a drag.
pub const DRAG_DURATION_MS: u32 = 300;

/// Hold time of a long press.
pub const LONG_PRESS_DURATION_MS: u32 = 1000;

/// Largest screen dimension accepted from the device.
pub const MAX_SCREEN_DIMENSION: u32 = 100_000;

/// A point on the screen, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    /// Horizontal pixel coordinate
    pub x: u32,
    /// Vertical pixel coordinate
    pub y: u32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ScreenSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ScreenSize {
    /// Create a screen size, rejecting zero or absurd dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        for (name, value) in [("width", width), ("height", height)] {
            if value == 0 || value > MAX_SCREEN_DIMENSION {
                return Err(Error::MalformedOutput(format!(
                    "screen {name} {value} outside 1..={MAX_SCREEN_DIMENSION}"
                )));
            }
        }
        Ok(Self { width, height })
    }

    /// Parse a `WIDTHxHEIGHT` string such as `1080x2400`.
    pub fn parse(s: &str) -> Result<Self> {
        let (w, h) = s
            .trim()
            .split_once('x')
            .ok_or_else(|| Error::MalformedOutput(format!("expected WIDTHxHEIGHT, got '{s}'")))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| Error::MalformedOutput(format!("non-numeric screen size '{s}'")))
        };
        Self::new(parse(w)?, parse(h)?)
    }

    /// Center of the screen.
    pub fn center(&self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }

    /// Whether `point` lies on the screen.
    pub fn contains(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    /// Move `point` onto the screen, keeping it as close as possible.
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(point.x.min(self.width - 1), point.y.min(self.height - 1))
    }
}

impl std::fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Direction of a swipe gesture (direction the finger travels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    /// Finger moves towards the top of the screen
    Up,
    /// Finger moves towards the bottom of the screen
    Down,
    /// Finger moves towards the left edge
    Left,
    /// Finger moves towards the right edge
    Right,
}

impl SwipeDirection {
    /// Allowed names, for schemas and error messages.
    pub const NAMES: [&'static str; 4] = ["up", "down", "left", "right"];

    /// Parse a direction name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Some(SwipeDirection::Up),
            "down" => Some(SwipeDirection::Down),
            "left" => Some(SwipeDirection::Left),
            "right" => Some(SwipeDirection::Right),
            _ => None,
        }
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            SwipeDirection::Up => "up",
            SwipeDirection::Down => "down",
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }

    /// Synthesize the gesture for this direction on a screen of the given size.
    ///
    /// The finger travels from [`SWIPE_NEAR_PERCENT`] to [`SWIPE_FAR_PERCENT`] of
    /// the travel axis (mirrored for down/right), centred on the other axis.
    pub fn gesture(self, screen: ScreenSize) -> Gesture {
        let center = screen.center();
        let near_y = percent_of(screen.height, SWIPE_NEAR_PERCENT);
        let far_y = percent_of(screen.height, SWIPE_FAR_PERCENT);
        let near_x = percent_of(screen.width, SWIPE_NEAR_PERCENT);
        let far_x = percent_of(screen.width, SWIPE_FAR_PERCENT);

        let (from, to) = match self {
            SwipeDirection::Up => (Point::new(center.x, near_y), Point::new(center.x, far_y)),
            SwipeDirection::Down => (Point::new(center.x, far_y), Point::new(center.x, near_y)),
            SwipeDirection::Left => (Point::new(near_x, center.y), Point::new(far_x, center.y)),
            SwipeDirection::Right => (Point::new(far_x, center.y), Point::new(near_x, center.y)),
        };

        Gesture {
            from,
            to,
            duration_ms: SWIPE_DURATION_MS,
        }
    }

    /// Swipe from `start` for `distance` pixels in this direction.
    ///
    /// The end point is clamped to the screen edge.
    pub fn gesture_from(self, screen: ScreenSize, start: Point, distance: u32) -> Gesture {
        let from = screen.clamp(start);
        let to = match self {
            SwipeDirection::Up => Point::new(from.x, from.y.saturating_sub(distance)),
            SwipeDirection::Down => Point::new(from.x, from.y.saturating_add(distance)),
            SwipeDirection::Left => Point::new(from.x.saturating_sub(distance), from.y),
            SwipeDirection::Right => Point::new(from.x.saturating_add(distance), from.y),
        };

        Gesture {
            from,
            to: screen.clamp(to),
            duration_ms: SWIPE_DURATION_MS,
        }
    }
}

fn percent_of(value: u32, percent: u32) -> u32 {
    (u64::from(value) * u64::from(percent) / 100) as u32
}

/// A straight-line touch gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gesture {
    /// Touch-down point
    pub from: Point,
    /// Touch-up point
    pub to: Point,
    /// Time between touch-down and touch-up
    pub duration_ms: u32,
}

impl Gesture {
    /// A drag between two points.
    pub fn drag(from: Point, to: Point) -> Self {
        Self {
            from,
            to,
            duration_ms: DRAG_DURATION_MS,
        }
    }

    /// A long press: a zero-length gesture held in place.
    pub fn long_press(at: Point) -> Self {
        Self {
            from: at,
            to: at,
            duration_ms: LONG_PRESS_DURATION_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_size_parse() {
        let size = ScreenSize::parse("1080x2400").unwrap();
        assert_eq!(size.width, 1080);
        assert_eq!(size.height, 2400);
        assert_eq!(size.to_string(), "1080x2400");

        assert_eq!(ScreenSize::parse(" 720 x 1280 ").unwrap().height, 1280);
    }

    #[test]
    fn test_screen_size_rejects_bad_values() {
        assert!(matches!(
            ScreenSize::parse("1080"),
            Err(Error::MalformedOutput(_))
        ));
        assert!(matches!(
            ScreenSize::parse("abcx2400"),
            Err(Error::MalformedOutput(_))
        ));
        assert!(matches!(
            ScreenSize::parse("0x2400"),
            Err(Error::MalformedOutput(_))
        ));
        assert!(matches!(
            ScreenSize::parse("1080x-5"),
            Err(Error::MalformedOutput(_))
        ));
        assert!(ScreenSize::parse("1080x100001").is_err());
    }

    #[test]
    fn test_swipe_up_on_reported_size() {
        let screen = ScreenSize::new(1080, 2400).unwrap();
        let gesture = SwipeDirection::Up.gesture(screen);

        let center_x = screen.width / 2;
        assert_eq!(gesture.from.x, center_x);
        assert_eq!(gesture.to.x, center_x);
        assert_eq!(gesture.from.y, screen.height * SWIPE_NEAR_PERCENT / 100);
        assert_eq!(gesture.to.y, screen.height * SWIPE_FAR_PERCENT / 100);
        // bottom-centre region to top-centre region
        assert!(gesture.from.y > screen.height / 2);
        assert!(gesture.to.y < screen.height / 2);
        assert_eq!(gesture.duration_ms, SWIPE_DURATION_MS);
    }

    #[test]
    fn test_swipe_directions_mirror() {
        let screen = ScreenSize::new(1080, 2400).unwrap();
        let up = SwipeDirection::Up.gesture(screen);
        let down = SwipeDirection::Down.gesture(screen);
        assert_eq!(up.from, down.to);
        assert_eq!(up.to, down.from);

        let left = SwipeDirection::Left.gesture(screen);
        let right = SwipeDirection::Right.gesture(screen);
        assert_eq!(left.from, right.to);
        assert_eq!(left.from.y, screen.height / 2);
        assert!(left.from.x > left.to.x);
    }

    #[test]
    fn test_swipe_stays_on_screen() {
        for (w, h) in [(1, 1), (320, 480), (1440, 3200), (100_000, 100_000)] {
            let screen = ScreenSize::new(w, h).unwrap();
            for dir in [
                SwipeDirection::Up,
                SwipeDirection::Down,
                SwipeDirection::Left,
                SwipeDirection::Right,
            ] {
                let g = dir.gesture(screen);
                assert!(g.from.x < w && g.to.x < w);
                assert!(g.from.y < h && g.to.y < h);
            }
        }
    }

    #[test]
    fn test_swipe_from_start_point() {
        let screen = ScreenSize::new(1080, 2400).unwrap();
        let start = screen.center();

        let g = SwipeDirection::Up.gesture_from(screen, start, SWIPE_DEFAULT_DISTANCE);
        assert_eq!(g.from, start);
        assert_eq!(g.to, Point::new(start.x, start.y - SWIPE_DEFAULT_DISTANCE));
        assert_eq!(g.duration_ms, SWIPE_DURATION_MS);

        let g = SwipeDirection::Right.gesture_from(screen, Point::new(100, 700), 250);
        assert_eq!(g.to, Point::new(350, 700));
    }

    #[test]
    fn test_swipe_from_start_point_clamped() {
        let screen = ScreenSize::new(1080, 2400).unwrap();

        let g = SwipeDirection::Up.gesture_from(screen, Point::new(540, 300), 1000);
        assert_eq!(g.to, Point::new(540, 0));

        let g = SwipeDirection::Down.gesture_from(screen, Point::new(540, 2000), u32::MAX);
        assert_eq!(g.to, Point::new(540, screen.height - 1));

        let g = SwipeDirection::Left.gesture_from(screen, Point::new(5000, 10), 100);
        assert_eq!(g.from, Point::new(screen.width - 1, 10));
        assert_eq!(g.to, Point::new(screen.width - 101, 10));
        assert!(screen.contains(g.from) && screen.contains(g.to));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(SwipeDirection::parse("UP"), Some(SwipeDirection::Up));
        assert_eq!(SwipeDirection::parse(" left"), Some(SwipeDirection::Left));
        assert_eq!(SwipeDirection::parse("sideways"), None);
        for name in SwipeDirection::NAMES {
            assert_eq!(SwipeDirection::parse(name).unwrap().name(), name);
        }
    }

    #[test]
    fn test_long_press_is_stationary() {
        let g = Gesture::long_press(Point::new(10, 20));
        assert_eq!(g.from, g.to);
        assert_eq!(g.duration_ms, LONG_PRESS_DURATION_MS);
    }
}
