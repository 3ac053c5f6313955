//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data with no external dependencies, so they can be used
//! from the maze core, the renderers, the terminal host and the TCP protocol.
//!
//! # Coordinates
//!
//! Grid positions are `(row, col)`. "Up" decrements the row, "left"
//! decrements the column. Rows grow downwards on screen.
//!
//! # Maze sizes
//!
//! A requested maze size `N` is rounded down to an even number and produces
//! an `(N + 1) x (N + 1)` boolean grid holding `N/2 x N/2` logical cells.
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_MAZE_SIZE` | 4 | Smallest size with distinct start and finish |
//! | `DEFAULT_MAZE_SIZE` | 10 | Size used when a session is created implicitly |
//! | `MAZE_SIZE_PRESETS` | 10, 20, 50 | Sizes offered by the hosts |
//! | `DEFAULT_FRAME_SIZE` | 1024 | Side of a rendered frame in pixels |
//!
//! # Examples
//!
//! ```
//! use mazewalk_types::{Direction, NavAction, ViewMode};
//!
//! let heading = Direction::Up;
//! assert_eq!(heading.turn_left(), Direction::Left);
//! assert_eq!(heading.turn_right(), Direction::Right);
//! assert_eq!(heading.opposite(), Direction::Down);
//!
//! let action = NavAction::from_str("turnLeft").unwrap();
//! assert_eq!(action, NavAction::TurnLeft);
//!
//! assert_eq!(ViewMode::FirstPerson.toggled(), ViewMode::Map);
//! ```

/// Smallest requested maze size accepted (2x2 logical cells).
pub const MIN_MAZE_SIZE: usize = 4;

/// Largest requested maze size accepted by the hosts.
pub const MAX_MAZE_SIZE: usize = 200;

/// Maze size used when a command arrives for a session that does not exist yet.
pub const DEFAULT_MAZE_SIZE: usize = 10;

/// Maze sizes offered by the hosts (10x10, 20x20, 50x50).
pub const MAZE_SIZE_PRESETS: [usize; 3] = [10, 20, 50];

/// Default rendered frame side in pixels.
pub const DEFAULT_FRAME_SIZE: u32 = 1024;

/// Border stroke width in pixels.
pub const BORDER_WIDTH: f32 = 2.0;

/// Cardinal heading of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All headings in the order used to pick the initial facing.
    pub const START_PRIORITY: [Direction; 4] = [
        Direction::Down,
        Direction::Right,
        Direction::Left,
        Direction::Up,
    ];

    /// Rotate counter-clockwise (up -> left -> down -> right -> up).
    pub fn turn_left(&self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    /// Rotate clockwise (up -> right -> down -> left -> up).
    pub fn turn_right(&self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit step as `(d_row, d_col)`.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" | "north" => Some(Direction::Up),
            "down" | "d" | "south" => Some(Direction::Down),
            "left" | "l" | "west" => Some(Direction::Left),
            "right" | "r" | "east" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Semantic class of a node, used to pick highlight colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeRole {
    #[default]
    Regular,
    Start,
    Finish,
}

/// What a render call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    FirstPerson,
    Map,
}

impl ViewMode {
    pub fn toggled(&self) -> Self {
        match self {
            ViewMode::FirstPerson => ViewMode::Map,
            ViewMode::Map => ViewMode::FirstPerson,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::FirstPerson => "firstPerson",
            ViewMode::Map => "map",
        }
    }
}

/// Navigation commands accepted by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavAction {
    TurnLeft,
    TurnRight,
    StepForward,
    StepBackward,
    ToggleView,
}

impl NavAction {
    /// Parse action from string (for the TCP protocol)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "turnleft" | "left" => Some(NavAction::TurnLeft),
            "turnright" | "right" => Some(NavAction::TurnRight),
            "stepforward" | "forward" | "up" => Some(NavAction::StepForward),
            "stepbackward" | "backward" | "down" => Some(NavAction::StepBackward),
            "toggleview" | "map" => Some(NavAction::ToggleView),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NavAction::TurnLeft => "turnLeft",
            NavAction::TurnRight => "turnRight",
            NavAction::StepForward => "stepForward",
            NavAction::StepBackward => "stepBackward",
            NavAction::ToggleView => "toggleView",
        }
    }

    /// Steps can be rejected by the maze; turns and view toggles cannot.
    pub fn is_step(&self) -> bool {
        matches!(self, NavAction::StepForward | NavAction::StepBackward)
    }
}

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fill and outline colour of one surface class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Paint {
    pub surface: Rgb,
    pub border: Rgb,
}

impl Paint {
    pub const fn new(surface: Rgb, border: Rgb) -> Self {
        Self { surface, border }
    }
}

/// Surface class a polygon belongs to, before role highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    Wall,
    Ceiling,
    Floor,
}

/// Colour assignments for every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorScheme {
    /// Frame clear colour.
    pub background: Rgb,
    pub wall: Paint,
    pub ceiling: Paint,
    pub floor: Paint,
    pub start: Paint,
    pub finish: Paint,
}

impl ColorScheme {
    pub fn material(&self, material: Material) -> Paint {
        match material {
            Material::Wall => self.wall,
            Material::Ceiling => self.ceiling,
            Material::Floor => self.floor,
        }
    }

    /// Paint for a surface; start/finish highlights replace the material colours.
    pub fn paint(&self, material: Material, role: NodeRole) -> Paint {
        match role {
            NodeRole::Start => self.start,
            NodeRole::Finish => self.finish,
            NodeRole::Regular => self.material(material),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        let yellow_green = Rgb::new(154, 205, 50);
        let deep_pink = Rgb::new(255, 20, 147);
        Self {
            background: Rgb::new(128, 128, 128),
            wall: Paint::new(Rgb::new(144, 238, 144), Rgb::new(0, 100, 0)),
            ceiling: Paint::new(Rgb::new(176, 196, 222), Rgb::new(70, 130, 180)),
            floor: Paint::new(Rgb::new(0, 0, 255), Rgb::new(0, 0, 139)),
            start: Paint::new(yellow_green, yellow_green),
            finish: Paint::new(deep_pink, deep_pink),
        }
    }
}

/// Round a requested maze size down to even.
pub fn normalize_maze_size(size: usize) -> usize {
    size & !1
}
