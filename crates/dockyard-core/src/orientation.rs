//! Axis and edge primitives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Main axis of a split container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Children laid out left to right.
    Horizontal,
    /// Children laid out top to bottom.
    Vertical,
}

impl Orientation {
    /// The perpendicular axis.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Orientation of a row nested `depth` levels below the root row.
    ///
    /// Rows alternate by depth parity: the root (depth 0) is horizontal
    /// unless `root_vertical` is set, its child rows take the other axis,
    /// and so on.
    #[must_use]
    pub const fn at_depth(depth: usize, root_vertical: bool) -> Self {
        let even = depth % 2 == 0;
        if even != root_vertical {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => write!(f, "horizontal"),
            Self::Vertical => write!(f, "vertical"),
        }
    }
}

/// One of the four edges of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// All edges in a fixed order.
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    /// Axis along which a band docked against this edge grows.
    ///
    /// A left or right band grows horizontally (its width), a top or bottom
    /// band grows vertically (its height).
    #[must_use]
    pub const fn orientation(self) -> Orientation {
        match self {
            Self::Left | Self::Right => Orientation::Horizontal,
            Self::Top | Self::Bottom => Orientation::Vertical,
        }
    }

    /// Whether this edge sits at the low coordinate of its axis.
    #[must_use]
    pub const fn is_near(self) -> bool {
        matches!(self, Self::Top | Self::Left)
    }

    /// The opposite edge.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Lower-case name used in paths and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    /// Parse a lower-case edge name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|edge| edge.as_str() == name)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
