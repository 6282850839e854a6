use crate::{Error, Result};
use dream_heatmap_core::Axis;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type EuclidRect = euclid::Rect<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

/// An axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Edges count as inside.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        self.x <= px && px <= self.right() && self.y <= py && py <= self.bottom()
    }

    pub fn to_euclid(self) -> EuclidRect {
        EuclidRect::new(point(self.x, self.y), Size::new(self.width, self.height))
    }

    pub fn from_euclid(r: EuclidRect) -> Self {
        Self::new(r.origin.x, r.origin.y, r.size.width, r.size.height)
    }

    /// Smallest rectangle covering both; an empty side is ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        Self::from_euclid(self.to_euclid().union(&other.to_euclid()))
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.to_euclid().intersects(&other.to_euclid())
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        self.to_euclid()
            .intersection(&other.to_euclid())
            .map(Self::from_euclid)
    }
}

/// A side of the heatmap rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    pub fn as_str(self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }

    /// The axis whose items run along this edge: rows for left/right, columns for top/bottom.
    pub fn axis(self) -> Axis {
        match self {
            Edge::Left | Edge::Right => Axis::Row,
            Edge::Top | Edge::Bottom => Axis::Col,
        }
    }

    pub fn parse_for(axis: Axis, value: &str) -> Result<Self> {
        let edge: Edge = value.parse()?;
        if edge.axis() == axis {
            Ok(edge)
        } else {
            Err(Error::UnknownSide {
                side: value.to_string(),
                axis,
            })
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Edge {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Edge::Left),
            "right" => Ok(Edge::Right),
            "top" => Ok(Edge::Top),
            "bottom" => Ok(Edge::Bottom),
            other => Err(Error::UnknownEdge {
                edge: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 2.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 15.0, 10.0));
        assert!(a.intersects(&b));
        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 5.0, 2.0)));
        assert!(!a.intersects(&Rect::new(20.0, 0.0, 1.0, 1.0)));
        assert!(a.contains(10.0, 0.0));
    }
}
