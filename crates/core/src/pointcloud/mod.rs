//! In-memory point clouds
//!
//! Only what the QA checks consult is kept: the scaled x/y/z of every
//! point. Attributes (intensity, classification, returns) are dropped at
//! read time.

use serde::{Deserialize, Serialize};

/// A single 3D point in the cloud's native coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Planar (x/y) axis-aligned extent of a point set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent2 {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent2 {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Planar area; zero for collinear or coincident points
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// An unordered collection of points, fully loaded in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<Point3>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point3>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point3) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Planar bounding box, `None` for an empty cloud
    pub fn extent_xy(&self) -> Option<Extent2> {
        let first = self.points.first()?;
        let init = Extent2 {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(self.points[1..].iter().fold(init, |e, p| Extent2 {
            min_x: e.min_x.min(p.x),
            min_y: e.min_y.min(p.y),
            max_x: e.max_x.max(p.x),
            max_y: e.max_y.max(p.y),
        }))
    }
}

impl FromIterator<Point3> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}
