//! Grid geometry - coordinates, directions, bullet paths

use serde::{Deserialize, Serialize};

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Arena bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Number of tiles in a row-major grid of this size
    pub fn area(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// Cardinal movement/firing direction. North is +y, east is +x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Unit offset for one tile of travel
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Shift a point one tile in the given direction
pub fn apply_direction(point: Point, direction: Direction) -> Point {
    let (dx, dy) = direction.offset();
    Point::new(point.x + dx, point.y + dy)
}

/// Whether a point lies inside the arena bounds
pub fn point_in_area(point: Point, area: Size) -> bool {
    point.x >= 0 && point.y >= 0 && point.x < area.width && point.y < area.height
}

/// Whether `target` lies on the ray cast from `start` towards `direction`.
///
/// The start tile itself counts as on the path.
pub fn point_in_path(start: Point, direction: Direction, target: Point) -> bool {
    if start.x != target.x && start.y != target.y {
        return false;
    }
    if start == target {
        return true;
    }

    match direction {
        Direction::North => target.x == start.x && target.y > start.y,
        Direction::East => target.y == start.y && target.x > start.x,
        Direction::South => target.x == start.x && target.y < start.y,
        Direction::West => target.y == start.y && target.x < start.x,
    }
}

/// Manhattan distance between two points
pub fn manhattan_distance(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
