//! Track layout and rasterization
//!
//! A track is a ring: everything inside the outer boundary and outside the
//! inner boundary is asphalt. The layout is painted once into a
//! [`TrackSurface`]; frames for display get overlays painted on a copy.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::checkpoint::{CheckpointProgress, Gates};
use super::sensor::SensorReadings;
use super::surface::{Palette, Rgb, TrackSurface};
use super::vehicle::Vehicle;
use crate::consts::{TRACK_HEIGHT, TRACK_WIDTH};
use crate::error::ConfigError;

/// Boundary line thickness
const BOUNDARY_THICKNESS: f32 = 2.0;
/// Start line thickness
const START_LINE_THICKNESS: f32 = 4.0;

/// One edge of the track ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Boundary {
    /// Closed polygon, vertices in order
    Polygon { points: Vec<Vec2> },
    /// Axis-aligned ellipse
    Ellipse { center: Vec2, radii: Vec2 },
}

impl Boundary {
    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        let ok = match self {
            Boundary::Polygon { points } => points.len() >= 3,
            Boundary::Ellipse { radii, .. } => radii.x > 0.0 && radii.y > 0.0,
        };
        if ok { Ok(()) } else { Err(ConfigError::EmptyBoundary(name)) }
    }

    fn fill(&self, surface: &mut TrackSurface, color: Rgb) {
        match self {
            Boundary::Polygon { points } => surface.fill_polygon(points, color),
            Boundary::Ellipse { center, radii } => surface.fill_ellipse(*center, *radii, color),
        }
    }

    fn outline(&self, surface: &mut TrackSurface, color: Rgb) {
        match self {
            Boundary::Polygon { points } => {
                surface.draw_polyline(points, true, BOUNDARY_THICKNESS, color)
            }
            Boundary::Ellipse { center, radii } => {
                let points: Vec<Vec2> = (0..96)
                    .map(|i| {
                        let t = i as f32 / 96.0 * std::f32::consts::TAU;
                        *center + Vec2::new(t.cos(), t.sin()) * *radii
                    })
                    .collect();
                surface.draw_polyline(&points, true, BOUNDARY_THICKNESS, color);
            }
        }
    }
}

fn to_points(pts: &[(f32, f32)]) -> Vec<Vec2> {
    pts.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
}

/// Geometry of the drivable ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    pub width: u32,
    pub height: u32,
    pub outer: Boundary,
    pub inner: Boundary,
    /// Painted start/finish line (cosmetic, drawn in the boundary color)
    #[serde(default)]
    pub start_line: Option<(Vec2, Vec2)>,
}

impl Default for TrackLayout {
    fn default() -> Self {
        let outer = [
            (400.0, 150.0), (500.0, 130.0), (600.0, 120.0), (700.0, 140.0),
            (750.0, 200.0), (780.0, 300.0), (750.0, 400.0), (700.0, 460.0),
            (600.0, 480.0), (500.0, 470.0), (400.0, 450.0), (320.0, 400.0),
            (300.0, 300.0), (320.0, 200.0),
        ];
        let inner = [
            (450.0, 200.0), (530.0, 185.0), (610.0, 180.0), (680.0, 190.0),
            (710.0, 240.0), (730.0, 300.0), (710.0, 370.0), (680.0, 420.0),
            (600.0, 430.0), (520.0, 420.0), (440.0, 400.0), (380.0, 360.0),
            (370.0, 300.0), (380.0, 240.0),
        ];
        Self {
            width: TRACK_WIDTH,
            height: TRACK_HEIGHT,
            outer: Boundary::Polygon { points: to_points(&outer) },
            inner: Boundary::Polygon { points: to_points(&inner) },
            start_line: Some((Vec2::new(400.0, 150.0), Vec2::new(450.0, 200.0))),
        }
    }
}

impl TrackLayout {
    /// An elliptical ring centered on the raster
    pub fn oval(width: u32, height: u32, outer_radii: Vec2, inner_radii: Vec2) -> Self {
        let center = Vec2::new(width as f32 / 2.0, height as f32 / 2.0);
        Self {
            width,
            height,
            outer: Boundary::Ellipse { center, radii: outer_radii },
            inner: Boundary::Ellipse { center, radii: inner_radii },
            start_line: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidRaster {
                width: self.width,
                height: self.height,
                len: 0,
            });
        }
        self.outer.validate("outer")?;
        self.inner.validate("inner")
    }

    /// Paint the layout into a fresh surface
    pub fn rasterize(&self, palette: &Palette) -> TrackSurface {
        let mut surface = TrackSurface::new(self.width, self.height, palette.background);
        self.outer.fill(&mut surface, palette.surface);
        self.inner.fill(&mut surface, palette.background);
        self.outer.outline(&mut surface, palette.boundary);
        self.inner.outline(&mut surface, palette.boundary);
        if let Some((a, b)) = self.start_line {
            surface.draw_line(a, b, START_LINE_THICKNESS, palette.boundary);
        }
        surface
    }
}

/// Paint sensor rays, gates and the vehicle onto a display frame.
///
/// Gates go last so they stay visible over rays. The simulation never samples
/// a frame produced here.
pub fn draw_overlay(
    frame: &mut TrackSurface,
    vehicle: &Vehicle,
    readings: &SensorReadings,
    gates: &Gates,
    progress: &CheckpointProgress,
) {
    let origin = vehicle.pose.position;
    for &end in readings.endpoints() {
        frame.draw_line(origin, end.as_vec2(), 2.0, Rgb::CYAN);
        frame.draw_disc(end.as_vec2(), 3.0, Rgb::YELLOW);
    }

    frame.draw_disc(origin, 5.0, Rgb::RED);

    for (i, gate) in gates.iter().enumerate() {
        let color = if i == progress.gate_index { Rgb::YELLOW } else { Rgb::DIM };
        frame.draw_line(gate.start, gate.end, 2.0, color);
    }
}
