//! Track surface raster and color classification
//!
//! The track is a plain RGB bitmap. Whether a point can be driven on is
//! decided purely from the color under it, matched against a palette with a
//! per-channel tolerance. Position never enters into the classification.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::COLOR_TOLERANCE;
use crate::error::ConfigError;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GRAY: Rgb = Rgb::new(60, 60, 60);
    pub const GREEN: Rgb = Rgb::new(40, 120, 40);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);
    /// Inactive gate line
    pub const DIM: Rgb = Rgb::new(100, 100, 100);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// True when every channel differs by at most `tolerance`
    #[inline]
    pub fn is_similar(self, other: Rgb, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
    }
}

/// What a raster cell represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Asphalt
    Drivable,
    /// Painted boundary / start line (still driveable)
    Boundary,
    /// Grass, or anywhere outside the raster
    OffTrack,
    /// Overlay markers (gates, sensor rays); safe to stand on, opaque to rays
    GateMarker,
}

impl Category {
    /// Rays pass through this category
    #[inline]
    pub fn is_ray_clear(self) -> bool {
        matches!(self, Category::Drivable | Category::Boundary)
    }

    /// The vehicle may occupy this category without crashing
    #[inline]
    pub fn is_safe(self) -> bool {
        !matches!(self, Category::OffTrack)
    }
}

/// Colors used to paint and classify the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Driveable asphalt
    pub surface: Rgb,
    /// Boundary lines
    pub boundary: Rgb,
    /// Overlay colors that must not register as a crash
    pub markers: Vec<Rgb>,
    /// Off-track fill
    pub background: Rgb,
    /// Per-channel tolerance applied to every match
    pub tolerance: u8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            surface: Rgb::GRAY,
            boundary: Rgb::WHITE,
            markers: vec![Rgb::CYAN, Rgb::YELLOW],
            background: Rgb::GREEN,
            tolerance: COLOR_TOLERANCE,
        }
    }
}

impl Palette {
    /// Classify a color
    pub fn classify(&self, color: Rgb) -> Category {
        if color.is_similar(self.surface, self.tolerance) {
            Category::Drivable
        } else if color.is_similar(self.boundary, self.tolerance) {
            Category::Boundary
        } else if self
            .markers
            .iter()
            .any(|&m| color.is_similar(m, self.tolerance))
        {
            Category::GateMarker
        } else {
            Category::OffTrack
        }
    }
}

/// A rasterized track, row-major, origin at the top-left
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSurface {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl TrackSurface {
    /// Create a surface filled with one color
    pub fn new(width: u32, height: u32, fill: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Wrap an existing pixel buffer
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return Err(ConfigError::InvalidRaster {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            None
        } else {
            Some(y as usize * self.width as usize + x as usize)
        }
    }

    /// Color at integer pixel coordinates, `None` when off the raster
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<Rgb> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a pixel; writes off the raster are dropped
    #[inline]
    pub fn set(&mut self, x: i64, y: i64, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Color under a continuous point (coordinates truncated toward zero)
    #[inline]
    pub fn sample(&self, point: Vec2) -> Option<Rgb> {
        let (x, y) = truncate(point);
        self.get(x, y)
    }

    /// Category under a continuous point; off-raster is always `OffTrack`
    pub fn category_at(&self, point: Vec2, palette: &Palette) -> Category {
        self.sample(point)
            .map_or(Category::OffTrack, |c| palette.classify(c))
    }

    /// True when rays may pass through this point
    #[inline]
    pub fn is_drivable(&self, point: Vec2, palette: &Palette) -> bool {
        self.category_at(point, palette).is_ray_clear()
    }

    /// Fill the whole surface
    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Fill a polygon using the even-odd rule, sampling pixel centers
    pub fn fill_polygon(&mut self, points: &[Vec2], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for y in 0..self.height as i64 {
            let sy = y as f32 + 0.5;
            crossings.clear();
            for (i, &a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                // Half-open so shared vertices count once
                if (a.y <= sy) != (b.y <= sy) {
                    let t = (sy - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks_exact(2) {
                // Pixel x is inside when its center lies in [x0, x1)
                let x0 = (pair[0] - 0.5).ceil().max(0.0) as i64;
                let x1 = ((pair[1] - 0.5).ceil() as i64).min(self.width as i64);
                for x in x0..x1 {
                    self.set(x, y, color);
                }
            }
        }
    }

    /// Fill an axis-aligned ellipse
    pub fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Rgb) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let (x0, y0, x1, y1) = self.clip_box(center - radii, center + radii);
        for y in y0..y1 {
            for x in x0..x1 {
                let d = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center) / radii;
                if d.length_squared() <= 1.0 {
                    self.set(x, y, color);
                }
            }
        }
    }

    /// Draw a line segment of the given thickness
    pub fn draw_line(&mut self, a: Vec2, b: Vec2, thickness: f32, color: Rgb) {
        let half = (thickness / 2.0).max(0.5);
        let pad = Vec2::splat(half + 1.0);
        let (x0, y0, x1, y1) = self.clip_box(a.min(b) - pad, a.max(b) + pad);
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(p, a, b) <= half {
                    self.set(x, y, color);
                }
            }
        }
    }

    /// Draw connected line segments, optionally closing the loop
    pub fn draw_polyline(&mut self, points: &[Vec2], closed: bool, thickness: f32, color: Rgb) {
        for pair in points.windows(2) {
            self.draw_line(pair[0], pair[1], thickness, color);
        }
        if closed && points.len() > 2 {
            self.draw_line(points[points.len() - 1], points[0], thickness, color);
        }
    }

    /// Draw a filled disc
    pub fn draw_disc(&mut self, center: Vec2, radius: f32, color: Rgb) {
        self.fill_ellipse(center, Vec2::splat(radius), color);
    }

    /// Pixel bounds covering [min, max], clipped to the raster
    fn clip_box(&self, min: Vec2, max: Vec2) -> (i64, i64, i64, i64) {
        let x0 = (min.x.floor() as i64).max(0);
        let y0 = (min.y.floor() as i64).max(0);
        let x1 = (max.x.ceil() as i64 + 1).min(self.width as i64);
        let y1 = (max.y.ceil() as i64 + 1).min(self.height as i64);
        (x0, y0, x1, y1)
    }
}

/// Truncate a point to integer pixel indices (toward zero)
#[inline]
pub fn truncate(point: Vec2) -> (i64, i64) {
    (point.x as i64, point.y as i64)
}

/// Distance from `p` to segment `ab`
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
