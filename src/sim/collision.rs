//! Crash detection
//!
//! A single pixel under the vehicle's reference point decides the crash
//! state. There is no hull: the driving heuristics and reward shaping are
//! tuned against this point check.

use glam::Vec2;

use super::surface::{Palette, TrackSurface};
use super::vehicle::Vehicle;

/// True when `position` is off the raster or on an unsafe color
#[inline]
pub fn check(position: Vec2, surface: &TrackSurface, palette: &Palette) -> bool {
    !surface.category_at(position, palette).is_safe()
}

/// Run the crash check for a vehicle, latching the result.
///
/// Returns true only on the tick the vehicle transitions into the crashed state.
pub fn apply(vehicle: &mut Vehicle, surface: &TrackSurface, palette: &Palette) -> bool {
    if vehicle.crashed {
        return false;
    }
    if check(vehicle.pose.position, surface, palette) {
        vehicle.crash();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::VehicleSettings;
    use crate::sim::surface::Rgb;

    fn surface() -> TrackSurface {
        let mut s = TrackSurface::new(100, 100, Rgb::GRAY);
        for y in 0..100 {
            for x in 60..100 {
                s.set(x, y, Rgb::GREEN);
            }
        }
        s.set(10, 10, Rgb::CYAN);
        s.set(11, 10, Rgb::YELLOW);
        s.set(12, 10, Rgb::WHITE);
        s
    }

    #[test]
    fn test_check_point_categories() {
        let palette = Palette::default();
        let s = surface();
        assert!(!check(Vec2::new(30.0, 30.0), &s, &palette));
        assert!(check(Vec2::new(60.0, 30.0), &s, &palette));
        // Fractional part truncates onto the gray side
        assert!(!check(Vec2::new(59.99, 30.0), &s, &palette));
        // Overlay colors are safe
        assert!(!check(Vec2::new(10.2, 10.7), &s, &palette));
        assert!(!check(Vec2::new(11.0, 10.0), &s, &palette));
        assert!(!check(Vec2::new(12.0, 10.0), &s, &palette));
        // Off the raster
        assert!(check(Vec2::new(-1.0, 30.0), &s, &palette));
        assert!(check(Vec2::new(30.0, 100.0), &s, &palette));
    }

    #[test]
    fn test_apply_latches_once() {
        let palette = Palette::default();
        let s = surface();
        let settings = VehicleSettings {
            start: Vec2::new(70.0, 30.0),
            ..Default::default()
        };
        let mut vehicle = Vehicle::new(&settings);
        vehicle.speed = 3.0;
        assert!(apply(&mut vehicle, &s, &palette));
        assert!(vehicle.crashed);
        assert_eq!(vehicle.speed, 0.0);

        // Moving back onto asphalt does not clear the flag
        vehicle.pose.position = Vec2::new(30.0, 30.0);
        assert!(!apply(&mut vehicle, &s, &palette));
        assert!(vehicle.crashed);
    }
}
