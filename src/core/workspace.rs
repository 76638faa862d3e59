//! Projektion von Zielpunkten in den erreichbaren Arbeitsraum.

use glam::Vec3;

use crate::config::WorkspaceConfig;

/// Klemmt `target` in die konfigurierten Grenzen.
///
/// Reihenfolge: erst die Achsen-Box, dann radial zur Basis hinein
/// (Maximalradius), dann radial hinaus (Minimalradius). Das Ergebnis ist
/// idempotent: ein bereits geklemmter Punkt bleibt unverändert.
pub fn clamp_target(target: Vec3, workspace: &WorkspaceConfig, base: Vec3) -> Vec3 {
    let mut point = target;

    if let Some(min_x) = workspace.min_x {
        point.x = point.x.max(min_x);
    }
    if let Some(max_x) = workspace.max_x {
        point.x = point.x.min(max_x);
    }
    if let Some(min_y) = workspace.min_y {
        point.y = point.y.max(min_y);
    }
    if let Some(max_y) = workspace.max_y {
        point.y = point.y.min(max_y);
    }
    if let Some(min_z) = workspace.min_z {
        point.z = point.z.max(min_z);
    }
    if let Some(max_z) = workspace.max_z {
        point.z = point.z.min(max_z);
    }

    if let Some(radius) = workspace.radius {
        let offset = point - base;
        let dist = offset.length();
        if dist > radius && dist > 0.0 {
            point = base + offset * (radius / dist);
        }
    }

    if let Some(min_radius) = workspace.min_radius {
        let offset = point - base;
        let dist = offset.length();
        if dist < min_radius && dist > 0.0 {
            point = base + offset * (min_radius / dist);
        }
    }

    point
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounded() -> WorkspaceConfig {
        WorkspaceConfig {
            min_x: Some(-2.0),
            max_x: Some(2.0),
            min_y: Some(0.0),
            max_y: Some(2.0),
            min_z: Some(-2.0),
            max_z: Some(2.0),
            radius: None,
            min_radius: None,
        }
    }

    #[test]
    fn test_box_clamp() {
        let clamped = clamp_target(Vec3::new(10.0, 10.0, 10.0), &bounded(), Vec3::ZERO);
        assert_relative_eq!(clamped.x, 2.0);
        assert_relative_eq!(clamped.y, 2.0);
        assert_relative_eq!(clamped.z, 2.0);
    }

    #[test]
    fn test_max_radius_rescales_towards_base() {
        let workspace = WorkspaceConfig {
            radius: Some(1.0),
            ..Default::default()
        };
        let clamped = clamp_target(Vec3::new(3.0, 0.0, 4.0), &workspace, Vec3::ZERO);
        assert_relative_eq!(clamped.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(clamped.x, 0.6, epsilon = 1e-5);
        assert_relative_eq!(clamped.z, 0.8, epsilon = 1e-5);
    }

    #[test]
    fn test_min_radius_pushes_outwards() {
        let workspace = WorkspaceConfig {
            min_radius: Some(0.5),
            ..Default::default()
        };
        let clamped = clamp_target(Vec3::new(0.1, 0.0, 0.0), &workspace, Vec3::ZERO);
        assert_relative_eq!(clamped.x, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let workspace = WorkspaceConfig {
            radius: Some(1.5),
            min_radius: Some(0.3),
            ..bounded()
        };
        let base = Vec3::new(0.1, 0.0, -0.2);
        let points = [
            Vec3::new(5.0, -3.0, 2.5),
            Vec3::new(0.1, 0.05, -0.2),
            Vec3::new(-4.0, 1.0, 4.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        for point in points {
            let once = clamp_target(point, &workspace, base);
            let twice = clamp_target(once, &workspace, base);
            assert_relative_eq!(once.x, twice.x, epsilon = 1e-5);
            assert_relative_eq!(once.y, twice.y, epsilon = 1e-5);
            assert_relative_eq!(once.z, twice.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_unbounded_workspace_is_noop() {
        let point = Vec3::new(7.0, -7.0, 7.0);
        let clamped = clamp_target(point, &WorkspaceConfig::default(), Vec3::ZERO);
        assert_eq!(clamped, point);
    }
}
