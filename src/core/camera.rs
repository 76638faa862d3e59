//! Hero-Kamera: NDC→Welt-Strahlen für die Pointer-Ebenen-Modi.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Perspektivische Kamera mit vorberechneter inverser View-Projection.
#[derive(Debug, Clone)]
pub struct HeroCamera {
    pub position: Vec3,
    pub look_at: Vec3,
    inverse_view_proj: Mat4,
}

impl HeroCamera {
    /// Baut die Kamera aus der Konfiguration und dem Seitenverhältnis.
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let position = Vec3::from_array(config.position);
        let look_at = Vec3::from_array(config.look_at);
        let projection = Mat4::perspective_rh(
            config.fov.to_radians(),
            aspect.max(1e-3),
            config.near,
            config.far,
        );
        let view = Mat4::look_at_rh(position, look_at, Vec3::Y);
        Self {
            position,
            look_at,
            inverse_view_proj: (projection * view).inverse(),
        }
    }

    /// Normierte Blickrichtung.
    pub fn view_direction(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or_zero()
    }

    /// Normierte Strahlrichtung durch den NDC-Punkt `(ndc_x, ndc_y)`.
    pub fn ndc_ray_direction(&self, ndc_x: f32, ndc_y: f32) -> Vec3 {
        let point = self
            .inverse_view_proj
            .project_point3(Vec3::new(ndc_x, ndc_y, 0.5));
        (point - self.position).normalize_or_zero()
    }

    /// Schnitt des NDC-Strahls mit einer Ebene.
    ///
    /// Bei (nahezu) parallelem Strahl oder Schnitt hinter der Kamera fällt
    /// das Ergebnis auf den Ebenen-Ankerpunkt zurück.
    pub fn intersect_plane(
        &self,
        ndc_x: f32,
        ndc_y: f32,
        plane_point: Vec3,
        plane_normal: Vec3,
    ) -> Vec3 {
        let direction = self.ndc_ray_direction(ndc_x, ndc_y);
        let denom = direction.dot(plane_normal);
        if denom.abs() < 1e-6 {
            return plane_point;
        }
        let t = (plane_point - self.position).dot(plane_normal) / denom;
        if !t.is_finite() {
            return plane_point;
        }
        self.position + direction * t.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn front_camera() -> HeroCamera {
        let config = CameraConfig {
            position: [0.0, 0.0, 5.0],
            look_at: [0.0, 0.0, 0.0],
            fov: 45.0,
            near: 0.1,
            far: 50.0,
        };
        HeroCamera::from_config(&config, 16.0 / 9.0)
    }

    #[test]
    fn test_center_ray_matches_view_direction() {
        let camera = front_camera();
        let ray = camera.ndc_ray_direction(0.0, 0.0);
        assert_relative_eq!(ray.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(ray.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(ray.z, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_center_ray_hits_world_z_plane_at_origin() {
        let camera = front_camera();
        let hit = camera.intersect_plane(0.0, 0.0, Vec3::ZERO, Vec3::Z);
        assert_relative_eq!(hit.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(hit.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(hit.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_offset_ndc_hits_plane_off_axis() {
        let camera = front_camera();
        let hit = camera.intersect_plane(0.5, 0.5, Vec3::ZERO, Vec3::Z);
        assert!(hit.x > 0.0);
        assert!(hit.y > 0.0);
        assert_relative_eq!(hit.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_parallel_ray_falls_back_to_plane_point() {
        let camera = front_camera();
        let anchor = Vec3::new(0.3, 0.7, 0.0);
        // Ebene senkrecht zum Blick auf Y ausgerichtet; der zentrale Strahl
        // verläuft parallel dazu.
        let hit = camera.intersect_plane(0.0, 0.0, anchor, Vec3::Y);
        assert_relative_eq!(hit.x, anchor.x);
        assert_relative_eq!(hit.y, anchor.y);
        assert_relative_eq!(hit.z, anchor.z);
    }
}
