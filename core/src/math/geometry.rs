use crate::pose_interface::Landmark;

pub struct GeometryHelper;

impl GeometryHelper {
    /// Angle in degrees at vertex `b` between the rays b->a and b->c,
    /// computed on the 2D projection.
    ///
    /// Fails closed: degenerate input (zero-length ray or non-finite
    /// coordinate) yields 0.0 instead of propagating a fault.
    pub fn joint_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f32 {
        let coords = [a.x, a.y, b.x, b.y, c.x, c.y];
        if coords.iter().any(|v| !v.is_finite()) {
            return 0.0;
        }

        let ba = (a.x - b.x, a.y - b.y);
        let bc = (c.x - b.x, c.y - b.y);
        let norm_ba = (ba.0 * ba.0 + ba.1 * ba.1).sqrt();
        let norm_bc = (bc.0 * bc.0 + bc.1 * bc.1).sqrt();
        if norm_ba == 0.0 || norm_bc == 0.0 {
            return 0.0;
        }

        let cosine = (ba.0 * bc.0 + ba.1 * bc.1) / (norm_ba * norm_bc);
        cosine.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Planar Euclidean distance between two landmarks; same fail-closed
    /// contract as `joint_angle`.
    pub fn planar_distance(p: &Landmark, q: &Landmark) -> f32 {
        if [p.x, p.y, q.x, q.y].iter().any(|v| !v.is_finite()) {
            return 0.0;
        }
        let dx = p.x - q.x;
        let dy = p.y - q.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Absolute orientation in degrees of the vector `from` -> `to`,
    /// measured from the horizontal. Fails closed to 0.0.
    pub fn segment_incline(from: (f32, f32), to: (f32, f32)) -> f32 {
        let incline = (to.1 - from.1).atan2(to.0 - from.0).to_degrees().abs();
        if incline.is_finite() {
            incline
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32, y: f32) -> Landmark {
        Landmark {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }

    #[test]
    fn straight_line_measures_180() {
        let angle = GeometryHelper::joint_angle(&point(0.0, 0.0), &point(0.5, 0.0), &point(1.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn right_angle_measures_90() {
        let angle = GeometryHelper::joint_angle(&point(0.0, 0.0), &point(0.5, 0.0), &point(0.5, 0.5));
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn joint_angle_is_symmetric_and_bounded() {
        let a = point(0.12, 0.77);
        let b = point(0.43, 0.31);
        let c = point(0.91, 0.58);
        let forward = GeometryHelper::joint_angle(&a, &b, &c);
        let reversed = GeometryHelper::joint_angle(&c, &b, &a);
        assert!((forward - reversed).abs() < 1e-4);
        assert!((0.0..=180.0).contains(&forward));
    }

    #[test]
    fn degenerate_rays_fail_closed() {
        let b = point(0.5, 0.5);
        assert_eq!(GeometryHelper::joint_angle(&b, &b, &point(0.9, 0.9)), 0.0);
        assert_eq!(GeometryHelper::joint_angle(&point(0.1, 0.1), &b, &b), 0.0);
        assert_eq!(
            GeometryHelper::joint_angle(&point(f32::NAN, 0.0), &b, &point(0.9, 0.9)),
            0.0
        );
    }

    #[test]
    fn planar_distance_matches_pythagoras() {
        let d = GeometryHelper::planar_distance(&point(0.0, 0.0), &point(0.3, 0.4));
        assert!((d - 0.5).abs() < 1e-6);
        assert_eq!(
            GeometryHelper::planar_distance(&point(f32::INFINITY, 0.0), &point(0.0, 0.0)),
            0.0
        );
    }

    #[test]
    fn segment_incline_reads_vertical_as_90() {
        assert!((GeometryHelper::segment_incline((0.5, 0.8), (0.5, 0.3)) - 90.0).abs() < 1e-3);
        assert!(GeometryHelper::segment_incline((0.2, 0.6), (0.8, 0.6)) < 1e-3);
    }
}
