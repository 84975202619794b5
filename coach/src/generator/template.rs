use formcore::pose_interface::{Landmark, LANDMARK_COUNT};

/// Neutral landmark scaffold the profile builders position joint-by-joint.
pub fn neutral_pose() -> Vec<Landmark> {
    vec![
        Landmark {
            x: 0.5,
            y: 0.5,
            z: 0.0,
            visibility: 1.0,
        };
        LANDMARK_COUNT
    ]
}
