use std::fmt;

use serde::{Deserialize, Serialize};

/// Movement patterns the classifier can discriminate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Squat,
    PushUp,
    Lunge,
    Unknown,
}

/// Label emitted on the result record; extends `ExerciseType` with the
/// unexpected-fault label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseLabel {
    Squat,
    PushUp,
    Lunge,
    Unknown,
    Error,
}

impl From<ExerciseType> for ExerciseLabel {
    fn from(exercise: ExerciseType) -> Self {
        match exercise {
            ExerciseType::Squat => Self::Squat,
            ExerciseType::PushUp => Self::PushUp,
            ExerciseType::Lunge => Self::Lunge,
            ExerciseType::Unknown => Self::Unknown,
        }
    }
}

impl fmt::Display for ExerciseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Squat => "squat",
            Self::PushUp => "push_up",
            Self::Lunge => "lunge",
            Self::Unknown => "unknown",
            Self::Error => "error",
        };
        f.write_str(token)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisQuality {
    High,
    Medium,
}

/// Structured verdict emitted once per analyzed session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub exercise_name: ExerciseLabel,
    pub rep_count: u32,
    pub feedback: Vec<String>,
    pub form_score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_quality: Option<AnalysisQuality>,
}

impl AnalysisResult {
    /// Renders the record as JSON. Falls back to a minimal schema-valid
    /// error record so no fault ever crosses the boundary.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            String::from(
                "{\"exerciseName\":\"error\",\"repCount\":0,\
                 \"feedback\":[\"Analysis failed: serialization\"],\"formScore\":0.0}",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_use_wire_spellings() {
        assert_eq!(serde_json::to_string(&ExerciseLabel::PushUp).unwrap(), "\"push_up\"");
        assert_eq!(serde_json::to_string(&ExerciseLabel::Error).unwrap(), "\"error\"");
        assert_eq!(ExerciseLabel::PushUp.to_string(), "push_up");
    }

    #[test]
    fn result_serializes_camel_case_and_skips_missing_quality() {
        let result = AnalysisResult {
            exercise_name: ExerciseLabel::Unknown,
            rep_count: 0,
            feedback: vec!["Could not detect pose in video".to_string()],
            form_score: 0.0,
            analysis_quality: None,
        };
        assert_eq!(
            result.to_json(),
            "{\"exerciseName\":\"unknown\",\"repCount\":0,\
             \"feedback\":[\"Could not detect pose in video\"],\"formScore\":0.0}"
        );
    }

    #[test]
    fn result_includes_quality_when_present() {
        let result = AnalysisResult {
            exercise_name: ExerciseLabel::Squat,
            rep_count: 2,
            feedback: vec!["Excellent squat form! Keep it up!".to_string()],
            form_score: 10.0,
            analysis_quality: Some(AnalysisQuality::High),
        };
        assert!(result.to_json().contains("\"analysisQuality\":\"high\""));
        assert!(result.to_json().contains("\"formScore\":10.0"));
    }
}
