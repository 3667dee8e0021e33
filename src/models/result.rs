use serde::{Deserialize, Serialize};

use super::AnswerMap;

/// The backend's verdict on a submitted attempt.
///
/// `answers` echoes what the client submitted. The backend may omit it,
/// so the store re-attaches the submitted map before publishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResult {
    pub summary: ScoreSummary,
    pub results: Vec<QuestionResult>,
    #[serde(default)]
    pub answers: AnswerMap,
}

/// Aggregate counters of a scoring result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub earned_points: u32,
    pub total_points: u32,
    pub percentage_score: f64,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub total_questions: u32,
}

/// Per-question verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: String,
    pub correct: bool,
    pub points: u32,
    pub possible_points: u32,
}

/// Letter grade for a percentage score.
pub fn grade(percentage: f64) -> char {
    if percentage >= 90.0 {
        'A'
    } else if percentage >= 80.0 {
        'B'
    } else if percentage >= 70.0 {
        'C'
    } else if percentage >= 60.0 {
        'D'
    } else {
        'F'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_parses_without_answers() {
        let json = r#"{
            "summary": {
                "earnedPoints": 3,
                "totalPoints": 5,
                "percentageScore": 60,
                "correctCount": 2,
                "incorrectCount": 1,
                "totalQuestions": 3
            },
            "results": [
                {"questionId": "q1", "correct": true, "points": 2, "possiblePoints": 2}
            ]
        }"#;
        let result: ScoringResult = serde_json::from_str(json).unwrap();
        assert!(result.answers.is_empty());
        assert_eq!(result.summary.correct_count, 2);
        assert_eq!(result.results[0].question_id, "q1");
    }

    #[test]
    fn grade_boundaries() {
        assert_eq!(grade(95.0), 'A');
        assert_eq!(grade(90.0), 'A');
        assert_eq!(grade(89.9), 'B');
        assert_eq!(grade(70.0), 'C');
        assert_eq!(grade(60.0), 'D');
        assert_eq!(grade(59.9), 'F');
    }
}
