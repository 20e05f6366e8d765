use serde::{Deserialize, Serialize};

/// Answer recorded for a question whose buffer was empty when it closed
pub const NO_ANSWER: &str = "No answer provided";

/// A single interview question
///
/// The question service speaks `{ "question": ..., "time": ... }`, which is
/// accepted through the aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "question")]
    pub text: String,

    /// Seconds the candidate has to answer, once narration is over
    #[serde(alias = "time", default)]
    pub allocated_seconds: u32,
}

impl Question {
    pub fn new(text: impl Into<String>, allocated_seconds: u32) -> Self {
        Self {
            text: text.into(),
            allocated_seconds,
        }
    }
}

/// Drop blank questions and give unbudgeted ones the default allocation
pub fn normalize_questions(questions: Vec<Question>, default_seconds: u32) -> Vec<Question> {
    questions
        .into_iter()
        .filter_map(|q| {
            let text = q.text.trim();
            if text.is_empty() {
                return None;
            }
            let allocated_seconds = if q.allocated_seconds == 0 {
                default_seconds.max(1)
            } else {
                q.allocated_seconds
            };
            Some(Question::new(text, allocated_seconds))
        })
        .collect()
}

/// One question/answer pair of the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Question list requested, nothing running yet
    Loading,
    /// Current question is being spoken; capture is off
    Narrating,
    /// Waiting for the candidate's answer
    Listening,
    /// Closing the current question
    Advancing,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EndReason {
    /// Every question was asked
    Completed,
    /// The overall budget ran out
    OverallTimeout,
    /// The caller ended the session
    EndedByCaller,
    /// No questions could be obtained
    SetupFailed(String),
}

/// Counts reported when an interview finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub total_questions: usize,
    pub questions_answered: usize,
    /// Rounded percentage of questions with a recorded entry
    pub completion_rate: u32,
}

impl CompletionSummary {
    pub fn new(total_questions: usize, questions_answered: usize) -> Self {
        let completion_rate = if total_questions == 0 {
            0
        } else {
            ((questions_answered as f64 / total_questions as f64) * 100.0).round() as u32
        };
        Self {
            total_questions,
            questions_answered,
            completion_rate,
        }
    }
}

/// The aggregate owned by the session state machine
#[derive(Debug, Clone)]
pub struct Session {
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub answers: Vec<QaEntry>,
    pub current_answer_buffer: String,

    /// Latest interim fragment; display only
    pub interim_fragment: String,

    pub overall_remaining_seconds: u32,
    pub per_question_remaining_seconds: u32,
    pub phase: Phase,
    pub end_reason: Option<EndReason>,
}

impl Session {
    pub fn new(duration_minutes: u32) -> Self {
        Self {
            questions: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            current_answer_buffer: String::new(),
            interim_fragment: String::new(),
            overall_remaining_seconds: duration_minutes.saturating_mul(60),
            per_question_remaining_seconds: 0,
            phase: Phase::Loading,
            end_reason: None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// Committed answer text followed by whatever the recognizer is still revising
    pub fn live_transcript_preview(&self) -> String {
        match (
            self.current_answer_buffer.is_empty(),
            self.interim_fragment.is_empty(),
        ) {
            (_, true) => self.current_answer_buffer.clone(),
            (true, false) => self.interim_fragment.clone(),
            (false, false) => format!("{} {}", self.current_answer_buffer, self.interim_fragment),
        }
    }

    /// Append a final recognition fragment to the answer in progress
    pub(crate) fn append_final_fragment(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.current_answer_buffer.is_empty() {
            self.current_answer_buffer.push(' ');
        }
        self.current_answer_buffer.push_str(text);
    }

    pub fn summary(&self) -> CompletionSummary {
        CompletionSummary::new(self.questions.len(), self.answers.len())
    }
}

/// Everything the session produced, handed over once it has ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTranscript {
    pub questions: Vec<Question>,
    pub answers: Vec<QaEntry>,
    pub end_reason: EndReason,
}

impl SessionTranscript {
    pub fn summary(&self) -> CompletionSummary {
        CompletionSummary::new(self.questions.len(), self.answers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_blank_and_fills_budget() {
        let questions = vec![
            Question::new("  Tell me about yourself. ", 45),
            Question::new("   ", 30),
            Question::new("Why this role?", 0),
        ];

        let normalized = normalize_questions(questions, 60);

        assert_eq!(
            normalized,
            vec![
                Question::new("Tell me about yourself.", 45),
                Question::new("Why this role?", 60),
            ]
        );
    }

    #[test]
    fn test_question_accepts_service_field_names() {
        let json = r#"[{ "question": "Walk me through your resume.", "time": 90 }, { "question": "Any questions?" }]"#;

        let questions: Vec<Question> = serde_json::from_str(json).unwrap();

        assert_eq!(questions[0], Question::new("Walk me through your resume.", 90));
        assert_eq!(questions[1].allocated_seconds, 0);
    }

    #[test]
    fn test_final_fragments_are_space_joined() {
        let mut session = Session::new(1);
        session.append_final_fragment("I built ");
        session.append_final_fragment("");
        session.append_final_fragment("a cache.");

        assert_eq!(session.current_answer_buffer, "I built a cache.");
    }

    #[test]
    fn test_live_preview_includes_interim() {
        let mut session = Session::new(1);
        session.interim_fragment = "using red".to_string();
        assert_eq!(session.live_transcript_preview(), "using red");

        session.append_final_fragment("I built a cache");
        assert_eq!(session.live_transcript_preview(), "I built a cache using red");
    }

    #[test]
    fn test_completion_rate_rounds() {
        assert_eq!(CompletionSummary::new(3, 2).completion_rate, 67);
        assert_eq!(CompletionSummary::new(0, 0).completion_rate, 0);
    }
}
