use std::sync::Mutex;

use pretty_assertions::assert_eq;
use viva_ai::embeddings::Embedder;
use viva_ai::llm::Llm;
use viva_ai::session::Examiner;
use viva_core::config::VivaConfig;
use viva_core::domain::Verdict;
use viva_core::error::AppError;

/// Letter histogram over `a..=z`.
struct LetterEmbedder;

impl Embedder for LetterEmbedder {
    fn embed(&self, _model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        let mut v = vec![0f32; 26];
        for ch in input.chars().flat_map(|c| c.to_lowercase()) {
            if ch.is_ascii_lowercase() {
                v[(ch as u8 - b'a') as usize] += 1.0;
            }
        }
        Ok(v)
    }
}

/// Answers question prompts with `questions`, everything else with `evaluation`.
struct ScriptedLlm {
    questions: String,
    evaluation: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn new(questions: &str, evaluation: &str) -> Self {
        Self {
            questions: questions.to_string(),
            evaluation: evaluation.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("lock").clone()
    }
}

impl Llm for ScriptedLlm {
    fn generate(&self, _model: &str, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        if prompt.contains("viva voce examiner") {
            Ok(self.questions.clone())
        } else {
            Ok(self.evaluation.clone())
        }
    }
}

const PAPER: &str = "The proposed model removes recurrence entirely and relies on attention to relate every position of a sequence. \
Training ran on eight accelerators for three days with a warmup schedule followed by inverse square root decay. \
A limitation is that memory grows quadratically with sequence length, which restricts the usable context window.";

fn config(num_questions: usize) -> VivaConfig {
    let mut cfg = VivaConfig::default();
    cfg.exam.num_questions = num_questions;
    cfg
}

#[test]
fn full_exam_flow_scores_every_answer() {
    let llm = ScriptedLlm::new(
        "Here are your questions:\n1. Why remove recurrence?\n2. How was training scheduled?\n3. What limits the context?",
        "Score: 7\nVerdict: Partially Correct\nExplanation: Misses the decay schedule.",
    );
    let cfg = config(3);
    let examiner = Examiner::new(&LetterEmbedder, &llm, &cfg);

    let mut session = examiner.prepare_from_text(PAPER).expect("prepare");
    assert_eq!(
        session.questions(),
        &[
            "Why remove recurrence?".to_string(),
            "How was training scheduled?".to_string(),
            "What limits the context?".to_string(),
        ]
    );
    assert_eq!(session.current_question(), Some("Why remove recurrence?"));
    assert_eq!(session.max_score(), 30);
    assert_eq!(llm.prompts().len(), 1);

    for i in 0..3 {
        let record = examiner
            .submit_answer(&mut session, "  Attention lets every position see every other.  ")
            .expect("submit");
        assert_eq!(record.score, 7);
        assert_eq!(record.answer, "Attention lets every position see every other.");
        assert_eq!(session.progress(), (i + 1, 3));
        session.advance().expect("advance");
    }

    assert!(session.is_complete());
    assert_eq!(session.current_question(), None);
    assert_eq!(session.total_score(), 21);
    assert_eq!(llm.prompts().len(), 4);

    let transcript = session.transcript();
    assert_eq!(transcript.entries.len(), 3);
    assert_eq!(transcript.total_score, 21);
    assert_eq!(transcript.max_score, 30);
    assert_eq!(transcript.entries[1].question, "How was training scheduled?");
    assert_eq!(transcript.entries[1].formatted.score, "7");
    assert_eq!(transcript.entries[1].formatted.verdict, "Partially Correct");
    assert_eq!(transcript.entries[1].verdict, Some(Verdict::PartiallyCorrect));
    assert_eq!(
        transcript.entries[1].formatted.explanation,
        "Misses the decay schedule."
    );
}

#[test]
fn evaluation_prompt_uses_current_question() {
    let llm = ScriptedLlm::new("1. Why remove recurrence?", "Score: 9");
    let cfg = config(1);
    let examiner = Examiner::new(&LetterEmbedder, &llm, &cfg);

    let mut session = examiner.prepare_from_text(PAPER).expect("prepare");
    examiner
        .submit_answer(&mut session, "Recurrence blocks parallelism.")
        .expect("submit");

    let prompts = llm.prompts();
    let eval = &prompts[1];
    assert!(eval.contains("QUESTION:\nWhy remove recurrence?\n"));
    assert!(eval.contains("STUDENT ANSWER:\nRecurrence blocks parallelism.\n"));
    assert!(eval.contains(session.chunks()[0].as_str()));

    let transcript = session.transcript();
    assert_eq!(transcript.entries[0].verdict, None);
    assert_eq!(transcript.entries[0].formatted.verdict, "N/A");
}

#[test]
fn theme_context_is_not_repeated() {
    let llm = ScriptedLlm::new("1. Why?", "Score: 1");
    let cfg = config(1);
    let examiner = Examiner::new(&LetterEmbedder, &llm, &cfg);

    let session = examiner.prepare_from_text(PAPER).expect("prepare");
    assert_eq!(session.chunks().len(), 1);

    let prompt = &llm.prompts()[0];
    assert_eq!(prompt.matches(session.chunks()[0].as_str()).count(), 1);
}

#[test]
fn unnumbered_output_yields_no_questions() {
    let llm = ScriptedLlm::new("I cannot produce questions for this paper.", "Score: 1");
    let cfg = config(5);
    let examiner = Examiner::new(&LetterEmbedder, &llm, &cfg);

    let mut session = examiner.prepare_from_text(PAPER).expect("prepare");
    assert!(session.questions().is_empty());
    assert_eq!(session.questions_raw(), "I cannot produce questions for this paper.");
    assert!(session.is_complete());
    assert_eq!(session.max_score(), 0);

    let err = examiner
        .submit_answer(&mut session, "a long enough answer")
        .unwrap_err();
    assert_eq!(err.code, "VIVA_COMPLETE");
}

#[test]
fn short_text_is_rejected_before_any_model_call() {
    let llm = ScriptedLlm::new("1. Why?", "Score: 1");
    let cfg = config(1);
    let examiner = Examiner::new(&LetterEmbedder, &llm, &cfg);

    let err = examiner.prepare_from_text("Too short to chunk.").unwrap_err();
    assert_eq!(err.code, "VIVA_DOCUMENT_EMPTY");
    assert!(llm.prompts().is_empty());
}

#[test]
fn answer_rules_are_enforced() {
    let llm = ScriptedLlm::new("1. First?\n2. Second?", "Score: 4\nVerdict: Incorrect");
    let cfg = config(2);
    let examiner = Examiner::new(&LetterEmbedder, &llm, &cfg);
    let mut session = examiner.prepare_from_text(PAPER).expect("prepare");

    let err = session.advance().unwrap_err();
    assert_eq!(err.code, "VIVA_NOT_ANSWERED");

    let err = examiner.submit_answer(&mut session, "   too short   ").unwrap_err();
    assert_eq!(err.code, "VIVA_ANSWER_TOO_SHORT");
    assert!(session.history().is_empty());
    assert!(!session.is_current_answered());

    examiner
        .submit_answer(&mut session, "a sufficiently long answer")
        .expect("submit");
    assert!(session.is_current_answered());

    let err = examiner
        .submit_answer(&mut session, "a second attempt at the answer")
        .unwrap_err();
    assert_eq!(err.code, "VIVA_ALREADY_ANSWERED");
    assert_eq!(session.history().len(), 1);

    assert_eq!(session.advance().expect("advance"), Some("Second?"));
    assert_eq!(session.current_index(), 1);
    examiner
        .submit_answer(&mut session, "another long answer")
        .expect("submit");
    assert_eq!(session.advance().expect("advance"), None);

    let err = session.advance().unwrap_err();
    assert_eq!(err.code, "VIVA_COMPLETE");
    assert_eq!(session.total_score(), 8);
}

#[test]
fn unparseable_score_counts_as_zero() {
    let llm = ScriptedLlm::new("1. Why?", "The answer is fine.");
    let cfg = config(1);
    let examiner = Examiner::new(&LetterEmbedder, &llm, &cfg);
    let mut session = examiner.prepare_from_text(PAPER).expect("prepare");

    let record = examiner
        .submit_answer(&mut session, "because of attention")
        .expect("submit");
    assert_eq!(record.score, 0);

    let transcript = session.transcript();
    let entry = &transcript.entries[0];
    assert_eq!(entry.formatted.score, "N/A");
    assert_eq!(entry.formatted.verdict, "N/A");
    assert_eq!(entry.formatted.explanation, "N/A");
}

#[test]
fn missing_pdf_surfaces_ingest_error() {
    let llm = ScriptedLlm::new("1. Why?", "Score: 1");
    let cfg = config(1);
    let examiner = Examiner::new(&LetterEmbedder, &llm, &cfg);

    let dir = tempfile::tempdir().expect("tempdir");
    let err = examiner
        .prepare_from_pdf(&dir.path().join("absent.pdf"))
        .unwrap_err();
    assert_eq!(err.code, "INGEST_PDF_UNREADABLE");
}
