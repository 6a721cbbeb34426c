use std::path::Path;

use serde::{Deserialize, Serialize};
use viva_core::chunking::{chunk_text, ChunkingConfig};
use viva_core::config::{ExamConfig, VivaConfig};
use viva_core::domain::{Document, EvaluationRecord, FormattedEvaluation, Verdict};
use viva_core::error::AppError;
use viva_core::ingest::{extract_text_from_pdf, ExtractionConfig};
use viva_core::parse::{extract_score, extract_verdict, format_evaluation, parse_questions};

use crate::embeddings::Embedder;
use crate::guardrails::dedup_context;
use crate::index::{build_index, VectorIndex};
use crate::llm::Llm;
use crate::retrieve::retrieve_chunks;
use crate::viva::{evaluate_answer, generate_questions};

/// State of one exam over one paper. Owned by the caller; the [`Examiner`] only reads and
/// appends to it.
#[derive(Debug, Clone)]
pub struct VivaSession {
    document_sha256: String,
    chunks: Vec<String>,
    index: VectorIndex,
    questions_raw: String,
    questions: Vec<String>,
    current: usize,
    answered: bool,
    history: Vec<EvaluationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub question: String,
    pub answer: String,
    pub score: u32,
    /// `None` when the model's verdict is not one of the three expected labels.
    pub verdict: Option<Verdict>,
    pub formatted: FormattedEvaluation,
    pub evaluation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transcript {
    pub document_sha256: String,
    pub questions: Vec<String>,
    pub entries: Vec<TranscriptEntry>,
    pub total_score: u32,
    pub max_score: u32,
}

impl VivaSession {
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Model output the questions were parsed from.
    pub fn questions_raw(&self) -> &str {
        &self.questions_raw
    }

    pub fn history(&self) -> &[EvaluationRecord] {
        &self.history
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.current).map(|q| q.as_str())
    }

    pub fn is_current_answered(&self) -> bool {
        self.answered
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// `(answered, total)`
    pub fn progress(&self) -> (usize, usize) {
        (self.history.len(), self.questions.len())
    }

    pub fn total_score(&self) -> u32 {
        self.history.iter().map(|r| r.score).sum()
    }

    pub fn max_score(&self) -> u32 {
        self.questions.len() as u32 * 10
    }

    /// Move past an answered question. Returns the next question, if any.
    pub fn advance(&mut self) -> Result<Option<&str>, AppError> {
        if self.is_complete() {
            return Err(AppError::new("VIVA_COMPLETE", "All questions have been asked"));
        }
        if !self.answered {
            return Err(AppError::new(
                "VIVA_NOT_ANSWERED",
                "Answer the current question before moving on",
            )
            .with_details(format!("question_index={}", self.current)));
        }
        self.current += 1;
        self.answered = false;
        Ok(self.current_question())
    }

    pub fn transcript(&self) -> Transcript {
        Transcript {
            document_sha256: self.document_sha256.clone(),
            questions: self.questions.clone(),
            entries: self
                .history
                .iter()
                .map(|r| TranscriptEntry {
                    question: r.question.clone(),
                    answer: r.answer.clone(),
                    score: r.score,
                    verdict: extract_verdict(&r.evaluation),
                    formatted: format_evaluation(&r.evaluation),
                    evaluation: r.evaluation.clone(),
                })
                .collect(),
            total_score: self.total_score(),
            max_score: self.max_score(),
        }
    }
}

/// Drives the exam pipeline with injected model services.
pub struct Examiner<'a> {
    embedder: &'a dyn Embedder,
    llm: &'a dyn Llm,
    llm_model: String,
    embed_model: String,
    extraction: ExtractionConfig,
    chunking: ChunkingConfig,
    exam: ExamConfig,
}

impl<'a> Examiner<'a> {
    pub fn new(embedder: &'a dyn Embedder, llm: &'a dyn Llm, cfg: &VivaConfig) -> Self {
        Self {
            embedder,
            llm,
            llm_model: cfg.llm.model.clone(),
            embed_model: cfg.ollama.embed_model.clone(),
            extraction: cfg.extraction.clone(),
            chunking: cfg.chunking.clone(),
            exam: cfg.exam.clone(),
        }
    }

    pub fn prepare_from_pdf(&self, path: &Path) -> Result<VivaSession, AppError> {
        let doc = extract_text_from_pdf(path, &self.extraction)?;
        self.prepare_from_document(doc)
    }

    pub fn prepare_from_text(&self, text: &str) -> Result<VivaSession, AppError> {
        self.prepare_from_document(Document::new(text.to_string()))
    }

    /// Chunk, index, gather themed context and generate the question set.
    pub fn prepare_from_document(&self, doc: Document) -> Result<VivaSession, AppError> {
        let chunks = chunk_text(&doc.text, &self.chunking);
        if chunks.is_empty() {
            return Err(AppError::new(
                "VIVA_DOCUMENT_EMPTY",
                "The document has no text long enough to examine",
            )
            .with_details(format!(
                "text_chars={}; min_segment_chars={}",
                doc.text.chars().count(),
                self.chunking.min_segment_chars
            )));
        }

        let (index, _matrix) = build_index(&chunks, self.embedder, &self.embed_model)?;

        let context = self.gather_question_context(&index, &chunks)?;
        let questions_raw =
            generate_questions(self.llm, &self.llm_model, &context, self.exam.num_questions)?;
        let questions = parse_questions(&questions_raw);
        if questions.is_empty() {
            log::warn!("question generation returned no numbered questions");
        } else if questions.len() != self.exam.num_questions {
            log::warn!(
                "expected {} questions, parsed {}",
                self.exam.num_questions,
                questions.len()
            );
        }

        Ok(VivaSession {
            document_sha256: doc.text_sha256,
            chunks,
            index,
            questions_raw,
            questions,
            current: 0,
            answered: false,
            history: Vec::new(),
        })
    }

    /// Top `theme_top_k` chunks per theme, de-duplicated in first-seen order.
    pub fn gather_question_context(
        &self,
        index: &VectorIndex,
        chunks: &[String],
    ) -> Result<Vec<String>, AppError> {
        let mut all = Vec::new();
        for theme in self.exam.themes.iter().filter(|t| !t.trim().is_empty()) {
            let hits = retrieve_chunks(theme, index, chunks, self.embedder, self.exam.theme_top_k)?;
            log::debug!("theme {theme:?}: {} chunks", hits.len());
            all.extend(hits);
        }
        Ok(dedup_context(all))
    }

    /// Evaluate an answer to the current question and append it to the history.
    pub fn submit_answer<'s>(
        &self,
        session: &'s mut VivaSession,
        answer: &str,
    ) -> Result<&'s EvaluationRecord, AppError> {
        let question = match session.current_question() {
            Some(q) => q.to_string(),
            None => {
                return Err(AppError::new("VIVA_COMPLETE", "All questions have been asked"));
            }
        };
        if session.answered {
            return Err(AppError::new(
                "VIVA_ALREADY_ANSWERED",
                "The current question has already been answered",
            )
            .with_details(format!("question_index={}", session.current)));
        }
        let answer = answer.trim();
        if answer.chars().count() < self.exam.min_answer_chars {
            return Err(AppError::new(
                "VIVA_ANSWER_TOO_SHORT",
                "Please write a meaningful answer",
            )
            .with_details(format!(
                "chars={}; min={}",
                answer.chars().count(),
                self.exam.min_answer_chars
            )));
        }

        let context = retrieve_chunks(
            &question,
            &session.index,
            &session.chunks,
            self.embedder,
            self.exam.answer_top_k,
        )?;
        let evaluation = evaluate_answer(self.llm, &self.llm_model, &question, answer, &context)?;
        let score = extract_score(&evaluation);
        log::info!(
            "question {} scored {score}",
            session.current + 1
        );

        session.history.push(EvaluationRecord {
            question,
            answer: answer.to_string(),
            evaluation,
            score,
        });
        session.answered = true;
        Ok(&session.history[session.history.len() - 1])
    }
}
