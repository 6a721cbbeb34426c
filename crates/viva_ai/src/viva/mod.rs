use viva_core::error::AppError;

use crate::guardrails::require_text;
use crate::llm::Llm;

pub mod prompts;

pub fn join_context(chunks: &[String]) -> String {
    chunks.join("\n\n")
}

/// One grounded generation call asking for `num_questions` numbered questions.
///
/// Returns the model text as-is; splitting it into questions is
/// [`viva_core::parse::parse_questions`]'s job.
pub fn generate_questions(
    llm: &dyn Llm,
    model: &str,
    context_chunks: &[String],
    num_questions: usize,
) -> Result<String, AppError> {
    let prompt = prompts::viva_questions_prompt(num_questions, &join_context(context_chunks));
    log::info!(
        "generating {num_questions} viva questions from {} context chunks",
        context_chunks.len()
    );
    llm.generate(model, &prompt)
}

/// One grounded generation call judging `answer` against the context.
///
/// Returns the raw `Score:` / `Verdict:` / `Explanation:` text; nothing is validated.
pub fn evaluate_answer(
    llm: &dyn Llm,
    model: &str,
    question: &str,
    answer: &str,
    context_chunks: &[String],
) -> Result<String, AppError> {
    require_text("question", question)?;
    require_text("answer", answer)?;

    let prompt = prompts::answer_evaluation_prompt(question, answer, &join_context(context_chunks));
    log::info!("evaluating answer against {} context chunks", context_chunks.len());
    llm.generate(model, &prompt)
}
