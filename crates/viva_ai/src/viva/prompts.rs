// Both templates are parsed downstream (numbered list, `Score:`/`Verdict:`/`Explanation:`
// lines); keep their wording and layout byte-for-byte.

pub fn viva_questions_prompt(num_questions: usize, context: &str) -> String {
    format!(
        r#"
You are a strict university viva voce examiner.

You are examining a student on a specific research paper.
Your job is to test DEEP understanding, not memorization.

RULES (VERY IMPORTANT):
- Ask EXACTLY {num_questions} questions.
- Each question must be based ONLY on the provided context.
- Do NOT ask generic questions (e.g., title, authors, abstract).
- Prefer WHY, HOW, and TRADE-OFF questions.
- Each question must test conceptual understanding.
- Questions must be clearly phrased and unambiguous.
- Do NOT provide answers.
- Number the questions from 1 to {num_questions}.


IMPORTANT:
- Do NOT repeat the exact wording of common questions.
- Rephrase ideas differently each time.
- Focus on different aspects such as motivation, assumptions, limitations,
  experimental design, or implications.
- Vary sentence structure and angle of questioning.


Context from the research paper:
--------------------
{context}
--------------------

Now generate the questions.
"#
    )
}

pub fn answer_evaluation_prompt(question: &str, answer: &str, context: &str) -> String {
    format!(
        r#"
You are a strict university viva examiner.

You are evaluating a student's answer to a research paper question.

QUESTION:
{question}

STUDENT ANSWER:
{answer}

REFERENCE CONTEXT (from the paper):
----------------
{context}
----------------

EVALUATION RULES:
- Judge ONLY using the provided context.
- If the answer is factually wrong or misleading, mark it low.
- If partially correct, explain what is missing.
- If correct but shallow, penalize depth.
- If correct and deep, reward it.
- Be strict. Do NOT be generous.

OUTPUT FORMAT (STRICT):
Score: <number between 1 and 10>
Verdict: <Correct / Partially Correct / Incorrect>
Explanation: <2–3 lines max>
"#
    )
}
