// All prompt constants for the AI gateway. Templates use `{placeholder}`
// markers replaced before sending.

/// System instruction for both calls — enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Question generation template.
/// Replace: {job_title}, {job_description}, {difficulty}, {num_questions},
///          {is_coding_enabled}
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"Role: Senior Technical Assessment Engineer.
Goal: Generate a professional technical assessment for the role of "{job_title}" based on this JD: "{job_description}".

CRITICAL CONSTRAINTS:
1. Count: You MUST generate exactly {num_questions} questions.
2. Score: The total sum of "marks" for all {num_questions} questions MUST equal exactly 100.
3. Type Distribution:
   - If isCoding is true ({is_coding_enabled}), include at least 1-2 CODING questions worth 20-40 marks each.
   - Include 1-2 SUBJECTIVE questions worth 10-15 marks each.
   - The remaining questions must be MCQs worth 2-5 marks each.
   - Adjust individual marks to hit EXACTLY 100 in total.
4. Difficulty: {difficulty}.
5. Relevance: All questions must be strictly relevant to the technologies mentioned in the JD.

Return ONLY a JSON array of question objects with this EXACT shape (omit
optional fields that do not apply to the question type):
[
  {
    "type": "MCQ" | "SUBJECTIVE" | "CODING",
    "text": "the question text",
    "marks": 4,
    "options": [{"id": "a", "text": "option text"}],
    "correctOptionId": "a",
    "rubric": "grading rubric for subjective questions",
    "initialCode": "starter code for coding questions",
    "testCases": [{"input": "…", "expectedOutput": "…"}]
  }
]"#;

/// Evaluation template.
/// Replace: {job_title}, {job_description}, {resume_summary},
///          {time_taken_minutes}, {results_json}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"Evaluate this assessment for the role: "{job_title}".
JD Context: "{job_description}"
Candidate Resume Summary: "{resume_summary}"
Time Taken: {time_taken_minutes} minutes.

Assessment Results: {results_json}

Task:
1. Calculate marks for each question.
2. Detect Suspicious Activity:
   - If completion > 80% but score < 15%, flag "Guesswork Detected".
   - If candidate resume is completely unrelated to job role, flag "Resume-JD Mismatch".
3. Provide "evaluations" array with "correctAnswer" text for mistakes.

Return ONLY a JSON object with this EXACT shape:
{
  "totalScore": 0-100,
  "isSuspicious": true | false,
  "suspiciousReason": "present only when suspicious",
  "feedback": "overall recruiter-facing summary",
  "evaluations": [
    {
      "questionId": "q-0",
      "isCorrect": true | false,
      "marksObtained": 0,
      "aiFeedback": "per-question feedback",
      "correctAnswer": "reference solution for incorrect answers"
    }
  ]
}"#;
