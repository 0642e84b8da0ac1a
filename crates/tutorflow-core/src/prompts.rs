//! Role system instructions and user instruction builders.
//!
//! Feedback reaches the generator only as text inside the user instruction;
//! there is no structured side channel.

use tutorflow_types::Role;

/// System instruction for the prompt optimizer.
pub const OPTIMIZER_SYSTEM: &str = "\
You are an expert prompt engineer. Rewrite the user's request so that it is \
clear and specific, and suitable for generating heuristic teaching content \
for secondary-school students. The rewritten prompt should lead a model to \
produce:
1. Explanations that are easy to understand
2. A conversational, teacher-student dialogue format
3. Questions that prompt the student to think
4. Accurate coverage of the relevant knowledge points

Return only the optimized prompt, without explanations or any other text.";

/// System instruction for the dialogue generator.
pub const GENERATOR_SYSTEM: &str = "\
You are an experienced secondary-school teacher who teaches through dialogue. \
Write a heuristic teacher-student dialogue on the given topic. Requirements:
1. Use a lively teacher-student dialogue format
2. Keep the language simple and suitable for secondary-school students
3. Guide the student to think instead of handing over the answer
4. Keep every fact accurate and in line with the curriculum";

/// System instruction for the fact reviewer.
pub const REVIEWER_SYSTEM: &str = "\
You are a rigorous subject expert reviewing teaching content for factual \
accuracy. Check that:
1. Factual statements are correct
2. Nothing outdated or disproven is presented as true
3. Data, dates, people and events are accurate
4. Explanations and concepts are scientifically sound
5. Reasoning is logically rigorous

By default content passes; reject it only for a serious factual error.

Answer strictly in this format: the first line is PASS or FAIL, and the \
following lines are your feedback.

If there is no serious factual error, answer:
PASS
Content approved for publication.

If there is a serious factual error, answer:
FAIL
Problem: <what is wrong>
Error: <the incorrect statement>
Suggestion: <how to fix it>";

/// Placeholder written into a revision prompt when the reviewer gave no details.
pub const NO_FEEDBACK: &str = "(the reviewer gave no details)";

/// The fixed system instruction for `role`.
pub fn system_instruction(role: Role) -> &'static str {
    match role {
        Role::Optimizer => OPTIMIZER_SYSTEM,
        Role::Generator => GENERATOR_SYSTEM,
        Role::Reviewer => REVIEWER_SYSTEM,
    }
}

/// User instruction for the optimizer: the topic, unchanged.
pub fn optimize_instruction(topic: &str) -> String {
    topic.to_string()
}

/// A rejected attempt carried into the next generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision<'a> {
    /// Dialogue the reviewer rejected.
    pub previous_content: &'a str,
    /// The reviewer's feedback on it.
    pub feedback: &'a str,
}

/// User instruction for the generator.
///
/// The first attempt sends the optimized prompt verbatim. Later attempts
/// embed the optimized prompt, the rejected dialogue and the feedback.
pub fn generate_instruction(optimized_prompt: &str, revision: Option<&Revision<'_>>) -> String {
    let Some(revision) = revision else {
        return optimized_prompt.to_string();
    };

    let feedback = if revision.feedback.trim().is_empty() {
        NO_FEEDBACK
    } else {
        revision.feedback
    };

    format!(
        "{optimized_prompt}\n\n\
         Your previous dialogue on this topic did not pass factual review.\n\n\
         ## Previous dialogue\n{previous}\n\n\
         ## Reviewer feedback\n{feedback}\n\n\
         Rewrite the dialogue so that every issue in the reviewer feedback is \
         corrected and no new errors are introduced. Keep the teacher-student \
         dialogue format and return only the revised dialogue.",
        previous = revision.previous_content,
    )
}

/// User instruction for the reviewer.
pub fn review_instruction(content: &str) -> String {
    format!("Review the factual accuracy of the following teaching content:\n\n{content}")
}
