// All LLM prompt constants for the Analysis module.

/// System message framing the reviewer persona.
pub const ANALYSIS_SYSTEM: &str =
    "You are an expert resume reviewer with years of experience in HR and recruitment.";

/// Substituted for the job role when none is given.
pub const GENERIC_JOB_CONTEXT: &str = "general job applications";

/// Resolves the role phrase used in the prompt. Only an absent or empty role
/// falls back to [`GENERIC_JOB_CONTEXT`]; anything else is used verbatim.
pub fn job_context(job_role: Option<&str>) -> &str {
    match job_role {
        Some(role) if !role.is_empty() => role,
        _ => GENERIC_JOB_CONTEXT,
    }
}

/// Builds the user message with the role phrase and resume text substituted.
pub fn analysis_user_prompt(resume_text: &str, job_context: &str) -> String {
    format!(
        "Please analyze this resume and provide constructive feedback.
    Focus on the following aspects:
    1. Content clarity and impact
    2. Skills presentation
    3. Experience descriptions
    4. Specific improvements for {job_context}

    Resume content:
    {resume_text}

    Please provide your analysis in a clear, structured format with specific recommendations."
    )
}
