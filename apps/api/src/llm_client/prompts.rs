// Prompt fragments shared by every model call.
// Each caller keeps its own task prompt next to its code.

/// Appended to every rewrite prompt.
pub const FACTUALITY_INSTRUCTION: &str = "\
    CRITICAL: Do NOT invent employers, job titles, dates, degrees, schools, \
    certifications or metrics that are not present in the input. \
    You may rephrase, reorder and tighten existing content, and you may surface \
    keywords from the job description only where the input supports them.";

/// Shape rules for resume JSON returned by the model.
pub const RESUME_SHAPE_INSTRUCTION: &str = "\
    Every list field must be present; use [] when there is nothing to list, never null. \
    Year fields are free text exactly as they appear (e.g. \"Jan 2021 - Present\"). \
    Keep each bullet to a single sentence that starts with a strong action verb.";
