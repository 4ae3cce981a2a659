// Prompt constants for the optimize and project-analysis calls.
// Cross-cutting fragments live in llm_client::prompts.

/// System prompt for both optimize passes — enforces JSON-only output.
pub const OPTIMIZE_SYSTEM: &str =
    "You are an expert resume writer and applicant-tracking-system specialist. \
    You rewrite resumes so they match a target job description while staying truthful. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Optimize prompt. Replace `{input_kind}`, `{resume}`, `{job_description}`,
/// `{user_type}`, `{user_type_guidance}`, `{links}` and `{target_role}` before sending.
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"Rewrite the resume below for the target job description.

The resume is provided as {input_kind}.

RESUME:
{resume}

JOB DESCRIPTION:
{job_description}

CANDIDATE TYPE: {user_type}
{user_type_guidance}

TARGET ROLE: {target_role}
PROFILE LINKS: {links}

Return a JSON object with this EXACT schema:
{
  "name": "Full Name",
  "phone": "",
  "email": "",
  "linkedin": "",
  "github": "",
  "targetRole": "",
  "summary": "",
  "education": [{"degree": "", "school": "", "year": "", "cgpa": ""}],
  "workExperience": [{"role": "", "company": "", "year": "", "bullets": [""]}],
  "projects": [{"title": "", "bullets": [""], "githubUrl": ""}],
  "skills": [{"category": "", "list": [""]}],
  "certifications": [""],
  "achievements": [""],
  "extraCurricularActivities": [""],
  "languagesKnown": [""],
  "personalDetails": ""
}

Rules:
- Mirror the job description's terminology where the resume supports it.
- Order work experience and projects by relevance to the job description.
- Group skills into 3-6 categories.
"#;

pub const FRESHER_GUIDANCE: &str = "The candidate is early-career: lead with education, \
    internships and academic projects; include achievements, extra-curricular activities \
    and languages when present.";

pub const EXPERIENCED_GUIDANCE: &str = "The candidate is experienced: lead with a concise \
    professional summary and work experience; keep education brief.";

/// System prompt for project analysis.
pub const PROJECT_ANALYSIS_SYSTEM: &str =
    "You are a technical hiring manager assessing how well a candidate's projects \
    demonstrate fit for a role. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object.";

/// Project analysis prompt. Replace `{projects}`, `{target_role}` and `{job_description}`.
pub const PROJECT_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Score each project below from 0 to 100 for how well it demonstrates fit for the role.
Then suggest up to 3 replacement projects the candidate could realistically build that would demonstrate the missing skills.

TARGET ROLE: {target_role}

JOB DESCRIPTION:
{job_description}

PROJECTS (JSON):
{projects}

Return a JSON object with this EXACT schema:
{
  "projectsToReplace": [{"title": "exact project title", "score": 72}],
  "replacementSuggestions": [
    {"title": "", "bullets": ["", ""], "githubUrl": ""}
  ]
}

Rules:
- Include EVERY project in "projectsToReplace" with its score, using its exact title.
- Suggestions must use technologies named in the job description.
- Each suggestion has 2-3 bullets.
"#;
