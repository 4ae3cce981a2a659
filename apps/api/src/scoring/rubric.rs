//! Deterministic rubric scorer. Pure Rust, no model calls, fully testable.
//!
//! `score_resume_text` rates free text on headings, contact details,
//! quantified bullets and length. `score_document` fills the five rubric
//! categories from a structured document and the job-description vocabulary.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Datelike, Utc};

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::scoring::impact::{impact_issue, quantified_ratio};
use crate::scoring::models::{
    DetailedScore, EducationCertificationsScore, ExperienceScore, Grade, MatchScore,
    ProjectsScore, ScoreBreakdown, StructureScore, TechnicalSkillsScore,
    EDUCATION_CERTIFICATIONS_MAX, EXPERIENCE_MAX, PROJECTS_MAX, STRUCTURE_MAX,
    TECHNICAL_SKILLS_MAX,
};
use crate::scoring::ScoreEvaluator;

const SECTION_HEADINGS: &[&str] = &[
    "summary",
    "experience",
    "education",
    "skills",
    "projects",
    "certification",
];

const LEADERSHIP_MARKERS: &[&str] = &[
    "lead", "manager", "head", "director", "principal", "founder", "chief",
];
const BACHELOR_MARKERS: &[&str] = &[
    "bachelor", "b.tech", "btech", "b.e.", "b.s.", "bsc", "b.sc", "b.a.", "bca",
];
const MASTER_MARKERS: &[&str] = &[
    "master", "m.tech", "mtech", "m.s.", "msc", "m.sc", "mba", "mca", "phd", "ph.d",
];

/// Bullets longer than this are hard for applicant-tracking systems to parse.
const MAX_ATS_BULLET_CHARS: usize = 300;

pub struct RubricScoreEvaluator;

#[async_trait]
impl ScoreEvaluator for RubricScoreEvaluator {
    async fn score_text(&self, resume_text: &str) -> Result<MatchScore, AppError> {
        Ok(score_resume_text(resume_text))
    }

    async fn score_detailed(
        &self,
        document: &ResumeDocument,
        job_description: &str,
    ) -> Result<DetailedScore, AppError> {
        Ok(score_document(document, job_description, Utc::now().year()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Match score over free text
// ────────────────────────────────────────────────────────────────────────────

pub fn score_resume_text(text: &str) -> MatchScore {
    let lower = text.to_lowercase();
    let word_count = text.split_whitespace().count();

    if word_count == 0 {
        return MatchScore {
            score: 0,
            analysis: "No resume content to evaluate.".to_string(),
            key_strengths: vec![],
            improvement_areas: vec!["Provide resume content".to_string()],
        };
    }

    let mut strengths = Vec::new();
    let mut improvements = Vec::new();

    let headings: Vec<&str> = SECTION_HEADINGS
        .iter()
        .copied()
        .filter(|h| lower.contains(h))
        .collect();
    let heading_points = headings.len() as u32 * 5;
    if headings.len() >= 4 {
        strengths.push("Clear section structure".to_string());
    } else {
        let missing: Vec<&str> = SECTION_HEADINGS
            .iter()
            .copied()
            .filter(|h| !headings.contains(h))
            .collect();
        improvements.push(format!("Add clearly labelled sections: {}", missing.join(", ")));
    }

    let has_email = text.contains('@');
    let has_phone = text.split_whitespace().any(looks_like_phone);
    let contact_points = (if has_email { 5 } else { 0 }) + (if has_phone { 5 } else { 0 });
    if !has_email || !has_phone {
        improvements.push("Include both an email address and a phone number".to_string());
    }

    let bullet_lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with(['•', '-', '*', '–']))
        .collect();
    let candidates: Vec<&str> = if bullet_lines.is_empty() {
        text.lines()
            .map(str::trim)
            .filter(|l| l.split_whitespace().count() > 6)
            .collect()
    } else {
        bullet_lines
    };
    let ratio = quantified_ratio(candidates.iter().copied());
    let impact_points = (ratio * 30.0).round() as u32;
    if ratio >= 0.5 {
        strengths.push("Achievements are backed by numbers".to_string());
    } else if let Some(issue) = candidates.iter().find_map(|l| impact_issue(l)) {
        improvements.push(issue.describe());
    }

    let length_points = match word_count {
        250..=900 => 20,
        150..=249 | 901..=1200 => 12,
        _ => 5,
    };
    if length_points == 20 {
        strengths.push("Appropriate length".to_string());
    } else if word_count < 250 {
        improvements.push("Expand on responsibilities and results".to_string());
    } else {
        improvements.push("Tighten the resume to the most relevant content".to_string());
    }

    let score = (heading_points + contact_points + impact_points + length_points).min(100);
    let analysis = match score {
        80..=100 => format!("Strong resume ({score}/100): well structured and results-driven."),
        60..=79 => format!("Solid resume ({score}/100) with room to sharpen impact."),
        _ => format!("Resume needs work ({score}/100) before it will compete well."),
    };

    MatchScore {
        score,
        analysis,
        key_strengths: strengths,
        improvement_areas: improvements,
    }
}

fn looks_like_phone(token: &str) -> bool {
    let stripped: String = token
        .chars()
        .filter(|c| !matches!(c, '+' | '-' | '(' | ')' | '.'))
        .collect();
    stripped.len() >= 10 && stripped.chars().all(|c| c.is_ascii_digit())
}

// ────────────────────────────────────────────────────────────────────────────
// Detailed rubric over a structured document
// ────────────────────────────────────────────────────────────────────────────

pub fn score_document(
    document: &ResumeDocument,
    job_description: &str,
    current_year: i32,
) -> DetailedScore {
    let jd = JdVocabulary::new(job_description);
    let mut recommendations = Vec::new();

    let projects = score_projects(document, &jd, &mut recommendations);
    let technical_skills = score_skills(document, &jd, &mut recommendations);
    let experience = score_experience(document, current_year, &mut recommendations);
    let education_certifications = score_education(document, &mut recommendations);
    let resume_structure = score_structure(document, &mut recommendations);

    DetailedScore::from_breakdown(
        ScoreBreakdown {
            projects,
            technical_skills,
            experience,
            education_certifications,
            resume_structure,
        },
        recommendations,
    )
}

fn score_projects(
    document: &ResumeDocument,
    jd: &JdVocabulary,
    recommendations: &mut Vec<String>,
) -> ProjectsScore {
    let count = document.projects.len();
    let complete = document
        .projects
        .iter()
        .filter(|p| p.bullets.len() >= 2)
        .count();
    let completion_rate = if count == 0 {
        0.0
    } else {
        complete as f64 / count as f64
    };

    let aligned = document.projects.iter().any(|p| {
        jd.mentions_any(&p.title) || p.bullets.iter().any(|b| jd.mentions_any(b))
    });
    let quantified = quantified_ratio(
        document
            .projects
            .iter()
            .flat_map(|p| p.bullets.iter().map(String::as_str)),
    );

    let score = (count.min(3) as u32 * 5
        + (completion_rate * 6.0).round() as u32
        + (if aligned { 2 } else { 0 })
        + (if quantified >= 0.5 { 2 } else { 0 }))
    .min(PROJECTS_MAX);

    if count < 3 {
        recommendations.push(format!(
            "Add {} more project(s) relevant to the target role",
            3 - count
        ));
    }
    if count > 0 && complete < count {
        recommendations.push("Give every project at least two bullets".to_string());
    }

    ProjectsScore {
        score,
        max_score: PROJECTS_MAX,
        grade: Grade::for_score(score, PROJECTS_MAX),
        details: format!(
            "{count} project(s), {complete} fully described{}",
            if aligned { ", aligned with the job description" } else { "" }
        ),
        completion_rate,
    }
}

fn score_skills(
    document: &ResumeDocument,
    jd: &JdVocabulary,
    recommendations: &mut Vec<String>,
) -> TechnicalSkillsScore {
    let mut seen = HashSet::new();
    let skills: Vec<String> = document
        .skills
        .iter()
        .flat_map(|s| s.items.iter())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect();

    let relevant_skills = skills.iter().filter(|s| jd.contains_term(s)).count() as u32;
    let breadth = (skills.len() as u32).min(5);
    let score = (relevant_skills * 4).min(20).saturating_add(breadth).min(TECHNICAL_SKILLS_MAX);

    if skills.is_empty() {
        recommendations.push("Add a skills section grouped by category".to_string());
    } else if relevant_skills < 3 {
        recommendations
            .push("List the job description's key technologies you have used".to_string());
    }

    TechnicalSkillsScore {
        score,
        max_score: TECHNICAL_SKILLS_MAX,
        grade: Grade::for_score(score, TECHNICAL_SKILLS_MAX),
        details: format!(
            "{relevant_skills} of {} listed skills match the job description",
            skills.len()
        ),
        relevant_skills,
    }
}

fn score_experience(
    document: &ResumeDocument,
    current_year: i32,
    recommendations: &mut Vec<String>,
) -> ExperienceScore {
    let roles: Vec<String> = document
        .work_experience
        .iter()
        .map(|w| w.role.to_lowercase())
        .collect();
    let internships = roles.iter().filter(|r| r.contains("intern")).count() as u32;
    let full_time = roles.len() as u32 - internships;
    let leadership_roles = roles
        .iter()
        .filter(|r| LEADERSHIP_MARKERS.iter().any(|m| r.contains(m)))
        .count() as u32;

    let years_of_experience = years_spanned(
        document.work_experience.iter().map(|w| w.year.as_str()),
        current_year,
    );
    let quantified = quantified_ratio(
        document
            .work_experience
            .iter()
            .flat_map(|w| w.bullets.iter().map(String::as_str)),
    );

    let score = ((years_of_experience * 2).min(10)
        + (full_time * 3 + internships * 2).min(8)
        + (leadership_roles * 2).min(4)
        + (quantified * 3.0).round() as u32)
        .min(EXPERIENCE_MAX);

    if document.work_experience.is_empty() {
        recommendations.push("Add work experience or internships".to_string());
    } else if quantified < 0.5 {
        recommendations.push("Quantify the impact of your work experience bullets".to_string());
    }

    ExperienceScore {
        score,
        max_score: EXPERIENCE_MAX,
        grade: Grade::for_score(score, EXPERIENCE_MAX),
        details: format!(
            "{} role(s) over ~{years_of_experience} year(s), {internships} internship(s), {leadership_roles} leadership role(s)",
            roles.len()
        ),
        years_of_experience,
        internships,
        leadership_roles,
    }
}

fn score_education(
    document: &ResumeDocument,
    recommendations: &mut Vec<String>,
) -> EducationCertificationsScore {
    let degrees: Vec<String> = document
        .education
        .iter()
        .map(|e| format!("{} ", e.degree.to_lowercase()))
        .collect();
    let has_bachelors = degrees
        .iter()
        .any(|d| BACHELOR_MARKERS.iter().any(|m| d.contains(m)));
    let has_masters = degrees
        .iter()
        .any(|d| MASTER_MARKERS.iter().any(|m| d.contains(m)));
    let certification_count = document.certifications.len() as u32;

    let score = ((if degrees.is_empty() { 0 } else { 3 })
        + (if has_bachelors { 5 } else { 0 })
        + (if has_masters { 3 } else { 0 })
        + (certification_count * 2).min(4))
    .min(EDUCATION_CERTIFICATIONS_MAX);

    if certification_count == 0 {
        recommendations.push("Add certifications relevant to the role".to_string());
    }

    EducationCertificationsScore {
        score,
        max_score: EDUCATION_CERTIFICATIONS_MAX,
        grade: Grade::for_score(score, EDUCATION_CERTIFICATIONS_MAX),
        details: format!(
            "{} degree(s), {certification_count} certification(s)",
            degrees.len()
        ),
        has_bachelors,
        has_masters,
        certification_count,
    }
}

fn score_structure(
    document: &ResumeDocument,
    recommendations: &mut Vec<String>,
) -> StructureScore {
    let has_contact = !document.email.trim().is_empty() || !document.phone.trim().is_empty();
    let has_proper_sections = document.has_name()
        && has_contact
        && !document.education.is_empty()
        && !document.skills.is_empty();

    let entries = document.work_experience.len() + document.projects.len();
    let has_consistent_formatting = entries > 0
        && document
            .work_experience
            .iter()
            .all(|w| !w.bullets.is_empty() && !w.year.trim().is_empty())
        && document.projects.iter().all(|p| !p.bullets.is_empty());

    let is_ats_friendly = !document.email.trim().is_empty()
        && document
            .all_bullets()
            .all(|b| b.chars().count() <= MAX_ATS_BULLET_CHARS && !b.contains(['|', '\t']));

    let score = ((if has_proper_sections { 4 } else { 0 })
        + (if has_consistent_formatting { 3 } else { 0 })
        + (if is_ats_friendly { 3 } else { 0 }))
    .min(STRUCTURE_MAX);

    if !has_proper_sections {
        recommendations
            .push("Include name, contact details, education and skills sections".to_string());
    }
    if !is_ats_friendly {
        recommendations.push("Keep bullets short and avoid tables or tab layouts".to_string());
    }

    StructureScore {
        score,
        max_score: STRUCTURE_MAX,
        grade: Grade::for_score(score, STRUCTURE_MAX),
        details: format!(
            "sections {}, formatting {}, ATS {}",
            pass_fail(has_proper_sections),
            pass_fail(has_consistent_formatting),
            pass_fail(is_ats_friendly)
        ),
        has_proper_sections,
        has_consistent_formatting,
        is_ats_friendly,
    }
}

fn pass_fail(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "needs work"
    }
}

/// Years between the earliest and latest year mentioned in free-text labels.
/// "Present"/"Current" count as `current_year`.
fn years_spanned<'a>(labels: impl Iterator<Item = &'a str>, current_year: i32) -> u32 {
    let mut years = Vec::new();
    for label in labels {
        let lower = label.to_lowercase();
        if lower.contains("present") || lower.contains("current") {
            years.push(current_year);
        }
        years.extend(
            lower
                .split(|c: char| !c.is_ascii_digit())
                .filter(|t| t.len() == 4)
                .filter_map(|t| t.parse::<i32>().ok())
                .filter(|y| (1950..=current_year).contains(y)),
        );
    }
    match (years.iter().min(), years.iter().max()) {
        (Some(min), Some(max)) => (max - min) as u32,
        _ => 0,
    }
}

/// Lowercased job-description text plus its token set.
struct JdVocabulary {
    text: String,
    tokens: HashSet<String>,
}

impl JdVocabulary {
    fn new(job_description: &str) -> Self {
        let text = job_description.to_lowercase();
        let tokens = text
            .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
            .map(|t| t.trim_end_matches('.'))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { text, tokens }
    }

    /// Multi-word terms match as phrases, single words as whole tokens.
    fn contains_term(&self, term: &str) -> bool {
        if term.contains(' ') {
            self.text.contains(term)
        } else {
            self.tokens.contains(term)
        }
    }

    /// True if any word of `text` longer than three characters appears in the JD.
    fn mentions_any(&self, text: &str) -> bool {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#')))
            .filter(|w| w.len() > 3)
            .any(|w| self.tokens.contains(w))
    }
}
