use serde::{Deserialize, Serialize};

pub const PROJECTS_MAX: u32 = 25;
pub const TECHNICAL_SKILLS_MAX: u32 = 25;
pub const EXPERIENCE_MAX: u32 = 25;
pub const EDUCATION_CERTIFICATIONS_MAX: u32 = 15;
pub const STRUCTURE_MAX: u32 = 10;

/// Single 0–100 resume fit number with a short narrative.
///
/// "Before" and "after" snapshots are two independent evaluations, not a diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    pub score: u32,
    pub analysis: String,
    pub key_strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
}

/// Letter grade attached to the total and to each category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    F,
}

impl Grade {
    /// Grades a percentage in 0..=100.
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            90..=u32::MAX => Grade::APlus,
            80..=89 => Grade::A,
            70..=79 => Grade::BPlus,
            60..=69 => Grade::B,
            50..=59 => Grade::CPlus,
            40..=49 => Grade::C,
            30..=39 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn for_score(score: u32, max_score: u32) -> Self {
        if max_score == 0 {
            return Grade::F;
        }
        Self::from_percent(score * 100 / max_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsScore {
    pub score: u32,
    pub max_score: u32,
    pub grade: Grade,
    pub details: String,
    /// Share of projects with at least two bullets, 0.0 – 1.0.
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSkillsScore {
    pub score: u32,
    pub max_score: u32,
    pub grade: Grade,
    pub details: String,
    pub relevant_skills: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceScore {
    pub score: u32,
    pub max_score: u32,
    pub grade: Grade,
    pub details: String,
    pub years_of_experience: u32,
    pub internships: u32,
    pub leadership_roles: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationCertificationsScore {
    pub score: u32,
    pub max_score: u32,
    pub grade: Grade,
    pub details: String,
    pub has_bachelors: bool,
    pub has_masters: bool,
    pub certification_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureScore {
    pub score: u32,
    pub max_score: u32,
    pub grade: Grade,
    pub details: String,
    pub has_proper_sections: bool,
    pub has_consistent_formatting: bool,
    #[serde(rename = "isATSFriendly")]
    pub is_ats_friendly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub projects: ProjectsScore,
    pub technical_skills: TechnicalSkillsScore,
    pub experience: ExperienceScore,
    pub education_certifications: EducationCertificationsScore,
    pub resume_structure: StructureScore,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.projects.score
            + self.technical_skills.score
            + self.experience.score
            + self.education_certifications.score
            + self.resume_structure.score
    }
}

/// Rubric score: five weighted categories whose scores sum to `total_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedScore {
    pub total_score: u32,
    pub breakdown: ScoreBreakdown,
    pub recommendations: Vec<String>,
    pub grade: Grade,
}

impl DetailedScore {
    /// Builds a score from its breakdown; total and grade are derived, never supplied.
    pub fn from_breakdown(breakdown: ScoreBreakdown, recommendations: Vec<String>) -> Self {
        let total_score = breakdown.total();
        Self {
            total_score,
            grade: Grade::from_percent(total_score),
            breakdown,
            recommendations,
        }
    }
}
