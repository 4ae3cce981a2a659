//! Section gap detection and the merge of user-supplied sections.

use serde::{Deserialize, Serialize};

use crate::models::resume::{Project, ResumeDocument, WorkExperience};

/// A section the user is asked to fill in before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingSection {
    WorkExperience,
    Projects,
    Certifications,
}

impl MissingSection {
    pub const ALL: [MissingSection; 3] = [
        MissingSection::WorkExperience,
        MissingSection::Projects,
        MissingSection::Certifications,
    ];

    fn is_empty_in(self, document: &ResumeDocument) -> bool {
        match self {
            MissingSection::WorkExperience => document.work_experience.is_empty(),
            MissingSection::Projects => document.projects.is_empty(),
            MissingSection::Certifications => document.certifications.is_empty(),
        }
    }
}

/// Empty sections, always in `workExperience, projects, certifications` order.
pub fn detect_missing_sections(document: &ResumeDocument) -> Vec<MissingSection> {
    MissingSection::ALL
        .into_iter()
        .filter(|section| section.is_empty_in(document))
        .collect()
}

/// Like `detect_missing_sections`, minus sections the user already declined to fill.
pub fn outstanding_sections(
    document: &ResumeDocument,
    acknowledged: &[MissingSection],
) -> Vec<MissingSection> {
    detect_missing_sections(document)
        .into_iter()
        .filter(|section| !acknowledged.contains(section))
        .collect()
}

/// Sections supplied by the user. Absent keys leave the document untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingSectionsInput {
    #[serde(default)]
    pub work_experience: Option<Vec<WorkExperience>>,
    #[serde(default)]
    pub projects: Option<Vec<Project>>,
    #[serde(default)]
    pub certifications: Option<Vec<String>>,
}

impl MissingSectionsInput {
    pub fn is_empty(&self) -> bool {
        self.work_experience.is_none() && self.projects.is_none() && self.certifications.is_none()
    }

    /// Sections provided as an explicit empty list: the user has nothing to add.
    pub fn declined(&self) -> Vec<MissingSection> {
        let mut declined = Vec::new();
        if self.work_experience.as_ref().is_some_and(Vec::is_empty) {
            declined.push(MissingSection::WorkExperience);
        }
        if self.projects.as_ref().is_some_and(Vec::is_empty) {
            declined.push(MissingSection::Projects);
        }
        if self.certifications.as_ref().is_some_and(Vec::is_empty) {
            declined.push(MissingSection::Certifications);
        }
        declined
    }

    /// Appends provided entries to a copy of `document`.
    pub fn merge_into(&self, document: &ResumeDocument) -> ResumeDocument {
        let mut merged = document.clone();
        if let Some(entries) = &self.work_experience {
            merged.work_experience.extend(entries.iter().cloned());
        }
        if let Some(entries) = &self.projects {
            merged.projects.extend(entries.iter().cloned());
        }
        if let Some(entries) = &self.certifications {
            merged.certifications.extend(
                entries
                    .iter()
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
            );
        }
        merged
    }
}
