//! Keep-or-replace policy for resume projects.

use tracing::debug;

use crate::models::resume::Project;
use crate::optimization::project_analyzer::ProjectAnalysis;

/// Projects scoring at or above this are kept.
pub const KEEP_THRESHOLD: u32 = 80;

/// Maximum number of projects on the final resume.
pub const MAX_PROJECTS: usize = 3;

/// Suitable projects first (original order), then suggestions in order, up to `MAX_PROJECTS`.
///
/// A project the analysis did not score is treated as suitable.
pub fn apply_replacement_policy(projects: &[Project], analysis: &ProjectAnalysis) -> Vec<Project> {
    let mut result: Vec<Project> = projects
        .iter()
        .filter(|project| {
            analysis
                .score_for(&project.title)
                .map_or(true, |score| score >= KEEP_THRESHOLD)
        })
        .take(MAX_PROJECTS)
        .cloned()
        .collect();

    let kept = result.len();
    let capacity = MAX_PROJECTS - kept;
    result.extend(
        analysis
            .replacement_suggestions
            .iter()
            .take(capacity)
            .cloned(),
    );

    debug!(
        "Replacement policy: {} of {} projects kept, {} suggestions added",
        kept,
        projects.len(),
        result.len() - kept
    );
    result
}

/// Applies the policy when an analysis is available; otherwise the list is unchanged.
pub fn resolve_projects(projects: &[Project], analysis: Option<&ProjectAnalysis>) -> Vec<Project> {
    match analysis {
        Some(analysis) => apply_replacement_policy(projects, analysis),
        None => projects.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::project_analyzer::ProjectScore;

    fn project(title: &str) -> Project {
        Project {
            title: title.to_string(),
            bullets: vec![format!("{title} bullet")],
            github_url: None,
        }
    }

    fn scored(pairs: &[(&str, u32)], suggestions: &[&str]) -> ProjectAnalysis {
        ProjectAnalysis {
            projects_to_replace: pairs
                .iter()
                .map(|(title, score)| ProjectScore {
                    title: title.to_string(),
                    score: *score,
                })
                .collect(),
            replacement_suggestions: suggestions.iter().map(|t| project(t)).collect(),
        }
    }

    fn titles(projects: &[Project]) -> Vec<&str> {
        projects.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_two_kept_plus_one_suggestion() {
        let projects = vec![project("A"), project("B"), project("C"), project("D")];
        let analysis = scored(
            &[("A", 90), ("B", 40), ("C", 80), ("D", 10)],
            &["S1", "S2", "S3"],
        );
        assert_eq!(
            titles(&apply_replacement_policy(&projects, &analysis)),
            vec!["A", "C", "S1"]
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let projects = vec![project("A"), project("B")];
        let analysis = scored(&[("A", 80), ("B", 79)], &[]);
        assert_eq!(
            titles(&apply_replacement_policy(&projects, &analysis)),
            vec!["A"]
        );
    }

    #[test]
    fn test_unscored_project_treated_as_suitable() {
        let projects = vec![project("A"), project("B")];
        let analysis = scored(&[("B", 20)], &["S1"]);
        assert_eq!(
            titles(&apply_replacement_policy(&projects, &analysis)),
            vec!["A", "S1"]
        );
    }

    #[test]
    fn test_surplus_suitable_projects_truncated() {
        let projects = vec![project("A"), project("B"), project("C"), project("D")];
        let analysis = scored(&[("A", 95), ("B", 95), ("C", 95), ("D", 95)], &["S1"]);
        assert_eq!(
            titles(&apply_replacement_policy(&projects, &analysis)),
            vec!["A", "B", "C"]
        );
    }

    #[test]
    fn test_never_more_than_max() {
        let projects = vec![project("A")];
        let analysis = scored(&[("A", 10)], &["S1", "S2", "S3", "S4", "S5"]);
        let result = apply_replacement_policy(&projects, &analysis);
        assert_eq!(result.len(), MAX_PROJECTS);
        assert_eq!(titles(&result), vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn test_missing_analysis_keeps_original_list() {
        let projects = vec![project("A"), project("B"), project("C"), project("D")];
        assert_eq!(resolve_projects(&projects, None), projects);
    }
}
