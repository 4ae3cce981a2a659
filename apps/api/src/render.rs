//! Plain-text rendering of a resume document.
//!
//! Used for the "after" match score and the text export. Section order
//! follows the candidate type: experienced resumes lead with work history,
//! fresher resumes lead with education and add the early-career sections.

use std::fmt::Write;

use crate::errors::AppError;
use crate::models::resume::{ResumeDocument, UserType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    WorkExperience,
    Education,
    Projects,
    Skills,
    Certifications,
    Achievements,
    Activities,
    Languages,
    PersonalDetails,
}

fn section_order(user_type: UserType) -> &'static [Section] {
    match user_type {
        UserType::Experienced => &[
            Section::Summary,
            Section::WorkExperience,
            Section::Projects,
            Section::Skills,
            Section::Certifications,
            Section::Education,
        ],
        UserType::Fresher => &[
            Section::Summary,
            Section::Education,
            Section::WorkExperience,
            Section::Projects,
            Section::Skills,
            Section::Achievements,
            Section::Activities,
            Section::Certifications,
            Section::Languages,
            Section::PersonalDetails,
        ],
    }
}

/// Renders the document. Requires a non-empty name; empty sections are omitted.
pub fn render_plain_text(document: &ResumeDocument, user_type: UserType) -> Result<String, AppError> {
    if !document.has_name() {
        return Err(AppError::Validation(
            "Resume must have a name before it can be rendered".to_string(),
        ));
    }

    let mut out = String::new();
    out.push_str(document.name.trim());
    out.push('\n');

    let contact: Vec<&str> = [
        document.phone.as_str(),
        document.email.as_str(),
        document.linkedin.as_str(),
        document.github.as_str(),
    ]
    .into_iter()
    .map(str::trim)
    .filter(|c| !c.is_empty())
    .collect();
    if !contact.is_empty() {
        out.push_str(&contact.join(" | "));
        out.push('\n');
    }

    for section in section_order(user_type) {
        render_section(&mut out, document, *section, user_type);
    }

    let references: Vec<(&str, &str)> = document
        .projects
        .iter()
        .filter_map(|p| p.github_url.as_deref().map(|url| (p.title.as_str(), url)))
        .filter(|(_, url)| !url.trim().is_empty())
        .collect();
    if !references.is_empty() {
        heading(&mut out, "REFERENCES");
        for (title, url) in references {
            let _ = writeln!(out, "• {title}: {url}");
        }
    }

    Ok(out)
}

fn heading(out: &mut String, title: &str) {
    let _ = write!(out, "\n{title}\n");
}

fn bullets(out: &mut String, items: &[String]) {
    for item in items.iter().filter(|i| !i.trim().is_empty()) {
        let _ = writeln!(out, "• {}", item.trim());
    }
}

fn render_section(out: &mut String, doc: &ResumeDocument, section: Section, user_type: UserType) {
    match section {
        Section::Summary => {
            if let Some(summary) = doc.summary.as_deref().filter(|s| !s.trim().is_empty()) {
                heading(out, "PROFESSIONAL SUMMARY");
                let _ = writeln!(out, "{}", summary.trim());
            }
        }
        Section::WorkExperience => {
            if doc.work_experience.is_empty() {
                return;
            }
            heading(
                out,
                match user_type {
                    UserType::Fresher => "INTERNSHIPS & WORK EXPERIENCE",
                    UserType::Experienced => "WORK EXPERIENCE",
                },
            );
            for job in &doc.work_experience {
                let _ = writeln!(out, "{} | {} | {}", job.role, job.company, job.year);
                bullets(out, &job.bullets);
            }
        }
        Section::Education => {
            if doc.education.is_empty() {
                return;
            }
            heading(out, "EDUCATION");
            for edu in &doc.education {
                let _ = write!(out, "{} | {} | {}", edu.degree, edu.school, edu.year);
                if let Some(cgpa) = edu.cgpa.as_deref().filter(|c| !c.trim().is_empty()) {
                    let _ = write!(out, " | CGPA: {cgpa}");
                }
                out.push('\n');
            }
        }
        Section::Projects => {
            if doc.projects.is_empty() {
                return;
            }
            heading(
                out,
                match user_type {
                    UserType::Fresher => "ACADEMIC PROJECTS",
                    UserType::Experienced => "PROJECTS",
                },
            );
            for project in &doc.projects {
                let _ = writeln!(out, "{}", project.title);
                bullets(out, &project.bullets);
            }
        }
        Section::Skills => {
            if doc.skills.is_empty() {
                return;
            }
            heading(out, "TECHNICAL SKILLS");
            for skill in &doc.skills {
                let _ = writeln!(out, "{}: {}", skill.category, skill.items.join(", "));
            }
        }
        Section::Certifications => list_section(out, "CERTIFICATIONS", &doc.certifications),
        Section::Achievements => list_section(out, "ACHIEVEMENTS", &doc.achievements),
        Section::Activities => list_section(
            out,
            "EXTRA-CURRICULAR ACTIVITIES",
            &doc.extra_curricular_activities,
        ),
        Section::Languages => list_section(out, "LANGUAGES KNOWN", &doc.languages_known),
        Section::PersonalDetails => {
            if let Some(details) = doc.personal_details.as_deref().filter(|d| !d.trim().is_empty()) {
                heading(out, "PERSONAL DETAILS");
                let _ = writeln!(out, "{}", details.trim());
            }
        }
    }
}

fn list_section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    heading(out, title);
    bullets(out, items);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Education, Project, WorkExperience};
    use crate::workflow::gaps::{detect_missing_sections, MissingSection};

    fn sample() -> ResumeDocument {
        ResumeDocument {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            education: vec![Education {
                degree: "BSc".to_string(),
                school: "State".to_string(),
                year: "2018".to_string(),
                cgpa: Some("3.9".to_string()),
            }],
            work_experience: vec![WorkExperience {
                role: "Engineer".to_string(),
                company: "Acme".to_string(),
                year: "2019 - Present".to_string(),
                bullets: vec!["Shipped 3 products".to_string()],
            }],
            projects: vec![Project {
                title: "Compiler".to_string(),
                bullets: vec!["Wrote a parser".to_string()],
                github_url: Some("https://github.com/ada/compiler".to_string()),
            }],
            ..ResumeDocument::default()
        }
    }

    #[test]
    fn test_name_only_document_renders_and_reports_all_gaps() {
        let doc = ResumeDocument::named("Ada");
        let text = render_plain_text(&doc, UserType::Experienced).unwrap();
        assert_eq!(text.trim(), "Ada");
        assert_eq!(
            detect_missing_sections(&doc),
            vec![
                MissingSection::WorkExperience,
                MissingSection::Projects,
                MissingSection::Certifications
            ]
        );
    }

    #[test]
    fn test_nameless_document_rejected() {
        assert!(matches!(
            render_plain_text(&ResumeDocument::default(), UserType::Fresher),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_experienced_order_puts_work_before_education() {
        let text = render_plain_text(&sample(), UserType::Experienced).unwrap();
        let work = text.find("WORK EXPERIENCE").unwrap();
        let edu = text.find("EDUCATION").unwrap();
        assert!(work < edu);
        assert!(text.contains("CGPA: 3.9"));
    }

    #[test]
    fn test_fresher_order_puts_education_first_with_fresher_headings() {
        let text = render_plain_text(&sample(), UserType::Fresher).unwrap();
        let edu = text.find("EDUCATION").unwrap();
        let work = text.find("INTERNSHIPS & WORK EXPERIENCE").unwrap();
        assert!(edu < work);
        assert!(text.contains("ACADEMIC PROJECTS"));
    }

    #[test]
    fn test_project_links_rendered_at_end() {
        let text = render_plain_text(&sample(), UserType::Experienced).unwrap();
        let refs = text.find("REFERENCES").unwrap();
        assert!(refs > text.find("EDUCATION").unwrap());
        assert!(text.contains("Compiler: https://github.com/ada/compiler"));
    }
}
