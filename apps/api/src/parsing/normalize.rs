//! Per-record normalization of parsed CV data.
//!
//! Stateless, total, and idempotent: applying `normalize` twice yields the
//! same record as applying it once.

use std::collections::HashSet;

use crate::extract::collapse_whitespace;
use crate::models::resume::{ParsedResume, Project, WorkExperience};

/// Phone numbers are only reformatted when their digit count is in this
/// range; anything else is left exactly as extracted.
const PHONE_DIGITS_MIN: usize = 9;
const PHONE_DIGITS_MAX: usize = 11;

/// Normalizes every record in a batch. Order and length are preserved.
pub fn normalize_all(records: Vec<ParsedResume>) -> Vec<ParsedResume> {
    records.into_iter().map(normalize).collect()
}

pub fn normalize(record: ParsedResume) -> ParsedResume {
    ParsedResume {
        name: record.name.trim().to_string(),
        email: normalize_email(&record.email),
        phone: normalize_phone(&record.phone),
        github: record.github.trim().to_string(),
        location: normalize_location(&record.location),
        university: record.university.trim().to_string(),
        degree: record.degree.trim().to_string(),
        gpa: record.gpa.trim().to_string(),
        graduation_year: record.graduation_year.trim().to_string(),
        total_experience_years: record.total_experience_years.trim().to_string(),
        work_experiences: record
            .work_experiences
            .into_iter()
            .map(normalize_work_experience)
            .collect(),
        projects: record.projects.into_iter().map(normalize_project).collect(),
        skills: dedupe_list(record.skills),
        certifications: dedupe_list(record.certifications),
        designations: clean_list(record.designations),
        languages: clean_list(record.languages),
        awards: clean_list(record.awards),
    }
}

/// Lowercases and strips all whitespace, internal included.
fn normalize_email(email: &str) -> String {
    email
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Reformats phone numbers with 9 to 11 digits as `first 3`-`next 3`-`rest`
/// (10 digits give the familiar 3-3-4 shape). Out-of-range inputs are
/// returned untouched rather than guessed at.
fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if !(PHONE_DIGITS_MIN..=PHONE_DIGITS_MAX).contains(&digits.len()) {
        return phone.to_string();
    }
    format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

/// Collapses whitespace runs and repeated comma sequences (", ,", ",,") left
/// behind by extraction, then trims.
fn normalize_location(location: &str) -> String {
    let mut out = collapse_whitespace(location);
    loop {
        let next = out.replace(", ,", ",").replace(",,", ",");
        if next == out {
            break;
        }
        out = next;
    }
    out.trim().to_string()
}

/// Trims entries, drops empties, and deduplicates case-insensitively while
/// keeping the first occurrence (and its casing).
fn dedupe_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Trims entries and drops empties without deduplicating.
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn normalize_work_experience(exp: WorkExperience) -> WorkExperience {
    WorkExperience {
        company: exp.company.trim().to_string(),
        position: exp.position.trim().to_string(),
        duration: exp.duration.trim().to_string(),
        description: clean_list(exp.description),
    }
}

fn normalize_project(project: Project) -> Project {
    Project {
        name: project.name.trim().to_string(),
        description: clean_list(project.description),
    }
}
