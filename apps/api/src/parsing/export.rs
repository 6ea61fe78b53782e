//! Renders normalized records into downloadable tabular artifacts.
//!
//! The spreadsheet layout (column order included) is consumed by the
//! external scoring service, so the column set is fixed here and nowhere
//! else.

use anyhow::{anyhow, Result};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

use crate::models::resume::{ParsedResume, Project, WorkExperience};

/// Rendered into any cell whose underlying value is empty, across every
/// column, so reviewers can tell "not provided" from "blank by accident".
pub const EMPTY_CELL_PLACEHOLDER: &str = "Candidate did not provide this information";

/// Soft amber fill for placeholder cells.
const PLACEHOLDER_FILL: Color = Color::RGB(0xFFF2CC);

const COLUMNS: &[&str] = &[
    "Name",
    "Email",
    "Phone",
    "GitHub",
    "Location",
    "University",
    "Degree",
    "GPA",
    "Graduation Year",
    "Total Experience (Years)",
    "Work Experience",
    "Projects",
    "Skills",
    "Languages",
    "Awards",
    "Certifications",
    "Designations",
];

/// Renders the record set as an `.xlsx` workbook and returns its bytes.
/// The exporter never touches the filesystem or network.
pub fn to_xlsx(records: &[ParsedResume]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Candidates")?;

    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);
    let cell_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_text_wrap();
    let placeholder_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_italic()
        .set_background_color(PLACEHOLDER_FILL);

    for (col, header) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (row, record) in records.iter().enumerate() {
        let row = (row + 1) as u32;
        for (col, value) in record_cells(record).iter().enumerate() {
            let col = col as u16;
            if value.trim().is_empty() {
                sheet.write_string_with_format(row, col, EMPTY_CELL_PLACEHOLDER, &placeholder_format)?;
            } else {
                sheet.write_string_with_format(row, col, value.as_str(), &cell_format)?;
            }
        }
    }

    // Wide columns for the aggregated text cells.
    sheet.set_column_width(10, 50)?;
    sheet.set_column_width(11, 50)?;

    Ok(workbook.save_to_buffer()?)
}

/// Flat delimited variant of the same table, same placeholder policy.
pub fn to_csv(records: &[ParsedResume]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;

    for record in records {
        let row: Vec<String> = record_cells(record)
            .into_iter()
            .map(|value| {
                if value.trim().is_empty() {
                    EMPTY_CELL_PLACEHOLDER.to_string()
                } else {
                    value
                }
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow!("failed to flush csv writer: {e}"))
}

/// Cell values for one record, aligned with [`COLUMNS`]. Empty strings mark
/// cells that get the placeholder treatment.
fn record_cells(record: &ParsedResume) -> Vec<String> {
    vec![
        record.name.clone(),
        record.email.clone(),
        record.phone.clone(),
        record.github.clone(),
        record.location.clone(),
        record.university.clone(),
        record.degree.clone(),
        record.gpa.clone(),
        record.graduation_year.clone(),
        record.total_experience_years.clone(),
        work_experience_text(&record.work_experiences),
        project_text(&record.projects),
        record.skills.join(", "),
        record.languages.join(", "),
        record.awards.join(", "),
        record.certifications.join(", "),
        record.designations.join(", "),
    ]
}

/// One text block per experience (company, position, duration, then bullet
/// lines), blocks separated by a blank line.
fn work_experience_text(experiences: &[WorkExperience]) -> String {
    let blocks: Vec<String> = experiences
        .iter()
        .filter_map(|exp| {
            let mut lines = Vec::new();
            if !exp.company.is_empty() {
                lines.push(format!("Company: {}", exp.company));
            }
            if !exp.position.is_empty() {
                lines.push(format!("Position: {}", exp.position));
            }
            if !exp.duration.is_empty() {
                lines.push(format!("Duration: {}", exp.duration));
            }
            for bullet in &exp.description {
                lines.push(format!("- {bullet}"));
            }
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        })
        .collect();
    blocks.join("\n\n")
}

fn project_text(projects: &[Project]) -> String {
    let blocks: Vec<String> = projects
        .iter()
        .filter_map(|project| {
            let mut lines = Vec::new();
            if !project.name.is_empty() {
                lines.push(format!("Project: {}", project.name));
            }
            for bullet in &project.description {
                lines.push(format!("- {bullet}"));
            }
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        })
        .collect();
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> ParsedResume {
        ParsedResume {
            name: name.to_string(),
            ..ParsedResume::default()
        }
    }

    #[test]
    fn test_cells_align_with_columns() {
        assert_eq!(record_cells(&ParsedResume::default()).len(), COLUMNS.len());
    }

    #[test]
    fn test_work_experience_blocks_separated_by_blank_line() {
        let text = work_experience_text(&[
            WorkExperience {
                company: "Acme".to_string(),
                position: "Engineer".to_string(),
                duration: "2021 - 2022".to_string(),
                description: vec!["shipped the thing".to_string()],
            },
            WorkExperience {
                company: "Globex".to_string(),
                ..WorkExperience::default()
            },
        ]);
        assert_eq!(
            text,
            "Company: Acme\nPosition: Engineer\nDuration: 2021 - 2022\n- shipped the thing\n\nCompany: Globex"
        );
    }

    #[test]
    fn test_all_empty_experiences_collapse_to_empty_cell() {
        assert!(work_experience_text(&[WorkExperience::default()]).is_empty());
    }

    #[test]
    fn test_csv_placeholder_for_missing_fields_only() {
        let record = ParsedResume {
            skills: vec![],
            ..named("Alice")
        };
        let bytes = to_csv(&[record]).unwrap();
        let body = String::from_utf8(bytes).unwrap();

        let mut lines = body.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Name,Email"));

        let data = lines.next().unwrap();
        assert!(data.starts_with("Alice,"));
        assert!(data.contains(EMPTY_CELL_PLACEHOLDER));
    }

    #[test]
    fn test_csv_has_one_row_per_record() {
        let bytes = to_csv(&[named("A"), ParsedResume::default(), named("C")]).unwrap();
        let body = String::from_utf8(bytes).unwrap();
        // Cells never contain newlines here, so line count is row count.
        assert_eq!(body.trim_end().lines().count(), 4);
    }

    #[test]
    fn test_xlsx_produces_a_zip_container() {
        let bytes = to_xlsx(&[named("Alice"), ParsedResume::default()]).unwrap();
        // xlsx is a zip archive; PK magic is enough of a smoke check.
        assert!(bytes.starts_with(b"PK"));
    }
}
