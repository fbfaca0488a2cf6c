//! Natural-language profile texts and the embedding-backed match scores.
//!
//! Field order and connective phrasing are fixed: the embedding backend
//! sees the same sentence shapes for every row, so score differences come
//! from content, not formatting drift.

use crate::schema;
use crate::table::Table;

use super::ScoringContext;

/// Join the present, non-blank fields with `" | "`. `None` when nothing is
/// present.
pub fn joined_fragment(fields: &[Option<String>]) -> Option<String> {
    let present: Vec<String> = fields
        .iter()
        .flatten()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(" | "))
    }
}

/// Candidate-side description: education, sector, last role, seniority,
/// skills. Absent fields are skipped; an all-absent row yields `None`.
pub fn candidate_text(table: &Table, row: usize) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    let title = table.value(row, schema::STUDY_TITLE).to_display();
    let area = table.value(row, schema::STUDY_AREA).to_display();
    match (title, area) {
        (Some(title), Some(area)) => parts.push(format!("{title} in {area}")),
        (Some(title), None) => parts.push(format!("Studied {title}")),
        (None, Some(area)) => parts.push(format!("Studied in {area}")),
        (None, None) => {}
    }

    if let Some(sector) = table.value(row, schema::SECTOR).to_display() {
        parts.push(format!("Worked in the {sector} sector"));
    }
    if let Some(role) = table.value(row, schema::LAST_ROLE).to_display() {
        parts.push(format!("Last held the role of {role}"));
    }
    if let Some(years) = table.value(row, schema::YEARS_EXPERIENCE).to_display() {
        parts.push(format!("with {years} years of experience"));
    }
    if let Some(tags) = table.value(row, schema::TAG).to_display() {
        parts.push(format!("Key skills include: {tags}"));
    }

    assemble(parts)
}

/// Job-side description: title, family, recruitment context, description,
/// ideal profile, educational requirement, required seniority.
pub fn job_text(table: &Table, row: usize) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(title) = table.value(row, schema::JOB_TITLE).to_display() {
        parts.push(format!("Job title: {title}"));
    }
    if let Some(family) = table.value(row, schema::JOB_FAMILY).to_display() {
        parts.push(format!("Department: {family}"));
    }
    if let Some(request) = table.value(row, schema::RECRUITMENT_REQUEST).to_display() {
        parts.push(format!("Recruitment context: {request}"));
    }
    if let Some(description) = table.value(row, schema::JOB_DESCRIPTION).to_display() {
        parts.push(format!("Job description: {description}"));
    }
    if let Some(profile) = table.value(row, schema::CANDIDATE_PROFILE).to_display() {
        parts.push(format!("Ideal candidate profile: {profile}"));
    }

    let level = table.value(row, schema::STUDY_LEVEL).to_display();
    let area = table.value(row, schema::STUDY_AREA_JOB).to_display();
    match (level, area) {
        (Some(level), Some(area)) => {
            parts.push(format!("Educational requirement: {level} in {area}"))
        }
        (Some(level), None) => parts.push(format!("Educational requirement: {level}")),
        (None, Some(area)) => parts.push(format!("Field of study required: {area}")),
        (None, None) => {}
    }

    if let Some(years) = table.value(row, schema::YEARS_EXPERIENCE_JOB).to_display() {
        parts.push(format!("Requires {years} years of experience"));
    }

    assemble(parts)
}

fn assemble(parts: Vec<String>) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(format!("{}.", parts.join(". ")))
    }
}

/// Cosine similarity of the candidate's study area against the posting's
/// required one. Unique values are batch-encoded before scoring.
pub fn study_area_scores(ctx: &mut ScoringContext, table: &Table) -> Vec<Option<f64>> {
    let pairs: Vec<(Option<String>, Option<String>)> = (0..table.len())
        .map(|row| {
            (
                table.value(row, schema::STUDY_AREA).to_display(),
                table.value(row, schema::STUDY_AREA_JOB).to_display(),
            )
        })
        .collect();

    let unique: Vec<&str> = pairs
        .iter()
        .flat_map(|(a, b)| [a.as_deref(), b.as_deref()])
        .flatten()
        .collect();
    ctx.warm_embeddings(&unique);

    pairs
        .iter()
        .map(|(a, b)| match (a.as_deref(), b.as_deref()) {
            (Some(a), Some(b)) => Some(ctx.similarity(a, b)),
            _ => None,
        })
        .collect()
}

/// Sector and last role against the posting's family and title, `" | "`
/// joined on both sides.
pub fn professional_similarity_scores(ctx: &mut ScoringContext, table: &Table) -> Vec<Option<f64>> {
    let pairs: Vec<(Option<String>, Option<String>)> = (0..table.len())
        .map(|row| {
            let candidate = joined_fragment(&[
                table.value(row, schema::SECTOR).to_display(),
                table.value(row, schema::LAST_ROLE).to_display(),
            ]);
            let job = joined_fragment(&[
                table.value(row, schema::JOB_FAMILY).to_display(),
                table.value(row, schema::JOB_TITLE).to_display(),
            ]);
            (candidate, job)
        })
        .collect();

    score_pairs(ctx, &pairs)
}

/// Whole-profile similarity over the assembled candidate and job texts.
pub fn profile_similarity_scores(ctx: &mut ScoringContext, table: &Table) -> Vec<Option<f64>> {
    let pairs: Vec<(Option<String>, Option<String>)> = (0..table.len())
        .map(|row| (candidate_text(table, row), job_text(table, row)))
        .collect();

    score_pairs(ctx, &pairs)
}

fn score_pairs(
    ctx: &mut ScoringContext,
    pairs: &[(Option<String>, Option<String>)],
) -> Vec<Option<f64>> {
    let texts: Vec<&str> = pairs
        .iter()
        .flat_map(|(a, b)| [a.as_deref(), b.as_deref()])
        .flatten()
        .collect();
    ctx.warm_embeddings(&texts);

    pairs
        .iter()
        .map(|(a, b)| match (a.as_deref(), b.as_deref()) {
            (Some(a), Some(b)) => Some(ctx.similarity(a, b)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Table, Value};

    fn candidate_table(
        title: &str,
        area: &str,
        sector: &str,
        role: &str,
        years: &str,
        tag: &str,
    ) -> Table {
        let mut table = Table::new(vec![
            schema::STUDY_TITLE.into(),
            schema::STUDY_AREA.into(),
            schema::SECTOR.into(),
            schema::LAST_ROLE.into(),
            schema::YEARS_EXPERIENCE.into(),
            schema::TAG.into(),
        ])
        .unwrap();
        table
            .push_row(
                [title, area, sector, role, years, tag]
                    .iter()
                    .map(|v| Value::from_csv_field(v))
                    .collect(),
            )
            .unwrap();
        table
    }

    #[test]
    fn candidate_text_uses_fixed_phrasing_in_field_order() {
        let table = candidate_table(
            "Five-year degree",
            "Engineering",
            "Automotive",
            "Process Engineer",
            "[3-5]",
            "CAD, lean",
        );
        assert_eq!(
            candidate_text(&table, 0).unwrap(),
            "Five-year degree in Engineering. Worked in the Automotive sector. \
             Last held the role of Process Engineer. with [3-5] years of experience. \
             Key skills include: CAD, lean."
        );
    }

    #[test]
    fn candidate_text_skips_absent_fields() {
        let table = candidate_table("Doctorate", "", "", "", "", "");
        assert_eq!(candidate_text(&table, 0).unwrap(), "Studied Doctorate.");

        let table = candidate_table("", "Physics", "", "", "", "");
        assert_eq!(candidate_text(&table, 0).unwrap(), "Studied in Physics.");
    }

    #[test]
    fn empty_candidate_yields_no_text() {
        let table = candidate_table("", "", "", "", "", "");
        assert_eq!(candidate_text(&table, 0), None);
    }

    #[test]
    fn job_text_merges_education_requirement() {
        let mut table = Table::new(vec![
            schema::JOB_TITLE.into(),
            schema::STUDY_LEVEL.into(),
            schema::STUDY_AREA_JOB.into(),
        ])
        .unwrap();
        table
            .push_row(vec![
                Value::text("Plant Manager"),
                Value::text("Five-year degree"),
                Value::text("Engineering"),
            ])
            .unwrap();
        assert_eq!(
            job_text(&table, 0).unwrap(),
            "Job title: Plant Manager. Educational requirement: Five-year degree in Engineering."
        );
    }

    #[test]
    fn joined_fragment_keeps_only_present_parts() {
        assert_eq!(
            joined_fragment(&[Some("IT".into()), None, Some("Developer".into())]),
            Some("IT | Developer".into())
        );
        assert_eq!(joined_fragment(&[None, Some("  ".into())]), None);
    }
}
