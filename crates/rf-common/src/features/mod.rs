pub mod education;
pub mod experience;
pub mod profile;
pub mod salary;

pub use experience::MissingRequirementPolicy;

use tracing::{info, warn};

use crate::embedding::{Embedder, EmbeddingCache};
use crate::geo::{haversine_km, proximity_score, CoordinateCache, Coordinates, Geocoder};
use crate::schema;
use crate::table::{Table, TableError, Value};

/// Company headquarters; every candidate's residence is measured against it.
pub const DEFAULT_REFERENCE_ADDRESS: &str = "Via dei Fornari 12, Bologna, Italy";

/// Raw performance ratings run 0..=5; `Overall_scaled` divides by this.
const RATING_MAX: f64 = 5.0;

/// Injected collaborators and their process-lifetime caches.
///
/// Constructed once per run and threaded through the calculators; nothing
/// here is global, so tests swap in fake collaborators freely.
pub struct ScoringContext {
    embedder: Box<dyn Embedder>,
    geocoder: Box<dyn Geocoder>,
    embeddings: EmbeddingCache,
    coordinates: CoordinateCache,
    reference_address: String,
}

impl ScoringContext {
    pub fn new(embedder: Box<dyn Embedder>, geocoder: Box<dyn Geocoder>) -> Self {
        Self {
            embedder,
            geocoder,
            embeddings: EmbeddingCache::default(),
            coordinates: CoordinateCache::default(),
            reference_address: DEFAULT_REFERENCE_ADDRESS.to_string(),
        }
    }

    pub fn with_reference_address(mut self, address: impl Into<String>) -> Self {
        self.reference_address = address.into();
        self
    }

    pub fn reference_address(&self) -> &str {
        &self.reference_address
    }

    pub fn warm_embeddings(&mut self, texts: &[&str]) {
        self.embeddings.warm(self.embedder.as_ref(), texts);
    }

    pub fn similarity(&mut self, a: &str, b: &str) -> f64 {
        self.embeddings.similarity(self.embedder.as_ref(), a, b) as f64
    }

    /// Reference coordinates, resolved through the cache on first use.
    pub fn reference_coordinates(&mut self) -> Option<Coordinates> {
        let address = self.reference_address.clone();
        self.coordinates.resolve(self.geocoder.as_ref(), &address)
    }

    pub fn resolve_address(&mut self, address: &str) -> Option<Coordinates> {
        self.coordinates.resolve(self.geocoder.as_ref(), address)
    }
}

/// Candidate residence composed from the most to least specific part,
/// skipping whatever is absent.
pub fn residence_address(table: &Table, row: usize) -> String {
    [
        schema::RESIDENCE_CITY,
        schema::RESIDENCE_PROVINCE,
        schema::RESIDENCE_REGION,
        schema::RESIDENCE_COUNTRY,
    ]
    .iter()
    .filter_map(|col| table.value(row, col).to_display())
    .map(|part| part.trim().to_string())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Distance to the reference address (km) and the derived proximity score,
/// row-parallel. When the reference address itself cannot be resolved the
/// whole pair of columns degrades to missing.
pub fn geo_features(ctx: &mut ScoringContext, table: &Table) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let Some(reference) = ctx.reference_coordinates() else {
        warn!(
            address = ctx.reference_address(),
            "reference address did not geocode; geo features will be empty"
        );
        return (vec![None; table.len()], vec![None; table.len()]);
    };

    let mut distances = Vec::with_capacity(table.len());
    let mut proximities = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let distance = ctx
            .resolve_address(&residence_address(table, row))
            .map(|coords| haversine_km(coords, reference));
        distances.push(distance);
        proximities.push(distance.map(proximity_score));
    }
    (distances, proximities)
}

/// Row-wise arithmetic mean over the requested score columns, ignoring
/// missing entries. `Overall_scaled` is derived from the raw rating when
/// requested but not yet present; requested columns the table simply does
/// not have are skipped with a warning.
pub fn overall_scores(table: &Table, score_columns: &[&str]) -> Vec<Option<f64>> {
    let mut column_values: Vec<Vec<Option<f64>>> = Vec::new();
    for &name in score_columns {
        if table.column_index(name).is_some() {
            column_values.push(numeric_column(table, name));
        } else if name == schema::OVERALL_SCALED && table.column_index(schema::OVERALL).is_some() {
            column_values.push(
                numeric_column(table, schema::OVERALL)
                    .into_iter()
                    .map(|v| v.map(|rating| rating / RATING_MAX))
                    .collect(),
            );
        } else {
            warn!(column = name, "requested score column not present; skipping");
        }
    }

    if column_values.is_empty() {
        warn!("no usable score columns for the overall score");
        return vec![None; table.len()];
    }

    (0..table.len())
        .map(|row| {
            let present: Vec<f64> = column_values.iter().filter_map(|col| col[row]).collect();
            if present.is_empty() {
                None
            } else {
                Some(present.iter().sum::<f64>() / present.len() as f64)
            }
        })
        .collect()
}

fn numeric_column(table: &Table, column: &str) -> Vec<Option<f64>> {
    (0..table.len())
        .map(|row| table.value(row, column).as_number())
        .collect()
}

fn scores_to_values(scores: Vec<Option<f64>>) -> Vec<Value> {
    scores
        .into_iter()
        .map(|s| s.map_or(Value::Missing, Value::number))
        .collect()
}

/// Which feature columns to fold into the aggregate and how to treat a
/// missing experience requirement.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub experience_policy: MissingRequirementPolicy,
    pub overall_columns: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            experience_policy: MissingRequirementPolicy::default(),
            overall_columns: vec![
                schema::STUDY_TITLE_SCORE.into(),
                schema::EXPERIENCE_MATCH_SCORE.into(),
                schema::SALARY_FIT_SCORE.into(),
                schema::STUDY_AREA_SCORE.into(),
                schema::PROFESSIONAL_SIMILARITY_SCORE.into(),
                schema::PROFILE_SIMILARITY_SCORE.into(),
                schema::PROXIMITY_SCORE.into(),
                schema::OVERALL_SCALED.into(),
            ],
        }
    }
}

/// Appends every derived score column to the table, in a fixed order.
pub struct FeatureBuilder<'a> {
    ctx: &'a mut ScoringContext,
    config: FeatureConfig,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(ctx: &'a mut ScoringContext, config: FeatureConfig) -> Self {
        Self { ctx, config }
    }

    pub fn append_all(&mut self, table: &mut Table) -> Result<(), TableError> {
        let education: Vec<Option<f64>> = (0..table.len())
            .map(|row| {
                education::education_score(
                    table.value(row, schema::STUDY_TITLE).as_text(),
                    table.value(row, schema::STUDY_LEVEL).as_text(),
                )
            })
            .collect();
        table.add_column(schema::STUDY_TITLE_SCORE, scores_to_values(education))?;

        let candidate_years =
            experience::parsed_experience_column(table, schema::YEARS_EXPERIENCE);
        let required_years =
            experience::parsed_experience_column(table, schema::YEARS_EXPERIENCE_JOB);
        let experience = experience::experience_match_scores(
            &candidate_years,
            &required_years,
            self.config.experience_policy,
        );
        table.add_column(schema::EXPERIENCE_MATCH_SCORE, scores_to_values(experience))?;

        for (source, target) in [
            (schema::EXPECTED_RAL, schema::SALARY_FIT_SCORE),
            (schema::CURRENT_RAL, schema::CURRENT_SALARY_FIT_SCORE),
        ] {
            let scores: Vec<Option<f64>> = (0..table.len())
                .map(|row| {
                    salary::salary_fit_score(
                        table.value(row, source).as_number(),
                        table.value(row, schema::MINIMUM_RAL).as_number(),
                        table.value(row, schema::MAXIMUM_RAL).as_number(),
                    )
                })
                .collect();
            table.add_column(target, scores_to_values(scores))?;
        }

        let study_area = profile::study_area_scores(self.ctx, table);
        table.add_column(schema::STUDY_AREA_SCORE, scores_to_values(study_area))?;

        let professional = profile::professional_similarity_scores(self.ctx, table);
        table.add_column(
            schema::PROFESSIONAL_SIMILARITY_SCORE,
            scores_to_values(professional),
        )?;

        let profile_scores = profile::profile_similarity_scores(self.ctx, table);
        table.add_column(
            schema::PROFILE_SIMILARITY_SCORE,
            scores_to_values(profile_scores),
        )?;

        info!("computing geographic features; uncached lookups are rate-limited");
        let (distances, proximities) = geo_features(self.ctx, table);
        table.add_column(schema::DISTANCE_KM, scores_to_values(distances))?;
        table.add_column(schema::PROXIMITY_SCORE, scores_to_values(proximities))?;

        let requested: Vec<&str> = self
            .config
            .overall_columns
            .iter()
            .map(String::as_str)
            .collect();
        let overall = overall_scores(table, &requested);
        table.add_column(schema::OVERALL_MATCH_SCORE, scores_to_values(overall))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::geo::{GeocodeError, Geocoder, NullGeocoder};

    struct FixedGeocoder;

    impl Geocoder for FixedGeocoder {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
            if address.contains("Bologna") {
                Ok(Some(Coordinates {
                    lat: 44.4949,
                    lon: 11.3426,
                }))
            } else if address.contains("Milano") {
                Ok(Some(Coordinates {
                    lat: 45.4642,
                    lon: 9.1900,
                }))
            } else {
                Ok(None)
            }
        }
    }

    fn test_context() -> ScoringContext {
        ScoringContext::new(Box::new(HashEmbedder::default()), Box::new(FixedGeocoder))
    }

    fn geo_table(rows: &[(&str, &str)]) -> Table {
        let mut table = Table::new(vec![
            schema::RESIDENCE_CITY.into(),
            schema::RESIDENCE_COUNTRY.into(),
        ])
        .unwrap();
        for (city, country) in rows {
            table
                .push_row(vec![
                    Value::from_csv_field(city),
                    Value::from_csv_field(country),
                ])
                .unwrap();
        }
        table
    }

    #[test]
    fn residence_address_skips_absent_parts() {
        let table = geo_table(&[("Milano", "Italy"), ("", "Italy"), ("", "")]);
        assert_eq!(residence_address(&table, 0), "Milano, Italy");
        assert_eq!(residence_address(&table, 1), "Italy");
        assert_eq!(residence_address(&table, 2), "");
    }

    #[test]
    fn geo_features_measure_distance_to_the_reference() {
        let mut ctx = test_context();
        let table = geo_table(&[("Milano", "Italy"), ("Nowhere", ""), ("", "")]);
        let (distances, proximities) = geo_features(&mut ctx, &table);

        let milan = distances[0].unwrap();
        assert!((milan - 201.0).abs() < 5.0, "got {milan}");
        assert!((proximities[0].unwrap() - 1.0 / (milan + 1.0)).abs() < 1e-12);
        assert_eq!(distances[1], None);
        assert_eq!(proximities[2], None);
    }

    #[test]
    fn unresolvable_reference_degrades_every_row() {
        let mut ctx = ScoringContext::new(
            Box::new(HashEmbedder::default()),
            Box::new(NullGeocoder),
        );
        let table = geo_table(&[("Milano", "Italy")]);
        let (distances, proximities) = geo_features(&mut ctx, &table);
        assert_eq!(distances, vec![None]);
        assert_eq!(proximities, vec![None]);
    }

    #[test]
    fn overall_score_averages_present_values_only() {
        let mut table = Table::new(vec!["a".into(), "b".into()]).unwrap();
        table
            .push_row(vec![Value::number(1.0), Value::number(0.0)])
            .unwrap();
        table
            .push_row(vec![Value::number(0.5), Value::Missing])
            .unwrap();
        table.push_row(vec![Value::Missing, Value::Missing]).unwrap();

        let scores = overall_scores(&table, &["a", "b"]);
        assert_eq!(scores, vec![Some(0.5), Some(0.5), None]);
    }

    #[test]
    fn overall_scaled_is_derived_from_the_raw_rating() {
        let mut table = Table::new(vec![schema::OVERALL.into()]).unwrap();
        table.push_row(vec![Value::number(4.0)]).unwrap();
        table.push_row(vec![Value::Missing]).unwrap();

        let scores = overall_scores(&table, &[schema::OVERALL_SCALED]);
        assert_eq!(scores, vec![Some(0.8), None]);
    }

    #[test]
    fn unknown_score_columns_are_skipped() {
        let mut table = Table::new(vec!["a".into()]).unwrap();
        table.push_row(vec![Value::number(1.0)]).unwrap();
        let scores = overall_scores(&table, &["a", "ghost"]);
        assert_eq!(scores, vec![Some(1.0)]);
    }

    #[test]
    fn feature_builder_appends_every_score_column() {
        let mut table = Table::new(vec![
            schema::ID.into(),
            schema::STUDY_TITLE.into(),
            schema::STUDY_LEVEL.into(),
            schema::STUDY_AREA.into(),
            schema::STUDY_AREA_JOB.into(),
            schema::YEARS_EXPERIENCE.into(),
            schema::YEARS_EXPERIENCE_JOB.into(),
            schema::EXPECTED_RAL.into(),
            schema::MINIMUM_RAL.into(),
            schema::MAXIMUM_RAL.into(),
            schema::SECTOR.into(),
            schema::LAST_ROLE.into(),
            schema::JOB_FAMILY.into(),
            schema::JOB_TITLE.into(),
            schema::RESIDENCE_CITY.into(),
            schema::RESIDENCE_COUNTRY.into(),
            schema::OVERALL.into(),
        ])
        .unwrap();
        table
            .push_row(vec![
                Value::text("1"),
                Value::text("Five-year degree"),
                Value::text("Three-year degree"),
                Value::text("Engineering"),
                Value::text("Mechanical Engineering"),
                Value::text("[3-5]"),
                Value::text("[1-3]"),
                Value::text("30000"),
                Value::text("28000"),
                Value::text("35000"),
                Value::text("Automotive"),
                Value::text("Process Engineer"),
                Value::text("Operations"),
                Value::text("Plant Engineer"),
                Value::text("Milano"),
                Value::text("Italy"),
                Value::text("4"),
            ])
            .unwrap();

        let mut ctx = test_context();
        let mut builder = FeatureBuilder::new(&mut ctx, FeatureConfig::default());
        builder.append_all(&mut table).unwrap();

        for col in [
            schema::STUDY_TITLE_SCORE,
            schema::EXPERIENCE_MATCH_SCORE,
            schema::SALARY_FIT_SCORE,
            schema::CURRENT_SALARY_FIT_SCORE,
            schema::STUDY_AREA_SCORE,
            schema::PROFESSIONAL_SIMILARITY_SCORE,
            schema::PROFILE_SIMILARITY_SCORE,
            schema::DISTANCE_KM,
            schema::PROXIMITY_SCORE,
            schema::OVERALL_MATCH_SCORE,
        ] {
            assert!(
                table.column_index(col).is_some(),
                "missing derived column {col}"
            );
        }

        assert!((table.value(0, schema::STUDY_TITLE_SCORE).as_number().unwrap()
            - 1.0 / 6.0)
            .abs()
            < 1e-12);
        assert_eq!(
            table.value(0, schema::SALARY_FIT_SCORE).as_number(),
            Some(1.0)
        );
        // Current RAL is absent from this table, so its fit column is empty.
        assert!(table.value(0, schema::CURRENT_SALARY_FIT_SCORE).is_missing());
        assert!(table.value(0, schema::OVERALL_MATCH_SCORE).as_number().is_some());
    }
}
