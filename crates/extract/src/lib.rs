pub mod error;
pub mod fallback;
pub mod fusion;
pub mod gazetteer;
pub mod ner;
pub mod normalizer;
pub mod price;
pub mod schema;
pub mod units;
pub mod year;

pub use error::{ExtractError, Result};
pub use gazetteer::{EntrySpec, Gazetteer, GazetteerConfig, Gazetteers};
pub use ner::{EntityRecognizer, HttpRecognizer};
pub use price::extract_price_range;
pub use schema::{EntityLabel, ExternalEntity, ExtractionResult, PriceRange};
pub use year::extract_year;

use std::sync::Arc;
use tracing::{debug, info};

/// Turns free-text vehicle queries into structured search filters.
#[derive(Clone)]
pub struct Extractor {
    recognizer: Arc<dyn EntityRecognizer>,
    gazetteers: Arc<Gazetteers>,
}

impl Extractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, gazetteers: Arc<Gazetteers>) -> Self {
        Self {
            recognizer,
            gazetteers,
        }
    }

    /// Extractor over the built-in gazetteers.
    pub fn with_builtin_gazetteers(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self::new(recognizer, Gazetteers::builtin())
    }

    pub fn gazetteers(&self) -> &Gazetteers {
        &self.gazetteers
    }

    /// Whether the recognizer is up.
    pub async fn ready(&self) -> anyhow::Result<()> {
        self.recognizer.ready().await
    }

    /// Extract filters from a query.
    ///
    /// The recognizer is called exactly once; its failure is returned as
    /// `CollaboratorUnavailable`, never retried here.
    pub async fn extract(&self, query: &str) -> Result<ExtractionResult> {
        if query.trim().is_empty() {
            return Err(ExtractError::Input("query parameter missing".to_string()));
        }

        let entities = self
            .recognizer
            .recognize(query)
            .await
            .map_err(ExtractError::CollaboratorUnavailable)?;
        debug!(entities = entities.len(), "Recognizer returned entities");

        let result = resolve(query, &entities, &self.gazetteers);
        info!(query, fields = ?result.resolved_fields(), "Extracted query filters");

        Ok(result)
    }
}

/// Combine recognizer output with rule-based matching.
///
/// Recognizer spans are applied first, then every field still empty is
/// retried against the full query. A field keeps the first value written.
pub fn resolve(
    query: &str,
    entities: &[ExternalEntity],
    gazetteers: &Gazetteers,
) -> ExtractionResult {
    let mut result = ExtractionResult::default();
    fusion::apply_entities(&mut result, entities, gazetteers);
    fallback::apply_rules(&mut result, query, gazetteers);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedRecognizer(Vec<ExternalEntity>);

    #[async_trait]
    impl EntityRecognizer for FixedRecognizer {
        async fn recognize(&self, _text: &str) -> anyhow::Result<Vec<ExternalEntity>> {
            Ok(self.0.clone())
        }
    }

    struct DownRecognizer;

    #[async_trait]
    impl EntityRecognizer for DownRecognizer {
        async fn recognize(&self, _text: &str) -> anyhow::Result<Vec<ExternalEntity>> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn test_recognizer_value_takes_precedence() {
        let entities = vec![ExternalEntity::new("Matara", EntityLabel::Location)];
        let result = resolve("car in colombo or matara", &entities, &Gazetteers::builtin());
        assert_eq!(result.location.as_deref(), Some("Matara"));
    }

    #[test]
    fn test_recognizer_make_drives_model() {
        let entities = vec![ExternalEntity::new("honda", EntityLabel::Organization)];
        let result = resolve("toyota or honda fit", &entities, &Gazetteers::builtin());
        assert_eq!(result.make.as_deref(), Some("Honda"));
        assert_eq!(result.model.as_deref(), Some("Fit"));
    }

    #[test]
    fn test_recognizer_year_is_not_reused_as_price() {
        let entities = vec![ExternalEntity::new("2018", EntityLabel::Date)];
        let result = resolve("honda vezel 2018", &entities, &Gazetteers::builtin());
        assert_eq!(result.year, Some(2018));
        assert_eq!(result.max_price, None);
    }

    #[tokio::test]
    async fn test_extract_rejects_blank_query() {
        let extractor = Extractor::with_builtin_gazetteers(Arc::new(FixedRecognizer(vec![])));
        let err = extractor.extract("   ").await.unwrap_err();
        assert!(matches!(err, ExtractError::Input(_)));
    }

    #[tokio::test]
    async fn test_extract_surfaces_recognizer_failure() {
        let extractor = Extractor::with_builtin_gazetteers(Arc::new(DownRecognizer));
        let err = extractor.extract("toyota aqua").await.unwrap_err();
        assert!(matches!(err, ExtractError::CollaboratorUnavailable(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_extract_partial_result_is_ok() {
        let extractor = Extractor::with_builtin_gazetteers(Arc::new(FixedRecognizer(vec![])));
        let result = extractor.extract("something cheap").await.unwrap();
        assert_eq!(result, ExtractionResult::default());
    }
}
