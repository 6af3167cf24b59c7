use tracing::debug;

use crate::gazetteer::Gazetteers;
use crate::price::extract_price_range;
use crate::schema::{EntityLabel, ExternalEntity, ExtractionResult};
use crate::year::extract_year;

/// Fill fields from recognizer spans, in the order the recognizer returned them.
///
/// Each label only feeds one field and only while that field is empty.
pub fn apply_entities(
    result: &mut ExtractionResult,
    entities: &[ExternalEntity],
    gazetteers: &Gazetteers,
) {
    for entity in entities {
        debug!(text = %entity.text, label = entity.label.as_str(), "Recognized entity");

        let filled = match entity.label {
            EntityLabel::Location if result.location.is_none() => result.fill_location(
                gazetteers.locations.lookup(&entity.text).map(str::to_string),
            ),
            EntityLabel::Organization if result.make.is_none() => result.fill_make(
                gazetteers.ner_makes.lookup(&entity.text).map(str::to_string),
            ),
            EntityLabel::Date if result.year.is_none() => {
                result.fill_year(extract_year(&entity.text))
            }
            EntityLabel::Number if !result.has_any_price() => {
                result.fill_prices(extract_price_range(&entity.text))
            }
            _ => false,
        };

        if filled {
            debug!(text = %entity.text, label = entity.label.as_str(), "Entity accepted");
        }
    }
}
