use std::borrow::Cow;
use tracing::debug;

use crate::gazetteer::Gazetteers;
use crate::price::extract_price_range_with;
use crate::schema::ExtractionResult;
use crate::year::{find_year, YearMatch};

/// Rule-based pass over the full query for every field still empty.
///
/// Order matters: the model list is chosen by the make resolved just before it.
pub fn apply_rules(result: &mut ExtractionResult, query: &str, gazetteers: &Gazetteers) {
    if result.fill_make(gazetteers.makes.find_in(query).map(str::to_string)) {
        debug!(make = ?result.make, "Make matched by rules");
    }

    if result.model.is_none() {
        let model = result
            .make
            .as_deref()
            .and_then(|make| gazetteers.models_for(make))
            .and_then(|models| models.find_in(query))
            .map(str::to_string);
        if result.fill_model(model) {
            debug!(model = ?result.model, "Model matched by rules");
        }
    }

    if result.fill_year(find_year(query).map(|m| m.value)) {
        debug!(year = ?result.year, "Year matched by rules");
    }

    // Only the empty bound is filled, so min and max may come from different
    // patterns and can end up equal (recognizer "20 lakh" as max, then
    // "over 20 lakh" in the query as min).
    if !result.has_all_prices() {
        let bare_text = without_year(query, result.year);
        if result.fill_prices(extract_price_range_with(query, &bare_text)) {
            debug!(min_price = ?result.min_price, max_price = ?result.max_price, "Price matched by rules");
        }
    }

    if result.fill_fuel_type(gazetteers.fuel_types.find_in(query).map(str::to_string)) {
        debug!(fuel_type = ?result.fuel_type, "Fuel type matched by rules");
    }

    if result.fill_location(gazetteers.locations.find_in(query).map(str::to_string)) {
        debug!(location = ?result.location, "Location matched by rules");
    }
}

/// Blank out the token already taken as the year so the bare-number price
/// pattern doesn't read a model year again as a price.
fn without_year(query: &str, year: Option<i32>) -> Cow<'_, str> {
    let Some(year) = year else {
        return Cow::Borrowed(query);
    };

    let mut from = 0;
    while let Some(m) = find_year(&query[from..]) {
        let YearMatch { value, start, end } = m;
        let (start, end) = (from + start, from + end);
        if value == year {
            let mut masked = String::with_capacity(query.len());
            masked.push_str(&query[..start]);
            masked.push_str(&" ".repeat(end - start));
            masked.push_str(&query[end..]);
            return Cow::Owned(masked);
        }
        from = end;
    }
    Cow::Borrowed(query)
}
