use serde::{Deserialize, Serialize};

/// Label attached to a span by the named-entity recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityLabel {
    Location,
    Organization,
    Date,
    Number,
    Other(String),
}

impl EntityLabel {
    /// Accepts both the generic label names and the recognizer's native ones.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "LOCATION" | "GPE" | "LOC" => Self::Location,
            "ORGANIZATION" | "ORG" => Self::Organization,
            "DATE" => Self::Date,
            "NUMBER" | "CARDINAL" => Self::Number,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Location => "LOCATION",
            Self::Organization => "ORGANIZATION",
            Self::Date => "DATE",
            Self::Number => "NUMBER",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for EntityLabel {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<EntityLabel> for String {
    fn from(label: EntityLabel) -> Self {
        label.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalEntity {
    pub text: String,
    pub label: EntityLabel,
}

impl ExternalEntity {
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Structured filter produced from a free-text vehicle query.
///
/// Every slot is write-once: the `fill_*` helpers only assign into an
/// empty slot and report whether they did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub make: Option<String>,
    pub model: Option<String>,
    pub location: Option<String>,
    pub year: Option<i32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub fuel_type: Option<String>,
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match (slot.is_none(), value) {
        (true, Some(value)) => {
            *slot = Some(value);
            true
        }
        _ => false,
    }
}

impl ExtractionResult {
    pub fn fill_make(&mut self, value: Option<String>) -> bool {
        fill(&mut self.make, value)
    }

    pub fn fill_model(&mut self, value: Option<String>) -> bool {
        fill(&mut self.model, value)
    }

    pub fn fill_location(&mut self, value: Option<String>) -> bool {
        fill(&mut self.location, value)
    }

    pub fn fill_year(&mut self, value: Option<i32>) -> bool {
        fill(&mut self.year, value)
    }

    pub fn fill_fuel_type(&mut self, value: Option<String>) -> bool {
        fill(&mut self.fuel_type, value)
    }

    /// Fills whichever price bounds are still empty.
    pub fn fill_prices(&mut self, range: PriceRange) -> bool {
        let min = fill(&mut self.min_price, range.min);
        let max = fill(&mut self.max_price, range.max);
        min || max
    }

    pub fn has_any_price(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    pub fn has_all_prices(&self) -> bool {
        self.min_price.is_some() && self.max_price.is_some()
    }

    /// Names of the populated fields, in output order.
    pub fn resolved_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.make.is_some() {
            fields.push("make");
        }
        if self.model.is_some() {
            fields.push("model");
        }
        if self.location.is_some() {
            fields.push("location");
        }
        if self.year.is_some() {
            fields.push("year");
        }
        if self.min_price.is_some() {
            fields.push("min_price");
        }
        if self.max_price.is_some() {
            fields.push("max_price");
        }
        if self.fuel_type.is_some() {
            fields.push("fuel_type");
        }
        fields
    }
}

/// Optional lower and upper price bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}
