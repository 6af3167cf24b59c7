use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ExtractError, Result};
use crate::normalizer::{display_name, normalize_surface};

/// One gazetteer entry as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySpec {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Overrides the default display form derived from `name`.
    #[serde(default)]
    pub display: Option<String>,
}

impl EntrySpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            display: None,
        }
    }

    pub fn with_display(name: &str, aliases: &[&str], display: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            display: Some(display.to_string()),
        }
    }
}

/// Fixed list of known values matched as whole words inside a query.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    canonical: Vec<String>,
    /// (surface, index into `canonical`), longest surface first.
    candidates: Vec<(String, usize)>,
}

impl Gazetteer {
    pub fn new(entries: impl IntoIterator<Item = EntrySpec>) -> Self {
        let mut canonical = Vec::new();
        let mut candidates = Vec::new();

        for entry in entries {
            let index = canonical.len();
            canonical.push(
                entry
                    .display
                    .clone()
                    .unwrap_or_else(|| display_name(&entry.name)),
            );
            for surface in std::iter::once(&entry.name).chain(entry.aliases.iter()) {
                let surface = normalize_surface(surface);
                if !surface.is_empty() {
                    candidates.push((surface, index));
                }
            }
        }

        // Stable: equal lengths keep declaration order.
        candidates.sort_by_key(|(surface, _)| std::cmp::Reverse(surface.chars().count()));

        Self {
            canonical,
            candidates,
        }
    }

    pub fn from_names(names: &[&str]) -> Self {
        Self::new(names.iter().map(|name| EntrySpec::new(name)))
    }

    /// Longest candidate that appears in `text` as a whole space-delimited word.
    ///
    /// Padding both sides with a space covers matches at the start, the end,
    /// and the text being exactly the candidate.
    pub fn find_in(&self, text: &str) -> Option<&str> {
        let padded = format!(" {} ", normalize_surface(text));
        self.candidates
            .iter()
            .find(|(surface, _)| padded.contains(&format!(" {surface} ")))
            .map(|(_, index)| self.canonical[*index].as_str())
    }

    /// Case-insensitive exact lookup of a whole span.
    pub fn lookup(&self, text: &str) -> Option<&str> {
        let wanted = normalize_surface(text);
        self.candidates
            .iter()
            .find(|(surface, _)| *surface == wanted)
            .map(|(_, index)| self.canonical[*index].as_str())
    }

    pub fn canonical_names(&self) -> &[String] {
        &self.canonical
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// Serialized form of every gazetteer category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazetteerConfig {
    pub makes: Vec<EntrySpec>,
    /// Smaller list trusted for ORGANIZATION spans from the recognizer.
    pub ner_makes: Vec<EntrySpec>,
    /// Keyed by make; any surface form of the make is accepted.
    #[serde(default)]
    pub models: HashMap<String, Vec<EntrySpec>>,
    pub fuel_types: Vec<EntrySpec>,
    pub locations: Vec<EntrySpec>,
}

#[derive(Debug, Clone, Default)]
pub struct Gazetteers {
    pub makes: Gazetteer,
    pub ner_makes: Gazetteer,
    models: HashMap<String, Gazetteer>,
    pub fuel_types: Gazetteer,
    pub locations: Gazetteer,
}

static BUILTIN: Lazy<Arc<Gazetteers>> = Lazy::new(|| {
    Arc::new(
        Gazetteers::from_config(GazetteerConfig::builtin())
            .expect("built-in model lists are keyed by built-in makes"),
    )
});

impl Gazetteers {
    /// Model lists are re-keyed by the canonical name of their make, so any
    /// surface form of a listed make works as a key. Unknown makes are an error.
    pub fn from_config(config: GazetteerConfig) -> Result<Self> {
        let makes = Gazetteer::new(config.makes);

        let mut models = HashMap::new();
        for (key, entries) in config.models {
            let make = makes.lookup(&key).ok_or_else(|| {
                ExtractError::Gazetteer(format!("model list keyed by unknown make: {key}"))
            })?;
            models.insert(normalize_surface(make), Gazetteer::new(entries));
        }

        Ok(Self {
            makes,
            ner_makes: Gazetteer::new(config.ner_makes),
            models,
            fuel_types: Gazetteer::new(config.fuel_types),
            locations: Gazetteer::new(config.locations),
        })
    }

    /// Process-wide built-in tables, built on first use.
    pub fn builtin() -> Arc<Gazetteers> {
        BUILTIN.clone()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::Gazetteer(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: GazetteerConfig = serde_json::from_str(raw)
            .map_err(|e| ExtractError::Gazetteer(format!("invalid gazetteer JSON: {e}")))?;
        Self::from_config(config)
    }

    /// Model gazetteer for an already-resolved make.
    pub fn models_for(&self, make: &str) -> Option<&Gazetteer> {
        self.models.get(&normalize_surface(make))
    }

    pub fn model_makes(&self) -> usize {
        self.models.len()
    }
}

fn names(list: &[&str]) -> Vec<EntrySpec> {
    list.iter().map(|name| EntrySpec::new(name)).collect()
}

impl GazetteerConfig {
    /// Built-in Sri Lankan vehicle market tables.
    pub fn builtin() -> Self {
        let mut models = HashMap::new();
        models.insert(
            "Toyota".to_string(),
            vec![
                EntrySpec::new("prius"),
                EntrySpec::new("aqua"),
                EntrySpec::new("vitz"),
                EntrySpec::new("axio"),
                EntrySpec::new("corolla"),
                EntrySpec::new("camry"),
                EntrySpec::new("land cruiser"),
                EntrySpec::new("prado"),
                EntrySpec::new("hilux"),
                EntrySpec::new("hiace"),
                EntrySpec::with_display("chr", &["c-hr"], "CHR"),
                EntrySpec::new("yaris"),
                EntrySpec::new("rav4"),
            ],
        );
        models.insert(
            "Honda".to_string(),
            vec![
                EntrySpec::new("vezel"),
                EntrySpec::new("civic"),
                EntrySpec::new("fit"),
                EntrySpec::with_display("crv", &["cr-v"], "CRV"),
                EntrySpec::with_display("hrv", &["hr-v"], "HRV"),
                EntrySpec::new("accord"),
                EntrySpec::new("insight"),
            ],
        );
        models.insert(
            "Nissan".to_string(),
            vec![
                EntrySpec::new("leaf"),
                EntrySpec::with_display("x-trail", &["xtrail"], "X-Trail"),
                EntrySpec::new("sunny"),
                EntrySpec::new("march"),
                EntrySpec::new("note"),
            ],
        );
        models.insert(
            "Suzuki".to_string(),
            vec![
                EntrySpec::new("alto"),
                EntrySpec::with_display("wagon r", &["wagonr"], "Wagon R"),
                EntrySpec::new("swift"),
                EntrySpec::new("every"),
            ],
        );

        Self {
            makes: names(&[
                "toyota",
                "honda",
                "nissan",
                "suzuki",
                "bmw",
                "mercedes-benz",
                "mercedes",
                "audi",
                "mitsubishi",
                "mazda",
                "kia",
                "hyundai",
                "ford",
                "volkswagen",
                "subaru",
                "land rover",
                "range rover",
                "jaguar",
                "porsche",
                "volvo",
                "peugeot",
                "fiat",
            ]),
            ner_makes: names(&[
                "toyota",
                "honda",
                "nissan",
                "suzuki",
                "bmw",
                "mercedes",
                "audi",
                "mitsubishi",
                "mazda",
                "kia",
                "hyundai",
                "ford",
            ]),
            models,
            fuel_types: names(&["petrol", "diesel", "hybrid", "electric", "gas"]),
            locations: names(&[
                "colombo",
                "kandy",
                "galle",
                "negombo",
                "kurunegala",
                "matara",
                "jaffna",
                "gampaha",
                "kalutara",
                "ratnapura",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_boundaries() {
        let g = Gazetteers::builtin();
        assert_eq!(g.makes.find_in("toyota prius"), Some("Toyota"));
        assert_eq!(g.makes.find_in("cheap kia"), Some("Kia"));
        assert_eq!(g.makes.find_in("HONDA"), Some("Honda"));
        assert_eq!(g.makes.find_in("kiasu fordable"), None);
    }

    #[test]
    fn test_longest_candidate_wins() {
        let g = Gazetteers::builtin();
        assert_eq!(g.makes.find_in("mercedes-benz c200"), Some("Mercedes Benz"));
        assert_eq!(g.makes.find_in("mercedes c200"), Some("Mercedes"));
        assert_eq!(g.makes.find_in("used land rover defender"), Some("Land Rover"));
    }

    #[test]
    fn test_equal_length_uses_list_order() {
        let g = Gazetteer::from_names(&["audi", "ford"]);
        assert_eq!(g.find_in("ford or audi"), Some("Audi"));
    }

    #[test]
    fn test_model_aliases() {
        let g = Gazetteers::builtin();
        let honda = g.models_for("Honda").unwrap();
        assert_eq!(honda.find_in("honda cr-v"), Some("CRV"));
        assert_eq!(honda.find_in("honda hrv 2018"), Some("HRV"));
        let toyota = g.models_for("toyota").unwrap();
        assert_eq!(toyota.find_in("toyota c-hr"), Some("CHR"));
        assert_eq!(toyota.find_in("land cruiser prado"), Some("Land Cruiser"));
    }

    #[test]
    fn test_models_absent_for_unlisted_make() {
        let g = Gazetteers::builtin();
        assert!(g.models_for("Porsche").is_none());
    }

    #[test]
    fn test_lookup_is_exact() {
        let g = Gazetteers::builtin();
        assert_eq!(g.locations.lookup("Colombo"), Some("Colombo"));
        assert_eq!(g.locations.lookup("colombo 7"), None);
        assert_eq!(g.ner_makes.lookup("VOLVO"), None);
    }

    #[test]
    fn test_from_json() {
        let raw = r#"{
            "makes": [{"name": "tata"}],
            "ner_makes": [],
            "models": {"tata": [{"name": "nano"}]},
            "fuel_types": [{"name": "cng", "display": "CNG"}],
            "locations": [{"name": "trincomalee", "aliases": ["trinco"]}]
        }"#;
        let g = Gazetteers::from_json_str(raw).unwrap();
        assert_eq!(g.makes.find_in("tata nano"), Some("Tata"));
        assert_eq!(g.models_for("Tata").unwrap().find_in("tata nano"), Some("Nano"));
        assert_eq!(g.fuel_types.find_in("cng"), Some("CNG"));
        assert_eq!(g.locations.find_in("near trinco"), Some("Trincomalee"));
    }

    #[test]
    fn test_model_key_uses_any_make_surface() {
        let raw = r#"{
            "makes": [{"name": "mercedes-benz", "aliases": ["benz"]}],
            "ner_makes": [],
            "models": {"benz": [{"name": "c200", "display": "C200"}]},
            "fuel_types": [],
            "locations": []
        }"#;
        let g = Gazetteers::from_json_str(raw).unwrap();
        let make = g.makes.find_in("mercedes-benz c200").unwrap();
        assert_eq!(make, "Mercedes Benz");
        assert_eq!(g.models_for(make).unwrap().find_in("mercedes-benz c200"), Some("C200"));
    }

    #[test]
    fn test_model_key_for_unknown_make_is_rejected() {
        let raw = r#"{
            "makes": [{"name": "toyota"}],
            "ner_makes": [],
            "models": {"tesla": [{"name": "model 3"}]},
            "fuel_types": [],
            "locations": []
        }"#;
        let err = Gazetteers::from_json_str(raw).unwrap_err();
        assert!(matches!(err, ExtractError::Gazetteer(msg) if msg.contains("tesla")));
    }

    #[test]
    fn test_invalid_json() {
        let err = Gazetteers::from_json_str("{").unwrap_err();
        assert!(matches!(err, ExtractError::Gazetteer(_)));
    }
}
