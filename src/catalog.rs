use crate::decimal::Decimal;
use crate::error::ConfigError;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::Deserialize;

static CATALOG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/catalog");

const CATALOG_FILE: &str = "units.json";

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Unit {
    pub symbol: String,
    /// Power of ten relative to the category's base unit.
    pub exponent: i32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Category {
    pub name: String,
    pub title: String,
    pub units: Vec<Unit>,
}

impl Category {
    pub fn unit_symbols(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|u| u.symbol.as_str())
    }

    pub fn exponent_of(&self, unit: &str) -> Option<i32> {
        self.units
            .iter()
            .find(|u| u.symbol == unit)
            .map(|u| u.exponent)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.units.len() < 2 {
            return Err(ConfigError::TooFewUnits {
                category: self.name.clone(),
                found: self.units.len(),
            });
        }
        if let Some(unit) = self.unit_symbols().duplicates().next() {
            return Err(ConfigError::DuplicateUnit {
                category: self.name.clone(),
                unit: unit.to_string(),
            });
        }
        if let Some(exponent) = self.units.iter().map(|u| u.exponent).duplicates().next() {
            return Err(ConfigError::DuplicateExponent {
                category: self.name.clone(),
                exponent,
            });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    categories: Vec<Category>,
}

/// Immutable table of measurement categories and their units.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitCatalog {
    categories: Vec<Category>,
}

impl UnitCatalog {
    /// The catalog compiled into the binary.
    pub fn embedded() -> Result<Self, ConfigError> {
        let file = CATALOG_DIR
            .get_file(CATALOG_FILE)
            .ok_or_else(|| ConfigError::MissingCatalog(CATALOG_FILE.to_string()))?;
        let text = file
            .contents_utf8()
            .ok_or_else(|| ConfigError::MissingCatalog(CATALOG_FILE.to_string()))?;
        Self::from_json(text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_json::from_str(text)?;

        if let Some(name) = file.categories.iter().map(|c| &c.name).duplicates().next() {
            return Err(ConfigError::DuplicateCategory(name.clone()));
        }
        for category in &file.categories {
            category.validate()?;
        }

        Ok(Self {
            categories: file.categories,
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Result<&Category, ConfigError> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownCategory(name.to_string()))
    }

    pub fn units_of(&self, category: &str) -> Result<Vec<&str>, ConfigError> {
        Ok(self.category(category)?.unit_symbols().collect())
    }

    pub fn exponent_of(&self, category: &str, unit: &str) -> Result<i32, ConfigError> {
        self.category(category)?
            .exponent_of(unit)
            .ok_or_else(|| ConfigError::UnknownUnit {
                category: category.to_string(),
                unit: unit.to_string(),
            })
    }

    /// `value × 10^(exponent(from) − exponent(to))`, exactly.
    pub fn convert(
        &self,
        value: &Decimal,
        category: &str,
        from: &str,
        to: &str,
    ) -> Result<Decimal, ConfigError> {
        let diff = self.exponent_of(category, from)? - self.exponent_of(category, to)?;
        Ok(value.scale_pow10(diff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = UnitCatalog::embedded().unwrap();
        let names: Vec<&str> = catalog.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["length", "mass", "volume"]);

        assert_eq!(
            catalog.units_of("length").unwrap(),
            ["mm", "cm", "dm", "m", "km"]
        );
        assert_eq!(catalog.units_of("mass").unwrap(), ["mg", "g", "hg", "kg", "t"]);
        assert_eq!(catalog.units_of("volume").unwrap(), ["ml", "cl", "dl", "l"]);
    }

    #[test]
    fn test_exponents() {
        let catalog = UnitCatalog::embedded().unwrap();
        assert_eq!(catalog.exponent_of("length", "km").unwrap(), 3);
        assert_eq!(catalog.exponent_of("length", "mm").unwrap(), -3);
        assert_eq!(catalog.exponent_of("mass", "hg").unwrap(), 2);
        assert_eq!(catalog.exponent_of("volume", "l").unwrap(), 0);
    }

    #[test]
    fn test_lookup_failures_are_config_errors() {
        let catalog = UnitCatalog::embedded().unwrap();
        assert_matches!(
            catalog.units_of("time"),
            Err(ConfigError::UnknownCategory(name)) if name == "time"
        );
        assert_matches!(
            catalog.exponent_of("length", "kg"),
            Err(ConfigError::UnknownUnit { unit, .. }) if unit == "kg"
        );
    }

    #[test]
    fn test_convert() {
        let catalog = UnitCatalog::embedded().unwrap();
        let five: Decimal = "5".parse().unwrap();
        assert_eq!(
            catalog.convert(&five, "length", "km", "m").unwrap(),
            "5000".parse().unwrap()
        );
        assert_eq!(
            catalog.convert(&five, "mass", "mg", "t").unwrap(),
            "0.000000005".parse().unwrap()
        );
        assert_eq!(catalog.convert(&five, "volume", "dl", "dl").unwrap(), five);
    }

    #[test]
    fn test_rejects_category_with_single_unit() {
        let json = r#"{"categories":[{"name":"x","title":"X","units":[{"symbol":"a","exponent":0}]}]}"#;
        assert_matches!(
            UnitCatalog::from_json(json),
            Err(ConfigError::TooFewUnits { found: 1, .. })
        );
    }

    #[test]
    fn test_rejects_shared_exponent() {
        let json = r#"{"categories":[{"name":"x","title":"X","units":[
            {"symbol":"a","exponent":1},{"symbol":"b","exponent":1}]}]}"#;
        assert_matches!(
            UnitCatalog::from_json(json),
            Err(ConfigError::DuplicateExponent { exponent: 1, .. })
        );
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let json = r#"{"categories":[{"name":"x","title":"X","units":[
            {"symbol":"a","exponent":1},{"symbol":"a","exponent":2}]}]}"#;
        assert_matches!(
            UnitCatalog::from_json(json),
            Err(ConfigError::DuplicateUnit { .. })
        );

        let json = r#"{"categories":[
            {"name":"x","title":"X","units":[{"symbol":"a","exponent":1},{"symbol":"b","exponent":2}]},
            {"name":"x","title":"Y","units":[{"symbol":"c","exponent":1},{"symbol":"d","exponent":2}]}]}"#;
        assert_matches!(
            UnitCatalog::from_json(json),
            Err(ConfigError::DuplicateCategory(_))
        );
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert_matches!(
            UnitCatalog::from_json("{\"categories\": 3}"),
            Err(ConfigError::MalformedCatalog(_))
        );
    }
}
