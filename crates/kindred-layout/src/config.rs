use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Card geometry and spacing. These are design parameters, never computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub card_width: f64,
    pub card_height: f64,
    /// Horizontal distance between the left edges of consecutive generations.
    pub column_spacing: f64,
    /// Vertical spacing unit; also separates a spouse from their attached lineage.
    pub row_spacing: f64,
    /// Gap between consecutive siblings.
    pub sibling_gap: f64,
    /// Gap kept below a parent's group of children. Defaults to half the row spacing.
    pub group_gap: Option<f64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width: 140.0,
            card_height: 60.0,
            column_spacing: 200.0,
            row_spacing: 80.0,
            sibling_gap: 20.0,
            group_gap: None,
        }
    }
}

impl LayoutConfig {
    pub fn group_gap(&self) -> f64 {
        self.group_gap.unwrap_or(self.row_spacing / 2.0)
    }

    /// Reads overrides from a JSON object, either at the top level or under a `layout` key.
    /// Missing keys keep their defaults, mistyped ones are an error, and the result is
    /// validated.
    pub fn from_json_value(cfg: &Value) -> Result<Self> {
        let cfg = cfg.get("layout").unwrap_or(cfg);
        let config: Self = serde_json::from_value(cfg.clone())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json_value(&value)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("cardWidth", self.card_width),
            ("cardHeight", self.card_height),
            ("columnSpacing", self.column_spacing),
            ("rowSpacing", self.row_spacing),
            ("siblingGap", self.sibling_gap),
            ("groupGap", self.group_gap()),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be a finite, non-negative number (got {value})"),
                });
            }
        }
        if self.card_width <= 0.0 || self.card_height <= 0.0 {
            return Err(Error::InvalidConfig {
                message: "card dimensions must be positive".to_string(),
            });
        }
        if self.column_spacing < self.card_width {
            return Err(Error::InvalidConfig {
                message: format!(
                    "columnSpacing ({}) must be at least cardWidth ({}) so generations do not overlap",
                    self.column_spacing, self.card_width
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_derive_group_gap_from_row_spacing() {
        let cfg = LayoutConfig::default();
        assert_eq!(cfg.group_gap(), 40.0);
        let wider = LayoutConfig {
            row_spacing: 120.0,
            ..Default::default()
        };
        assert_eq!(wider.group_gap(), 60.0);
    }

    #[test]
    fn reads_overrides_from_nested_layout_key() {
        let cfg = LayoutConfig::from_json_value(&json!({
            "layout": { "cardWidth": 160, "columnSpacing": 240, "groupGap": 10 }
        }))
        .unwrap();
        assert_eq!(cfg.card_width, 160.0);
        assert_eq!(cfg.column_spacing, 240.0);
        assert_eq!(cfg.card_height, 60.0);
        assert_eq!(cfg.group_gap(), 10.0);
    }

    #[test]
    fn mistyped_values_are_errors_not_defaults() {
        let err = LayoutConfig::from_json_value(&json!({ "cardWidth": "wide" })).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        let err = LayoutConfig::from_json_str(r#"{"layout":{"rowSpacing":true}}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn direct_deserialize_and_json_loader_agree() {
        let raw = json!({ "cardHeight": 50, "siblingGap": 12, "groupGap": null });
        let direct: LayoutConfig = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(LayoutConfig::from_json_value(&raw).unwrap(), direct);
        assert_eq!(direct.card_height, 50.0);
        assert_eq!(direct.group_gap(), 40.0);
    }

    #[test]
    fn rejects_columns_narrower_than_cards() {
        let err = LayoutConfig::from_json_value(&json!({ "columnSpacing": 100 })).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_negative_gaps() {
        let cfg = LayoutConfig {
            sibling_gap: -1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
