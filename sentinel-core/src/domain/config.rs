// sentinel-core/src/domain/config.rs

use chrono::format::{Item, StrftimeItems};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::error::DomainError;
use crate::domain::rules::format::{DEFAULT_EMAIL_PATTERN, DEFAULT_ZIP_PATTERN};
use crate::domain::rules::temporal::DEFAULT_DATE_FORMATS;
use crate::domain::rules::{
    CategoricalCheck, CategoricalRole, ColumnMatcher, DateValidityCheck, DuplicateRowsCheck,
    EmailFormatCheck, NullRateCheck, NumericBound, NumericRangeCheck, OutlierCheck,
    PhoneZipFormatCheck, RowCountAnomalyCheck, Rule, UniqueKeyCheck,
};

// --- CONFIGURATION STRUCTS ---
// Every field has a default so an empty `rules:` block yields the stock thresholds.

#[derive(Debug, Serialize, Deserialize, Validate, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    #[validate(nested)]
    pub null_rate: NullRateConfig,
    #[validate(nested)]
    pub duplicate_rows: DuplicateRowsConfig,
    #[validate(nested)]
    pub unique_key: UniqueKeyConfig,
    #[validate(nested)]
    pub numeric_range: NumericRangeConfig,
    #[validate(nested)]
    pub email_format: EmailFormatConfig,
    #[validate(nested)]
    pub phone_zip_format: PhoneZipConfig,
    #[validate(nested)]
    pub date_validity: DateValidityConfig,
    #[validate(nested)]
    pub categorical_values: CategoricalConfig,
    #[validate(nested)]
    pub row_count_anomaly: RowCountAnomalyConfig,
    #[validate(nested)]
    pub outlier_detection: OutlierConfig,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct NullRateConfig {
    #[validate(range(min = 0.0, max = 1.0, message = "null rate threshold must be within [0, 1]"))]
    pub threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_columns: Option<Vec<String>>,
}

impl Default for NullRateConfig {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            required_columns: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DuplicateRowsConfig {
    #[validate(range(min = 0.0, max = 1.0, message = "duplicate rate must be within [0, 1]"))]
    pub max_rate: f64,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct UniqueKeyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[validate(length(min = 1, message = "at least one ID name fragment is required"))]
    pub fragments: Vec<String>,
}

impl Default for UniqueKeyConfig {
    fn default() -> Self {
        Self {
            column: None,
            fragments: vec!["id".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
#[validate(schema(function = "validate_numeric_override"))]
pub struct NumericRangeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[validate(nested)]
    pub bounds: Vec<NumericBound>,
}

impl Default for NumericRangeConfig {
    fn default() -> Self {
        Self {
            column: None,
            min: None,
            max: None,
            bounds: NumericBound::defaults(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct EmailFormatConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[validate(length(min = 1, message = "at least one email name fragment is required"))]
    pub fragments: Vec<String>,
    #[validate(length(min = 1, message = "email pattern cannot be empty"))]
    pub pattern: String,
}

impl Default for EmailFormatConfig {
    fn default() -> Self {
        Self {
            column: None,
            fragments: vec!["email".to_string()],
            pattern: DEFAULT_EMAIL_PATTERN.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
#[validate(schema(function = "validate_phone_digits"))]
pub struct PhoneZipConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_column: Option<String>,
    #[validate(length(min = 1))]
    pub phone_fragments: Vec<String>,
    #[validate(length(min = 1))]
    pub zip_fragments: Vec<String>,
    #[validate(range(min = 1, max = 32))]
    pub phone_min_digits: usize,
    #[validate(range(min = 1, max = 32))]
    pub phone_max_digits: usize,
    #[validate(length(min = 1, message = "zip pattern cannot be empty"))]
    pub zip_pattern: String,
}

impl Default for PhoneZipConfig {
    fn default() -> Self {
        Self {
            phone_column: None,
            zip_column: None,
            phone_fragments: ["phone", "mobile", "telephone"].map(String::from).to_vec(),
            zip_fragments: ["zip", "postal", "zipcode"].map(String::from).to_vec(),
            phone_min_digits: 10,
            phone_max_digits: 15,
            zip_pattern: DEFAULT_ZIP_PATTERN.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct DateValidityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[validate(length(min = 1))]
    pub fragments: Vec<String>,
    #[validate(length(min = 1, message = "at least one date format is required"))]
    pub formats: Vec<String>,
}

impl Default for DateValidityConfig {
    fn default() -> Self {
        Self {
            column: None,
            fragments: ["date", "time", "timestamp", "datetime"].map(String::from).to_vec(),
            formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct CategoricalConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    #[validate(nested, length(min = 1, message = "at least one categorical role is required"))]
    pub roles: Vec<CategoricalRole>,
}

impl Default for CategoricalConfig {
    fn default() -> Self {
        Self {
            column: None,
            allowed: None,
            roles: CategoricalRole::defaults(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct RowCountAnomalyConfig {
    #[validate(range(min = 0.0, message = "row count threshold cannot be negative"))]
    pub threshold: f64,
}

impl Default for RowCountAnomalyConfig {
    fn default() -> Self {
        Self { threshold: 0.3 }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct OutlierConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[validate(length(min = 1))]
    pub fragments: Vec<String>,
    #[validate(range(exclusive_min = 0.0, message = "IQR multiplier must be positive"))]
    pub multiplier: f64,
    #[validate(range(min = 0.0, max = 1.0, message = "outlier rate must be within [0, 1]"))]
    pub max_outlier_rate: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            column: None,
            fragments: ["price", "amount", "quantity", "qty", "age"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            multiplier: 1.5,
            max_outlier_rate: 0.0,
        }
    }
}

fn validate_phone_digits(config: &PhoneZipConfig) -> Result<(), ValidationError> {
    if config.phone_min_digits > config.phone_max_digits {
        return Err(ValidationError::new("phone_digits")
            .with_message("phone_min_digits cannot exceed phone_max_digits".into()));
    }
    Ok(())
}

fn validate_numeric_override(config: &NumericRangeConfig) -> Result<(), ValidationError> {
    match (config.min, config.max) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("numeric_bounds")
            .with_message("numeric_range.min cannot exceed numeric_range.max".into())),
        _ => Ok(()),
    }
}

// --- RUNTIME ---

fn compile_pattern(rule: &str, pattern: &str) -> Result<Regex, DomainError> {
    Regex::new(pattern).map_err(|e| DomainError::InvalidPattern {
        rule: rule.to_string(),
        reason: e.to_string(),
    })
}

fn check_date_formats(formats: &[String]) -> Result<(), DomainError> {
    for format in formats {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(DomainError::InvalidPattern {
                rule: "date_validity".to_string(),
                reason: format!("'{}' is not a valid date format", format),
            });
        }
    }
    Ok(())
}

impl RulesConfig {
    /// Validates the configuration and builds the ten rules in canonical order.
    pub fn compile(&self) -> Result<Vec<Box<dyn Rule>>, DomainError> {
        self.validate()
            .map_err(|e| DomainError::InvalidConfiguration(e.to_string()))?;

        check_date_formats(&self.date_validity.formats)?;

        let email = EmailFormatCheck::new(
            ColumnMatcher::new(&self.email_format.fragments)
                .with_explicit(self.email_format.column.clone()),
            compile_pattern("email_format", &self.email_format.pattern)?,
        );

        let pz = &self.phone_zip_format;
        let phone_zip = PhoneZipFormatCheck::new(
            ColumnMatcher::new(&pz.phone_fragments).with_explicit(pz.phone_column.clone()),
            ColumnMatcher::new(&pz.zip_fragments).with_explicit(pz.zip_column.clone()),
            (pz.phone_min_digits, pz.phone_max_digits),
            compile_pattern("phone_zip_format", &pz.zip_pattern)?,
        )
        .map_err(|e| DomainError::InvalidPattern {
            rule: "phone_zip_format".into(),
            reason: e.to_string(),
        })?;

        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(NullRateCheck {
                threshold: self.null_rate.threshold,
                required_columns: self.null_rate.required_columns.clone(),
            }),
            Box::new(DuplicateRowsCheck {
                max_rate: self.duplicate_rows.max_rate,
            }),
            Box::new(UniqueKeyCheck {
                matcher: ColumnMatcher::new(&self.unique_key.fragments)
                    .with_explicit(self.unique_key.column.clone()),
            }),
            Box::new(NumericRangeCheck {
                bounds: self.numeric_range.bounds.clone(),
                column: self.numeric_range.column.clone(),
                min: self.numeric_range.min,
                max: self.numeric_range.max,
            }),
            Box::new(email),
            Box::new(phone_zip),
            Box::new(DateValidityCheck {
                matcher: ColumnMatcher::new(&self.date_validity.fragments)
                    .with_explicit(self.date_validity.column.clone()),
                formats: self.date_validity.formats.clone(),
            }),
            Box::new(CategoricalCheck {
                roles: self.categorical_values.roles.clone(),
                column: self.categorical_values.column.clone(),
                allowed: self.categorical_values.allowed.clone(),
            }),
            Box::new(RowCountAnomalyCheck {
                threshold: self.row_count_anomaly.threshold,
            }),
            Box::new(OutlierCheck {
                matcher: ColumnMatcher::new(&self.outlier_detection.fragments)
                    .with_explicit(self.outlier_detection.column.clone()),
                multiplier: self.outlier_detection.multiplier,
                max_outlier_rate: self.outlier_detection.max_outlier_rate,
            }),
        ];

        Ok(rules)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::rules::RuleKind;

    #[test]
    fn test_default_compiles_in_canonical_order() {
        let rules = RulesConfig::default().compile().unwrap();
        let kinds: Vec<RuleKind> = rules.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, RuleKind::ALL.to_vec());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "null_rate:\n  threshold: 0.1\noutlier_detection:\n  multiplier: 3.0\n";
        let config: RulesConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.null_rate.threshold, 0.1);
        assert_eq!(config.outlier_detection.multiplier, 3.0);
        assert_eq!(config.row_count_anomaly.threshold, 0.3);
        assert_eq!(config.unique_key.fragments, vec!["id".to_string()]);
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let mut config = RulesConfig::default();
        config.null_rate.threshold = 1.5;
        let err = config.compile().err().unwrap();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_inverted_phone_digits_rejected() {
        let mut config = RulesConfig::default();
        config.phone_zip_format.phone_min_digits = 16;
        assert!(matches!(
            config.compile(),
            Err(DomainError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_bad_date_format_is_rejected() {
        let mut config = RulesConfig::default();
        config.date_validity.formats = vec!["%Y-%m-%d".into(), "%Q".into()];
        match config.compile() {
            Err(DomainError::InvalidPattern { rule, reason }) => {
                assert_eq!(rule, "date_validity");
                assert!(reason.contains("%Q"));
            }
            other => panic!("expected InvalidPattern, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_bad_regex_names_the_rule() {
        let mut config = RulesConfig::default();
        config.email_format.pattern = "([a-z".into();
        match config.compile() {
            Err(DomainError::InvalidPattern { rule, .. }) => assert_eq!(rule, "email_format"),
            other => panic!("expected InvalidPattern, got {:?}", other.map(|r| r.len())),
        }
    }
}
