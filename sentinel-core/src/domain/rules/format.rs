// sentinel-core/src/domain/rules/format.rs

use regex::Regex;

use super::columns::ColumnMatch;
use super::{
    ColumnMatcher, EvaluationContext, Rule, RuleExecutionError, RuleKind, RuleResult, percent,
    ratio, sample_rows,
};
use crate::domain::dataset::Dataset;

pub const DEFAULT_EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
pub const DEFAULT_ZIP_PATTERN: &str = r"^\d{5}(-\d{4})?$";
/// Characters tolerated in a phone number besides digits.
const PHONE_CHARSET: &str = r"^[\d\s\-().+]+$";

/// Rows of `column` whose present value does not satisfy `is_valid`.
fn invalid_rows(dataset: &Dataset, column: usize, is_valid: impl Fn(&str) -> bool) -> Vec<usize> {
    dataset
        .present_values(column)
        .filter(|(_, v)| !is_valid(v.trim()))
        .map(|(row, _)| row)
        .collect()
}

/// Rule 5: email shape `local@domain.tld`. Empty cells are left to the null check.
#[derive(Debug, Clone)]
pub struct EmailFormatCheck {
    pub matcher: ColumnMatcher,
    pub pattern: Regex,
}

impl EmailFormatCheck {
    pub fn new(matcher: ColumnMatcher, pattern: Regex) -> Self {
        Self { matcher, pattern }
    }
}

impl Rule for EmailFormatCheck {
    fn kind(&self) -> RuleKind {
        RuleKind::EmailFormat
    }

    fn evaluate(
        &self,
        dataset: &Dataset,
        _ctx: &EvaluationContext,
    ) -> Result<RuleResult, RuleExecutionError> {
        let threshold = "0 malformed values";
        let (index, column) = match self.matcher.locate(dataset) {
            ColumnMatch::Found { index, name } => (index, name),
            outcome => {
                return Ok(RuleResult::skipped(
                    self.kind(),
                    threshold,
                    self.matcher.skip_reason("email", outcome),
                ));
            }
        };

        let invalid = invalid_rows(dataset, index, |v| self.pattern.is_match(v));
        let failed = !invalid.is_empty();
        let metric = format!(
            "{} malformed emails ({})",
            invalid.len(),
            percent(ratio(invalid.len(), dataset.row_count()))
        );
        let description = if failed {
            format!(
                "{} values in '{}' do not look like local@domain.tld",
                invalid.len(),
                column
            )
        } else {
            format!("Every non-empty value in '{}' is a well-formed email", column)
        };

        Ok(RuleResult::verdict(
            self.kind(),
            failed,
            metric,
            threshold,
            description,
            sample_rows(dataset, &invalid),
        )
        .on_column(column))
    }
}

/// Rule 6: phone digit count and ZIP shape.
#[derive(Debug, Clone)]
pub struct PhoneZipFormatCheck {
    pub phone: ColumnMatcher,
    pub zip: ColumnMatcher,
    pub phone_min_digits: usize,
    pub phone_max_digits: usize,
    pub zip_pattern: Regex,
    phone_charset: Regex,
}

impl PhoneZipFormatCheck {
    pub fn new(
        phone: ColumnMatcher,
        zip: ColumnMatcher,
        phone_digits: (usize, usize),
        zip_pattern: Regex,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            phone,
            zip,
            phone_min_digits: phone_digits.0,
            phone_max_digits: phone_digits.1,
            zip_pattern,
            phone_charset: Regex::new(PHONE_CHARSET)?,
        })
    }

    fn is_valid_phone(&self, value: &str) -> bool {
        if !self.phone_charset.is_match(value) {
            return false;
        }
        let digits = value.chars().filter(char::is_ascii_digit).count();
        (self.phone_min_digits..=self.phone_max_digits).contains(&digits)
    }
}

impl Rule for PhoneZipFormatCheck {
    fn kind(&self) -> RuleKind {
        RuleKind::PhoneZipFormat
    }

    fn evaluate(
        &self,
        dataset: &Dataset,
        _ctx: &EvaluationContext,
    ) -> Result<RuleResult, RuleExecutionError> {
        let threshold = format!(
            "phone {}-{} digits, zip {}",
            self.phone_min_digits,
            self.phone_max_digits,
            self.zip_pattern.as_str()
        );

        let phone = self.phone.locate(dataset);
        let zip = self.zip.locate(dataset);

        let mut checked = Vec::new();
        let mut offending = Vec::new();
        let mut parts = Vec::new();

        if let ColumnMatch::Found { index, name } = phone {
            let bad = invalid_rows(dataset, index, |v| self.is_valid_phone(v));
            parts.push(format!("{} invalid phone values in '{}'", bad.len(), name));
            checked.push(name);
            offending.extend(bad);
        }
        if let ColumnMatch::Found { index, name } = zip {
            let bad = invalid_rows(dataset, index, |v| self.zip_pattern.is_match(v));
            parts.push(format!("{} invalid ZIP values in '{}'", bad.len(), name));
            checked.push(name);
            offending.extend(bad);
        }

        if checked.is_empty() {
            let reason = format!(
                "{}; {}",
                self.phone.skip_reason("phone", phone),
                self.zip.skip_reason("ZIP", zip)
            );
            return Ok(RuleResult::skipped(self.kind(), threshold, reason));
        }

        offending.sort_unstable();
        offending.dedup();

        let failed = !offending.is_empty();
        let metric = format!(
            "{} rows with malformed phone/ZIP ({})",
            offending.len(),
            percent(ratio(offending.len(), dataset.row_count()))
        );

        Ok(RuleResult::verdict(
            self.kind(),
            failed,
            metric,
            threshold,
            parts.join("; "),
            sample_rows(dataset, &offending),
        )
        .on_column(checked.join(", ")))
    }
}
