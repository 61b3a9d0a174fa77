// sentinel-core/src/domain/rules/temporal.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::columns::ColumnMatch;
use super::{
    ColumnMatcher, EvaluationContext, Rule, RuleExecutionError, RuleKind, RuleResult, percent,
    ratio, sample_rows,
};
use crate::domain::dataset::Dataset;

pub const DEFAULT_DATE_FORMATS: [&str; 4] =
    ["%Y-%m-%d", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parsed {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

/// Rule 7: unparseable or future dates.
#[derive(Debug, Clone)]
pub struct DateValidityCheck {
    pub matcher: ColumnMatcher,
    /// chrono format strings, tried in order. RFC 3339 is always accepted.
    pub formats: Vec<String>,
}

impl Default for DateValidityCheck {
    fn default() -> Self {
        Self {
            matcher: ColumnMatcher::new(["date", "time", "timestamp", "datetime"]),
            formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl DateValidityCheck {
    fn parse(&self, raw: &str) -> Option<Parsed> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Parsed::Instant(dt.with_timezone(&Utc)));
        }
        self.formats.iter().find_map(|fmt| {
            NaiveDateTime::parse_from_str(raw, fmt)
                .map(|dt| Parsed::Instant(dt.and_utc()))
                .or_else(|_| NaiveDate::parse_from_str(raw, fmt).map(Parsed::Day))
                .ok()
        })
    }

    /// Date-only values compare by calendar day, timestamps by instant.
    fn is_future(parsed: Parsed, now: DateTime<Utc>) -> bool {
        match parsed {
            Parsed::Day(day) => day > now.date_naive(),
            Parsed::Instant(instant) => instant > now,
        }
    }
}

impl Rule for DateValidityCheck {
    fn kind(&self) -> RuleKind {
        RuleKind::DateValidity
    }

    fn evaluate(
        &self,
        dataset: &Dataset,
        ctx: &EvaluationContext,
    ) -> Result<RuleResult, RuleExecutionError> {
        let threshold = "0 invalid or future dates";
        let (index, column) = match self.matcher.locate(dataset) {
            ColumnMatch::Found { index, name } => (index, name),
            outcome => {
                return Ok(RuleResult::skipped(
                    self.kind(),
                    threshold,
                    self.matcher.skip_reason("date", outcome),
                ));
            }
        };

        let mut unparseable = 0usize;
        let mut future = 0usize;
        let mut offending = Vec::new();
        for (row, raw) in dataset.present_values(index) {
            match self.parse(raw.trim()) {
                None => {
                    unparseable += 1;
                    offending.push(row);
                }
                Some(parsed) if Self::is_future(parsed, ctx.now) => {
                    future += 1;
                    offending.push(row);
                }
                Some(_) => {}
            }
        }

        let failed = !offending.is_empty();
        let metric = format!(
            "{} invalid dates ({})",
            offending.len(),
            percent(ratio(offending.len(), dataset.row_count()))
        );
        let description = if failed {
            format!(
                "'{}' has {} unparseable and {} future values (evaluated at {})",
                column,
                unparseable,
                future,
                ctx.now.format("%Y-%m-%d %H:%M UTC")
            )
        } else {
            format!("Every non-empty value in '{}' is a valid past date", column)
        };

        Ok(RuleResult::verdict(
            self.kind(),
            failed,
            metric,
            threshold,
            description,
            sample_rows(dataset, &offending),
        )
        .on_column(column))
    }
}
