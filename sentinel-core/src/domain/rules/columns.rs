// sentinel-core/src/domain/rules/columns.rs

use crate::domain::dataset::Dataset;

/// Splits a column name into lowercase words.
///
/// Words break on any non-alphanumeric character and on camelCase humps, so
/// `order_id`, `order-id`, `Order Id` and `OrderID` all yield `["order", "id"]`.
pub fn name_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && i > 0 && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            // fooBar, foo2Bar, HTTPServer
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// True when the words of `fragment` appear as a contiguous run of whole words in `name`.
pub fn name_has_words(name: &str, fragment: &str) -> bool {
    contains_run(&name_words(name), &name_words(fragment))
}

fn contains_run(words: &[String], run: &[String]) -> bool {
    !run.is_empty() && words.windows(run.len()).any(|w| w == run)
}

/// Locates a semantic column (email, phone, date...) by name.
///
/// An explicit override is matched exactly. Otherwise the first column, in
/// dataset order, whose name holds one of the fragments as whole words wins:
/// `id` claims `order_id` and `OrderId` but never `paid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMatcher {
    fragments: Vec<String>,
    words: Vec<Vec<String>>,
    explicit: Option<String>,
}

/// Outcome of a column lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMatch<'a> {
    Found { index: usize, name: &'a str },
    /// An explicit column was configured but the dataset lacks it.
    MissingExplicit,
    NotFound,
}

impl ColumnMatcher {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fragments: Vec<String> = fragments
            .into_iter()
            .map(|f| f.as_ref().to_lowercase())
            .collect();
        let words = fragments.iter().map(|f| name_words(f)).collect();
        Self {
            fragments,
            words,
            explicit: None,
        }
    }

    pub fn with_explicit(mut self, column: Option<String>) -> Self {
        self.explicit = column;
        self
    }

    /// True when `name` holds one of the fragments as whole words (case-insensitive).
    pub fn matches_name(&self, name: &str) -> bool {
        let words = name_words(name);
        self.words.iter().any(|run| contains_run(&words, run))
    }

    pub fn locate<'a>(&self, dataset: &'a Dataset) -> ColumnMatch<'a> {
        self.locate_where(dataset, |_| true)
    }

    /// Like `locate`, but name matches whose column fails `accept` are passed over.
    ///
    /// An explicit column is returned as is.
    pub fn locate_where<'a, F>(&self, dataset: &'a Dataset, accept: F) -> ColumnMatch<'a>
    where
        F: Fn(usize) -> bool,
    {
        if let Some(explicit) = &self.explicit {
            return match dataset.column_index(explicit) {
                Some(index) => ColumnMatch::Found {
                    index,
                    name: &dataset.columns()[index],
                },
                None => ColumnMatch::MissingExplicit,
            };
        }

        dataset
            .columns()
            .iter()
            .enumerate()
            .find(|(index, name)| self.matches_name(name) && accept(*index))
            .map(|(index, name)| ColumnMatch::Found {
                index,
                name: name.as_str(),
            })
            .unwrap_or(ColumnMatch::NotFound)
    }

    /// Human-readable reason used in SKIP descriptions.
    pub fn skip_reason(&self, what: &str, outcome: ColumnMatch<'_>) -> String {
        match (outcome, &self.explicit) {
            (ColumnMatch::MissingExplicit, Some(col)) => {
                format!("Configured {} column '{}' not found in dataset", what, col)
            }
            _ => format!(
                "No {} column found (looked for names with the words: {})",
                what,
                self.fragments.join(", ")
            ),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn dataset(cols: &[&str]) -> Result<Dataset> {
        Ok(Dataset::new(
            cols.iter().map(|s| s.to_string()).collect(),
            vec![],
        )?)
    }

    #[test]
    fn test_first_match_in_column_order() -> Result<()> {
        let ds = dataset(&["name", "Work_Email", "email"])?;
        let matcher = ColumnMatcher::new(["email"]);
        assert_eq!(
            matcher.locate(&ds),
            ColumnMatch::Found {
                index: 1,
                name: "Work_Email"
            }
        );
        Ok(())
    }

    #[test]
    fn test_no_match() -> Result<()> {
        let ds = dataset(&["a", "b"])?;
        let matcher = ColumnMatcher::new(["phone"]);
        let outcome = matcher.locate(&ds);
        assert_eq!(outcome, ColumnMatch::NotFound);
        assert!(matcher.skip_reason("phone", outcome).contains("phone"));
        Ok(())
    }

    #[test]
    fn test_explicit_override_is_exact() -> Result<()> {
        let ds = dataset(&["contact", "email"])?;
        let matcher = ColumnMatcher::new(["email"]).with_explicit(Some("contact".into()));
        assert_eq!(
            matcher.locate(&ds),
            ColumnMatch::Found {
                index: 0,
                name: "contact"
            }
        );

        let missing = ColumnMatcher::new(["email"]).with_explicit(Some("Contact".into()));
        let outcome = missing.locate(&ds);
        assert_eq!(outcome, ColumnMatch::MissingExplicit);
        assert!(missing.skip_reason("email", outcome).contains("'Contact'"));
        Ok(())
    }

    #[test]
    fn test_name_words_split() {
        assert_eq!(name_words("order_id"), vec!["order", "id"]);
        assert_eq!(name_words("OrderId"), vec!["order", "id"]);
        assert_eq!(name_words("customer-age"), vec!["customer", "age"]);
        assert_eq!(name_words("Zip Code"), vec!["zip", "code"]);
        assert_eq!(name_words("OrderID"), vec!["order", "id"]);
        assert_eq!(name_words("HTTPStatus"), vec!["http", "status"]);
        assert_eq!(name_words("address2Line"), vec!["address2", "line"]);
        assert!(name_words("__").is_empty());
    }

    #[test]
    fn test_fragments_match_whole_words_only() {
        let id = ColumnMatcher::new(["id"]);
        for name in ["id", "order_id", "OrderId", "customer ID"] {
            assert!(id.matches_name(name), "{}", name);
        }
        for name in ["paid", "valid", "width", "guide"] {
            assert!(!id.matches_name(name), "{}", name);
        }

        let age = ColumnMatcher::new(["age"]);
        assert!(age.matches_name("customer_age"));
        for name in ["message", "stage", "page", "usage", "percentage", "language"] {
            assert!(!age.matches_name(name), "{}", name);
        }
    }

    #[test]
    fn test_multi_word_fragment() {
        assert!(name_has_words("payment_status", "payment_status"));
        assert!(name_has_words("PaymentStatus", "payment_status"));
        assert!(!name_has_words("status_payment", "payment_status"));
        assert!(!name_has_words("prototype", "type"));
    }

    #[test]
    fn test_locate_skips_lookalike_columns() -> Result<()> {
        let ds = dataset(&["paid", "message", "order_id", "price"])?;
        assert_eq!(
            ColumnMatcher::new(["id"]).locate(&ds),
            ColumnMatch::Found {
                index: 2,
                name: "order_id"
            }
        );
        Ok(())
    }

    #[test]
    fn test_locate_where_passes_over_rejected_columns() -> Result<()> {
        let ds = dataset(&["price_note", "price"])?;
        let matcher = ColumnMatcher::new(["price"]);
        assert_eq!(
            matcher.locate_where(&ds, |index| index != 0),
            ColumnMatch::Found {
                index: 1,
                name: "price"
            }
        );
        assert_eq!(matcher.locate_where(&ds, |_| false), ColumnMatch::NotFound);
        Ok(())
    }
}
