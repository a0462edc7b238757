use anyhow::Result;
use itertools::Itertools;
use quack::common::RowList;
use quack::model::{Row, RowValue};
use std::fmt::Display;
use text_diff::{diff, Difference};

/// A multiset of rows.
///
/// Comparing two bags only relies on [Eq] of the values. The order of the rows is irrelevant but
/// duplicates count.
#[derive(Clone, Debug)]
pub struct RowBag<X> {
    rows: Vec<Row<X>>,
}

impl<X: RowValue + Display> RowBag<X> {
    /// Creates a new [RowBag].
    pub fn new(rows: Vec<Row<X>>) -> Self {
        Self { rows }
    }

    /// Consumes `list` into a [RowBag].
    pub fn from_list(list: RowList<X>) -> Result<Self> {
        Ok(Self::new(list.materialize()?))
    }

    /// Returns the rows in insertion order.
    pub fn rows(&self) -> &[Row<X>] {
        &self.rows
    }

    /// Returns the number of rows, counting duplicates.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns whether both bags contain the same rows with the same multiplicities.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.unmatched(other).is_none()
    }

    /// Returns a readable diff if `actual` is not equivalent to `self`.
    pub fn diff(&self, actual: &Self) -> Option<String> {
        let (missing, unexpected) = self.unmatched(actual)?;
        Some(format!(
            "{} missing and {} unexpected rows\n{}",
            missing.len(),
            unexpected.len(),
            format_diff(&self.to_string(), &actual.to_string(), "rows")
        ))
    }

    /// Removes every row of `actual` that matches a row of `self`. Returns the remaining rows of
    /// both sides, or [None] if nothing remains.
    fn unmatched<'bag>(
        &'bag self,
        actual: &'bag Self,
    ) -> Option<(Vec<&'bag Row<X>>, Vec<&'bag Row<X>>)> {
        let mut unexpected = actual.rows.iter().collect::<Vec<_>>();
        let mut missing = Vec::new();
        for row in &self.rows {
            match unexpected.iter().position(|candidate| *candidate == row) {
                Some(idx) => {
                    unexpected.swap_remove(idx);
                }
                None => missing.push(row),
            }
        }

        if missing.is_empty() && unexpected.is_empty() {
            None
        } else {
            Some((missing, unexpected))
        }
    }
}

impl<X: RowValue + Display> Display for RowBag<X> {
    /// Writes one row per line, sorted by their textual representation.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines = self.rows.iter().map(ToString::to_string).sorted();
        write!(f, "{}", lines.format("\n"))
    }
}

pub fn format_diff(expected: &str, actual: &str, kind: &str) -> String {
    format!(
        "Expected {kind}:\n{expected}\nActual {kind}:\n{actual}\nDiff:\n{}",
        diff(expected, actual, "\n")
            .1
            .into_iter()
            .map(|d| match d {
                Difference::Same(x) => format!(" {x}"),
                Difference::Add(x) => format!("+{x}"),
                Difference::Rem(x) => format!("-{x}"),
            })
            .join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_table;
    use insta::assert_snapshot;

    fn bag(input: &str) -> RowBag<i64> {
        RowBag::from_list(parse_table(input).unwrap()).unwrap()
    }

    #[test]
    fn order_is_irrelevant() {
        let expected = bag("(table (row (?a 1)) (row (?a 2)))");
        let actual = bag("(table (row (?a 2)) (row (?a 1)))");
        assert!(expected.is_equivalent(&actual));
    }

    #[test]
    fn duplicates_count() {
        let expected = bag("(table (row (?a 1)) (row (?a 1)))");
        let actual = bag("(table (row (?a 1)))");

        assert_eq!(expected.len(), 2);
        assert_eq!(actual.len(), 1);
        assert!(!expected.is_equivalent(&actual));
        assert!(!actual.is_equivalent(&expected));
    }

    #[test]
    fn diff_shows_missing_and_unexpected_rows() {
        let expected = bag("(table (row (?a 1)) (row (?a 2)))");
        let actual = bag("(table (row (?a 1)) (row (?a 3)))");

        let diff = expected.diff(&actual).unwrap();
        assert!(diff.starts_with("1 missing and 1 unexpected rows\n"));
        assert!(diff.contains("-( ?a = 2 )"));
        assert!(diff.contains("+( ?a = 3 )"));
    }

    #[test]
    fn equivalent_bags_have_no_diff() {
        let expected = bag("(table (row (?a 1) (?b 2)))");
        let actual = bag("(table (row (?b 2) (?a 1)))");
        assert_eq!(expected.diff(&actual), None);
    }

    #[test]
    fn empty_bag_has_no_rows() {
        let empty = bag("(table (vars ?a))");
        assert!(empty.is_empty());
        assert!(empty.rows().is_empty());
        assert!(!bag("(table (row))").is_empty());
    }

    #[test]
    fn display_sorts_rows() {
        assert_snapshot!(bag("(table (row (?b 2)) (row (?a 1)) (row))"), @r"
        ( )
        ( ?a = 1 )
        ( ?b = 2 )
        ");
    }
}
