use crate::bag::RowBag;
use crate::table::{parse_key, parse_table};
use anyhow::{ensure, Result};
use itertools::Itertools;
use quack::common::{merge_variables, RowList};
use quack::model::{JoinKey, Row, RowValue, Variable};
use quack::physical::join::{binds_key, JoinOperator, NaturalRowOrder, NestedLoopJoin, RowOrder};
use quack::physical::{
    BuildSide, JoinAlgorithm, JoinConfiguration, JoinEngine, JoinType, UnsortedInputPolicy,
};
use std::fmt::{Display, Formatter};
use std::hash::Hash;
use std::str::FromStr;

/// A join together with its expected result.
///
/// [JoinTestCase::check] executes the join with every algorithm and compares each result with the
/// expected bag of rows. If no result is given, the nested-loop join of the inputs serves as the
/// expected result. Every algorithm is run:
/// - with materialized and with streamed inputs;
/// - directly and through a [JoinEngine], which may skip trivial joins;
/// - with both argument orders, if the join is an inner join.
///
/// Hash joins are run with every [BuildSide]. Merge joins are run with the inputs as given (which
/// must not change the result thanks to the unsorted input fallback) and with sorted inputs.
#[derive(Clone, Debug)]
pub struct JoinTestCase<X> {
    name: String,
    key: JoinKey,
    join_type: JoinType,
    left: Table<X>,
    right: Table<X>,
    expected: Option<RowBag<X>>,
}

impl<X> JoinTestCase<X>
where
    X: RowValue + Hash + Ord + Display,
{
    /// Creates a new inner [JoinTestCase] that is checked against the nested-loop join.
    pub fn new(
        name: impl Into<String>,
        key: JoinKey,
        left: RowList<X>,
        right: RowList<X>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            key,
            join_type: JoinType::Inner,
            left: Table::from_list(left)?,
            right: Table::from_list(right)?,
            expected: None,
        })
    }

    /// Creates a new [JoinTestCase] from a key such as `?a ?b` and two table fixtures.
    pub fn parse(name: impl Into<String>, key: &str, left: &str, right: &str) -> Result<Self>
    where
        X: FromStr,
        X::Err: Display,
    {
        Self::new(name, parse_key(key)?, parse_table(left)?, parse_table(right)?)
    }

    /// Sets the join type. Left-outer joins are not run with swapped inputs.
    #[must_use]
    pub fn with_join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    /// Sets the expected result.
    pub fn expect(mut self, expected: RowList<X>) -> Result<Self> {
        self.expected = Some(RowBag::from_list(expected)?);
        Ok(self)
    }

    /// Sets the expected result from a table fixture.
    pub fn expect_table(self, expected: &str) -> Result<Self>
    where
        X: FromStr,
        X::Err: Display,
    {
        self.expect(parse_table(expected)?)
    }

    /// Returns the result of the nested-loop join of the inputs.
    pub fn oracle(&self) -> Result<RowBag<X>> {
        let result = NestedLoopJoin::new(self.join_type).join(
            &self.key,
            self.left.to_list(InputMode::Materialized),
            self.right.to_list(InputMode::Materialized),
        )?;
        RowBag::from_list(result)
    }

    /// Runs the join in every configuration and fails with a report of all diverging runs.
    ///
    /// Returns the number of runs.
    pub fn check(&self) -> Result<usize> {
        let expected = match &self.expected {
            Some(expected) => expected.clone(),
            None => self.oracle()?,
        };
        let variables = merge_variables(&self.left.variables, &self.right.variables);

        let runs = self.runs();
        let mut errors = Vec::new();
        for run in &runs {
            match self.execute(run) {
                Ok((actual_variables, actual)) => {
                    if actual_variables != variables {
                        errors.push(format!(
                            "{run}: expected variables [{}] but found [{}]",
                            variables.iter().join(" "),
                            actual_variables.iter().join(" ")
                        ));
                    }
                    if let Some(diff) = expected.diff(&actual) {
                        errors.push(format!("{run}: {diff}"));
                    }
                }
                Err(error) => errors.push(format!("{run}: failed with error {error:#}")),
            }
        }

        ensure!(
            errors.is_empty(),
            "{}: {} runs failing from {} runs:\n{}\n",
            self.name,
            errors.len(),
            runs.len(),
            errors.join("\n")
        );
        Ok(runs.len())
    }

    fn runs(&self) -> Vec<JoinRun> {
        let sortable = self.left.binds_key(&self.key) && self.right.binds_key(&self.key);

        let mut configurations = vec![(JoinConfiguration::new(JoinAlgorithm::NestedLoop), false)];
        for build_side in [BuildSide::Left, BuildSide::Right, BuildSide::Smaller] {
            let configuration =
                JoinConfiguration::new(JoinAlgorithm::Hash).with_build_side(build_side);
            configurations.push((configuration, false));
        }
        let merge = JoinConfiguration::new(JoinAlgorithm::Merge);
        configurations.push((merge.with_unsorted_input(UnsortedInputPolicy::Fallback), false));
        configurations.push((merge.with_unsorted_input(UnsortedInputPolicy::Fallback), true));
        if sortable {
            configurations.push((merge.with_unsorted_input(UnsortedInputPolicy::Trust), true));
            configurations.push((merge.with_unsorted_input(UnsortedInputPolicy::Reject), true));
        }

        let swaps: &[bool] = match self.join_type {
            JoinType::Inner => &[false, true],
            JoinType::LeftOuter => &[false],
        };

        let mut runs = Vec::new();
        for (configuration, sorted) in configurations {
            for &swapped in swaps {
                for input in [InputMode::Materialized, InputMode::Streamed] {
                    for via_engine in [false, true] {
                        runs.push(JoinRun {
                            configuration: configuration.with_join_type(self.join_type),
                            sorted,
                            swapped,
                            input,
                            via_engine,
                        });
                    }
                }
            }
        }
        runs
    }

    fn execute(&self, run: &JoinRun) -> Result<(Vec<Variable>, RowBag<X>)> {
        let mut left = self.left.clone();
        let mut right = self.right.clone();
        if run.sorted {
            NaturalRowOrder.sort_rows(&self.key, &mut left.rows);
            NaturalRowOrder.sort_rows(&self.key, &mut right.rows);
        }
        if run.swapped {
            (left, right) = (right, left);
        }

        let engine = JoinEngine::new(run.configuration);
        let left = left.to_list(run.input);
        let right = right.to_list(run.input);
        let result = if run.via_engine {
            engine.join(&self.key, left, right)?
        } else {
            engine.operator::<X>().join(&self.key, left, right)?
        };

        let variables = result.variables().to_vec();
        Ok((variables, RowBag::from_list(result)?))
    }
}

/// The rows and the schema of a join input.
#[derive(Clone, Debug)]
struct Table<X> {
    variables: Vec<Variable>,
    rows: Vec<Row<X>>,
}

impl<X: RowValue> Table<X> {
    fn from_list(list: RowList<X>) -> Result<Self> {
        let variables = list.variables().to_vec();
        Ok(Self {
            variables,
            rows: list.materialize()?,
        })
    }

    fn to_list(&self, input: InputMode) -> RowList<X> {
        let variables = self.variables.iter().cloned();
        match input {
            InputMode::Materialized => RowList::from_rows(variables, self.rows.clone()),
            InputMode::Streamed => {
                RowList::from_stream(variables, self.rows.clone().into_iter().map(Ok))
            }
        }
    }

    fn binds_key(&self, key: &JoinKey) -> bool {
        self.rows.iter().all(|row| binds_key(key, row))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputMode {
    Materialized,
    Streamed,
}

/// A single execution of a [JoinTestCase].
#[derive(Clone, Copy, Debug)]
struct JoinRun {
    configuration: JoinConfiguration,
    sorted: bool,
    swapped: bool,
    input: InputMode,
    via_engine: bool,
}

impl Display for JoinRun {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.configuration)?;
        let flags = [
            (self.sorted, "sorted inputs"),
            (self.swapped, "swapped inputs"),
            (self.input == InputMode::Streamed, "streamed inputs"),
            (self.via_engine, "engine"),
        ];
        let flags = flags.iter().filter(|(set, _)| *set).map(|(_, name)| name);
        write!(f, " [{}]", flags.format(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn inner_join_runs_every_configuration() {
        let case = JoinTestCase::<i64>::parse(
            "shared variable",
            "?a",
            "(table (row (?a 1) (?b 2)))",
            "(table (row (?a 1) (?c 3)))",
        )
        .unwrap()
        .expect_table("(table (row (?a 1) (?b 2) (?c 3)))")
        .unwrap();

        // 8 configurations, 2 argument orders, 2 input modes, with and without engine
        assert_eq!(case.check().unwrap(), 64);
    }

    #[test]
    fn unsortable_inputs_skip_trusting_merge_joins() {
        let case = JoinTestCase::<i64>::parse(
            "partially bound",
            "?a",
            "(table (row (?a 1)) (row (?b 2)))",
            "(table (row (?a 1)))",
        )
        .unwrap()
        .with_join_type(JoinType::LeftOuter);

        // 6 configurations, 2 input modes, with and without engine
        assert_eq!(case.check().unwrap(), 24);
    }

    #[test]
    fn wrong_expectation_is_reported() {
        let case = JoinTestCase::<i64>::parse(
            "wrong",
            "?a",
            "(table (row (?a 1)))",
            "(table (row (?a 1)))",
        )
        .unwrap()
        .expect_table("(table)")
        .unwrap();

        let error = case.check().unwrap_err().to_string();
        assert!(error.starts_with("wrong: 64 runs failing from 64 runs:\n"));
    }

    #[test]
    fn display_run() {
        let run = JoinRun {
            configuration: JoinConfiguration::new(JoinAlgorithm::Merge),
            sorted: true,
            swapped: false,
            input: InputMode::Streamed,
            via_engine: true,
        };
        assert_snapshot!(run, @"merge inner join (unsorted input: fallback) [sorted inputs, streamed inputs, engine]");
    }
}
