use anyhow::Result;
use quack::common::{RowList, RowListBuilder};
use quack::model::{JoinKey, RowBuilder, Variable};
use rand::seq::SliceRandom;
use rand::Rng;

/// Generates random row lists over a fixed set of variables.
///
/// Small value domains produce many matching rows and therefore large key-groups. A binding
/// probability below one produces partial rows.
#[derive(Clone, Debug)]
pub struct RandomTableGenerator {
    variables: Vec<Variable>,
    /// Values are drawn from `0..domain`.
    pub domain: i64,
    /// The maximum number of rows of a table.
    pub max_rows: usize,
    /// The probability that a row binds a variable.
    pub bind_probability: f64,
}

impl RandomTableGenerator {
    /// Creates a new [RandomTableGenerator] for the variables `?v0` to `?v{count - 1}`.
    pub fn new(count: usize) -> Self {
        Self {
            variables: (0..count)
                .map(|idx| Variable::new_unchecked(format!("v{idx}")))
                .collect(),
            domain: 3,
            max_rows: 12,
            bind_probability: 0.8,
        }
    }

    /// Returns the variables that tables and keys are drawn from.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Returns a random table over a random subset of the variables.
    pub fn table(&self, rng: &mut impl Rng) -> Result<RowList<i64>> {
        let schema = self.subset(rng);
        let mut builder = RowListBuilder::new().with_variables(schema.iter().cloned());
        for _ in 0..rng.random_range(0..=self.max_rows) {
            let mut row = RowBuilder::new();
            for variable in &schema {
                if rng.random_bool(self.bind_probability) {
                    row.add(variable.clone(), rng.random_range(0..self.domain))?;
                }
            }
            builder.add_row(row.build());
        }
        Ok(builder.build())
    }

    /// Returns a key over a random subset of the variables in random order.
    pub fn key(&self, rng: &mut impl Rng) -> Result<JoinKey> {
        Ok(JoinKey::try_from_variables(self.subset(rng))?)
    }

    fn subset(&self, rng: &mut impl Rng) -> Vec<Variable> {
        let mut subset = self
            .variables
            .iter()
            .filter(|_| rng.random_bool(0.5))
            .cloned()
            .collect::<Vec<_>>();
        subset.shuffle(rng);
        subset
    }
}
