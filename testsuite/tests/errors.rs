#![cfg(test)]

use quack::common::{QuackError, RowList};
use quack::model::{Row, RowBuilder, Variable};
use quack::physical::{
    BuildSide, JoinAlgorithm, JoinConfiguration, JoinEngine, JoinType, UnsortedInputPolicy,
};
use quack_testsuite::{parse_key, parse_table, JoinTestCase};
use std::io;

fn row(value: i64) -> Row<i64> {
    let mut builder = RowBuilder::new();
    builder.add(Variable::new_unchecked("a"), value).unwrap();
    builder.build()
}

fn failing_list() -> RowList<i64> {
    RowList::from_stream(
        [Variable::new_unchecked("a")],
        vec![
            Ok(row(1)),
            Err(QuackError::upstream(io::Error::other("scan failed"))),
            Ok(row(2)),
        ],
    )
}

fn healthy_list() -> RowList<i64> {
    RowList::from_rows([Variable::new_unchecked("a")], vec![row(1), row(2)])
}

fn configurations() -> Vec<JoinConfiguration> {
    let mut configurations = vec![JoinConfiguration::new(JoinAlgorithm::NestedLoop)];
    for build_side in [BuildSide::Left, BuildSide::Right, BuildSide::Smaller] {
        let configuration = JoinConfiguration::new(JoinAlgorithm::Hash);
        configurations.push(configuration.with_build_side(build_side));
    }
    for policy in [
        UnsortedInputPolicy::Trust,
        UnsortedInputPolicy::Fallback,
        UnsortedInputPolicy::Reject,
    ] {
        let configuration = JoinConfiguration::new(JoinAlgorithm::Merge);
        configurations.push(configuration.with_unsorted_input(policy));
    }
    configurations
}

#[test]
fn upstream_errors_surface_from_every_algorithm() {
    let key = parse_key("?a").unwrap();
    for configuration in configurations() {
        for join_type in [JoinType::Inner, JoinType::LeftOuter] {
            let engine = JoinEngine::new(configuration.with_join_type(join_type));
            for failing_left in [true, false] {
                let (left, right) = if failing_left {
                    (failing_list(), healthy_list())
                } else {
                    (healthy_list(), failing_list())
                };

                let result = engine.join(&key, left, right).and_then(RowList::materialize);
                assert!(
                    matches!(result, Err(QuackError::Upstream(_))),
                    "{configuration} (failing left: {failing_left}) did not fail: {result:?}"
                );
            }
        }
    }
}

#[test]
fn merge_join_rejects_unsorted_input() {
    let configuration = JoinConfiguration::new(JoinAlgorithm::Merge)
        .with_unsorted_input(UnsortedInputPolicy::Reject);
    let left = parse_table::<i64>("(table (row (?a 2)) (row (?a 1)))").unwrap();
    let right = parse_table::<i64>("(table (row (?a 1)) (row (?a 2)))").unwrap();

    let result = JoinEngine::new(configuration).join(&parse_key("?a").unwrap(), left, right);
    assert!(matches!(result, Err(QuackError::UnsortedInput(_))));
}

#[test]
fn merge_join_rejects_partially_bound_key() {
    let configuration = JoinConfiguration::new(JoinAlgorithm::Merge)
        .with_unsorted_input(UnsortedInputPolicy::Reject);
    let left = parse_table::<i64>("(table (row (?b 2)) (row (?a 1)))").unwrap();
    let right = parse_table::<i64>("(table (row (?a 1)))").unwrap();

    let result = JoinEngine::new(configuration).join(&parse_key("?a").unwrap(), left, right);
    assert!(matches!(result, Err(QuackError::UnsortedInput(_))));
}

#[test]
fn merge_join_falls_back_on_unsorted_input() {
    let case = JoinTestCase::<i64>::parse(
        "unsorted",
        "?a",
        "(table (row (?a 3)) (row (?a 1)) (row (?a 2)) (row (?a 1)))",
        "(table (row (?a 2) (?c 5)) (row (?a 1) (?c 6)))",
    )
    .unwrap()
    .expect_table("(table (row (?a 1) (?c 6)) (row (?a 1) (?c 6)) (row (?a 2) (?c 5)))")
    .unwrap();

    case.check().unwrap();
}
