#![cfg(test)]

use anyhow::Result;
use quack::physical::JoinType;
use quack_testsuite::JoinTestCase;

const LEFT: &str = "(table (row (?a 1) (?b 2)) (row (?a 1) (?b 3)) (row (?a 1) (?b 2)))";
const RIGHT: &str = "(table (row (?a 0) (?d 8)) (row (?a 1) (?c 9)))";
const EXPECTED: &str = "(table
    (row (?a 1) (?b 2) (?c 9))
    (row (?a 1) (?b 3) (?c 9))
    (row (?a 1) (?b 2) (?c 9)))";

fn check_inner(name: &str, key: &str, left: &str, right: &str, expected: &str) -> Result<()> {
    JoinTestCase::<i64>::parse(name, key, left, right)?
        .expect_table(expected)?
        .check()?;
    Ok(())
}

fn check_left_outer(name: &str, key: &str, left: &str, right: &str, expected: &str) -> Result<()> {
    JoinTestCase::<i64>::parse(name, key, left, right)?
        .with_join_type(JoinType::LeftOuter)
        .expect_table(expected)?
        .check()?;
    Ok(())
}

#[test]
fn join_on_shared_variable() -> Result<()> {
    check_inner("shared variable", "?a", LEFT, RIGHT, EXPECTED)
}

#[test]
fn join_on_variable_that_no_row_binds() -> Result<()> {
    check_inner("unbound key variable", "?z", LEFT, RIGHT, EXPECTED)
}

#[test]
fn join_on_empty_key() -> Result<()> {
    check_inner("empty key", "", LEFT, RIGHT, EXPECTED)
}

#[test]
fn join_on_key_with_unbound_variable() -> Result<()> {
    check_inner("key with unbound variable", "?a ?z", LEFT, RIGHT, EXPECTED)
}

#[test]
fn join_disjoint_variables() -> Result<()> {
    check_inner(
        "disjoint variables",
        "",
        "(table (row (?x 10)) (row (?z 11)))",
        RIGHT,
        "(table
            (row (?x 10) (?a 0) (?d 8))
            (row (?x 10) (?a 1) (?c 9))
            (row (?z 11) (?a 0) (?d 8))
            (row (?z 11) (?a 1) (?c 9)))",
    )
}

#[test]
fn join_partial_rows_on_multi_variable_key() -> Result<()> {
    check_inner(
        "partial rows",
        "?b ?a",
        "(table (row (?a 1) (?b 2)) (row (?a 1)) (row (?b 3)) (row))",
        "(table (row (?a 1) (?b 2) (?c 1)) (row (?a 1) (?b 3) (?c 2)) (row (?a 2) (?c 3)))",
        "(table
            (row (?a 1) (?b 2) (?c 1))
            (row (?a 1) (?b 2) (?c 1))
            (row (?a 1) (?b 2) (?c 1))
            (row (?a 1) (?b 3) (?c 2))
            (row (?a 1) (?b 3) (?c 2))
            (row (?a 1) (?b 3) (?c 2))
            (row (?a 2) (?b 3) (?c 3))
            (row (?a 2) (?c 3)))",
    )
}

#[test]
fn join_filters_conflicting_non_key_variables() -> Result<()> {
    check_inner(
        "conflicting non-key variable",
        "?a",
        "(table (row (?a 1) (?b 1)) (row (?a 1) (?b 2)))",
        "(table (row (?a 1) (?b 2) (?c 3)) (row (?a 1) (?c 4)))",
        "(table
            (row (?a 1) (?b 2) (?c 3))
            (row (?a 1) (?b 1) (?c 4))
            (row (?a 1) (?b 2) (?c 4)))",
    )
}

#[test]
fn join_many_to_many_groups() -> Result<()> {
    check_inner(
        "many to many",
        "?a",
        "(table (row (?a 1) (?b 1)) (row (?a 1) (?b 2)) (row (?a 2) (?b 3)))",
        "(table (row (?a 1) (?c 1)) (row (?a 1) (?c 2)) (row (?a 3) (?c 3)))",
        "(table
            (row (?a 1) (?b 1) (?c 1))
            (row (?a 1) (?b 1) (?c 2))
            (row (?a 1) (?b 2) (?c 1))
            (row (?a 1) (?b 2) (?c 2)))",
    )
}

#[test]
fn join_without_matches() -> Result<()> {
    check_inner(
        "no matches",
        "?a",
        "(table (row (?a 1)) (row (?a 2)))",
        "(table (row (?a 3)) (row (?a 4)))",
        "(table)",
    )
}

#[test]
fn join_string_values() -> Result<()> {
    JoinTestCase::<String>::parse(
        "strings",
        "?person",
        "(table (row (?person alice) (?age 30)) (row (?person bob) (?age 25)))",
        "(table (row (?person bob) (?city vienna)) (row (?person carol) (?city graz)))",
    )?
    .expect_table("(table (row (?person bob) (?age 25) (?city vienna)))")?
    .check()?;
    Ok(())
}

#[test]
fn left_outer_keeps_unmatched_rows() -> Result<()> {
    check_left_outer(
        "left outer",
        "?a",
        "(table (row (?a 1) (?b 1)) (row (?a 2) (?b 2)) (row (?b 3)))",
        "(table (row (?a 1) (?c 1)) (row (?a 1) (?c 2)) (row (?a 3) (?c 3)))",
        "(table
            (row (?a 1) (?b 1) (?c 1))
            (row (?a 1) (?b 1) (?c 2))
            (row (?a 2) (?b 2))
            (row (?a 1) (?b 3) (?c 1))
            (row (?a 1) (?b 3) (?c 2))
            (row (?a 3) (?b 3) (?c 3)))",
    )
}

#[test]
fn left_outer_with_conflicting_non_key_variable() -> Result<()> {
    check_left_outer(
        "left outer conflict",
        "?a",
        "(table (row (?a 1) (?b 1)))",
        "(table (row (?a 1) (?b 2)))",
        "(table (row (?a 1) (?b 1)))",
    )
}

#[test]
fn left_outer_on_empty_key() -> Result<()> {
    check_left_outer(
        "left outer empty key",
        "",
        "(table (row (?a 1)) (row (?a 2)))",
        "(table (row (?a 1) (?c 9)))",
        "(table (row (?a 1) (?c 9)) (row (?a 2)))",
    )
}
