//! End-to-end tests for the `ordo` binary.
//!
//! Each test writes a plan document to a temp dir and checks the JSON or
//! text output of one subcommand.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PLAN: &str = r#"
[[actions]]
id = "budget"
effort_cost = 1.0
category = "planning"
impacts = { savings = 5.0 }

[[actions]]
id = "emergency-fund"
effort_cost = 4.0
category = "savings"
dependencies = [{ target_id = "budget" }]
impacts = { savings = 40.0 }

[[actions]]
id = "pay-debt"
effort_cost = 6.0
category = "debt"
dependencies = [{ target_id = "budget" }]
impacts = { debt = 60.0 }

[[actions]]
id = "invest"
effort_cost = 3.0
category = "growth"
dependencies = [
    { target_id = "emergency-fund" },
    { target_id = "pay-debt", kind = "soft" },
]

[[actions]]
id = "insurance"
effort_cost = 2.0
category = "protection"

[scores]
budget = 60.0
emergency-fund = 80.0
pay-debt = 90.0
invest = 70.0
insurance = 40.0
"#;

fn ordo_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ordo"));
    cmd.env("ORDO_LOG", "error");
    cmd
}

fn write_plan(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write plan");
    path
}

fn run_json(args: &[&str]) -> Value {
    let output = ordo_cmd()
        .args(["--format", "json"])
        .args(args)
        .output()
        .expect("ordo should not crash");
    assert!(
        output.status.success(),
        "ordo {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

fn str_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v.as_str().expect("string").to_string())
        .collect()
}

fn field_list(value: &Value, pointer: &str) -> Vec<String> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|v| {
            v.pointer(pointer)
                .and_then(Value::as_str)
                .expect("string field")
                .to_string()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// plan
// ---------------------------------------------------------------------------

#[test]
fn plan_json_has_sequence_groups_and_summary() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);

    let json = run_json(&["plan", plan.to_str().expect("utf-8 path")]);

    assert_eq!(
        field_list(&json["sequence"], "/id"),
        vec!["budget", "insurance", "pay-debt", "emergency-fund", "invest"]
    );
    let groups: Vec<Vec<String>> = json["groups"]
        .as_array()
        .expect("groups")
        .iter()
        .map(str_list)
        .collect();
    assert_eq!(
        groups,
        vec![
            vec!["budget", "insurance"],
            vec!["pay-debt", "emergency-fund"],
            vec!["invest"],
        ]
    );
    assert_eq!(json["summary"]["node_count"], 5);
    assert_eq!(json["summary"]["edge_count"], 4);
    assert_eq!(json["summary"]["level_count"], 3);
    assert!(json["content_hash"].as_str().is_some_and(|h| !h.is_empty()));
}

#[test]
fn plan_text_lists_sequence_and_groups() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);

    ordo_cmd()
        .args(["plan", plan.to_str().expect("utf-8 path")])
        .assert()
        .success()
        .stdout(predicate::str::contains("sequence:"))
        .stdout(predicate::str::contains("level 0: budget, insurance"))
        .stdout(predicate::str::contains("5 actions, 4 dependencies, 3 levels"));
}

#[test]
fn plan_reports_repaired_cycle_and_dangling_edge() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(
        dir.path(),
        "plan.json",
        r#"{
            "actions": [
                {"id": "a", "effort_cost": 1, "category": "c",
                 "dependencies": [{"target_id": "b"}, {"target_id": "ghost"}]},
                {"id": "b", "effort_cost": 1, "category": "c",
                 "dependencies": [{"target_id": "a"}]}
            ]
        }"#,
    );

    let json = run_json(&["plan", plan.to_str().expect("utf-8 path")]);
    let diagnostics = &json["diagnostics"];
    assert_eq!(diagnostics["repair"]["removed"].as_array().map(Vec::len), Some(1));
    assert_eq!(diagnostics["dropped_edges"][0]["to"], "ghost");
    assert_eq!(diagnostics["dropped_edges"][0]["reason"], "unknown_target");
    assert_eq!(json["summary"]["edge_count"], 1);

    ordo_cmd()
        .args(["plan", plan.to_str().expect("utf-8 path")])
        .assert()
        .success()
        .stdout(predicate::str::contains("warnings:"))
        .stdout(predicate::str::contains("dropped a -> ghost (unknown_target)"));
}

#[test]
fn plan_context_skips_inapplicable_actions() {
    let dir = TempDir::new().expect("temp dir");
    let content = format!(
        "{PLAN}\n\
         [[actions]]\n\
         id = \"catch-up\"\n\
         effort_cost = 1.0\n\
         category = \"retirement\"\n\
         conditions = [{{ description = \"age 50+\", predicate = {{ type = \"compare\", field = \"age\", op = \"ge\", value = 50.0 }} }}]\n\
         \n\
         [context]\n\
         age = 35\n"
    );
    let plan = write_plan(dir.path(), "plan.toml", &content);

    let json = run_json(&["plan", plan.to_str().expect("utf-8 path")]);
    assert_eq!(str_list(&json["skipped"]), vec!["catch-up"]);
    assert_eq!(json["summary"]["node_count"], 5);
}

// ---------------------------------------------------------------------------
// select
// ---------------------------------------------------------------------------

#[test]
fn select_skips_what_does_not_fit_budget() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);

    let json = run_json(&[
        "select",
        plan.to_str().expect("utf-8 path"),
        "--max-actions",
        "10",
        "--max-effort",
        "7",
    ]);
    assert_eq!(
        field_list(&json["admitted"], "/node/id"),
        vec!["budget", "insurance", "emergency-fund"]
    );
    assert_eq!(json["total_effort"], 7.0);
    assert_eq!(json["exceeded_count_cap"], false);
}

#[test]
fn select_category_coverage_may_overflow_count_cap() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);
    let path = plan.to_str().expect("utf-8 path");

    let json = run_json(&[
        "select",
        path,
        "--max-actions",
        "1",
        "--max-effort",
        "20",
        "--require",
        "debt",
    ]);
    assert_eq!(
        field_list(&json["admitted"], "/node/id"),
        vec!["budget", "pay-debt"]
    );
    assert_eq!(json["admitted"][1]["reason"]["type"], "category_coverage");
    assert_eq!(json["admitted"][1]["reason"]["category"], "debt");
    assert_eq!(json["exceeded_count_cap"], true);

    let strict = run_json(&[
        "select",
        path,
        "--max-actions",
        "1",
        "--max-effort",
        "20",
        "--require",
        "debt",
        "--no-category-overflow",
    ]);
    assert_eq!(field_list(&strict["admitted"], "/node/id"), vec!["budget"]);
    assert_eq!(str_list(&strict["uncovered_categories"]), vec!["debt"]);
}

#[test]
fn select_text_shows_reasons_and_totals() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);

    ordo_cmd()
        .args([
            "select",
            plan.to_str().expect("utf-8 path"),
            "--max-actions",
            "10",
            "--max-effort",
            "7",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("selected:"))
        .stdout(predicate::str::contains("budget"))
        .stdout(predicate::str::contains("3 actions, effort 7.0 used, 0.0 left"));
}

#[test]
fn select_rejects_negative_budget() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);

    ordo_cmd()
        .args([
            "select",
            plan.to_str().expect("utf-8 path"),
            "--max-effort=-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-effort"));
}

#[test]
fn config_file_supplies_selector_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);
    let config = write_plan(
        dir.path(),
        "ordo.toml",
        "[selector]\nmax_actions = 2\nmax_effort = 100.0\n",
    );

    let json = run_json(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "select",
        plan.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(
        field_list(&json["admitted"], "/node/id"),
        vec!["budget", "insurance"]
    );
}

// ---------------------------------------------------------------------------
// query
// ---------------------------------------------------------------------------

#[test]
fn query_ancestors_in_sequence_order() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);

    let json = run_json(&["query", plan.to_str().expect("utf-8 path"), "ancestors", "invest"]);
    assert_eq!(json["known"], true);
    assert_eq!(
        str_list(&json["result"]),
        vec!["budget", "pay-debt", "emergency-fund"]
    );
}

#[test]
fn query_critical_path_prefers_first_declared_dependency() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);

    let json = run_json(&[
        "query",
        plan.to_str().expect("utf-8 path"),
        "critical-path",
        "invest",
    ]);
    assert_eq!(
        str_list(&json["result"]),
        vec!["budget", "emergency-fund", "invest"]
    );
}

#[test]
fn query_dependents_reports_edge_kind() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);

    let json = run_json(&["query", plan.to_str().expect("utf-8 path"), "dependents", "pay-debt"]);
    assert_eq!(json["result"][0]["id"], "invest");
    assert_eq!(json["result"][0]["kind"], "soft");
}

#[test]
fn query_unknown_id_is_empty_not_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);
    let path = plan.to_str().expect("utf-8 path");

    let json = run_json(&["query", path, "descendants", "nope"]);
    assert_eq!(json["known"], false);
    assert!(json["result"].as_array().is_some_and(Vec::is_empty));

    let impact = run_json(&["query", path, "impact", "nope"]);
    assert!(impact["result"].is_null());

    ordo_cmd()
        .args(["query", path, "ancestors", "nope"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown action: nope"));
}

// ---------------------------------------------------------------------------
// listings
// ---------------------------------------------------------------------------

#[test]
fn quick_wins_ranked_by_score() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);
    let path = plan.to_str().expect("utf-8 path");

    let json = run_json(&["quick-wins", path]);
    assert_eq!(
        field_list(&json["actions"], "/id"),
        vec!["emergency-fund", "budget", "insurance"]
    );

    let narrow = run_json(&["quick-wins", path, "--max-effort", "1.5"]);
    assert_eq!(field_list(&narrow["actions"], "/id"), vec!["budget"]);
}

#[test]
fn foundations_are_roots_by_score() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);

    let json = run_json(&["foundations", plan.to_str().expect("utf-8 path")]);
    assert_eq!(field_list(&json["actions"], "/id"), vec!["budget", "insurance"]);
}

#[test]
fn order_with_prerequisites_widens_subset() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);
    let path = plan.to_str().expect("utf-8 path");

    let bare = run_json(&["order", path, "invest", "insurance"]);
    assert_eq!(field_list(&bare["actions"], "/id"), vec!["insurance", "invest"]);

    let widened = run_json(&["order", path, "emergency-fund", "--with-prerequisites"]);
    assert_eq!(
        field_list(&widened["actions"], "/id"),
        vec!["budget", "emergency-fund"]
    );
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

#[test]
fn invalid_action_reports_error_code() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(
        dir.path(),
        "plan.toml",
        "[[actions]]\nid = \"a\"\neffort_cost = -2.0\ncategory = \"c\"\n",
    );
    let path = plan.to_str().expect("utf-8 path");

    ordo_cmd()
        .args(["plan", path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1002]"))
        .stderr(predicate::str::contains("effort_cost is negative"));

    let output = ordo_cmd()
        .args(["--format", "json", "plan", path])
        .output()
        .expect("ordo should not crash");
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stderr).expect("valid JSON error");
    assert_eq!(json["error"]["error_code"], "E1002");
    assert!(json["error"]["suggestion"].is_string());
}

#[test]
fn missing_plan_file_fails_cleanly() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("absent.toml");

    ordo_cmd()
        .args(["plan", missing.to_str().expect("utf-8 path")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read plan"));
}

#[test]
fn malformed_plan_reports_parse_code() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.json", "{\"actions\": [");

    ordo_cmd()
        .args(["plan", plan.to_str().expect("utf-8 path")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2002]"))
        .stderr(predicate::str::contains("Failed to parse plan"));
}

#[test]
fn malformed_config_reports_config_code() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);
    let config = write_plan(dir.path(), "ordo.toml", "[selector\nmax_actions = ");

    ordo_cmd()
        .args([
            "--config",
            config.to_str().expect("utf-8 path"),
            "plan",
            plan.to_str().expect("utf-8 path"),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2001]"));
}

#[test]
fn completions_emit_script() {
    ordo_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ordo"));
}

#[test]
fn select_logs_completion_once() {
    let dir = TempDir::new().expect("temp dir");
    let plan = write_plan(dir.path(), "plan.toml", PLAN);

    let output = ordo_cmd()
        .env("ORDO_LOG", "info")
        .args(["select", plan.to_str().expect("utf-8 path")])
        .output()
        .expect("ordo should not crash");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("selection complete").count(), 1, "{stderr}");
}
