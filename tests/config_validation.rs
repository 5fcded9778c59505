// tests/config_validation.rs

mod common;
use crate::common::builders::{PipelineConfigBuilder, StepConfigBuilder};

use std::io::Write;

use tempfile::NamedTempFile;
use taskrunner::barrier::{BarrierOptions, Policy};
use taskrunner::config::{PipelineConfig, StepKind, load_and_validate};
use taskrunner::errors::TaskrunnerError;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn expect_config_error(result: taskrunner::Result<PipelineConfig>, needle: &str) {
    match result {
        Err(TaskrunnerError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} should mention {needle:?}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(cfg) => panic!("Expected error, got Ok: {:?}", cfg),
    }
}

#[test]
fn loads_steps_in_file_order_with_policies() {
    let file = write_config(
        r#"
[config]
accumulate_errors = true

[[step]]
name = "fmt"
cmd = "cargo fmt --check"

[[step]]
name = "tests"
group = ["cargo test -p a", "cargo test -p b"]

[[step]]
name = "lint"
group = ["clippy a", "clippy b"]
accumulate_errors = false
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    let default = cfg.config().barrier;
    assert_eq!(default.policy(), Policy::Accumulate);

    let names: Vec<_> = cfg.steps().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["fmt", "tests", "lint"]);

    assert_eq!(cfg.steps()[0].kind(), StepKind::Command("cargo fmt --check"));
    match cfg.steps()[1].kind() {
        StepKind::Group(cmds) => assert_eq!(cmds.len(), 2),
        other => panic!("expected group, got {other:?}"),
    }
    assert_eq!(
        cfg.steps()[1].barrier_options(default).policy(),
        Policy::Accumulate
    );
    assert_eq!(
        cfg.steps()[2].barrier_options(default).policy(),
        Policy::FailFast
    );
}

#[test]
fn config_section_defaults_to_fail_fast() {
    let file = write_config(
        r#"
[[step]]
name = "only"
cmd = "true"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.config().barrier, BarrierOptions::default());
}

#[test]
fn empty_pipeline_is_rejected() {
    let file = write_config("[config]\naccumulate_errors = false\n");
    expect_config_error(load_and_validate(file.path()), "at least one [[step]]");
}

#[test]
fn duplicate_step_names_are_rejected() {
    let raw = PipelineConfigBuilder::new()
        .with_cmd("build", "make")
        .with_cmd("build", "make again")
        .raw();
    expect_config_error(PipelineConfig::try_from(raw), "duplicate step name 'build'");
}

#[test]
fn blank_step_name_is_rejected() {
    let raw = PipelineConfigBuilder::new().with_cmd("  ", "make").raw();
    expect_config_error(PipelineConfig::try_from(raw), "empty name");
}

#[test]
fn step_with_both_cmd_and_group_is_rejected() {
    let mut step = StepConfigBuilder::cmd("both", "make").build();
    step.group = vec!["make test".to_string()];
    let raw = PipelineConfigBuilder::new().with_step(step).raw();
    expect_config_error(PipelineConfig::try_from(raw), "both `cmd` and `group`");
}

#[test]
fn step_with_neither_cmd_nor_group_is_rejected() {
    let raw = PipelineConfigBuilder::new().with_group("nothing", &[]).raw();
    expect_config_error(PipelineConfig::try_from(raw), "either `cmd` or a non-empty `group`");
}

#[test]
fn blank_commands_are_rejected() {
    let raw = PipelineConfigBuilder::new().with_cmd("blank", "   ").raw();
    expect_config_error(PipelineConfig::try_from(raw), "empty `cmd`");

    let raw = PipelineConfigBuilder::new()
        .with_group("blank-group", &["make", ""])
        .raw();
    expect_config_error(PipelineConfig::try_from(raw), "empty command in `group`");
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = write_config("[[step]]\nname = \"x\"\ncmd = \n");

    match load_and_validate(file.path()) {
        Err(TaskrunnerError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(cfg) => panic!("Expected error, got Ok: {:?}", cfg),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Taskrunner.toml");

    match load_and_validate(&missing) {
        Err(TaskrunnerError::IoError(_)) => {}
        Err(e) => panic!("Expected IoError, got: {:?}", e),
        Ok(cfg) => panic!("Expected error, got Ok: {:?}", cfg),
    }
}
