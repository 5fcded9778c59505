// tests/pipeline_shell.rs

#![cfg(unix)]

mod common;
use crate::common::builders::{PipelineConfigBuilder, StepConfigBuilder};
use crate::common::{init_tracing, with_timeout};

use std::fs;

use taskrunner::errors::TaskrunnerError;
use taskrunner::exec::{PipelineOptions, ShellBackend, run_pipeline};

#[tokio::test]
async fn shell_steps_run_in_order() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("order.txt");
    let out = out.display();

    let two_a = format!("echo two-a >> {out}.a");
    let two_b = format!("echo two-b >> {out}.b");

    let cfg = PipelineConfigBuilder::new()
        .with_cmd("one", &format!("echo one >> {out}"))
        .with_group("two", &[two_a.as_str(), two_b.as_str()])
        .with_cmd("three", &format!("cat {out}.a {out}.b >> {out} && echo three >> {out}"))
        .build();

    with_timeout(run_pipeline(&cfg, ShellBackend, PipelineOptions::default()))
        .await
        .unwrap();

    let contents = fs::read_to_string(dir.path().join("order.txt")).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines, vec!["one", "two-a", "two-b", "three"]);
}

#[tokio::test]
async fn non_zero_exit_reports_the_exit_code() {
    init_tracing();

    let cfg = PipelineConfigBuilder::new()
        .with_cmd("ok", "true")
        .with_cmd("bad", "exit 3")
        .with_cmd("skipped", "exit 4")
        .build();

    let result = with_timeout(run_pipeline(&cfg, ShellBackend, PipelineOptions::default())).await;

    match result {
        Err(TaskrunnerError::CommandFailed { step, code }) => {
            assert_eq!(step, "bad");
            assert_eq!(code, 3);
        }
        other => panic!("Expected CommandFailed, got: {:?}", other),
    }
}

#[tokio::test]
async fn accumulate_group_collects_every_exit_code() {
    init_tracing();

    let cfg = PipelineConfigBuilder::new()
        .with_step(
            StepConfigBuilder::group("checks", &["exit 2", "true", "echo oops >&2; exit 5"])
                .accumulate_errors(true)
                .build(),
        )
        .build();

    let result = with_timeout(run_pipeline(&cfg, ShellBackend, PipelineOptions::default())).await;

    match result {
        Err(TaskrunnerError::GroupFailed { step, errors }) => {
            assert_eq!(step, "checks");
            let mut codes: Vec<i32> = errors
                .iter()
                .filter_map(|e| match e {
                    TaskrunnerError::CommandFailed { code, .. } => Some(*code),
                    _ => None,
                })
                .collect();
            codes.sort();
            assert_eq!(codes, vec![2, 5]);
        }
        other => panic!("Expected GroupFailed, got: {:?}", other),
    }
}
