//! Tests for the run_script and stress_endpoint actions

mod common;

use std::collections::BTreeMap;
use std::path::PathBuf;

use common::{capturing_runner, take, test_config};
use k6::{run_script, stress_endpoint, K6Error, MockProcessRunner, OutputTarget, RunScriptOptions, Stage, StressOptions};

fn args(invocation: &k6::Invocation) -> Vec<&str> {
    invocation.args.iter().map(|arg| arg.to_str().unwrap()).collect()
}

#[tokio::test]
async fn test_run_script() {
    // Arrange
    let (runner, captured) = capturing_runner(true);
    let opts = RunScriptOptions {
        vus: Some(5),
        duration: Some("10m".into()),
        debug: true,
        ..RunScriptOptions::new("../myscript.js")
    };

    // Act
    let result = run_script(&runner, &test_config(), &opts).await.unwrap();

    // Assert
    assert!(result);
    let invocation = take(&captured);
    assert_eq!(invocation.program, "k6");
    assert_eq!(
        args(&invocation),
        vec!["run", "--quiet", "--vus", "5", "--duration", "10m", "../myscript.js"]
    );
    assert!(invocation.env.is_empty());
    assert_eq!(invocation.output, OutputTarget::Inherit);
}

#[tokio::test]
async fn test_run_script_env_overrides() {
    let (runner, captured) = capturing_runner(true);
    let opts = RunScriptOptions {
        vus: Some(5),
        duration: Some("10m".into()),
        environ: BTreeMap::from([("TEST".to_string(), "newvalue".to_string())]),
        ..RunScriptOptions::new("../myscript.js")
    };

    assert!(run_script(&runner, &test_config(), &opts).await.unwrap());

    let invocation = take(&captured);
    assert_eq!(invocation.env["TEST"], "newvalue");
    let inherited = vec![
        ("TEST".to_string(), "original".to_string()),
        ("OTHER".to_string(), "123".to_string()),
    ];
    let resolved = k6::invocation::resolve_env(inherited, &invocation.env);
    assert_eq!(
        resolved,
        BTreeMap::from([
            ("TEST".to_string(), "newvalue".to_string()),
            ("OTHER".to_string(), "123".to_string()),
        ])
    );
}

#[tokio::test]
async fn test_run_script_stages() {
    let (runner, captured) = capturing_runner(true);
    let opts = RunScriptOptions {
        stages: Some(vec![
            Stage::new("10m", 10),
            Stage::new("5m", 50),
            Stage::new("1h10m2s", 100),
        ]),
        ..RunScriptOptions::new("../myscript.js")
    };

    assert!(run_script(&runner, &test_config(), &opts).await.unwrap());

    assert_eq!(
        args(&take(&captured)),
        vec![
            "run",
            "--quiet",
            "--stage",
            "10m:10",
            "--stage",
            "5m:50",
            "--stage",
            "1h10m2s:100",
            "../myscript.js"
        ]
    );
}

#[tokio::test]
async fn test_run_script_iterations() {
    let (runner, captured) = capturing_runner(true);
    let opts = RunScriptOptions {
        iterations: Some(10),
        duration: Some("10m".into()),
        vus: None,
        ..RunScriptOptions::new("../myscript.js")
    };

    assert!(run_script(&runner, &test_config(), &opts).await.unwrap());

    let invocation = take(&captured);
    assert_eq!(args(&invocation), vec!["run", "--quiet", "--iterations", "10", "../myscript.js"]);
    assert!(!invocation.args.iter().any(|arg| arg == "--duration"));
}

#[tokio::test]
async fn test_run_script_defaults_and_log_file() {
    let (runner, captured) = capturing_runner(true);
    let opts = RunScriptOptions {
        log_file: Some(PathBuf::from("k6.log")),
        ..RunScriptOptions::new("script.js")
    };

    assert!(run_script(&runner, &test_config(), &opts).await.unwrap());

    let invocation = take(&captured);
    assert_eq!(
        args(&invocation),
        vec!["run", "--quiet", "--vus", "1", "--duration", "1s", "script.js"]
    );
    assert_eq!(invocation.output, OutputTarget::File(PathBuf::from("k6.log")));
}

#[tokio::test]
async fn test_run_script_reports_runner_failure() {
    let (runner, _captured) = capturing_runner(false);
    let result = run_script(&runner, &test_config(), &RunScriptOptions::new("script.js"))
        .await
        .unwrap();
    assert!(!result);
}

#[tokio::test]
async fn test_run_script_missing_binary_is_distinct() {
    let mut runner = MockProcessRunner::new();
    runner.expect_run().times(1).returning(|invocation| {
        Err(K6Error::driver_unavailable(
            invocation.program,
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ))
    });

    let err = run_script(&runner, &test_config(), &RunScriptOptions::new("script.js"))
        .await
        .unwrap_err();
    assert!(matches!(err, K6Error::DriverUnavailable { .. }));
    assert!(!err.is_configuration_error());
}

#[tokio::test]
async fn test_stress_endpoint() {
    // Arrange
    let (runner, captured) = capturing_runner(true);
    let opts = StressOptions::new("http://localhost:3000")
        .with_vus(100)
        .with_duration("10m");

    // Act
    let result = stress_endpoint(&runner, &test_config(), &opts).await.unwrap();

    // Assert
    assert!(result);
    let invocation = take(&captured);
    assert_eq!(
        args(&invocation),
        vec![
            "run",
            "--quiet",
            "--vus",
            "100",
            "--duration",
            "10m",
            "/opt/chaosgrafana/scripts/single-endpoint.js"
        ]
    );
    assert_eq!(
        invocation.env,
        BTreeMap::from([("CHAOS_K6_URL".to_string(), "http://localhost:3000".to_string())])
    );

    let resolved = k6::invocation::resolve_env(vec![("HOME".to_string(), "/root".to_string())], &invocation.env);
    assert_eq!(resolved["CHAOS_K6_URL"], "http://localhost:3000");
    assert_eq!(resolved["HOME"], "/root");
}

#[tokio::test]
async fn test_stress_endpoint_log_file() {
    let (runner, captured) = capturing_runner(true);
    let opts = StressOptions::new("http://localhost:3000").with_log_file("stress.log");

    assert!(stress_endpoint(&runner, &test_config(), &opts).await.unwrap());
    assert_eq!(take(&captured).output, OutputTarget::File(PathBuf::from("stress.log")));
}
