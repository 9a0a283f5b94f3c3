#![cfg(unix)]

use std::fs;

use config::Config;
use tempfile::TempDir;

// The global subscriber can be installed once per binary, so this file holds a single test.
#[test]
fn test_run_to_dir_with_subprocess_evaluator() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.module.locator = "{ ... }: { }".to_string();
    config.module.expr = true;
    config.evaluator.program = "sh".to_string();
    config.evaluator.args = vec![
        "-c".to_string(),
        r#"printf '{"services":{"magics":{"enable":{"_option":true,"_type":"bool"}}}}'"#.to_string(),
        "evaluator".to_string(),
    ];
    config.evaluator.dumper = Some("dump-module.nix".to_string());
    config.evaluator.timeout_secs = Some(30);
    config.codegen.package = "magics".to_string();
    config.codegen.output_dir = Some(temp.path().join("out"));
    config.logging.file = Some(temp.path().join("modgen.log"));

    let path = pipeline::run_to_dir(&config).expect("run succeeds");
    assert_eq!(path, temp.path().join("out").join("magics.rs"));

    let source = fs::read_to_string(&path).expect("read generated source");
    assert!(source.starts_with("// Code generated by modgen. DO NOT EDIT.\n"));
    assert!(source.contains("pub struct Magics {"));
    assert!(source.contains("    pub enable: bool,"));
    assert!(source.ends_with("}\n"));
}
