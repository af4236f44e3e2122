//! Integration tests for the stackgen CLI

use assert_cmd::Command;
use pretty_assertions::assert_eq;
use predicates::prelude::*;
use stackgen_cli::commands::{generate_command, GenerateArgs, GenerateSummary};
use stackgen_cli::config::{OutputFormat, StackgenConfig};
use stackgen_cli::CliError;
use stackgen_ir::{BodyBuilder, Decl, FnTy, InstKind, IrModule, Span, Ty};
use stackgen_wasm::FailurePolicy;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn add_function() -> Decl {
    let mut b = BodyBuilder::new();
    let x = b.arg(Ty::i32(), 0);
    let y = b.arg(Ty::i32(), 1);
    let sum = b.push(Ty::i32(), InstKind::Add { lhs: x, rhs: y }, Span::dummy());
    b.push(Ty::NoReturn, InstKind::Ret { operand: sum }, Span::dummy());
    Decl::function(
        "add",
        FnTy {
            params: vec![Ty::i32(), Ty::i32()],
            ret: Ty::i32(),
        },
        b.finish(),
    )
}

fn broken_function() -> Decl {
    let mut b = BodyBuilder::new();
    b.alloc_local(Ty::Array(Box::new(Ty::i32()), 4));
    b.push(Ty::NoReturn, InstKind::RetVoid, Span::dummy());
    Decl::function(
        "broken",
        FnTy {
            params: vec![],
            ret: Ty::Void,
        },
        b.finish(),
    )
}

fn write_module(dir: &Path, decls: Vec<Decl>) -> PathBuf {
    let path = dir.join("module.json");
    let module = IrModule { decls };
    fs::write(&path, module.to_json().unwrap()).unwrap();
    path
}

fn args(input: PathBuf, output: PathBuf, format: OutputFormat) -> GenerateArgs {
    GenerateArgs {
        input,
        output: Some(output),
        format: Some(format),
    }
}

#[test]
fn test_generate_hex_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_module(temp_dir.path(), vec![add_function()]);
    let output = temp_dir.path().join("module.hex");

    let summary = generate_command(
        &args(input, output.clone(), OutputFormat::Hex),
        &StackgenConfig::default(),
    )
    .unwrap();

    assert_eq!(
        summary,
        GenerateSummary {
            generated: 1,
            failed: 0
        }
    );
    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "add: type=60027f7f017f body=878080800000200020016a0b relocs=[]\n"
    );
}

#[test]
fn test_generate_binary_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_module(temp_dir.path(), vec![add_function()]);
    let output = temp_dir.path().join("module.code");

    generate_command(
        &args(input, output.clone(), OutputFormat::Binary),
        &StackgenConfig::default(),
    )
    .unwrap();

    assert_eq!(
        fs::read(output).unwrap(),
        vec![0x87, 0x80, 0x80, 0x80, 0x00, 0x00, 0x20, 0x00, 0x20, 0x01, 0x6A, 0x0B]
    );
}

#[test]
fn test_format_falls_back_to_config() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_module(temp_dir.path(), vec![add_function()]);
    let output = temp_dir.path().join("module.txt");
    let config = StackgenConfig::from_toml_str("[output]\nformat = \"listing\"\n").unwrap();

    let run = GenerateArgs {
        input,
        output: Some(output.clone()),
        format: None,
    };
    generate_command(&run, &config).unwrap();

    let listing = fs::read_to_string(output).unwrap();
    assert!(listing.starts_with("add:\n  size 7\n"));
    assert!(listing.contains("local.get 1"));
    assert!(listing.contains("i32.add"));
}

#[test]
fn test_failed_functions_are_counted() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_module(temp_dir.path(), vec![broken_function(), add_function()]);
    let output = temp_dir.path().join("module.hex");

    let summary = generate_command(
        &args(input, output.clone(), OutputFormat::Hex),
        &StackgenConfig::default(),
    )
    .unwrap();

    assert_eq!(
        summary,
        GenerateSummary {
            generated: 1,
            failed: 1
        }
    );
    let text = fs::read_to_string(output).unwrap();
    assert!(text.starts_with("add: "));
    assert!(!text.contains("broken"));
}

#[test]
fn test_abort_policy_returns_error() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_module(temp_dir.path(), vec![broken_function(), add_function()]);
    let output = temp_dir.path().join("module.hex");
    let config = StackgenConfig::from_toml_str("[codegen]\nfailure_policy = \"abort\"\n").unwrap();

    let err = generate_command(&args(input, output.clone(), OutputFormat::Hex), &config)
        .unwrap_err();

    match err {
        CliError::Compilation(inner) => {
            assert!(inner.codegen_msg().is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_malformed_module_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("module.json");
    fs::write(&input, "{ \"decls\": 3 }").unwrap();

    let err = generate_command(
        &args(input, temp_dir.path().join("out"), OutputFormat::Hex),
        &StackgenConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CliError::Compilation(_)));
}

#[test]
fn test_config_parsing() {
    let config = StackgenConfig::from_toml_str(
        r#"
[codegen]
failure_policy = "abort"

[output]
format = "listing"
"#,
    )
    .unwrap();

    assert_eq!(config.codegen.failure_policy, FailurePolicy::Abort);
    assert_eq!(config.output.format, OutputFormat::Listing);
}

#[test]
fn test_config_defaults() {
    let config = StackgenConfig::from_toml_str("").unwrap();
    assert_eq!(config, StackgenConfig::default());
    assert_eq!(config.codegen.failure_policy, FailurePolicy::Skip);
    assert_eq!(config.output.format, OutputFormat::Binary);
}

#[test]
fn test_config_errors() {
    let err = StackgenConfig::from_toml_str("[output]\nformat = \"elf\"\n").unwrap_err();
    assert!(matches!(err, CliError::Config(_)));

    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.toml");
    let err = StackgenConfig::load(Some(missing.as_path())).unwrap_err();
    match err {
        CliError::Config(msg) => assert!(msg.contains("missing.toml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("stackgen").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("WebAssembly"));
}

#[test]
fn test_cli_listing_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_module(temp_dir.path(), vec![add_function()]);

    let mut cmd = Command::cargo_bin("stackgen").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg(&input)
        .arg("--format")
        .arg("listing");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("i32.add"));
}

#[test]
fn test_cli_exits_with_failure_when_a_function_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_module(temp_dir.path(), vec![broken_function(), add_function()]);

    let mut cmd = Command::cargo_bin("stackgen").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg(&input)
        .arg("--format")
        .arg("hex");
    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("add: type="))
        .stderr(predicate::str::contains("broken"));
}
