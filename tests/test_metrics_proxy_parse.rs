//! Tests for parsing the local_metrics_proxy directive

use std::path::PathBuf;

use local_metrics_proxy::error::{ParseErrorKind, SyntaxError, ValidationError};
use local_metrics_proxy::metrics_proxy::{parse_config, BackendSpec, Config};

const TF: &str = "Testfile";

fn parse(input: &str) -> Result<Config, String> {
    parse_config(TF, input).map_err(|e| e.to_string())
}

fn uds(path: &str) -> Config {
    Config {
        backend: Some(BackendSpec::UnixSocket {
            path: PathBuf::from(path),
        }),
    }
}

#[test]
fn test_parse_proper_config() {
    let config = parse(
        r#"
            local_metrics_proxy {
                uds {
                    path "/run/foo"
                }
            }"#,
    )
    .unwrap();

    assert_eq!(config, uds("/run/foo"));
}

#[test]
fn test_parse_ignores_directive_name() {
    let config = parse("directive {\n uds {\n path \"/run/foo\"\n }\n}").unwrap();
    assert_eq!(config, uds("/run/foo"));
}

#[test]
fn test_parse_single_line_config() {
    let config = parse(r#"directive { uds { path "/run/foo" } }"#).unwrap();
    assert_eq!(config, uds("/run/foo"));
}

#[test]
fn test_parse_unsupported_argument() {
    let err = parse(
        r#"
            local_metrics_proxy foo_arg {
            }"#,
    )
    .unwrap_err();

    assert_eq!(
        err,
        "Testfile:2 - Error during parsing: extra unrecognized arguments: [foo_arg]"
    );
}

#[test]
fn test_parse_lists_every_extra_argument() {
    let err = parse("local_metrics_proxy a b c").unwrap_err();
    assert_eq!(
        err,
        "Testfile:1 - Error during parsing: extra unrecognized arguments: [a b c]"
    );
}

#[test]
fn test_parse_unknown_backend() {
    let err = parse(
        r#"
            local_metrics_proxy {
              foo_kind { }
            }"#,
    )
    .unwrap_err();

    assert_eq!(
        err,
        "Testfile:3 - Error during parsing: unrecognized backend kind: foo_kind"
    );
}

#[test]
fn test_parse_missing_path() {
    let err = parse(
        r#"
            local_metrics_proxy {
              uds { }
            }"#,
    )
    .unwrap_err();

    assert_eq!(err, "Testfile:3 - Error during parsing: missing path for uds kind");
}

#[test]
fn test_parse_multiple_path() {
    let err = parse(
        r#"
            local_metrics_proxy {
              uds {
                path "/foo"
                path "/bar"
              }
            }"#,
    )
    .unwrap_err();

    assert_eq!(err, "Testfile:5 - Error during parsing: multiple path arguments");
}

#[test]
fn test_parse_multiple_uds_blocks() {
    let err = parse(
        r#"
            local_metrics_proxy {
              uds {
                path "/foo"
              }
              uds {
                path "/bar"
              }
            }"#,
    )
    .unwrap_err();

    assert_eq!(err, "Testfile:6 - Error during parsing: multiple uds blocks");
}

#[test]
fn test_parse_missing_kind() {
    let err = parse("local_metrics_proxy {\n}").unwrap_err();
    assert!(err.ends_with("missing kind"), "{err}");

    let err = parse("local_metrics_proxy").unwrap_err();
    assert_eq!(err, "Testfile:1 - Error during parsing: missing kind");
}

#[test]
fn test_parse_relative_path() {
    let err = parse_config(
        TF,
        "local_metrics_proxy {\n  uds {\n    path run/foo.sock\n  }\n}",
    )
    .unwrap_err();

    assert_eq!(err.line, 3);
    assert_eq!(err.column, 10);
    assert_eq!(
        err.kind,
        ParseErrorKind::Validation(ValidationError::RelativePath {
            path: "run/foo.sock".to_string()
        })
    );
    assert!(err
        .to_string()
        .ends_with("path value must be an absolute filepath"));
}

#[test]
fn test_parse_empty_path_is_not_absolute() {
    let err = parse("local_metrics_proxy {\n  uds {\n    path \"\"\n  }\n}").unwrap_err();
    assert_eq!(
        err,
        "Testfile:3 - Error during parsing: path value must be an absolute filepath"
    );
}

#[test]
fn test_parse_unknown_uds_key() {
    let err = parse("local_metrics_proxy {\n  uds {\n    address /run/foo\n  }\n}").unwrap_err();
    assert_eq!(
        err,
        "Testfile:3 - Error during parsing: unrecognized uds argument: address"
    );
}

#[test]
fn test_parse_extra_uds_arguments() {
    let err = parse_config(TF, "local_metrics_proxy {\n  uds extra {\n  }\n}").unwrap_err();
    assert!(err.is_syntax());
    assert_eq!(
        err.to_string(),
        "Testfile:2 - Error during parsing: extra unrecognized uds arguments: [extra]"
    );
}

#[test]
fn test_parse_path_argument_count() {
    let err = parse_config(TF, "local_metrics_proxy {\n  uds {\n    path\n  }\n}").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::Syntax(SyntaxError::ArgumentCount {
            token: "path".to_string()
        })
    );

    let err = parse("local_metrics_proxy {\n  uds {\n    path /a /b\n  }\n}").unwrap_err();
    assert_eq!(
        err,
        "Testfile:3 - Error during parsing: wrong argument count or unexpected line ending after '/b'"
    );
}

#[test]
fn test_parse_error_families() {
    let syntax = parse_config(TF, "local_metrics_proxy x").unwrap_err();
    assert!(syntax.is_syntax());
    assert!(!syntax.is_validation());

    let validation = parse_config(TF, "local_metrics_proxy {\n  tcp {\n  }\n}").unwrap_err();
    assert!(validation.is_validation());
}

#[test]
fn test_parse_quoted_path_with_spaces_and_comments() {
    let config = parse(
        "# relay node exporter\nlocal_metrics_proxy {\n  uds {\n    path \"/run/node exporter.sock\" # textfile\n  }\n}",
    )
    .unwrap();
    assert_eq!(config, uds("/run/node exporter.sock"));
}

#[test]
fn test_parse_repeated_directive_counts_as_duplicate() {
    let err = parse(
        "local_metrics_proxy {\n  uds {\n    path /a\n  }\n}\nlocal_metrics_proxy {\n  uds {\n    path /b\n  }\n}",
    )
    .unwrap_err();
    assert_eq!(err, "Testfile:7 - Error during parsing: multiple uds blocks");
}

#[test]
fn test_display_round_trip() {
    let original = uds("/run/metrics \"v2\".sock");
    let text = original.to_string();

    assert!(text.starts_with("local_metrics_proxy {\n"));
    assert_eq!(parse_config(TF, &text).unwrap(), original);
}

#[test]
fn test_display_without_backend() {
    assert_eq!(Config::default().to_string(), "local_metrics_proxy\n");
}

#[test]
fn test_parse_unclosed_block() {
    let err = parse_config(TF, "local_metrics_proxy {\n  uds {\n    path /run/a.sock\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax(SyntaxError::UnexpectedEof));
    assert_eq!(err.line, 3);
    assert_eq!(
        err.to_string(),
        "Testfile:3 - Error during parsing: unexpected EOF"
    );
}

#[test]
fn test_parse_stray_close_brace() {
    let err = parse(
        "local_metrics_proxy {\n  uds {\n    path /run/a.sock\n  }\n}\n}\n",
    )
    .unwrap_err();
    assert_eq!(err, "Testfile:6 - Error during parsing: unexpected '}'");
}
