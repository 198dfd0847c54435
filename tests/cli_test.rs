mod common;

use common::LctxTest;

#[test]
fn test_help_lists_commands() {
    let lctx = LctxTest::new();
    let stdout = lctx.run_success(&["--help"]);
    assert!(stdout.contains("context"));
    assert!(stdout.contains("set-status"));
    assert!(stdout.contains("create"));
}

#[test]
fn test_status_when_not_connected() {
    let lctx = LctxTest::new();
    let stdout = lctx.run_success(&["status"]);
    assert!(stdout.contains("Not connected"));
    assert!(stdout.contains("none"));
}

#[test]
fn test_status_json() {
    let lctx = LctxTest::new();
    let stdout = lctx.run_success(&["status", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["connected"], false);
    assert!(json["context_issue_id"].is_null());
    assert!(json["auth_method"].is_null());
}

#[test]
fn test_commands_require_connection() {
    let lctx = LctxTest::new();
    for args in [
        vec!["issues"],
        vec!["teams"],
        vec!["whoami"],
        vec!["comment", "hello"],
        vec!["set-status", "Done"],
        vec!["context", "show"],
    ] {
        let stderr = lctx.run_failure(&args);
        assert!(
            stderr.contains("not connected"),
            "{args:?} stderr: {stderr}"
        );
    }
}

#[test]
fn test_disconnect_without_credentials_succeeds() {
    let lctx = LctxTest::new();
    lctx.run_success(&["disconnect"]);
}

#[test]
fn test_disconnect_sign_out_removes_oauth_token() {
    let lctx = LctxTest::new();
    let token = lctx.temp_dir.path().join("config/oauth.yaml");
    std::fs::create_dir_all(token.parent().unwrap()).unwrap();
    std::fs::write(&token, "access_token: lin_oauth_stale\nscopes:\n  - read\n  - write\n").unwrap();

    lctx.run_success(&["disconnect"]);
    assert!(token.exists());

    lctx.run_success(&["disconnect", "--sign-out"]);
    assert!(!token.exists());

    let stdout = lctx.run_success(&["status", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["connected"], false);
}

#[test]
fn test_connect_without_terminal_is_cancelled() {
    let lctx = LctxTest::new();
    // stdin is not a TTY under the test harness, so the picker is dismissed
    lctx.run_failure(&["connect"]);
    assert!(!lctx.temp_dir.path().join("config/secrets.yaml").exists());
}

#[test]
fn test_config_set_and_get() {
    let lctx = LctxTest::new();
    lctx.run_success(&["config", "set", "page_size", "20"]);
    assert_eq!(lctx.run_success(&["config", "get", "page_size"]).trim(), "20");

    lctx.run_success(&["config", "set", "oauth.scopes", "read,write,admin"]);
    assert_eq!(
        lctx.run_success(&["config", "get", "oauth.scopes"]).trim(),
        "read,write,admin"
    );

    let config =
        std::fs::read_to_string(lctx.temp_dir.path().join("config/config.yaml")).unwrap();
    assert!(config.contains("page_size: 20"));
}

#[test]
fn test_config_rejects_bad_input() {
    let lctx = LctxTest::new();
    let stderr = lctx.run_failure(&["config", "set", "page_size", "0"]);
    assert!(stderr.contains("page_size"));

    let stderr = lctx.run_failure(&["config", "set", "linear.api_key", "x"]);
    assert!(stderr.contains("unknown config key"));

    let stderr = lctx.run_failure(&["config", "set", "timeout", "0"]);
    assert!(stderr.contains("timeout"));

    let stderr = lctx.run_failure(&["config", "get", "oauth.client_id"]);
    assert!(stderr.contains("not set"));
}

#[test]
fn test_config_show_json() {
    let lctx = LctxTest::new();
    let stdout = lctx.run_success(&["config", "show", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["api_url"], "https://api.linear.app/graphql");
    assert_eq!(json["page_size"], 50);
    assert_eq!(json["api_key_from_env"], false);
}

#[test]
fn test_create_rejects_out_of_range_priority() {
    let lctx = LctxTest::new();
    let stderr = lctx.run_failure(&["create", "Title", "--team", "ENG", "-p", "7"]);
    assert!(stderr.contains("invalid priority"));
}

#[test]
fn test_logs_are_quiet_by_default() {
    let lctx = LctxTest::new();
    let output = lctx.run(&["status"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("no stored Linear credentials"));
}

#[test]
fn test_rust_log_enables_debug_output() {
    let lctx = LctxTest::new().with_rust_log("debug");
    let output = lctx.run(&["status"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DEBUG"), "stderr: {stderr}");
    assert!(stderr.contains("no stored Linear credentials"));
}

#[test]
fn test_completions() {
    let lctx = LctxTest::new();
    let stdout = lctx.run_success(&["completions", "bash"]);
    assert!(stdout.contains("lctx"));
}

// With LINEAR_API_KEY the session restores without any network call

#[test]
fn test_context_show_without_context_issue() {
    let lctx = LctxTest::new().with_api_key("lin_api_test");
    let stdout = lctx.run_success(&["context", "show"]);
    assert!(stdout.contains("No context issue set"));

    let stdout = lctx.run_success(&["context", "show", "--json"]);
    assert_eq!(stdout.trim(), "null");
}

#[test]
fn test_comment_without_context_issue() {
    let lctx = LctxTest::new().with_api_key("lin_api_test");
    let stderr = lctx.run_failure(&["comment", "hello"]);
    assert!(stderr.contains("no context issue set"));

    let stderr = lctx.run_failure(&["comment"]);
    assert!(stderr.contains("comment text is required"));
}

#[test]
fn test_status_reports_api_key_session() {
    let lctx = LctxTest::new().with_api_key("lin_api_test");
    // Point the client at a closed local port so the account lookup fails fast
    lctx.run_success(&["config", "set", "api_url", "http://127.0.0.1:9/graphql"]);
    lctx.run_success(&["config", "set", "timeout", "2"]);

    let stdout = lctx.run_success(&["status", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["connected"], true);
    assert_eq!(json["auth_method"], "api-key");
    assert!(json["user"].is_null());
}
