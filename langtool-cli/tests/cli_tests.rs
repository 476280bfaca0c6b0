use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn langtool_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("langtool"));
    cmd.env("HOME", home)
        .env_remove("LANGTOOL_CONFIG")
        .env_remove("LANGTOOL_API_KEY")
        .env_remove("LANGTOOL_BASE_URL")
        .env_remove("LANGTOOL_MODEL")
        .env_remove("DEEPSEEK_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("DASHSCOPE_API_KEY")
        .env_remove("RUST_LOG");
    for proxy in ["HTTP_PROXY", "HTTPS_PROXY", "ALL_PROXY", "http_proxy", "https_proxy", "all_proxy"] {
        cmd.env_remove(proxy);
    }
    cmd
}

/// Serves chat-completion requests, answering each text with `<target>:<text>`.
fn spawn_translation_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            std::thread::spawn(move || {
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 {
                        return;
                    }
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap_or(0);
                        }
                    }
                }
                let mut body = vec![0u8; content_length];
                reader.read_exact(&mut body).unwrap();

                let request: Value = serde_json::from_slice(&body).unwrap();
                let prompt = request["messages"][1]["content"].as_str().unwrap();
                let target = prompt
                    .split("` to `")
                    .nth(1)
                    .and_then(|rest| rest.split('`').next())
                    .unwrap()
                    .to_string();
                let (_, array) = prompt.rsplit_once("\n\n").unwrap();
                let texts: Vec<String> = serde_json::from_str(array).unwrap();
                let translations: Vec<String> =
                    texts.iter().map(|t| format!("{}:{}", target, t)).collect();

                let content = serde_json::to_string(&translations).unwrap();
                let response = serde_json::json!({
                    "choices": [{ "message": { "role": "assistant", "content": content } }]
                })
                .to_string();
                let mut stream = stream;
                write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    response.len(),
                    response
                )
                .unwrap();
            });
        }
    });
    format!("http://{}/chat/completions", address)
}

#[test]
fn test_convert_rejects_platform_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("app_en.arb");
    fs::write(&input, r#"{"title": "Gallery"}"#).unwrap();

    let output = langtool_cmd(temp_dir.path())
        .args([
            "convert",
            "--platform",
            "electron",
            "--input",
            input.to_str().unwrap(),
            "--output",
            temp_dir.path().join("out").to_str().unwrap(),
            "--languages",
            "fr",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: validation error"), "stderr: {}", stderr);
    assert!(stderr.contains(".arb"));
    assert!(!temp_dir.path().join("out").exists());
}

#[test]
fn test_convert_requires_api_key() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("en.json");
    fs::write(&input, r#"{"ok": "OK"}"#).unwrap();

    let output = langtool_cmd(temp_dir.path())
        .args([
            "convert",
            "-p",
            "electron",
            "-i",
            input.to_str().unwrap(),
            "-o",
            temp_dir.path().join("out").to_str().unwrap(),
            "-l",
            "fr",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing API key"), "stderr: {}", stderr);
    assert!(stderr.contains("DEEPSEEK_API_KEY"));
}

#[test]
fn test_convert_rejects_invalid_language() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("en.json");
    fs::write(&input, r#"{"ok": "OK"}"#).unwrap();

    let output = langtool_cmd(temp_dir.path())
        .args([
            "convert",
            "-p",
            "electron",
            "-i",
            input.to_str().unwrap(),
            "-o",
            temp_dir.path().join("out").to_str().unwrap(),
            "-l",
            "fr,123",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid language code `123`"));
}

#[test]
fn test_convert_with_custom_provider() {
    let temp_dir = TempDir::new().unwrap();
    let endpoint = spawn_translation_server();

    let config = temp_dir.path().join("langtool.toml");
    fs::write(
        &config,
        format!(
            "provider = \"custom\"\nbase_url = \"{}\"\nmodel = \"mock\"\napi_key = \"test\"\nbatch_size = 1\n",
            endpoint
        ),
    )
    .unwrap();

    let input = temp_dir.path().join("en.json");
    fs::write(&input, r#"{"save": "Save", "open": "Open"}"#).unwrap();
    let out_dir = temp_dir.path().join("locales");

    let output = langtool_cmd(temp_dir.path())
        .args([
            "convert",
            "--platform",
            "electron",
            "--input",
            input.to_str().unwrap(),
            "--output",
            out_dir.to_str().unwrap(),
            "--languages",
            "de,ja",
            "--config",
            config.to_str().unwrap(),
            "--export",
            "csv",
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let de: Value = serde_json::from_str(&fs::read_to_string(out_dir.join("de.json")).unwrap()).unwrap();
    assert_eq!(de["save"], "de:Save");
    assert_eq!(de["open"], "de:Open");
    let ja: Value = serde_json::from_str(&fs::read_to_string(out_dir.join("ja.json")).unwrap()).unwrap();
    assert_eq!(ja["save"], "ja:Save");

    let csv = fs::read_to_string(out_dir.join("en.csv")).unwrap();
    assert!(csv.contains("Key,en,de,ja"));
    assert!(csv.contains(r#""save","Save","de:Save","ja:Save""#));
}

#[test]
fn test_extract_keys_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("menu.json");
    fs::write(
        &input,
        r#"{"文件": {"打开": "open", "recent": [{"清除": 1}]}, "edit": "编辑"}"#,
    )
    .unwrap();

    let output = langtool_cmd(temp_dir.path())
        .args(["extract-keys", "--input", input.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let keys: Vec<&str> = stdout.lines().collect();
    assert_eq!(keys.len(), 3);
    assert!(keys.contains(&"文件"));
    assert!(keys.contains(&"打开"));
    assert!(keys.contains(&"清除"));
}

#[test]
fn test_extract_keys_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("menu.json");
    let keys_file = temp_dir.path().join("keys.txt");
    fs::write(&input, r#"{"取消": "cancel"}"#).unwrap();

    let output = langtool_cmd(temp_dir.path())
        .args([
            "extract-keys",
            "-i",
            input.to_str().unwrap(),
            "-o",
            keys_file.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&keys_file).unwrap(), "取消\n");
}

#[test]
fn test_extract_keys_rejects_invalid_json() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("broken.json");
    fs::write(&input, "{ nope").unwrap();

    let output = langtool_cmd(temp_dir.path())
        .args(["extract-keys", "-i", input.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid JSON"));
}

#[test]
fn test_export_xcstrings_to_csv() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("Localizable.xcstrings");
    let csv_path = temp_dir.path().join("export.csv");
    fs::write(
        &input,
        r#"{
            "sourceLanguage": "en",
            "version": "1.0",
            "strings": {
                "hello": {
                    "localizations": {
                        "en": { "stringUnit": { "state": "translated", "value": "Hello" } },
                        "fr": { "stringUnit": { "state": "translated", "value": "Bonjour" } },
                        "de": { "stringUnit": { "state": "new", "value": "" } }
                    }
                }
            }
        }"#,
    )
    .unwrap();

    let output = langtool_cmd(temp_dir.path())
        .args([
            "export",
            "-i",
            input.to_str().unwrap(),
            "-p",
            "ios",
            "-o",
            csv_path.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let bytes = fs::read(&csv_path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["Key,en,fr", r#""hello","Hello","Bonjour""#]);
}

#[test]
fn test_export_rejects_platform_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("en.json");
    fs::write(&input, r#"{"ok": "OK"}"#).unwrap();

    let output = langtool_cmd(temp_dir.path())
        .args([
            "export",
            "-i",
            input.to_str().unwrap(),
            "-p",
            "flutter",
            "-o",
            temp_dir.path().join("out.csv").to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!temp_dir.path().join("out.csv").exists());
}

#[test]
fn test_sync_to_source_conflicts_with_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = langtool_cmd(temp_dir.path())
        .args([
            "convert",
            "-p",
            "ios",
            "-i",
            "Localizable.xcstrings",
            "-o",
            "out.xcstrings",
            "-l",
            "fr",
            "--sync-to-source",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
