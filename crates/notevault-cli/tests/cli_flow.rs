use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use std::thread;

use tempfile::TempDir;

/// Nothing listens on the discard port, so requests fail fast.
const UNREACHABLE_API: &str = "http://127.0.0.1:9/api";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_notevault"))
}

struct Env {
    _root: TempDir,
    config_home: PathBuf,
    data_home: PathBuf,
}

impl Env {
    fn new() -> Self {
        let root = TempDir::new().expect("temp dir");
        let config_home = root.path().join("config");
        let data_home = root.path().join("data");
        std::fs::create_dir_all(&config_home).expect("create config dir");
        std::fs::create_dir_all(&data_home).expect("create data dir");
        Self {
            _root: root,
            config_home,
            data_home,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("XDG_CONFIG_HOME", &self.config_home)
            .env("XDG_DATA_HOME", &self.data_home)
            .env("HOME", self.config_home.parent().expect("root"))
            .env("NO_COLOR", "1")
            .env_remove("NOTEVAULT_API_URL")
            .env_remove("NOTEVAULT_CONFIG")
            .env_remove("NOTEVAULT_PASSWORD")
            .env_remove("NOTEVAULT_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("run notevault")
    }

    fn config_path(&self) -> PathBuf {
        self.config_home.join("notevault").join("config.toml")
    }

    fn session_path(&self) -> PathBuf {
        self.data_home.join("notevault").join("session.json")
    }

    fn write_session(&self, token: &str) {
        let contents = serde_json::json!({
            "user": { "_id": "u1", "name": "Ada", "email": "ada@example.com" },
            "token": token,
        });
        write_file(&self.session_path(), &contents.to_string());
    }
}

fn write_file(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
    std::fs::write(path, contents).expect("write file");
}

/// A local HTTP endpoint that answers every request the same way.
struct StubServer {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    fn start(status: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let url = format!("http://{}/api", listener.local_addr().expect("local addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let head = read_head(&mut stream);
                seen.lock().expect("requests lock").push(head);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        Self { url, requests }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

fn read_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => head.push(byte[0]),
            _ => break,
        }
    }
    String::from_utf8_lossy(&head).to_string()
}

const ME_BODY: &str = r#"{"user":{"_id":"u1","name":"Ada Lovelace","email":"ada@example.com"}}"#;
const UNAUTHORIZED_BODY: &str = r#"{"message":"Not authorized"}"#;

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_help_lists_commands() {
    let env = Env::new();
    let output = env.run(&["--help"]);

    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["login", "register", "list", "search", "add", "edit", "delete"] {
        assert!(text.contains(command), "missing {} in help", command);
    }
}

#[test]
fn test_no_command_prints_quickstart() {
    let env = Env::new();
    let output = env.run(&[]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Quickstart"));
}

#[test]
fn test_list_without_session_exits_with_auth_code() {
    let env = Env::new();
    let output = env.run(&["list"]);

    assert_eq!(output.status.code(), Some(5));
    let err = stderr(&output);
    assert!(err.contains("Not logged in"), "stderr: {}", err);
    assert!(err.contains("notevault login"));
}

#[test]
fn test_whoami_without_session_exits_with_auth_code() {
    let env = Env::new();
    let output = env.run(&["whoami"]);

    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_whoami_confirms_session_with_server() {
    let env = Env::new();
    env.write_session("tok-1");
    let server = StubServer::start("200 OK", ME_BODY);

    let output = env.run(&["--api-url", &server.url, "whoami"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    // The server's record replaces the saved one.
    assert!(text.contains("name=Ada Lovelace"));
    assert!(text.contains("email=ada@example.com"));
    assert!(!text.contains("tok-1"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /api/auth/me"));
    assert!(requests[0].to_lowercase().contains("authorization: bearer tok-1"));
}

#[test]
fn test_whoami_with_revoked_token_signs_out() {
    let env = Env::new();
    env.write_session("revoked");
    let server = StubServer::start("401 Unauthorized", UNAUTHORIZED_BODY);

    let output = env.run(&["--api-url", &server.url, "whoami"]);

    assert_eq!(output.status.code(), Some(5));
    let err = stderr(&output);
    assert!(err.contains("no longer valid"), "stderr: {}", err);
    assert!(err.contains("notevault login"));
    assert!(stdout(&output).is_empty());
    assert!(!env.session_path().exists());
}

#[test]
fn test_whoami_without_reachable_server_is_not_signed_in() {
    let env = Env::new();
    env.write_session("tok-1");

    let output = env.run(&["--api-url", UNREACHABLE_API, "whoami"]);

    assert_eq!(output.status.code(), Some(5));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_whoami_json_omits_token() {
    let env = Env::new();
    env.write_session("tok-1");
    let server = StubServer::start("200 OK", ME_BODY);

    let output = env.run(&["--api-url", &server.url, "whoami", "--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["email"], "ada@example.com");
    assert!(value.get("token").is_none());
}

#[test]
fn test_search_with_revoked_token_stops_before_reading_input() {
    let env = Env::new();
    env.write_session("revoked");
    let server = StubServer::start("401 Unauthorized", UNAUTHORIZED_BODY);

    let output = env
        .command()
        .args(["--api-url", &server.url, "search"])
        .stdin(std::process::Stdio::null())
        .output()
        .expect("run notevault");

    assert_eq!(output.status.code(), Some(5));
    assert!(server.requests().iter().all(|r| r.starts_with("GET /api/auth/me")));
    assert!(!env.session_path().exists());
}

#[test]
fn test_missing_note_exits_with_not_found_code() {
    let env = Env::new();
    env.write_session("tok-1");
    let server = StubServer::start("404 Not Found", "{}");

    let output = env.run(&["--api-url", &server.url, "show", "42"]);

    assert_eq!(output.status.code(), Some(3));
    let err = stderr(&output);
    assert!(err.contains("Note not found"), "stderr: {}", err);
    assert!(err.contains("notevault list"));
}

#[test]
fn test_unreachable_server_is_generic_failure_and_keeps_session() {
    let env = Env::new();
    env.write_session("tok-1");

    let output = env.run(&["--api-url", UNREACHABLE_API, "list"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Could not reach the notes service"), "stderr: {}", err);
    assert_eq!(err.trim().lines().count(), 1, "stderr: {}", err);
    assert!(env.session_path().exists());
}

#[test]
fn test_logout_removes_saved_session() {
    let env = Env::new();
    env.write_session("tok-1");

    let output = env.run(&["logout"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("status=ok"));
    assert!(!env.session_path().exists());

    let output = env.run(&["list"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_logout_without_session_is_ok() {
    let env = Env::new();
    let output = env.run(&["logout", "--quiet"]);

    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_login_without_password_or_tty_is_invalid_input() {
    let env = Env::new();
    let output = env.run(&["login", "--email", "ada@example.com"]);

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("NOTEVAULT_PASSWORD"));
}

#[test]
fn test_login_against_unreachable_server_fails() {
    let env = Env::new();
    let output = env
        .command()
        .args(["--api-url", UNREACHABLE_API, "login", "--email", "ada@example.com"])
        .env("NOTEVAULT_PASSWORD", "hunter22")
        .output()
        .expect("run notevault");

    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("Could not reach the notes service"));
    assert!(!env.session_path().exists());
}

#[test]
fn test_edit_without_changes_is_invalid_input() {
    let env = Env::new();
    env.write_session("tok-1");

    let output = env.run(&["edit", "42"]);

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("Nothing to change"));
}

#[test]
fn test_delete_requires_confirmation_without_tty() {
    let env = Env::new();
    env.write_session("tok-1");

    let output = env.run(&["delete", "42"]);

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("--yes"));
}

#[test]
fn test_config_init_then_show() {
    let env = Env::new();

    let output = env.run(&["config", "init", "--api-url", "https://notes.example.com/api/"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let written = std::fs::read_to_string(env.config_path()).expect("config written");
    assert!(written.contains("[server]"));
    assert!(written.contains("https://notes.example.com/api"));

    let output = env.run(&["config", "show"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("api=https://notes.example.com/api"));
    assert!(text.contains("debounce=500ms"));

    // A second init refuses to clobber the file.
    let output = env.run(&["config", "init"]);
    assert_eq!(output.status.code(), Some(4));
    let output = env.run(&["config", "init", "--force"]);
    assert!(output.status.success());
}

#[test]
fn test_config_show_defaults_and_env_override() {
    let env = Env::new();

    let output = env.run(&["config", "show"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("api=http://localhost:5000/api"));
    assert!(text.contains("not found, using defaults"));

    let output = env
        .command()
        .args(["config", "show"])
        .env("NOTEVAULT_API_URL", "http://other.test/api")
        .output()
        .expect("run notevault");
    assert!(stdout(&output).contains("api=http://other.test/api"));
}

#[test]
fn test_config_file_path_override() {
    let env = Env::new();
    let custom = env.config_home.join("elsewhere.toml");
    write_file(&custom, "[search]\ndebounce_ms = 250\n");

    let output = env
        .command()
        .args(["config", "show"])
        .env("NOTEVAULT_CONFIG", &custom)
        .output()
        .expect("run notevault");

    assert!(output.status.success());
    assert!(stdout(&output).contains("debounce=250ms"));
}

#[test]
fn test_malformed_config_is_reported() {
    let env = Env::new();
    write_file(&env.config_path(), "[server\nbase_url = ");

    let output = env.run(&["config", "show"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to parse config"));
}

#[test]
fn test_completions_generate() {
    let env = Env::new();
    let output = env.run(&["completions", "bash"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("notevault"));
}
