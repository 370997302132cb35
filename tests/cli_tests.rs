use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const ANNOTATED_PAGE: &str = "<div class=\"highlighter-rouge\" add-lines=\"1\"><pre>fn main() {}\nmore\n</pre></div>\n";

fn linemark() -> Command {
    Command::cargo_bin("linemark").expect("binary builds")
}

#[test]
fn test_no_args_shows_help() {
    linemark()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_version_subcommand() {
    linemark()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_init_creates_config_file() {
    let temp = TempDir::new().expect("create temp dir");

    linemark()
        .current_dir(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains(".linemark.toml"));

    let content =
        fs::read_to_string(temp.path().join(".linemark.toml")).expect("config file exists");
    assert!(content.contains("[markup]"));

    // Refuses to clobber an existing file
    linemark()
        .current_dir(temp.path())
        .arg("init")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_process_rewrites_file_in_place() {
    let temp = TempDir::new().expect("create temp dir");
    let file = temp.path().join("page.html");
    fs::write(&file, ANNOTATED_PAGE).expect("write page");

    linemark()
        .current_dir(temp.path())
        .args(["process", "--no-config", "page.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marked 1 line(s)"));

    let rewritten = fs::read_to_string(&file).expect("read page");
    assert!(rewritten.contains("<span class=\"add\">fn main() {}\n</span>"));
    assert!(!rewritten.contains("add-lines"));

    // Second run finds nothing left to do
    linemark()
        .current_dir(temp.path())
        .args(["process", "--no-config", "page.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No annotated code blocks"));
    assert_eq!(fs::read_to_string(&file).expect("read page"), rewritten);
}

#[test]
fn test_check_reports_without_writing() {
    let temp = TempDir::new().expect("create temp dir");
    let file = temp.path().join("page.html");
    fs::write(&file, ANNOTATED_PAGE).expect("write page");

    linemark()
        .current_dir(temp.path())
        .args(["check", "--no-config", "page.html"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("would change"));
    assert_eq!(fs::read_to_string(&file).expect("read page"), ANNOTATED_PAGE);

    linemark()
        .current_dir(temp.path())
        .args(["process", "--no-config", "page.html"])
        .assert()
        .success();

    linemark()
        .current_dir(temp.path())
        .args(["check", "--no-config", "page.html"])
        .assert()
        .success();
}

#[test]
fn test_process_directory_discovers_html() {
    let temp = TempDir::new().expect("create temp dir");
    fs::write(temp.path().join("page.html"), ANNOTATED_PAGE).expect("write page");
    fs::write(temp.path().join("notes.txt"), "add-lines=\"1\"").expect("write decoy");

    linemark()
        .current_dir(temp.path())
        .args(["process", "--no-config", "."])
        .assert()
        .success();

    let rewritten = fs::read_to_string(temp.path().join("page.html")).expect("read page");
    assert!(rewritten.contains("class=\"add\""));
    // Non-HTML files are never touched
    assert_eq!(
        fs::read_to_string(temp.path().join("notes.txt")).expect("read decoy"),
        "add-lines=\"1\""
    );
}

#[test]
fn test_process_exclude_pattern() {
    let temp = TempDir::new().expect("create temp dir");
    fs::create_dir(temp.path().join("_site")).expect("create dir");
    fs::write(temp.path().join("_site/page.html"), ANNOTATED_PAGE).expect("write page");
    fs::write(temp.path().join("page.html"), ANNOTATED_PAGE).expect("write page");

    linemark()
        .current_dir(temp.path())
        .args(["process", "--no-config", "--exclude", "_site", "."])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp.path().join("_site/page.html")).expect("read excluded"),
        ANNOTATED_PAGE
    );
    assert!(fs::read_to_string(temp.path().join("page.html"))
        .expect("read page")
        .contains("class=\"add\""));
}

#[test]
fn test_gitignored_files_skipped_by_default() {
    let temp = TempDir::new().expect("create temp dir");
    fs::write(temp.path().join(".gitignore"), "ignored.html\n").expect("write gitignore");
    fs::write(temp.path().join("ignored.html"), ANNOTATED_PAGE).expect("write page");

    linemark()
        .current_dir(temp.path())
        .args(["process", "--no-config", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("No HTML files found"));
    assert_eq!(
        fs::read_to_string(temp.path().join("ignored.html")).expect("read page"),
        ANNOTATED_PAGE
    );
}

#[test]
fn test_config_can_disable_gitignore_respect() {
    let temp = TempDir::new().expect("create temp dir");
    fs::write(temp.path().join(".gitignore"), "ignored.html\n").expect("write gitignore");
    fs::write(
        temp.path().join(".linemark.toml"),
        "[global]\nrespect-gitignore = false\n",
    )
    .expect("write config");
    fs::write(temp.path().join("ignored.html"), ANNOTATED_PAGE).expect("write page");

    linemark()
        .current_dir(temp.path())
        .args(["process", "."])
        .assert()
        .success();
    assert!(fs::read_to_string(temp.path().join("ignored.html"))
        .expect("read page")
        .contains("class=\"add\""));
}

#[test]
fn test_cli_flag_overrides_gitignore_respect() {
    let temp = TempDir::new().expect("create temp dir");
    fs::write(temp.path().join(".gitignore"), "ignored.html\n").expect("write gitignore");
    fs::write(temp.path().join("ignored.html"), ANNOTATED_PAGE).expect("write page");

    linemark()
        .current_dir(temp.path())
        .args(["process", "--no-config", "--respect-gitignore=false", "."])
        .assert()
        .success();
    assert!(fs::read_to_string(temp.path().join("ignored.html"))
        .expect("read page")
        .contains("class=\"add\""));
}

#[test]
fn test_quiet_suppresses_output() {
    let temp = TempDir::new().expect("create temp dir");
    let file = temp.path().join("page.html");
    fs::write(&file, ANNOTATED_PAGE).expect("write page");

    linemark()
        .current_dir(temp.path())
        .args(["process", "--no-config", "--quiet", "page.html"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(fs::read_to_string(&file).expect("read page").contains("class=\"add\""));
}

#[test]
fn test_bad_marker_class_in_config_is_rejected() {
    let temp = TempDir::new().expect("create temp dir");
    fs::write(
        temp.path().join(".linemark.toml"),
        "[add-lines]\nclass = 'a\"b'\n",
    )
    .expect("write config");
    fs::write(temp.path().join("page.html"), ANNOTATED_PAGE).expect("write page");

    linemark()
        .current_dir(temp.path())
        .args(["process", "page.html"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid marker class"));
}

#[test]
fn test_config_file_discovery() {
    let temp = TempDir::new().expect("create temp dir");
    fs::write(
        temp.path().join(".linemark.toml"),
        "[markup]\nblock-class = \"chroma\"\n",
    )
    .expect("write config");
    let file = temp.path().join("page.html");
    fs::write(
        &file,
        "<div class=\"chroma\" add-lines=\"1\"><pre>x\n</pre></div>",
    )
    .expect("write page");

    linemark()
        .current_dir(temp.path())
        .args(["process", "page.html"])
        .assert()
        .success();

    assert!(fs::read_to_string(&file)
        .expect("read page")
        .contains("<span class=\"add\">x\n</span>"));
}

#[test]
fn test_config_defaults_subcommand() {
    linemark()
        .args(["config", "--defaults"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[markup]")
                .and(predicate::str::contains("[add-lines]"))
                .and(predicate::str::contains("[remove-lines]")),
        );
}

#[test]
fn test_config_json_output() {
    let temp = TempDir::new().expect("create temp dir");
    linemark()
        .current_dir(temp.path())
        .args(["config", "--defaults", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"block-class\": \"highlighter-rouge\""));
}

#[test]
fn test_invalid_config_exits_with_tool_error() {
    let temp = TempDir::new().expect("create temp dir");
    fs::write(temp.path().join("bad.toml"), "[markup\nbroken").expect("write config");
    fs::write(temp.path().join("page.html"), ANNOTATED_PAGE).expect("write page");

    linemark()
        .current_dir(temp.path())
        .args(["process", "--config", "bad.toml", "page.html"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Config error"));
}
