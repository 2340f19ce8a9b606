use deepclone_cli::{cli, run};
use deepclone_store::StoreSnapshot;
use deepclone_test_utils::{record, store_with, title_of};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

fn write_snapshot(dir: &TempDir) -> std::path::PathBuf {
    let store = store_with([
        record("home")
            .title("Home")
            .link("reference", "hero")
            .links("references", &["author"])
            .build(),
        record("hero").title("Hero").build(),
        record("author").content_type("author").title("Jane").build(),
    ]);
    let path = dir.path().join("store.json");
    store.snapshot().save(&path).unwrap();
    path
}

async fn invoke(snapshot: &Path, args: &[&str]) -> anyhow::Result<String> {
    let snapshot = snapshot.to_string_lossy().to_string();
    let mut argv = vec!["deepclone", "--snapshot", snapshot.as_str()];
    argv.extend_from_slice(args);
    let matches = cli().try_get_matches_from(argv)?;
    run(&matches).await
}

#[tokio::test]
async fn discover_lists_closure() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    let out = invoke(&snapshot, &["discover", "home"]).await.unwrap();

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "3 records reachable from home");
    assert_eq!(lines[1], "home\tpage");
    assert_eq!(lines.len(), 4);
}

#[tokio::test]
async fn discover_missing_root_fails() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    assert!(invoke(&snapshot, &["discover", "nope"]).await.is_err());
}

#[tokio::test]
async fn tree_marks_blocked_types() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    let out = invoke(&snapshot, &["tree", "home", "--blocked-type", "author"]).await.unwrap();

    assert_eq!(
        out,
        "home [page] Home\n  hero [page] Hero\n  author [author] Jane (disabled)\n"
    );
}

#[tokio::test]
async fn tree_as_json() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    let out = invoke(&snapshot, &["tree", "home", "--json"]).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(json["root"]["entryId"], "home");
    assert_eq!(json["root"]["children"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn clone_all_writes_snapshot() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);
    let output = dir.path().join("out.json");
    let output_arg = output.to_string_lossy().to_string();

    let out = invoke(
        &snapshot,
        &[
            "clone",
            "home",
            "--all",
            "--blocked-type",
            "author",
            "--clone-text",
            "(copy)",
            "--append",
            "--output",
            output_arg.as_str(),
        ],
    )
    .await
    .unwrap();

    assert!(out.contains("discovered 3, cloned 2, updated 1"));

    let result = StoreSnapshot::load(&output).unwrap();
    assert_eq!(result.records.len(), 5);
    let mut titles: Vec<&str> = result.records.iter().filter_map(title_of).collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["Hero", "Hero (copy)", "Home", "Home (copy)", "Jane"]);
}

#[tokio::test]
async fn clone_by_path() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    let out = invoke(&snapshot, &["clone", "home", "--path", "home:author"]).await.unwrap();

    assert!(out.contains("cloned 2, updated 1"));
}

#[tokio::test]
async fn blank_clone_text_is_rejected() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    let err = invoke(&snapshot, &["clone", "home", "--clone-text", "  "]).await.unwrap_err();
    assert!(err.to_string().contains("clone_text"));
}

#[test]
fn all_conflicts_with_select() {
    let result = cli().try_get_matches_from(["deepclone", "clone", "home", "--all", "--select", "x"]);
    assert!(result.is_err());
}
