use clap::Parser;
use snapvfs::tooling::cli::{Cli, CliContext, Commands};
use snapvfs::VfsConfig;
use std::fs;
use std::path::PathBuf;

fn context(workspace: &std::path::Path) -> CliContext {
    CliContext::with_config(workspace.to_path_buf(), VfsConfig::default())
}

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["snapvfs", "snapshot", "."],
        vec!["snapvfs", "snapshot", "src", "--json"],
        vec!["snapvfs", "index", "src"],
        vec!["snapvfs", "compare", "left", "right", "--json"],
        vec!["snapvfs", "--log-level", "debug", "watch", "--debounce-ms", "120"],
    ];
    for args in cases {
        assert!(Cli::try_parse_from(args.clone()).is_ok(), "expected valid parse for args: {args:?}");
    }
    assert!(Cli::try_parse_from(["snapvfs", "compare", "left"]).is_err());
    assert!(Cli::try_parse_from(["snapvfs", "scan"]).is_err());
}

#[test]
fn snapshot_command_reports_counts() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/a.txt"), b"a").unwrap();

    let output = context(temp.path())
        .execute(&Commands::Snapshot {
            path: PathBuf::from("."),
            json: true,
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["type"], "directory");
    assert_eq!(value["statistics"]["regular_files"], 1);
    assert_eq!(value["statistics"]["directories"], 2);
    assert_eq!(value["hash"].as_str().unwrap().len(), 64);
}

#[test]
fn index_command_lists_relative_paths() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/a.txt"), b"a").unwrap();
    fs::write(temp.path().join("b.txt"), b"b").unwrap();
    let ctx = context(temp.path());

    let output = ctx
        .execute(&Commands::Index {
            path: PathBuf::from("."),
            json: true,
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["b.txt", "src", "src/a.txt"]);

    let table = ctx
        .execute(&Commands::Index {
            path: PathBuf::from("."),
            json: false,
        })
        .unwrap();
    assert!(table.contains("src/a.txt"));
    assert!(table.contains("directory"));
}

#[test]
fn compare_command_lists_differences() {
    let temp = tempfile::tempdir().unwrap();
    for side in ["left", "right"] {
        fs::create_dir_all(temp.path().join(side)).unwrap();
        fs::write(temp.path().join(side).join("same.txt"), b"same").unwrap();
    }
    let ctx = context(temp.path());
    let identical = ctx
        .execute(&Commands::Compare {
            left: PathBuf::from("left"),
            right: PathBuf::from("right"),
            json: false,
        })
        .unwrap();
    assert!(identical.starts_with("Contents are identical"));

    fs::write(temp.path().join("right/extra.txt"), b"extra").unwrap();
    let ctx = context(temp.path());
    let output = ctx
        .execute(&Commands::Compare {
            left: PathBuf::from("left"),
            right: PathBuf::from("right"),
            json: true,
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["identical"], false);
    assert_eq!(value["differences"][0]["change"], "added");
    assert_eq!(value["differences"][0]["path"], "extra.txt");
}
