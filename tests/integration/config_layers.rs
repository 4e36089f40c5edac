use snapvfs::config::sources::workspace_file::workspace_config_file;
use snapvfs::tooling::cli::CliContext;
use snapvfs::{CaseSensitivity, ConfigLoader};
use std::fs;

#[test]
fn workspace_config_reaches_cli_context() {
    let temp = tempfile::tempdir().unwrap();
    let file = workspace_config_file(temp.path());
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(
        &file,
        "case_sensitivity = \"case-insensitive\"\n[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();

    let ctx = CliContext::new(temp.path().to_path_buf(), None).unwrap();
    assert_eq!(ctx.config().logging.level, "debug");
    assert_eq!(ctx.vfs().case_sensitivity(), CaseSensitivity::CaseInsensitive);
}

#[test]
fn explicit_config_file_is_required() {
    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("nope.toml");
    assert!(ConfigLoader::load_from_file(&missing).is_err());
    assert!(CliContext::new(temp.path().to_path_buf(), Some(missing)).is_err());
}

#[test]
fn explicit_config_file_sets_excludes() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("snapvfs.toml");
    fs::write(&path, "default_excludes = [\"build/**\"]\n").unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    let excludes = config.default_excludes.compile();
    assert!(excludes.exclude_dir("build"));
    assert!(!excludes.exclude_dir(".git"));
}
