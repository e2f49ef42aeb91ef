use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_keywords(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("keywords.json");
    fs::write(
        &path,
        r#"{
  "Principal": ["principal", "ppal", "cuaderno unico"],
  "MedidasCautelares": ["medida", "cautelar"],
  "DepositosJudiciales": ["deposito", "titulo"]
}"#,
    )
    .expect("write keywords");
    path
}

#[test]
fn simulate_reports_decisions_without_touching_the_tree() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("VIGENTES");
    let case = root.join("05631408900120180015000");
    fs::create_dir_all(case.join("Cuaderno Ppal")).expect("mkdir");
    fs::write(case.join("Cuaderno Ppal").join("auto.pdf"), "a").expect("write");
    fs::write(case.join("memorial.pdf"), "m").expect("write");

    let keywords = write_keywords(tmp.path());
    let reports = tmp.path().join("reports");

    Command::cargo_bin("expedientes")
        .expect("binary")
        .current_dir(tmp.path())
        .env("EXPEDIENTES_CONFIG_PATH", tmp.path().join("no-config.toml"))
        .args(["reconcile", "--root"])
        .arg(&root)
        .args(["--prefix", "056314", "--keywords"])
        .arg(&keywords)
        .arg("--reports-dir")
        .arg(&reports)
        .assert()
        .success()
        .stdout(predicate::str::contains("mode=simulate"))
        .stdout(predicate::str::contains("renamed=1"));

    // nothing moved
    assert!(case.join("Cuaderno Ppal").join("auto.pdf").is_file());
    assert!(!case.join("Principal").exists());
    assert!(case.join("memorial.pdf").is_file());

    // but the decisions were persisted
    let step_dir = reports.join("reconcile");
    let mut prefixes: Vec<String> = fs::read_dir(&step_dir)
        .expect("read reports")
        .map(|entry| {
            entry
                .expect("entry")
                .file_name()
                .to_string_lossy()
                .to_string()
        })
        .collect();
    prefixes.sort();
    assert!(prefixes.iter().any(|name| name.starts_with("renamed_folders_")));
    assert!(prefixes.iter().any(|name| name.starts_with("skipped_")));
    assert!(reports.join("audit.log").is_file());
}
