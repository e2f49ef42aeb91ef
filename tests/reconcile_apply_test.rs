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
  "Principal": ["principal", "ppal"],
  "MedidasCautelares": ["medida", "cautelar", "mc"],
  "DepositosJudiciales": ["deposito", "titulo"]
}"#,
    )
    .expect("write keywords");
    path
}

fn run_reconcile(base: &Path, root: &Path, keywords: &Path, reports: &Path) {
    Command::cargo_bin("expedientes")
        .expect("binary")
        .current_dir(base)
        .env("EXPEDIENTES_CONFIG_PATH", base.join("no-config.toml"))
        .args(["reconcile", "--apply", "--root"])
        .arg(root)
        .args(["--prefix", "056314", "--keywords"])
        .arg(keywords)
        .arg("--reports-dir")
        .arg(reports)
        .assert()
        .success()
        .stdout(predicate::str::contains("mode=apply"));
}

#[test]
fn apply_renames_merges_and_routes_without_losing_files() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("VIGENTES");
    let case = root.join("05631408900120180015000");

    // two folders collide on MedidasCautelares, with a same-named file
    fs::create_dir_all(case.join("Medida Cautelar 2019")).expect("mkdir");
    fs::create_dir_all(case.join("M.C. embargo")).expect("mkdir");
    fs::write(case.join("Medida Cautelar 2019").join("oficio.pdf"), "primero").expect("write");
    fs::write(case.join("M.C. embargo").join("oficio.pdf"), "segundo").expect("write");
    // no principal-ish folder, so the loose file must be routed
    fs::write(case.join("demanda.pdf"), "d").expect("write");

    let keywords = write_keywords(tmp.path());
    let reports = tmp.path().join("reports");
    run_reconcile(tmp.path(), &root, &keywords, &reports);

    let medidas = case.join("MedidasCautelares");
    // "M.C. embargo" sorts first, so it takes the rename; the other merges
    assert_eq!(
        fs::read_to_string(medidas.join("oficio.pdf")).expect("read"),
        "segundo"
    );
    assert_eq!(
        fs::read_to_string(medidas.join("oficio_1.pdf")).expect("read"),
        "primero"
    );
    assert!(!case.join("Medida Cautelar 2019").exists());
    assert!(!case.join("M.C. embargo").exists());

    // orphan routed into the standard nested container
    assert!(
        case.join("01PrimeraInstancia/Principal/demanda.pdf")
            .is_file()
    );
}

#[test]
fn second_apply_run_makes_no_further_changes() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("VIGENTES");
    let case = root.join("05631408900120180015000");
    fs::create_dir_all(case.join("Titulos judiciales")).expect("mkdir");
    fs::write(case.join("Titulos judiciales").join("dj.pdf"), "d").expect("write");

    let keywords = write_keywords(tmp.path());
    let reports = tmp.path().join("reports");
    run_reconcile(tmp.path(), &root, &keywords, &reports);

    assert!(case.join("DepositosJudiciales/dj.pdf").is_file());

    Command::cargo_bin("expedientes")
        .expect("binary")
        .current_dir(tmp.path())
        .env("EXPEDIENTES_CONFIG_PATH", tmp.path().join("no-config.toml"))
        .args(["reconcile", "--apply", "--root"])
        .arg(&root)
        .args(["--prefix", "056314", "--keywords"])
        .arg(&keywords)
        .arg("--reports-dir")
        .arg(&reports)
        .assert()
        .success()
        .stdout(predicate::str::contains("renamed=0"))
        .stdout(predicate::str::contains("merged=0"));
}
