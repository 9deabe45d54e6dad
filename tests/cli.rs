use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dompet(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dompet").unwrap();
    cmd.env("DOMPET_DATA_DIR", dir.path())
        .env_remove("GEMINI_API_KEY")
        .env_remove("OPENROUTER_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn init_creates_settings_and_data_files() {
    let dir = TempDir::new().unwrap();

    dompet(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete"));

    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("transactions.json").exists());

    dompet(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Budget warning at:    80%"));
}

#[test]
fn add_and_list_transactions() {
    let dir = TempDir::new().unwrap();

    dompet(&dir)
        .args(["tx", "add", "expense", "35.000", "makanan", "-m", "Makan siang"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pengeluaran Rp35.000 (Makanan & Minuman)"));

    dompet(&dir)
        .args(["transaction", "add", "income", "5000000", "gaji"])
        .assert()
        .success();

    dompet(&dir)
        .args(["tx", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Makan siang"))
        .stdout(predicate::str::contains("-Rp35.000"))
        .stdout(predicate::str::contains("Net: Rp4.965.000"));

    dompet(&dir)
        .args(["tx", "list", "--type", "income"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Makan siang").not());
}

#[test]
fn invalid_amount_is_rejected() {
    let dir = TempDir::new().unwrap();

    dompet(&dir)
        .args(["tx", "add", "expense", "banyak", "makanan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid amount"));

    dompet(&dir)
        .args(["tx", "add", "expense", "0", "makanan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be positive"));
}

#[test]
fn budget_warning_is_announced_once() {
    let dir = TempDir::new().unwrap();

    dompet(&dir)
        .args(["budget", "set", "Makanan & Minuman", "100000"])
        .assert()
        .success();

    dompet(&dir)
        .args(["tx", "add", "expense", "90000", "makanan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sudah terpakai 90%"));

    dompet(&dir)
        .args(["tx", "add", "expense", "1000", "makanan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sudah terpakai").not());

    dompet(&dir)
        .args(["budget", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hampir habis"));

    dompet(&dir)
        .args(["notify", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 unread"));
}

#[test]
fn goal_contribution_updates_progress() {
    let dir = TempDir::new().unwrap();

    dompet(&dir)
        .args(["goal", "add", "Laptop", "10000000", "--by", "2099-12-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created goal 'Laptop'"));

    dompet(&dir)
        .args(["goal", "contribute", "laptop", "2500000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25.0%"));

    dompet(&dir)
        .args(["goal", "add", "Laptop", "5000000", "--by", "2099-12-31"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    dompet(&dir)
        .args(["tx", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[goal]"));
}

#[test]
fn paying_a_bill_advances_due_date() {
    let dir = TempDir::new().unwrap();

    dompet(&dir)
        .args(["bill", "add", "Listrik", "350000", "--due", "2099-01-15"])
        .assert()
        .success();

    dompet(&dir)
        .args(["bill", "pay", "listrik"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paid 'Listrik'"))
        .stdout(predicate::str::contains("Next due: 2099-02-15"));

    dompet(&dir)
        .args(["tx", "list", "--search", "Listrik"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[bill]"));
}

#[test]
fn export_round_trips_through_verify() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("export.json");

    dompet(&dir)
        .args(["tx", "add", "expense", "20000", "transport"])
        .assert()
        .success();

    dompet(&dir)
        .args(["export", "all"])
        .arg(&out)
        .arg("--pretty")
        .assert()
        .success();

    dompet(&dir)
        .args(["export", "verify"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid export"))
        .stdout(predicate::str::contains("Transactions:  1"));
}

#[test]
fn backups_can_be_created_and_listed() {
    let dir = TempDir::new().unwrap();

    dompet(&dir)
        .args(["backup", "create"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created: backup-"));

    dompet(&dir)
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 backup(s)"));

    dompet(&dir)
        .args(["backup", "restore", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn audit_log_records_changes() {
    let dir = TempDir::new().unwrap();

    dompet(&dir)
        .args(["tx", "add", "expense", "15000", "hiburan"])
        .assert()
        .success();

    dompet(&dir)
        .args(["audit", "--limit", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE Transaction"));
}

#[test]
fn chat_requires_api_key_but_history_does_not() {
    let dir = TempDir::new().unwrap();

    dompet(&dir)
        .args(["chat", "halo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));

    dompet(&dir)
        .args(["chat", "--history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved conversation"));
}

#[test]
fn summary_shows_current_month() {
    let dir = TempDir::new().unwrap();

    dompet(&dir)
        .args(["tx", "add", "income", "1000000", "gaji"])
        .assert()
        .success();

    dompet(&dir)
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary:"))
        .stdout(predicate::str::contains("Rp1.000.000"));
}
