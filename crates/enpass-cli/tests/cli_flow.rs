use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use enpass_core::crypto::{self, KdfDigest, KEY_LEN, NONCE_LEN};
use enpass_core::vault::{derive_vault_key, VAULT_FILE_NAME, VAULT_INFO_FILE_NAME};
use rusqlite::Connection;

const PASSWORD: &str = "mymasterpassword";
const PIN: &str = "correct-pin";
const SALT: &[u8; 16] = b"cli-fixture-salt";
const KDF_ITER: u32 = 1000;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_enpasscli"))
}

/// Scratch directories for one test: the vault, config home and cache dir.
struct TestEnv {
    base: PathBuf,
}

impl TestEnv {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let base = std::env::temp_dir().join(format!("{}_{}_{}", prefix, std::process::id(), nanos));
        for dir in ["vault", "config", "cache"] {
            fs::create_dir_all(base.join(dir)).expect("create test dir");
        }
        let env = Self { base };
        write_vault(&env.vault(), PASSWORD);
        env
    }

    fn vault(&self) -> PathBuf {
        self.base.join("vault")
    }

    fn config_home(&self) -> PathBuf {
        self.base.join("config")
    }

    fn cache_dir(&self) -> PathBuf {
        self.base.join("cache")
    }

    fn cache_files(&self) -> Vec<PathBuf> {
        fs::read_dir(self.cache_dir())
            .expect("read cache dir")
            .map(|entry| entry.expect("dir entry").path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("enpasscli-"))
            })
            .collect()
    }

    /// A command with a clean environment pointing at this test's dirs.
    fn command(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env_clear()
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("TMPDIR", self.cache_dir())
            .env("XDG_RUNTIME_DIR", self.cache_dir())
            .env("ENP_PIN_ITER_COUNT", "10000")
            .arg("--non-interactive")
            .stdin(Stdio::null());
        cmd
    }

    fn with_vault(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("--vault").arg(self.vault());
        cmd
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.base);
    }
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("run enpasscli")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn json(output: &Output) -> Vec<serde_json::Value> {
    assert!(
        output.status.success(),
        "command failed: {}",
        stderr(output)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON output")
}

fn titles(values: &[serde_json::Value]) -> Vec<String> {
    values
        .iter()
        .map(|value| value["title"].as_str().expect("title").to_string())
        .collect()
}

fn exec(conn: &Connection, sql: &str) {
    let mut stmt = conn.prepare(sql).expect("prepare");
    let mut rows = stmt.query([]).expect("query");
    while rows.next().expect("step").is_some() {}
}

/// Items: (uuid, title, login, password, trashed)
const ITEMS: &[(&str, &str, &str, &str, bool)] = &[
    (
        "9b2d4f6a-1c3e-4a5b-8d7f-0e1f2a3b4c01",
        "mylogin",
        "myusername",
        "mypassword",
        false,
    ),
    (
        "9b2d4f6a-1c3e-4a5b-8d7f-0e1f2a3b4c02",
        "Bank",
        "me@example.com",
        "bank-secret",
        false,
    ),
    (
        "9b2d4f6a-1c3e-4a5b-8d7f-0e1f2a3b4c03",
        "Old mail",
        "someone",
        "old-secret",
        true,
    ),
];

/// Open the fixture store keyed from `password`.
fn connect(dir: &Path, password: &str) -> Connection {
    let key = derive_vault_key(password.as_bytes(), SALT, KDF_ITER, KdfDigest::Sha256)
        .expect("derive key");
    let conn = Connection::open(dir.join(VAULT_FILE_NAME)).expect("open db");
    exec(
        &conn,
        &format!(
            "PRAGMA key = \"x'{}{}'\"",
            key.to_hex().as_str(),
            hex::encode(SALT)
        ),
    );
    exec(&conn, "PRAGMA cipher_compatibility = 3");
    conn
}

fn insert_item(
    conn: &Connection,
    uuid: &str,
    title: &str,
    login: &str,
    trashed: bool,
    item_key: &[u8],
    value: &str,
) {
    conn.execute(
        "INSERT INTO item VALUES (?1, 1700000000, 1700000000, ?2, ?3, '', ?4, 0, 'login', ?5, 0)",
        rusqlite::params![uuid, title, login, trashed as i64, item_key.to_vec()],
    )
    .expect("insert item");
    conn.execute(
        "INSERT INTO itemfield VALUES (?1, 'username', 'Username', '', 0)",
        rusqlite::params![uuid],
    )
    .expect("insert username field");
    conn.execute(
        "INSERT INTO itemfield VALUES (?1, 'password', 'Password', ?2, 0)",
        rusqlite::params![uuid, value],
    )
    .expect("insert password field");
}

fn write_vault(dir: &Path, password: &str) {
    let _ = fs::remove_file(dir.join(VAULT_FILE_NAME));
    fs::write(
        dir.join(VAULT_INFO_FILE_NAME),
        format!(
            r#"{{"vault_name":"Primary","have_keyfile":0,"kdf_iter":{},"version":6}}"#,
            KDF_ITER
        ),
    )
    .expect("write vault.json");

    let conn = connect(dir, password);
    conn.execute_batch(
        "CREATE TABLE item (
            uuid TEXT PRIMARY KEY, created_at INTEGER, field_updated_at INTEGER,
            title TEXT, subtitle TEXT, note TEXT, trashed INTEGER, deleted INTEGER,
            category TEXT, key BLOB, last_used INTEGER
        );
        CREATE TABLE itemfield (
            item_uuid TEXT, type TEXT, label TEXT, value TEXT, deleted INTEGER
        );",
    )
    .expect("create tables");

    for (uuid, title, login, secret, trashed) in ITEMS {
        let item_key = crypto::random_bytes::<{ KEY_LEN + NONCE_LEN }>().expect("random");
        let aad = hex::decode(uuid.replace('-', "")).expect("uuid hex");
        let sealed = crypto::seal(
            &item_key[..KEY_LEN],
            &item_key[KEY_LEN..],
            &aad,
            secret.as_bytes(),
        )
        .expect("seal");
        insert_item(
            &conn,
            uuid,
            title,
            login,
            *trashed,
            &item_key,
            &hex::encode(sealed),
        );
    }
}

/// Add an item whose secret does not decrypt under its item key.
fn add_corrupt_item(dir: &Path, password: &str, title: &str) {
    let conn = connect(dir, password);
    let item_key = crypto::random_bytes::<{ KEY_LEN + NONCE_LEN }>().expect("random");
    insert_item(
        &conn,
        "9b2d4f6a-1c3e-4a5b-8d7f-0e1f2a3b4c09",
        title,
        "nobody",
        false,
        &item_key,
        &"ab".repeat(32),
    );
}

#[test]
fn test_list_json_hides_secrets_and_trash() {
    let env = TestEnv::new("enp_list");
    let output = run(env.with_vault().env("MASTERPW", PASSWORD).args(["--json", "--sort", "list"]));
    let values = json(&output);

    assert_eq!(titles(&values), vec!["Bank", "mylogin"]);
    assert!(values.iter().all(|value| value.get("password").is_none()));
    assert_eq!(values[1]["login"], "myusername");
}

#[test]
fn test_show_includes_secrets_and_optional_trash() {
    let env = TestEnv::new("enp_show");
    let output = run(env.with_vault().env("MASTERPW", PASSWORD).args(["--json", "show", "mylogin"]));
    let values = json(&output);
    assert_eq!(values.len(), 1);
    assert_eq!(values[0]["password"], "mypassword");

    let output = run(env
        .with_vault()
        .env("MASTERPW", PASSWORD)
        .args(["--json", "--trashed", "show", "mail"]));
    let values = json(&output);
    assert_eq!(titles(&values), vec!["Old mail"]);
    assert_eq!(values[0]["password"], "old-secret");
}

#[test]
fn test_text_list_output() {
    let env = TestEnv::new("enp_text");
    let output = run(env.with_vault().env("MASTERPW", PASSWORD).arg("list"));
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("TITLE"));
    assert!(text.contains("mylogin"));
    assert!(!text.contains("mypassword"));
}

#[test]
fn test_pass_prints_only_the_secret() {
    let env = TestEnv::new("enp_pass");
    let output = run(env.with_vault().env("MASTERPW", PASSWORD).args(["pass", "MYLOGIN"]));
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "mypassword\n");
}

#[test]
fn test_pass_exit_codes_for_lookup_failures() {
    let env = TestEnv::new("enp_lookup");

    let ambiguous = run(env.with_vault().env("MASTERPW", PASSWORD).arg("pass"));
    assert_eq!(ambiguous.status.code(), Some(4));

    let missing = run(env.with_vault().env("MASTERPW", PASSWORD).args(["pass", "nothing-here"]));
    assert_eq!(missing.status.code(), Some(3));

    // Trashed entries never satisfy a unique lookup.
    let trashed = run(env.with_vault().env("MASTERPW", PASSWORD).args(["pass", "Old mail"]));
    assert_eq!(trashed.status.code(), Some(3));
}

#[test]
fn test_and_combination() {
    let env = TestEnv::new("enp_and");
    let or_output = run(env
        .with_vault()
        .env("MASTERPW", PASSWORD)
        .args(["--json", "list", "mylogin", "inexistent"]));
    assert_eq!(titles(&json(&or_output)), vec!["mylogin"]);

    let and_output = run(env
        .with_vault()
        .env("MASTERPW", PASSWORD)
        .args(["--json", "--and", "list", "mylogin", "inexistent"]));
    assert!(json(&and_output).is_empty());
}

#[test]
fn test_field_scoped_filter() {
    let env = TestEnv::new("enp_field");
    let title_only = run(env
        .with_vault()
        .env("MASTERPW", PASSWORD)
        .args(["--json", "list", "example.com"]));
    assert!(json(&title_only).is_empty());

    let with_login = run(env
        .with_vault()
        .env("MASTERPW", PASSWORD)
        .args(["--json", "--field", "title", "--field", "login", "list", "example.com"]));
    assert_eq!(titles(&json(&with_login)), vec!["Bank"]);
}

#[test]
fn test_wrong_password_exits_auth_failed() {
    let env = TestEnv::new("enp_wrongpw");
    let output = run(env.with_vault().env("MASTERPW", "not-the-password").arg("dryrun"));
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_missing_password_fails_without_prompt() {
    let env = TestEnv::new("enp_nopw");
    let output = run(env.with_vault().arg("dryrun"));
    assert!(!output.status.success());
    assert!(stderr(&output).contains("MASTERPW"));
}

#[test]
fn test_vault_path_errors() {
    let env = TestEnv::new("enp_paths");

    let no_vault = run(env.command().env("MASTERPW", PASSWORD).arg("dryrun"));
    assert_eq!(no_vault.status.code(), Some(4));

    let missing = run(env
        .command()
        .env("MASTERPW", PASSWORD)
        .arg("--vault")
        .arg(env.base.join("nowhere"))
        .arg("dryrun"));
    assert_eq!(missing.status.code(), Some(3));
}

#[test]
fn test_vault_path_from_config_file() {
    let env = TestEnv::new("enp_config");
    let config_dir = env.config_home().join("enpasscli");
    fs::create_dir_all(&config_dir).expect("create config dir");
    fs::write(
        config_dir.join("config.toml"),
        format!(
            "[vault]\npath = \"{}\"\n\n[output]\njson = true\nsort = true\n",
            env.vault().display()
        ),
    )
    .expect("write config");

    let output = run(env.command().env("MASTERPW", PASSWORD).arg("list"));
    assert_eq!(titles(&json(&output)), vec!["Bank", "mylogin"]);
}

#[test]
fn test_pin_cache_flow() {
    let env = TestEnv::new("enp_pin");

    let first = run(env
        .with_vault()
        .env("MASTERPW", PASSWORD)
        .env("ENP_PIN", PIN)
        .args(["--pin", "dryrun"]));
    assert!(first.status.success(), "{}", stderr(&first));
    assert_eq!(env.cache_files().len(), 1);

    // No password needed while the cache is valid.
    let cached = run(env.with_vault().env("ENP_PIN", PIN).args(["--pin", "pass", "bank"]));
    assert!(cached.status.success(), "{}", stderr(&cached));
    assert_eq!(stdout(&cached), "bank-secret\n");

    let wrong_pin = run(env
        .with_vault()
        .env("ENP_PIN", "incorrect-pin")
        .args(["--pin", "pass", "bank"]));
    assert_eq!(wrong_pin.status.code(), Some(5));

    let lock = run(env.with_vault().arg("lock"));
    assert!(lock.status.success(), "{}", stderr(&lock));
    assert!(stdout(&lock).contains("cleared"));
    assert!(env.cache_files().is_empty());

    let after_lock = run(env.with_vault().env("ENP_PIN", PIN).args(["--pin", "pass", "bank"]));
    assert!(!after_lock.status.success());
}

#[test]
fn test_pin_cache_with_pepper() {
    let env = TestEnv::new("enp_pepper");

    let first = run(env
        .with_vault()
        .env("MASTERPW", PASSWORD)
        .env("ENP_PIN", PIN)
        .env("ENP_PIN_PEPPER", "pepper")
        .args(["--pin", "dryrun"]));
    assert!(first.status.success(), "{}", stderr(&first));

    let no_pepper = run(env.with_vault().env("ENP_PIN", PIN).args(["--pin", "dryrun"]));
    assert_eq!(no_pepper.status.code(), Some(5));

    let with_pepper = run(env
        .with_vault()
        .env("ENP_PIN", PIN)
        .env("ENP_PIN_PEPPER", "pepper")
        .args(["--pin", "dryrun"]));
    assert!(with_pepper.status.success(), "{}", stderr(&with_pepper));
}

#[test]
fn test_short_pin_rejected_before_cache_file() {
    let env = TestEnv::new("enp_shortpin");
    let output = run(env
        .with_vault()
        .env("MASTERPW", PASSWORD)
        .env("ENP_PIN", "1234")
        .args(["--pin", "dryrun"]));

    assert_eq!(output.status.code(), Some(4));
    assert!(env.cache_files().is_empty());
}

#[test]
fn test_invalid_log_level_rejected() {
    let env = TestEnv::new("enp_log");
    let output = run(env.with_vault().args(["--log", "chatty", "dryrun"]));
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_show_skips_entry_that_fails_to_decrypt() {
    let env = TestEnv::new("enp_corrupt_show");
    add_corrupt_item(&env.vault(), PASSWORD, "Broken");

    let output = run(env.with_vault().env("MASTERPW", PASSWORD).args(["--json", "--sort", "show"]));
    let values = json(&output);
    assert_eq!(titles(&values), vec!["Bank", "mylogin"]);
    assert_eq!(values[1]["password"], "mypassword");
    assert!(stderr(&output).contains("skipping entry"));

    // Listing never decrypts, so the entry is still shown there.
    let output = run(env.with_vault().env("MASTERPW", PASSWORD).args(["--json", "--sort", "list"]));
    assert_eq!(titles(&json(&output)), vec!["Bank", "Broken", "mylogin"]);
}

#[test]
fn test_pass_fails_when_entry_does_not_decrypt() {
    let env = TestEnv::new("enp_corrupt_pass");
    add_corrupt_item(&env.vault(), PASSWORD, "Broken");

    let output = run(env.with_vault().env("MASTERPW", PASSWORD).args(["pass", "broken"]));
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("could not decrypt Broken"));
}

#[test]
fn test_stale_cached_key_is_cleared_and_replaced() {
    let env = TestEnv::new("enp_stale");
    const NEW_PASSWORD: &str = "a-rotated-master-password";

    let first = run(env
        .with_vault()
        .env("MASTERPW", PASSWORD)
        .env("ENP_PIN", PIN)
        .args(["--pin", "dryrun"]));
    assert!(first.status.success(), "{}", stderr(&first));
    let cache = env.cache_files();
    assert_eq!(cache.len(), 1);
    let stale_record = fs::read(&cache[0]).expect("read cache");

    write_vault(&env.vault(), NEW_PASSWORD);

    // The cached key no longer opens the vault: it is dropped and, with no
    // password available, the unlock fails.
    let rejected = run(env.with_vault().env("ENP_PIN", PIN).args(["--pin", "dryrun"]));
    assert!(!rejected.status.success());
    assert!(stderr(&rejected).contains("cached vault key was rejected"));
    assert!(env.cache_files().is_empty());

    let recovered = run(env
        .with_vault()
        .env("MASTERPW", NEW_PASSWORD)
        .env("ENP_PIN", PIN)
        .args(["--pin", "dryrun"]));
    assert!(recovered.status.success(), "{}", stderr(&recovered));
    let cache = env.cache_files();
    assert_eq!(cache.len(), 1);
    assert_ne!(fs::read(&cache[0]).expect("read cache"), stale_record);

    let cached = run(env.with_vault().env("ENP_PIN", PIN).args(["--pin", "pass", "mylogin"]));
    assert!(cached.status.success(), "{}", stderr(&cached));
    assert_eq!(stdout(&cached), "mypassword\n");
}
