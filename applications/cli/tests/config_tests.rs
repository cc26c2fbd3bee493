//! Configuration loading from files

use lyra_cli::CliConfig;
use lyra_core::Role;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_sections_from_file() {
    let file = write_config(
        r#"
[server]
url = "https://music.example.com/api"

[storage]
database_url = "sqlite::memory:"

[playback]
volume = 0.5
shuffle = true

[session]
token = "abc123"
role = "admin"
"#,
    );

    let config = CliConfig::load(Some(file.path())).unwrap();
    config.validate().unwrap();

    assert_eq!(config.server.url, "https://music.example.com/api");
    assert_eq!(config.storage.database_url, "sqlite::memory:");
    assert!(config.playback.shuffle);
    assert!(!config.playback.repeat);
    assert!(config.playback.allow_anonymous_preferences);

    let session = config.session().unwrap();
    assert_eq!(session.role, Role::Admin);
    assert_eq!(session.token(), "abc123");
}

#[test]
fn missing_sections_use_defaults() {
    let file = write_config("[playback]\nrepeat = true\n");

    let config = CliConfig::load(Some(file.path())).unwrap();

    assert!(config.playback.repeat);
    assert!((config.playback.volume - 0.8).abs() < f32::EPSILON);
    assert_eq!(config.server.url, "http://localhost:8080/api");
}

#[test]
fn explicit_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    assert!(CliConfig::load(Some(&missing)).is_err());
}

#[test]
fn invalid_volume_fails_validation() {
    let file = write_config("[playback]\nvolume = 3.0\n");

    let config = CliConfig::load(Some(file.path())).unwrap();

    assert!(config.validate().is_err());
}
