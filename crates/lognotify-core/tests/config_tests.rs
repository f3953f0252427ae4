use lognotify_core::{ConfigLoader, Error, ErrorKind, RemoteConfig};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

#[test]
fn load_reads_identifier_conf_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("web.conf"),
        "ssh_hostname = web-01\nlog_path = /var/log/nginx/access.log\nssh_options = -p 2222\n",
    )
    .unwrap();

    let config = ConfigLoader::new(temp.path()).load("web").unwrap();

    assert_eq!(
        config,
        RemoteConfig::new("web-01", "/var/log/nginx/access.log").with_options("-p 2222")
    );
    assert_eq!(config.option_args().unwrap(), vec!["-p", "2222"]);
}

#[test]
fn missing_file_is_config_not_found() {
    let temp = TempDir::new().unwrap();

    let err = ConfigLoader::new(temp.path()).load("absent").unwrap_err();

    assert!(matches!(err, Error::ConfigNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("absent.conf"), "got: {err}");
}

#[test]
fn traversal_identifier_is_rejected() {
    let temp = TempDir::new().unwrap();

    let err = ConfigLoader::new(temp.path().join("conf")).load("../secret").unwrap_err();

    assert!(matches!(err, Error::InvalidIdentifier { .. }));
}

#[test]
fn path_for_appends_conf_extension() {
    let loader = ConfigLoader::new("/home/op/.config/lognotify");
    assert_eq!(
        loader.path_for("messages").unwrap(),
        std::path::PathBuf::from("/home/op/.config/lognotify/messages.conf")
    );
}

#[test]
fn empty_options_value_means_no_options() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("m.conf"),
        "ssh_hostname = h\nlog_path = /p\nssh_options =\n",
    )
    .unwrap();

    let config = ConfigLoader::new(temp.path()).load("m").unwrap();

    assert_eq!(config.options, None);
}

#[rstest]
#[case::missing_host("log_path = /p\n", "ssh_hostname")]
#[case::missing_path("ssh_hostname = h\n", "log_path")]
#[case::not_a_pair("ssh_hostname = h\nlog_path\n", "line 2")]
#[case::bad_options("ssh_hostname = h\nlog_path = /p\nssh_options = 'unterminated\n", "ssh_options")]
#[case::option_like_host("ssh_hostname = -F/tmp/evil\nlog_path = /p\n", "must not start with")]
#[case::option_like_path("ssh_hostname = h\nlog_path = --version\n", "'log_path' must not start with")]
fn malformed_files_are_config_errors(#[case] content: &str, #[case] mentions: &str) {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("bad.conf"), content).unwrap();

    let err = ConfigLoader::new(temp.path()).load("bad").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains(mentions), "got: {err}");
}
