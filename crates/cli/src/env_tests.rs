use super::*;
use serial_test::serial;

#[test]
#[serial]
fn home_dir_prefers_oms_home_dir_env() {
    std::env::set_var("OMS_HOME_DIR", "/tmp/explicit-oms-home");
    std::env::remove_var("XDG_STATE_HOME");

    let dir = home_dir().unwrap();

    assert_eq!(dir, PathBuf::from("/tmp/explicit-oms-home"));
    std::env::remove_var("OMS_HOME_DIR");
}

#[test]
#[serial]
fn home_dir_falls_back_to_xdg_state_home() {
    std::env::remove_var("OMS_HOME_DIR");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg-state");

    let dir = home_dir().unwrap();

    assert_eq!(dir, PathBuf::from("/tmp/xdg-state/oms"));
    std::env::remove_var("XDG_STATE_HOME");
}

#[test]
#[serial]
fn timeout_helpers_parse_milliseconds_from_env() {
    std::env::set_var("OMS_TIMEOUT_IPC_MS", "1234");

    assert_eq!(timeout_ipc_ms(), Some(Duration::from_millis(1234)));

    std::env::remove_var("OMS_TIMEOUT_IPC_MS");
    assert_eq!(timeout_ipc_ms(), None);
}
