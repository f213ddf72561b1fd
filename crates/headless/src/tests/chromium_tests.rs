use std::{ffi::OsString, fs};

use super::*;
use crate::{capture::HeadlessCapture, error::LaunchError};

#[test]
fn missing_configured_binary_reports_dependency() {
    let dir = tempfile::tempdir().expect("tempdir");
    let configured = dir.path().join("nope");

    let error = resolve_binary(Some(configured.as_path()), None).expect_err("missing");
    match error {
        LaunchError::DependencyMissing {
            dependency,
            remediation,
        } => {
            assert!(dependency.contains("nope"));
            assert!(remediation.contains("PANEL_CHROMIUM_PATH"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_search_path_reports_dependency() {
    let dir = tempfile::tempdir().expect("tempdir");
    let error = resolve_binary(None, Some(OsString::from(dir.path()))).expect_err("missing");
    assert!(matches!(error, LaunchError::DependencyMissing { .. }));
}

#[test]
fn search_path_is_scanned_in_order() {
    let first = tempfile::tempdir().expect("tempdir");
    let second = tempfile::tempdir().expect("tempdir");
    fs::write(second.path().join("google-chrome"), b"").expect("binary");
    fs::write(first.path().join("headless_shell"), b"").expect("binary");

    let search = env::join_paths([first.path(), second.path()]).expect("join");
    let found = resolve_binary(None, Some(search)).expect("found");
    assert_eq!(found, first.path().join("headless_shell"));
}

#[test]
fn launch_options_keep_one_window_for_the_whole_session() {
    let config = CaptureConfig {
        extra_args: vec!["--no-sandbox".into()],
        idle_timeout_secs: 90,
        ..CaptureConfig::default()
    };
    let binary = PathBuf::from("/opt/chromium/chrome");
    let profile = PathBuf::from("/tmp/panel-chromium-test");

    let options =
        launch_options(&config, &binary, &profile, Resolution::new(640, 480)).expect("options");
    assert!(options.headless);
    assert_eq!(options.path, Some(binary));
    assert_eq!(options.user_data_dir, Some(profile));
    assert_eq!(options.window_size, Some((640, 480)));
    assert_eq!(options.idle_browser_timeout, config.idle_timeout());
    assert_eq!(options.args, [OsStr::new("--no-sandbox")]);
}

#[test]
fn clip_covers_the_requested_size() {
    let clip = clip_to(Resolution::new(320, 200));
    assert_eq!((clip.x, clip.y), (0.0, 0.0));
    assert_eq!((clip.width, clip.height, clip.scale), (320.0, 200.0, 1.0));
}

#[test]
fn missing_binary_fails_before_anything_is_started() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = ChromiumEngine::new(CaptureConfig {
        binary: Some(dir.path().join("chromium")),
        ..CaptureConfig::default()
    });

    let error = HeadlessCapture::launch(
        &engine,
        &url::Url::parse("http://127.0.0.1:8080/?viewer_id=client").expect("url"),
        Resolution::default(),
    )
    .expect_err("launch");
    assert!(matches!(error, LaunchError::DependencyMissing { .. }));
}
