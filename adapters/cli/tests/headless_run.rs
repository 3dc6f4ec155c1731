use std::{fs, path::Path, process::Command};

fn survivor(args: &[&str], dir: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_survivor"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to launch survivor binary")
}

#[test]
fn short_run_prints_summary_and_saves() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(
        dir.path().join("run.toml"),
        "save_every = 10\n\n[simulation]\nseed = 7\n",
    )
    .expect("write config");

    let output = survivor(
        &["--config", "run.toml", "--frames", "30", "--save-path", "slot.txt"],
        dir.path(),
    );

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "survived 30 frames");
    assert_eq!(lines[1], "level 1 | score 0 | health 200 | enemies alive 0");
    assert!(dir.path().join("slot.txt").is_file());

    let resumed = survivor(
        &["--frames", "5", "--save-path", "slot.txt", "--resume"],
        dir.path(),
    );
    assert!(resumed.status.success(), "{resumed:?}");
}

#[test]
fn invalid_config_exits_with_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("run.toml"), "speed = 3\n").expect("write config");

    let output = survivor(&["--config", "run.toml", "--frames", "1"], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid run config"), "{stderr}");
}
