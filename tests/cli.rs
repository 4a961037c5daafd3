//! Runs the built binary against a fake sysfs backlight.

use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    thread,
    time::{Duration, Instant},
};

use nix::{
    fcntl::{fcntl, FcntlArg},
    libc,
};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("backlightctl-cli-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("brightness"), "100\n").unwrap();
    std::fs::write(dir.join("max_brightness"), "852\n").unwrap();
    dir
}

fn backlightctl(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_backlightctl"));
    cmd.arg("--device")
        .arg(dir)
        .arg("--lock-file")
        .arg(dir.join("lock"))
        .arg("--state-file")
        .arg(dir.join("prev_brightness"))
        .arg("--icon-dir")
        .arg(dir);
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    backlightctl(dir).args(args).output().unwrap()
}

fn brightness(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("brightness")).unwrap()
}

fn write_lock(file: &File, kind: libc::c_int) {
    // SAFETY: flock is a plain C struct for which all zeroes is valid.
    let mut request: libc::flock = unsafe { std::mem::zeroed() };
    request.l_type = kind as _;
    request.l_whence = libc::SEEK_SET as _;
    fcntl(file, FcntlArg::F_SETLKW(&request)).unwrap();
}

#[test]
fn no_flags_prints_values() {
    let dir = scratch_dir("show");
    let out = run(&dir, &[]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "Max brightness = 852\nCurrent brightness = 100\n"
    );
    assert_eq!(brightness(&dir), "100\n");
}

#[test]
fn set_without_fade() {
    let dir = scratch_dir("set");
    let out = run(&dir, &["--fade-time", "0", "-s", "300"]);
    assert!(out.status.success());
    assert_eq!(brightness(&dir), "300\n");
    assert!(String::from_utf8_lossy(&out.stdout).ends_with("Set to 300\n"));
}

#[test]
fn decrement_with_fade() {
    let dir = scratch_dir("dec");
    let start = Instant::now();
    let out = run(&dir, &["-d", "50"]);
    assert!(out.status.success());
    assert_eq!(brightness(&dir), "50\n");
    // Nine paced steps of 17ms.
    assert!(start.elapsed() >= Duration::from_millis(150));
}

#[test]
fn icon_path_only_prints_one_line() {
    let dir = scratch_dir("iconpath");
    let out = run(&dir, &["-I", "--fade-time", "0", "-s", "852"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        format!(
            "{}\n",
            dir.join("notification-display-brightness-full.png").display()
        )
    );
}

#[test]
fn toggle_round_trip() {
    let dir = scratch_dir("toggle");
    assert!(run(&dir, &["-q", "-t"]).status.success());
    assert_eq!(brightness(&dir), "0\n");
    assert_eq!(
        std::fs::read_to_string(dir.join("prev_brightness")).unwrap(),
        "100\n"
    );
    assert!(run(&dir, &["-q", "-t"]).status.success());
    assert_eq!(brightness(&dir), "100\n");
}

#[test]
fn conflicting_operations_fail_without_writing() {
    let dir = scratch_dir("conflict");
    let out = run(&dir, &["-i", "5", "-d", "5"]);
    assert!(!out.status.success());
    assert_eq!(brightness(&dir), "100\n");
}

#[test]
fn missing_device_fails() {
    let dir = scratch_dir("missing");
    std::fs::remove_file(dir.join("max_brightness")).unwrap();
    assert!(!run(&dir, &["-s", "10"]).status.success());
    assert_eq!(brightness(&dir), "100\n");
}

#[test]
fn waits_for_lock_holder() {
    let dir = scratch_dir("lock");
    let lock = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(dir.join("lock"))
        .unwrap();
    write_lock(&lock, libc::F_WRLCK);

    let mut child = backlightctl(&dir)
        .args(["-q", "--fade-time", "0", "-s", "200"])
        .stdout(Stdio::null())
        .spawn()
        .unwrap();
    thread::sleep(Duration::from_millis(300));
    assert!(child.try_wait().unwrap().is_none(), "should block on the lock");
    assert_eq!(brightness(&dir), "100\n");

    write_lock(&lock, libc::F_UNLCK);
    assert!(child.wait().unwrap().success());
    assert_eq!(brightness(&dir), "200\n");
}
