use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// Stand-in for setxkbmap: `-v 9` prints a layout dump built from
/// `FAKE_LAYOUT`, anything else is appended to `FAKE_LOG`.
const FAKE_SETXKBMAP: &str = r#"#!/bin/sh
if [ "$1" = "-v" ]; then
    printf 'Applied rules from evdev:\nrules:      evdev\nmodel:      pc105\nlayout:     %s\n' "${FAKE_LAYOUT:-us}"
    exit 0
fi
echo "$@" >> "$FAKE_LOG"
"#;

pub struct TestEnv {
    _tmp: TempDir,
    pub state_dir: PathBuf,
    setxkbmap: PathBuf,
    log: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let state_dir = tmp.path().join("state");
        let setxkbmap = tmp.path().join("setxkbmap");
        let log = tmp.path().join("setxkbmap.log");

        fs::write(&setxkbmap, FAKE_SETXKBMAP).expect("write fake setxkbmap");
        fs::set_permissions(&setxkbmap, fs::Permissions::from_mode(0o755)).expect("make fake setxkbmap executable");

        Self {
            _tmp: tmp,
            state_dir,
            setxkbmap,
            log,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("kbswitch");
        cmd.env("KBSWITCH_CONFIG_DIR", &self.state_dir)
            .env("KBSWITCH_SETXKBMAP", &self.setxkbmap)
            .env("KBSWITCH_NOTIFY_SEND", "true")
            .env("FAKE_LOG", &self.log)
            .env_remove("LOG_LEVEL");
        cmd
    }

    /// Run with the fake utility reporting `layout` as active
    pub fn run(&self, layout: &str, args: &[&str]) -> String {
        let out = self
            .cmd()
            .env("FAKE_LAYOUT", layout)
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        String::from_utf8(out).expect("utf-8 stdout")
    }

    pub fn add(&self, name: &str, layout: &str) {
        self.run(layout, &["-a", name]);
    }

    pub fn list(&self) -> String {
        self.run("us", &["-l"])
    }

    /// Every setxkbmap invocation that applied a layout, one per line
    pub fn applied(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn mappings(&self) -> String {
        fs::read_to_string(self.state_dir.join("mappings")).expect("read mappings")
    }

    pub fn current(&self) -> String {
        fs::read_to_string(self.state_dir.join("current")).expect("read current")
    }
}
