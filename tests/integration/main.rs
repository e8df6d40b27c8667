//! Integration tests for toolcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Command isolated from the user's config and runner environment
    fn toolcache(dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("toolcache");
        cmd.env("TOOLCACHE_CONFIG", dir.join("config.toml"))
            .env_remove("RUNNER_TOOL_CACHE")
            .env_remove("RUNNER_TEMP")
            .arg("--cache-root")
            .arg(dir.join("cache"))
            .arg("--temp-dir")
            .arg(dir.join("temp"));
        cmd
    }

    fn cache_file(dir: &Path, tool: &str, version: &str, arch: &str) {
        let source = dir.join(format!("{tool}-{version}-{arch}"));
        fs::write(&source, version).unwrap();
        toolcache(dir)
            .args(["cache-file"])
            .arg(&source)
            .args([tool, version, "--arch", arch])
            .assert()
            .success();
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("toolcache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Local tool cache for CI runners"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("toolcache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("toolcache"));
    }

    #[test]
    fn list_empty() {
        let dir = TempDir::new().unwrap();
        toolcache(dir.path())
            .args(["list", "jq", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn find_missing_fails_with_hint() {
        let dir = TempDir::new().unwrap();
        toolcache(dir.path())
            .args(["find", "jq", "^1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Could not find"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn find_rejects_bad_range() {
        let dir = TempDir::new().unwrap();
        toolcache(dir.path())
            .args(["find", "jq", ">>1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid version constraint"));
    }

    #[test]
    fn cache_file_then_find_and_list() {
        let dir = TempDir::new().unwrap();
        cache_file(dir.path(), "jq", "1.6.0", "x64");
        cache_file(dir.path(), "jq", "1.7.1", "x64");
        cache_file(dir.path(), "jq", "2.0.0", "arm64");

        let expected = dir.path().join("cache/jq/1.7.1/x64");
        toolcache(dir.path())
            .args(["find", "jq", "~1", "--arch", "x64"])
            .assert()
            .success()
            .stdout(predicate::str::contains(expected.display().to_string()));

        toolcache(dir.path())
            .args(["list", "jq", "--arch", "x64", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::eq("1.6.0\n1.7.1\n"));

        toolcache(dir.path())
            .args(["list", "jq", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::eq("1.6.0\n1.7.1\n2.0.0\n"));
    }

    #[test]
    fn cache_file_uses_tool_name_by_default() {
        let dir = TempDir::new().unwrap();
        cache_file(dir.path(), "yq", "4.40.5", "x64");

        let cached = dir.path().join("cache/yq/4.40.5/x64/yq");
        assert_eq!(fs::read_to_string(cached).unwrap(), "4.40.5");
        assert!(dir.path().join("cache/yq/4.40.5/x64.complete").is_file());
    }

    #[test]
    fn cache_dir_copies_tree() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("dist");
        fs::create_dir_all(source.join("bin")).unwrap();
        fs::write(source.join("bin/node"), "node").unwrap();

        toolcache(dir.path())
            .arg("cache-dir")
            .arg(&source)
            .args(["node", "=v20.11.0", "--arch", "x64"])
            .assert()
            .success();

        // The =v prefix is stripped from the stored version
        assert!(dir.path().join("cache/node/20.11.0/x64/bin/node").is_file());
    }

    #[test]
    fn cache_file_rejects_empty_tool() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("bin");
        fs::write(&source, "x").unwrap();

        toolcache(dir.path())
            .arg("cache-file")
            .arg(&source)
            .args(["", "1.0.0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache options"));
    }

    #[test]
    fn download_unreachable_fails() {
        let dir = TempDir::new().unwrap();
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        toolcache(dir.path())
            .args(["download", &format!("http://127.0.0.1:{port}/tool")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to download"));
    }

    #[test]
    fn info_shows_locations() {
        let dir = TempDir::new().unwrap();
        toolcache(dir.path())
            .arg("info")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache root"))
            .stdout(predicate::str::contains(dir.path().join("cache").display().to_string()));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        toolcache(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        toolcache(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }

    #[test]
    fn config_init_writes_file() {
        let dir = TempDir::new().unwrap();
        toolcache(dir.path())
            .args(["config", "init"])
            .assert()
            .success();

        let written = fs::read_to_string(dir.path().join("config.toml")).unwrap();
        assert!(written.contains("lock_timeout_secs = 300"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[cache\n").unwrap();

        toolcache(dir.path())
            .args(["list", "jq"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("config init --force"));
    }

    #[test]
    fn unknown_subcommand_fails() {
        cargo_bin_cmd!("toolcache")
            .arg("nonexistent")
            .assert()
            .failure();
    }
}
