//! Tests for CLI > TOML > default precedence.

use std::path::PathBuf;
use std::time::Duration;

use super::*;

mod defaults {
    use super::*;

    #[test]
    fn defaults_without_toml() {
        let config = ValidatedConfig::from_raw(&cli_with_secret(&[]), None).unwrap();

        assert_eq!(config.path, "/github/webhook");
        assert_eq!(config.listen.to_string(), "127.0.0.1:8080");
        assert_eq!(config.store_file, PathBuf::from("subscriptions.json"));
        assert_eq!(config.send_timeout, Duration::from_secs(10));
        assert!(!config.dry_run);
        assert!(!config.verbose);
    }
}

mod toml_over_defaults {
    use super::*;

    #[test]
    fn toml_values_replace_defaults() {
        let toml = toml(
            r#"
            [server]
            path = "/hooks/github"
            listen = "0.0.0.0:9000"

            [store]
            file = "/data/subs.json"

            [dispatch]
            send_timeout = 30
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli_with_secret(&[]), Some(&toml)).unwrap();

        assert_eq!(config.path, "/hooks/github");
        assert_eq!(config.listen.to_string(), "0.0.0.0:9000");
        assert_eq!(config.store_file, PathBuf::from("/data/subs.json"));
        assert_eq!(config.send_timeout, Duration::from_secs(30));
    }
}

mod cli_over_toml {
    use super::*;

    #[test]
    fn cli_values_replace_toml() {
        let toml = toml(
            r#"
            [server]
            secret = "from-file"
            path = "/from-file"
            listen = "0.0.0.0:9000"

            [store]
            file = "/from-file.json"

            [dispatch]
            send_timeout = 30
        "#,
        );
        let cli = cli(&[
            "--secret",
            "from-cli",
            "--path",
            "/from-cli",
            "--listen",
            "127.0.0.1:7000",
            "--store-file",
            "/from-cli.json",
            "--send-timeout",
            "2",
        ]);

        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(config.secret, "from-cli");
        assert_eq!(config.path, "/from-cli");
        assert_eq!(config.listen.port(), 7000);
        assert_eq!(config.store_file, PathBuf::from("/from-cli.json"));
        assert_eq!(config.send_timeout, Duration::from_secs(2));
    }

    #[test]
    fn cli_only_flags() {
        let cli = cli_with_secret(&["--dry-run", "--verbose"]);
        let config = ValidatedConfig::from_raw(&cli, None).unwrap();

        assert!(config.dry_run);
        assert!(config.verbose);
    }
}

mod tilde {
    use super::super::super::expand_tilde;
    use super::*;

    #[test]
    fn plain_path_is_unchanged() {
        let path = PathBuf::from("/var/lib/subs.json");

        assert_eq!(expand_tilde(&path).unwrap(), path);
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };

        let expanded = expand_tilde(&PathBuf::from("~/gh-relay/subs.json")).unwrap();

        assert_eq!(expanded, home.join("gh-relay/subs.json"));
    }

    #[test]
    fn tilde_user_is_not_expanded() {
        let path = PathBuf::from("~alice/subs.json");

        assert_eq!(expand_tilde(&path).unwrap(), path);
    }
}
