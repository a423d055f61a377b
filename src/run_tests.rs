//! Tests for the run module.

use super::*;
use gh_relay::config::Cli;
use gh_relay::registry::Subscription;
use tempfile::tempdir;

fn config_with(args: &[&str], toml: &str) -> ValidatedConfig {
    let mut full_args = vec!["gh-relay", "--secret", "s3cret"];
    full_args.extend(args);
    let cli = Cli::parse_from_iter(full_args);
    let toml = gh_relay::config::TomlConfig::parse(toml).unwrap();
    ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap()
}

const TWO_PLATFORMS: &str = r#"
    [platforms.onebot]
    url = "http://127.0.0.1:5700/send_group_msg"
    body_template = '{"group_id": {{recipient}}, "message": {{json text}}}'

    [platforms.discord]
    url = "https://relay.example.com/discord"
    method = "PUT"
"#;

mod run_error {
    use super::*;

    #[test]
    fn bind_error_names_address() {
        let error = RunError::Bind {
            addr: "127.0.0.1:8080".parse().unwrap(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };

        assert!(error.to_string().contains("127.0.0.1:8080"));
    }

    #[test]
    fn command_failed_displays_reply() {
        let error = RunError::CommandFailed(SUBSCRIBE_FAILED);

        assert_eq!(error.to_string(), SUBSCRIBE_FAILED);
    }
}

mod connections {
    use super::*;

    #[test]
    fn registers_every_configured_platform() {
        let config = config_with(&[], TWO_PLATFORMS);

        let connections = build_connections(&config).unwrap();

        assert_eq!(connections.platforms(), vec!["discord", "onebot"]);
    }

    #[test]
    fn dry_run_registers_log_transports() {
        let config = config_with(&["--dry-run"], TWO_PLATFORMS);

        let connections = build_connections(&config).unwrap();

        assert_eq!(connections.len(), 2);
    }

    #[test]
    fn no_platforms_gives_empty_table() {
        let config = config_with(&[], "");

        let connections = build_connections(&config).unwrap();

        assert!(connections.is_empty());
    }

    #[test]
    fn bridge_carries_platform_settings() {
        let config = config_with(&[], TWO_PLATFORMS);
        let discord = config
            .platforms
            .iter()
            .find(|p| p.name == "discord")
            .unwrap();

        let bridge = create_bridge(ReqwestClient::new(), discord);

        assert_eq!(*bridge.method(), http::Method::PUT);
        assert_eq!(bridge.url().as_str(), "https://relay.example.com/discord");
    }
}

mod management {
    use super::*;

    #[tokio::test]
    async fn subscribe_list_unsubscribe() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("subs.json");

        let subscribe = Command::Subscribe {
            group: "10001".to_string(),
            platform: "onebot".to_string(),
        };
        let reply = manage(&subscribe, store.clone()).await.unwrap();
        assert_eq!(reply, commands::SUBSCRIBED);

        let listing = manage(&Command::List, store.clone()).await.unwrap();
        assert_eq!(listing, "onebot\t10001");

        let unsubscribe = Command::Unsubscribe {
            group: "10001".to_string(),
        };
        let reply = manage(&unsubscribe, store.clone()).await.unwrap();
        assert_eq!(reply, commands::UNSUBSCRIBED);

        let reply = manage(&unsubscribe, store.clone()).await.unwrap();
        assert_eq!(reply, commands::NOT_SUBSCRIBED);
    }

    #[tokio::test]
    async fn empty_list() {
        let dir = tempdir().unwrap();

        let listing = manage(&Command::List, dir.path().join("subs.json"))
            .await
            .unwrap();

        assert_eq!(listing, "No subscriptions.");
    }

    #[tokio::test]
    async fn corrupted_store_fails_subscribe() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("subs.json");
        std::fs::write(&store, "not json").unwrap();

        let subscribe = Command::Subscribe {
            group: "10001".to_string(),
            platform: "onebot".to_string(),
        };
        let result = manage(&subscribe, store).await;

        assert!(matches!(result, Err(RunError::CommandFailed(_))));
    }

    #[test]
    fn listing_is_one_line_per_subscription() {
        let text = format_subscriptions(&[
            Subscription::new("1", "discord"),
            Subscription::new("2", "onebot"),
        ]);

        assert_eq!(text, "discord\t1\nonebot\t2");
    }
}
