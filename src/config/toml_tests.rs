//! Tests for TOML configuration parsing.

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            secret = "s3cret"
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        assert_eq!(config.server.secret.as_deref(), Some("s3cret"));
        assert!(config.server.path.is_none());
        assert!(config.platforms.is_empty());
    }

    #[test]
    fn parse_all_sections() {
        let toml = r#"
            [server]
            secret = "s3cret"
            path = "/hooks/github"
            listen = "0.0.0.0:9000"

            [store]
            file = "~/subs.json"

            [dispatch]
            send_timeout = 3
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        assert_eq!(config.server.path.as_deref(), Some("/hooks/github"));
        assert_eq!(config.server.listen.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(config.store.file.as_deref(), Some("~/subs.json"));
        assert_eq!(config.dispatch.send_timeout, Some(3));
    }

    #[test]
    fn parse_platform_sections() {
        let toml = r#"
            [platforms.onebot]
            url = "http://127.0.0.1:5700/send_group_msg"
            body_template = '{"group_id": {{recipient}}}'

            [platforms.discord]
            url = "https://relay.example.com/discord"
            method = "PUT"
            bearer = "token"

            [platforms.discord.headers]
            X-Custom-Header = "custom-value"
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        assert_eq!(config.platforms.len(), 2);

        let onebot = &config.platforms["onebot"];
        assert_eq!(
            onebot.url.as_deref(),
            Some("http://127.0.0.1:5700/send_group_msg")
        );
        assert!(onebot.body_template.is_some());

        let discord = &config.platforms["discord"];
        assert_eq!(discord.method.as_deref(), Some("PUT"));
        assert_eq!(discord.bearer.as_deref(), Some("token"));
        assert_eq!(
            discord.headers.get("X-Custom-Header").map(String::as_str),
            Some("custom-value")
        );
    }

    #[test]
    fn empty_config_is_valid() {
        let config = TomlConfig::parse("").unwrap();

        assert!(config.server.secret.is_none());
        assert!(config.store.file.is_none());
        assert!(config.dispatch.send_timeout.is_none());
    }
}

mod errors {
    use super::*;

    #[test]
    fn unknown_section_is_rejected() {
        let result = TomlConfig::parse("[monitor]\npoll_interval = 60\n");

        assert!(result.is_err());
    }

    #[test]
    fn unknown_platform_field_is_rejected() {
        let result = TomlConfig::parse("[platforms.onebot]\nendpoint = \"http://x\"\n");

        assert!(result.is_err());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let result = TomlConfig::parse("[dispatch]\nsend_timeout = \"ten\"\n");

        assert!(result.is_err());
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let result = TomlConfig::load(std::path::Path::new("/nonexistent/gh-relay.toml"));

        assert!(matches!(
            result,
            Err(super::super::ConfigError::FileRead { .. })
        ));
    }
}

mod template {
    use super::*;

    #[test]
    fn default_template_parses() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();

        // Everything is commented out
        assert!(config.server.secret.is_none());
        assert!(config.platforms.is_empty());
    }

    #[test]
    fn default_template_documents_sections() {
        let template = default_config_template();

        for section in ["[server]", "[store]", "[dispatch]", "[platforms.onebot]"] {
            assert!(template.contains(section), "missing {section}");
        }
    }
}
