use crate::Config;

#[test]
fn given_empty_toml_when_parsed_then_defaults_apply() {
    let config: Config = toml::from_str("").unwrap();

    assert!(!config.debug);
    assert!(!config.listener.enabled);
    assert_eq!(config.listener.port, 8765);
    assert_eq!(config.listener.path, "/minecraft/ws");
    assert!(config.servers.is_empty());
    config.validate().unwrap();
}

#[test]
fn given_full_toml_when_parsed_then_all_sections_load() {
    let toml_str = r#"
        debug = true

        [listener]
        enabled = true
        port = 9100
        path = "/mc/ws"
        password = "hunter2"

        [logging]
        level = "debug"

        [[servers]]
        server_name = "survival"
        rcon_enabled = true
        rcon_host = "127.0.0.1"
        rcon_port = 25575
        rcon_password = "secret"

        [[servers]]
        server_name = "creative"
        ws_enabled = true
        ws_url = "ws://10.0.0.2:8080/minecraft/ws"
        ws_password = "token"
        ws_max_attempts = 5
    "#;

    let config: Config = toml::from_str(toml_str).unwrap();

    assert!(config.debug);
    assert_eq!(config.listener.bind_addr(), "127.0.0.1:9100");
    assert_eq!(config.servers.len(), 2);
    assert!(config.servers[0].rcon_complete());
    assert!(!config.servers[0].ws_complete());
    assert!(config.servers[1].ws_complete());
    assert_eq!(config.servers[1].ws_max_attempts, 5);
    config.validate().unwrap();
}

#[test]
fn given_duplicate_server_names_when_validated_then_rejected() {
    let toml_str = r#"
        [[servers]]
        server_name = "survival"

        [[servers]]
        server_name = "survival"
    "#;

    let config: Config = toml::from_str(toml_str).unwrap();

    assert!(config.validate().is_err());
}

#[test]
fn given_enabled_listener_with_bad_path_when_validated_then_rejected() {
    let toml_str = r#"
        [listener]
        enabled = true
        path = "no-leading-slash"
    "#;

    let config: Config = toml::from_str(toml_str).unwrap();

    assert!(config.validate().is_err());
}

#[test]
fn given_disabled_listener_with_bad_path_when_validated_then_accepted() {
    let toml_str = r#"
        [listener]
        enabled = false
        path = "no-leading-slash"
    "#;

    let config: Config = toml::from_str(toml_str).unwrap();

    config.validate().unwrap();
}
