//! Tests for the application bootstrap, covering settings validation and
//! server wiring.

use super::server::{ServerSettings, build_http_state, create_server};
use rstest::{fixture, rstest};

#[fixture]
fn settings() -> ServerSettings {
    ServerSettings {
        port: 0,
        env: Some("staging".to_owned()),
        max_body_bytes: Some(4096),
    }
}

#[rstest]
fn http_state_reflects_settings(settings: ServerSettings) {
    let state = build_http_state(&settings);
    assert_eq!(state.max_body_bytes, 4096);
    assert_eq!(state.environment, "staging");
}

#[rstest]
#[actix_rt::test]
async fn create_server_binds_an_ephemeral_port(settings: ServerSettings) {
    let _server = create_server(&settings).expect("server should build");
}

#[rstest]
#[actix_rt::test]
async fn create_server_rejects_unknown_environments(mut settings: ServerSettings) {
    settings.env = Some("qa".to_owned());
    let err = create_server(&settings).err().expect("unknown environment rejected");
    assert!(err.to_string().contains("qa"), "{err}");
}
