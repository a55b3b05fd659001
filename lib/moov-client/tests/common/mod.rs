use rstest::fixture;
use tracing::info;

mod mock_server;
pub use self::mock_server::*;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[fixture]
pub async fn server() -> MockServer {
    init_tracing();
    match MockServer::start().await {
        Ok(server) => server,
        Err(error) => {
            panic!("fail to start mock server: {error:?}");
        }
    }
}
