use std::error::Error;
use std::time::Duration;

use tokio::net::TcpListener;

use benchrun::net::{DEFAULT_PROBE_TIMEOUT, PortProbe};
use benchrun_test_utils::builders::ConfigBuilder;
use benchrun_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn bound_port_is_unavailable_until_released() -> TestResult {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let probe = PortProbe::default();

    assert!(!with_timeout(probe.is_available("127.0.0.1", port)).await);

    drop(listener);
    assert!(with_timeout(probe.is_available("127.0.0.1", port)).await);
    Ok(())
}

#[tokio::test]
async fn unresolvable_host_counts_as_available() {
    init_tracing();
    let probe = PortProbe::new(Duration::from_millis(200));

    assert!(with_timeout(probe.is_available("no-such-host.invalid", 8080)).await);
}

#[test]
fn timeout_comes_from_configuration() {
    let config = ConfigBuilder::new().set("runner.port-probe-timeout-ms", "1200").build();
    assert_eq!(PortProbe::from_config(&config).timeout(), Duration::from_millis(1200));

    for bad in ["0", "soon", "-5"] {
        let config = ConfigBuilder::new().set("runner.port-probe-timeout-ms", bad).build();
        assert_eq!(PortProbe::from_config(&config).timeout(), DEFAULT_PROBE_TIMEOUT, "value {bad:?}");
    }
}
