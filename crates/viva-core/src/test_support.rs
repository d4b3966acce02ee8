//! Helpers shared by unit tests.

use std::net::TcpListener;

/// Base URL of a loopback port that nothing is listening on.
pub(crate) fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
