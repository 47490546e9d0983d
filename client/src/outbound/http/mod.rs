//! Reqwest-backed gateway adapters.

mod auth_gateway;
mod case_gateway;

pub use self::auth_gateway::HttpAuthGateway;
pub use self::case_gateway::HttpCaseGateway;

use url::Url;

/// Default request timeout applied to gateway clients.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

const USER_AGENT: &str = "caseline-client/0.1";

/// Normalise the configured API origin so relative endpoint paths join
/// underneath it instead of replacing the final path segment.
fn ensure_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}
