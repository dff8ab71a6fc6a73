// Shared context for live scenarios: configuration, client and the single login
use anyhow::Context;
use lazy_static::lazy_static;
use mattermost_api_suite::config::SuiteConfig;
use mattermost_api_suite::logging;
use mattermost_api_suite::services::session::RequestHeaders;
use mattermost_api_suite::state::SuiteContext;

lazy_static! {
    /// Built on first use. Missing configuration ends the process before any scenario runs.
    pub static ref CONTEXT: SuiteContext = build_context();
}

fn build_context() -> SuiteContext {
    let config = match SuiteConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Cannot start live tests: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&config.log);

    match SuiteContext::new(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("❌ Cannot build HTTP client: {e}");
            std::process::exit(1);
        }
    }
}

/// Auth headers for one scenario. A failed login fails every caller the same way.
pub async fn headers() -> anyhow::Result<RequestHeaders> {
    CONTEXT
        .headers()
        .await
        .context("Session authentication failed")
}

pub fn skip(scenario: &str, reason: &str) {
    eprintln!("⏭️  Skipping {scenario}: {reason}");
}
