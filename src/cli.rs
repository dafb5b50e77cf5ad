//! Command-line interface for mcp-proxy.

use crate::env::{Env, default_dotenv_path};
use crate::launcher::Launcher;
use crate::server::ProxyServerFactory;
use crate::sse::SseClientFactory;
use clap::Parser;
use std::ffi::OsString;
use std::process::ExitCode;
use tracing::info;

pub const DEFAULT_PORT: &str = "3000";

#[derive(Parser, Debug)]
#[command(name = "mcp-proxy")]
#[command(about = "Relay an upstream MCP SSE server over a local HTTP port")]
#[command(version)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,
}

/// Extract the raw `--port` value from `args` (program name first).
/// The value is not checked for being numeric.
pub fn parse_port<I, T>(args: I) -> Result<String, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map(|cli| cli.port)
}

impl Cli {
    pub async fn run(self) -> ExitCode {
        let (env, dotenv) = Env::from_process().with_dotenv(&default_dotenv_path());
        info!(
            path = %dotenv.path.display(),
            found = dotenv.found,
            loaded = dotenv.loaded,
            "Environment loaded"
        );

        Launcher::new(env.bridge_vite_variables(), dotenv, self.port)
            .run(|| Ok(ProxyServerFactory::new(SseClientFactory::new()?)))
            .await
    }
}
