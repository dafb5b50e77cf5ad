//! Launcher - prints startup output, creates and starts the server, and turns
//! any startup failure into exit code 1.

use crate::env::{DotenvStatus, Env};
use crate::output::Console;
use crate::port::Port;
use anyhow::Result;
use std::future::Future;
use std::process::ExitCode;
use tracing::{debug, info};

/// A created server, ready to listen.
pub trait ProxyService: Send + Sync {
    /// Serve on `port` until shutdown. The port is passed exactly as the
    /// launcher parsed it, including [`Port::NaN`].
    fn start_server(&self, port: Port) -> impl Future<Output = Result<()>> + Send;
}

/// Asynchronous constructor for a [`ProxyService`].
pub trait ServerFactory: Send + Sync {
    type Server: ProxyService;

    fn create(&self, env: &Env) -> impl Future<Output = Result<Self::Server>> + Send;
}

pub struct Launcher {
    env: Env,
    dotenv: DotenvStatus,
    port: String,
    out: Console,
    err: Console,
}

impl Launcher {
    /// `env` is the fully prepared environment (`.env` loaded, `VITE_`
    /// variables bridged); `port` is the raw `--port` value.
    pub fn new(env: Env, dotenv: DotenvStatus, port: impl Into<String>) -> Self {
        Self {
            env,
            dotenv,
            port: port.into(),
            out: Console::stdout(),
            err: Console::stderr(),
        }
    }

    /// Use `console` for both stdout and stderr output.
    pub fn with_console(mut self, console: Console) -> Self {
        self.out = console;
        self.err = console;
        self
    }

    /// Create the server and start it. The first error ends the launch.
    pub async fn launch<F: ServerFactory>(&self, factory: &F) -> Result<()> {
        let port = Port::parse(&self.port);
        let server = factory.create(&self.env).await?;
        info!(port = %port, "Starting server");
        server.start_server(port).await
    }

    /// Print the banner and diagnostics, build the factory, then
    /// [`launch`](Self::launch). A failure at either step is shown as an
    /// error panel on stderr.
    pub async fn run<F, B>(self, build_factory: B) -> ExitCode
    where
        F: ServerFactory,
        B: FnOnce() -> Result<F>,
    {
        println!("{}", self.out.banner(env!("CARGO_PKG_VERSION")));
        println!("{}", self.out.env_debug(&self.dotenv));

        let result = match build_factory() {
            Ok(factory) => self.launch(&factory).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => self.abort(&e),
        }
    }

    /// Show `error` in the error panel and return exit code 1.
    fn abort(&self, error: &anyhow::Error) -> ExitCode {
        debug!(error = ?error, "Startup failed");
        eprintln!("{}", self.err.error_panel(&error.to_string()));
        ExitCode::from(1)
    }
}
