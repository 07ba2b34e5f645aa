use std::future::Future;
use std::pin::Pin;
use tracing::{error, info};

type HookFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type HookFn = Box<dyn FnOnce() -> HookFuture + Send>;

struct Hook {
    name: String,
    start: Option<HookFn>,
    stop: Option<HookFn>,
}

fn boxed<F, Fut>(f: F) -> HookFn
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Box::new(move || Box::pin(f()))
}

/// Assembles a service out of named lifecycle hooks.
///
/// Start hooks run in registration order; once all have completed the app
/// waits for a shutdown signal, then runs stop hooks in reverse order.
/// If a start hook fails, the hooks that already started are stopped (in
/// reverse) before the error is returned.
pub struct App {
    name: String,
    hooks: Vec<Hook>,
}

impl App {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hooks: Vec::new(),
        }
    }

    /// Register a component with both a start and a stop hook.
    ///
    /// Start hooks should return promptly; long-lived work belongs in a
    /// spawned task the matching stop hook can halt.
    pub fn lifecycle<S, SFut, T, TFut>(mut self, name: &str, start: S, stop: T) -> Self
    where
        S: FnOnce() -> SFut + Send + 'static,
        SFut: Future<Output = anyhow::Result<()>> + Send + 'static,
        T: FnOnce() -> TFut + Send + 'static,
        TFut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.push(Hook {
            name: name.into(),
            start: Some(boxed(start)),
            stop: Some(boxed(stop)),
        });
        self
    }

    /// Register a start-only hook.
    pub fn on_start<F, Fut>(mut self, name: &str, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.push(Hook {
            name: name.into(),
            start: Some(boxed(f)),
            stop: None,
        });
        self
    }

    /// Register a stop-only hook.
    pub fn on_stop<F, Fut>(mut self, name: &str, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.push(Hook {
            name: name.into(),
            start: None,
            stop: Some(boxed(f)),
        });
        self
    }

    /// Start everything, wait for SIGTERM/ctrl-c, stop everything.
    pub async fn run(self) -> anyhow::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Like [`App::run`] but with a caller-supplied shutdown future.
    pub async fn run_until<S>(self, shutdown: S) -> anyhow::Result<()>
    where
        S: Future<Output = ()>,
    {
        info!(app = %self.name, "Starting");

        let mut hooks = self.hooks;
        let mut started = 0usize;
        let mut start_error = None;
        for hook in hooks.iter_mut() {
            if let Some(start) = hook.start.take() {
                info!(hook = %hook.name, "Running start hook");
                if let Err(e) = start().await {
                    error!(hook = %hook.name, error = %e, "Start hook failed");
                    start_error = Some(e.context(format!("start hook ({}) failed", hook.name)));
                    break;
                }
            }
            started += 1;
        }

        if start_error.is_none() {
            started = hooks.len();
            info!(app = %self.name, "Ready");
            shutdown.await;
            info!(app = %self.name, "Shutdown signal received, stopping");
        }

        let mut stop_error = None;
        for hook in hooks[..started].iter_mut().rev() {
            if let Some(stop) = hook.stop.take() {
                info!(hook = %hook.name, "Running stop hook");
                if let Err(e) = stop().await {
                    error!(hook = %hook.name, error = %e, "Stop hook failed");
                    if stop_error.is_none() {
                        stop_error =
                            Some(e.context(format!("stop hook ({}) failed", hook.name)));
                    }
                }
            }
        }

        info!(app = %self.name, "Stopped");
        match start_error.or(stop_error) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Resolves on SIGTERM (unix) or ctrl-c.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Could not install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
