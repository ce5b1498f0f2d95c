use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

/// Register SIGINT and SIGTERM handlers right away, then forward the first
/// signal to `shutdown_tx` from a background task.
///
/// Handlers are in place when this returns, so a signal that arrives while
/// startup is still blocked is logged instead of killing the process.
#[cfg(unix)]
pub fn forward_shutdown(shutdown_tx: watch::Sender<bool>) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        let name = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        };
        notify(name, &shutdown_tx);
    }))
}

#[cfg(not(unix))]
pub fn forward_shutdown(shutdown_tx: watch::Sender<bool>) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => notify("SIGINT", &shutdown_tx),
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGINT");
                // keep the sender alive so the engine is not stopped by its drop
                std::future::pending::<()>().await;
            }
        }
    }))
}

fn notify(signal: &str, shutdown_tx: &watch::Sender<bool>) {
    warn!("{signal} received. Exiting!");
    let _ = shutdown_tx.send(true);
}

/// Drive `fut` to completion unless shutdown is requested first.
///
/// Returns `None` when `shutdown` flips to `true` or its sender is gone.
pub async fn unless_shutdown<F: Future>(
    fut: F,
    shutdown: &mut watch::Receiver<bool>,
) -> Option<F::Output> {
    tokio::pin!(fut);
    loop {
        tokio::select! {
            out = &mut fut => return Some(out),
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn finished_future_wins() {
        let (_tx, mut rx) = watch::channel(false);
        let out = unless_shutdown(async { 7 }, &mut rx).await;
        assert_eq!(out, Some(7));
    }

    #[tokio::test]
    async fn shutdown_interrupts_a_stuck_future() {
        let (tx, mut rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tx.send(true).unwrap();
        });

        let out = unless_shutdown(std::future::pending::<()>(), &mut rx).await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn shutdown_sent_before_the_wait_is_seen() {
        let (tx, mut rx) = watch::channel(false);
        tx.send(true).unwrap();

        let out = unless_shutdown(std::future::pending::<()>(), &mut rx).await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn false_update_keeps_waiting() {
        let (tx, mut rx) = watch::channel(false);
        tx.send(false).unwrap();

        let out = unless_shutdown(
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                "seeded"
            },
            &mut rx,
        )
        .await;
        assert_eq!(out, Some("seeded"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn sigterm_is_forwarded_as_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        let forwarder = forward_shutdown(tx).unwrap();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(*rx.borrow());
        forwarder.await.unwrap();
    }
}
