//! Web server

use crate::app::Service;
use crate::cli::CommandLineArgs;

use std::{io, net::SocketAddr, path::PathBuf, time::Duration};

use axum::ServiceExt;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use expanduser::expanduser;
use tokio::signal;

/// Serve the query API until a shutdown signal is received.
///
/// Serves plain HTTP, or HTTPS using the certificate and key files named in `args`.
///
/// # Arguments
///
/// * `args`: Command line arguments
/// * `service`: The [Service] to serve
pub async fn serve(args: &CommandLineArgs, service: Service) -> io::Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let handle = Handle::new();
    tokio::spawn(shutdown_on_signal(
        handle.clone(),
        Duration::from_secs(args.graceful_shutdown_timeout),
    ));
    let make_service = service.into_make_service();
    if args.https {
        let config =
            RustlsConfig::from_pem_file(tls_file(&args.cert_file)?, tls_file(&args.key_file)?)
                .await?;
        tracing::info!(%addr, "Listening for HTTPS");
        axum_server::bind_rustls(addr, config)
            .handle(handle)
            .serve(make_service)
            .await
    } else {
        tracing::info!(%addr, "Listening for HTTP");
        axum_server::bind(addr)
            .handle(handle)
            .serve(make_service)
            .await
    }
}

/// Absolute path of a TLS file, with `~` expanded. Fails if the file does not exist.
fn tls_file(path: &str) -> io::Result<PathBuf> {
    expanduser(path)?.canonicalize()
}

/// Wait for Ctrl+C or SIGTERM, then start a graceful shutdown bounded by `timeout`.
async fn shutdown_on_signal(handle: Handle, timeout: Duration) {
    let interrupt = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(%err, "Unable to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                tracing::warn!(%err, "Unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }

    tracing::info!(?timeout, "Signal received, shutting down");
    handle.graceful_shutdown(Some(timeout));
}
