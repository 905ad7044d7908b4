use crate::connection::{handle_connection, ConnectionLimits};
use socket2::{Domain, Protocol, Socket, Type};
use std::future::Future;
use std::net::{SocketAddr, ToSocketAddrs};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{sleep, Duration};
use triex_core::{
    Dispatcher, DispatcherHandle, DispatcherThread, KeywordIndex, Result, ServerConfig, TrieXError,
};
use triex_persist::{Autosaver, SnapshotStore};

const LISTEN_BACKLOG: i32 = 1024;

/// The keyword index server: application context for one process.
///
/// Owns the listener, the dispatcher thread and the snapshot store from
/// startup until `run_until` returns.
pub struct TrieServer {
    config: ServerConfig,
    listener: TcpListener,
    store: SnapshotStore,
    dispatcher: DispatcherHandle,
    worker: DispatcherThread<KeywordIndex>,
}

impl TrieServer {
    /// Restores state from `config.data_dir` and binds the listener.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let store = SnapshotStore::new(&config.data_dir)?;
        Self::bind_with_store(config, store).await
    }

    pub async fn bind_with_store(config: ServerConfig, store: SnapshotStore) -> Result<Self> {
        // The model is seeded before anything can reach it.
        let index = match store.load()? {
            Some(snapshot) => KeywordIndex::restore(snapshot),
            None => {
                tracing::info!("TrieServer: no snapshot in {}, starting empty", store.dir().display());
                KeywordIndex::new()
            }
        };

        let listener = bind_listener(&config.bind_addr())?;
        let (dispatcher, worker) = Dispatcher::spawn(index)?;

        Ok(Self {
            config,
            listener,
            store,
            dispatcher,
            worker,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serves connections until `shutdown` resolves, then drains.
    ///
    /// Shutdown order: stop accepting, let every connection finish its
    /// in-flight request, stop the autosaver, close the queue, join the
    /// dispatcher and write a final snapshot. Returns the final model.
    pub async fn run_until<F>(self, shutdown: F) -> Result<KeywordIndex>
    where
        F: Future<Output = ()>,
    {
        let Self {
            config,
            listener,
            store,
            dispatcher,
            worker,
        } = self;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let autosaver = tokio::spawn(
            Autosaver::new(
                dispatcher.clone(),
                store.clone(),
                config.autosave_interval(),
                shutdown_rx.clone(),
            )
            .run(),
        );

        let limits = ConnectionLimits::from(&config);
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        tracing::info!("TrieServer: listening on {}", listener.local_addr()?);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            tracing::debug!("TrieServer: TCP_NODELAY failed for {}: {}", peer, e);
                        }
                        let dispatcher = dispatcher.clone();
                        let limits = limits.clone();
                        let shutdown_rx = shutdown_rx.clone();
                        connections.spawn(async move {
                            match handle_connection(stream, peer, dispatcher, limits, shutdown_rx).await {
                                Ok(served) => tracing::debug!("TrieServer: {} left after {} requests", peer, served),
                                Err(e) => tracing::warn!("TrieServer: dropped {}: {}", peer, e),
                            }
                        });
                    }
                    Err(e) => {
                        // Usually descriptor exhaustion; back off instead of spinning.
                        tracing::warn!("TrieServer: accept failed: {}", e);
                        sleep(Duration::from_millis(100)).await;
                    }
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("TrieServer: connection task failed: {}", e);
                    }
                }
            }
        }

        drop(listener);
        tracing::info!("TrieServer: shutting down, draining {} connections", connections.len());
        let _ = shutdown_tx.send(true);
        while let Some(joined) = connections.join_next().await {
            if let Err(e) = joined {
                tracing::error!("TrieServer: connection task failed: {}", e);
            }
        }

        if let Err(e) = autosaver.await {
            tracing::error!("TrieServer: autosaver task failed: {}", e);
        }

        // Last handle: the queue closes and the worker drains what is left.
        drop(dispatcher);
        let index = tokio::task::spawn_blocking(move || worker.join())
            .await
            .map_err(|_| TrieXError::DispatcherClosed)??;

        let snapshot = index.snapshot();
        let final_store = store.clone();
        tokio::task::spawn_blocking(move || final_store.save(&snapshot))
            .await
            .map_err(|e| TrieXError::Snapshot(format!("final snapshot panicked: {}", e)))??;
        tracing::info!(
            "TrieServer: final snapshot of {} keywords written to {}",
            index.len(),
            store.dir().display()
        );

        Ok(index)
    }
}

fn bind_listener(addr: &str) -> Result<TcpListener> {
    let addr = addr
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| TrieXError::Config(format!("cannot resolve listen address {}", addr)))?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    Ok(TcpListener::from_std(std::net::TcpListener::from(socket))?)
}
