use crate::engine::{KeywordIndex, Snapshot};
use crate::error::{Result, TrieXError};
use crate::request::{Reply, Request};
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tokio::sync::{mpsc, oneshot};

/// Stack for the worker thread. Delete recurses once per keyword character.
const DISPATCHER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// The seam between the dispatcher loop and the data model it serialises.
pub trait RequestHandler: Send + 'static {
    fn handle(&mut self, request: &Request) -> Reply;

    /// A consistent copy of the current state.
    fn snapshot(&self) -> Snapshot;
}

impl RequestHandler for KeywordIndex {
    fn handle(&mut self, request: &Request) -> Reply {
        self.execute(request)
    }

    fn snapshot(&self) -> Snapshot {
        KeywordIndex::snapshot(self)
    }
}

enum Job {
    Execute {
        request: Request,
        reply: oneshot::Sender<Reply>,
    },
    Snapshot {
        reply: oneshot::Sender<Result<Snapshot>>,
    },
}

/// Producer side of the request queue. Cheap to clone, one per connection.
///
/// The queue closes once every handle has been dropped.
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl DispatcherHandle {
    /// Enqueues `request` and waits for its reply.
    pub async fn submit(&self, request: Request) -> Result<Reply> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job::Execute { request, reply })
            .map_err(|_| TrieXError::DispatcherClosed)?;
        rx.await.map_err(|_| TrieXError::DispatcherClosed)
    }

    /// Takes a snapshot in queue order, so it never lands between the two
    /// halves of an insert or delete.
    ///
    /// A fault while copying the state is reported as `TrieXError::Snapshot`;
    /// the dispatcher keeps running.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job::Snapshot { reply })
            .map_err(|_| TrieXError::DispatcherClosed)?;
        rx.await.map_err(|_| TrieXError::DispatcherClosed)?
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Single consumer of the request queue.
///
/// Jobs run one at a time in submission order; this is the only place the
/// handler is ever mutated.
pub struct Dispatcher<H> {
    rx: mpsc::UnboundedReceiver<Job>,
    handler: H,
    processed: u64,
}

impl<H: RequestHandler> Dispatcher<H> {
    pub fn new(handler: H) -> (Self, DispatcherHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            rx,
            handler,
            processed: 0,
        };
        (dispatcher, DispatcherHandle { tx })
    }

    /// Starts the loop on its own OS thread.
    pub fn spawn(handler: H) -> Result<(DispatcherHandle, DispatcherThread<H>)> {
        let (dispatcher, handle) = Self::new(handler);
        let inner = thread::Builder::new()
            .name("triex-dispatcher".to_string())
            .stack_size(DISPATCHER_STACK_SIZE)
            .spawn(move || dispatcher.run())?;
        Ok((handle, DispatcherThread { inner }))
    }

    /// Drains the queue until every handle is gone, then hands the model back.
    ///
    /// Blocks the calling thread; must not run inside an async context.
    pub fn run(mut self) -> H {
        tracing::info!("Dispatcher: accepting requests");
        while let Some(job) = self.rx.blocking_recv() {
            self.processed += 1;
            match job {
                Job::Execute { request, reply } => {
                    let outcome = self.execute(&request);
                    if reply.send(outcome).is_err() {
                        tracing::debug!("Dispatcher: requester for {} went away", request.operation());
                    }
                }
                Job::Snapshot { reply } => {
                    if reply.send(self.snapshot()).is_err() {
                        tracing::debug!("Dispatcher: snapshot requester went away");
                    }
                }
            }
        }
        tracing::info!("Dispatcher: queue closed after {} jobs", self.processed);
        self.handler
    }

    fn snapshot(&self) -> Result<Snapshot> {
        let handler = &self.handler;
        panic::catch_unwind(AssertUnwindSafe(|| handler.snapshot())).map_err(|payload| {
            let reason = panic_message(payload.as_ref());
            tracing::error!("Dispatcher: snapshot faulted: {}", reason);
            TrieXError::Snapshot(reason)
        })
    }

    fn execute(&mut self, request: &Request) -> Reply {
        let handler = &mut self.handler;
        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(request))) {
            Ok(reply) => reply,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::error!(
                    "Dispatcher: {} '{}' faulted: {}",
                    request.operation(),
                    request.argument().unwrap_or_default(),
                    reason
                );
                Reply::Failed(reason)
            }
        }
    }
}

/// Join handle for a spawned dispatcher.
pub struct DispatcherThread<H> {
    inner: thread::JoinHandle<H>,
}

impl<H> DispatcherThread<H> {
    /// Waits for the queue to drain and returns the handler.
    pub fn join(self) -> Result<H> {
        self.inner.join().map_err(|_| TrieXError::DispatcherClosed)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal fault".to_string()
    }
}
