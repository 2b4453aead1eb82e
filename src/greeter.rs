//! # Greeter Module
//!
//! A TCP server that writes one greeting line to every client and closes the
//! connection.
//!
//! The accept loop runs in a `may` coroutine and hands each connection to its own
//! coroutine, so a slow client never holds up the next accept. Accept errors are
//! logged and the loop keeps going; only bind errors reach the caller.
//!
//! ```rust,no_run
//! use patternkit::greeter::{GreeterConfig, GreeterServer};
//!
//! # fn main() -> std::io::Result<()> {
//! let handle = GreeterServer::new(GreeterConfig::default()).start()?;
//! println!("greeting on {}", handle.local_addr());
//! handle.join().ok();
//! # Ok(())
//! # }
//! ```

use may::coroutine::{self, JoinHandle};
use may::net::{TcpListener, TcpStream};
use serde::Deserialize;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::recovery::recover;
use crate::runtime_config::RuntimeConfig;

/// Default listen address of the greeter
pub const DEFAULT_GREETER_ADDR: &str = "0.0.0.0:8081";

/// Default line sent to each client
pub const DEFAULT_GREETING: &str = "Hello! Welcome to the patternkit TCP server.\n";

/// Greeter settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GreeterConfig {
    /// Address to bind; port 0 picks an ephemeral port
    pub addr: String,
    /// Bytes written to every client before closing
    pub greeting: String,
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_GREETER_ADDR.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

/// Unstarted greeting server
pub struct GreeterServer {
    config: GreeterConfig,
    stack_size: usize,
}

/// Handle to a running greeter
pub struct GreeterHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl GreeterHandle {
    /// Address the listener is bound to
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Cancel the accept loop and wait for it to exit.
    ///
    /// Connections already handed to their own coroutine finish independently.
    pub fn stop(self) {
        // SAFETY: cancel() is unsafe in may because the target coroutine unwinds
        // at its next yield point. The accept loop holds only the listener and an
        // Arc of the greeting, both of which are released by the unwind.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
        info!(addr = %self.addr, "Greeter stopped");
    }

    /// Block until the accept loop exits.
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the accept loop panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl GreeterServer {
    #[must_use]
    pub fn new(config: GreeterConfig) -> Self {
        Self {
            config,
            stack_size: RuntimeConfig::from_env().stack_size,
        }
    }

    /// Bind the listener and start accepting connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the accept coroutine
    /// cannot be spawned.
    pub fn start(self) -> io::Result<GreeterHandle> {
        let listener = bind_exclusive(self.config.addr.as_str())?;
        let addr = listener.local_addr()?;
        let greeting: Arc<[u8]> = Arc::from(self.config.greeting.into_bytes());
        let stack_size = self.stack_size;

        info!(addr = %addr, "Greeting server is listening");

        // SAFETY: see `spawn_connection`; the accept loop owns the listener and
        // an Arc of the greeting, both Send + 'static.
        let handle = unsafe {
            coroutine::Builder::new()
                .name("greeter-accept".to_string())
                .stack_size(stack_size)
                .spawn(move || accept_loop(listener, greeting, stack_size))
        }?;

        Ok(GreeterHandle { addr, handle })
    }
}

/// Bind `addr` without `SO_REUSEPORT`.
///
/// `may::net::TcpListener::bind` enables port reuse, which lets a second server
/// share a port that is already taken. The std listener reports that as
/// `AddrInUse`; its socket is then handed to `may`.
fn bind_exclusive(addr: &str) -> io::Result<TcpListener> {
    let std_listener = std::net::TcpListener::bind(addr)?;
    // may panics if the socket cannot be registered with its event loop.
    recover("greeter bind", move || adopt_listener(std_listener))
        .map_err(|recovered| io::Error::other(recovered.message))
}

#[cfg(unix)]
fn adopt_listener(listener: std::net::TcpListener) -> TcpListener {
    use std::os::unix::io::{FromRawFd, IntoRawFd};
    // SAFETY: the fd comes from `into_raw_fd` on a listener we own, so it is an
    // open TCP listening socket with no other owner.
    unsafe { TcpListener::from_raw_fd(listener.into_raw_fd()) }
}

#[cfg(windows)]
fn adopt_listener(listener: std::net::TcpListener) -> TcpListener {
    use std::os::windows::io::{FromRawSocket, IntoRawSocket};
    // SAFETY: the socket comes from `into_raw_socket` on a listener we own, so
    // it is an open TCP listening socket with no other owner.
    unsafe { TcpListener::from_raw_socket(listener.into_raw_socket()) }
}

fn accept_loop(listener: TcpListener, greeting: Arc<[u8]>, stack_size: usize) {
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!(peer = %peer, "Connection accepted");
                if let Err(e) = spawn_connection(stream, peer, Arc::clone(&greeting), stack_size)
                {
                    error!(peer = %peer, error = %e, "Failed to spawn connection coroutine");
                }
            }
            Err(e) => {
                warn!(error = %e, "Connection error");
            }
        }
    }
}

fn spawn_connection(
    stream: TcpStream,
    peer: SocketAddr,
    greeting: Arc<[u8]>,
    stack_size: usize,
) -> io::Result<()> {
    // SAFETY: may::coroutine::Builder::spawn() is unsafe because coroutines must
    // not keep thread-local borrows across yields. The closure owns the stream
    // and an Arc of the greeting and touches no thread-locals.
    let handle = unsafe {
        coroutine::Builder::new()
            .stack_size(stack_size)
            .spawn(move || {
                if recover("greeter connection", || {
                    handle_connection(stream, peer, &greeting)
                })
                .is_err()
                {
                    warn!(peer = %peer, "Connection handler panicked");
                }
            })
    }?;
    drop(handle);
    Ok(())
}

fn handle_connection(mut stream: TcpStream, peer: SocketAddr, greeting: &[u8]) {
    match stream.write_all(greeting).and_then(|()| stream.flush()) {
        Ok(()) => info!(peer = %peer, "Sent greeting"),
        Err(e) => warn!(peer = %peer, error = %e, "Failed to send greeting"),
    }
    // The stream closes when it drops here.
}
