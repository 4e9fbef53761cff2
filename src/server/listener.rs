//! Listening socket setup and the worker accept loops
//!
//! The listener is built with socket2 so SO_REUSEADDR and the backlog are
//! set explicitly, then converted into a plain blocking `TcpListener`
//! shared by every worker. Shutdown rides on a signal handler that only
//! touches an atomic flag and the listener fd, which is enough to make
//! every blocked `accept` return.

use crate::config::ServerConfig;
use crate::http::{Error, Resolver, Result};
use crate::server::connection;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::os::unix::io::AsRawFd;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);
static LISTENER_FD: AtomicI32 = AtomicI32::new(-1);

/// The static file server: a bound listening socket plus its configuration
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
}

impl Server {
    /// Bind the listening socket
    ///
    /// Resolves `host:port`, sets SO_REUSEADDR and applies the configured
    /// backlog. The socket stays blocking; `run` shares it across workers.
    pub fn bind(config: ServerConfig) -> Result<Server> {
        config.validate()?;

        let addr = lookup(&config.address())?;
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(config.backlog)?;

        Ok(Server {
            listener: socket.into(),
            config,
        })
    }

    /// Address the socket actually bound to (port 0 resolves here)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Arrange for SIGINT and SIGTERM to stop the accept loops
    ///
    /// The handler stores a flag and calls `shutdown(2)` on the listening
    /// socket, both async-signal-safe; blocked accepts return with an
    /// error and the workers see the flag. Meant for the binary. Callers
    /// embedding the server can skip this and let the process decide.
    pub fn install_signal_handlers(&self) {
        LISTENER_FD.store(self.listener.as_raw_fd(), Ordering::SeqCst);
        let handler = handle_terminate as *const () as libc::sighandler_t;
        unsafe {
            libc::signal(libc::SIGINT, handler);
            libc::signal(libc::SIGTERM, handler);
        }
    }

    /// Run the accept loops until shutdown
    ///
    /// Spawns the configured number of workers, each blocking in `accept`
    /// on the shared socket, and joins them before returning. There is no
    /// dispatch in userspace; the kernel hands each connection to one of
    /// the blocked workers.
    pub fn run(self) -> Result<()> {
        let listener = Arc::new(self.listener);
        let config = Arc::new(self.config);
        let resolver = Arc::new(Resolver::new(&config.doc_root, &config.error_dir));

        let mut workers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let listener = Arc::clone(&listener);
            let config = Arc::clone(&config);
            let resolver = Arc::clone(&resolver);

            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker_loop(id, &listener, &config, &resolver))?;
            workers.push(handle);
        }
        info!("{} workers accepting connections", config.workers);

        for handle in workers {
            let _ = handle.join();
        }
        info!("server stopped");
        Ok(())
    }
}

/// Blocking accept loop run by each worker thread
fn worker_loop(id: usize, listener: &TcpListener, config: &ServerConfig, resolver: &Resolver) {
    debug!("worker {} started", id);
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!("worker {}: connection from {}", id, peer);
                connection::handle(stream, peer, config, resolver);
            }
            Err(err) => {
                if SHUTDOWN.load(Ordering::SeqCst) {
                    break;
                }
                // Transient failure; the loop keeps accepting.
                warn!("worker {}: accept failed: {}", id, err);
            }
        }
    }
    debug!("worker {} stopped", id);
}

extern "C" fn handle_terminate(_signal: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
    let fd = LISTENER_FD.load(Ordering::SeqCst);
    if fd >= 0 {
        // Wakes every worker blocked in accept.
        unsafe { libc::shutdown(fd, libc::SHUT_RDWR) };
    }
}

fn lookup(address: &str) -> Result<SocketAddr> {
    address
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| Error::Addr(address.to_string()))
}
