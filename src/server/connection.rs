//! One-shot connection service
//!
//! Receive until the head terminator, resolve, answer, close. Transport
//! trouble never produces a response: the connection is logged and
//! abandoned, and both directions are shut down on every path out.

use crate::config::ServerConfig;
use crate::http::{Error, Resolver, Response, Result};
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use tracing::{debug, info, warn};

/// Serve a single connection, then close it
pub fn handle(mut stream: TcpStream, peer: SocketAddr, config: &ServerConfig, resolver: &Resolver) {
    if let Err(err) = serve(&mut stream, peer, config, resolver) {
        warn!("{}: dropped: {}", peer, err);
    }
    // One response per connection, then both directions go down.
    let _ = stream.shutdown(Shutdown::Both);
}

fn serve(
    stream: &mut TcpStream,
    peer: SocketAddr,
    config: &ServerConfig,
    resolver: &Resolver,
) -> Result<()> {
    let raw = receive(stream, config.chunk_size, config.max_request_len)?;

    if raw.is_empty() {
        debug!("{}: closed without sending anything", peer);
        return Ok(());
    }

    let resolution = resolver.resolve(&raw);
    let response = Response::build(&resolution)?;
    send(stream, &response.to_wire())?;

    info!(
        "{}: {} {} {}",
        peer,
        response.status().code(),
        resolution.method,
        resolution.path.display()
    );
    Ok(())
}

/// Accumulate a request head
///
/// Reads fixed-size chunks until the accumulated bytes contain the head
/// terminator, the peer closes, or the cap is passed. Past the cap the
/// request is abandoned: the caller gets an error and writes nothing.
fn receive(stream: &mut TcpStream, chunk_size: usize, max_len: usize) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(chunk_size);
    let mut chunk = vec![0u8; chunk_size];

    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Ok(data);
        }
        data.extend_from_slice(&chunk[..n]);

        if find_head_end(&data).is_some() {
            return Ok(data);
        }
        if data.len() > max_len {
            return Err(Error::RequestTooLarge {
                received: data.len(),
                limit: max_len,
            });
        }
    }
}

/// Write the whole wire buffer
fn send(stream: &mut TcpStream, wire: &[u8]) -> Result<()> {
    let mut written = 0;
    while written < wire.len() {
        let n = stream.write(&wire[written..])?;
        if n == 0 {
            return Err(Error::ConnectionClosed);
        }
        written += n;
    }
    Ok(())
}

/// Position of the blank line ending a request head
fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
