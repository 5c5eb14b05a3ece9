//! Transport abstraction consumed by the message processor.
//!
//! The core never touches a socket. It only names the shape of the
//! interaction: opaque bytes out to an address, opaque bytes in from an
//! address. Binding a UDP/TCP socket to this interface is the caller's job.

use std::future::Future;
use std::net::SocketAddr;

use crate::error::Result;

/// A byte-oriented datagram transport.
///
/// Implementations own the socket and know how to reach `address`; the
/// core only calls `send` with already-encoded SNMPv3 messages.
pub trait Transport: Send + Sync {
    /// Send an encoded message to `address`.
    fn send(&self, address: SocketAddr, data: &[u8]) -> impl Future<Output = Result<()>> + Send;
}

/// Receives inbound datagrams and hands them to the core for processing.
///
/// A transport's receive loop calls `hear` once per datagram. The listener
/// typically forwards `data` straight into
/// [`MessageProcessor::process_incoming_message`](crate::v3::MessageProcessor::process_incoming_message).
pub trait Listener<T: Transport>: Send + Sync {
    /// Handle one inbound datagram from `address`, received on `transport`.
    fn hear(&self, transport: &T, address: SocketAddr, data: &[u8]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingTransport;

    impl Transport for CountingTransport {
        fn send(
            &self,
            _address: SocketAddr,
            _data: &[u8],
        ) -> impl Future<Output = Result<()>> + Send {
            async { Ok(()) }
        }
    }

    struct CountingListener {
        count: Arc<AtomicUsize>,
    }

    impl Listener<CountingTransport> for CountingListener {
        fn hear(&self, _transport: &CountingTransport, _address: SocketAddr, _data: &[u8]) {
            self.count.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[tokio::test]
    async fn send_and_hear_roundtrip() {
        let transport = CountingTransport;
        let count = Arc::new(AtomicUsize::new(0));
        let listener = CountingListener {
            count: count.clone(),
        };

        let addr: SocketAddr = "127.0.0.1:161".parse().unwrap();
        transport.send(addr, b"payload").await.unwrap();
        listener.hear(&transport, addr, b"payload");

        assert_eq!(count.load(Ordering::Relaxed), 1);
    }
}
