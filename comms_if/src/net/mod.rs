//! # Network Module
//!
//! This module provides a thin layer over ZMQ, the networking library chosen for the software.
//! Sockets are created from a [`SocketOptions`] struct so that every client and server is
//! configured in the same place.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use zmq::{Context, Socket, SocketType};

// Export zmq
pub use zmq;

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

macro_rules! set_sockopts {
    ($socket:expr, $(($opt:ident, $val:expr)),+) => {
        $(
            $socket.$opt($val)
                .map_err(|e| SocketError::SocketOptionError(stringify!($opt).into(), e))?;
        )+
    };
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Represents options which can be set on a socket.
///
/// Most options here correspond to those found in the
/// [`zmq_setsockopt`](http://api.zeromq.org/4-2:zmq-setsockopt) documentation.
#[derive(Debug, Clone)]
pub struct SocketOptions {
    /// Indicates if the socket should bind itself to the endpoint. Publishers should have this
    /// value set as `true`, subscribers should have it set as `false`.
    ///
    /// The default value is `false`.
    pub bind: bool,

    /// `ZMQ_CONFLATE`: Keep only the last message. Incoming messages replace any message which
    /// has not been read yet, so a reader never sees a stale queue.
    pub conflate: bool,

    /// `ZMQ_LINGER`: Set linger period for socket shutdown
    pub linger: i32,

    /// `ZMQ_RECONNECT_IVL`: Set reconnection interval
    pub reconnect_ivl: i32,

    /// `ZMQ_RCVTIMEO`: Maximum time before a recv operation returns with `EAGAIN`
    pub recv_timeout: i32,

    /// `ZMQ_SNDTIMEO`: Maximum time before a send operation returns with `EAGAIN`
    pub send_timeout: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum SocketError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Could not connect the socket to {0}: {1}")]
    CouldNotConnect(String, zmq::Error),

    #[error("Could not bind the socket to {0}: {1}")]
    CouldNotBind(String, zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(String, zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SocketOptions {
    /// Set these options on the given socket.
    ///
    /// Must be called before the socket is connected or bound, as `ZMQ_CONFLATE` has no effect
    /// afterwards.
    pub fn set(&self, socket: &Socket) -> Result<(), SocketError> {
        set_sockopts!(
            socket,
            (set_linger, self.linger),
            (set_reconnect_ivl, self.reconnect_ivl),
            (set_rcvtimeo, self.recv_timeout),
            (set_sndtimeo, self.send_timeout)
        );

        if self.conflate {
            set_sockopts!(socket, (set_conflate, true));
        }

        Ok(())
    }
}

impl Default for SocketOptions {
    fn default() -> Self {
        // Defaults for sockopts taken from http://api.zeromq.org/4-2:zmq-setsockopt
        Self {
            bind: false,
            conflate: false,
            linger: 30_000,
            reconnect_ivl: 100,
            recv_timeout: -1,
            send_timeout: -1,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create a new socket, set its options, and connect or bind it to the endpoint.
///
/// ## Arguments
/// - `ctx`: the zmq context which will be used to create the socket
/// - `socket_type`: the type of zmq socket to create
/// - `socket_options`: a [`SocketOptions`] struct specifying how to configure the socket
/// - `endpoint`: a zmq endpoint string, such as `"tcp://localhost:4000"`
pub fn create_socket(
    ctx: &Context,
    socket_type: SocketType,
    socket_options: &SocketOptions,
    endpoint: &str,
) -> Result<Socket, SocketError> {
    let socket = ctx
        .socket(socket_type)
        .map_err(SocketError::CreateSocketError)?;

    socket_options.set(&socket)?;

    if socket_options.bind {
        socket
            .bind(endpoint)
            .map_err(|e| SocketError::CouldNotBind(endpoint.into(), e))?;
    } else {
        socket
            .connect(endpoint)
            .map_err(|e| SocketError::CouldNotConnect(endpoint.into(), e))?;
    }

    Ok(socket)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pub_sub_inproc() {
        let ctx = Context::new();

        let publisher = create_socket(
            &ctx,
            zmq::PUB,
            &SocketOptions {
                bind: true,
                linger: 0,
                ..Default::default()
            },
            "inproc://comms_if_net_test",
        )
        .unwrap();

        let subscriber = create_socket(
            &ctx,
            zmq::SUB,
            &SocketOptions {
                linger: 0,
                recv_timeout: 1000,
                ..Default::default()
            },
            "inproc://comms_if_net_test",
        )
        .unwrap();
        subscriber.set_subscribe(b"").unwrap();

        // PUB/SUB drops messages sent before the subscription has propagated, so keep sending
        // until one arrives.
        let mut received = None;
        for _ in 0..50 {
            publisher.send("hello", 0).unwrap();
            if let Ok(Ok(s)) = subscriber.recv_string(zmq::DONTWAIT) {
                received = Some(s);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }

        assert_eq!(received.as_deref(), Some("hello"));
    }
}
