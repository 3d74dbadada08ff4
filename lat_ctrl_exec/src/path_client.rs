//! # Path Client
//!
//! Subscribes to the planned paths published by the path planner.
//!
//! The socket is conflated, so if several paths arrive between two reads only the newest is
//! received.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    msg::{MsgParseError, PathMsg},
    net::{create_socket, zmq, SocketError, SocketOptions},
};

use crate::params::LatCtrlExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct PathClient {
    socket: zmq::Socket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum PathClientError {
    #[error("Socket error: {0}")]
    SocketError(#[from] SocketError),

    #[error("Could not subscribe to paths: {0}")]
    SubscribeError(zmq::Error),

    #[error("Could not recieve a message from the planner: {0}")]
    RecvError(zmq::Error),

    #[error("Recieved a message which is not valid UTF-8")]
    NonUtf8Message,

    #[error("Could not parse the path: {0}")]
    ParseError(MsgParseError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PathClient {
    /// Create a new instance of the path client.
    ///
    /// `recv_timeout_ms` bounds how long `recieve_path` blocks for.
    pub fn new(
        ctx: &zmq::Context,
        params: &LatCtrlExecParams,
        recv_timeout_ms: i32,
    ) -> Result<Self, PathClientError> {
        let socket_options = SocketOptions {
            conflate: true,
            linger: 0,
            recv_timeout: recv_timeout_ms,
            ..Default::default()
        };

        let socket = create_socket(ctx, zmq::SUB, &socket_options, &params.path_endpoint)?;
        socket
            .set_subscribe(b"")
            .map_err(PathClientError::SubscribeError)?;

        Ok(Self { socket })
    }

    /// Recieve the latest path.
    ///
    /// Returns `Ok(None)` if no path arrived before the timeout.
    pub fn recieve_path(&self) -> Result<Option<PathMsg>, PathClientError> {
        match self.socket.recv_string(0) {
            Ok(Ok(s)) => PathMsg::from_json(&s)
                .map(Some)
                .map_err(PathClientError::ParseError),
            Ok(Err(_)) => Err(PathClientError::NonUtf8Message),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => Err(PathClientError::RecvError(e)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_path_round_trip() {
        let ctx = zmq::Context::new();
        let params = LatCtrlExecParams {
            path_endpoint: String::from("inproc://lat_ctrl_test_paths"),
            vehicle_inputs_endpoint: String::from("inproc://lat_ctrl_test_unused"),
            lat_ctrl_params: String::from("lat_ctrl.toml"),
        };

        // Stand in for the planner
        let planner = create_socket(
            &ctx,
            zmq::PUB,
            &SocketOptions {
                bind: true,
                linger: 0,
                ..Default::default()
            },
            &params.path_endpoint,
        )
        .unwrap();

        let client = PathClient::new(&ctx, &params, 20).unwrap();

        // Nothing sent yet
        assert!(client.recieve_path().unwrap().is_none());

        let msg = PathMsg {
            stamp: chrono::Utc::now(),
            points_m: vec![[2.0, 1.0]],
        };

        let mut received = None;
        for _ in 0..50 {
            planner.send(&msg.to_json().unwrap(), 0).unwrap();
            if let Some(p) = client.recieve_path().unwrap() {
                received = Some(p);
                break;
            }
        }

        assert_eq!(received, Some(msg));
    }
}
