//! # Vehicle Inputs Server
//!
//! Publishes the driver inputs produced by LatCtrl to the vehicle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    msg::{MsgParseError, VehicleInputs},
    net::{create_socket, zmq, SocketError, SocketOptions},
};

use crate::params::LatCtrlExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct InputsServer {
    socket: zmq::Socket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum InputsServerError {
    #[error("Socket error: {0}")]
    SocketError(#[from] SocketError),

    #[error("Could not serialize the inputs: {0}")]
    SerializationError(MsgParseError),

    #[error("Could not send the inputs: {0}")]
    SendError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputsServer {
    /// Create a new instance of the inputs server, bound to the vehicle inputs endpoint.
    pub fn new(ctx: &zmq::Context, params: &LatCtrlExecParams) -> Result<Self, InputsServerError> {
        let socket_options = SocketOptions {
            bind: true,
            linger: 0,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = create_socket(
            ctx,
            zmq::PUB,
            &socket_options,
            &params.vehicle_inputs_endpoint,
        )?;

        Ok(Self { socket })
    }

    /// Publish the given inputs.
    pub fn send(&self, inputs: &VehicleInputs) -> Result<(), InputsServerError> {
        let inputs_str = inputs
            .to_json()
            .map_err(InputsServerError::SerializationError)?;

        self.socket
            .send(&inputs_str, 0)
            .map_err(InputsServerError::SendError)
    }
}
