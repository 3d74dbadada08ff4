//! Lateral control executable entry point.
//!
//! # Architecture
//!
//! The executable runs two threads which share the controller behind a mutex:
//!
//!     - Path thread: waits for planned paths from the planner and hands each
//!       one to LatCtrl as it arrives.
//!     - Main loop, at the configured frequency:
//!         - LatCtrl processing
//!         - Publishing of the vehicle inputs
//!         - Archiving
//!
//! # Usage
//!
//! `lat_ctrl_exec [PARAM_FILE]`, where the optional `PARAM_FILE` is the name of
//! a lateral control parameter file in the params directory, overriding the one
//! named in `lat_ctrl_exec.toml`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, error, info, warn};
use std::env;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::net::zmq;
use lat_ctrl_lib::{
    inputs_server::InputsServer,
    lat_ctrl::{self, InitData, InputData, LatCtrl},
    params::LatCtrlExecParams,
    path_cache::PlannedPath,
    path_client::{PathClient, PathClientError},
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// How long the path thread waits for a path before checking in again.
const PATH_RECV_TIMEOUT_MS: i32 = 100;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("lat_ctrl_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Lateral Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: LatCtrlExecParams =
        util::params::load("lat_ctrl_exec.toml").wrap_err("Could not load exec params")?;

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let lat_ctrl_params_file = match args.len() {
        1 => exec_params.lat_ctrl_params.clone(),
        2 => args[1].clone(),
        n => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                n - 1
            ))
        }
    };

    let lat_ctrl_params: lat_ctrl::Params = util::params::load(&lat_ctrl_params_file)
        .wrap_err_with(|| format!("Could not load LatCtrl params from {}", lat_ctrl_params_file))?;

    info!("Parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let control_file_root =
        util::params::params_dir().wrap_err("Could not find the params directory")?;

    let lat_ctrl = LatCtrl::init(InitData {
        params: lat_ctrl_params,
        control_file_root,
        start_time: Utc::now(),
    })
    .wrap_err("Failed to initialise LatCtrl")?;
    info!("LatCtrl init complete");

    // Params are validated by init so the period is always finite and positive
    let cycle_period = Duration::from_secs_f64(lat_ctrl.params().cycle_period_s());
    info!("Cycle period: {:.03} s", cycle_period.as_secs_f64());

    let lat_ctrl = Arc::new(Mutex::new(lat_ctrl));

    let mut arch_output = Archiver::from_path(&session, "lat_ctrl/output.csv")
        .wrap_err("Failed to create the output archive")?;
    let mut arch_report = Archiver::from_path(&session, "lat_ctrl/status_report.csv")
        .wrap_err("Failed to create the status report archive")?;

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = zmq::Context::new();

    let path_client = PathClient::new(&zmq_ctx, &exec_params, PATH_RECV_TIMEOUT_MS)
        .wrap_err("Failed to initialise PathClient")?;
    info!("PathClient initialised");

    let inputs_server =
        InputsServer::new(&zmq_ctx, &exec_params).wrap_err("Failed to initialise InputsServer")?;
    info!("InputsServer initialised");

    info!("Network initialisation complete");

    // ---- PATH THREAD ----

    let path_lat_ctrl = lat_ctrl.clone();
    thread::spawn(move || path_thread(path_client, path_lat_ctrl));

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut num_consec_cycle_overruns: u64 = 0;

    loop {
        let cycle_start_instant = Instant::now();

        // ---- CONTROL ALGORITHM PROCESSING ----

        let (output, report) = {
            let mut lc = lat_ctrl
                .lock()
                .map_err(|_| eyre!("The LatCtrl mutex was poisoned"))?;

            lc.proc(&InputData { now: Utc::now() })
                .unwrap_or_else(|e| match e {})
        };

        // ---- OUTPUT ----

        if let Some(inputs) = output {
            if let Err(e) = inputs_server.send(&inputs) {
                warn!("Could not send vehicle inputs: {}", e);
            }

            if let Err(e) = arch_output.serialise(inputs) {
                warn!("Could not archive LatCtrl output: {}", e);
            }
        }

        if let Err(e) = arch_report.serialise(report) {
            warn!("Could not archive LatCtrl status report: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                num_consec_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive)",
                    (cycle_dur - cycle_period).as_secs_f64(),
                    num_consec_cycle_overruns
                );
            }
        }
    }
}

/// Recieve paths and pass them to LatCtrl until the client fails.
fn path_thread(client: PathClient, lat_ctrl: Arc<Mutex<LatCtrl>>) {
    loop {
        match client.recieve_path() {
            Ok(Some(msg)) => {
                let path = PlannedPath::from(&msg);
                match lat_ctrl.lock() {
                    Ok(mut lc) => lc.on_path_update(path, Utc::now()),
                    Err(_) => {
                        error!("The LatCtrl mutex was poisoned, stopping path thread");
                        break;
                    }
                }
            }
            Ok(None) => (),
            Err(e @ PathClientError::ParseError(_)) | Err(e @ PathClientError::NonUtf8Message) => {
                warn!("Discarding path: {}", e)
            }
            Err(e) => {
                error!("PathClient error, no more paths will be recieved: {}", e);
                break;
            }
        }
    }
}
