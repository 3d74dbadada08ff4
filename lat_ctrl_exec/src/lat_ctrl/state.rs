//! Lateral control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::convert::Infallible;
use std::path::PathBuf;

// Internal
use super::*;
use crate::path_cache::{PathCache, PlannedPath};
use crate::steer_law::SteerLaw;
use crate::traj_store::TrajStore;
use comms_if::msg::VehicleInputs;
use util::{maths::clamp_flagged, module::State, time::duration_to_seconds};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lateral control module state
pub struct LatCtrl {
    params: Params,

    /// Executing mode, fixed at init
    mode: ControlMode,

    /// Recording to replay, only present in `Playback` mode
    traj_store: Option<TrajStore>,

    path_cache: PathCache,

    steer_law: SteerLaw,

    state: ControllerState,
}

/// Data required to initialise LatCtrl.
#[derive(Debug, Clone)]
pub struct InitData {
    pub params: Params,

    /// Directory that a relative `control_file` is found in
    pub control_file_root: PathBuf,

    /// Time that recordings are played back from
    pub start_time: DateTime<Utc>,
}

/// Input data to the module
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// Current time
    pub now: DateTime<Utc>,
}

/// The mutable controller state, carried between cycles.
#[derive(Debug, Clone, Copy)]
pub struct ControllerState {
    /// Current unsaturated demands
    pub demands: Demands,

    /// True once the controller is able to produce outputs. Never reset.
    pub ready: bool,

    /// Start of playback
    pub start_time: DateTime<Utc>,
}

/// Unsaturated driver demands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Demands {
    pub steering: f64,
    pub throttle: f64,
    pub braking: f64,
}

/// The status report containing various flags and monitoring quantities.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// True if the controller produced an output this cycle
    pub ready: bool,

    /// Age of the latest path, if one has been received
    pub path_age_s: Option<f64>,

    /// The first path point could not be used, steering was held
    pub degenerate_path: bool,

    /// The steering demand was slew limited
    pub steering_rate_limited: bool,

    /// A non-finite demand was computed, all demands were held
    pub non_finite_output: bool,

    /// At least one demand had to be saturated
    pub output_clamped: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LatCtrl {
    type InitData = InitData;
    type InitError = LatCtrlError;

    type InputData = InputData;
    type OutputData = Option<VehicleInputs>;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    /// Initialise the LatCtrl module.
    ///
    /// In `Playback` mode the recording is loaded here, and a malformed
    /// recording fails initialisation.
    fn init(init_data: Self::InitData) -> Result<Self, Self::InitError> {
        let InitData {
            params,
            control_file_root,
            start_time,
        } = init_data;

        params.validate()?;
        let mode = params.control_mode()?;

        let traj_store = match mode {
            ControlMode::Playback => {
                let path = control_file_root.join(&params.control_file);
                let store = TrajStore::load(&path)?;
                info!(
                    "Loaded {} recorded samples ({:.02} s) from {:?}",
                    store.num_samples(),
                    store.duration_s(),
                    path
                );
                Some(store)
            }
            ControlMode::LivePath => {
                if !params.control_file.is_empty() {
                    info!(
                        "Following paths, control_file {:?} will not be used",
                        params.control_file
                    );
                }
                None
            }
        };

        let steer_law = SteerLaw::new(params.steering_gain, params.max_steering_step);

        // Playback doesn't need to wait for anything
        let ready = mode == ControlMode::Playback;

        info!("LatCtrl initialised in {:?} mode", mode);

        Ok(Self {
            params,
            mode,
            traj_store,
            path_cache: PathCache::default(),
            steer_law,
            state: ControllerState {
                demands: Demands::default(),
                ready,
                start_time,
            },
        })
    }

    /// Process one control cycle.
    ///
    /// Outputs `None` until the controller is ready, and exactly one set of
    /// inputs on every cycle after that.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        Ok(self.on_tick(input_data.now))
    }
}

impl LatCtrl {
    /// Handle a newly received path.
    ///
    /// The path replaces any previous one. In `LivePath` mode the first path
    /// makes the controller ready.
    pub fn on_path_update(&mut self, path: PlannedPath, now: DateTime<Utc>) {
        trace!("New path with {} points", path.get_num_points());

        self.path_cache.update(path, now);

        if !self.state.ready {
            info!("First path received, LatCtrl ready");
            self.state.ready = true;
        }
    }

    /// Run one control cycle at time `now`.
    pub fn on_tick(&mut self, now: DateTime<Utc>) -> (Option<VehicleInputs>, StatusReport) {
        let mut report = StatusReport {
            ready: self.state.ready,
            path_age_s: self.path_cache.age_s(now),
            ..Default::default()
        };

        if !self.state.ready {
            return (None, report);
        }

        let demands = match self.mode {
            ControlMode::LivePath => self.calc_live_path(&mut report),
            ControlMode::Playback => self.calc_playback(now),
        };

        // Only accept demands which can be saturated into a valid output
        if demands.steering.is_finite() && demands.throttle.is_finite() && demands.braking.is_finite()
        {
            self.state.demands = demands;
        } else {
            warn!("Non-finite demands computed ({:?}), holding previous", demands);
            report.non_finite_output = true;
        }

        let (steering, str_clamped) = clamp_flagged(self.state.demands.steering, -1.0, 1.0);
        let (throttle, thr_clamped) = clamp_flagged(self.state.demands.throttle, 0.0, 1.0);
        let (braking, brk_clamped) = clamp_flagged(self.state.demands.braking, 0.0, 1.0);
        report.output_clamped = str_clamped || thr_clamped || brk_clamped;

        let inputs = VehicleInputs {
            stamp: now,
            steering,
            throttle,
            braking,
        };

        trace!(
            "LatCtrl output: str {:.03}, thr {:.03}, brk {:.03}",
            steering,
            throttle,
            braking
        );

        (Some(inputs), report)
    }

    /// The mode this controller was initialised in.
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// True once the controller outputs inputs each cycle.
    pub fn is_ready(&self) -> bool {
        self.state.ready
    }

    /// Current unsaturated demands.
    pub fn demands(&self) -> Demands {
        self.state.demands
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Demands from the steering law, holding the current steering if there's
    /// no usable path point.
    fn calc_live_path(&self, report: &mut StatusReport) -> Demands {
        let mut demands = self.state.demands;

        if let Some(point_m) = self.path_cache.front() {
            match self.steer_law.step(demands.steering, &point_m) {
                Ok(step) => {
                    demands.steering = step.steering;
                    report.steering_rate_limited = step.rate_limited;
                }
                Err(e) => {
                    debug!("{}, holding steering", e);
                    report.degenerate_path = true;
                }
            }
        }

        // Lateral control only, braking is left as is
        demands.throttle = self.params.throttle_gain * self.params.base_throttle;

        demands
    }

    /// Demands from the recording at the time elapsed since the start.
    fn calc_playback(&self, now: DateTime<Utc>) -> Demands {
        let elapsed_s = duration_to_seconds(now.signed_duration_since(self.state.start_time))
            .unwrap_or(std::f64::NAN);

        match self.traj_store.as_ref().and_then(|s| s.lookup(elapsed_s)) {
            Some(rec) => Demands {
                steering: rec.steering,
                throttle: rec.throttle,
                braking: rec.braking,
            },
            None => Demands {
                steering: std::f64::NAN,
                ..self.state.demands
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;
    use nalgebra::Vector2;

    const EPS: f64 = 1e-9;

    fn live_path(steering_gain: f64, throttle_gain: f64) -> LatCtrl {
        LatCtrl::init(InitData {
            params: Params {
                steering_gain,
                throttle_gain,
                ..Default::default()
            },
            control_file_root: PathBuf::new(),
            start_time: Utc::now(),
        })
        .unwrap()
    }

    fn playback(table: &str, name: &str, start_time: DateTime<Utc>) -> LatCtrl {
        let root = std::env::temp_dir();
        std::fs::write(root.join(name), table).unwrap();

        LatCtrl::init(InitData {
            params: Params {
                control_mode: String::from("File"),
                control_file: String::from(name),
                ..Default::default()
            },
            control_file_root: root,
            start_time,
        })
        .unwrap()
    }

    fn path(points: &[(f64, f64)]) -> PlannedPath {
        PlannedPath::new(points.iter().map(|&(x, y)| Vector2::new(x, y)).collect())
    }

    #[test]
    fn test_no_output_before_first_path() {
        let mut lc = live_path(1.0, 1.0);
        let now = Utc::now();

        assert_eq!(lc.mode(), ControlMode::LivePath);

        for i in 0..20 {
            let input = InputData {
                now: now + Duration::milliseconds(100 * i),
            };
            let (out, report) = lc.proc(&input).unwrap();
            assert!(out.is_none());
            assert!(!report.ready);
        }

        lc.on_path_update(path(&[(2.0, 1.0)]), now);
        assert!(lc.is_ready());

        let (out, report) = lc.on_tick(now);
        assert!(out.is_some());
        assert!(report.ready);
    }

    #[test]
    fn test_slew_limited_convergence() {
        let mut lc = live_path(1.0, 1.0);
        let now = Utc::now();

        lc.on_path_update(path(&[(2.0, 1.0), (4.0, 1.0)]), now);

        let (out, report) = lc.on_tick(now);
        let out = out.unwrap();
        assert_eq!(out.steering, 0.1);
        assert!(report.steering_rate_limited);

        let (out, _) = lc.on_tick(now);
        assert!((out.unwrap().steering - 0.2).abs() < EPS);

        for _ in 0..3 {
            lc.on_tick(now);
        }
        assert!((lc.demands().steering - 0.5).abs() < EPS);

        let (out, report) = lc.on_tick(now);
        assert_eq!(out.unwrap().steering, 0.5);
        assert!(!report.steering_rate_limited);
    }

    #[test]
    fn test_live_path_throttle_and_braking() {
        let mut lc = live_path(1.0, 1.0);
        let now = Utc::now();
        lc.on_path_update(path(&[(1.0, 0.0)]), now);

        let out = lc.on_tick(now).0.unwrap();
        assert!((out.throttle - 0.55).abs() < EPS);
        assert_eq!(out.braking, 0.0);
        assert_eq!(out.stamp, now);

        // Throttle is saturated
        let mut lc = live_path(1.0, 3.0);
        lc.on_path_update(path(&[(1.0, 0.0)]), now);
        let (out, report) = lc.on_tick(now);
        assert_eq!(out.unwrap().throttle, 1.0);
        assert!(report.output_clamped);
    }

    #[test]
    fn test_degenerate_point_holds_steering() {
        let mut lc = live_path(1.0, 1.0);
        let now = Utc::now();

        lc.on_path_update(path(&[(2.0, 1.0)]), now);
        lc.on_tick(now);
        let before = lc.on_tick(now).0.unwrap().steering;

        lc.on_path_update(path(&[(0.0, 1.0)]), now);
        let (out, report) = lc.on_tick(now);
        assert_eq!(out.unwrap().steering, before);
        assert!(report.degenerate_path);
        assert!(!report.non_finite_output);
    }

    #[test]
    fn test_empty_path_holds_steering() {
        let mut lc = live_path(1.0, 1.0);
        let now = Utc::now();

        lc.on_path_update(path(&[(1.0, 1.0)]), now);
        let first = lc.on_tick(now).0.unwrap().steering;

        lc.on_path_update(path(&[]), now);
        let (out, report) = lc.on_tick(now);
        assert_eq!(out.unwrap().steering, first);
        assert!(!report.degenerate_path);
    }

    #[test]
    fn test_outputs_always_in_range() {
        let mut lc = live_path(25.0, 1.0);
        let now = Utc::now();

        let points = [(0.1, 5.0), (0.1, -5.0), (1.0, 100.0), (-1.0, 3.0), (0.0, 1.0)];
        for &p in points.iter().cycle().take(200) {
            lc.on_path_update(path(&[p]), now);
            let out = lc.on_tick(now).0.unwrap();
            assert!(out.steering >= -1.0 && out.steering <= 1.0);
            assert!(out.throttle >= 0.0 && out.throttle <= 1.0);
            assert!(out.braking >= 0.0 && out.braking <= 1.0);
        }

        // Internal demand exceeds the limits but the output doesn't
        lc.on_path_update(path(&[(1.0, 100.0)]), now);
        for _ in 0..30 {
            lc.on_tick(now);
        }
        assert!(lc.demands().steering > 1.0);
        let (out, report) = lc.on_tick(now);
        assert_eq!(out.unwrap().steering, 1.0);
        assert!(report.output_clamped);
    }

    #[test]
    fn test_playback() {
        let start = Utc::now();
        let mut lc = playback(
            "0,0,0,0\n10,1,0,0.5\n",
            "lat_ctrl_state_test_playback.csv",
            start,
        );

        assert_eq!(lc.mode(), ControlMode::Playback);
        assert!(lc.is_ready());

        let out = lc.on_tick(start + Duration::seconds(5)).0.unwrap();
        assert_eq!(out.throttle, 0.5);
        assert_eq!(out.braking, 0.0);
        assert_eq!(out.steering, 0.25);

        // No slew limiting during playback
        let out = lc.on_tick(start).0.unwrap();
        assert_eq!(out.steering, 0.0);
        let out = lc.on_tick(start + Duration::seconds(60)).0.unwrap();
        assert_eq!(out.steering, 0.5);
        assert_eq!(out.throttle, 1.0);

        // Paths are ignored for control in playback
        lc.on_path_update(path(&[(1.0, -1.0)]), start);
        let out = lc.on_tick(start + Duration::seconds(60)).0.unwrap();
        assert_eq!(out.steering, 0.5);

        // Before the start the first sample is held
        let out = lc.on_tick(start - Duration::seconds(3)).0.unwrap();
        assert_eq!(out.throttle, 0.0);
    }

    #[test]
    fn test_playback_saturates() {
        let start = Utc::now();
        let mut lc = playback(
            "0,2,-1,-3\n",
            "lat_ctrl_state_test_playback_saturates.csv",
            start,
        );

        let (out, report) = lc.on_tick(start);
        let out = out.unwrap();
        assert_eq!(out.steering, -1.0);
        assert_eq!(out.throttle, 1.0);
        assert_eq!(out.braking, 0.0);
        assert!(report.output_clamped);
    }

    #[test]
    fn test_init_errors() {
        let root = std::env::temp_dir();
        std::fs::write(root.join("lat_ctrl_state_test_bad.csv"), "0,0,0\n").unwrap();

        let init = |control_mode: &str, control_file: &str| {
            LatCtrl::init(InitData {
                params: Params {
                    control_mode: String::from(control_mode),
                    control_file: String::from(control_file),
                    ..Default::default()
                },
                control_file_root: root.clone(),
                start_time: Utc::now(),
            })
        };

        assert!(matches!(
            init("File", "lat_ctrl_state_test_bad.csv"),
            Err(LatCtrlError::MalformedTrajectoryFile(_))
        ));
        assert!(matches!(
            init("File", "lat_ctrl_state_test_does_not_exist.csv"),
            Err(LatCtrlError::MalformedTrajectoryFile(_))
        ));
        assert!(matches!(
            init("Pure Pursuit", ""),
            Err(LatCtrlError::ConfigError(_))
        ));

        // An empty file name forces path following
        let lc = init("File", "").unwrap();
        assert_eq!(lc.mode(), ControlMode::LivePath);
        assert!(!lc.is_ready());

        // A file given in path following mode is not loaded
        let lc = init("PID", "lat_ctrl_state_test_bad.csv").unwrap();
        assert_eq!(lc.mode(), ControlMode::LivePath);
    }
}
