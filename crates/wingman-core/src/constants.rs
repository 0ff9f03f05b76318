//! Simulation constants and tuning defaults.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Behavior requests ---

/// Capacity of the per-agent weighted behavior request list.
pub const MAX_BEHAVIOR_REQUESTS: usize = 8;

/// Maximum state decisions evaluated for one agent in one tick. A transition
/// made by a decision function gets one re-evaluation in the new state; any
/// further transition leaves the agent idle for the tick.
pub const MAX_DECISIONS_PER_TICK: usize = 2;

/// Events kept for hosts that poll with `drain_events`. Older events are
/// dropped once the log is full; observers still see every event.
pub const MAX_PENDING_EVENTS: usize = 1024;

// --- Steering ---

/// Default cruise speed for steering outputs (m/s).
pub const DEFAULT_MAX_SPEED: f64 = 120.0;

/// Default speed an arrival should still have at the target (m/s).
pub const DEFAULT_MIN_ARRIVAL_SPEED: f64 = 0.0;

/// Default braking deceleration assumed by arrival behaviors (m/s²).
pub const DEFAULT_DECELERATION: f64 = 20.0;

/// Distance at which a position/location target counts as reached (m).
pub const DEFAULT_ARRIVAL_RADIUS: f64 = 25.0;

/// Distance at which a path waypoint counts as reached (m).
pub const DEFAULT_WAYPOINT_RADIUS: f64 = 40.0;

/// Half-angle of a hostile's forward threat cone (radians, ~20°).
pub const DEFAULT_THREAT_CONE_HALF_ANGLE: f64 = 0.35;

/// Obstacle avoidance look-ahead time (seconds of travel).
pub const DEFAULT_OBSTACLE_LOOKAHEAD_SECS: f64 = 2.0;

/// Minimum obstacle look-ahead distance (m).
pub const DEFAULT_OBSTACLE_MIN_LOOKAHEAD: f64 = 50.0;

/// Avoidance radius around each craft (m).
pub const DEFAULT_OBSTACLE_RADIUS: f64 = 15.0;

/// Interception time below which an agent inside the target's cone flees (s).
pub const DEFAULT_FLEE_TIME_THRESHOLD: f64 = 1.5;

/// Interception time above which attack pursues instead of seek-with-arrival (s).
pub const DEFAULT_PURSUE_TIME_THRESHOLD: f64 = 4.0;

/// Weight of obstacle avoidance requests.
pub const DEFAULT_AVOID_WEIGHT: f64 = 1.0;

/// Weight of the low-priority "leave the threat cone" request.
pub const DEFAULT_EVADE_CONE_WEIGHT: f64 = 0.25;

// --- Squadrons ---

/// Default interval between squadron retarget passes (seconds).
pub const DEFAULT_RETARGET_INTERVAL_SECS: f64 = 5.0;

/// Default interval between steering passes (seconds). Zero = every tick.
pub const DEFAULT_STEERING_INTERVAL_SECS: f64 = 0.0;

// --- Docking ---

/// Distance from a docking point at which docking completes (m).
pub const DOCKING_CAPTURE_DISTANCE: f64 = 5.0;

/// Distance along the approach axis where the approach waypoint sits (m).
pub const DOCKING_APPROACH_OFFSET: f64 = 100.0;

/// Distance from the point at which undocking completes (m).
pub const DOCKING_CLEARANCE_DISTANCE: f64 = 120.0;

/// Departure speed while undocking (m/s).
pub const DOCKING_DEPARTURE_SPEED: f64 = 30.0;

/// Approach speed used on the final leg into the point (m/s).
pub const DOCKING_FINAL_APPROACH_SPEED: f64 = 5.0;

// --- Craft (sim) ---

/// Default craft turn rate (rad/s).
pub const CRAFT_MAX_TURN_RATE: f64 = 1.5;

/// Default craft linear acceleration (m/s²).
pub const CRAFT_MAX_ACCELERATION: f64 = 40.0;

/// Default craft top speed (m/s).
pub const CRAFT_MAX_SPEED: f64 = 150.0;

/// Radius beyond which craft are considered lost and cleaned up (m).
pub const WORLD_RADIUS: f64 = 50_000.0;
