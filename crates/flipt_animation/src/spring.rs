//! Spring physics
//!
//! A damped harmonic oscillator integrated with fourth-order Runge-Kutta.
//! Large frame deltas are split into fixed sub-steps so a dropped frame
//! never destabilizes the integration.

/// Largest integration step, in seconds
const MAX_SUBSTEP: f32 = 1.0 / 240.0;

/// Longest step integrated; anything longer settles at the target outright
const MAX_STEP: f32 = 10.0;

/// Spring parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Speed (units/s) under which the spring may come to rest
    pub rest_speed: f32,
    /// Distance from target under which the spring may come to rest
    pub rest_delta: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
            rest_speed: 0.01,
            rest_delta: 0.01,
        }
    }
}

impl SpringConfig {
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            ..Default::default()
        }
    }

    /// Quick, critically damped response
    pub fn stiff() -> Self {
        Self::new(400.0, 40.0, 1.0)
    }

    /// Fast with a hint of overshoot
    pub fn snappy() -> Self {
        Self::new(300.0, 25.0, 1.0)
    }

    /// Slow and smooth
    pub fn gentle() -> Self {
        Self::new(120.0, 18.0, 1.0)
    }

    /// Visible oscillation before settling
    pub fn wobbly() -> Self {
        Self::new(180.0, 8.0, 1.0)
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Override the rest thresholds
    pub fn with_rest(mut self, rest_speed: f32, rest_delta: f32) -> Self {
        self.rest_speed = rest_speed;
        self.rest_delta = rest_delta;
        self
    }

    /// Damping ratio; below 1.0 the spring overshoots
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// All parameters finite and physically meaningful
    pub fn is_valid(&self) -> bool {
        self.stiffness.is_finite()
            && self.stiffness > 0.0
            && self.mass.is_finite()
            && self.mass > 0.0
            && self.damping.is_finite()
            && self.damping >= 0.0
    }
}

/// A single animated spring
#[derive(Clone, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
    settled: bool,
}

impl Spring {
    /// Create a spring at rest on `initial`
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
            settled: true,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Change parameters without disturbing position or velocity
    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    /// Retarget the spring. Current velocity carries into the new motion.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        self.settled = self.at_rest();
    }

    /// Teleport to `value` and stop
    pub fn snap(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
        self.settled = true;
    }

    fn at_rest(&self) -> bool {
        self.velocity.abs() <= self.config.rest_speed
            && (self.target - self.value).abs() <= self.config.rest_delta
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let spring_force = -self.config.stiffness * (x - self.target);
        let damping_force = -self.config.damping * v;
        (spring_force + damping_force) / self.config.mass
    }

    fn rk4(&mut self, dt: f32) {
        let x = self.value;
        let v = self.velocity;

        let a1 = self.acceleration(x, v);
        let (x2, v2) = (x + v * dt * 0.5, v + a1 * dt * 0.5);
        let a2 = self.acceleration(x2, v2);
        let (x3, v3) = (x + v2 * dt * 0.5, v + a2 * dt * 0.5);
        let a3 = self.acceleration(x3, v3);
        let (x4, v4) = (x + v3 * dt, v + a3 * dt);
        let a4 = self.acceleration(x4, v4);

        self.value = x + dt / 6.0 * (v + 2.0 * v2 + 2.0 * v3 + v4);
        self.velocity = v + dt / 6.0 * (a1 + 2.0 * a2 + 2.0 * a3 + a4);
    }

    /// Advance by `dt` seconds. Returns true once the spring is at rest.
    pub fn step(&mut self, dt: f32) -> bool {
        if self.settled || dt.is_nan() || dt <= 0.0 {
            return self.settled;
        }

        if dt > MAX_STEP {
            tracing::debug!(dt, "step longer than the spring can run, settling");
            self.snap(self.target);
            return true;
        }

        let mut remaining = dt;
        while remaining > 0.0 {
            let h = remaining.min(MAX_SUBSTEP);
            self.rk4(h);
            remaining -= h;

            if !self.value.is_finite() || !self.velocity.is_finite() {
                tracing::warn!("spring diverged, snapping to target {}", self.target);
                self.snap(self.target);
                break;
            }
            if self.at_rest() {
                self.snap(self.target);
                break;
            }
        }
        self.settled
    }
}
