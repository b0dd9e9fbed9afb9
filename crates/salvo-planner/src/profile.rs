//! One-dimensional speed profiles along a planned path.

/// Ramp from `v0` to `v_cruise` at constant acceleration, then hold.
///
/// Ramps down as well as up, so a munition arriving faster than the cruise
/// speed decelerates onto it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    pub v0: f64,
    pub accel: f64,
    pub v_cruise: f64,
}

impl SpeedProfile {
    /// A non-positive `accel` yields a constant-speed profile at `v0`.
    pub fn new(v0: f64, accel: f64, v_cruise: f64) -> Self {
        let v0 = v0.max(0.0);
        if accel <= 0.0 {
            return Self {
                v0,
                accel: 0.0,
                v_cruise: v0,
            };
        }
        Self {
            v0,
            accel,
            v_cruise: v_cruise.max(0.0),
        }
    }

    fn sign(&self) -> f64 {
        if self.v_cruise >= self.v0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Seconds spent ramping.
    pub fn ramp_time(&self) -> f64 {
        if self.accel <= 0.0 {
            0.0
        } else {
            (self.v_cruise - self.v0).abs() / self.accel
        }
    }

    /// Distance covered while ramping (meters).
    pub fn ramp_distance(&self) -> f64 {
        0.5 * (self.v0 + self.v_cruise) * self.ramp_time()
    }

    /// Whether the profile is still speeding up at distance `d`.
    pub fn accelerating_at(&self, d: f64) -> bool {
        self.v_cruise > self.v0 && d < self.ramp_distance()
    }

    /// Distance travelled after `t` seconds.
    pub fn distance_at(&self, t: f64) -> f64 {
        let t = t.max(0.0);
        let ramp = self.ramp_time();
        if t < ramp {
            self.v0 * t + 0.5 * self.sign() * self.accel * t * t
        } else {
            self.ramp_distance() + self.v_cruise * (t - ramp)
        }
    }

    /// Speed at distance `d` along the path.
    pub fn speed_at_distance(&self, d: f64) -> f64 {
        let d = d.max(0.0);
        if d < self.ramp_distance() {
            (self.v0 * self.v0 + 2.0 * self.sign() * self.accel * d)
                .max(0.0)
                .sqrt()
        } else {
            self.v_cruise
        }
    }

    /// Seconds to cover distance `d`. Infinite if the profile never gets there.
    pub fn time_at_distance(&self, d: f64) -> f64 {
        let d = d.max(0.0);
        let ramp_d = self.ramp_distance();
        if d < ramp_d {
            (self.speed_at_distance(d) - self.v0).abs() / self.accel
        } else if self.v_cruise > 0.0 {
            self.ramp_time() + (d - ramp_d) / self.v_cruise
        } else if d <= ramp_d {
            self.ramp_time()
        } else {
            f64::INFINITY
        }
    }
}
