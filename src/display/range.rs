use crate::display::DisplayError;
/// Decibel window mapped onto output intensities and pixel rows.
///
/// `min_db < max_db` holds after every successful mutation; rejected
/// mutations leave the window untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeState {
    min_db: f32,
    max_db: f32,
}
impl Default for RangeState {
    fn default() -> Self {
        Self {
            min_db: -100.0,
            max_db: 0.0,
        }
    }
}
impl RangeState {
    pub fn new(min_db: f32, max_db: f32) -> Result<Self, DisplayError> {
        // NaN bounds fail the ordering test too.
        if !(min_db.is_finite() && max_db.is_finite() && min_db < max_db) {
            return Err(DisplayError::InvalidRange { min_db, max_db });
        }
        Ok(Self { min_db, max_db })
    }
    pub fn min_db(&self) -> f32 {
        self.min_db
    }
    pub fn max_db(&self) -> f32 {
        self.max_db
    }
    pub fn set(&mut self, min_db: f32, max_db: f32) -> Result<(), DisplayError> {
        *self = Self::new(min_db, max_db)?;
        Ok(())
    }
    /// Moves both bounds by `delta_db`, keeping the window width.
    pub fn shift(&mut self, delta_db: f32) -> Result<(), DisplayError> {
        self.set(self.min_db + delta_db, self.max_db + delta_db)
    }
    /// Multiplies the lower bound only; the upper bound never moves.
    pub fn scale_min(&mut self, factor: f32) -> Result<(), DisplayError> {
        self.set(self.min_db * factor, self.max_db)
    }
    /// Clamped linear map of `value` onto `out_min..=out_max`.
    ///
    /// Below the window yields `out_min` verbatim, above yields `out_max`.
    /// Inside, the value is scaled toward `out_max` without adding `out_min`.
    pub fn squeeze(&self, value: f32, out_min: i32, out_max: i32) -> i32 {
        if value <= self.min_db {
            out_min
        } else if value >= self.max_db {
            out_max
        } else {
            let t = (value as f64 - self.min_db as f64) / (self.max_db as f64 - self.min_db as f64);
            (t * out_max as f64).round() as i32
        }
    }
}
