use num_traits::Float;

use crate::{Deque, Kbn};

/// Window size used by [`ResistanceEstimator::default`]
pub const DEFAULT_CAPACITY: usize = 250;

/// R² threshold used by [`ResistanceEstimator::default`]
pub const DEFAULT_R_SQUARED_THRESHOLD: f64 = 0.75;

/// Estimates the resistance of a channel from a stream of (current, voltage) samples.
///
/// `ResistanceEstimator<T>` keeps the most recent `capacity` samples and running sums
/// over them, and fits a least-squares line of voltage against current on every update.
/// The resistance is the negated slope of that line, reported only when the fit's R²
/// is strictly greater than the configured threshold.
///
/// To estimate the resistance of a single channel, feed the channel current together
/// with the voltage drop across it (for example battery voltage minus the voltage at
/// the load).
///
/// Variances are normalized by `n` while the covariance is normalized by `n - 1`, so
/// both the slope and R² carry a factor of `n / (n - 1)` relative to the textbook
/// estimates. The factor vanishes as the window grows.
#[derive(Debug, Clone)]
pub struct ResistanceEstimator<T> {
    /// Maximum number of samples in the regression window
    capacity: usize,
    /// Minimum R² (exclusive) required to report a resistance
    r_squared_threshold: T,
    /// Current samples, newest at the front
    current: Deque<T>,
    /// Voltage samples, newest at the front
    voltage: Deque<T>,
    /// Sum of currents
    sum_current: Kbn<T>,
    /// Sum of voltages
    sum_voltage: Kbn<T>,
    /// Sum of squared currents
    sum_current_sq: Kbn<T>,
    /// Sum of squared voltages
    sum_voltage_sq: Kbn<T>,
    /// Sum of current * voltage products
    sum_prod: Kbn<T>,
    /// Number of samples currently in the window
    count: usize,
}

impl<T> ResistanceEstimator<T>
where
    T: Float + Default,
{
    /// Creates a new `ResistanceEstimator` with the specified window size and R² threshold.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of samples to take the regression over
    /// * `r_squared_threshold` - The R² a fit must exceed for its slope to be reported
    ///
    /// # Returns
    ///
    /// * `Self` - The `ResistanceEstimator` instance
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, r_squared_threshold: T) -> Self {
        assert!(capacity > 0, "capacity can not be zero");

        Self {
            capacity,
            r_squared_threshold,
            current: Deque::new(capacity),
            voltage: Deque::new(capacity),
            sum_current: Kbn::default(),
            sum_voltage: Kbn::default(),
            sum_current_sq: Kbn::default(),
            sum_voltage_sq: Kbn::default(),
            sum_prod: Kbn::default(),
            count: 0,
        }
    }

    /// Creates an empty estimator with the same window size and R² threshold
    ///
    /// # Examples
    ///
    /// ```
    /// use resistance_estimator::ResistanceEstimator;
    ///
    /// let mut channel = ResistanceEstimator::<f64>::new(3, 0.5);
    /// channel.tick(1.0, 10.0);
    /// channel.tick(2.0, 8.0);
    ///
    /// let mut other = channel.clone_config();
    /// assert_eq!(other.capacity(), 3);
    /// assert_eq!(other.count(), 0);
    /// assert!(other.tick(1.0, 10.0).is_nan());
    /// ```
    pub fn clone_config(&self) -> Self {
        Self::new(self.capacity, self.r_squared_threshold)
    }

    /// Returns the window size
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the R² threshold
    #[inline]
    pub const fn r_squared_threshold(&self) -> T {
        self.r_squared_threshold
    }

    /// Returns the number of samples currently in the window
    #[inline]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Returns true once the window holds at least two samples
    ///
    /// Before that no regression can be computed and every estimate is `None`.
    #[inline]
    pub const fn is_ready(&self) -> bool {
        self.count >= 2
    }

    /// Returns true if the window holds `capacity` samples
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    /// Updates the window with a new (current, voltage) sample
    ///
    /// Once the window is full the oldest sample is evicted and its contribution
    /// subtracted from the running sums before the new sample is added.
    ///
    /// # Arguments
    ///
    /// * `sample` - The (current, voltage) pair, in chronological order
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The estimator for method chaining
    pub fn next(&mut self, (current, voltage): (T, T)) -> &mut Self {
        let evicted = self
            .current
            .push_front(current)
            .zip(self.voltage.push_front(voltage));

        match evicted {
            Some((c, v)) => {
                self.sum_current -= c;
                self.sum_voltage -= v;
                self.sum_current_sq -= c * c;
                self.sum_voltage_sq -= v * v;
                self.sum_prod -= c * v;
            }
            None => self.count += 1,
        }

        self.sum_current += current;
        self.sum_voltage += voltage;
        self.sum_current_sq += current * current;
        self.sum_voltage_sq += voltage * voltage;
        self.sum_prod += current * voltage;

        self
    }

    /// Updates the window and returns the resistance estimate in ohms
    ///
    /// Returns NaN while fewer than two samples have been seen, or when the fit's R²
    /// does not exceed the threshold. Use [`next`](Self::next) followed by
    /// [`resistance`](Self::resistance) to get an `Option` instead.
    ///
    /// # Arguments
    ///
    /// * `total_current` - The latest current sample
    /// * `voltage` - The latest voltage sample
    ///
    /// # Returns
    ///
    /// * `T` - The resistance, or NaN when there is no significant estimate
    ///
    /// # Examples
    ///
    /// ```
    /// use resistance_estimator::ResistanceEstimator;
    /// use assert_approx_eq::assert_approx_eq;
    ///
    /// let mut estimator = ResistanceEstimator::<f64>::new(3, 0.5);
    /// assert!(estimator.tick(1.0, 10.0).is_nan());
    /// assert_approx_eq!(estimator.tick(2.0, 8.0), 4.0);
    /// assert_approx_eq!(estimator.tick(3.0, 6.0), 3.0);
    /// ```
    pub fn tick(&mut self, total_current: T, voltage: T) -> T {
        self.next((total_current, voltage))
            .resistance()
            .unwrap_or_else(T::nan)
    }

    fn n(&self) -> Option<T> {
        if self.is_ready() {
            T::from(self.count)
        } else {
            None
        }
    }

    /// Returns the population variance of the current samples in the window
    pub fn current_variance(&self) -> Option<T> {
        let n = self.n()?;
        let mean = self.sum_current.total() / n;
        Some(self.sum_current_sq.total() / n - mean * mean)
    }

    /// Returns the population variance of the voltage samples in the window
    pub fn voltage_variance(&self) -> Option<T> {
        let n = self.n()?;
        let mean = self.sum_voltage.total() / n;
        Some(self.sum_voltage_sq.total() / n - mean * mean)
    }

    /// Returns the sample covariance of current and voltage in the window
    pub fn covariance(&self) -> Option<T> {
        let n = self.n()?;
        let centered =
            self.sum_prod.total() - self.sum_current.total() * self.sum_voltage.total() / n;
        Some(centered / (n - T::one()))
    }

    /// Returns the R² of the regression over the window
    ///
    /// Not guarded against zero variances: a degenerate window yields NaN or infinity.
    pub fn r_squared(&self) -> Option<T> {
        let cov = self.covariance()?;
        let var_c = self.current_variance()?;
        let var_v = self.voltage_variance()?;
        Some(cov * cov / (var_c * var_v))
    }

    /// Returns the regression slope of voltage against current, regardless of R²
    pub fn slope(&self) -> Option<T> {
        Some(self.covariance()? / self.current_variance()?)
    }

    /// Returns the resistance estimate over the current window
    ///
    /// The resistance is the negated regression slope, reported only when R² is strictly
    /// greater than the threshold. A NaN R² never passes; an infinite one always does.
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The resistance, or `None` if there is not enough data or the fit is
    ///   not significant
    ///
    /// # Examples
    ///
    /// ```
    /// use resistance_estimator::ResistanceEstimator;
    ///
    /// let mut estimator = ResistanceEstimator::<f64>::new(4, 0.75);
    /// let inputs = [(1.0, 5.0), (2.0, 7.0), (3.0, 4.0), (4.0, 6.0)];
    /// let results: Vec<_> = inputs
    ///     .iter()
    ///     .map(|s| estimator.next(*s).resistance())
    ///     .collect();
    ///
    /// assert_eq!(results, [None, Some(-4.0), None, None]);
    /// ```
    pub fn resistance(&self) -> Option<T> {
        let r_squared = self.r_squared()?;
        if r_squared > self.r_squared_threshold {
            self.slope().map(|slope| -slope)
        } else {
            None
        }
    }

    /// Returns the running sum of currents in the window
    #[inline]
    pub fn sum_current(&self) -> T {
        self.sum_current.total()
    }

    /// Returns the running sum of voltages in the window
    #[inline]
    pub fn sum_voltage(&self) -> T {
        self.sum_voltage.total()
    }

    /// Returns the running sum of squared currents in the window
    #[inline]
    pub fn sum_current_sq(&self) -> T {
        self.sum_current_sq.total()
    }

    /// Returns the running sum of squared voltages in the window
    #[inline]
    pub fn sum_voltage_sq(&self) -> T {
        self.sum_voltage_sq.total()
    }

    /// Returns the running sum of current * voltage products in the window
    #[inline]
    pub fn sum_prod(&self) -> T {
        self.sum_prod.total()
    }

    /// Returns an iterator over the current samples, newest first
    pub fn currents(&self) -> impl Iterator<Item = T> + '_ {
        self.current.iter().copied()
    }

    /// Returns an iterator over the voltage samples, newest first
    pub fn voltages(&self) -> impl Iterator<Item = T> + '_ {
        self.voltage.iter().copied()
    }
}

impl<T> Default for ResistanceEstimator<T>
where
    T: Float + Default,
{
    /// Window of 250 samples with an R² threshold of 0.75
    fn default() -> Self {
        let threshold = T::from(DEFAULT_R_SQUARED_THRESHOLD).unwrap_or_else(T::nan);
        Self::new(DEFAULT_CAPACITY, threshold)
    }
}
