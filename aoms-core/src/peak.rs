//! Expected spectral feature of one sensor
//!
//! A grating reflects within a calibrated window `(lower, upper)`. Each cycle
//! the channel offers measured peak wavelengths; a peak is accepted only when
//! it lies strictly inside the window. Anything else, including a value equal
//! to either bound, leaves the peak unassigned (wavelength 0).

/// Calibrated window and the wavelength assigned to it this cycle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Peak {
    lower_bound: f64,
    upper_bound: f64,
    wavelength: f64,
    reflectivity: f64,
}

impl Peak {
    /// Unassigned peak over the window `(lower_bound, upper_bound)`
    pub fn new(lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            lower_bound,
            upper_bound,
            wavelength: 0.0,
            reflectivity: 0.0,
        }
    }

    /// Lower window bound (nm)
    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    /// Upper window bound (nm)
    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Assigned wavelength, 0 when unassigned
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Reflectivity recorded with the peak
    pub fn reflectivity(&self) -> f64 {
        self.reflectivity
    }

    /// Record the reflectivity reported alongside the peak
    pub fn set_reflectivity(&mut self, reflectivity: f64) {
        self.reflectivity = reflectivity;
    }

    /// Whether `w` lies strictly inside the window
    pub fn contains(&self, w: f64) -> bool {
        w > self.lower_bound && w < self.upper_bound
    }

    /// Offer a measured wavelength
    ///
    /// Returns `true` and keeps `w` when it lies strictly inside the window.
    /// Otherwise the peak is reset to unassigned and `false` is returned.
    pub fn set_wavelength(&mut self, w: f64) -> bool {
        if self.contains(w) {
            self.wavelength = w;
            true
        } else {
            self.wavelength = 0.0;
            false
        }
    }

    /// Mark unassigned
    pub fn clear(&mut self) {
        self.wavelength = 0.0;
    }

    /// Whether a wavelength is assigned
    pub fn is_assigned(&self) -> bool {
        self.wavelength != 0.0
    }
}
