//! Static nonlinearities applied at the head of a Hammerstein branch.

use std::fmt;

use barrido_core::{Error, Result, Signal};

/// A memoryless nonlinearity.
///
/// Implementations are shared between a group model, its branches and any models
/// derived with `create_modified`, so they hold no mutable state.
pub trait NonlinearFunction: Send + Sync + fmt::Debug {
    /// Apply the nonlinearity to every sample of every channel.
    fn apply(&self, input: &Signal) -> Result<Signal>;

    /// Highest harmonic of the input frequency the nonlinearity can produce.
    ///
    /// Aliasing compensation uses this to pick an oversampling factor.
    fn maximum_harmonics(&self) -> usize;
}

/// `x ↦ x^degree`.
///
/// # Example
///
/// ```rust
/// use barrido_core::Signal;
/// use barrido_models::{NonlinearFunction, Power};
///
/// let cube = Power::new(3).unwrap();
/// let x = Signal::mono(vec![-2.0, 0.5], 48000.0, "x").unwrap();
/// assert_eq!(cube.apply(&x).unwrap().channel(0).unwrap(), &[-8.0, 0.125]);
/// assert_eq!(cube.maximum_harmonics(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Power {
    degree: u32,
}

impl Power {
    /// Create a power nonlinearity; `degree` must be at least 1.
    pub fn new(degree: u32) -> Result<Self> {
        if degree == 0 {
            return Err(Error::configuration("power degree must be at least 1"));
        }
        Ok(Self { degree })
    }

    /// Exponent.
    pub fn degree(&self) -> u32 {
        self.degree
    }
}

impl NonlinearFunction for Power {
    fn apply(&self, input: &Signal) -> Result<Signal> {
        let degree = i32::try_from(self.degree)
            .map_err(|_| Error::domain(format!("power degree {} is too large", self.degree)))?;
        Ok(input.map(|x| x.powi(degree)))
    }

    fn maximum_harmonics(&self) -> usize {
        self.degree as usize
    }
}
