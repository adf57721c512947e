//! Barrido Models - Hammerstein branches and parallel Hammerstein group models
//!
//! - [`nonlinear`] - [`NonlinearFunction`] trait and the [`Power`] nonlinearity
//! - [`aliasing`] - [`AliasingCompensation`] strategies around the nonlinear block
//! - [`branch`] - [`HammersteinBranch`]: nonlinearity, then linear filter
//! - [`summation`] - Right-folded adder tree over branch outputs
//! - [`group`] - [`HammersteinGroupModel`]: branch-sum model with copy-with-override
//!
//! Evaluation is eager and synchronous: setting an input recomputes every branch,
//! then the summation tree.

pub mod aliasing;
pub mod branch;
pub mod group;
pub mod nonlinear;
pub mod summation;

pub use aliasing::{AliasingCompensation, FullUpsamplingAliasingCompensation, NoAliasingCompensation};
pub use branch::{DownsamplingPosition, HammersteinBranch};
pub use group::{DEFAULT_FILTER_LENGTH, HammersteinGroupModel, ModelOverrides};
pub use nonlinear::{NonlinearFunction, Power};
pub use summation::SumNode;
