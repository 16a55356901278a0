use num_traits::{Float, FromPrimitive, Signed};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::ops::AddAssign;

// A Float trait that captures the requirements we need for the various places
// we need floats. These requirements are imposed by ndarray-stats and the report sink.
pub trait ForelFloat:
    Float
    + Debug
    + Display
    + Default
    + AddAssign
    + Serialize
    + for<'de> Deserialize<'de>
    + Signed
    + Copy
    + Sync
    + Send
    + FromPrimitive
    + 'static
{
}

impl ForelFloat for f32 {}
impl ForelFloat for f64 {}
