pub mod core;
#[allow(unused_imports)]
pub use core::{Im, Lum8Im, MaskIm, RGBAIm};

pub mod roi;
#[allow(unused_imports)]
pub use roi::Roi;

// Optional extras
// -----------------------------------------------------------------------------

#[cfg(feature = "im-io")]
pub mod io;
