mod address;
mod alert;
mod doh;
mod observation;

pub use address::*;
pub use alert::*;
pub use doh::*;
pub use observation::*;
