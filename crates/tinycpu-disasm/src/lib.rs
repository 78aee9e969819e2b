pub mod analyze;
pub mod model;

pub use analyze::{find_jumps, JumpSite, Report};
pub use model::{load_raw_bin, read_u8, Image};
