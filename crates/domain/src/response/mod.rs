//! Response types.

mod record;

pub use record::{ResponseBody, ResponseRecord};
