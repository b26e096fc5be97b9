mod reader;
mod server;
mod source;

pub use reader::*;
pub use server::*;
pub use source::*;
