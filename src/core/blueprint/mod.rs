mod from_sdl;
mod index;

pub use index::*;
