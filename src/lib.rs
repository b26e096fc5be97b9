#![allow(clippy::too_many_arguments)]

pub mod core;
