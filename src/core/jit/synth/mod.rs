mod synth;

pub use synth::Synth;
