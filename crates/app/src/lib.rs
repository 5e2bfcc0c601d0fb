//! Demo pieces for the `scenemath` binary: flag parsing and a small scene
//! hierarchy built on the corelib transforms.

pub mod cli;
pub mod scene;
