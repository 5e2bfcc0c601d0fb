//! `--key=value` flags for the demo binary.

use anyhow::{Context, Result, bail};
use corelib::Vector3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DemoConfig {
    pub translate: Vector3,
    /// Fixed-axis Euler angles in degrees.
    pub rotate: Vector3,
    pub scale: Vector3,
    /// Pivot for the TRS decomposition.
    pub center: Vector3,
    pub uniform: f32,
    /// Scene animation steps.
    pub frames: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            translate: Vector3::ZERO,
            rotate: Vector3::new(10.0, 10.0, 10.0),
            scale: Vector3::ONE,
            center: Vector3::ZERO,
            uniform: 1.0,
            frames: 4,
        }
    }
}

fn parse_vec3(flag: &str, v: &str) -> Result<Vector3> {
    let parts: Vec<&str> = v.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        bail!("{flag} expects x,y,z, got '{v}'");
    }
    let mut out = Vector3::ZERO;
    for (i, p) in parts.iter().enumerate() {
        out[i] = p
            .parse::<f32>()
            .with_context(|| format!("{flag}: component {i} ('{p}') is not a number"))?;
    }
    Ok(out)
}

impl DemoConfig {
    /// Parse from an argument list (program name already skipped).
    /// Unknown arguments are logged and ignored.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cfg = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            if let Some(v) = arg.strip_prefix("--translate=") {
                cfg.translate = parse_vec3("--translate", v)?;
            } else if let Some(v) = arg.strip_prefix("--rotate=") {
                cfg.rotate = parse_vec3("--rotate", v)?;
            } else if let Some(v) = arg.strip_prefix("--scale=") {
                cfg.scale = parse_vec3("--scale", v)?;
            } else if let Some(v) = arg.strip_prefix("--center=") {
                cfg.center = parse_vec3("--center", v)?;
            } else if let Some(v) = arg.strip_prefix("--uniform=") {
                cfg.uniform = v
                    .parse::<f32>()
                    .with_context(|| format!("--uniform: '{v}' is not a number"))?;
            } else if let Some(v) = arg.strip_prefix("--frames=") {
                cfg.frames = v
                    .parse::<u32>()
                    .with_context(|| format!("--frames: '{v}' is not a count"))?;
            } else {
                log::warn!("Unknown argument '{arg}', ignoring.");
            }
        }
        Ok(cfg)
    }
}
