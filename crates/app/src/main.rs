//! Entry point for scenemath.
//! Composes a transform from flags, then factors and decomposes it.

use anyhow::{Context, Result};
use app::cli::DemoConfig;
use app::scene::SceneGraph;
use corelib::{MathError, Transform, Vector3};

fn report_factor(m: &Transform) {
    match m.factor() {
        Ok(f) => {
            log::info!("factor: s = {:?}, t = {:?}", f.s, f.t);
            log::info!("factor: r =\n{}", f.r);
            log::info!("factor: u =\n{}", f.u);
        }
        Err(MathError::SingularMatrix { determinant }) => {
            log::warn!("factor: singular matrix (det {determinant:e}), no decomposition");
        }
    }
}

fn run_scene(cfg: &DemoConfig, base: Transform) {
    let mut scene = SceneGraph::new();
    let root = scene.spawn(base, None);
    let child = scene.spawn(Transform::from_translation(Vector3::new(0.0, 2.0, 0.0)), Some(root));
    scene.spawn(Transform::from_uniform_scale(0.5), Some(child));

    let dt = 1.0 / 60.0;
    let spin = Vector3::new(0.0, 90.0, 0.0);
    for frame in 0..cfg.frames {
        scene.system_spin(dt, spin);
        for (id, world) in scene.iter_world() {
            log::info!(
                "frame {frame} node {id}: origin at {:?}",
                world.transform_point(Vector3::ZERO)
            );
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = DemoConfig::from_args(std::env::args().skip(1))?;
    log::info!(
        "Starting scenemath. translate={:?}, rotate={:?}, scale={:?} x {}, center={:?}",
        cfg.translate,
        cfg.rotate,
        cfg.scale,
        cfg.uniform,
        cfg.center
    );

    let mut m = Transform::identity();
    m.set_transform_euler_scaled(cfg.translate, cfg.rotate, cfg.scale, cfg.uniform);
    log::info!("matrix =\n{m}");
    log::info!("determinant = {}", m.determinant());
    log::info!("inverse =\n{}", m.inverse());

    report_factor(&m);

    let trs = m
        .get_transform(cfg.center)
        .context("decomposing the composed transform")?;
    let (axis, radians) = trs.rotation.axis_angle();
    log::info!(
        "trs: translation={:?}, scale={:?}, rotation {:.3} rad about {:?}",
        trs.translation,
        trs.scale,
        radians,
        axis
    );
    log::info!("euler readback (deg) = {:?}", m.euler_degrees());

    run_scene(&cfg, m);

    log::info!("Done.");
    Ok(())
}
