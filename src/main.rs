use std::path::PathBuf;

use anyhow::Error;
use clap::{Parser, ValueEnum};
use nalgebra::Vector3;

use patternray::{
    canvas::Color,
    pattern::PatternId,
    render::{self, Camera, ConfigBuilder},
    scene::Scene,
    shape::Sphere,
    transform::Transform,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PatternChoice {
    Stripe,
    Gradient,
    Ring,
    Checker,
    Blended,
}

/// Render a patterned sphere, either as ascii or to a png.
#[derive(Parser, Debug)]
#[command(version)]
struct Options {
    #[arg(long, default_value_t = 80)]
    width: u32,

    #[arg(long, default_value_t = 40)]
    height: u32,

    /// Worker threads, defaulting to the number of cpus.
    #[arg(long)]
    jobs: Option<usize>,

    #[arg(long, value_enum, default_value_t = PatternChoice::Checker)]
    pattern: PatternChoice,

    /// Write a png here instead of printing ascii.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn build_pattern(scene: &mut Scene, choice: PatternChoice) -> Result<PatternId, Error> {
    let pats = &mut scene.patterns;
    let white = pats.solid(Color::white());
    let black = pats.solid(Color::black());

    let id = match choice {
        PatternChoice::Stripe => {
            let id = pats.stripe(white, black)?;
            pats.set_transform(
                id,
                Transform::new()
                    .uniform_scale(0.25)
                    .rotate(&Vector3::new(0., 0., std::f32::consts::FRAC_PI_4)),
            )?;
            id
        }

        PatternChoice::Gradient => {
            let red = pats.solid(Color::new(1., 0.2, 0.1));
            let id = pats.gradient(red, white)?;
            pats.set_transform(
                id,
                Transform::new()
                    .scale(&Vector3::new(2., 1., 1.))
                    .translate(&Vector3::new(-1., 0., 0.)),
            )?;
            id
        }

        PatternChoice::Ring => {
            let id = pats.ring(white, black)?;
            pats.set_transform(
                id,
                Transform::new()
                    .uniform_scale(0.2)
                    .rotate(&Vector3::new(-std::f32::consts::FRAC_PI_2, 0., 0.)),
            )?;
            id
        }

        PatternChoice::Checker => {
            let id = pats.checker(white, black)?;
            pats.set_transform(id, Transform::new().uniform_scale(0.3))?;
            id
        }

        PatternChoice::Blended => {
            let green = pats.solid(Color::new(0.1, 0.8, 0.2));
            let first = pats.stripe(white, green)?;
            pats.set_transform(first, Transform::new().uniform_scale(0.25))?;
            let second = pats.stripe(white, green)?;
            pats.set_transform(
                second,
                Transform::new()
                    .uniform_scale(0.25)
                    .rotate(&Vector3::new(0., 0., std::f32::consts::FRAC_PI_2)),
            )?;
            pats.blended(first, second)?
        }
    };

    Ok(id)
}

fn main() -> Result<(), Error> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let opts = Options::parse();

    let mut scene = Scene::new();
    let pattern = build_pattern(&mut scene, opts.pattern)?;
    let sphere = Sphere::with_transform(
        Transform::new()
            .scale(&Vector3::new(1.5, 1., 1.))
            .rotate(&Vector3::new(0., 0., std::f32::consts::FRAC_PI_6)),
    )?;
    scene.add_object(sphere, pattern)?;

    let config = ConfigBuilder::default()
        .set_width(opts.width)
        .set_height(opts.height)
        .set_jobs(opts.jobs.unwrap_or_else(num_cpus::get))
        .set_background(Color::new(0.1, 0.1, 0.1))
        .build()?;

    let canvas = render::render(&scene, &Camera::default(), &config)?;

    match opts.output {
        Some(path) => {
            image::save_buffer(
                &path,
                &canvas.data(),
                canvas.width(),
                canvas.height(),
                image::ColorType::Rgb8,
            )?;
            log::info!("wrote {}", path.display());
        }
        None => print!("{}", canvas.to_ascii()),
    }

    Ok(())
}
