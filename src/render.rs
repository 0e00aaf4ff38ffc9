use crossbeam::{channel, thread};
use nalgebra::Point3;

use crate::{
    canvas::{Canvas, Color},
    error::{Error, Result},
    ray::Ray,
    scene::Scene,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub jobs: usize,

    /// The color of rays that escape the scene.
    pub background: Color,
}

pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        ConfigBuilder {
            config: Config {
                width: 100,
                height: 100,
                jobs: 1,
                background: Color::black(),
            },
        }
    }
}

impl ConfigBuilder {
    pub fn set_width(mut self, width: u32) -> Self {
        self.config.width = u32::max(width, 1);
        self
    }

    pub fn set_height(mut self, height: u32) -> Self {
        self.config.height = u32::max(height, 1);
        self
    }

    pub fn set_jobs(mut self, jobs: usize) -> Self {
        self.config.jobs = usize::max(jobs, 1);
        self
    }

    pub fn set_background(mut self, background: Color) -> Self {
        self.config.background = background;
        self
    }

    /// Finish the configuration, failing when the image would be too large to hold.
    pub fn build(self) -> Result<Config> {
        Canvas::pixels(self.config.width, self.config.height)?;
        Ok(self.config)
    }
}

/// A pinhole looking down +z through a square window.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Point3<f32>,

    /// Distance from the eye to the window.
    pub distance: f32,

    /// Side length of the window, in world units.
    pub window: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Point3::new(0., 0., -5.),
            distance: 10.,
            window: 7.,
        }
    }
}

impl Camera {
    /// The ray through the center of pixel `(col, row)`, with row 0 at the top.
    pub fn ray_for(&self, config: &Config, col: u32, row: u32) -> Result<Ray> {
        let pixel = self.window / config.width.max(config.height) as f32;
        let half_w = pixel * config.width as f32 / 2.;
        let half_h = pixel * config.height as f32 / 2.;

        let x = -half_w + pixel * (col as f32 + 0.5);
        let y = half_h - pixel * (row as f32 + 0.5);
        let target = Point3::new(
            self.eye.x + x,
            self.eye.y + y,
            self.eye.z + self.distance,
        );

        Ray::new(self.eye, target - self.eye)
    }
}

/// Trace every pixel of the image. Rows are handed out to `config.jobs` workers, which only read
/// from the scene.
pub fn render(scene: &Scene, camera: &Camera, config: &Config) -> Result<Canvas> {
    let mut canvas = Canvas::new(config.width, config.height)?;

    let (input, rows) = channel::unbounded::<u32>();
    let (results, finished) = channel::unbounded();

    for row in 0..config.height {
        let _ = input.send(row);
    }
    drop(input);

    thread::scope(|s| -> Result<()> {
        for _ in 0..config.jobs {
            let rows = rows.clone();
            let results = results.clone();
            s.spawn(move |_| {
                for row in rows {
                    let colors: Result<Vec<Color>> = (0..config.width)
                        .map(|col| -> Result<Color> {
                            let ray = camera.ray_for(config, col, row)?;
                            Ok(scene.color_at(&ray)?.unwrap_or(config.background))
                        })
                        .collect();
                    if results.send((row, colors)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(results);

        let mut done = 0;
        for (row, colors) in finished {
            canvas.row_mut(row as usize).copy_from_slice(&colors?);
            done += 1;
            if done % 64 == 0 {
                log::debug!("{}/{} rows", done, config.height);
            }
        }

        log::info!("rendered {}x{} with {} jobs", config.width, config.height, config.jobs);
        Ok(())
    })
    .map_err(|_| Error::WorkerPanicked)??;

    Ok(canvas)
}
