//! Batch renderer: renders the cover scene for a fixed number of passes and
//! writes `output.ppm`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use lumen_tracer::scene::{random_scene, random_scene_camera};
use lumen_tracer::{save_image, BvhNode, ProgressiveRenderer, RenderSettings, Round};

const OUTPUT_PATH: &str = "output.ppm";

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting Lumen batch render");

    let settings = RenderSettings::default();
    let mut rng = rand::thread_rng();

    let start = Instant::now();
    let world = BvhNode::new(random_scene(&mut rng), &mut rng);
    log::info!("Scene built in {:?}", start.elapsed());

    let camera = random_scene_camera(&settings);
    let (height, passes) = (settings.height, settings.passes);
    let mut renderer = ProgressiveRenderer::new(Arc::new(world), camera, settings)?;

    let bar = ProgressBar::new(1000);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {msg} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    renderer.render_passes(passes, |round, fraction| {
        bar.set_message(format!("pass {}/{}", round.pass + 1, passes));
        bar.set_position((fraction * 1000.0) as u64);
        log::debug!("{}/{}: {:.1}%", round.pass, passes, pass_percent(round, height));
        if let Some(line) = pass_summary(round, passes, fraction) {
            bar.suspend(|| log::info!("{}", line));
        }
    })?;
    bar.finish_and_clear();
    log::info!("Rendered {} passes in {:?}", passes, start.elapsed());

    let buffer = renderer.finish()?;
    save_image(&buffer, OUTPUT_PATH)?;

    Ok(())
}

/// Share of the current pass done once `round` has finished, in percent.
fn pass_percent(round: &Round, height: u32) -> f32 {
    let rows_left = (round.last_row + 1 - round.row_count as i64).max(0);
    100.0 * (height as i64 - rows_left) as f32 / height as f32
}

/// Console line for a round that finished a pass.
fn pass_summary(round: &Round, passes: u32, fraction: f32) -> Option<String> {
    round.completed_pass.then(|| {
        format!("{}/{}: 100% ({:.0}% overall)", round.pass + 1, passes, 100.0 * fraction)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(last_row: i64, pass: u32, completed_pass: bool) -> Round {
        Round {
            last_row,
            row_count: 4,
            pass,
            completed_pass,
        }
    }

    #[test]
    fn test_pass_percent() {
        assert_eq!(pass_percent(&round(9, 0, false), 10), 40.0);
        assert_eq!(pass_percent(&round(1, 0, true), 10), 100.0);
    }

    #[test]
    fn test_summary_only_on_completed_pass() {
        assert_eq!(pass_summary(&round(9, 0, false), 10, 0.04), None);
        assert_eq!(
            pass_summary(&round(1, 2, true), 10, 0.3).as_deref(),
            Some("3/10: 100% (30% overall)")
        );
    }
}
