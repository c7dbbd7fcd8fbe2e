//! Interactive viewer: renders the cover scene one round per frame and shows
//! the converging image in an eframe window.

use std::ops::Range;
use std::sync::Arc;

use anyhow::Result;
use eframe::{egui, App, CreationContext, Frame};
use egui::{CentralPanel, Color32, ColorImage, Image, TextureHandle, TextureOptions, TopBottomPanel};
use lumen_tracer::scene::{random_scene, random_scene_camera};
use lumen_tracer::{changed_rows, BvhNode, DisplaySink, ProgressiveRenderer, RenderSettings};

/// Display sink that mirrors the tone-mapped buffer into an egui texture.
struct TextureSink {
    ctx: egui::Context,
    texture: Option<TextureHandle>,
}

impl TextureSink {
    fn new(ctx: egui::Context) -> Self {
        Self { ctx, texture: None }
    }
}

impl DisplaySink for TextureSink {
    fn setup(&mut self, width: u32, height: u32) {
        let blank = ColorImage::new([width as usize, height as usize], Color32::BLACK);
        self.texture = Some(self.ctx.load_texture("render", blank, TextureOptions::LINEAR));
    }

    fn draw(&mut self, buffer: &[u8], width: u32, height: u32, last_row: i64, row_count: usize) {
        let rows = changed_rows(last_row, row_count, height);
        let Some(texture) = self.texture.as_mut() else {
            return;
        };
        if rows.is_empty() {
            return;
        }

        let band = band_image(buffer, width, &rows);
        // Buffer rows run bottom-up, texture rows top-down
        let top = (height - rows.end) as usize;
        texture.set_partial([0, top], band, TextureOptions::LINEAR);
    }
}

/// Cut rows `rows` out of a bottom-up RGB buffer as a top-down image.
fn band_image(buffer: &[u8], width: u32, rows: &Range<u32>) -> ColorImage {
    let stride = width as usize * 3;
    let mut rgb = Vec::with_capacity(stride * rows.len());
    for y in rows.clone().rev() {
        let start = y as usize * stride;
        rgb.extend_from_slice(&buffer[start..start + stride]);
    }
    ColorImage::from_rgb([width as usize, rows.len()], &rgb)
}

/// Application state
struct LumenViewer {
    renderer: ProgressiveRenderer,
    sink: TextureSink,
    failed: bool,
}

impl LumenViewer {
    fn new(cc: &CreationContext<'_>) -> Result<Self> {
        let settings = RenderSettings::default();
        let mut rng = rand::thread_rng();
        let world = BvhNode::new(random_scene(&mut rng), &mut rng);
        let camera = random_scene_camera(&settings);

        let renderer = ProgressiveRenderer::new(Arc::new(world), camera, settings)?;
        let mut sink = TextureSink::new(cc.egui_ctx.clone());
        sink.setup(renderer.buffer().width(), renderer.buffer().height());

        Ok(Self {
            renderer,
            sink,
            failed: false,
        })
    }
}

impl App for LumenViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        if !self.failed {
            if let Err(err) = self.renderer.tick(&mut self.sink) {
                log::error!("Rendering stopped: {}", err);
                self.failed = true;
            }
        }

        TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(format!(
                "pass {} ({:.0}%), {} workers",
                self.renderer.passes_completed() + 1,
                100.0 * self.renderer.pass_progress(),
                self.renderer.worker_count()
            ));
        });

        CentralPanel::default().show(ctx, |ui| {
            if let Some(texture) = &self.sink.texture {
                ui.centered_and_justified(|ui| ui.add(Image::from_texture(texture).shrink_to_fit()));
            }
        });

        if !self.failed {
            ctx.request_repaint();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting Lumen viewer");

    let defaults = RenderSettings::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Lumen")
            .with_inner_size([defaults.width as f32, defaults.height as f32]),
        ..Default::default()
    };

    eframe::run_native(
        "Lumen",
        options,
        Box::new(|cc| Ok(Box::new(LumenViewer::new(cc)?))),
    )
    .map_err(|err| anyhow::anyhow!("viewer failed: {err}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_image_flips_rows() {
        // 1 pixel wide, 3 rows: row y has red = y
        let buffer = [0, 0, 0, 1, 0, 0, 2, 0, 0];
        let band = band_image(&buffer, 1, &(1..3));

        assert_eq!(band.size, [1, 2]);
        assert_eq!(band.pixels[0], Color32::from_rgb(2, 0, 0));
        assert_eq!(band.pixels[1], Color32::from_rgb(1, 0, 0));
    }
}
