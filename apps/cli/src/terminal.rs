//! Terminal implementation of the output surface.
//!
//! Text goes to stdout, notifications about refused actions to stderr.
//! Terminals cannot show pixels, so images are written as PNG files into the
//! configured output directory and the file path is printed with the caption.

use colored::Colorize;
use lumen_abstraction::ImageBuffer;
use lumen_core::{ERROR_TITLE, OutputSurface};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};

pub struct TerminalSurface {
    image_dir: PathBuf,
    saved: usize,
    current_image: Option<PathBuf>,
}

impl TerminalSurface {
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self { image_dir: image_dir.into(), saved: 0, current_image: None }
    }

    /// Path of the image currently on display, if any.
    pub fn current_image(&self) -> Option<&Path> {
        self.current_image.as_deref()
    }

    fn next_image_path(&mut self) -> PathBuf {
        self.saved += 1;
        let stamp = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs());
        self.image_dir.join(format!("lumen-{stamp}-{}.png", self.saved))
    }

    fn save(&mut self, image: &ImageBuffer) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.image_dir)?;
        let buffer = image::RgbaImage::from_raw(image.width, image.height, image.pixels.clone())
            .ok_or_else(|| anyhow::anyhow!("pixel buffer does not match {}x{}", image.width, image.height))?;
        let path = self.next_image_path();
        buffer.save(&path)?;
        Ok(path)
    }
}

impl OutputSurface for TerminalSurface {
    fn show_text(&mut self, text: &str) {
        if !text.is_empty() {
            println!("{text}");
        }
    }

    fn show_image(&mut self, image: &ImageBuffer, caption: &str) {
        println!("{caption}");
        match self.save(image) {
            Ok(path) => {
                info!(path = %path.display(), "Image saved");
                println!("{} {}", "Saved to".dimmed(), path.display());
                self.current_image = Some(path);
            }
            Err(e) => {
                error!(error = %e, "Failed to save image");
                eprintln!("{} {e}", "Error saving image:".red());
                self.current_image = None;
            }
        }
    }

    fn clear_image(&mut self) {
        self.current_image = None;
    }

    fn show_info(&mut self, info: &str) {
        println!("{}", "Selected Model Info:".bold());
        for line in info.lines() {
            println!("  {line}");
        }
    }

    fn notify(&mut self, title: &str, message: &str) {
        if title == ERROR_TITLE {
            eprintln!("{} {message}", format!("[{title}]").red().bold());
        } else {
            println!("{} {message}", format!("[{title}]").green().bold());
        }
    }
}
