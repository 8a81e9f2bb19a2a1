//! Page rasterization, image preprocessing and optical recognition.
//!
//! Rasterization and recognition shell out to the Poppler and
//! Tesseract binaries; both are behind traits so the pipeline can be
//! exercised with fakes.

use std::process::Command;

use anyhow::{bail, Context, Result};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;
use verifatura_utils::{AnalysisError, AnalysisResult, OcrConfig};

/// Neighborhood size for adaptive thresholding.
const THRESHOLD_BLOCK_SIZE: u32 = 11;
/// Constant subtracted from the local mean before comparing.
const THRESHOLD_OFFSET: f32 = 2.0;

/// Renders PDF pages to images, in document order.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, pdf_bytes: &[u8]) -> Result<Vec<DynamicImage>>;
}

/// Recognizes text in a preprocessed page image.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, page: &GrayImage) -> Result<String>;
}

/// Prepares a rasterized page for recognition: grayscale conversion
/// followed by adaptive Gaussian thresholding, which binarizes text
/// against background while compensating for uneven scan lighting.
pub fn preprocess_page(page: &DynamicImage) -> GrayImage {
    let gray = page.to_luma8();
    // Sigma for the block size, following OpenCV's kernel derivation.
    let sigma = 0.3 * ((THRESHOLD_BLOCK_SIZE - 1) as f32 * 0.5 - 1.0) + 0.8;
    let local_mean = gaussian_blur_f32(&gray, sigma);
    let mut binary = GrayImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let threshold = local_mean.get_pixel(x, y)[0] as f32 - THRESHOLD_OFFSET;
        let value = if pixel[0] as f32 > threshold { 255 } else { 0 };
        binary.put_pixel(x, y, Luma([value]));
    }
    binary
}

/// Rasterizer backed by Poppler's `pdftoppm`.
pub struct PdftoppmRasterizer {
    cmd: String,
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            cmd: config.pdftoppm_cmd.clone(),
            dpi: config.dpi,
        }
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf_bytes: &[u8]) -> Result<Vec<DynamicImage>> {
        let work_dir = tempfile::tempdir().context("failed to create rasterization workspace")?;
        let pdf_path = work_dir.path().join("document.pdf");
        std::fs::write(&pdf_path, pdf_bytes).context("failed to stage PDF for rasterization")?;

        let prefix = work_dir.path().join("page");
        let output = Command::new(&self.cmd)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(&pdf_path)
            .arg(&prefix)
            .output()
            .with_context(|| format!("{} failed to start", self.cmd))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.cmd,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        // pdftoppm writes page-1.png, page-2.png, ... zero-padded for
        // larger documents, so collect and sort by page number.
        let mut rendered: Vec<(u32, std::path::PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(work_dir.path())? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(number) = name
                .strip_prefix("page-")
                .and_then(|rest| rest.strip_suffix(".png"))
                .and_then(|digits| digits.parse::<u32>().ok())
            {
                rendered.push((number, path));
            }
        }
        rendered.sort_by_key(|(number, _)| *number);

        if rendered.is_empty() {
            bail!("{} produced no page images", self.cmd);
        }

        let mut pages = Vec::with_capacity(rendered.len());
        for (number, path) in rendered {
            let page = image::open(&path)
                .with_context(|| format!("failed to decode rendered page {number}"))?;
            pages.push(page);
        }
        debug!(pages = pages.len(), dpi = self.dpi, "document rasterized");
        Ok(pages)
    }
}

/// Recognition engine backed by the Tesseract binary.
pub struct TesseractCli {
    cmd: String,
    language: String,
    engine_mode: u8,
    page_seg_mode: u8,
}

impl TesseractCli {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            cmd: config.tesseract_cmd.clone(),
            language: config.language.clone(),
            engine_mode: config.engine_mode,
            page_seg_mode: config.page_seg_mode,
        }
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, page: &GrayImage) -> Result<String> {
        let work_dir = tempfile::tempdir().context("failed to create recognition workspace")?;
        let image_path = work_dir.path().join("page.png");
        page.save(&image_path)
            .context("failed to stage page image for recognition")?;

        let output = Command::new(&self.cmd)
            .arg(&image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--oem")
            .arg(self.engine_mode.to_string())
            .arg("--psm")
            .arg(self.page_seg_mode.to_string())
            .output()
            .with_context(|| format!("{} failed to start", self.cmd))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.cmd,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Probes the recognition toolchain at startup. A missing binary is a
/// fatal initialization error for the service, not a per-request one.
pub fn verify_toolchain(config: &OcrConfig) -> AnalysisResult<()> {
    let tesseract = Command::new(&config.tesseract_cmd)
        .arg("--version")
        .output()
        .map_err(|error| {
            AnalysisError::external_tool(
                "tesseract",
                format!(
                    "not found at '{}' ({error}). Install it or set \
                     VERIFATURA__OCR__TESSERACT_CMD",
                    config.tesseract_cmd
                ),
            )
        })?;
    if !tesseract.status.success() {
        return Err(AnalysisError::external_tool(
            "tesseract",
            format!("'{} --version' failed", config.tesseract_cmd),
        ));
    }
    let version = String::from_utf8_lossy(&tesseract.stdout);
    debug!(version = %version.lines().next().unwrap_or_default(), "tesseract detected");

    Command::new(&config.pdftoppm_cmd)
        .arg("-v")
        .output()
        .map_err(|error| {
            AnalysisError::external_tool(
                "pdftoppm",
                format!(
                    "not found at '{}' ({error}). Install Poppler or set \
                     VERIFATURA__OCR__PDFTOPPM_CMD",
                    config.pdftoppm_cmd
                ),
            )
        })?;

    Ok(())
}
