//! # Certificate Renderer
//!
//! Turns one participant plus one template into a PNG on disk.
//!
//! ## Workflow
//!
//! 1.  **Template image**: the base image must exist at `template.file_path`;
//!     otherwise rendering fails with `RenderError::TemplateImageMissing`.
//! 2.  **Fields**: for every entry of the template's layout the text is resolved
//!     with [`resolver::resolve_field`]. Fields without text, or without an `x`/`y`
//!     coordinate, are skipped. Fonts and colors that cannot be used degrade to the
//!     defaults (see [`font::LoadedFont::resolve`]) and are logged, never fatal.
//! 3.  **Alignment**: centered fields start at `x - width / 2`, where `width` is the
//!     pixel width of the rendered text.
//! 4.  **Output**: the composed image is saved under a name built by
//!     [`filename::certificate_file_name`] and the path is returned.
//!
//! Only the returned path is persisted by callers, so a failed render never leaves
//! a certificate row behind.

pub mod color;
pub mod filename;
pub mod font;
pub mod resolver;

use crate::config::RenderConfig;
use common::model::participant::Participant;
use common::model::template::{Align, FieldSpec, Template};
use font::LoadedFont;
use image::{ImageFormat, RgbImage};
use log::{debug, error, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template image not found at {0}")]
    TemplateImageMissing(PathBuf),

    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read template image {path}: {source}")]
    LoadImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot save certificate to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Renders `participant` onto `template` and writes the PNG into `output_dir`.
///
/// Returns the written path with `/` separators, ready to be stored.
pub fn render_certificate(
    participant: &Participant,
    template: &Template,
    output_dir: &Path,
    settings: &RenderConfig,
) -> Result<String, RenderError> {
    let result = render_inner(participant, template, output_dir, settings);
    if let Err(e) = &result {
        error!(
            "Certificate generation failed for participant {} with template {}: {e}",
            participant.id, template.id
        );
    }
    result
}

fn render_inner(
    participant: &Participant,
    template: &Template,
    output_dir: &Path,
    settings: &RenderConfig,
) -> Result<String, RenderError> {
    std::fs::create_dir_all(output_dir).map_err(|source| RenderError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let template_path = PathBuf::from(&template.file_path);
    if !template_path.exists() {
        return Err(RenderError::TemplateImageMissing(template_path));
    }

    let mut canvas = image::open(&template_path)
        .map_err(|source| RenderError::LoadImage {
            path: template_path.clone(),
            source,
        })?
        .to_rgb8();

    let drawn = compose(&mut canvas, participant, template, settings);
    debug!(
        "Drew {drawn} of {} fields for participant {}",
        template.fields_config.len(),
        participant.id
    );

    let output_path = output_dir.join(filename::certificate_file_name(
        &participant.name,
        &participant.event,
        participant.id,
    ));
    canvas
        .save_with_format(&output_path, ImageFormat::Png)
        .map_err(|source| RenderError::Save {
            path: output_path.clone(),
            source,
        })?;

    Ok(output_path.to_string_lossy().replace('\\', "/"))
}

/// Draws every resolvable field of `template` onto `canvas`. Returns the number of fields drawn.
pub fn compose(
    canvas: &mut RgbImage,
    participant: &Participant,
    template: &Template,
    settings: &RenderConfig,
) -> usize {
    let mut drawn = 0;
    for (field, spec) in template.fields_config.iter() {
        let Some(text) = resolver::resolve_field(participant, field).filter(|t| !t.is_empty()) else {
            debug!("No value for field '{field}' on participant {}", participant.id);
            continue;
        };
        if draw_field(canvas, field, text, spec, settings) {
            drawn += 1;
        }
    }
    drawn
}

fn draw_field(canvas: &mut RgbImage, field: &str, text: &str, spec: &FieldSpec, settings: &RenderConfig) -> bool {
    let (Some(x), Some(y)) = (spec.x, spec.y) else {
        warn!("Missing x or y coordinate for field '{field}', skipping it");
        return false;
    };

    let size = spec
        .font_size
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(settings.default_font_size);
    // Glyphs taller than the canvas cannot be seen; cap the size so rasterizing stays bounded.
    let max_size = canvas.height().max(1) as f32;
    let size = if size > max_size {
        warn!("Font size {size} for field '{field}' exceeds the template height, using {max_size}");
        max_size
    } else {
        size
    };
    let font = LoadedFont::resolve(spec.font_path.as_deref(), size, settings.default_font_path.as_deref());

    let color = match spec.color.as_deref().map(color::parse_color) {
        None => color::BLACK,
        Some(Ok(color)) => color,
        Some(Err(e)) => {
            warn!("{e} for field '{field}', drawing in black");
            color::BLACK
        }
    };

    if font.is_bitmap() {
        debug!("Field '{field}' uses the built-in bitmap font");
    }

    let origin_x = draw_origin(spec.align(), x, font.text_width(text));
    font.draw(canvas, origin_x.round() as i32, y.round() as i32, color, text);
    true
}

/// Horizontal start of the text for a field configured at `x` whose text is `width` pixels wide.
pub fn draw_origin(align: Align, x: f32, width: u32) -> f32 {
    match align {
        Align::Center => x - width as f32 / 2.0,
        Align::Left => x,
    }
}
