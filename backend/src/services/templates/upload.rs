//! Validation shared by template create and edit.

use crate::error::{Error, Result};
use crate::render::filename::secure_filename;
use crate::services::form::{MultipartForm, UploadedFile};
use common::model::template::FieldsConfig;
use image::ImageFormat;
use std::path::{Path, PathBuf};

pub(super) const NAME_FIELD: &str = "template_name";
pub(super) const CONFIG_FIELD: &str = "fields_config";
pub(super) const IMAGE_FIELD: &str = "template_image";

const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A template image that passed validation and knows where it will be stored.
#[derive(Debug)]
pub(super) struct TemplateImage {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl TemplateImage {
    pub fn stored_path(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }

    pub fn write(&self) -> Result<()> {
        std::fs::write(&self.path, &self.bytes)?;
        Ok(())
    }
}

/// The validated content of a template form.
#[derive(Debug)]
pub(super) struct TemplateUpload {
    pub name: String,
    pub fields_config: FieldsConfig,
    pub image: Option<TemplateImage>,
}

impl TemplateUpload {
    pub fn from_form(mut form: MultipartForm, templates_dir: &Path) -> Result<Self> {
        let name = form
            .text(NAME_FIELD)
            .ok_or_else(|| Error::validation("Template name is required."))?
            .to_string();

        let fields_config = match form.text(CONFIG_FIELD) {
            None => FieldsConfig::default(),
            Some(raw) => FieldsConfig::from_json(raw).map_err(|e| {
                Error::validation(format!(
                    "Invalid JSON for Fields Configuration. Please check the syntax. ({e})"
                ))
            })?,
        };

        let image = form
            .take_file(IMAGE_FIELD)
            .map(|file| validate_image(&name, file, templates_dir))
            .transpose()?;

        Ok(Self {
            name,
            fields_config,
            image,
        })
    }
}

fn validate_image(name: &str, file: UploadedFile, templates_dir: &Path) -> Result<TemplateImage> {
    let extension = file
        .extension()
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| Error::validation("Invalid template image file type. Only PNG, JPG, JPEG are allowed."))?;

    match image::guess_format(&file.bytes) {
        Ok(ImageFormat::Png | ImageFormat::Jpeg) => {}
        _ => return Err(Error::validation("Template image is not a readable PNG or JPEG file.")),
    }

    let file_name = secure_filename(&format!("{name}.{extension}"));
    if file_name.is_empty() || !file_name.contains('.') {
        return Err(Error::validation(format!(
            "Template name '{name}' does not produce a usable file name."
        )));
    }

    Ok(TemplateImage {
        path: templates_dir.join(file_name),
        bytes: file.bytes,
    })
}
