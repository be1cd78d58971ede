//! PNG to PDF conversion for certificate downloads.
//!
//! genpdf embeds images from disk, so the certificate is flattened onto a white
//! background, re-encoded as an 8-bit RGB PNG into a temporary file and placed
//! on a page sized to the image at the configured resolution.

use super::resolve_download;
use crate::config::PdfConfig;
use crate::error::{Error, Result};
use crate::services::blocking;
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use genpdf::elements::Image as PdfImage;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::{Document, Size, SimplePageDecorator};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage, RgbImage};
use log::{debug, info};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use std::path::Path;
use tempfile::NamedTempFile;

const MM_PER_INCH: f64 = 25.4;
/// Added to each page dimension so rounding never pushes the image onto a second page.
const PAGE_SLACK_MM: f64 = 1.0;

pub async fn process(state: web::Data<AppState>, filename: web::Path<String>) -> Result<HttpResponse> {
    let filename = filename.into_inner();
    let path = resolve_download(state.certificates_dir(), &filename)?;
    let pdf_name = format!(
        "{}.pdf",
        Path::new(&filename).file_stem().and_then(|s| s.to_str()).unwrap_or("certificate")
    );

    let state = state.into_inner();
    let bytes = blocking(move || image_to_pdf(&path, &state.config.pdf)).await?;
    info!("Converted {filename} to PDF ({} bytes)", bytes.len());

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(pdf_name)],
        })
        .body(bytes))
}

/// Converts the image at `path` into a single-page PDF.
pub fn image_to_pdf(path: &Path, settings: &PdfConfig) -> Result<Vec<u8>> {
    let image = image::open(path)?;
    let (width, height) = image.dimensions();
    let flattened = flatten_onto_white(&image);

    // Keep the temporary PNG alive until the document has been rendered.
    let tmp = write_rgb_png(&flattened)?;
    let mut element = PdfImage::from_path(tmp.path())?;
    element.set_dpi(settings.resolution_dpi);

    let mut doc = Document::new(load_font(settings)?);
    doc.set_title("Certificate");
    doc.set_paper_size(Size::new(
        px_to_mm(width, settings.resolution_dpi) + PAGE_SLACK_MM,
        px_to_mm(height, settings.resolution_dpi) + PAGE_SLACK_MM,
    ));
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(0);
    doc.set_page_decorator(decorator);
    doc.push(element);

    let mut out = Vec::new();
    doc.render(&mut out)?;
    debug!("Rendered {width}x{height} image from {} into a PDF page", path.display());
    Ok(out)
}

/// genpdf needs a font family even for an image-only document. Families are tried in order.
fn load_font(settings: &PdfConfig) -> Result<FontFamily<FontData>> {
    let mut last_error = None;
    for family in &settings.font_families {
        match genpdf::fonts::from_files(&settings.font_dir, family, None) {
            Ok(fonts) => return Ok(fonts),
            Err(e) => {
                debug!("Font family {family} not usable from {}: {e}", settings.font_dir.display());
                last_error = Some(e);
            }
        }
    }
    Err(Error::Pdf(format!(
        "no usable font family in {} (tried {}){}",
        settings.font_dir.display(),
        settings.font_families.join(", "),
        last_error.map(|e| format!(": {e}")).unwrap_or_default()
    )))
}

fn px_to_mm(px: u32, dpi: f64) -> f64 {
    px as f64 / dpi * MM_PER_INCH
}

/// Composites the image over opaque white and drops the alpha channel.
pub(crate) fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut background = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut background, &rgba, 0, 0);
    DynamicImage::ImageRgba8(background).to_rgb8()
}

fn write_rgb_png(image: &RgbImage) -> Result<NamedTempFile> {
    let (w, h) = image.dimensions();
    let mut tmp = NamedTempFile::new()?;
    {
        let mut encoder = PngEncoder::new(tmp.as_file_mut(), w, h);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header().map_err(|e| Error::Pdf(e.to_string()))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| Error::Pdf(e.to_string()))?;
    }
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::temp_state;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test as actix_test, App};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn bundled_fonts() -> PdfConfig {
        PdfConfig {
            font_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/fonts")),
            font_families: vec!["Arial".to_string(), "DejaVuSansMono".to_string()],
            ..PdfConfig::default()
        }
    }

    fn page_count(pdf: &[u8]) -> usize {
        regex::bytes::Regex::new(r"/Type\s*/Page[^s]")
            .unwrap()
            .find_iter(pdf)
            .count()
    }

    #[test]
    fn transparent_pixels_become_white() {
        let mut rgba = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([200, 10, 10, 255]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(1, 0).0, [200, 10, 10]);
    }

    #[test]
    fn page_size_follows_resolution() {
        assert!((px_to_mm(100, 100.0) - 25.4).abs() < 1e-9);
        assert!((px_to_mm(1000, 200.0) - 127.0).abs() < 1e-9);
    }

    #[test]
    fn temporary_png_is_readable() {
        let tmp = write_rgb_png(&RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]))).unwrap();
        let back = image::ImageReader::open(tmp.path())
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .decode()
            .unwrap()
            .to_rgb8();
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(back.get_pixel(2, 1).0, [1, 2, 3]);
    }

    #[test]
    fn missing_fonts_are_a_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("c.png");
        RgbImage::from_pixel(10, 10, image::Rgb([0, 0, 0])).save(&png).unwrap();
        let settings = PdfConfig {
            font_dir: dir.path().join("fonts"),
            ..PdfConfig::default()
        };

        let err = image_to_pdf(&png, &settings).unwrap_err();
        assert!(matches!(err, Error::Pdf(_)));
        assert!(err.to_string().contains("Arial, LiberationSans"));
    }

    #[test]
    fn converts_transparent_png_to_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("Ada_Demo_1_x.png");
        let mut rgba = RgbaImage::from_pixel(300, 200, Rgba([0, 0, 0, 0]));
        for x in 0..300 {
            rgba.put_pixel(x, 100, Rgba([10, 20, 30, 255]));
        }
        rgba.save(&png).unwrap();

        let pdf = image_to_pdf(&png, &bundled_fonts()).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(page_count(&pdf), 1);
    }

    #[actix_web::test]
    async fn route_serves_pdf_attachment() {
        let (_dir, state) = temp_state();
        RgbImage::from_pixel(120, 80, image::Rgb([255, 255, 255]))
            .save(state.certificates_dir().join("Ada_Demo_1_x.png"))
            .unwrap();
        let mut config = (*state.config).clone();
        config.pdf = bundled_fonts();
        let state = AppState {
            config: Arc::new(config),
            db: state.db.clone(),
        };
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(super::super::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/download_pdf/Ada_Demo_1_x.png")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
        assert!(disposition.starts_with("attachment") && disposition.contains("Ada_Demo_1_x.pdf"));
        let body = actix_test::read_body(resp).await;
        assert_eq!(page_count(&body), 1);
    }

    #[actix_web::test]
    async fn unknown_file_is_404_before_conversion() {
        let (_dir, state) = temp_state();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(super::super::configure_routes()),
        )
        .await;
        let req = actix_test::TestRequest::get().uri("/download_pdf/nothing.png").to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
