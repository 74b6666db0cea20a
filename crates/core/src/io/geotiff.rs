//! GeoTIFF reading/writing on top of the `tiff` crate
//!
//! Georeferencing comes from the GeoTIFF model tags (pixel scale + tiepoint,
//! or the full transformation matrix) and no-data from the GDAL_NODATA tag.
//! Projection keys are not interpreted.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use num_traits::NumCast;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// Options for writing GeoTIFF files
#[derive(Debug, Clone, Default)]
pub struct GeoTiffOptions {
    /// Write GDAL_NODATA even when the raster declares none (as NaN)
    pub force_nodata_tag: bool,
}

/// Read one band of a GeoTIFF file into a Raster
///
/// `band` is 1-based and defaults to band 1.
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    decode_geotiff(BufReader::new(file), band)
}

/// Read one band of a GeoTIFF held in memory
pub fn read_geotiff_from_buffer<T>(data: &[u8], band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data), band)
}

/// Internal: decode a GeoTIFF from any `Read + Seek` source
///
/// DEMs are loaded whole, so the decoder's buffer limits are lifted.
fn decode_geotiff<T, R>(reader: R, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    decode_with_limits(reader, band, Limits::unlimited())
}

fn decode_with_limits<T, R>(reader: R, band: Option<usize>, limits: Limits) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader)
        .map_err(|e| Error::Decode(format!("not a TIFF file: {}", e)))?
        .with_limits(limits);

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Decode(format!("cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let samples = decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap_or(1).max(1) as usize;
    let band = band.unwrap_or(1);
    if band == 0 || band > samples {
        return Err(Error::InvalidParameter {
            name: "band",
            value: band.to_string(),
            reason: format!("image has {} band(s)", samples),
        });
    }

    let result = decoder
        .read_image()
        .map_err(|e| Error::Decode(format!("cannot read image data: {}", e)))?;

    // Sentinels are compared against samples of the file's own precision
    let single_precision = matches!(result, DecodingResult::F32(_));

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => extract_band(&buf, samples, band),
        DecodingResult::F64(buf) => extract_band(&buf, samples, band),
        DecodingResult::U8(buf) => extract_band(&buf, samples, band),
        DecodingResult::U16(buf) => extract_band(&buf, samples, band),
        DecodingResult::U32(buf) => extract_band(&buf, samples, band),
        DecodingResult::U64(buf) => extract_band(&buf, samples, band),
        DecodingResult::I8(buf) => extract_band(&buf, samples, band),
        DecodingResult::I16(buf) => extract_band(&buf, samples, band),
        DecodingResult::I32(buf) => extract_band(&buf, samples, band),
        DecodingResult::I64(buf) => extract_band(&buf, samples, band),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedDataType(
                "unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_nodata(read_nodata(&mut decoder, single_precision));

    Ok(raster)
}

/// Pick `band` (1-based) out of a pixel-interleaved sample buffer
fn extract_band<S, T>(buf: &[S], samples: usize, band: usize) -> Vec<T>
where
    S: NumCast + Copy,
    T: RasterElement,
{
    buf.iter()
        .skip(band - 1)
        .step_by(samples)
        .map(|&v| num_traits::cast(v).unwrap_or_else(T::fill_value))
        .collect()
}

/// GeoTransform from the model tags, `None` when the file is not georeferenced
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    // A full 4x4 matrix carries the rotation terms
    if let Ok(m) = decoder.get_tag_f64_vec(tag(MODEL_TRANSFORMATION)) {
        if m.len() >= 8 {
            return Some(GeoTransform::from_gdal([m[3], m[0], m[1], m[7], m[4], m[5]]));
        }
    }

    let scale = decoder.get_tag_f64_vec(tag(MODEL_PIXEL_SCALE)).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(tag(MODEL_TIEPOINT)).ok()?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
    }

    None
}

fn read_nodata<T, R>(decoder: &mut Decoder<R>, single_precision: bool) -> Option<T>
where
    T: RasterElement,
    R: Read + Seek,
{
    let text = decoder.get_tag_ascii_string(tag(GDAL_NODATA)).ok()?;
    parse_nodata(&text, single_precision)
}

/// GDAL stores no-data as NUL-terminated ASCII ("-9999", "nan", "-3.4e+38").
///
/// With `single_precision` the text is rounded to `f32` first, so that
/// "-9999.9" matches Float32 cells holding -9999.900390625.
fn parse_nodata<T: RasterElement>(text: &str, single_precision: bool) -> Option<T> {
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    let value = if single_precision {
        <f64 as From<f32>>::from(text.parse::<f32>().ok()?)
    } else {
        text.parse::<f64>().ok()?
    };
    if value.is_nan() {
        return if T::is_float() { Some(T::fill_value()) } else { None };
    }
    T::from_f64(value)
}

/// Write a Raster to a GeoTIFF file as 32-bit float
pub fn write_geotiff<T, P>(
    raster: &Raster<T>,
    path: P,
    options: Option<GeoTiffOptions>,
) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_geotiff(raster, file, &options.unwrap_or_default())
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(
    raster: &Raster<T>,
    options: Option<GeoTiffOptions>,
) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf), &options.unwrap_or_default())?;
    Ok(buf)
}

fn encode_err(what: &str) -> impl FnOnce(tiff::TiffError) -> Error + '_ {
    move |e| Error::Other(format!("cannot write {}: {}", what, e))
}

/// Internal: encode a Raster as GeoTIFF into any `Write + Seek` sink
fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, options: &GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer).map_err(encode_err("TIFF header"))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(encode_err("image directory"))?;

    let gt = raster.transform();
    if gt.is_rotated() {
        let matrix = [
            gt.pixel_width, gt.row_rotation, 0.0, gt.origin_x,
            gt.col_rotation, gt.pixel_height, 0.0, gt.origin_y,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        image
            .encoder()
            .write_tag(tag(MODEL_TRANSFORMATION), &matrix[..])
            .map_err(encode_err("transformation tag"))?;
    } else {
        let scale = [gt.pixel_width, -gt.pixel_height, 0.0];
        image
            .encoder()
            .write_tag(tag(MODEL_PIXEL_SCALE), &scale[..])
            .map_err(encode_err("scale tag"))?;

        let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
        image
            .encoder()
            .write_tag(tag(MODEL_TIEPOINT), &tiepoint[..])
            .map_err(encode_err("tiepoint tag"))?;
    }

    // Version 1.1.0 with two keys: GTModelTypeGeoKey = Projected,
    // GTRasterTypeGeoKey = PixelIsArea
    let geokeys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 1];
    image
        .encoder()
        .write_tag(tag(GEO_KEY_DIRECTORY), &geokeys[..])
        .map_err(encode_err("geokey tag"))?;

    let nodata = match raster.nodata().and_then(RasterElement::to_f64) {
        Some(v) => Some(format_nodata(v)),
        None if options.force_nodata_tag => Some("nan".to_string()),
        None => None,
    };
    if let Some(text) = nodata {
        image
            .encoder()
            .write_tag(tag(GDAL_NODATA), text.as_str())
            .map_err(encode_err("nodata tag"))?;
    }

    image.write_data(&data).map_err(encode_err("image data"))?;

    Ok(())
}

fn format_nodata(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        value.to_string()
    }
}
