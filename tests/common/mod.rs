//! Helpers shared by the integration tests.
//!
//! Test "RAW files" contain the `identify -verbose` text that the metadata
//! tool would print for them, and a small shell script stands in for
//! `magick`, printing the file back. Files that do not hold a document make
//! the fake tool fail the way ImageMagick does.

#![allow(dead_code)]

use raw_library::core::extractor::{ExtractorConfig, MagickExtractor};
use std::fs;
use std::path::{Path, PathBuf};

const FAKE_MAGICK: &str = r#"
if head -n 1 "$1" | grep -q '^Image:'; then
    cat "$1"
else
    echo "identify: no decode delegate for this image format \`ARW' @ error/constitute.c/ReadImage/746." >&2
    exit 1
fi
"#;

/// Extractor that runs the fake tool through `sh`
pub fn fake_magick() -> MagickExtractor {
    MagickExtractor::new(ExtractorConfig {
        program: PathBuf::from("sh"),
        args: vec![
            "-c".to_string(),
            FAKE_MAGICK.to_string(),
            "fake-magick".to_string(),
        ],
    })
}

/// A test RAW file
pub struct Shot<'a> {
    pub relative: &'a str,
    pub filesize: &'a str,
    pub create_date: &'a str,
    pub signature: &'a str,
}

impl<'a> Shot<'a> {
    pub fn new(relative: &'a str, filesize: &'a str, create_date: &'a str) -> Self {
        Self {
            relative,
            filesize,
            create_date,
            signature: "9f2c4e1a7b3d5f6e8a0c2e4f6a8b0d2e4f6a8c0e2a4c6e8f0a2c4e6a8c0e2f4a",
        }
    }

    pub fn signature(mut self, signature: &'a str) -> Self {
        self.signature = signature;
        self
    }
}

/// Write `shot` under `root`, returning its absolute path
pub fn write_shot(root: &Path, shot: &Shot<'_>) -> PathBuf {
    let root = fs::canonicalize(root).unwrap();
    let path = root.join(shot.relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, identify_output(&path, shot)).unwrap();
    path
}

/// Write a file the fake tool refuses to read
pub fn write_unreadable(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"\x00\x01 not an image").unwrap();
    path
}

fn identify_output(path: &Path, shot: &Shot<'_>) -> String {
    format!(
        r#"Image:
  Filename: {filename}
  Format: ARW (Sony Alpha Raw Image Format)
  Class: DirectClass
  Geometry: 6048x4024+0+0
  Units: Undefined
  Colorspace: sRGB
  Type: TrueColor
  Base type: Undefined
  Endianness: Undefined
  Depth: 16-bit
  Channel depth:
    Red: 16-bit
    Green: 16-bit
    Blue: 16-bit
  Channel statistics:
    Pixels: 24337152
    Red:
      min: 0  (0)
      max: 65535 (1)
      mean: 13133.2 (0.2004)
      median: 10280 (0.156863)
      standard deviation: 11532.3 (0.175972)
      kurtosis: 1.84232
      skewness: 1.42861
      entropy: 0.880753
    Green:
      min: 0  (0)
      max: 65535 (1)
      mean: 12410.9 (0.189379)
      median: 9509 (0.145098)
      standard deviation: 11003.1 (0.167897)
      kurtosis: 2.31108
      skewness: 1.55214
      entropy: 0.876302
    Blue:
      min: 0  (0)
      max: 65535 (1)
      mean: 10505.1 (0.160298)
      median: 7967 (0.121569)
      standard deviation: 10241.6 (0.156277)
      kurtosis: 3.40951
      skewness: 1.80427
      entropy: 0.863868
  Image statistics:
    Overall:
      min: 0  (0)
      max: 65535 (1)
      mean: 12016.4 (0.183359)
      median: 9252 (0.141176)
      standard deviation: 10990.8 (0.167709)
      kurtosis: 2.49118
      skewness: 1.58734
      entropy: 0.873641
  Rendering intent: Perceptual
  Gamma: 0.454545
  Chromaticity:
    red primary: (0.64,0.33,0.03)
    green primary: (0.3,0.6,0.1)
    blue primary: (0.15,0.06,0.79)
    white point: (0.3127,0.329,0.3583)
  Matte color: grey74
  Background color: white
  Border color: srgb(223,223,223)
  Transparent color: black
  Interlace: None
  Intensity: Undefined
  Compose: Over
  Page geometry: 6048x4024+0+0
  Dispose: Undefined
  Iterations: 0
  Compression: Undefined
  Orientation: TopLeft
  Properties:
    date:create: 2022-10-07T18:20:11+00:00
    date:modify: 2022-10-07T18:20:11+00:00
    date:timestamp: 2022-10-10T09:12:40+00:00
    dng:camera.model.name: ILCE-7M3
    dng:create.date: {create_date}
    dng:exposure.time: 1/160
    dng:f.number: 5.6
    dng:focal.length: 50.0 mm
    dng:focal.length.in.35mm.format: 50 mm
    dng:iso.setting: 200
    dng:lens: FE 24-105mm F4 G OSS
    dng:lens.f.stops: 6
    dng:lens.type:
    dng:make: SONY
    dng:max.aperture.at.max.focal: 4.0
    dng:max.aperture.at.min.focal: 4.0
    dng:max.aperture.value: 4.0
    dng:max.focal.length: 105.0 mm
    dng:min.focal.length: 24.0 mm
    dng:software: ILCE-7M3 v4.01
    dng:wb.rb.levels: 2272 1564 0 0
    signature: {signature}
    xmp:Rating: 3
  Profiles:
    Profile-xmp: 12709 bytes
  Artifacts:
    verbose: true
  Tainted: False
  Filesize: {filesize}
  Number pixels: 24.3M
  Pixel cache type: Memory
  Pixels per second: 19.5MP
  User time: 4.160u
  Elapsed time: 0:02.242
  Version: ImageMagick 7.1.0-51 Q16-HDRI x86_64 20386 https://imagemagick.org
"#,
        filename = path.display(),
        create_date = shot.create_date,
        filesize = shot.filesize,
        signature = shot.signature,
    )
}
