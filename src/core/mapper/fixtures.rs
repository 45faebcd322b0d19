//! Canned `identify -verbose` output for tests.

/// The variable parts of a canned document
pub(crate) struct FixtureImage {
    pub filename: String,
    pub filesize: String,
    pub create_date: String,
    pub signature: String,
}

impl FixtureImage {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            filesize: "24.7MiB".to_string(),
            create_date: "2022-10-01T12:01:02".to_string(),
            signature: "5c1b3c4b7fbbbd8f4d8d0d5e1a9b6f3c0e2d4a6b8c0e2f4a6b8d0f2a4c6e8f0a".to_string(),
        }
    }

    pub fn filesize(mut self, filesize: &str) -> Self {
        self.filesize = filesize.to_string();
        self
    }

    pub fn create_date(mut self, create_date: &str) -> Self {
        self.create_date = create_date.to_string();
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = signature.to_string();
        self
    }
}

/// Render a document shaped like ImageMagick 7 output for a Sony ARW file
pub(crate) fn identify_output(image: &FixtureImage) -> String {
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
    dng:exposure.time: 1/250
    dng:f.number: 4
    dng:focal.length: 35.0 mm
    dng:focal.length.in.35mm.format: 35 mm
    dng:iso.setting: 100
    dng:lens: FE 24-105mm F4 G OSS
    dng:lens.f.stops: 6
    dng:lens.type: E-Mount, T-Mount, Other Lens or no lens
    dng:make: SONY
    dng:max.aperture.at.max.focal: 4.0
    dng:max.aperture.at.min.focal: 4.0
    dng:max.aperture.value: 4.0
    dng:max.focal.length: 105.0 mm
    dng:min.focal.length: 24.0 mm
    dng:software: ILCE-7M3 v4.01
    dng:wb.rb.levels: 2272 1564 0 0
    signature: {signature}
    xmp:Rating: 0
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
        filename = image.filename,
        filesize = image.filesize,
        create_date = image.create_date,
        signature = image.signature,
    )
}

/// Render and parse a canned document in one step
pub(crate) fn record(image: FixtureImage) -> crate::core::model::MetadataRecord {
    let document = crate::core::extractor::RawDocument {
        path: std::path::PathBuf::from(&image.filename),
        text: identify_output(&image),
    };
    super::parse_document(&document).expect("fixture document is valid")
}
