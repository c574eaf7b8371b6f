use std::io;
use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;

use crate::color::Color;

/// A canvas for drawing pixels.
///
/// The canvas stores the final color of each pixel, on the 0 to 255 scale
/// the tracer works in. Once rendering finishes, the `Canvas` can be saved
/// as a PPM image, either plain (P3) or binary (P6).
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored row by row.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a new black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Saves a canvas to a PPM file.
    pub fn save(&self, path: &Path, binary: bool) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out, binary)?;
        out.flush()
    }

    /// Encodes the canvas as a PPM image.
    ///
    /// Components are clamped to [0, 255] and truncated. In plain PPM, lines
    /// are kept within 70 columns; a number that would cross the 70 column
    /// mark is moved to the next line.
    pub fn write_ppm<W: Write>(&self, out: &mut W, binary: bool) -> io::Result<()> {
        // Write PPM header, as well as metadata
        writeln!(out, "{}", if binary { "P6" } else { "P3" })?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?; // Maximum color value

        if binary {
            for pixel in self.pixels.iter() {
                out.write_all(&pixel.to_bytes())?;
            }

            return Ok(());
        }

        let mut col = 0;
        for pixel in self.pixels.iter() {
            for byte in pixel.to_bytes().iter() {
                let s = byte.to_string();

                if col == 0 {
                    write!(out, "{}", s)?;
                    col = s.len();
                } else if col + 1 + s.len() > 70 {
                    write!(out, "\n{}", s)?;
                    col = s.len();
                } else {
                    write!(out, " {}", s)?;
                    col += 1 + s.len();
                }
            }
        }

        // Terminate the PPM file with a newline
        writeln!(out)
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. Pixels are specified in row-column
    /// order, where `y` is the row of the pixel, and `x` is the column. Rows
    /// and columns are zero-indexed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use csg_ray_tracer::color::Color;
    /// # use csg_ray_tracer::canvas::Canvas;
    /// let purple = Color::rgb(255.0, 0.0, 255.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads a color from a location on the `Canvas`, or `None` when the
    /// location is out-of-bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }
}

/* Tests */

#[test]
fn out_of_bounds_pixels_are_ignored() {
    let mut canvas = Canvas::new(2, 2);
    canvas.write_pixel(2, 0, &Color::grey(10.0));

    assert_eq!(canvas.read_pixel(2, 0), None);
    assert_eq!(canvas.read_pixel(1, 1), Some(Color::black()));
}

#[test]
fn plain_ppm_clamps_and_truncates() {
    let mut canvas = Canvas::new(3, 1);
    canvas.write_pixel(0, 0, &Color::rgb(300.0, -4.0, 127.9));
    canvas.write_pixel(2, 0, &Color::rgb(0.5, 255.0, 1.0));

    let mut out = Vec::new();
    canvas.write_ppm(&mut out, false).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "P3\n3 1\n255\n255 0 127 0 0 0 0 255 1\n"
    );
}

#[test]
fn plain_ppm_wraps_at_70_columns() {
    let mut canvas = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            canvas.write_pixel(x, y, &Color::rgb(255.0, 204.0, 153.0));
        }
    }

    let mut out = Vec::new();
    canvas.write_ppm(&mut out, false).unwrap();
    let text = String::from_utf8(out).unwrap();

    let body: Vec<&str> = text.lines().skip(3).collect();
    assert!(body.iter().all(|l| l.len() <= 70));
    assert_eq!(body[0],
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
    assert_eq!(body.iter().map(|l| l.split(' ').count()).sum::<usize>(), 60);
    assert!(text.ends_with('\n'));
}

#[test]
fn binary_ppm_writes_raw_bytes() {
    let mut canvas = Canvas::new(2, 1);
    canvas.write_pixel(1, 0, &Color::rgb(1.9, 128.0, 256.0));

    let mut out = Vec::new();
    canvas.write_ppm(&mut out, true).unwrap();

    let mut expected = b"P6\n2 1\n255\n".to_vec();
    expected.extend_from_slice(&[0, 0, 0, 1, 128, 255]);
    assert_eq!(out, expected);
}
