use std::io::Write;
use std::sync::Arc;

use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use image::{Rgb, RgbImage};
use parquet::arrow::ArrowWriter;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// A blue (positive) reaction: strong band near 650 nm, weaker one near 560 nm.
fn positive_trace(rng: &mut SimpleRng) -> (Vec<f64>, Vec<f64>) {
    let wavelengths: Vec<f64> = (0..=400).map(|i| 400.0 + i as f64).collect();
    let absorbance = wavelengths
        .iter()
        .map(|&nm| {
            gaussian(nm, 650.0, 35.0, 0.82)
                + gaussian(nm, 560.0, 30.0, 0.38)
                + 0.03
                + rng.gauss(0.0, 0.004)
        })
        .collect();
    (wavelengths, absorbance)
}

fn write_csv(path: &str, wavelengths: &[f64], absorbance: &[f64]) {
    let mut out = std::fs::File::create(path).expect("Failed to create CSV");
    writeln!(out, "UV-Vis export v2.3,Instrument S/N 0042").expect("write");
    writeln!(out, "Method: colorimetric scan 400-800 nm").expect("write");
    writeln!(out, "Wavelength (nm),Abs,Std.Dev").expect("write");
    writeln!(out, "// baseline corrected").expect("write");
    for (i, (&nm, &a)) in wavelengths.iter().zip(absorbance).enumerate() {
        if i == 200 {
            writeln!(out, "// lamp changeover, reading continues").expect("write");
        }
        writeln!(out, "{nm:.1},{a:.4},0.0010").expect("write");
    }
    writeln!(out, "// end of data,,").expect("write");
    writeln!(out, "Operator,N/A,").expect("write");
}

fn write_parquet(path: &str, wavelengths: &[f64], absorbance: &[f64]) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("wavelength_nm", DataType::Float64, false),
        Field::new("absorbance", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(wavelengths.to_vec())),
            Arc::new(Float64Array::from(absorbance.to_vec())),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn jitter(base: f64, rng: &mut SimpleRng) -> u8 {
    (base + rng.gauss(0.0, 6.0)).clamp(0.0, 255.0) as u8
}

/// White bench background with a blue tube filling the centre.
fn write_photo(path: &str, rng: &mut SimpleRng) {
    let (w, h) = (480u32, 360u32);
    let mut img = RgbImage::from_pixel(w, h, Rgb([245, 245, 240]));
    for y in h / 6..h - h / 6 {
        for x in w / 4..w - w / 4 {
            let px = Rgb([jitter(45.0, rng), jitter(85.0, rng), jitter(215.0, rng)]);
            img.put_pixel(x, y, px);
        }
    }
    img.save(path).expect("Failed to save PNG");
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let (wavelengths, absorbance) = positive_trace(&mut rng);
    write_csv("sample_export.csv", &wavelengths, &absorbance);
    write_parquet("sample_export.parquet", &wavelengths, &absorbance);
    write_photo("sample_photo.png", &mut rng);

    println!(
        "Wrote sample_export.csv / sample_export.parquet ({} points) and sample_photo.png",
        wavelengths.len()
    );
}
