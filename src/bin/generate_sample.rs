//! Writes `sample_data.csv` and `sample_data.xlsx`: a small measurement log
//! with duplicate rows and gaps, for trying out the cleaning steps.

use anyhow::{Context as _, Result};

use smart_clean::data::export::{encode_csv, encode_xlsx};
use smart_clean::data::{CellValue, Column, ColumnKind, Table};

const ROWS: usize = 60;
const DUPLICATES: usize = 6;

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn build_table(rng: &mut SimpleRng) -> Result<Table> {
    let samples = ["Sample_A", "Sample_B", "Sample_C"];
    let operators = ["Alice", "Bob"];

    let mut id = Vec::new();
    let mut sample = Vec::new();
    let mut operator = Vec::new();
    let mut concentration = Vec::new();
    let mut absorbance = Vec::new();
    let mut passed = Vec::new();

    for i in 0..ROWS {
        let conc = round2(rng.next_f64() * 5.0);
        let reading = round2(rng.gauss(0.4 * conc, 0.05));

        id.push(CellValue::Integer(i as i64));
        sample.push(CellValue::String(rng.pick(&samples).to_string()));
        operator.push(if rng.next_f64() < 0.1 {
            CellValue::Null
        } else {
            CellValue::String(rng.pick(&operators).to_string())
        });
        concentration.push(if rng.next_f64() < 0.15 {
            CellValue::Null
        } else {
            CellValue::Float(conc)
        });
        absorbance.push(CellValue::Float(reading));
        passed.push(CellValue::Bool(reading < 1.5));
    }

    // repeat a few rows verbatim
    for i in 0..DUPLICATES {
        let src = i * 7;
        for col in [
            &mut id,
            &mut sample,
            &mut operator,
            &mut concentration,
            &mut absorbance,
            &mut passed,
        ] {
            let value = col[src].clone();
            col.push(value);
        }
    }

    Ok(Table::new(vec![
        Column::new("id", ColumnKind::Integer, id),
        Column::new("sample", ColumnKind::Text, sample),
        Column::new("operator", ColumnKind::Text, operator),
        Column::new("concentration", ColumnKind::Float, concentration),
        Column::new("absorbance", ColumnKind::Float, absorbance),
        Column::new("passed", ColumnKind::Boolean, passed),
    ])?)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let table = build_table(&mut rng)?;

    for (path, bytes) in [
        ("sample_data.csv", encode_csv(&table)?),
        ("sample_data.xlsx", encode_xlsx(&table)?),
    ] {
        std::fs::write(path, bytes).with_context(|| format!("Failed to write {path}"))?;
        println!("Wrote {} rows ({} duplicated) to {path}", table.height(), DUPLICATES);
    }
    Ok(())
}
