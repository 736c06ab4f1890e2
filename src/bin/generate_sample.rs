use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Base magnitudes per band (B, V, R) of the field stars; the first star is
/// the variable object.
const STARS: [(&str, [f64; 3]); 6] = [
    ("412", [13.10, 12.40, 12.00]),
    ("57", [12.20, 11.60, 11.30]),
    ("133", [13.80, 13.00, 12.60]),
    ("208", [12.90, 12.50, 12.30]),
    ("391", [14.20, 13.40, 13.00]),
    ("77", [11.70, 11.20, 10.90]),
];
const BANDS: [&str; 3] = ["B", "V", "R"];

const FIRST_NIGHT: f64 = 58000.0;
const NIGHTS: usize = 30;
const EXPOSURES_PER_NIGHT: usize = 3;
const PERIOD_DAYS: f64 = 3.7;
const AMPLITUDE_MAG: f64 = 0.15;
const MISSING_RATE: f64 = 0.03;

/// SplitMix64; deterministic so the sample files are reproducible.
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller.
    fn gauss(&mut self, sigma: f64) -> f64 {
        let u1 = self.uniform().max(1e-15);
        let u2 = self.uniform();
        sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

fn write_identifiers(path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for (i, (id, _)) in STARS.iter().enumerate() {
        let ra = format!("05:35:{:05.2}", 10.0 + 3.7 * i as f64);
        let dec = format!("+22:01:{:04.1}", 5.0 + 11.3 * i as f64);
        writer.write_record([ra.as_str(), dec.as_str(), *id])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_measurements(path: &Path, rng: &mut Rng) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut rows = 0;
    for night in 0..NIGHTS {
        for (b, band) in BANDS.iter().enumerate() {
            for exposure in 0..EXPOSURES_PER_NIGHT {
                let mjd = FIRST_NIGHT + night as f64 + 0.15 + 0.02 * (b * EXPOSURES_PER_NIGHT + exposure) as f64;
                // extinction shared by the whole field, cancels in differentials
                let airmass_term = 0.2 * rng.uniform();

                let mut record = vec![format!("{mjd:.5}"), band.to_string()];
                for (s, (_, base)) in STARS.iter().enumerate() {
                    if rng.uniform() < MISSING_RATE {
                        record.push("INDEF".to_string());
                        record.push("INDEF".to_string());
                        continue;
                    }
                    let variability = if s == 0 {
                        AMPLITUDE_MAG * (2.0 * std::f64::consts::PI * (mjd - FIRST_NIGHT) / PERIOD_DAYS).sin()
                    } else {
                        0.0
                    };
                    let err = 0.005 + 0.002 * (base[b] - 11.0);
                    let mag = base[b] + variability + airmass_term + rng.gauss(err);
                    record.push(format!("{mag:.4}"));
                    record.push(format!("{err:.4}"));
                }
                writer.write_record(&record)?;
                rows += 1;
            }
        }

        // an H-alpha frame now and then; not a recognized band by default
        if night % 10 == 0 {
            let mut record = vec![format!("{:.5}", FIRST_NIGHT + night as f64 + 0.4), "Ha".to_string()];
            for _ in &STARS {
                record.push("15.0000".to_string());
                record.push("0.0500".to_string());
            }
            writer.write_record(&record)?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

fn main() -> Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let ids_path = out_dir.join("sample_field.csv");
    let mags_path = out_dir.join("sample_all_inst_mag.tsv");

    let mut rng = Rng(42);
    write_identifiers(&ids_path)?;
    let rows = write_measurements(&mags_path, &mut rng)?;

    println!(
        "Wrote {} identifiers to {} and {rows} measurement rows to {}",
        STARS.len(),
        ids_path.display(),
        mags_path.display()
    );
    Ok(())
}
