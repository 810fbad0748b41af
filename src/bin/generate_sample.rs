use anyhow::Context;

const DIRECTIONS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Seeded noise source so every run writes the same file.
///
/// xoshiro256** for the uniform stream; normal draws come in pairs and the
/// spare one is kept for the next call.
struct Noise {
    state: [u64; 4],
    spare: Option<f64>,
}

impl Noise {
    fn seeded(seed: u64) -> Self {
        let mut state = [0u64; 4];
        let mut x = seed;
        for slot in &mut state {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        Noise { state, spare: None }
    }

    fn next_u64(&mut self) -> u64 {
        let s = &mut self.state;
        let out = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 17;
        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);
        out
    }

    /// Uniform in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        let z = match self.spare.take() {
            Some(z) => z,
            None => {
                let radius = (-2.0 * self.uniform().max(f64::MIN_POSITIVE).ln()).sqrt();
                let angle = std::f64::consts::TAU * self.uniform();
                self.spare = Some(radius * angle.sin());
                radius * angle.cos()
            }
        };
        mean + sd * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }
}

/// One hourly observation, before gaps are punched in.
struct Observation {
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    pm25: f64,
    pm10: f64,
    so2: f64,
    no2: f64,
    co: f64,
    o3: f64,
    temp: f64,
    pres: f64,
    dewp: f64,
    rain: f64,
    wd: &'static str,
    wspm: f64,
}

fn observe(rng: &mut Noise, year: u32, month: u32, day: u32, hour: u32) -> Observation {
    let winter = matches!(month, 12 | 1 | 2);
    let season = ((month as f64 - 1.0) / 12.0 * 2.0 * std::f64::consts::PI).cos();
    let rush = (-((hour as f64 - 16.0).powi(2)) / 8.0).exp();
    let trend = (year as f64 - 2013.0) * 4.0;

    let rain = if rng.chance(if winter { 0.02 } else { 0.08 }) {
        rng.uniform().powi(2) * 30.0
    } else {
        0.0
    };
    let washout = 1.0 / (1.0 + rain / 3.0);

    let pm25 = ((60.0 + 40.0 * season + 35.0 * rush + trend + rng.normal(0.0, 15.0)) * washout).max(3.0);
    let no2 = ((45.0 + 15.0 * season + 20.0 * rush + rng.normal(0.0, 8.0)) * washout).max(2.0);
    let co = ((1000.0 + 600.0 * season + 400.0 * rush + rng.normal(0.0, 150.0)) * washout).max(100.0);
    let temp = 13.0 - 15.0 * season + 5.0 * (hour as f64 / 24.0 * std::f64::consts::PI).sin()
        + rng.normal(0.0, 2.0);

    Observation {
        year,
        month,
        day,
        hour,
        pm25: pm25.round(),
        pm10: (pm25 * 1.3 + rng.normal(0.0, 10.0)).max(pm25).round(),
        so2: (12.0 + 10.0 * season + rng.normal(0.0, 3.0)).max(1.0).round(),
        no2: no2.round(),
        co: (co / 100.0).round() * 100.0,
        o3: (60.0 - 40.0 * season + 30.0 * rush + rng.normal(0.0, 10.0)).max(1.0).round(),
        temp: (temp * 10.0).round() / 10.0,
        pres: ((1012.0 + 10.0 * season + rng.normal(0.0, 3.0)) * 10.0).round() / 10.0,
        dewp: ((temp - 8.0 + rng.normal(0.0, 3.0)) * 10.0).round() / 10.0,
        rain: (rain * 10.0).round() / 10.0,
        wd: DIRECTIONS[(rng.next_u64() % DIRECTIONS.len() as u64) as usize],
        wspm: (rng.uniform() * 5.0 * 10.0).round() / 10.0,
    }
}

fn maybe(rng: &mut Noise, value: f64, p_missing: f64) -> String {
    if rng.chance(p_missing) {
        String::new()
    } else {
        value.to_string()
    }
}

fn main() -> anyhow::Result<()> {
    let mut rng = Noise::seeded(42);
    let output_path = "sample_air_quality.csv";

    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([
        "No", "year", "month", "day", "hour", "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP",
        "PRES", "DEWP", "RAIN", "wd", "WSPM", "station",
    ])?;

    let mut row_no: u64 = 0;
    let mut duplicates = 0;
    for year in 2013..=2015 {
        for (m, &days) in DAYS_IN_MONTH.iter().enumerate() {
            let month = m as u32 + 1;
            for day in 1..=days {
                for hour in 0..24 {
                    let obs = observe(&mut rng, year, month, day, hour);
                    row_no += 1;

                    // Leading PM2.5 gap that interpolation cannot fill.
                    let pm25 = if row_no <= 3 {
                        String::new()
                    } else {
                        maybe(&mut rng, obs.pm25, 0.02)
                    };
                    let wd = if rng.chance(0.01) { "" } else { obs.wd };

                    let record = [
                        row_no.to_string(),
                        obs.year.to_string(),
                        obs.month.to_string(),
                        obs.day.to_string(),
                        obs.hour.to_string(),
                        pm25,
                        maybe(&mut rng, obs.pm10, 0.02),
                        maybe(&mut rng, obs.so2, 0.02),
                        maybe(&mut rng, obs.no2, 0.02),
                        maybe(&mut rng, obs.co, 0.03),
                        maybe(&mut rng, obs.o3, 0.02),
                        maybe(&mut rng, obs.temp, 0.005),
                        maybe(&mut rng, obs.pres, 0.005),
                        maybe(&mut rng, obs.dewp, 0.005),
                        maybe(&mut rng, obs.rain, 0.005),
                        wd.to_string(),
                        maybe(&mut rng, obs.wspm, 0.005),
                        "Synthetic".to_string(),
                    ];
                    writer.write_record(&record)?;

                    if rng.chance(0.002) {
                        writer.write_record(&record)?;
                        duplicates += 1;
                    }
                }
            }
        }
    }
    writer.flush()?;

    println!("Wrote {row_no} observations ({duplicates} duplicated) to {output_path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Noise::seeded(7);
        let mut b = Noise::seeded(7);
        for _ in 0..10 {
            assert_eq!(a.normal(0.0, 1.0).to_bits(), b.normal(0.0, 1.0).to_bits());
        }
    }

    #[test]
    fn normal_draws_centre_on_mean() {
        let mut noise = Noise::seeded(42);
        let n = 20_000;
        let mean = (0..n).map(|_| noise.normal(5.0, 2.0)).sum::<f64>() / n as f64;
        assert!((mean - 5.0).abs() < 0.1, "mean {mean}");
        assert!((0..1000).all(|_| (0.0..1.0).contains(&noise.uniform())));
    }
}
