use std::path::PathBuf;

use anyhow::Result;

use iqr_fence::data::model::{Record, Table, Value};
use iqr_fence::data::writer::save_file;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Positive integer around `mean`, never below 1.
    fn count(&mut self, mean: f64, std_dev: f64) -> i64 {
        self.gauss(mean, std_dev).round().max(1.0) as i64
    }
}

const DISHES: [&str; 6] = ["soup", "stew", "salad", "curry", "pie", "bread"];

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_recipes.csv"));

    let mut rng = SimpleRng::new(42);
    let mut records = Vec::new();

    for id in 0..500_i64 {
        // cooking times are long-tailed: log-normal around ~35 minutes
        let mut minutes = rng.gauss(3.5, 0.6).exp().round() as i64;
        let mut n_steps = rng.count(9.0, 3.0);
        let n_ingredients = rng.count(8.0, 2.5);

        // a few absurd entries of the kind real recipe dumps contain
        if id % 97 == 13 {
            minutes = 60 * 24 * 30;
        }
        if id % 89 == 7 {
            n_steps = 120;
        }

        let name = format!("{} #{id}", DISHES[(rng.next_u64() % DISHES.len() as u64) as usize]);
        let minutes = if id % 71 == 5 {
            Value::Null
        } else {
            Value::Integer(minutes)
        };

        records.push(Record::from_pairs([
            ("id", Value::Integer(id)),
            ("name", Value::String(name)),
            ("minutes", minutes),
            ("n_steps", Value::Integer(n_steps)),
            ("n_ingredients", Value::Integer(n_ingredients)),
        ]));
    }

    let columns = ["id", "name", "minutes", "n_steps", "n_ingredients"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let table = Table::new(columns, records);
    save_file(&table, &output_path)?;

    println!("Wrote {} recipes to {}", table.len(), output_path.display());
    Ok(())
}
