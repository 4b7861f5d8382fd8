//! Writes a sample "Collection Fabric Availability.csv" with enough column
//! variety to exercise every filter widget: numeric columns with blanks, a
//! date column with blanks and a few unparseable entries, low-cardinality
//! categorical columns, and a free-text notes column.

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

    fn pick<'a, T>(&mut self, options: &'a [T]) -> &'a T {
        &options[(self.next_u64() % options.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let materials = ["Linen", "Cotton", "Wool", "Silk", "Viscose", "Hemp"];
    let weaves = ["plain", "twill", "satin", "herringbone", "jacquard"];
    let collections = [
        "Spring 24", "Summer 24", "Autumn 24", "Winter 24", "Archive", "Essentials",
    ];
    let colors = ["ecru", "navy", "charcoal", "rust", "sage", "ochre", "ivory"];
    let statuses = ["in stock", "low", "reorder", "discontinued"];
    let widths = [90.0, 110.0, 140.0, 150.0, 280.0];
    let note_fragments = [
        "slubbed surface",
        "pre-washed",
        "deadstock lot",
        "limited run",
        "OEKO-TEX certified",
        "heavier handfeel",
        "suits upholstery",
        "garment weight",
    ];

    let output_path = "Collection Fabric Availability.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record([
            "fabric_id",
            "fabric",
            "collection",
            "material",
            "color",
            "width_cm",
            "price_eur",
            "stock_m",
            "available_from",
            "status",
            "notes",
        ])
        .expect("Failed to write header");

    let n_rows = 120;
    for id in 0..n_rows {
        let material = *rng.pick(&materials);
        let weave = *rng.pick(&weaves);
        let fabric = format!("{material} {weave} {id:04}");

        // Blanks exercise the include-missing toggles; a few "tba" dates
        // exercise the unparseable-leftover path.
        let width = if rng.chance(0.05) {
            String::new()
        } else {
            format!("{}", rng.pick(&widths))
        };
        let price = if rng.chance(0.04) {
            String::new()
        } else {
            format!("{:.2}", 4.0 + rng.next_f64() * 56.0)
        };
        let stock = if rng.chance(0.06) {
            String::new()
        } else {
            format!("{}", (rng.next_u64() % 400) as i64)
        };
        let available = if rng.chance(0.08) {
            String::new()
        } else if rng.chance(0.05) {
            "tba".to_string()
        } else {
            let month = 1 + (rng.next_u64() % 12) as u32;
            let day = 1 + (rng.next_u64() % 28) as u32;
            format!("2024-{month:02}-{day:02}")
        };

        let notes = format!(
            "{}, {}",
            rng.pick(&note_fragments),
            rng.pick(&note_fragments)
        );

        let color = if rng.chance(0.03) {
            String::new()
        } else {
            rng.pick(&colors).to_string()
        };

        writer
            .write_record([
                id.to_string(),
                fabric,
                rng.pick(&collections).to_string(),
                material.to_string(),
                color,
                width,
                price,
                stock,
                available,
                rng.pick(&statuses).to_string(),
                notes,
            ])
            .expect("Failed to write row");
    }

    writer.flush().expect("Failed to flush CSV");
    println!("Wrote {n_rows} rows to {output_path}");
}
