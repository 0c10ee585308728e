use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();

    generate_weapon_synonyms(&out_dir);

    println!("cargo:rerun-if-changed=data/weapons.csv");
}

fn generate_weapon_synonyms(out_dir: &str) {
    let csv = fs::read_to_string("data/weapons.csv").expect("failed to read weapons.csv");

    // BTreeMap for deterministic output (sorted by key)
    let mut entries = BTreeMap::new();
    for line in csv.lines().skip(1) {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 2 {
            continue;
        }
        let synonym = fields[0].trim().to_ascii_lowercase();
        let weapon = fields[1].trim();
        if synonym.is_empty() || weapon.is_empty() {
            continue;
        }
        if let Some(previous) = entries.insert(synonym.clone(), format!("Weapon::{}", weapon)) {
            panic!("duplicate weapon synonym {synonym:?} (was {previous})");
        }
    }

    let path = Path::new(out_dir).join("weapon_synonyms.rs");
    let mut file = BufWriter::new(fs::File::create(&path).unwrap());

    let mut builder = phf_codegen::Map::new();
    for (synonym, weapon) in &entries {
        builder.entry(synonym.as_str(), weapon);
    }

    writeln!(
        file,
        "pub static WEAPON_SYNONYMS: phf::Map<&'static str, Weapon> = {};",
        builder.build()
    )
    .unwrap();
}
