//! The centroid strategy satisfies the same contract as the histogram
//! strategy behind the same entry point.

use spot_palette_wasm::{
    delta_e, extract_palette_pixels, ColorKey, DeltaEWeights, DesignColor, ExtractOptions,
    ExtractStrategy, Mode,
};

fn buffer(runs: &[([u8; 4], usize)]) -> Vec<u8> {
    runs.iter()
        .flat_map(|&(px, n)| std::iter::repeat_n(px, n))
        .flatten()
        .collect()
}

fn centroid_options() -> ExtractOptions {
    ExtractOptions::new().strategy(ExtractStrategy::Centroid)
}

const RED: [u8; 4] = [0xE0, 0x10, 0x10, 0xFF];
const BLUE: [u8; 4] = [0x10, 0x10, 0xE0, 0xFF];

#[test]
fn centroid_extraction_is_deterministic() {
    // A varied buffer: more distinct colors than centroids.
    let mut runs = Vec::new();
    for i in 0..60u8 {
        runs.push(([i.wrapping_mul(37), i.wrapping_mul(11), 255 - i, 0xFF], 4));
    }
    let raw = buffer(&runs);
    let width = raw.len() as u32 / 4;
    let options = centroid_options();

    let a = extract_palette_pixels(&raw, width, 1, Mode::SpotColor, &options).unwrap();
    let b = extract_palette_pixels(&raw, width, 1, Mode::SpotColor, &options).unwrap();
    assert_eq!(a, b);
    assert!(!a.is_empty());
}

#[test]
fn centroid_transparent_buffer_yields_empty_palette() {
    let raw = buffer(&[([200, 100, 50, 0], 32)]);
    let palette =
        extract_palette_pixels(&raw, 32, 1, Mode::SpotColor, &centroid_options()).unwrap();
    assert!(palette.is_empty());
}

#[test]
fn centroid_two_flat_colors_produce_two_entries() {
    let raw = buffer(&[([0, 0, 0, 255], 50), ([255, 255, 255, 255], 50)]);
    let palette =
        extract_palette_pixels(&raw, 100, 1, Mode::SpotColor, &centroid_options()).unwrap();
    assert_eq!(palette.len(), 2);

    let sum: u32 = palette.iter().map(|e| e.count).sum();
    assert_eq!(sum, 100);

    // Centroids of duplicated flat colors land on the source colors,
    // modulo the LAB round trip.
    let mut rgbs: Vec<[u8; 3]> = palette.iter().map(|e| e.key.rgb()).collect();
    rgbs.sort();
    assert!(rgbs[0].iter().all(|&c| c <= 2));
    assert!(rgbs[1].iter().all(|&c| c >= 253));
}

#[test]
fn centroid_population_is_bounded_by_total() {
    let mut runs = vec![(RED, 300), (BLUE, 200)];
    for i in 0..30u8 {
        runs.push(([i, 200, i.wrapping_mul(7), 0xFF], 2));
    }
    let raw = buffer(&runs);
    let width = raw.len() as u32 / 4;
    let palette =
        extract_palette_pixels(&raw, width, 1, Mode::SpotColor, &centroid_options()).unwrap();

    let sum: u32 = palette.iter().map(|e| e.count).sum();
    assert!(sum <= palette.total_samples());
    // The sub-percent survivors were filtered before merging, so every
    // entry clears the population floor.
    for entry in palette.iter() {
        assert!(entry.count as f32 / palette.total_samples() as f32 >= 0.01);
    }
}

#[test]
fn centroid_palette_has_no_near_duplicates() {
    let raw = buffer(&[(RED, 200), (BLUE, 200), ([0x10, 0xE0, 0x10, 0xFF], 100)]);
    let options = centroid_options();
    let palette = extract_palette_pixels(&raw, 500, 1, Mode::SpotColor, &options).unwrap();

    let entries = palette.entries();
    assert!(entries.len() >= 2);
    for (i, a) in entries.iter().enumerate() {
        for b in &entries[i + 1..] {
            let d = delta_e(a.key.lab(), b.key.lab(), DeltaEWeights::UNIFORM);
            assert!(
                d.floor() > options.centroid.merge_threshold,
                "{} and {} survived within the merge threshold ({d})",
                a.hex(),
                b.hex()
            );
        }
    }
}

#[test]
fn centroid_cap_keeps_the_most_dominant_entries() {
    let raw = buffer(&[
        (RED, 400),
        (BLUE, 300),
        ([0x10, 0xE0, 0x10, 0xFF], 200),
        ([0xE0, 0xE0, 0x10, 0xFF], 100),
    ]);
    let uncapped =
        extract_palette_pixels(&raw, 1000, 1, Mode::SpotColor, &centroid_options()).unwrap();
    let capped = extract_palette_pixels(
        &raw,
        1000,
        1,
        Mode::SpotColor,
        &centroid_options().num_colors(2),
    )
    .unwrap();

    assert_eq!(capped.len(), 2);
    assert_eq!(capped.entries(), &uncapped.entries()[..2]);
    // Dominance order is preserved.
    assert!(capped.entries()[0].count >= capped.entries()[1].count);
}

#[test]
fn centroid_design_snap_applies() {
    let design = vec![
        DesignColor::new("ink-red", "#FF0000").unwrap(),
        DesignColor::new("ink-blue", "#0000FF").unwrap(),
    ];
    let raw = buffer(&[(RED, 60), (BLUE, 40)]);
    let options = centroid_options().design_palette(design);
    let palette = extract_palette_pixels(&raw, 100, 1, Mode::SpotColor, &options).unwrap();

    let hexes = palette.hexes();
    assert!(hexes.contains(&"FF0000".to_string()));
    assert!(hexes.contains(&"0000FF".to_string()));
    for entry in palette.iter() {
        assert!(
            entry.key == ColorKey::from_hex("FF0000").unwrap()
                || entry.key == ColorKey::from_hex("0000FF").unwrap()
        );
    }
}

#[test]
fn centroid_reject_full_color_short_circuits() {
    let raw = buffer(&[(RED, 16)]);
    let options = centroid_options().reject_full_color(true);
    let palette = extract_palette_pixels(&raw, 16, 1, Mode::FullColor, &options).unwrap();
    assert!(palette.is_empty());
}
