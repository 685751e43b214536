use wavefront_dither::{kernel::share, *};

const SEED: u8 = 200;

const EXPECTED_OUTPUT: [[u8; 4]; 4] = [
    [255, 255, 255, 255],
    [255, 0, 255, 255],
    [255, 255, 255, 0],
    [255, 0, 255, 255],
];

// Value of each cell at the moment it was quantized.
const EXPECTED_ACCUMULATOR: [[i32; 4]; 4] = [
    [200, 175, 165, 160],
    [167, 115, 198, 139],
    [193, 190, 138, 107],
    [167, 114, 227, 212],
];

fn seeded() -> LumaGrid {
    LumaGrid::filled(4, 4, SEED).unwrap()
}

fn assert_expected(output: &BinaryGrid, accumulator: &Accumulator) {
    for (y, row) in output.rows().enumerate() {
        assert_eq!(row, &EXPECTED_OUTPUT[y], "output row {y}");
    }
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(
                accumulator.get(x, y),
                EXPECTED_ACCUMULATOR[y][x],
                "accumulator at ({x}, {y})"
            );
        }
    }
}

#[test_log::test]
fn first_row_propagation_by_hand() {
    // Row 0 is all white: 200 > 128, then each right neighbor receives
    // ⌊error × 7 / 16⌋ of a negative error.
    let e0 = i32::from(SEED) - 255;
    assert_eq!(e0, -55);
    let v1 = i32::from(SEED) + share(e0, 7);
    assert_eq!(v1, 175);
    let e1 = v1 - 255;
    let v2 = i32::from(SEED) + share(e1, 7);
    assert_eq!(v2, 165);
    let e2 = v2 - 255;
    let v3 = i32::from(SEED) + share(e2, 7);
    assert_eq!(v3, 160);
    let e3 = v3 - 255;

    // Second row, before any row-1 cell is processed: 5/16 from above,
    // 3/16 from above-right, 1/16 from above-left.
    let row1 = [
        i32::from(SEED) + share(e0, 5) + share(e1, 3),
        i32::from(SEED) + share(e0, 1) + share(e1, 5) + share(e2, 3),
        i32::from(SEED) + share(e1, 1) + share(e2, 5) + share(e3, 3),
        i32::from(SEED) + share(e2, 1) + share(e3, 5),
    ];
    assert_eq!(row1, [167, 154, 148, 164]);

    // (0, 1) reads exactly that; later cells also get 7/16 from the left.
    let mut accumulator = Accumulator::try_from_luma(&seeded()).unwrap();
    Sequential.diffuse(&mut accumulator).unwrap();
    assert_eq!(accumulator.get(0, 1), row1[0]);
    assert_eq!(accumulator.get(1, 1), row1[1] + share(row1[0] - 255, 7));
}

#[test_log::test]
fn all_200_sequential() {
    let mut accumulator = Accumulator::try_from_luma(&seeded()).unwrap();
    let output = Sequential.diffuse(&mut accumulator).unwrap();
    assert_expected(&output, &accumulator);
}

#[cfg(feature = "rayon")]
#[test_log::test]
fn all_200_four_workers() {
    let mut accumulator = Accumulator::try_from_luma(&seeded()).unwrap();
    let output = Wavefront::new(4).diffuse(&mut accumulator).unwrap();
    assert_expected(&output, &accumulator);
}

#[test_log::test]
fn all_200_through_dither() {
    // 16 cells: dispatched sequentially unless the threshold is lowered.
    let single = dither(&seeded(), 1).unwrap();
    let forced =
        dither_with(&seeded(), &DitherConfig::new(4).with_parallel_threshold(0))
            .unwrap();

    assert_eq!(single, forced);
    assert_eq!(single.get(1, 1), 0);
    assert_eq!(single.get(3, 2), 0);
}
