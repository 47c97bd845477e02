//! Behavior of the canonical 5D proxies over a synthetic container.

#[macro_use]
extern crate pretty_assertions;

mod util;

use imaris::{
    to_canonical, ArrayVolume, ImarisReader, PermutedVolume, Selector, Volume5d,
};
use ndarray::ArrayD;
use util::{canonical_data, pixel, sample_store, CountingStore, N_C, N_T, N_X, N_Y, N_Z};

fn disk_reader() -> ImarisReader<imaris::MemStore> {
    ImarisReader::from_store(sample_store()).unwrap()
}

fn mem_volume() -> ArrayVolume<f64> {
    to_canonical(canonical_data(), None, None).unwrap()
}

#[test]
fn full_range_key_returns_the_whole_shape() {
    let reader = disk_reader();
    let volume = reader.volume();
    assert_eq!(Volume5d::<f64>::shape(&volume), [N_T, N_Z, N_C, N_Y, N_X]);

    let all: ArrayD<f64> = volume.index(&[]).unwrap();
    assert_eq!(all.shape(), &[N_T, N_Z, N_C, N_Y, N_X]);
    assert_eq!(all, canonical_data());
}

#[test]
fn integer_selectors_collapse_their_axes() {
    let reader = disk_reader();
    let volume = reader.volume();

    let plane: ArrayD<f64> = volume
        .index(&[Selector::from(1), Selector::from(2), Selector::from(0)])
        .unwrap();
    assert_eq!(plane.ndim(), 2);
    assert_eq!(plane.shape(), &[N_Y, N_X]);
    assert_eq!(plane[[3, 4]], pixel(1, 2, 0, 3, 4));

    let stack: ArrayD<f64> = volume.index(&[Selector::from(0)]).unwrap();
    assert_eq!(stack.shape(), &[N_Z, N_C, N_Y, N_X]);
    assert_eq!(stack[[2, 1, 0, 1]], pixel(0, 2, 1, 0, 1));
}

#[test]
fn disk_and_memory_proxies_agree() {
    let reader = disk_reader();
    let disk = reader.volume();
    let mem = mem_volume();

    let keys: Vec<Vec<Selector>> = vec![
        vec![],
        vec![Selector::from(1)],
        vec![Selector::from(0), Selector::from(1..3)],
        vec![Selector::from(0..2), Selector::from(1), Selector::from(0..2)],
        vec![
            Selector::all(),
            Selector::stepped(None, None, 2),
            Selector::from(1),
            Selector::from(1..3),
            Selector::from(-2..),
        ],
        vec![Selector::Ellipsis, Selector::from(2)],
        vec![
            Selector::from(1),
            Selector::stepped(None, None, -1),
            Selector::from(0),
        ],
    ];
    for key in keys {
        let a: ArrayD<f64> = disk.index(&key).unwrap();
        let b: ArrayD<f64> = mem.index(&key).unwrap();
        assert_eq!(a, b, "key {:?}", key);
    }
}

#[test]
fn channel_range_inside_one_time_is_transposed_to_canonical_order() {
    let reader = disk_reader();
    let volume = reader.volume();

    // Z and C both ranged: Z must lead C in the result
    let block: ArrayD<f64> = volume
        .index(&[Selector::from(1), Selector::from(0..3), Selector::from(0..2)])
        .unwrap();
    assert_eq!(block.shape(), &[N_Z, N_C, N_Y, N_X]);
    assert_eq!(block[[2, 1, 1, 3]], pixel(1, 2, 1, 1, 3));

    // Z collapsed: channels stack without a transpose
    let planes: ArrayD<f64> = volume
        .index(&[Selector::from(1), Selector::from(2), Selector::from(0..2)])
        .unwrap();
    assert_eq!(planes.shape(), &[N_C, N_Y, N_X]);
    assert_eq!(planes[[1, 0, 2]], pixel(1, 2, 1, 0, 2));
}

#[test]
fn time_ranges_stack_into_a_leading_axis() {
    let reader = disk_reader();
    let volume = reader.volume();

    let block: ArrayD<f64> = volume
        .index(&[Selector::from(0..2), Selector::from(1), Selector::from(0)])
        .unwrap();
    assert_eq!(block.shape(), &[N_T, N_Y, N_X]);
    assert_eq!(block[[1, 2, 2]], pixel(1, 1, 0, 2, 2));
}

#[test]
fn trailing_y_x_selectors_crop_the_assembled_block() {
    let reader = disk_reader();
    let volume = reader.volume();

    let crop: ArrayD<f64> = volume
        .index(&[
            Selector::from(0),
            Selector::from(1),
            Selector::from(1),
            Selector::from(1..3),
            Selector::from(2..5),
        ])
        .unwrap();
    assert_eq!(crop.shape(), &[2, 3]);
    assert_eq!(crop[[0, 0]], pixel(0, 1, 1, 1, 2));
    assert_eq!(crop[[1, 2]], pixel(0, 1, 1, 2, 4));

    let column: ArrayD<f64> = volume
        .index(&[
            Selector::from(0),
            Selector::from(0),
            Selector::from(0),
            Selector::all(),
            Selector::from(3),
        ])
        .unwrap();
    assert_eq!(column.shape(), &[N_Y]);
    assert_eq!(column[[1]], pixel(0, 0, 0, 1, 3));
}

#[test]
fn degenerate_ranges_yield_empty_results() {
    let reader = disk_reader();
    let volume = reader.volume();

    // zero planes selected on Z
    let empty: ArrayD<f64> = volume
        .index(&[Selector::from(0), Selector::from(2..2), Selector::from(0)])
        .unwrap();
    assert_eq!(empty.shape(), &[0, N_Y, N_X]);

    // zero timepoints selected
    let empty: ArrayD<f64> = volume
        .index(&[Selector::from(1..1), Selector::from(0), Selector::from(0..2)])
        .unwrap();
    assert_eq!(empty.shape(), &[0, N_C, N_Y, N_X]);

    // zero channels selected
    let empty: ArrayD<f64> = volume
        .index(&[Selector::from(0), Selector::all(), Selector::from(2..2)])
        .unwrap();
    assert_eq!(empty.shape(), &[N_Z, 0, N_Y, N_X]);
}

#[test]
fn full_z_range_collapses_into_one_bulk_read() {
    let (store, counts) = CountingStore::new(sample_store());
    let reader = ImarisReader::from_store(store).unwrap();
    let volume = reader.volume();

    let _: ArrayD<f64> = volume
        .index(&[Selector::from(0), Selector::all(), Selector::from(0)])
        .unwrap();
    assert_eq!(counts.stacks.get(), 1);
    assert_eq!(counts.planes.get(), 0);

    // an explicit 0..Z with step 1 is still the full range
    counts.reset();
    let _: ArrayD<f64> = volume
        .index(&[
            Selector::from(0),
            Selector::from(0..(N_Z as isize)),
            Selector::from(1),
        ])
        .unwrap();
    assert_eq!(counts.stacks.get(), 1);
    assert_eq!(counts.planes.get(), 0);
}

#[test]
fn partial_or_stepped_z_ranges_read_per_plane() {
    let (store, counts) = CountingStore::new(sample_store());
    let reader = ImarisReader::from_store(store).unwrap();
    let volume = reader.volume();

    let _: ArrayD<f64> = volume
        .index(&[Selector::from(0), Selector::from(0..2), Selector::from(0)])
        .unwrap();
    assert_eq!(counts.stacks.get(), 0);
    assert_eq!(counts.planes.get(), 2);

    // a stepped traversal of the whole axis is not the bulk path
    counts.reset();
    let _: ArrayD<f64> = volume
        .index(&[
            Selector::from(0),
            Selector::stepped(None, None, 2),
            Selector::from(0),
        ])
        .unwrap();
    assert_eq!(counts.stacks.get(), 0);
    assert_eq!(counts.planes.get(), 2);

    // one bulk read per selected channel and timepoint
    counts.reset();
    let _: ArrayD<f64> = volume.index(&[]).unwrap();
    assert_eq!(counts.stacks.get(), N_T * N_C);
    assert_eq!(counts.planes.get(), 0);
}

#[test]
fn orthogonal_views_reorder_disk_results() {
    let reader = disk_reader();
    let volume = reader.volume();

    // Z-Y side view: collapsing T and X leaves (C, Y, Z)
    let view = PermutedVolume::zy_view(&volume);
    assert_eq!(Volume5d::<f64>::shape(&view), [N_T, N_X, N_C, N_Y, N_Z]);
    let side: ArrayD<f64> = view.index(&[Selector::from(1), Selector::from(4)]).unwrap();
    assert_eq!(side.shape(), &[N_C, N_Y, N_Z]);
    assert_eq!(side[[1, 2, 0]], pixel(1, 0, 1, 2, 4));

    // Z-X side view: collapsing T and Y leaves (C, X, Z)
    let view = PermutedVolume::zx_view(&volume);
    assert_eq!(Volume5d::<f64>::shape(&view), [N_T, N_Y, N_C, N_Z, N_X]);
    let side: ArrayD<f64> = view.index(&[Selector::from(0), Selector::from(3)]).unwrap();
    assert_eq!(side.shape(), &[N_C, N_Z, N_X]);
    assert_eq!(side[[0, 2, 1]], pixel(0, 2, 0, 3, 1));
}

#[test]
fn permuted_views_agree_with_the_memory_proxy() {
    let reader = disk_reader();
    let disk = reader.volume();
    let mem = mem_volume();

    let perm = [0, 4, 2, 3, 1];
    let disk_view = PermutedVolume::new(&disk, perm).unwrap();
    let mem_view = PermutedVolume::new(&mem, perm).unwrap();
    let keys: Vec<Vec<Selector>> = vec![
        vec![],
        vec![Selector::all(), Selector::from(1)],
        vec![Selector::from(0), Selector::from(0..3), Selector::from(1)],
        vec![Selector::Ellipsis, Selector::from(0..2)],
    ];
    for key in keys {
        let a: ArrayD<f64> = disk_view.index(&key).unwrap();
        let b: ArrayD<f64> = mem_view.index(&key).unwrap();
        assert_eq!(a, b, "key {:?}", key);
    }
}
