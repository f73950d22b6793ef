//! End-to-end reader tests against an in-memory master file.
//!
//! The fixture mimics a three-core run with three snapshots:
//!
//! * `Snap000`: shard sizes [4, 0, 2] (offsets [0, 4, 4], 6 galaxies)
//! * `Snap001`: shard sizes [5, 0, 3] (offsets [0, 5, 5], 8 galaxies);
//!   core 1's datasets are absent entirely, standing in for a core that
//!   produced no output
//! * `Snap002`: shard sizes [2, 3, 1] (offsets [0, 2, 5], 6 galaxies)

use meraxes::{
    check_for_global_xh, check_for_redshift, grab_redshift, grab_unsampled_snapshot, list_grids,
    read_descendant_indices, read_firstprogenitor_indices, read_gals, read_git_info, read_grid,
    read_input_params, read_linkage, read_nextprogenitor_indices, read_ps, read_size_dist,
    read_snaplist, resolve_snapshot, Error, LinkKind, ReadContext, ScalingWarning, XhWeight,
};
use meraxes_store::{
    AttrValue, Field, MemStore, RecordBatch, RecordSchema, Scalar, StoreBuilder, Value,
};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn galaxy_schema() -> RecordSchema {
    RecordSchema::new(vec![
        Field::scalar("ID", Scalar::I32),
        Field::scalar("CentralGal", Scalar::I32),
        Field::scalar("StellarMass", Scalar::F32),
        Field::scalar("Spin", Scalar::F32),
        Field::vector("Pos", Scalar::F32, 3),
    ])
}

fn make_batch(first_id: i32, centrals: &[i32]) -> RecordBatch {
    let mut batch = RecordBatch::new(galaxy_schema());
    for (i, &central) in centrals.iter().enumerate() {
        let id = first_id + i as i32;
        batch
            .push_row(&[
                Value::I32(id),
                Value::I32(central),
                Value::F32(id as f32 * 0.1),
                Value::F32(0.5),
                Value::F32s(vec![id as f32; 3]),
            ])
            .unwrap();
    }
    batch
}

fn snapshot_attrs(b: &mut StoreBuilder, group: &str, ngals: i64, redshift: f64, lt_time: f64) {
    b.set_group_attr(group, "NGalaxies", AttrValue::I64Array(vec![ngals]));
    b.set_group_attr(group, "Redshift", AttrValue::F64Array(vec![redshift]));
    b.set_group_attr(group, "LTTime", AttrValue::F64Array(vec![lt_time]));
    b.set_group_attr(group, "UnsampledSnapshot", AttrValue::I64Array(vec![99]));
}

fn fixture() -> MemStore {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut b = StoreBuilder::new();
    b.set_attr("NCores", AttrValue::I64Array(vec![3]));

    // --- Snap000: sizes [4, 0, 2] -----------------------------------------
    snapshot_attrs(&mut b, "Snap000", 6, 9.0, 100.0);
    b.create_dataset("Snap000/Core0/Galaxies")
        .with_records(make_batch(100, &[0, 0, 0, 0]));
    b.create_dataset("Snap000/Core1/Galaxies")
        .with_records(RecordBatch::new(galaxy_schema()));
    b.create_dataset("Snap000/Core2/Galaxies")
        .with_records(make_batch(104, &[0, 0]));

    // --- Snap001: sizes [5, 0, 3], core 1 absent --------------------------
    snapshot_attrs(&mut b, "Snap001", 8, 8.0, 200.0);
    b.create_group("Snap001/Core1");
    b.create_dataset("Snap001/Core0/Galaxies")
        .with_records(make_batch(0, &[0, 0, 2, 2, 4]));
    b.create_dataset("Snap001/Core2/Galaxies")
        .with_records(make_batch(10, &[0, 1, 1]));

    // Linkage arrays for Snap001. First-progenitor values are local to the
    // same core one snapshot earlier; descendants local to the same core one
    // snapshot later; next-progenitor chains stay within Snap001.
    b.create_dataset("Snap001/Core0/FirstProgenitorIndices")
        .with_i32_data(&[-1, 0, 1, 3, -1]);
    b.create_dataset("Snap001/Core2/FirstProgenitorIndices")
        .with_i32_data(&[0, 1, -1]);
    b.create_dataset("Snap001/Core0/NextProgenitorIndices")
        .with_i32_data(&[1, 2, -1, -1, 4]);
    b.create_dataset("Snap001/Core2/NextProgenitorIndices")
        .with_i32_data(&[1, -1, 2]);
    b.create_dataset("Snap001/Core0/DescendantIndices")
        .with_i32_data(&[0, -1, 1, 0, -1]);
    b.create_dataset("Snap001/Core2/DescendantIndices")
        .with_i32_data(&[0, -1, 0]);

    // --- Snap002: sizes [2, 3, 1] ------------------------------------------
    snapshot_attrs(&mut b, "Snap002", 6, 7.0, 300.0);
    b.create_dataset("Snap002/Core0/Galaxies")
        .with_records(make_batch(200, &[0, 0]));
    b.create_dataset("Snap002/Core1/Galaxies")
        .with_records(make_batch(202, &[0, 0, 2]));
    b.create_dataset("Snap002/Core2/Galaxies")
        .with_records(make_batch(205, &[0]));

    // --- Units and conversions ---------------------------------------------
    b.set_group_attr("Units", "StellarMass", AttrValue::String("1e10 solMass".into()));
    b.set_group_attr("Units", "Pos", AttrValue::String("Mpc".into()));
    b.set_group_attr("HubbleConversions", "ID", AttrValue::String("None".into()));
    b.set_group_attr("HubbleConversions", "CentralGal", AttrValue::String("None".into()));
    b.set_group_attr("HubbleConversions", "StellarMass", AttrValue::String("v/h".into()));
    b.set_group_attr("HubbleConversions", "Pos", AttrValue::String("v/h".into()));
    b.set_group_attr("HubbleConversions/Grids", "xH", AttrValue::String("None".into()));
    b.set_group_attr("HubbleConversions/Grids", "deltax", AttrValue::String("v/h".into()));

    // --- Input params and provenance ---------------------------------------
    b.set_group_attr("InputParams", "Hubble_h", AttrValue::F64Array(vec![0.7]));
    b.set_group_attr("InputParams", "BoxSize", AttrValue::F64Array(vec![100.0]));
    b.set_group_attr("InputParams", "PartMass", AttrValue::F64Array(vec![0.01]));
    b.set_group_attr("InputParams", "VolumeFactor", AttrValue::F64Array(vec![1.0]));
    b.set_group_attr("InputParams", "ReionGridDim", AttrValue::I64Array(vec![4]));
    b.set_group_attr("InputParams/RecomGridParams", "ZreFlag", AttrValue::I64Array(vec![1]));
    b.create_dataset("gitdiff")
        .with_str_data("")
        .set_attr("gitref", AttrValue::String("abc1234".into()));

    // --- Grids, spectra, distributions --------------------------------------
    b.create_dataset("Snap001/Grids/xH")
        .with_f32_data(&[0.5; 64])
        .set_attr("volume_weighted_global_xH", AttrValue::F64Array(vec![0.3]))
        .set_attr("mass_weighted_global_xH", AttrValue::F64Array(vec![0.25]));
    b.create_dataset("Snap001/Grids/deltax").with_f32_data(&[2.0; 64]);
    b.create_dataset("Snap002/Grids/xH")
        .with_f32_data(&[0.1; 64])
        .set_attr("global_xH", AttrValue::F64Array(vec![0.1]));
    b.create_dataset("Snap001/PowerSpectrum")
        .with_f32_data(&[0.1, 10.0, 1.0, 0.2, 20.0, 2.0])
        .set_attr("nbins", AttrValue::I64Array(vec![2]));
    b.create_dataset("Snap001/RegionSizeDist")
        .with_f32_data(&[1.0, 0.1, 2.0, 0.2])
        .set_attr("nbins", AttrValue::I64Array(vec![2]));

    b.finish()
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

#[test]
fn assembles_all_shards_in_core_order() {
    let store = fixture();
    let gals = read_gals(&store, &ReadContext::new(), 1, None, None).unwrap();
    assert_eq!(gals.len(), 8);
    // Core 0's records land at [0:5], core 2's at [5:8].
    assert_eq!(
        gals.i32_column("ID").unwrap(),
        vec![0, 1, 2, 3, 4, 10, 11, 12]
    );
    let masses = gals.f32_column("StellarMass").unwrap();
    assert_eq!(masses[5], 1.0);
}

#[test]
fn assembled_records_match_their_shards_bytewise() {
    let store = fixture();
    // Leave CentralGal out so no field is rewritten during assembly.
    let props = ["ID", "StellarMass", "Pos"];
    let gals = read_gals(&store, &ReadContext::new(), 1, Some(&props), None).unwrap();

    let core0 = make_batch(0, &[0, 0, 2, 2, 4]);
    let restricted = core0.schema().restrict(&props).unwrap();
    let mut expected = vec![0u8; 5 * restricted.record_size()];
    core0
        .gather_into("core0", &restricted, &meraxes_store::Selection::All, &mut expected)
        .unwrap();
    assert_eq!(&gals.data()[..expected.len()], &expected[..]);
}

#[test]
fn central_gal_is_rebased_by_core_prefix_offset() {
    let store = fixture();
    let gals = read_gals(&store, &ReadContext::new(), 1, None, None).unwrap();
    // Core 0 keeps its local values; core 2's shift by its offset of 5.
    assert_eq!(
        gals.i32_column("CentralGal").unwrap(),
        vec![0, 0, 2, 2, 4, 5, 6, 6]
    );
}

#[test]
fn empty_snapshot_is_an_explicit_error() {
    let mut b = StoreBuilder::new();
    b.set_attr("NCores", AttrValue::I64Array(vec![1]));
    b.set_group_attr("Snap000", "NGalaxies", AttrValue::I64Array(vec![0]));
    let store = b.finish();
    let err = read_gals(&store, &ReadContext::new(), 0, None, None).unwrap_err();
    assert!(matches!(err, Error::EmptySnapshot(0)));
}

#[test]
fn missing_snapshot_is_an_explicit_error() {
    let store = fixture();
    let err = read_gals(&store, &ReadContext::new(), 7, None, None).unwrap_err();
    assert!(matches!(err, Error::MissingSnapshot(7)));
}

#[test]
fn declared_count_must_match_shard_sum() {
    let mut b = StoreBuilder::new();
    b.set_attr("NCores", AttrValue::I64Array(vec![1]));
    b.set_group_attr("Snap000", "NGalaxies", AttrValue::I64Array(vec![5]));
    b.create_dataset("Snap000/Core0/Galaxies")
        .with_records(make_batch(0, &[0, 0, 0]));
    let store = b.finish();
    let err = read_gals(&store, &ReadContext::new(), 0, None, None).unwrap_err();
    assert!(matches!(
        err,
        Error::ShardCountMismatch {
            expected: 5,
            got: 3,
            ..
        }
    ));
}

#[test]
fn shards_overrunning_declared_count_error() {
    // The mismatch must surface in the other direction too: shards holding
    // more records than NGalaxies declares.
    let mut b = StoreBuilder::new();
    b.set_attr("NCores", AttrValue::I64Array(vec![1]));
    b.set_group_attr("Snap000", "NGalaxies", AttrValue::I64Array(vec![3]));
    b.create_dataset("Snap000/Core0/Galaxies")
        .with_records(make_batch(0, &[0, 0, 0, 0, 0]));
    let store = b.finish();
    let err = read_gals(&store, &ReadContext::new(), 0, None, None).unwrap_err();
    assert!(matches!(
        err,
        Error::ShardCountMismatch {
            expected: 3,
            got: 5,
            ..
        }
    ));
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[test]
fn selection_gathers_across_cores_in_order() {
    let store = fixture();
    let gals = read_gals(&store, &ReadContext::new(), 1, None, Some(&[0, 4, 6])).unwrap();
    assert_eq!(gals.len(), 3);
    // Global 6 is core 2's local row 1.
    assert_eq!(gals.i32_column("ID").unwrap(), vec![0, 4, 11]);
}

#[test]
fn selected_records_equal_their_full_assembly_rows() {
    let store = fixture();
    let ctx = ReadContext::new();
    let full = read_gals(&store, &ctx, 1, None, None).unwrap();
    let picked = read_gals(&store, &ctx, 1, None, Some(&[0, 4, 6])).unwrap();
    for (out_row, &global) in [0usize, 4, 6].iter().enumerate() {
        assert_eq!(picked.row(out_row).unwrap(), full.row(global).unwrap());
    }
}

#[test]
fn selection_is_sorted_and_deduplicated() {
    let store = fixture();
    let gals = read_gals(&store, &ReadContext::new(), 1, None, Some(&[6, 0, 0, 4])).unwrap();
    assert_eq!(gals.i32_column("ID").unwrap(), vec![0, 4, 11]);
}

#[test]
fn selection_beyond_the_table_is_an_error() {
    let store = fixture();
    let err = read_gals(&store, &ReadContext::new(), 1, None, Some(&[0, 42])).unwrap_err();
    assert!(matches!(
        err,
        Error::SelectionOutOfRange {
            requested: 2,
            found: 1,
            ..
        }
    ));
}

// ---------------------------------------------------------------------------
// Property restriction
// ---------------------------------------------------------------------------

#[test]
fn props_restrict_the_schema_in_requested_order() {
    let store = fixture();
    let gals = read_gals(
        &store,
        &ReadContext::new(),
        1,
        Some(&["StellarMass", "ID"]),
        None,
    )
    .unwrap();
    let names: Vec<_> = gals.schema().names().collect();
    assert_eq!(names, vec!["StellarMass", "ID"]);
    assert_eq!(gals.schema().record_size(), 8);
    assert_eq!(gals.i32_column("ID").unwrap()[5], 10);
}

#[test]
fn single_prop_reads_work() {
    let store = fixture();
    let gals = read_gals(&store, &ReadContext::new(), 1, Some(&["StellarMass"]), None).unwrap();
    assert_eq!(gals.schema().fields().len(), 1);
    assert_eq!(gals.f32_column("StellarMass").unwrap().len(), 8);
}

#[test]
fn schema_needs_at_least_one_informative_core() {
    let mut b = StoreBuilder::new();
    b.set_attr("NCores", AttrValue::I64Array(vec![2]));
    b.set_group_attr("Snap000", "NGalaxies", AttrValue::I64Array(vec![3]));
    b.create_group("Snap000/Core0");
    b.create_group("Snap000/Core1");
    let store = b.finish();
    let err = read_gals(&store, &ReadContext::new(), 0, None, None).unwrap_err();
    assert!(matches!(err, Error::UnresolvableSchema(0)));
}

#[test]
fn unknown_prop_is_an_error() {
    let store = fixture();
    let err = read_gals(&store, &ReadContext::new(), 1, Some(&["Mvir"]), None).unwrap_err();
    assert!(matches!(err, Error::UnknownField(name) if name == "Mvir"));
}

// ---------------------------------------------------------------------------
// Linkage rebasing
// ---------------------------------------------------------------------------

#[test]
fn firstprogenitor_offsets_by_previous_snapshot_layout() {
    let store = fixture();
    // Snap000 offsets are [0, 4, 4]; sentinels pass through untouched.
    assert_eq!(
        read_firstprogenitor_indices(&store, 1).unwrap(),
        vec![-1, 0, 1, 3, -1, 4, 5, -1]
    );
}

#[test]
fn nextprogenitor_offsets_by_current_running_counter() {
    let store = fixture();
    assert_eq!(
        read_nextprogenitor_indices(&store, 1).unwrap(),
        vec![1, 2, -1, -1, 4, 6, -1, 7]
    );
}

#[test]
fn descendant_offsets_by_next_snapshot_layout() {
    let store = fixture();
    // Snap002 offsets are [0, 2, 5].
    assert_eq!(
        read_descendant_indices(&store, 1).unwrap(),
        vec![0, -1, 1, 0, -1, 5, -1, 5]
    );
}

#[test]
fn rebased_links_stay_in_target_range() {
    let store = fixture();
    for (kind, total) in [
        (LinkKind::FirstProgenitor, 6),
        (LinkKind::NextProgenitor, 8),
        (LinkKind::Descendant, 6),
    ] {
        for v in read_linkage(&store, 1, kind).unwrap() {
            assert!(v == -1 || (0..total).contains(&v), "{kind}: {v}");
        }
    }
}

#[test]
fn all_sentinel_shard_survives_any_offset() {
    let mut b = StoreBuilder::new();
    b.set_attr("NCores", AttrValue::I64Array(vec![2]));
    b.set_group_attr("Snap000", "NGalaxies", AttrValue::I64Array(vec![3]));
    b.create_dataset("Snap000/Core0/Galaxies")
        .with_records(make_batch(0, &[0, 0, 0]));
    b.create_dataset("Snap000/Core1/Galaxies")
        .with_records(RecordBatch::new(galaxy_schema()));
    b.set_group_attr("Snap001", "NGalaxies", AttrValue::I64Array(vec![2]));
    b.create_dataset("Snap001/Core0/Galaxies")
        .with_records(RecordBatch::new(galaxy_schema()));
    b.create_dataset("Snap001/Core1/Galaxies")
        .with_records(make_batch(0, &[0, 0]));
    // Both of core 1's values are sentinels; its previous-snapshot offset
    // of 3 must never leak into them.
    b.create_dataset("Snap001/Core1/FirstProgenitorIndices")
        .with_i32_data(&[-1, -1]);
    let store = b.finish();
    assert_eq!(
        read_firstprogenitor_indices(&store, 1).unwrap(),
        vec![-1, -1]
    );
}

#[test]
fn out_of_range_link_is_surfaced_not_clamped() {
    let mut b = StoreBuilder::new();
    b.set_attr("NCores", AttrValue::I64Array(vec![1]));
    b.set_group_attr("Snap000", "NGalaxies", AttrValue::I64Array(vec![2]));
    b.create_dataset("Snap000/Core0/Galaxies")
        .with_records(make_batch(0, &[0, 0]));
    b.set_group_attr("Snap001", "NGalaxies", AttrValue::I64Array(vec![1]));
    b.create_dataset("Snap001/Core0/Galaxies")
        .with_records(make_batch(0, &[0]));
    // Points at local row 5 of a 2-row previous snapshot: corrupt.
    b.create_dataset("Snap001/Core0/FirstProgenitorIndices").with_i32_data(&[5]);
    let store = b.finish();
    let err = read_firstprogenitor_indices(&store, 1).unwrap_err();
    assert!(matches!(
        err,
        Error::OutOfRangeLink {
            kind: LinkKind::FirstProgenitor,
            row: 0,
            value: 5,
            limit: 2,
        }
    ));
}

#[test]
fn adjacent_snapshot_is_a_precondition() {
    let store = fixture();
    assert!(matches!(
        read_firstprogenitor_indices(&store, 0).unwrap_err(),
        Error::MissingSnapshot(-1)
    ));
    assert!(matches!(
        read_descendant_indices(&store, 2).unwrap_err(),
        Error::MissingSnapshot(3)
    ));
}

// ---------------------------------------------------------------------------
// Repeatability
// ---------------------------------------------------------------------------

#[test]
fn repeated_reads_are_bit_identical() {
    let store = fixture();
    let ctx = ReadContext::with_little_h(0.7);
    let a = read_gals(&store, &ctx, 1, None, None).unwrap();
    let b = read_gals(&store, &ctx, 1, None, None).unwrap();
    assert_eq!(a.data(), b.data());
    assert_eq!(
        read_linkage(&store, 1, LinkKind::Descendant).unwrap(),
        read_linkage(&store, 1, LinkKind::Descendant).unwrap()
    );
}

// ---------------------------------------------------------------------------
// Hubble scaling
// ---------------------------------------------------------------------------

#[test]
fn hubble_scaling_applies_per_property() {
    let store = fixture();
    let plain = read_gals(&store, &ReadContext::new(), 1, None, None).unwrap();
    let scaled = read_gals(&store, &ReadContext::with_little_h(0.7), 1, None, None).unwrap();

    let before = plain.f32_column("StellarMass").unwrap();
    let after = scaled.f32_column("StellarMass").unwrap();
    for (b, a) in before.iter().zip(&after) {
        assert!((a - b / 0.7).abs() < 1e-5);
    }
    // Identity-converted integer columns are untouched.
    assert_eq!(plain.i32_column("ID").unwrap(), scaled.i32_column("ID").unwrap());
    // Spin has no recorded conversion: left unscaled, warned about.
    assert_eq!(plain.f32_column("Spin").unwrap(), scaled.f32_column("Spin").unwrap());
    assert!(scaled
        .warnings()
        .iter()
        .any(|w| matches!(w, ScalingWarning::UnknownProperty(p) if p == "Spin")));
}

#[test]
fn little_h_of_one_means_no_scaling() {
    let ctx = ReadContext::with_little_h(1.0);
    assert_eq!(ctx.little_h(), None);
}

// ---------------------------------------------------------------------------
// Snapshot catalogue
// ---------------------------------------------------------------------------

#[test]
fn negative_snapshots_count_back_from_the_last() {
    let store = fixture();
    assert_eq!(resolve_snapshot(&store, -1).unwrap(), 2);
    assert_eq!(resolve_snapshot(&store, -3).unwrap(), 0);
    assert!(matches!(
        resolve_snapshot(&store, -4),
        Err(Error::MissingSnapshot(-4))
    ));
    assert_eq!(grab_redshift(&store, -1).unwrap(), 7.0);
    assert_eq!(grab_unsampled_snapshot(&store, 1).unwrap(), 99);
}

#[test]
fn snaplist_collects_catalogued_groups_only() {
    let store = fixture();
    let list = read_snaplist(&store, &ReadContext::new()).unwrap();
    assert_eq!(list.snapshots, vec![0, 1, 2]);
    assert_eq!(list.redshifts, vec![9.0, 8.0, 7.0]);
    assert_eq!(list.lt_times, vec![100.0, 200.0, 300.0]);

    let scaled = read_snaplist(&store, &ReadContext::with_little_h(0.5)).unwrap();
    assert_eq!(scaled.lt_times, vec![200.0, 400.0, 600.0]);

    // A snapshot group missing the catalogue attributes is skipped, not
    // an error.
    let mut b = StoreBuilder::new();
    b.set_group_attr("Snap000", "Redshift", AttrValue::F64Array(vec![5.0]));
    b.set_group_attr("Snap000", "LTTime", AttrValue::F64Array(vec![10.0]));
    b.set_group_attr("Snap001", "NGalaxies", AttrValue::I64Array(vec![3]));
    let partial = read_snaplist(&b.finish(), &ReadContext::new()).unwrap();
    assert_eq!(partial.snapshots, vec![0]);
}

#[test]
fn closest_redshift_respects_tolerance() {
    let store = fixture();
    assert_eq!(check_for_redshift(&store, 8.04, 0.1).unwrap(), (1, 8.0));
    assert!(matches!(
        check_for_redshift(&store, 3.0, 0.1),
        Err(Error::NoMatchWithinTolerance { .. })
    ));
}

#[test]
fn closest_neutral_fraction_skips_unrecorded_snapshots() {
    let store = fixture();
    let (snap, z, xh) = check_for_global_xh(&store, 0.28, 0.05).unwrap();
    assert_eq!((snap, z), (1, 8.0));
    assert!((xh - 0.3).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Params, provenance, grids, spectra
// ---------------------------------------------------------------------------

#[test]
fn input_params_scale_and_derive_volume() {
    let store = fixture();
    let params = read_input_params(&store, &ReadContext::with_little_h(0.5)).unwrap();
    let box_size = params.params.get("BoxSize").unwrap().as_f64().unwrap();
    assert_eq!(box_size, 200.0);
    assert_eq!(params.volume, 200.0f64.powi(3));
    assert_eq!(params.git.reference, "abc1234");
    assert!(params.groups.contains_key("RecomGridParams"));

    // A context can also be seeded from the file's own Hubble_h.
    let ctx = ReadContext::from_params(&store).unwrap();
    assert_eq!(ctx.little_h(), Some(0.7));
}

#[test]
fn git_info_reads_ref_and_diff() {
    let store = fixture();
    let info = read_git_info(&store).unwrap();
    assert_eq!(info.reference, "abc1234");
    assert_eq!(info.diff, "");
}

#[test]
fn grids_reshape_to_cubes_and_scale() {
    let store = fixture();
    let ctx = ReadContext::new();
    let grid = read_grid(&store, &ctx, 1, "xH").unwrap();
    assert_eq!(grid.dim(), 4);
    assert_eq!(grid.data().len(), 64);
    assert_eq!(grid.at(3, 3, 3), 0.5);
    assert_eq!(grid.get(3, 3, 3), Some(0.5));
    assert_eq!(grid.get(4, 0, 0), None);

    let scaled = read_grid(&store, &ReadContext::with_little_h(0.5), 1, "deltax").unwrap();
    assert_eq!(scaled.at(0, 0, 0), 4.0);
    assert!(scaled.warning().is_none());

    assert!(matches!(
        read_grid(&store, &ctx, 1, "vel"),
        Err(Error::MissingDataset(_))
    ));
    assert_eq!(list_grids(&store, 1).unwrap(), vec!["deltax", "xH"]);
}

#[test]
fn power_spectrum_splits_its_columns() {
    let store = fixture();
    let ps = read_ps(&store, 1).unwrap();
    assert_eq!(ps.k, vec![0.1, 0.2]);
    assert_eq!(ps.power, vec![10.0, 20.0]);
    assert_eq!(ps.error, vec![1.0, 2.0]);
}

#[test]
fn size_distribution_splits_its_columns() {
    let store = fixture();
    let dist = read_size_dist(&store, 1).unwrap();
    assert_eq!(dist.r, vec![1.0, 2.0]);
    assert_eq!(dist.r_dp_dr, vec![0.1, 0.2]);
}

#[test]
fn global_xh_falls_back_and_degrades_to_nan() {
    let store = fixture();
    let xh = meraxes::read_global_xh(&store, &[0, 1, 2], XhWeight::Volume).unwrap();
    assert!(xh[0].is_nan());
    assert_eq!(xh[1], 0.3);
    assert_eq!(xh[2], 0.1); // legacy attribute name
    let mass = meraxes::read_global_xh(&store, &[1, 2], XhWeight::Mass).unwrap();
    assert_eq!(mass[0], 0.25);
    assert!(mass[1].is_nan());
}
