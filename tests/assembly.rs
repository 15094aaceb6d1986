use std::fs;

use gwf6::{
    packages::{Complexity, Frequency, OutputKind, TimeUnits},
    post::IBound,
    CellId, TutorialParams,
};

const SHAPE: (usize, usize, usize) = (10, 101, 101);

#[test]
fn tutorial_arrays_match_the_grid() {
    let sim = TutorialParams::default().build_simulation().unwrap();
    let model = sim.model();

    assert_eq!(model.grid().shape(), SHAPE);
    assert_eq!(model.grid().botm().len(), 10);
    assert_eq!(model.ic().unwrap().strt.shape(), SHAPE);
    assert_eq!(model.npf().unwrap().k.shape(), SHAPE);
    assert!(model.chd()[0].cells().all(|c| model.grid().contains(c)));
}

#[test]
fn boundary_record_count() {
    let sim = TutorialParams::default().build_simulation().unwrap();
    let chd = &sim.model().chd()[0];

    // two interior cells plus 4 × (101 − 1) face cells per layer
    assert_eq!(chd.len(), 2 + 10 * (4 * 101 - 4));
    assert_eq!(chd.len(), 4002);
    assert_eq!(chd.maxbound(), chd.len());
    assert!(chd.save_flows);

    let faces = &chd.records()[2..];
    assert!(faces.iter().all(|r| r.head == 100.0));
    assert!(faces
        .iter()
        .all(|r| r.cell.row == 0 || r.cell.row == 100 || r.cell.col == 0 || r.cell.col == 100));

    let ibound = IBound::from_chd(sim.model().grid(), sim.model().chd());
    assert_eq!(ibound.count(-1), 4002);
}

#[test]
fn starting_heads_are_uniform() {
    let sim = TutorialParams::default().build_simulation().unwrap();
    let strt = &sim.model().ic().unwrap().strt;
    assert!(strt.is_uniform());
    assert!(strt.values().all(|h| h == 100.0));
}

#[test]
fn conductivity_is_uniform_except_one_layer() {
    let sim = TutorialParams::default().build_simulation().unwrap();
    let npf = sim.model().npf().unwrap();

    assert_eq!(npf.icelltype, 1);
    assert!(npf.save_flows && npf.save_specific_discharge);
    for layer in 0..10 {
        let expected = if layer == 1 { 0.5 } else { 1.0 };
        assert_eq!(npf.k.layer_constant(layer), Some(expected), "layer {layer}");
    }
}

#[test]
fn assembly_is_idempotent() {
    let params = TutorialParams::default();
    assert_eq!(
        params.build_simulation().unwrap(),
        params.build_simulation().unwrap()
    );
}

#[test]
fn simulation_settings() {
    let sim = TutorialParams::default().build_simulation().unwrap();

    assert_eq!(sim.name(), "ejercicio1");
    assert_eq!(sim.version(), "mf6");
    assert_eq!(sim.tdis().time_units, TimeUnits::Days);
    assert_eq!(sim.tdis().nper(), 1);
    assert_eq!(sim.ims().complexity, Complexity::Simple);

    let oc = sim.model().oc().unwrap();
    assert_eq!(oc.head_file.as_deref(), Some("ejercicio1.hds"));
    assert_eq!(oc.budget_file.as_deref(), Some("ejercicio1.cbb"));
    assert_eq!(oc.save[0].kind, OutputKind::Head);
    assert_eq!(oc.save[1].kind, OutputKind::Budget);
    assert_eq!(oc.print[0].frequency, Frequency::Last);
    assert!(sim.head_file().unwrap().ends_with("ejercicio1.hds"));
}

#[test]
fn deck_is_written_to_the_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let params = TutorialParams {
        workspace: dir.path().join("Workspace"),
        ..Default::default()
    };
    let sim = params.build_simulation().unwrap();

    let written = sim.write().unwrap();
    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "mfsim.nam",
            "ejercicio1.tdis",
            "ejercicio1.ims",
            "ejercicio1.nam",
            "ejercicio1.dis",
            "ejercicio1.ic",
            "ejercicio1.npf",
            "ejercicio1.chd",
            "ejercicio1.oc",
        ]
    );

    let chd = fs::read_to_string(sim.path("ejercicio1.chd")).unwrap();
    assert!(chd.contains("MAXBOUND  4002\n"));
    let period_lines = chd
        .lines()
        .skip_while(|l| !l.starts_with("BEGIN period"))
        .skip(1)
        .take_while(|l| !l.starts_with("END period"))
        .count();
    assert_eq!(period_lines, 4002);
    assert!(chd.contains(&format!("  {} 9e1\n", CellId::new(0, 25, 25))));
    assert!(chd.contains("  2 76 76 8.5e1\n"));

    let npf = fs::read_to_string(sim.path("ejercicio1.npf")).unwrap();
    assert_eq!(npf.matches("CONSTANT  5e-1").count(), 1);
    assert_eq!(npf.matches("CONSTANT  1e0").count(), 9);

    let nam = fs::read_to_string(sim.path("ejercicio1.nam")).unwrap();
    assert!(nam.contains("  CHD6 ejercicio1.chd chd_0\n"));

    let oc = fs::read_to_string(sim.path("ejercicio1.oc")).unwrap();
    assert!(oc.contains("HEAD  FILEOUT  ejercicio1.hds"));
}
