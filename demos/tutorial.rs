use std::{
    env, fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use tracing::info;

use gwf6::{
    post::{self, IBound},
    BudgetFile, Driver, HeadFile, Logger, TutorialParams,
};

fn main() -> Result<(), gwf6::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("setting up parameters");

    let mut params = match env::args().nth(1) {
        Some(path) => TutorialParams::from_file(path)?,
        None => TutorialParams::default(),
    };
    if let Ok(exe) = env::var("MF6_EXE") {
        params.exe = exe.into();
    }

    let sim = params.build_simulation()?;
    info!("problem summary: {sim}");

    sim.write()?;

    Driver::new(&sim).with_observer(Logger).run()?.check()?;

    info!("reading results");

    let grid = sim.model().grid();
    let hds = HeadFile::open(sim.path(params.head_file()))?;
    let h = hds.get_data((0, 0))?;
    for s in post::summarize(&h) {
        info!(
            "layer {}: head {:.2} .. {:.2} (mean {:.2})",
            s.layer + 1,
            s.min,
            s.max,
            s.mean
        );
    }

    let ibound = IBound::from_chd(grid, sim.model().chd());
    info!(
        "{} constant-head cell(s), {} active cell(s)",
        ibound.count(-1),
        ibound.count(1)
    );

    info!("exporting sections");

    let out_dir = sim.path("post");
    fs::create_dir_all(&out_dir)?;
    let (x, y) = post::coordinates(grid);
    let z = grid.layer_midpoints();
    let last = grid.nlay() - 1;
    let row = grid.nrow() / 2;

    export(&out_dir.join("layer_1.csv"), |o| {
        post::write_plane_csv(&post::layer(&h, 0), &x, &y, o)
    })?;
    export(&out_dir.join(format!("layer_{}.csv", last + 1)), |o| {
        post::write_plane_csv(&post::layer(&h, last), &x, &y, o)
    })?;
    export(&out_dir.join(format!("row_{}.csv", row + 1)), |o| {
        post::write_plane_csv(&post::cross_section(&h, row), &x, &z, o)
    })?;

    let cbb = BudgetFile::open(sim.path(params.budget_file()))?;
    let (qx, qy, _qz) = cbb.specific_discharge(grid, (0, 0))?;
    export(&out_dir.join("discharge_1.csv"), |o| {
        post::write_vectors_csv(qx.layer(0), qy.layer(0), &x, &y, o)
    })?;

    let levels = post::contour_levels(params.h2, params.h1 + 0.1, 0.2);
    info!(
        "exported to {} ({} contour levels suggested)",
        out_dir.display(),
        levels.len()
    );
    info!("done");

    Ok(())
}

fn export(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<fs::File>) -> io::Result<()>,
) -> io::Result<()> {
    let mut output = BufWriter::new(fs::File::create(path)?);
    write(&mut output)?;
    output.flush()
}
