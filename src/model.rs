use std::io::{self, Write};

use crate::{
    deck::DeckWriter,
    grid::{Discretization, ShapeError},
    packages::{Chd, Dis, Ic, Npf, Oc, Package},
};

/// Groundwater-flow model: a grid and the packages attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct GwfModel {
    name: String,
    dis: Dis,
    ic: Option<Ic>,
    npf: Option<Npf>,
    chd: Vec<Chd>,
    oc: Option<Oc>,
}

impl GwfModel {
    pub fn new(name: impl AsRef<str>, grid: Discretization) -> Self {
        Self {
            name: name.as_ref().to_string(),
            dis: Dis::new(grid),
            ic: None,
            npf: None,
            chd: Vec::new(),
            oc: None,
        }
    }

    pub fn with_ic(mut self, ic: Ic) -> Result<Self, ShapeError> {
        ic.strt.check_shape(self.grid().shape())?;
        self.ic = Some(ic);
        Ok(self)
    }

    pub fn with_npf(mut self, npf: Npf) -> Result<Self, ShapeError> {
        npf.k.check_shape(self.grid().shape())?;
        self.npf = Some(npf);
        Ok(self)
    }

    pub fn with_chd(mut self, chd: Chd) -> Result<Self, ShapeError> {
        chd.check(self.grid())?;
        self.chd.push(chd);
        Ok(self)
    }

    pub fn with_oc(mut self, oc: Oc) -> Self {
        self.oc = Some(oc);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namefile(&self) -> String {
        format!("{}.nam", self.name)
    }

    pub fn grid(&self) -> &Discretization {
        self.dis.grid()
    }

    pub fn ic(&self) -> Option<&Ic> {
        self.ic.as_ref()
    }

    pub fn npf(&self) -> Option<&Npf> {
        self.npf.as_ref()
    }

    pub fn chd(&self) -> &[Chd] {
        &self.chd
    }

    pub fn oc(&self) -> Option<&Oc> {
        self.oc.as_ref()
    }

    /// Attached packages paired with their file names, in namefile order.
    pub fn packages(&self) -> Vec<(String, &dyn Package)> {
        let mut packages: Vec<&dyn Package> = Vec::new();
        packages.push(&self.dis);
        if let Some(ic) = &self.ic {
            packages.push(ic);
        }
        if let Some(npf) = &self.npf {
            packages.push(npf);
        }
        for chd in &self.chd {
            packages.push(chd);
        }
        if let Some(oc) = &self.oc {
            packages.push(oc);
        }

        let mut seen: Vec<&'static str> = Vec::new();
        packages
            .into_iter()
            .map(|p| {
                let count = seen.iter().filter(|&&e| e == p.extension()).count();
                seen.push(p.extension());
                let file = match count {
                    0 => format!("{}.{}", self.name, p.extension()),
                    n => format!("{}_{}.{}", self.name, n, p.extension()),
                };
                (file, p)
            })
            .collect()
    }

    pub fn write_namefile(&self, output: &mut dyn Write) -> io::Result<()> {
        let mut deck = DeckWriter::new(output);
        deck.block("options", |_| Ok(()))?;
        deck.block("packages", |d| {
            for (file, p) in self.packages() {
                d.line(&[&p.ftype(), &file, &p.package_name()])?;
            }
            Ok(())
        })?;
        deck.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{array::LayeredArray, grid::CellId};

    fn grid() -> Discretization {
        Discretization::uniform_layers(2, 4, 3.0, 2.0).unwrap()
    }

    #[test]
    fn attaching_mismatched_arrays_fails() {
        let bad = Ic::new(LayeredArray::constant(2, 4, 5, 1.0));
        let err = GwfModel::new("m", grid()).with_ic(bad).unwrap_err();
        assert_eq!(
            err,
            ShapeError::Mismatch {
                expected: (2, 4, 4),
                found: (2, 4, 5)
            }
        );
    }

    #[test]
    fn repeated_package_kinds_get_distinct_files() {
        let model = GwfModel::new("m", grid())
            .with_chd(Chd::new("chd_0").with_record(CellId::new(0, 0, 0), 1.0))
            .unwrap()
            .with_chd(Chd::new("chd_1").with_record(CellId::new(1, 3, 3), 1.0))
            .unwrap()
            .with_oc(Oc::new());

        let files: Vec<_> = model.packages().into_iter().map(|(f, _)| f).collect();
        assert_eq!(files, ["m.dis", "m.chd", "m_1.chd", "m.oc"]);

        let mut buffer = Vec::new();
        model.write_namefile(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("  DIS6 m.dis dis\n"));
        assert!(text.contains("  CHD6 m_1.chd chd_1\n"));
    }
}
