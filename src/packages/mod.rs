use std::io::{self, Write};

pub mod chd;
pub mod dis;
pub mod ic;
pub mod ims;
pub mod npf;
pub mod oc;
pub mod tdis;

pub use chd::{Chd, ConstantHeadRecord};
pub use dis::Dis;
pub use ic::Ic;
pub use ims::{Complexity, Ims};
pub use npf::Npf;
pub use oc::{Frequency, Oc, OutputKind, OutputRecord};
pub use tdis::{StressPeriod, Tdis, TimeUnits};

/// One input file of the engine's deck.
pub trait Package {
    /// File type as listed in a namefile, e.g. `DIS6`.
    fn ftype(&self) -> &'static str;

    /// File extension, e.g. `dis`.
    fn extension(&self) -> &'static str;

    fn package_name(&self) -> &str;

    fn write_to(&self, output: &mut dyn Write) -> io::Result<()>;

    fn to_deck_string(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
