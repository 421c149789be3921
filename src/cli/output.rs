use crate::infrastructure::serial::PortSummary;
use std::io::{self, Write};
use tabled::{Table, Tabled};

pub const BANNER: &str = "Commandline Serial Terminal";

/// Usage text shown when no port is given or the port cannot be opened.
/// The `^` markers point at the default of each argument.
pub fn usage(exe: &str) -> String {
    format!(
        "\
{exe} port [speed] [DisplayMode] [Separator] [Echo] [logfilename]
        port ::= com1 | com2 | ... | /dev/ttyS0 | /dev/ttyUSB0 | ...
        speed::= 300 | 4800 | 9600 | 19200 | 38400 | 57600 | 115200 | 230400
                                     ^^^^^
        DisplayMode::= ascii | hex | decimal
                       ^^^^^
        Separator::= empty | space | newline | tab
                     ^^^^^
        Echo::= no | yes
                ^^
        logfilename::= <anyname> (if not provided no log is written)

Example: {exe} com1 115200 hex space no log.txt
    open the terminal on port com1 with 115200 bit/s, print hex code of
    incoming characters, separate them by space, no local echo, log to log.txt
Example: {exe} com2 19200 decimal tab yes
    open the terminal on port com2 with 19200 bit/s, print decimal code
    of incoming characters, separate them by tabs, do local echo, no logfile
"
    )
}

pub fn write_usage(out: &mut impl Write, exe: &str) -> io::Result<()> {
    out.write_all(usage(exe).as_bytes())?;
    out.flush()
}

#[derive(Tabled)]
struct PortRow {
    port: String,
    #[tabled(rename = "type")]
    kind: String,
    description: String,
}

impl From<&PortSummary> for PortRow {
    fn from(port: &PortSummary) -> Self {
        Self {
            port: port.name.clone(),
            kind: port.kind.clone(),
            description: port.description.clone(),
        }
    }
}

/// Table of serial ports, or a note when there are none
pub fn ports_table(ports: &[PortSummary]) -> String {
    if ports.is_empty() {
        return "No serial ports found".to_string();
    }
    Table::new(ports.iter().map(PortRow::from)).to_string()
}
