use crate::domain::error::TermResult;
use serialport::SerialPortType;

/// A serial port present on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSummary {
    pub name: String,
    pub kind: String,
    pub description: String,
}

/// Lists the serial ports the OS reports
pub fn available_ports() -> TermResult<Vec<PortSummary>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|info| {
            let (kind, description) = describe(&info.port_type);
            PortSummary {
                name: info.port_name,
                kind,
                description,
            }
        })
        .collect())
}

fn describe(port_type: &SerialPortType) -> (String, String) {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let product = usb.product.clone().unwrap_or_default();
            let description = match &usb.manufacturer {
                Some(manufacturer) if !product.is_empty() => format!("{} {}", manufacturer, product),
                Some(manufacturer) => manufacturer.clone(),
                None => product,
            };
            (
                format!("usb {:04x}:{:04x}", usb.vid, usb.pid),
                description,
            )
        }
        SerialPortType::PciPort => ("pci".to_string(), String::new()),
        SerialPortType::BluetoothPort => ("bluetooth".to_string(), String::new()),
        SerialPortType::Unknown => ("unknown".to_string(), String::new()),
    }
}
