//! Derives storage controller topology from legacy disk attributes.

use crate::core::attrs::{AttributeMap, DISK_COUNT_ATTR, DiskAttrKey};
use crate::inventory::DeviceList;

/// Historical cap on disks per SCSI controller.
const DISKS_PER_CONTROLLER: i32 = 15;

/// Returns the highest SCSI controller bus number in use.
///
/// The baseline is the legacy disk slot count divided by the historical
/// per-controller limit; any SCSI controller reachable through a valid
/// `disk.<n>.key` device reference can raise it. Non-positive device keys,
/// unknown devices and unknown controllers are skipped; surviving
/// topology data is best-effort by nature.
pub fn derive_bus_count(attributes: &AttributeMap, devices: &DeviceList) -> i32 {
    let disk_count: i32 = attributes
        .get(DISK_COUNT_ATTR)
        .and_then(|count| count.parse().ok())
        .unwrap_or(0);
    let mut max_bus = disk_count / DISKS_PER_CONTROLLER;

    for (key, value) in attributes {
        let Some(parsed) = DiskAttrKey::parse(key) else {
            continue;
        };
        if parsed.field != "key" {
            continue;
        }
        let device_key: i32 = match value.parse() {
            Ok(device_key) if device_key >= 1 => device_key,
            _ => continue,
        };
        let Some(device) = devices.find_by_key(device_key) else {
            continue;
        };
        let Some(controller) = devices.find_by_key(device.controller_key) else {
            continue;
        };
        if let Some(bus_number) = controller.scsi_bus_number() {
            if bus_number > max_bus {
                max_bus = bus_number;
            }
        }
    }

    max_bus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{DeviceClass, VirtualDevice};

    fn hardware_with_scsi_bus(bus_number: i32) -> DeviceList {
        DeviceList(vec![
            VirtualDevice {
                key: 1000,
                controller_key: 100,
                class: DeviceClass::ScsiController { bus_number },
            },
            VirtualDevice {
                key: 2000,
                controller_key: 1000,
                class: DeviceClass::Disk,
            },
        ])
    }

    #[test]
    fn test_baseline_from_disk_count() {
        let mut attrs = AttributeMap::new();
        attrs.insert(DISK_COUNT_ATTR.to_string(), "20".to_string());

        assert_eq!(derive_bus_count(&attrs, &DeviceList::default()), 1);
    }

    #[test]
    fn test_controller_bus_raises_baseline() {
        let mut attrs = AttributeMap::new();
        attrs.insert(DISK_COUNT_ATTR.to_string(), "5".to_string());
        attrs.insert("disk.0.key".to_string(), "2000".to_string());

        assert_eq!(derive_bus_count(&attrs, &hardware_with_scsi_bus(3)), 3);
    }

    #[test]
    fn test_lower_controller_bus_does_not_lower_baseline() {
        let mut attrs = AttributeMap::new();
        attrs.insert(DISK_COUNT_ATTR.to_string(), "45".to_string());
        attrs.insert("disk.0.key".to_string(), "2000".to_string());

        assert_eq!(derive_bus_count(&attrs, &hardware_with_scsi_bus(1)), 3);
    }

    #[test]
    fn test_invalid_and_unknown_references_are_skipped() {
        let mut attrs = AttributeMap::new();
        attrs.insert("disk.0.key".to_string(), "0".to_string());
        attrs.insert("disk.1.key".to_string(), "-5".to_string());
        attrs.insert("disk.2.key".to_string(), "junk".to_string());
        attrs.insert("disk.3.key".to_string(), "9999".to_string());

        assert_eq!(derive_bus_count(&attrs, &hardware_with_scsi_bus(3)), 0);
    }

    #[test]
    fn test_unparsable_disk_count_is_zero() {
        let mut attrs = AttributeMap::new();
        attrs.insert(DISK_COUNT_ATTR.to_string(), "many".to_string());

        assert_eq!(derive_bus_count(&attrs, &DeviceList::default()), 0);
    }

    #[test]
    fn test_non_scsi_controller_is_ignored() {
        let devices = DeviceList(vec![
            VirtualDevice {
                key: 1000,
                controller_key: 100,
                class: DeviceClass::Other,
            },
            VirtualDevice {
                key: 2000,
                controller_key: 1000,
                class: DeviceClass::Disk,
            },
        ]);
        let mut attrs = AttributeMap::new();
        attrs.insert("disk.0.key".to_string(), "2000".to_string());

        assert_eq!(derive_bus_count(&attrs, &devices), 0);
    }
}
