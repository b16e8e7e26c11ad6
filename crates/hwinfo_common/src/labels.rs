//! Label Resolver - raw inventory keys to human labels and icons.
//!
//! Keys come from the probing backend and are machine-generated, so every
//! key that reaches the UI goes through this table on its way out.
//!
//! Rules:
//! - Unknown keys are shown as-is (a debug diagnostic is emitted)
//! - Lookups never fail
//! - Tables are read-only and built once per process

use crate::raw_value::{RawValue, Scalar};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

/// Fallback label for a compound list element with no representative key.
pub const PLACEHOLDER: &str = "→";

/// Representative label used for maps carrying kernel modules.
pub const MODULES_LABEL: &str = "Modules";

pub const YES: &str = "Yes";
pub const NO: &str = "No";

/// Display label and icon id for a raw key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelEntry {
    pub label: &'static str,
    pub icon: &'static str,
}

// (raw key, label, icon)
const LABELS: &[(&str, &str, &str)] = &[
    ("architecture", "Architecture", "yast-hardware"),
    ("bus", "Bus", "yast-hardware"),
    ("bus_id", "Bus ID", "yast-hardware"),
    ("card_type", "Card Type", "yast-hardware"),
    ("cardtype", "Card Type", "yast-hardware"),
    ("class_id", "Class", "yast-hardware"),
    ("cdtype", "CD Type", "yast-cd"),
    ("dev_name", "Device Name", "yast-hardware"),
    ("dev_num", "Device Numbers", "yast-hardware"),
    ("sysfs_id", "Sysfs ID", "yast-hardware"),
    ("device", "Device", "yast-hardware"),
    ("device_id", "Device Identifier", "yast-hardware"),
    ("drivers", "Drivers", "yast-hardware"),
    ("driver", "Driver", "yast-hardware"),
    ("type", "Type", "yast-hardware"),
    ("major", "Major", "yast-partitioning"),
    ("minor", "Minor", "yast-partitioning"),
    ("range", "Range", "yast-hardware"),
    ("smbios", "SMBIOS", "yast-hardware"),
    ("prog_if", "Interface", "yast-hardware"),
    ("resource", "Resources", "yast-hardware"),
    ("requires", "Requires", "yast-hardware"),
    ("rev", "Revision", "yast-hardware"),
    ("slot_id", "Slot ID", "yast-hardware"),
    ("length", "Length", "yast-hardware"),
    ("width", "Width", "yast-hardware"),
    ("height", "Height", "yast-hardware"),
    ("active", "Active", "yast-hardware"),
    ("dev_names", "Device Names", "yast-hardware"),
    ("color", "Colors", "yast-hardware"),
    ("disk_log_geo", "Logical Geometry", "yast-hardware"),
    ("count", "Count", "yast-hardware"),
    ("mode", "Mode", "yast-hardware"),
    ("irq", "IRQ", "yast-hardware"),
    ("io", "IO Port", "yast-hardware"),
    ("mem", "Memory", "yast-hardware"),
    ("dma", "DMA", "yast-hardware"),
    ("bus_hwcfg", "Hwcfg Bus", "yast-hardware"),
    ("sysfs_bus_id", "Sysfs ID", "yast-hardware"),
    ("parent_unique_key", "Parent Unique ID", "yast-hardware"),
    ("udi", "UDI", "yast-hardware"),
    ("uniqueid", "Unique ID", "yast-x11"),
    ("vfreq", "Vertical Frequency", "yast-x11"),
    ("max_hsync", "Max. Horizontal Frequency", "yast-x11"),
    ("max_vsync", "Max. Vertical Frequency", "yast-x11"),
    ("min_hsync", "Min. Horizontal Frequency", "yast-x11"),
    ("min_vsync", "Min. Vertical Frequency", "yast-x11"),
    ("dvd", "DVD", "yast-cdrom"),
    ("driver_module", "Kernel Driver", "yast-hardware"),
    ("hwaddr", "HW Address", "yast-hardware"),
    ("bios_id", "BIOS ID", "yast-hardware"),
    ("enabled", "Enabled", "yast-hardware"),
    ("monitor_resol", "Resolution", "yast-x11"),
    ("size", "Size", "yast-x11"),
    ("old_unique_key", "Old Unique Key", "yast-x11"),
    ("sub_class_id", "Class (spec)", "yast-x11"),
    ("sub_device", "Device (spec)", "yast-x11"),
    ("sub_device_id", "Device Identifier (spec)", "yast-x11"),
    ("sub_vendor", "Subvendor", "yast-x11"),
    ("sub_vendor_id", "Subvendor Identifier", "yast-x11"),
    ("unique_key", "Unique Key", "yast-x11"),
    ("vendor", "Vendor", "yast-x11"),
    ("bios_video", "BIOS Video", "yast-x11"),
    ("boot_arch", "Boot Architecture", "yast-bootloader"),
    ("boot_disk", "Boot Disk", "yast-bootloader"),
    ("block", "Block Devices", "yast-disk"),
    ("redasd", "DASD Disks", "yast-dasd"),
    ("cdrom", "CD-ROM", "yast-cdrom"),
    ("cpu", "CPU", "yast-hardware"),
    ("disk", "Disk", "yast-disk"),
    ("display", "Display", "yast-x11"),
    ("floppy", "Floppy Disk", "yast-floppy"),
    ("framebuffer", "Framebuffer", "yast-x11"),
    ("has_apm", "Has APM", "yast-power-management"),
    ("has_pcmcia", "Has PCMCIA", "yast-hardware"),
    ("has_smp", "Has SMP", "yast-hardware"),
    ("is_uml", "UML System", "yast-vm-management"),
    ("ihw_data", "Hardware Data", "yast-hardware"),
    ("isdn", "ISDN", "yast-isdn"),
    ("keyboard", "Keyboard", "yast-keyboard"),
    ("monitor", "Monitor", "yast-x11"),
    ("netdev", "Network Devices", "yast-lan"),
    ("netif", "Network Interface", "yast-lan"),
    ("printer", "Printer", "yast-printer"),
    ("modem", "Modem", "yast-modem"),
    ("sound", "Sound", "yast-sound"),
    ("storage", "Storage Media", "yast-disk"),
    ("system", "System", "yast-hardware"),
    ("tv", "TV Card", "yast-tv"),
    ("dvb", "DVB Card", "yast-tv"),
    ("usb_type", "USB Type", "yast-hardware"),
    ("version", "Version", "yast-hardware"),
    ("memory", "Memory", "yast-hardware"),
    ("netcard", "Network Card", "yast-lan"),
    ("bios", "BIOS", "yast-hardware"),
    ("fbdev", "Framebuffer Device", "yast-x11"),
    ("ide", "IDE", "yast-disk"),
    ("pci", "PCI", "yast-hardware"),
    ("usb", "USB", "yast-hardware"),
    ("isapnp", "ISA PnP", "yast-hardware"),
    ("usbctrl", "USB Controller", "yast-hardware"),
    ("hub", "USB Hub", "yast-hardware"),
    ("ieee1394ctrl", "IEEE1394 Controller", "yast-hardware"),
    ("scsi", "SCSI", "yast-hardware"),
    ("scanner", "Scanner", "yast-scanner"),
    ("mouse", "Mouse", "yast-mouse"),
    ("joystick", "Joystick", "yast-joystick"),
    ("braille", "Braille Display", "yast-hardware"),
    ("chipcard", "Chipcard Reader", "yast-hardware"),
    ("camera", "Camera", "yast-hardware"),
    ("pppoe", "PPP over Ethernet", "yast-dsl"),
    ("bogomips", "Bogus Millions of Instructions Per Second", "yast-hardware"),
    ("cache", "Cache", "yast-hardware"),
    ("coma_bug", "Coma Bug", "yast-hardware"),
    ("f00f_bug", "f00f Bug", "yast-hardware"),
    ("cpuid_level", "CPU ID Level", "yast-hardware"),
    ("mhz", "Frequency", "yast-hardware"),
    ("fdiv_bug", "Floating point division bug", "yast-hardware"),
    ("flags", "Flags", "yast-hardware"),
    ("fpu", "Floating Point Unit", "yast-hardware"),
    ("fpu_exception", "Floating Point Unit Exception", "yast-hardware"),
    ("hlt_bug", "Halt Bug", "yast-hardware"),
    ("processor", "Processor", "yast-hardware"),
    ("stepping", "Stepping", "yast-hardware"),
    ("vendor_id", "Vendor Identifier", "yast-hardware"),
    ("family", "Family", "yast-hardware"),
    ("model", "Model", "yast-hardware"),
    ("wp", "WP", "yast-hardware"),
    ("wlan", "Wireless LAN", "yast-wifi"),
    ("tape", "Tape", "yast-hardware"),
    ("bluetooth", "Bluetooth", "yast-bluetooth"),
    ("dsl", "DSL", "yast-dsl"),
    // Generic device names reported by the backend
    ("Ethernet network interface", "Ethernet Network Interface", "yast-lan"),
    ("Network Interface", "Network Interface", "yast-lan"),
    ("Loopback network interface", "Loopback Network Interface", "yast-lan"),
    ("Partition", "Partition", "yast-disk"),
    ("Floppy Disk", "Floppy Disk", "yast-floppy"),
    ("Floppy disk controller", "Floppy Disk Controller", "yast-floppy"),
    ("PnP Unclassified device", "PnP Unclassified Device", "yast-hardware"),
    ("Unclassified device", "Unclassified Device", "yast-hardware"),
    ("Main Memory", "Main Memory", "yast-hardware"),
    ("UHCI Host Controller", "UHCI Host Controller", "yast-hardware"),
    ("EHCI Host Controller", "EHCI Host Controller", "yast-hardware"),
    ("OHCI Host Controller", "OHCI Host Controller", "yast-hardware"),
    // The walk starts at "probe", which holds no hardware information itself
    ("probe", "", "yast-hardware"),
];

/// Keys tried, in order, when picking a one-line label for a map.
const REPRESENTATIVE_ORDER: &[&str] = &[
    "sub_device",
    "device",
    "model name",
    "model",
    "vendor",
    "irq",
    "start",
    "name",
    "xkbmodel",
    "server",
    "size",
    "unit",
    "width",
    "cylinders",
    "dev_name",
    "modules",
    "sub_class_id",
    "type",
];

static LABEL_TABLE: Lazy<HashMap<&'static str, LabelEntry>> = Lazy::new(|| {
    LABELS
        .iter()
        .map(|&(key, label, icon)| (key, LabelEntry { label, icon }))
        .collect()
});

/// Full table entry for `key`, if configured.
pub fn entry(key: &str) -> Option<LabelEntry> {
    LABEL_TABLE.get(key).copied()
}

/// Display label for `key`, or `key` itself when no translation exists.
pub fn label_of(key: &str) -> String {
    match LABEL_TABLE.get(key) {
        Some(entry) => entry.label.to_string(),
        None => {
            debug!("Missing translation for '{}'", key);
            key.to_string()
        }
    }
}

/// Icon id for `key`, if configured.
pub fn icon_of(key: &str) -> Option<&'static str> {
    match LABEL_TABLE.get(key) {
        Some(entry) => Some(entry.icon),
        None => {
            debug!("Missing icon for '{}'", key);
            None
        }
    }
}

pub fn representative_order() -> &'static [&'static str] {
    REPRESENTATIVE_ORDER
}

pub fn yes_no(b: bool) -> &'static str {
    if b {
        YES
    } else {
        NO
    }
}

/// Value part of a `"<label>: <value>"` line. Booleans read as Yes/No.
pub fn render_scalar_value(value: &RawValue) -> String {
    match value {
        RawValue::Scalar(Scalar::Bool(b)) => yes_no(*b).to_string(),
        other => other.stringify(),
    }
}

/// `"<label_of(key)>: <rendered value>"`
pub fn key_value_label(key: &str, value: &RawValue) -> String {
    format!("{}: {}", label_of(key), render_scalar_value(value))
}
