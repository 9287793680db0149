//! Analog Pocket (openFPGA) cartridge and APF connector surface.
//!
//! The Pocket's core FPGA is an Intel Cyclone V `5CEBA4F23C8`. Its physical
//! surface is exposed to cores through the APF (Analog Pocket Framework)
//! connector: cartridge port transceivers, link port, the scaler video and
//! audio interface, the bridge SPI bus, two cellular RAMs, SDRAM, SRAM, and a
//! handful of single-wire control lines.
//!
//! Pin placement and I/O standards come from the APF template project, so the
//! groups here carry no physical constraints.

use crate::error::RegistryError;
use crate::group::{SignalField, SignalGroup};
use crate::registry::{PlatformInfo, ProgrammingDefaults, RegistryBuilder, SignalRegistry};
use tether_common::Direction::{self, InOut, Input, Output};
use tether_config::{ProgramMode, ProgrammerKind};

/// Platform id.
pub const ID: &str = "analog_pocket";

/// Device part number of the Pocket's core FPGA.
pub const DEVICE: &str = "5CEBA4F23C8";

type FieldSpec = (&'static str, Direction, u32);

/// Groups declared as one signal.
const SCALARS_HEAD: &[FieldSpec] = &[("clk_74a", Input, 1), ("clk_74b", Input, 1)];

const CART: &[FieldSpec] = &[
    ("tran_bank2", InOut, 8),
    ("tran_bank2_dir", Output, 1),
    ("tran_bank3", InOut, 8),
    ("tran_bank3_dir", Output, 1),
    ("tran_bank1", InOut, 8),
    ("tran_bank1_dir", Output, 1),
    ("tran_bank0", InOut, 4),
    ("tran_bank0_dir", Output, 1),
    ("tran_pin30", InOut, 1),
    ("tran_pin30_dir", Output, 1),
    ("pin30_pwroff_reset", Output, 1),
    ("tran_pin31", InOut, 1),
    ("tran_pin31_dir", Output, 1),
];

const PORT_IR: &[FieldSpec] = &[
    ("rx", Input, 1),
    ("tx", Output, 1),
    ("rx_disable", Output, 1),
];

const PORT_TRAN: &[FieldSpec] = &[
    ("si", InOut, 1),
    ("si_dir", Output, 1),
    ("so", InOut, 1),
    ("so_dir", Output, 1),
    ("sck", InOut, 1),
    ("sck_dir", Output, 1),
    ("sd", InOut, 1),
    ("sd_dir", Output, 1),
];

const SCAL: &[FieldSpec] = &[
    ("vid", InOut, 12),
    ("clk", InOut, 1),
    ("de", InOut, 1),
    ("skip", InOut, 1),
    ("vs", InOut, 1),
    ("hs", InOut, 1),
    ("audmclk", Output, 1),
    ("audadc", Input, 1),
    ("auddac", Output, 1),
    ("audlrck", Output, 1),
];

// "1wire" is spelled "lwire" to keep field names valid identifiers.
const BRIDGE: &[FieldSpec] = &[
    ("spimosi", InOut, 1),
    ("spimiso", InOut, 1),
    ("spiclk", InOut, 1),
    ("spiss", Input, 1),
    ("lwire", InOut, 1),
];

const CRAM: &[FieldSpec] = &[
    ("a", Output, 6),
    ("dq", InOut, 16),
    ("wait", Input, 1),
    ("clk", Output, 1),
    ("adv_n", Output, 1),
    ("cre", Output, 1),
    ("ce0_n", Output, 1),
    ("ce1_n", Output, 1),
    ("oe_n", Output, 1),
    ("we_n", Output, 1),
    ("ub_n", Output, 1),
    ("lb_n", Output, 1),
];

const DRAM: &[FieldSpec] = &[
    ("a", Output, 13),
    ("ba", Output, 2),
    ("dq", InOut, 16),
    ("dqm", Output, 2),
    ("clk", Output, 1),
    ("cke", Output, 1),
    ("ras_n", Output, 1),
    ("cas_n", Output, 1),
    ("we_n", Output, 1),
];

const SRAM: &[FieldSpec] = &[
    ("a", Output, 17),
    ("dq", InOut, 16),
    ("oe_n", Output, 1),
    ("we_n", Output, 1),
    ("ub_n", Output, 1),
    ("lb_n", Output, 1),
];

const SCALARS_TAIL: &[FieldSpec] = &[
    ("vblank", Input, 1),
    ("dbg_tx", Output, 1),
    ("dbg_rx", Input, 1),
    ("user1", Output, 1),
    ("user2", Input, 1),
    ("bist", InOut, 1),
    ("vpll_feed", Output, 1),
    ("aux_sda", InOut, 1),
    ("aux_scl", Output, 1),
];

/// Composite connectors, in registration order.
const CONNECTORS: &[(&str, &[FieldSpec])] = &[
    ("cart", CART),
    ("port_ir", PORT_IR),
    ("port_tran", PORT_TRAN),
    ("scal", SCAL),
    ("bridge", BRIDGE),
    ("cram0", CRAM),
    ("cram1", CRAM),
    ("dram", DRAM),
    ("sram", SRAM),
];

/// Platform identity and programming defaults.
///
/// Cores are loaded into configuration SRAM as raw binary files.
pub fn info() -> PlatformInfo {
    PlatformInfo {
        id: ID.to_string(),
        device: DEVICE.to_string(),
        family: "cyclone_v".to_string(),
        programming: ProgrammingDefaults {
            tool: ProgrammerKind::OpenFpgaLoader,
            cable: "usb-blaster".to_string(),
            mode: ProgramMode::Sram,
        },
    }
}

/// Registers every Analog Pocket signal group.
pub fn registry() -> Result<SignalRegistry, RegistryError> {
    let mut builder = RegistryBuilder::new(info());
    for &(name, direction, width) in SCALARS_HEAD {
        builder.add(SignalGroup::scalar(name, direction, width))?;
    }
    for &(name, fields) in CONNECTORS {
        let fields = fields
            .iter()
            .map(|&(field, direction, width)| SignalField::new(field, direction, width))
            .collect();
        builder.add(SignalGroup::composite(name, fields))?;
    }
    for &(name, direction, width) in SCALARS_TAIL {
        builder.add(SignalGroup::scalar(name, direction, width))?;
    }
    Ok(builder.finish())
}
