//! Executable subsystem inspection
//!
//! Reads the PE header of a native executable to tell GUI programs from
//! console programs. Anything that cannot be opened, mapped or parsed is
//! classified as [`Subsystem::Unknown`]; inspection never fails a build.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

const DOS_SIGNATURE: &[u8; 2] = b"MZ";
const PE_SIGNATURE: &[u8; 4] = b"PE\0\0";
const E_LFANEW_OFFSET: usize = 0x3C;
const COFF_HEADER_LEN: usize = 20;
const OPTIONAL_MAGIC_PE32: u16 = 0x10B;
const OPTIONAL_MAGIC_PE32_PLUS: u16 = 0x20B;
/// Same offset in PE32 and PE32+ optional headers
const SUBSYSTEM_OFFSET: usize = 68;

const IMAGE_SUBSYSTEM_WINDOWS_GUI: u16 = 2;
const IMAGE_SUBSYSTEM_WINDOWS_CUI: u16 = 3;

/// Windows subsystem recorded in an executable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Console,
    Gui,
    Unknown,
}

impl Subsystem {
    pub fn is_gui(self) -> bool {
        self == Subsystem::Gui
    }
}

/// Capability to classify an executable on disk
pub trait ExecutableHeaderReader: Send + Sync {
    fn subsystem(&self, path: &Path) -> Subsystem;
}

/// Reads the header through a read-only memory map
#[derive(Debug, Default, Clone, Copy)]
pub struct MappedHeaderReader;

impl ExecutableHeaderReader for MappedHeaderReader {
    fn subsystem(&self, path: &Path) -> Subsystem {
        let Ok(file) = File::open(path) else {
            return Subsystem::Unknown;
        };
        // SAFETY: the map is read-only and dropped before this function
        // returns; a concurrent writer can at worst make us misclassify.
        let Ok(map) = (unsafe { Mmap::map(&file) }) else {
            return Subsystem::Unknown;
        };
        parse_subsystem(&map)
    }
}

/// Walk the DOS and NT headers of `image` to the optional-header subsystem field
pub fn parse_subsystem(image: &[u8]) -> Subsystem {
    read_subsystem(image).map_or(Subsystem::Unknown, |value| match value {
        IMAGE_SUBSYSTEM_WINDOWS_GUI => Subsystem::Gui,
        IMAGE_SUBSYSTEM_WINDOWS_CUI => Subsystem::Console,
        _ => Subsystem::Unknown,
    })
}

fn read_subsystem(image: &[u8]) -> Option<u16> {
    if image.get(..2)? != DOS_SIGNATURE {
        return None;
    }
    let nt_offset = usize::try_from(read_u32(image, E_LFANEW_OFFSET)?).ok()?;
    if image.get(nt_offset..nt_offset.checked_add(4)?)? != PE_SIGNATURE {
        return None;
    }
    let optional = nt_offset.checked_add(4 + COFF_HEADER_LEN)?;
    match read_u16(image, optional)? {
        OPTIONAL_MAGIC_PE32 | OPTIONAL_MAGIC_PE32_PLUS => {
            read_u16(image, optional.checked_add(SUBSYSTEM_OFFSET)?)
        }
        _ => None,
    }
}

fn read_u16(image: &[u8], offset: usize) -> Option<u16> {
    let bytes = image.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(image: &[u8], offset: usize) -> Option<u32> {
    let bytes = image.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
