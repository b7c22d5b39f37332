//! # M1047 Disassembler
//!
//! Decode program cells against an instruction table and render them as
//! assembly text.
//!
//! ## Example
//!
//! ```rust
//! use mcu_spec::{encode, Architecture, Width};
//! use mcu_disassembler::disassemble;
//!
//! let arch = Architecture::m1047();
//! let mut code = encode(&arch, Width::W8, "LDI", &[0, 42]).unwrap();
//! code.extend(encode(&arch, Width::W8, "BREAK", &[]).unwrap());
//!
//! let asm = disassemble(&arch, Width::W8, &code, 0);
//! assert!(asm.contains("ldi r0, 42"));
//! ```

pub mod decoder;
pub mod disassembler;
pub mod error;
pub mod formatter;

pub use decoder::{decode, Decoded};
pub use disassembler::disassemble;
pub use error::{DisassemblerError, Result};
pub use formatter::format;
