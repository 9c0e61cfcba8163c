//! Constellation mapping for the acoustic OFDM codec (spec.md §4.2).
//!
//! Bits-to-complex-symbol mapping for BPSK/QPSK/16-QAM, shared by the OFDM
//! modulator and the (future) demodulator. Tagged variant over a class
//! hierarchy per spec.md §9: dispatch happens on the enum, not through
//! virtual calls.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;

/// Acoustic modulation scheme (spec.md §3 `ModulationType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModulationType {
    Bpsk,
    Qpsk,
    Qam16,
}

impl ModulationType {
    /// Bits carried per constellation symbol.
    pub const fn bits_per_symbol(self) -> usize {
        match self {
            ModulationType::Bpsk => 1,
            ModulationType::Qpsk => 2,
            ModulationType::Qam16 => 4,
        }
    }
}

/// Map a bit group (MSB-first, `bits_per_symbol` bits, packed into the low
/// bits of `value`) to its constellation point (spec.md §4.2).
pub fn bits_to_symbol(modulation: ModulationType, value: u8) -> Complex64 {
    match modulation {
        ModulationType::Bpsk => {
            if value == 0 {
                Complex64::new(1.0, 0.0)
            } else {
                Complex64::new(-1.0, 0.0)
            }
        }
        ModulationType::Qpsk => {
            const POINTS: [Complex64; 4] = [
                Complex64::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
                Complex64::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
                Complex64::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
                Complex64::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
            ];
            POINTS[(value & 0x3) as usize]
        }
        ModulationType::Qam16 => {
            let i = ((value >> 2) & 0x3) as f64 * 2.0 - 3.0;
            let q = (value & 0x3) as f64 * 2.0 - 3.0;
            Complex64::new(i, q) / (10.0f64).sqrt()
        }
    }
}

/// Modulate a byte slice onto `num_subcarriers` constellation symbols,
/// grouping `bits_per_symbol` bits per subcarrier MSB-first. Subcarriers
/// left unfilled by a short final group carry `0+0j` (spec.md §4.2).
pub fn modulate_symbols(
    modulation: ModulationType,
    bytes: &[u8],
    num_subcarriers: usize,
) -> Vec<Complex64> {
    let bits_per_symbol = modulation.bits_per_symbol();
    let bit_len = bytes.len() * 8;
    let mut symbols = Vec::with_capacity(num_subcarriers);

    for i in 0..num_subcarriers {
        let start_bit = i * bits_per_symbol;
        let end_bit = start_bit + bits_per_symbol;
        if end_bit <= bit_len {
            let mut value = 0u8;
            for bit_idx in start_bit..end_bit {
                let byte = bytes[bit_idx / 8];
                let bit = (byte >> (7 - (bit_idx % 8))) & 1;
                value = (value << 1) | bit;
            }
            symbols.push(bits_to_symbol(modulation, value));
        } else {
            symbols.push(Complex64::new(0.0, 0.0));
        }
    }

    symbols
}
